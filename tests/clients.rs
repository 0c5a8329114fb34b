//! Traefik and OPNsense clients against a mock HTTP backend.

use std::net::SocketAddr;
use std::time::Duration;

use traefik_opnsense_sync::http::{Credentials, HttpError};
use traefik_opnsense_sync::opnsense::{AliasStore, OpnsenseClient, StoreError};
use traefik_opnsense_sync::sync::HostAlias;
use traefik_opnsense_sync::traefik::{RouteSource, TraefikClient};

mod common;
use common::MARKER;

fn base(addr: SocketAddr) -> url::Url {
    url::Url::parse(&format!("http://{addr}")).unwrap()
}

fn traefik(addr: SocketAddr, timeout: Duration) -> TraefikClient {
    TraefikClient::new(base(addr), Credentials::default(), timeout, true).unwrap()
}

fn opnsense(addr: SocketAddr) -> OpnsenseClient {
    OpnsenseClient::new(base(addr), "key", "secret", Duration::from_secs(5), true).unwrap()
}

#[tokio::test]
async fn test_traefik_routers() {
    let (addr, requests) = common::start_programmable_backend(|_| {
        (
            200,
            r#"[
                {"name":"whoami@docker","provider":"docker","entryPoints":["websecure"],
                 "rule":"Host(`whoami.example.com`)","status":"enabled"},
                {"name":"api@internal","provider":"internal","rule":"PathPrefix(`/api`)"}
            ]"#
            .to_string(),
        )
    })
    .await;

    let client = TraefikClient::new(
        base(addr),
        Credentials::new("admin", "pw"),
        Duration::from_secs(5),
        true,
    )
    .unwrap();
    let routers = client.routers().await.unwrap();

    assert_eq!(routers.len(), 2);
    assert_eq!(routers[0].name, "whoami@docker");
    assert_eq!(routers[0].entry_points, vec!["websecure"]);
    assert!(routers[1].entry_points.is_empty());

    let requests = requests.lock().unwrap();
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, "/api/http/routers");
    assert_eq!(requests[0].header("authorization"), Some("Basic YWRtaW46cHc="));
}

#[tokio::test]
async fn test_traefik_without_auth() {
    let (addr, requests) = common::start_programmable_backend(|_| (200, "[]".to_string())).await;
    let client = traefik(addr, Duration::from_secs(5));

    assert!(client.routers().await.unwrap().is_empty());
    assert!(requests.lock().unwrap()[0].header("authorization").is_none());
}

#[tokio::test]
async fn test_traefik_error_status() {
    let (addr, _) =
        common::start_programmable_backend(|_| (503, "traefik is starting".to_string())).await;
    let client = traefik(addr, Duration::from_secs(5));

    match client.routers().await {
        Err(HttpError::Status { status, snippet, .. }) => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(snippet, "traefik is starting");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_traefik_unreachable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = traefik(addr, Duration::from_secs(2));
    assert!(matches!(client.routers().await, Err(HttpError::Request { .. })));
}

#[tokio::test]
async fn test_opnsense_find_host_override() {
    let (addr, requests) = common::start_programmable_backend(|_| {
        (
            200,
            r#"{"rows":[
                {"uuid":"o-1","hostname":"nas","domain":"lan","description":""},
                {"uuid":"o-2","hostname":"Proxy","domain":"LAN","description":""}
            ]}"#
            .to_string(),
        )
    })
    .await;
    let client = opnsense(addr);

    assert_eq!(
        client.find_host_override("proxy.lan").await.unwrap(),
        Some("o-2".to_string())
    );
    assert_eq!(client.find_host_override("missing.lan").await.unwrap(), None);

    let requests = requests.lock().unwrap();
    assert_eq!(requests[0].path, "/api/unbound/settings/search_host_override/");
    assert_eq!(requests[0].header("authorization"), Some("Basic a2V5OnNlY3JldA=="));
}

#[tokio::test]
async fn test_opnsense_aliases() {
    let (addr, requests) = common::start_programmable_backend(|_| {
        (
            200,
            format!(
                r#"{{"rows":[
                    {{"uuid":"a-1","hostname":"svc","domain":"example.com",
                      "description":"{MARKER}"}},
                    {{"uuid":"a-2","hostname":"manual","domain":"lan","description":"by hand"}}
                ]}}"#
            ),
        )
    })
    .await;

    let aliases = opnsense(addr).aliases("o-2").await.unwrap();
    assert_eq!(
        aliases,
        vec![
            HostAlias::new("svc", "example.com", MARKER).with_id("a-1"),
            HostAlias::new("manual", "lan", "by hand").with_id("a-2"),
        ]
    );
    assert_eq!(
        requests.lock().unwrap()[0].path,
        "/api/unbound/settings/search_host_alias/o-2"
    );
}

#[tokio::test]
async fn test_opnsense_create_alias() {
    let (addr, requests) = common::start_programmable_backend(|_| {
        (200, r#"{"result":"saved","uuid":"new-1"}"#.to_string())
    })
    .await;

    let alias = HostAlias::new("svc", "example.com", MARKER);
    let id = opnsense(addr).create_alias(&alias, "o-2").await.unwrap();
    assert_eq!(id, "new-1");

    let requests = requests.lock().unwrap();
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/api/unbound/settings/add_host_alias/");
    let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "alias": {
                "enabled": "1",
                "host": "o-2",
                "hostname": "svc",
                "domain": "example.com",
                "description": MARKER,
            }
        })
    );
}

#[tokio::test]
async fn test_opnsense_create_rejected() {
    let (addr, _) = common::start_programmable_backend(|_| {
        (
            200,
            r#"{"result":"failed","validations":{"alias.hostname":"invalid"}}"#.to_string(),
        )
    })
    .await;

    let alias = HostAlias::new("bad_name", "example.com", MARKER);
    match opnsense(addr).create_alias(&alias, "o-2").await {
        Err(StoreError::Rejected { key, result, details }) => {
            assert_eq!(key, "bad_name.example.com");
            assert_eq!(result, "failed");
            assert!(details.contains("alias.hostname"));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_opnsense_delete_and_apply() {
    let (addr, requests) =
        common::start_programmable_backend(|_| (200, r#"{"result":"deleted"}"#.to_string())).await;
    let client = opnsense(addr);

    let alias = HostAlias::new("svc", "example.com", MARKER).with_id("a-1");
    client.delete_alias(&alias).await.unwrap();
    client.apply().await.unwrap();

    let requests = requests.lock().unwrap();
    let seen: Vec<(&str, &str)> = requests
        .iter()
        .map(|r| (r.method.as_str(), r.path.as_str()))
        .collect();
    assert_eq!(
        seen,
        vec![
            ("POST", "/api/unbound/settings/del_host_alias/a-1"),
            ("POST", "/api/unbound/service/reconfigure/"),
        ]
    );
}

#[tokio::test]
async fn test_opnsense_delete_requires_id() {
    let (addr, requests) = common::start_programmable_backend(|_| (200, "{}".to_string())).await;

    let alias = HostAlias::new("svc", "example.com", MARKER);
    let err = opnsense(addr).delete_alias(&alias).await.unwrap_err();
    assert!(matches!(err, StoreError::MissingId(ref key) if key == "svc.example.com"));
    assert!(requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_opnsense_long_error_body_is_truncated() {
    let (addr, _) = common::start_programmable_backend(|_| (500, "x".repeat(10_000))).await;

    match opnsense(addr).apply().await {
        Err(StoreError::Http(HttpError::Status { snippet, .. })) => {
            assert_eq!(snippet.len(), 4096);
        }
        other => panic!("expected status error, got {other:?}"),
    }
}
