//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use traefik_opnsense_sync::domains::{DomainMaterializer, GeneratorError, PatternGenerator};
use traefik_opnsense_sync::http::HttpError;
use traefik_opnsense_sync::opnsense::{AliasStore, StoreError};
use traefik_opnsense_sync::sync::{HostAlias, RouterFilter, SyncEngine};
use traefik_opnsense_sync::traefik::{RouteSource, Router};

pub const MARKER: &str = "Managed by traefik-opnsense-sync";

/// A request as seen by the mock backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` maps each request to `(status, body)`; every request is recorded.
pub async fn start_programmable_backend<F>(
    f: F,
) -> (SocketAddr, Arc<Mutex<Vec<RecordedRequest>>>)
where
    F: Fn(&RecordedRequest) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let recorded = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let log = recorded.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let f = f.clone();
                    let log = log.clone();
                    tokio::spawn(async move {
                        let _ = serve(socket, f.as_ref(), &log).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, recorded)
}

async fn serve<F>(
    mut socket: TcpStream,
    f: &F,
    log: &Mutex<Vec<RecordedRequest>>,
) -> std::io::Result<()>
where
    F: Fn(&RecordedRequest) -> (u16, String),
{
    let request = read_request(&mut socket).await?;
    let (status, body) = f(&request);
    log.lock().unwrap().push(request);

    let status_text = match status {
        200 => "200 OK",
        401 => "401 Unauthorized",
        404 => "404 Not Found",
        500 => "500 Internal Server Error",
        502 => "502 Bad Gateway",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\
         Connection: close\r\n\r\n{}",
        status_text,
        body.len(),
        body
    );
    socket.write_all(response.as_bytes()).await?;
    socket.shutdown().await
}

async fn read_request(socket: &mut TcpStream) -> std::io::Result<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();

    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let content_length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).into_owned();

    Ok(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}

/// In-memory [`RouteSource`].
#[derive(Default)]
pub struct FakeRouteSource {
    routers: Mutex<Vec<Router>>,
    fail: AtomicBool,
}

impl FakeRouteSource {
    pub fn new(routers: Vec<Router>) -> Self {
        Self {
            routers: Mutex::new(routers),
            fail: AtomicBool::new(false),
        }
    }

    pub fn set_routers(&self, routers: Vec<Router>) {
        *self.routers.lock().unwrap() = routers;
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl RouteSource for FakeRouteSource {
    async fn routers(&self) -> Result<Vec<Router>, HttpError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(HttpError::Status {
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                url: "http://traefik/api/http/routers".to_string(),
                snippet: String::new(),
            });
        }
        Ok(self.routers.lock().unwrap().clone())
    }
}

/// In-memory [`AliasStore`] holding a single host override.
pub struct FakeAliasStore {
    override_fqdn: String,
    override_id: String,
    aliases: Mutex<Vec<HostAlias>>,
    calls: Mutex<Vec<String>>,
    failing_keys: Mutex<HashSet<String>>,
    next_id: AtomicUsize,
    applies: AtomicUsize,
    fail_apply: AtomicBool,
    fail_lookup: AtomicBool,
}

impl FakeAliasStore {
    pub fn new(override_fqdn: &str, override_id: &str) -> Self {
        Self {
            override_fqdn: override_fqdn.to_string(),
            override_id: override_id.to_string(),
            aliases: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            failing_keys: Mutex::new(HashSet::new()),
            next_id: AtomicUsize::new(1),
            applies: AtomicUsize::new(0),
            fail_apply: AtomicBool::new(false),
            fail_lookup: AtomicBool::new(false),
        }
    }

    /// Seed an existing alias, assigning an id when it has none.
    pub fn seed(&self, alias: HostAlias) {
        let alias = match alias.id {
            Some(_) => alias,
            None => {
                let id = self.allocate_id();
                alias.with_id(id)
            }
        };
        self.aliases.lock().unwrap().push(alias);
    }

    /// Make create/delete calls for `key` fail.
    pub fn fail_on(&self, key: &str) {
        self.failing_keys.lock().unwrap().insert(key.to_string());
    }

    pub fn set_fail_apply(&self, fail: bool) {
        self.fail_apply.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_lookup(&self, fail: bool) {
        self.fail_lookup.store(fail, Ordering::SeqCst);
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> =
            self.aliases.lock().unwrap().iter().map(HostAlias::key).collect();
        keys.sort();
        keys
    }

    pub fn snapshot(&self) -> Vec<HostAlias> {
        self.aliases.lock().unwrap().clone()
    }

    /// Mutating calls in order: `create <key>`, `delete <key>`, `apply`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn apply_count(&self) -> usize {
        self.applies.load(Ordering::SeqCst)
    }

    fn allocate_id(&self) -> String {
        format!("uuid-{}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn check(&self, key: &str) -> Result<(), StoreError> {
        if self.failing_keys.lock().unwrap().contains(key) {
            return Err(StoreError::Rejected {
                key: key.to_string(),
                result: "failed".to_string(),
                details: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AliasStore for FakeAliasStore {
    async fn find_host_override(&self, fqdn: &str) -> Result<Option<String>, StoreError> {
        if self.fail_lookup.load(Ordering::SeqCst) {
            return Err(StoreError::Http(HttpError::Status {
                status: reqwest::StatusCode::BAD_GATEWAY,
                url: "http://opnsense/api/unbound/settings/search_host_override/".to_string(),
                snippet: String::new(),
            }));
        }
        Ok(self
            .override_fqdn
            .eq_ignore_ascii_case(fqdn)
            .then(|| self.override_id.clone()))
    }

    async fn aliases(&self, override_id: &str) -> Result<Vec<HostAlias>, StoreError> {
        if override_id != self.override_id {
            return Ok(Vec::new());
        }
        Ok(self.snapshot())
    }

    async fn create_alias(
        &self,
        alias: &HostAlias,
        _override_id: &str,
    ) -> Result<String, StoreError> {
        let key = alias.key();
        self.calls.lock().unwrap().push(format!("create {key}"));
        self.check(&key)?;
        let id = self.allocate_id();
        self.aliases.lock().unwrap().push(alias.clone().with_id(id.clone()));
        Ok(id)
    }

    async fn delete_alias(&self, alias: &HostAlias) -> Result<(), StoreError> {
        let key = alias.key();
        self.calls.lock().unwrap().push(format!("delete {key}"));
        self.check(&key)?;
        let id = alias.id.clone().ok_or_else(|| StoreError::MissingId(key))?;
        self.aliases
            .lock()
            .unwrap()
            .retain(|a| a.id.as_deref() != Some(id.as_str()));
        Ok(())
    }

    async fn apply(&self) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push("apply".to_string());
        self.applies.fetch_add(1, Ordering::SeqCst);
        if self.fail_apply.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected {
                key: "reconfigure".to_string(),
                result: "failed".to_string(),
                details: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

/// [`PatternGenerator`] answering from a fixed table.
#[derive(Default)]
pub struct FakeGenerator {
    outputs: HashMap<String, Vec<String>>,
    calls: AtomicUsize,
}

impl FakeGenerator {
    pub fn with(mut self, pattern: &str, names: &[&str]) -> Self {
        self.outputs.insert(
            pattern.to_string(),
            names.iter().map(|n| n.to_string()).collect(),
        );
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PatternGenerator for FakeGenerator {
    async fn generate(&self, pattern: &str, max: usize) -> Result<Vec<String>, GeneratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.outputs.get(pattern) {
            Some(names) => Ok(names.iter().take(max).cloned().collect()),
            None => Err(GeneratorError::Failed {
                pattern: pattern.to_string(),
                message: "no such pattern".to_string(),
            }),
        }
    }
}

/// Engine with the default marker and a five-name generation cap.
pub fn engine(filter: RouterFilter, generator: Arc<FakeGenerator>) -> SyncEngine {
    SyncEngine::new(filter, DomainMaterializer::new(generator, 5), MARKER)
}

pub fn managed(hostname: &str, domain: &str) -> HostAlias {
    HostAlias::new(hostname, domain, MARKER)
}

pub fn router(name: &str, rule: &str) -> Router {
    let provider = name.split_once('@').map(|(_, p)| p).unwrap_or("docker");
    Router::new(name, provider, rule).with_entry_points(["websecure"])
}
