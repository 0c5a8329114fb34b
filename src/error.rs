//! Cycle-level error type.

use thiserror::Error;

use crate::http::HttpError;
use crate::opnsense::StoreError;

/// Why a reconciliation cycle did not fully succeed.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Routers could not be fetched; nothing was changed.
    #[error("failed to fetch routers from Traefik: {0}")]
    Routes(#[source] HttpError),

    /// The alias store could not be read; nothing was changed.
    #[error("failed to read aliases from OPNsense: {0}")]
    Store(#[source] StoreError),

    /// The host override lookup itself failed; nothing was changed.
    #[error("failed to look up host override {fqdn:?} in OPNsense: {source}")]
    HostOverrideLookup {
        fqdn: String,
        #[source]
        source: StoreError,
    },

    /// The configured host override does not exist.
    #[error("host override {0:?} not found in OPNsense Unbound, see the setup instructions")]
    HostOverrideNotFound(String),

    /// Some operations failed; every successful one was still applied.
    #[error("{failed} of {attempted} changes failed")]
    Partial { failed: usize, attempted: usize },
}

impl SyncError {
    /// True when the cycle aborted before changing anything.
    pub fn is_transport(&self) -> bool {
        !matches!(self, SyncError::Partial { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SyncError::Partial {
            failed: 1,
            attempted: 3,
        };
        assert_eq!(err.to_string(), "1 of 3 changes failed");
        assert!(!err.is_transport());

        let err = SyncError::HostOverrideNotFound("proxy.lan".to_string());
        assert!(err.to_string().contains("proxy.lan"));
        assert!(err.is_transport());
    }

    #[test]
    fn test_host_override_lookup_names_the_lookup() {
        let err = SyncError::HostOverrideLookup {
            fqdn: "proxy.lan".to_string(),
            source: StoreError::MissingId("x".to_string()),
        };
        let message = err.to_string();
        assert!(message.starts_with("failed to look up host override \"proxy.lan\""));
        assert!(!message.contains("aliases"));
        assert!(err.is_transport());
    }
}
