//! Scripted in-memory gateway for tests/dev.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::gateway::{CredentialPair, GatewayError, LoginCredentials, LoginGrant, RealmGateway};
use crate::Principal;

/// Number of times each collaborator was invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GatewayCalls {
    pub login: usize,
    pub refresh: usize,
    pub fetch_principal: usize,
}

#[derive(Debug)]
struct Script {
    login: Result<LoginGrant, GatewayError>,
    refresh: Result<CredentialPair, GatewayError>,
    principal: Result<Principal, GatewayError>,
    last_refresh_credential: Option<String>,
    calls: GatewayCalls,
}

/// Gateway that replays configured responses.
///
/// - No IO
/// - Unscripted exchanges fail with [`GatewayError::Rejected`]
/// - Responses can be swapped between calls
#[derive(Debug)]
pub struct InMemoryGateway {
    script: Mutex<Script>,
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        let unscripted = |op: &str| GatewayError::Rejected(format!("{op} not scripted"));
        Self {
            script: Mutex::new(Script {
                login: Err(unscripted("login")),
                refresh: Err(unscripted("refresh")),
                principal: Err(unscripted("fetch_principal")),
                last_refresh_credential: None,
                calls: GatewayCalls::default(),
            }),
        }
    }
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_login(self, result: Result<LoginGrant, GatewayError>) -> Self {
        self.set_login(result);
        self
    }

    pub fn with_refresh(self, result: Result<CredentialPair, GatewayError>) -> Self {
        self.set_refresh(result);
        self
    }

    pub fn with_principal(self, result: Result<Principal, GatewayError>) -> Self {
        self.set_principal(result);
        self
    }

    pub fn set_login(&self, result: Result<LoginGrant, GatewayError>) {
        self.with_script(|s| s.login = result);
    }

    pub fn set_refresh(&self, result: Result<CredentialPair, GatewayError>) {
        self.with_script(|s| s.refresh = result);
    }

    pub fn set_principal(&self, result: Result<Principal, GatewayError>) {
        self.with_script(|s| s.principal = result);
    }

    pub fn calls(&self) -> GatewayCalls {
        self.script.lock().map(|s| s.calls).unwrap_or_default()
    }

    /// Refresh credential presented on the most recent refresh call.
    pub fn last_refresh_credential(&self) -> Option<String> {
        self.script
            .lock()
            .ok()
            .and_then(|s| s.last_refresh_credential.clone())
    }

    fn with_script<R>(&self, f: impl FnOnce(&mut Script) -> R) -> R {
        // A poisoned script only happens after a panicking test; keep going with its state.
        let mut guard = self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

#[async_trait]
impl RealmGateway for InMemoryGateway {
    async fn login(&self, _credentials: &LoginCredentials) -> Result<LoginGrant, GatewayError> {
        self.with_script(|s| {
            s.calls.login += 1;
            s.login.clone()
        })
    }

    async fn refresh(&self, refresh_credential: &str) -> Result<CredentialPair, GatewayError> {
        self.with_script(|s| {
            s.calls.refresh += 1;
            s.last_refresh_credential = Some(refresh_credential.to_string());
            s.refresh.clone()
        })
    }

    async fn fetch_principal(&self) -> Result<Principal, GatewayError> {
        self.with_script(|s| {
            s.calls.fetch_principal += 1;
            s.principal.clone()
        })
    }
}
