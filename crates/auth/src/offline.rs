//! Collaborators for hosts without network access.

use async_trait::async_trait;

use campusgate_core::Realm;

use crate::gateway::{CredentialPair, GatewayError, LoginCredentials, LoginGrant, RealmGateway};
use crate::Principal;

/// Gateway that fails every exchange with [`GatewayError::Offline`].
///
/// Sessions backed by it can still be hydrated from storage and inspected;
/// anything that needs the server fails the way a disconnected client would.
#[derive(Debug, Clone, Copy)]
pub struct OfflineGateway {
    realm: Realm,
}

impl OfflineGateway {
    pub fn new(realm: Realm) -> Self {
        Self { realm }
    }

    pub fn realm(&self) -> Realm {
        self.realm
    }

    fn unavailable<T>(&self, operation: &'static str) -> Result<T, GatewayError> {
        tracing::debug!(realm = %self.realm, operation, "collaborator unavailable offline");
        Err(GatewayError::Offline)
    }
}

#[async_trait]
impl RealmGateway for OfflineGateway {
    async fn login(&self, _credentials: &LoginCredentials) -> Result<LoginGrant, GatewayError> {
        self.unavailable("login")
    }

    async fn refresh(&self, _refresh_credential: &str) -> Result<CredentialPair, GatewayError> {
        self.unavailable("refresh")
    }

    async fn fetch_principal(&self) -> Result<Principal, GatewayError> {
        self.unavailable("fetch_principal")
    }
}
