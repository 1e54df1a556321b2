//! Per-realm session lifecycle.
//!
//! One [`SessionStore`] exists per realm. It exclusively owns that realm's
//! in-memory [`Session`] and that realm's slice of persistent storage; the
//! shape of both is parameterized by [`Realm::storage_keys`].

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;
use thiserror::Error;

use campusgate_core::{KeyValueStore, Realm, StorageKeys};

use crate::gateway::{CredentialPair, GatewayError, LoginCredentials, RealmGateway};
use crate::navigator::HardNavigator;
use crate::{Principal, fingerprint};

/// Credential and profile state of one realm.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub access_credential: String,
    pub refresh_credential: String,
    pub principal: Option<Principal>,
    /// Institution summary (instructor realm only).
    pub institution: Option<Value>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        !self.access_credential.is_empty() && self.principal.is_some()
    }

    pub fn is_empty(&self) -> bool {
        *self == Session::default()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("no refresh credential is held for this realm")]
    MissingRefreshCredential,

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("persisted principal for {realm} is malformed: {reason}")]
    MalformedPersistedPrincipal { realm: Realm, reason: String },
}

/// Session store for one realm.
///
/// Operations on the same store are expected to be serialized by the caller
/// (one user-triggered auth action at a time per realm). The state lock is
/// never held across an await.
pub struct SessionStore {
    realm: Realm,
    gateway: Arc<dyn RealmGateway>,
    storage: Arc<dyn KeyValueStore>,
    navigator: Arc<dyn HardNavigator>,
    state: RwLock<Session>,
}

impl core::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionStore")
            .field("realm", &self.realm)
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Empty store; call [`SessionStore::init_from_storage`] to hydrate.
    pub fn new(
        realm: Realm,
        gateway: Arc<dyn RealmGateway>,
        storage: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn HardNavigator>,
    ) -> Self {
        Self {
            realm,
            gateway,
            storage,
            navigator,
            state: RwLock::new(Session::default()),
        }
    }

    pub fn realm(&self) -> Realm {
        self.realm
    }

    pub fn keys(&self) -> &'static StorageKeys {
        self.realm.storage_keys()
    }

    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    pub fn principal(&self) -> Option<Principal> {
        self.read().principal.clone()
    }

    /// Exchange credentials for a session. On failure the session is left
    /// untouched and the collaborator's error is returned as-is.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<Principal, GatewayError> {
        let grant = self.gateway.login(credentials).await?;

        let session = Session {
            access_credential: grant.access_credential,
            refresh_credential: grant.refresh_credential,
            principal: Some(grant.principal.clone()),
            institution: grant.institution.filter(|_| self.keys().institution.is_some()),
        };

        self.persist_session(&session);
        *self.write() = session;

        tracing::info!(realm = %self.realm, "logged in");
        Ok(grant.principal)
    }

    /// Reset in-memory state and remove every persisted key of this realm,
    /// legacy aliases included. Never fails.
    pub fn clear(&self) {
        *self.write() = Session::default();
        for key in self.keys().all() {
            self.remove(key);
        }
        tracing::debug!(realm = %self.realm, "session cleared");
    }

    /// [`SessionStore::clear`] followed by a full redirect to the realm's login page.
    pub fn logout(&self) {
        self.clear();
        tracing::info!(realm = %self.realm, "logged out");
        self.navigator.navigate_full(self.realm.login_path());
    }

    /// Mint a new credential pair. Any failure logs the realm out before the
    /// error is returned, so a failed refresh never leaves a partial session.
    pub async fn refresh(&self) -> Result<CredentialPair, SessionError> {
        let refresh_credential = self.read().refresh_credential.clone();
        if refresh_credential.is_empty() {
            tracing::warn!(realm = %self.realm, "refresh attempted without a refresh credential");
            self.logout();
            return Err(SessionError::MissingRefreshCredential);
        }

        match self.gateway.refresh(&refresh_credential).await {
            Ok(pair) => {
                self.put(self.keys().access, &pair.access_credential);
                self.put(self.keys().refresh, &pair.refresh_credential);
                {
                    let mut state = self.write();
                    state.access_credential = pair.access_credential.clone();
                    state.refresh_credential = pair.refresh_credential.clone();
                }
                tracing::debug!(
                    realm = %self.realm,
                    access = %fingerprint(&pair.access_credential),
                    "credentials refreshed"
                );
                Ok(pair)
            }
            Err(err) => {
                tracing::warn!(realm = %self.realm, error = %err, "refresh failed; logging out");
                self.logout();
                Err(err.into())
            }
        }
    }

    /// Re-read the principal from the realm's "who am I" collaborator.
    pub async fn fetch_principal(&self) -> Result<Principal, GatewayError> {
        let principal = self.gateway.fetch_principal().await?;
        self.adopt_principal(&principal);
        Ok(principal)
    }

    /// [`SessionStore::fetch_principal`] whose result is only applied if
    /// `still_current` holds once the collaborator answers. Returns `None`
    /// (state untouched) otherwise.
    pub async fn fetch_principal_if<F>(&self, still_current: F) -> Result<Option<Principal>, GatewayError>
    where
        F: Fn() -> bool + Send,
    {
        let principal = self.gateway.fetch_principal().await?;
        if !still_current() {
            tracing::debug!(realm = %self.realm, "dropping stale principal fetch");
            return Ok(None);
        }
        self.adopt_principal(&principal);
        Ok(Some(principal))
    }

    fn adopt_principal(&self, principal: &Principal) {
        let institution = self
            .keys()
            .institution
            .and_then(|_| principal.nested("school"))
            .map(|school| Value::Object(school.clone()));

        self.persist_principal(principal);
        if let (Some(key), Some(summary)) = (self.keys().institution, &institution) {
            self.put(key, &summary.to_string());
        }

        let mut state = self.write();
        state.principal = Some(principal.clone());
        if institution.is_some() {
            state.institution = institution;
        }
    }

    /// Overwrite the access credential (after an externally driven refresh).
    pub fn set_access_credential(&self, credential: impl Into<String>) {
        let credential = credential.into();
        self.put(self.keys().access, &credential);
        self.write().access_credential = credential;
    }

    /// Hydrate in-memory state from persistent storage.
    ///
    /// Idempotent. A malformed persisted principal is logged and discarded.
    /// Without an access credential the realm is unauthenticated, and any
    /// refresh credential or profile data left behind is removed.
    pub fn init_from_storage(&self) {
        let keys = self.keys();
        let access_credential = self.lookup(keys.access_lookup()).unwrap_or_default();
        let refresh_credential = self.lookup(keys.refresh_lookup()).unwrap_or_default();

        let principal = match self.load_principal() {
            Ok(principal) => principal,
            Err(err) => {
                tracing::warn!(error = %err, "discarding persisted principal");
                self.remove(keys.principal);
                None
            }
        };
        let institution = keys.institution.and_then(|key| self.load_institution(key));

        if access_credential.is_empty() {
            if !refresh_credential.is_empty() || principal.is_some() || institution.is_some() {
                tracing::warn!(realm = %self.realm, "removing session fields left without an access credential");
            }
            self.clear();
            return;
        }

        let session = Session {
            access_credential,
            refresh_credential,
            principal,
            institution,
        };
        tracing::debug!(
            realm = %self.realm,
            authenticated = session.is_authenticated(),
            "hydrated from storage"
        );
        *self.write() = session;
    }

    /// Access credential held in memory, else the first persisted one
    /// (primary key, then legacy aliases).
    pub fn current_access_credential(&self) -> Option<String> {
        let in_memory = self.read().access_credential.clone();
        if !in_memory.is_empty() {
            return Some(in_memory);
        }
        self.lookup(self.keys().access_lookup())
    }

    /// Principal held in memory, else the persisted one. A malformed
    /// persisted principal resolves to `None`.
    pub fn resolve_principal(&self) -> Option<Principal> {
        if let Some(principal) = self.principal() {
            return Some(principal);
        }
        self.load_principal().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "ignoring persisted principal");
            None
        })
    }

    fn load_principal(&self) -> Result<Option<Principal>, SessionError> {
        let Some(raw) = self.storage.get(self.keys().principal) else {
            return Ok(None);
        };
        Principal::parse(&raw).map_err(|err| SessionError::MalformedPersistedPrincipal {
            realm: self.realm,
            reason: err.to_string(),
        })
    }

    fn load_institution(&self, key: &str) -> Option<Value> {
        let raw = self.storage.get(key)?;
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Null) => None,
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(realm = %self.realm, key, error = %err, "discarding malformed institution summary");
                None
            }
        }
    }

    fn lookup(&self, keys: impl Iterator<Item = &'static str>) -> Option<String> {
        keys.filter_map(|key| self.storage.get(key))
            .find(|value| !value.is_empty())
    }

    fn persist_session(&self, session: &Session) {
        let keys = self.keys();
        self.put(keys.access, &session.access_credential);
        self.put(keys.refresh, &session.refresh_credential);
        if let Some(principal) = &session.principal {
            self.persist_principal(principal);
        }
        if let Some(key) = keys.institution {
            match &session.institution {
                Some(summary) => self.put(key, &summary.to_string()),
                None => self.remove(key),
            }
        }
    }

    fn persist_principal(&self, principal: &Principal) {
        match principal.to_json() {
            Ok(json) => self.put(self.keys().principal, &json),
            Err(err) => {
                tracing::warn!(realm = %self.realm, error = %err, "failed to serialize principal")
            }
        }
    }

    fn put(&self, key: &str, value: &str) {
        if let Err(err) = self.storage.set(key, value) {
            tracing::warn!(realm = %self.realm, key, error = %err, "failed to persist session field");
        }
    }

    fn remove(&self, key: &str) {
        if let Err(err) = self.storage.remove(key) {
            tracing::warn!(realm = %self.realm, key, error = %err, "failed to remove session field");
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
