//! Contract for a realm's external login/refresh/"who am I" collaborators.
//!
//! Transport is out of scope here: implementations wrap whatever client the
//! host uses. Timeouts belong to the implementation as well.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::Principal;

/// Form fields submitted to a realm's login endpoint.
///
/// Field sets differ per realm (learners use a username, instructors a school
/// code and staff number), so the map stays open.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoginCredentials(BTreeMap<String, String>);

impl LoginCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

impl core::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in &self.0 {
            if name.contains("password") {
                map.entry(name, &"<redacted>");
            } else {
                map.entry(name, value);
            }
        }
        map.finish()
    }
}

/// Successful login exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginGrant {
    #[serde(rename = "access_token")]
    pub access_credential: String,
    #[serde(rename = "refresh_token")]
    pub refresh_credential: String,
    #[serde(rename = "user")]
    pub principal: Principal,
    /// Institution summary (instructor realm only).
    #[serde(rename = "school", default, skip_serializing_if = "Option::is_none")]
    pub institution: Option<Value>,
}

/// Successful refresh exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    #[serde(rename = "access_token")]
    pub access_credential: String,
    #[serde(rename = "refresh_token")]
    pub refresh_credential: String,
}

/// Collaborator failure. Propagated to callers of `login`/`fetch_principal`,
/// converted into a forced logout by `refresh`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("rejected by server: {0}")]
    Rejected(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("client is offline; operation requires network connection")]
    Offline,

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// One realm's external collaborators.
#[async_trait]
pub trait RealmGateway: Send + Sync {
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginGrant, GatewayError>;

    async fn refresh(&self, refresh_credential: &str) -> Result<CredentialPair, GatewayError>;

    /// Fetch the current principal using the realm's access credential.
    async fn fetch_principal(&self) -> Result<Principal, GatewayError>;
}
