use base64::Engine;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use campusgate_core::GateConfig;

/// Claims carried in the payload segment of a bearer credential.
///
/// Only `exp` is interpreted; everything else is carried along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialClaims {
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CredentialClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }

    /// Expired iff the expiry second is strictly before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp < now.timestamp()
    }
}

/// Why a credential could not be decoded. Every variant means "expired".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("credential is empty")]
    Empty,

    #[error("credential has {0} dot-separated segments, expected 3")]
    SegmentCount(usize),

    #[error("payload segment is not base64: {0}")]
    PayloadEncoding(String),

    #[error("payload segment is not a claims object: {0}")]
    PayloadJson(String),
}

/// Unsigned, client-only credential inspection.
///
/// Never verifies signatures. A decoded expiry only tells the client whether
/// sending the credential is worth trying.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialCodec {
    synthetic_prefix: Option<String>,
}

impl CredentialCodec {
    /// Codec with no synthetic-credential escape hatch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat credentials starting with `prefix` as never expiring.
    pub fn with_synthetic_prefix(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            synthetic_prefix: (!prefix.is_empty()).then_some(prefix),
        }
    }

    /// Codec for the configured environment; synthetic credentials are
    /// rejected in production.
    pub fn from_config(config: &GateConfig) -> Self {
        match config.synthetic_prefix() {
            Some(prefix) => Self::with_synthetic_prefix(prefix),
            None => Self::new(),
        }
    }

    pub fn synthetic_prefix(&self) -> Option<&str> {
        self.synthetic_prefix.as_deref()
    }

    pub fn is_synthetic(&self, credential: &str) -> bool {
        self.synthetic_prefix
            .as_deref()
            .is_some_and(|prefix| credential.starts_with(prefix))
    }

    /// Decode the claims segment of a three-segment credential.
    pub fn decode_claims(&self, credential: &str) -> Result<CredentialClaims, CredentialError> {
        if credential.is_empty() {
            return Err(CredentialError::Empty);
        }

        let segments: Vec<&str> = credential.split('.').collect();
        let [_, payload, _] = segments.as_slice() else {
            return Err(CredentialError::SegmentCount(segments.len()));
        };

        let bytes = decode_segment(payload)?;
        serde_json::from_slice(&bytes).map_err(|e| CredentialError::PayloadJson(e.to_string()))
    }

    pub fn is_expired(&self, credential: &str) -> bool {
        self.is_expired_at(credential, Utc::now())
    }

    /// Total: any decode failure counts as expired.
    pub fn is_expired_at(&self, credential: &str, now: DateTime<Utc>) -> bool {
        if self.is_synthetic(credential) {
            return false;
        }

        match self.decode_claims(credential) {
            Ok(claims) => claims.is_expired_at(now),
            Err(err) => {
                tracing::debug!(credential = %fingerprint(credential), error = %err, "treating undecodable credential as expired");
                true
            }
        }
    }
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, CredentialError> {
    let trimmed = segment.trim_end_matches('=');
    URL_SAFE_NO_PAD
        .decode(trimmed)
        .or_else(|_| STANDARD_NO_PAD.decode(trimmed))
        .map_err(|e| CredentialError::PayloadEncoding(e.to_string()))
}

/// Short, non-reversible label for a credential in log output.
pub fn fingerprint(credential: &str) -> String {
    let head: String = credential.chars().take(6).collect();
    format!("{head}…({} chars)", credential.chars().count())
}
