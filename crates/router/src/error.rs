use thiserror::Error;

use campusgate_auth::GatewayError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: &'static str },

    #[error("duplicate route name `{0}`")]
    DuplicateName(String),

    #[error("no route matches `{0}`")]
    Unmatched(String),

    #[error("static redirects starting at `{0}` do not terminate")]
    RedirectCycle(String),
}

/// Failure while evaluating a navigation.
///
/// Only [`GuardError::RedirectLoop`] is ever returned to callers (from
/// `settle`); everything else is mapped by the fallback policy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GuardError {
    #[error(transparent)]
    Collaborator(#[from] GatewayError),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("redirect chain starting at `{start}` exceeded {hops} hops")]
    RedirectLoop { start: String, hops: usize },

    #[error("navigation superseded by a newer request")]
    Superseded,
}
