//! `campusgate-auth`: client-side credential handling for the four realms.
//!
//! This crate owns credential inspection and per-realm session lifecycles.
//! It is decoupled from routing: the navigation engine consumes it through
//! [`SessionRegistry`].
//!
//! Credential inspection here is a heuristic (no signature verification).
//! The server re-validates every credential; nothing in this crate is a
//! security boundary.

pub mod claims;
pub mod gateway;
pub mod memory;
pub mod navigator;
pub mod offline;
pub mod principal;
pub mod registry;
pub mod roles;
pub mod session;

pub use claims::{CredentialClaims, CredentialCodec, CredentialError, fingerprint};
pub use gateway::{CredentialPair, GatewayError, LoginCredentials, LoginGrant, RealmGateway};
pub use memory::{GatewayCalls, InMemoryGateway};
pub use navigator::{HardNavigator, RecordingNavigator, TracingNavigator};
pub use offline::OfflineGateway;
pub use principal::Principal;
pub use registry::{SessionRegistry, SessionRegistryBuilder};
pub use roles::{AdminTier, Role};
pub use session::{Session, SessionError, SessionStore};
