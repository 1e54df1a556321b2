//! `campusgate-core`: realm identities, persistent key/value storage and configuration.
//!
//! This crate carries no credential logic and no navigation policy.

pub mod config;
pub mod error;
pub mod id;
pub mod realm;
pub mod storage;

pub use config::{Environment, GateConfig, LogConfig, LogFormat};
pub use error::{ConfigError, StorageError};
pub use id::NavigationId;
pub use realm::{PLATFORM_ADMIN_LOGIN, ParseRealmError, Realm, SCHOOL_ADMIN_HOME, StorageKeys};
pub use storage::{FileStorage, KeyValueStore, MemoryStorage};
