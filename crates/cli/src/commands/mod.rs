pub mod inspect;
pub mod logout;
pub mod navigate;
pub mod routes;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use campusgate_auth::{SessionRegistry, TracingNavigator};
use campusgate_core::FileStorage;

/// Registry over a storage file, hydrated, with offline collaborators.
pub(crate) fn open_sessions(path: &Path) -> anyhow::Result<Arc<SessionRegistry>> {
    let storage = FileStorage::open(path)
        .with_context(|| format!("failed to open storage file {}", path.display()))?;

    let sessions = SessionRegistry::builder(Arc::new(storage), Arc::new(TracingNavigator)).build();
    sessions.init_from_storage();

    Ok(Arc::new(sessions))
}
