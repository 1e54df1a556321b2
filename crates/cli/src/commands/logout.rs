use std::path::Path;

use campusgate_core::Realm;

use super::open_sessions;

pub fn run(realm: Realm, storage: &Path) -> anyhow::Result<()> {
    let sessions = open_sessions(storage)?;
    let store = sessions.store(realm);
    let was_authenticated = store.is_authenticated();

    store.logout();

    println!(
        "{realm}: session cleared{}",
        if was_authenticated { "" } else { " (was not authenticated)" }
    );
    Ok(())
}
