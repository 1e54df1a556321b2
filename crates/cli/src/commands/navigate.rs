use std::path::Path;

use campusgate_core::GateConfig;
use campusgate_router::{NavigationEngine, NavigationOutcome};

use super::open_sessions;

pub async fn run(config: &GateConfig, path: &str, storage: &Path, follow: bool) -> anyhow::Result<()> {
    let sessions = open_sessions(storage)?;
    for store in sessions.iter() {
        tracing::debug!(realm = %store.realm(), authenticated = store.is_authenticated(), "session");
    }

    let engine = NavigationEngine::builder(sessions).config(config).build()?;

    let outcome = if follow {
        engine.settle(path).await?
    } else {
        engine.navigate(path).await
    };

    match outcome {
        NavigationOutcome::Proceed { path, title } => println!("proceed  {path}  \"{title}\""),
        NavigationOutcome::Redirect(target) => println!("redirect {target}"),
        NavigationOutcome::Superseded => println!("superseded"),
    }
    Ok(())
}
