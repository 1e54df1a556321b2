//! `campusgate`: operator tool for the navigation guard.
//!
//! # Usage
//!
//! ```bash
//! # Decode a credential and report whether the guard considers it expired
//! campusgate inspect eyJhbGciOi...
//!
//! # Print the route table
//! campusgate routes --json
//!
//! # Settle a navigation against a persisted storage file
//! campusgate navigate /admin --storage ./storage.json
//!
//! # Clear one realm's persisted session
//! campusgate logout admin --storage ./storage.json
//! ```
//!
//! Configuration comes from `CAMPUSGATE_*` environment variables.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use campusgate_core::{GateConfig, Realm};

mod commands;

#[derive(Parser)]
#[command(name = "campusgate")]
#[command(author, version, about = "Navigation guard tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a credential's claims and expiry verdict
    Inspect {
        /// Credential to inspect
        credential: String,
    },
    /// Print the route table
    Routes {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Settle a navigation against persisted sessions
    Navigate {
        /// Requested path
        path: String,

        /// JSON key/value storage file
        #[arg(short, long)]
        storage: PathBuf,

        /// Report the first decision instead of following redirects
        #[arg(long)]
        no_follow: bool,
    },
    /// Clear a realm's persisted session
    Logout {
        /// Realm (`learner`, `instructor`, `admin`, `channel`)
        realm: Realm,

        /// JSON key/value storage file
        #[arg(short, long)]
        storage: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = GateConfig::from_env()?;
    campusgate_observability::init(&config.log);

    match cli.command {
        Commands::Inspect { credential } => commands::inspect::run(&config, &credential),
        Commands::Routes { json } => commands::routes::run(json),
        Commands::Navigate {
            path,
            storage,
            no_follow,
        } => commands::navigate::run(&config, &path, &storage, !no_follow).await,
        Commands::Logout { realm, storage } => commands::logout::run(realm, &storage),
    }
}
