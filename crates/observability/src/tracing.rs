//! Tracing/logging initialization.
//!
//! Output goes to stderr so command output on stdout stays machine-readable.

use campusgate_core::{LogConfig, LogFormat};
use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the process.
///
/// `RUST_LOG` takes precedence over the configured level. Safe to call
/// multiple times (subsequent calls are no-ops).
pub fn init(config: &LogConfig) {
    let filter = filter(config);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = match config.format {
        LogFormat::Json => builder
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .try_init(),
        LogFormat::Pretty => builder.compact().try_init(),
    };
}

fn filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let config = LogConfig::default();
        init(&config);
        init(&LogConfig {
            format: LogFormat::Json,
            ..config
        });
    }

    #[test]
    fn invalid_level_falls_back() {
        let config = LogConfig {
            level: "not a directive ===".to_string(),
            ..LogConfig::default()
        };
        // Must not panic regardless of RUST_LOG.
        let _ = filter(&config);
    }
}
