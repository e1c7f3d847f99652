pub mod config;
pub mod gateway;
pub mod ingest; // File staging, validation, and upload lifecycle
pub mod models;
pub mod session; // Conversational session over a report
pub mod suggestions;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for embedders that do not install their own
/// subscriber. Safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();
}
