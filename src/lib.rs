//! HealthScope: deterministic health analytics.
//!
//! Clinical risk calculators (Framingham, FINDRISC, metabolic syndrome),
//! time-series trends and anomaly flags, a composite wellness score, and a
//! concurrent dashboard that runs all of them over one user snapshot.
//! Every calculator is a pure function over plain records and a shared
//! `&ReferenceTables`.

pub mod config;
pub mod error;
pub mod insights;
pub mod models;
pub mod profile; // Profile Validator
pub mod reference; // Injectable coefficient & threshold tables
pub mod risk; // Cardiovascular, diabetes, metabolic syndrome
pub mod score; // Health Score Aggregator
pub mod trend; // Trend Analyzer + Anomaly Detector

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber filtered by `RUST_LOG`, falling back to
/// `config::default_log_filter()`. A second call is a no-op.
pub fn init_tracing() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
    }
}
