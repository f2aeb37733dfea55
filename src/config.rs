use std::path::PathBuf;

use crate::error::AnalyticsError;
use crate::reference::ReferenceTables;

/// Application-level constants
pub const APP_NAME: &str = "HealthScope";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Directory holding an optional `reference_tables.json` override.
pub const REFERENCE_DIR_ENV: &str = "HEALTHSCOPE_REFERENCE_DIR";

/// Log filter used when `RUST_LOG` is not set
pub fn default_log_filter() -> &'static str {
    "healthscope=info"
}

/// Reference directory from the environment, if configured
pub fn reference_dir() -> Option<PathBuf> {
    std::env::var_os(REFERENCE_DIR_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Tables to run with: the override file when a reference directory is
/// configured, the published defaults otherwise.
pub fn load_reference_tables() -> Result<ReferenceTables, AnalyticsError> {
    match reference_dir() {
        Some(dir) => ReferenceTables::load(&dir),
        None => Ok(ReferenceTables::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_name_is_healthscope() {
        assert_eq!(APP_NAME, "HealthScope");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn log_filter_targets_crate() {
        assert!(default_log_filter().starts_with("healthscope"));
    }
}
