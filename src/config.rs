use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "MedLens";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Largest file accepted for staging (10 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Title attached to a submission when the user provides none.
pub const DEFAULT_REPORT_TITLE: &str = "Medical Report";

/// Interval between perceived-progress ticks while a submission is in flight.
pub const PROGRESS_TICK_INTERVAL: Duration = Duration::from_millis(200);

/// Percent added per progress tick.
pub const PROGRESS_TICK_STEP: u8 = 10;

/// Perceived progress holds here until the real result arrives.
pub const PROGRESS_CEILING: u8 = 90;

/// Fixed request timeout; the only local bound on how long a submission
/// or a pending reply may stay outstanding.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Base URL of the report API. `MEDLENS_API_URL` overrides for deployments.
pub fn default_base_url() -> String {
    std::env::var("MEDLENS_API_URL").unwrap_or_else(|_| "http://127.0.0.1:5000/api".to_string())
}

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> String {
    "info,medlens=debug".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_limit_is_ten_mib() {
        assert_eq!(MAX_UPLOAD_BYTES, 10 * 1024 * 1024);
    }

    #[test]
    fn progress_step_reaches_ceiling() {
        // Ceiling must be reachable by whole steps so the bar never jitters.
        assert_eq!(PROGRESS_CEILING % PROGRESS_TICK_STEP, 0);
        assert!(PROGRESS_CEILING < 100);
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
