//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins when set; otherwise the configured level is applied.

use tracing_subscriber::EnvFilter;

/// Build the filter used by [`init`].
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install the global fmt subscriber. Later calls are ignored.
pub fn init(default_level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_default_level_applies_without_rust_log() {
        let saved = std::env::var("RUST_LOG").ok();
        std::env::remove_var("RUST_LOG");
        let filter = env_filter("warn");
        if let Some(value) = saved {
            std::env::set_var("RUST_LOG", value);
        }
        assert_eq!(filter.to_string(), "warn");
    }
}
