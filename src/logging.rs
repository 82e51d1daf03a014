//! Logging setup for applications embedding cache-helper.

use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::types::config::GeneralConfig;
use crate::{CacheHelperError, CacheHelperResult};

/// Builds the filter: `RUST_LOG` plus a `cache_helper=<level>` directive.
pub fn build_filter(log_level: &str) -> CacheHelperResult<EnvFilter> {
    let directive: Directive = format!("cache_helper={}", log_level)
        .parse()
        .map_err(|e| CacheHelperError::config(format!("invalid log level '{}': {}", log_level, e)))?;
    Ok(EnvFilter::from_default_env().add_directive(directive))
}

/// Installs a global subscriber writing to stderr.
///
/// `log_format = "json"` selects JSON lines; anything else is plain text.
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: &GeneralConfig) -> CacheHelperResult<()> {
    let filter = build_filter(&config.log_level)?;

    let result = if config.log_format.eq_ignore_ascii_case("json") {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .try_init()
    };

    result.map_err(|e| CacheHelperError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_levels() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            assert!(build_filter(level).is_ok(), "level {}", level);
        }
    }

    #[test]
    fn test_invalid_level_is_config_error() {
        let err = build_filter("loud").unwrap_err();
        assert!(matches!(err, CacheHelperError::Config(_)));
    }

    #[test]
    fn test_init_twice_fails() {
        let config = GeneralConfig::default();
        // Another test may have installed a subscriber first; either way the
        // second attempt must fail.
        let _ = init_logging(&config);
        assert!(matches!(
            init_logging(&config),
            Err(CacheHelperError::Logging(_))
        ));
    }
}
