//! Logging and request tracing config

use clap::Args;

/// Log line format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Single-line, human-readable.
    Compact,

    /// One JSON object per event, with the current span.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level or filter directives, e.g. `info` or `platter_app=debug`
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

impl LoggingConfig {
    /// Filter directives: the configured level, with chatty transport and
    /// database crates held at `warn`.
    #[must_use]
    pub fn filter_directives(&self) -> String {
        format!("{},h2=warn,hyper=warn,sqlx=warn", self.log_level)
    }
}

/// Request tracing settings.
#[derive(Debug, Args)]
pub struct ObservabilityConfig {
    /// Requests slower than this are logged at `warn`.
    #[arg(long, env = "SLOW_REQUEST_THRESHOLD_MS", default_value_t = 1_000_u64)]
    pub slow_request_threshold_ms: u64,
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use testresult::TestResult;

    use crate::config::ServerConfig;

    use super::*;

    #[test]
    fn json_format_and_threshold_from_flags() -> TestResult {
        let config = ServerConfig::try_parse_from([
            "platter-json",
            "--log-level",
            "debug",
            "--log-format",
            "json",
            "--slow-request-threshold-ms",
            "250",
        ])?;

        assert_eq!(config.logging.log_format, LogFormat::Json);
        assert_eq!(config.observability.slow_request_threshold_ms, 250);
        assert!(config.logging.filter_directives().starts_with("debug,"));
        assert!(config.logging.filter_directives().contains("sqlx=warn"));

        Ok(())
    }
}
