//! Logging setup for the command-line tool.
//!
//! # Environment Variables
//!
//! - `LOG_FORMAT`: Output format, either `text` (default) or `json`
//! - `RUST_LOG`: Log level filter (default: `info`)
//!
//! Log lines go to stderr so that JSON and GeoJSON output on stdout stays
//! machine-readable.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable text logging.
    #[default]
    Text,
    /// JSON structured logging.
    Json,
}

impl LogFormat {
    /// Accepts "json", "text" or "pretty"; anything else is text.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Level filter used when `RUST_LOG` is unset or invalid.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        let format = std::env::var("LOG_FORMAT")
            .map(|v| LogFormat::parse(&v))
            .unwrap_or_default();
        let level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        Self { format, level }
    }

    /// Lower the default level to `warn` unless `RUST_LOG` says otherwise.
    pub fn quiet(mut self) -> Self {
        if std::env::var_os("RUST_LOG").is_none() {
            self.level = "warn".to_string();
        }
        self
    }
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);

    let _ = match config.format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_parsing() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("text"), LogFormat::Text);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Text);
        assert_eq!(LogFormat::parse("unknown"), LogFormat::Text);
    }

    #[test]
    fn default_config_is_text_at_info() {
        let config = LoggingConfig::default();
        assert_eq!(config.format, LogFormat::Text);
        assert_eq!(config.level, "info");
    }
}
