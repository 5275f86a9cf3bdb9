//! Logging utilities for sheet_schema
//!
//! This module provides logging setup and configuration.

use std::fs::File;
use std::path::Path;
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{Error, Result};

/// Parse a configured level name, defaulting to WARN
pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    }
}

/// Initialize logging based on configuration
///
/// Without a configuration, warnings go to stderr so that stdout stays free
/// for the exported document.
pub fn init_logging(config: &Option<LoggingConfig>) -> Result<()> {
    let config = config.clone().unwrap_or_default();
    let level = parse_level(&config.level);

    let directive: Directive = format!("sheet_schema={}", level)
        .parse()
        .map_err(|e| Error::LoggingError(format!("Invalid log directive: {}", e)))?;
    let env_filter = EnvFilter::from_default_env().add_directive(directive);
    let json = config.format.eq_ignore_ascii_case("json");

    let builder = fmt::Subscriber::builder().with_env_filter(env_filter);

    let result = if let Some(file_path) = &config.file {
        if let Some(parent) = Path::new(file_path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(file_path)?;

        if json {
            tracing::subscriber::set_global_default(builder.json().with_writer(file).finish())
        } else {
            tracing::subscriber::set_global_default(
                builder.with_ansi(false).with_writer(file).finish(),
            )
        }
    } else if config.stdout {
        if json {
            tracing::subscriber::set_global_default(builder.json().finish())
        } else {
            tracing::subscriber::set_global_default(builder.finish())
        }
    } else if json {
        tracing::subscriber::set_global_default(
            builder.json().with_writer(std::io::stderr).finish(),
        )
    } else {
        tracing::subscriber::set_global_default(builder.with_writer(std::io::stderr).finish())
    };

    result.map_err(|e| Error::LoggingError(e.to_string()))
}
