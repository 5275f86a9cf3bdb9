//! Output module for sheet_schema
//!
//! This module turns a workbook into DBML text or diagram JSON.

pub mod dbml;
pub mod json;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::schema::{build_model, BuildContext, Diagnostic, RunClock, Severity};
use crate::sheet::Workbook;

// Re-export key types
pub use dbml::DbmlSerializer;
pub use json::{DiagramDocument, JsonSerializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Dbml,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Dbml => write!(f, "dbml"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "dbml" => Ok(OutputFormat::Dbml),
            "json" => Ok(OutputFormat::Json),
            other => Err(Error::ConfigError(format!("Unknown output format: {}", other))),
        }
    }
}

/// Result of one export run
#[derive(Debug, Clone)]
pub struct Export {
    pub content: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl Export {
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }
}

/// Runs parse, resolve, assemble and serialize once per call
pub struct Exporter<'a> {
    config: &'a Config,
    clock: Option<DateTime<Utc>>,
}

impl<'a> Exporter<'a> {
    /// Create a new exporter
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            clock: None,
        }
    }

    /// Pin the run timestamp instead of sampling the current time
    pub fn with_clock(mut self, at: DateTime<Utc>) -> Self {
        self.clock = Some(at);
        self
    }

    /// Export a workbook in the given format
    pub fn export(&self, workbook: &Workbook, format: OutputFormat) -> Result<Export> {
        let clock = match self.clock {
            Some(at) => RunClock::fixed(at),
            None => RunClock::now(),
        };
        let mut ctx = BuildContext::new(clock);

        let columns = match format {
            OutputFormat::Dbml => self.config.dbml_columns(),
            OutputFormat::Json => self.config.json_columns(),
        };
        let model = build_model(workbook, self.config, columns, &mut ctx);

        let content = match format {
            OutputFormat::Dbml => DbmlSerializer::new(&self.config.dbml).serialize(&model),
            OutputFormat::Json => JsonSerializer::new(&self.config.json).serialize(&model, &mut ctx)?,
        };

        tracing::info!(
            format = %format,
            identities = ctx.ids.issued(),
            warnings = ctx.diagnostics.warning_count(),
            "Export finished"
        );

        Ok(Export {
            content,
            diagnostics: ctx.diagnostics.into_vec(),
        })
    }

    pub fn dbml(&self, workbook: &Workbook) -> Result<Export> {
        self.export(workbook, OutputFormat::Dbml)
    }

    pub fn json(&self, workbook: &Workbook) -> Result<Export> {
        self.export(workbook, OutputFormat::Json)
    }
}
