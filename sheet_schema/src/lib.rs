//! sheet_schema: infer a database schema from spreadsheet sheets
//!
//! Spreadsheets describe tables with loosely structured rows: a name row, a
//! header row, one row per field, colors marking boundaries. sheet_schema
//! infers tables, fields, enums and foreign keys from those rows and emits
//! either DBML text or a diagram JSON document from the same model.

pub mod config;
pub mod error;
pub mod output;
pub mod schema;
pub mod sheet;
pub mod utils;

#[cfg(test)]
mod test;

// Re-export main types for easier access
pub use config::Config;
pub use error::{Error, Result};
pub use output::{Export, Exporter, OutputFormat};
pub use schema::{Diagnostic, DiagnosticKind, SchemaModel, Severity};
pub use sheet::{Sheet, Workbook};

/// Export a workbook JSON file using the configuration file at `config_path`
pub fn export_file(
    workbook_path: &str,
    config_path: Option<&str>,
    format: OutputFormat,
) -> Result<Export> {
    let config = match config_path {
        Some(path) => config::load_from_file(path)?,
        None => Config::default(),
    };
    let workbook = Workbook::from_json_file(workbook_path)?;

    Exporter::new(&config).export(&workbook, format)
}
