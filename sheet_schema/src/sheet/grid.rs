//! Workbook and sheet grids
//!
//! A workbook is what the spreadsheet host hands over: one rectangular grid
//! of cell text per sheet, optionally paired with a grid of background
//! colors.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// A set of sheets exported from the spreadsheet host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workbook {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

/// One sheet: cell text plus a parallel background color grid
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_grid")]
    pub values: Vec<Vec<String>>,
    #[serde(default, deserialize_with = "deserialize_grid")]
    pub backgrounds: Vec<Vec<String>>,
}

impl Workbook {
    /// Parse a workbook from its JSON export
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::WorkbookError(format!("Failed to parse workbook: {}", e)))
    }

    /// Read a workbook JSON export from disk
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let mut workbook = Self::from_json_str(&json)?;

        if workbook.name.is_none() {
            workbook.name = file_stem(path.as_ref());
        }

        Ok(workbook)
    }

    /// Build a workbook with one sheet per CSV file, named after the file stem
    ///
    /// CSV carries no colors, so only the text-based strategies apply.
    pub fn from_csv_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut sheets = Vec::with_capacity(paths.len());

        for path in paths {
            let path = path.as_ref();
            let name = file_stem(path).ok_or_else(|| {
                Error::WorkbookError(format!("Cannot derive a sheet name from {}", path.display()))
            })?;

            let mut reader = csv::ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_path(path)?;

            let mut values = Vec::new();
            for record in reader.records() {
                let record = record?;
                values.push(record.iter().map(str::to_string).collect());
            }

            sheets.push(Sheet {
                name,
                values,
                backgrounds: Vec::new(),
            });
        }

        Ok(Self { name: None, sheets })
    }
}

impl Sheet {
    /// Create a sheet with text only
    pub fn new(name: &str, values: Vec<Vec<String>>) -> Self {
        Self {
            name: name.to_string(),
            values,
            backgrounds: Vec::new(),
        }
    }

    /// Attach a background color grid
    pub fn with_backgrounds(mut self, backgrounds: Vec<Vec<String>>) -> Self {
        self.backgrounds = backgrounds;
        self
    }

    pub fn row_count(&self) -> usize {
        self.values.len()
    }

    /// Cell text, empty when the row or column is out of range
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.values
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Row cells, empty when out of range
    pub fn row(&self, row: usize) -> &[String] {
        self.values.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Background color of a row, taken from its first cell
    pub fn background(&self, row: usize) -> &str {
        self.backgrounds
            .get(row)
            .and_then(|r| r.first())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Whether a row's background differs from the "no color" marker
    pub fn is_colored(&self, row: usize, no_color: &str) -> bool {
        let color = self.background(row).trim();
        !color.is_empty() && !color.eq_ignore_ascii_case(no_color.trim())
    }

    /// Number of non-empty cells in a row
    pub fn non_empty_count(&self, row: usize) -> usize {
        self.row(row).iter().filter(|c| !c.trim().is_empty()).count()
    }

    /// First non-empty cell of a row, trimmed
    pub fn first_non_empty(&self, row: usize) -> Option<&str> {
        self.row(row)
            .iter()
            .map(|c| c.trim())
            .find(|c| !c.is_empty())
    }
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
}

/// Cells arrive as whatever the host produced: strings, numbers, booleans or nulls
fn deserialize_grid<'de, D>(deserializer: D) -> std::result::Result<Vec<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<Vec<serde_json::Value>> = Vec::deserialize(deserializer)?;

    Ok(raw
        .into_iter()
        .map(|row| row.into_iter().map(cell_to_string).collect())
        .collect())
}

fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}
