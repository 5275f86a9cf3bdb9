//! Structural detection strategies
//!
//! Sheets encode structure through row coloring or fixed row patterns. Each
//! way of reading that structure is a strategy picked once per run.

use crate::config::{ColumnLayout, DetectionConfig, EnumStrategy, TableStrategy};
use crate::sheet::grid::Sheet;

/// A detected table start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStart {
    pub name: String,
    /// Rows belonging to the start marker, including any header row
    pub rows_consumed: usize,
}

/// Recognises the row that opens a new table
pub trait TableStartDetector {
    fn detect(&self, sheet: &Sheet, row: usize) -> Option<TableStart>;
}

/// Recognises the row that opens a new enum
pub trait EnumBoundaryDetector {
    fn is_boundary(&self, sheet: &Sheet, row: usize) -> bool;
}

/// A row with a single name cell, immediately followed by a "Logical name" header row
#[derive(Debug, Default)]
pub struct HeaderLookahead;

impl TableStartDetector for HeaderLookahead {
    fn detect(&self, sheet: &Sheet, row: usize) -> Option<TableStart> {
        if sheet.non_empty_count(row) != 1 || row + 1 >= sheet.row_count() {
            return None;
        }

        if !sheet.cell(row + 1, 0).to_lowercase().contains("logical") {
            return None;
        }

        sheet.first_non_empty(row).map(|name| TableStart {
            name: name.to_string(),
            rows_consumed: 2,
        })
    }
}

/// A colored row that is not a header row, named by its first cell
#[derive(Debug)]
pub struct ColorBoundary {
    no_color: String,
    columns: ColumnLayout,
}

impl ColorBoundary {
    pub fn new(no_color: &str, columns: ColumnLayout) -> Self {
        Self {
            no_color: no_color.to_string(),
            columns,
        }
    }
}

impl TableStartDetector for ColorBoundary {
    fn detect(&self, sheet: &Sheet, row: usize) -> Option<TableStart> {
        if !sheet.is_colored(row, &self.no_color) || is_header_row(sheet.row(row), &self.columns) {
            return None;
        }

        let name = sheet.cell(row, 0).trim();
        if name.is_empty() {
            return None;
        }

        Some(TableStart {
            name: name.to_string(),
            rows_consumed: 1,
        })
    }
}

/// A capitalised name (not an all-caps value) opens an enum
#[derive(Debug, Default)]
pub struct TextHeuristic;

impl EnumBoundaryDetector for TextHeuristic {
    fn is_boundary(&self, sheet: &Sheet, row: usize) -> bool {
        match sheet.first_non_empty(row) {
            Some(cell) => {
                cell.chars().next().map_or(false, char::is_uppercase)
                    && cell.chars().any(char::is_lowercase)
            }
            None => false,
        }
    }
}

/// A colored, non-empty row opens an enum
#[derive(Debug)]
pub struct ColorHeuristic {
    no_color: String,
}

impl ColorHeuristic {
    pub fn new(no_color: &str) -> Self {
        Self {
            no_color: no_color.to_string(),
        }
    }
}

impl EnumBoundaryDetector for ColorHeuristic {
    fn is_boundary(&self, sheet: &Sheet, row: usize) -> bool {
        sheet.first_non_empty(row).is_some() && sheet.is_colored(row, &self.no_color)
    }
}

/// Header caption as found in the name or type column
pub fn is_header_cell(cell: &str) -> bool {
    let cell = cell.to_lowercase();
    cell.contains("logical name") || cell.contains("field type")
}

/// Column header rows are skipped wherever they appear
///
/// Only the name and type columns are looked at, so free text elsewhere in
/// a field row never turns it into a header.
pub fn is_header_row(cells: &[String], columns: &ColumnLayout) -> bool {
    [columns.name, columns.field_type]
        .iter()
        .filter_map(|&col| cells.get(col))
        .any(|cell| is_header_cell(cell))
}

/// Table detector selected by configuration
pub fn table_detector(config: &DetectionConfig, columns: ColumnLayout) -> Box<dyn TableStartDetector> {
    match config.table_strategy {
        TableStrategy::HeaderLookahead => Box::new(HeaderLookahead),
        TableStrategy::ColorBoundary => Box::new(ColorBoundary::new(&config.no_color, columns)),
    }
}

/// Enum detector selected by configuration
pub fn enum_detector(config: &DetectionConfig) -> Box<dyn EnumBoundaryDetector> {
    match config.enum_strategy {
        EnumStrategy::Text => Box::new(TextHeuristic),
        EnumStrategy::Color => Box::new(ColorHeuristic::new(&config.no_color)),
    }
}
