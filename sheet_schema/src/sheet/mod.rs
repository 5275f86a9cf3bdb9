//! Sheet module for sheet_schema
//!
//! This module holds the input boundary: workbook grids and the strategies
//! that find structure in them.

pub mod detect;
pub mod grid;

// Re-export key types
pub use detect::{
    enum_detector, is_header_cell, is_header_row, table_detector, ColorBoundary, ColorHeuristic,
    EnumBoundaryDetector, HeaderLookahead, TableStart, TableStartDetector, TextHeuristic,
};
pub use grid::{Sheet, Workbook};
