//! Configuration handling for sheet_schema

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Load configuration from a TOML (or YAML, by extension) file
pub fn load_from_file(path: &str) -> Result<Config> {
    let config_str = fs::read_to_string(path)
        .map_err(|e| Error::ConfigError(format!("Failed to read config file: {}", e)))?;

    let is_yaml = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let config: Config = if is_yaml {
        serde_yaml::from_str(&config_str)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config file: {}", e)))?
    } else {
        toml::from_str(&config_str)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config file: {}", e)))?
    };

    Ok(config)
}

/// Represents the complete sheet_schema configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub detection: DetectionConfig,
    pub columns: ColumnLayout,
    pub dbml: DbmlConfig,
    pub json: JsonConfig,
    pub layout: LayoutConfig,
    pub logging: Option<LoggingConfig>,
}

/// How table and enum boundaries are recognised in a sheet
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TableStrategy {
    /// A lone name cell followed by a "Logical name" header row
    #[default]
    HeaderLookahead,
    /// A colored row names a new table
    ColorBoundary,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EnumStrategy {
    /// Capitalised names start enums, everything else is a value
    #[default]
    Text,
    /// Colored rows start enums
    Color,
}

/// Sheet structure detection configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DetectionConfig {
    pub table_strategy: TableStrategy,
    pub enum_strategy: EnumStrategy,
    pub no_color: String,
    pub enum_sheet_pattern: String,
    pub skip_sheets: Vec<String>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            table_strategy: TableStrategy::default(),
            enum_strategy: EnumStrategy::default(),
            no_color: "#ffffff".to_string(),
            enum_sheet_pattern: "enum".to_string(),
            skip_sheets: Vec::new(),
        }
    }
}

impl DetectionConfig {
    /// Whether a sheet holds enum definitions
    pub fn is_enum_sheet(&self, sheet_name: &str) -> bool {
        !self.enum_sheet_pattern.is_empty()
            && sheet_name
                .to_lowercase()
                .contains(&self.enum_sheet_pattern.to_lowercase())
    }

    /// Whether a sheet is excluded from the export
    pub fn is_skipped(&self, sheet_name: &str) -> bool {
        self.skip_sheets.iter().any(|s| s.trim() == sheet_name.trim())
    }
}

/// Positional column layout of a table sheet
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ColumnLayout {
    pub name: usize,
    pub optional_flag: usize,
    pub field_type: usize,
    pub relation: usize,
    pub constraints: usize,
    pub description: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            name: 0,
            optional_flag: 1,
            field_type: 2,
            relation: 3,
            constraints: 4,
            description: 5,
        }
    }
}

/// DBML output configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct DbmlConfig {
    pub qualify_schema: bool,
    pub columns: Option<ColumnLayout>,
}

/// Diagram JSON output configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct JsonConfig {
    pub diagram_name: Option<String>,
    pub database_type: String,
    pub columns: Option<ColumnLayout>,
}

impl Default for JsonConfig {
    fn default() -> Self {
        Self {
            diagram_name: None,
            database_type: "postgresql".to_string(),
            columns: None,
        }
    }
}

/// Placeholder grid layout for diagram output
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LayoutConfig {
    pub tables_per_row: usize,
    pub column_spacing: f64,
    pub row_spacing: f64,
    pub table_width: f64,
    pub area_padding: f64,
    pub area_gap: f64,
    pub palette: Vec<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            tables_per_row: 4,
            column_spacing: 350.0,
            row_spacing: 450.0,
            table_width: 250.0,
            area_padding: 50.0,
            area_gap: 150.0,
            palette: vec![
                "#8eb7ff".to_string(),
                "#ff9f74".to_string(),
                "#7be1ad".to_string(),
                "#ffe374".to_string(),
                "#c49cf4".to_string(),
                "#ff6b8a".to_string(),
            ],
        }
    }
}

impl LayoutConfig {
    /// Palette color for the schema at `index`
    pub fn color(&self, index: usize) -> String {
        if self.palette.is_empty() {
            return "#8eb7ff".to_string();
        }
        self.palette[index % self.palette.len()].clone()
    }
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub format: String,
    pub stdout: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
            format: "text".to_string(),
            stdout: false,
        }
    }
}

impl Config {
    /// Column layout used when producing DBML
    pub fn dbml_columns(&self) -> ColumnLayout {
        self.dbml.columns.unwrap_or(self.columns)
    }

    /// Column layout used when producing diagram JSON
    pub fn json_columns(&self) -> ColumnLayout {
        self.json.columns.unwrap_or(self.columns)
    }
}
