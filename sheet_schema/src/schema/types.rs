//! Type definitions for the inferred schema model

use serde::{Serialize, Serializer};
use std::fmt;

/// Opaque entity identity, unique within one export run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u64);

impl Id {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identities always leave the process as strings
impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Scalar type families recognised by the type mapper
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarKind {
    Text,
    Integer,
    BigInt,
    Timestamp,
    Date,
    Boolean,
    Money,
    /// Unrecognised token, named by its text up to any `(`
    Other(String),
}

/// Largest numeric precision or scale the diagram format accepts
pub const MAX_NUMERIC_DIGITS: u32 = 999;

/// Normalized column type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedType {
    Scalar { kind: ScalarKind, raw: String },
    Numeric {
        precision: Option<u32>,
        scale: Option<u32>,
        raw: String,
    },
    Enum(String),
}

impl NormalizedType {
    /// The raw sheet token this type was mapped from
    pub fn raw(&self) -> &str {
        match self {
            NormalizedType::Scalar { raw, .. } | NormalizedType::Numeric { raw, .. } => raw,
            NormalizedType::Enum(name) => name,
        }
    }

    /// Whether the token was not recognised and fell back to a best-effort name
    pub fn is_fallback(&self) -> bool {
        matches!(
            self,
            NormalizedType::Scalar {
                kind: ScalarKind::Other(_),
                ..
            }
        )
    }
}

/// A column of a table
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub id: Id,
    pub name: String,
    pub data_type: NormalizedType,
    pub nullable: bool,
    pub primary_key: bool,
    pub unique: bool,
    pub increment: bool,
    pub description: String,
}

/// Diagram placement assigned by the assembler
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub color: String,
}

/// A table parsed from one schema region
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub id: Id,
    pub schema: String,
    pub name: String,
    pub fields: Vec<Field>,
    /// Fields flagged as primary key, in field order
    pub primary_key: Vec<Id>,
    pub placement: Placement,
}

impl Table {
    /// Create a new empty table
    pub fn new(id: Id, schema: &str, name: &str) -> Self {
        Self {
            id,
            schema: schema.to_string(),
            name: name.to_string(),
            fields: Vec::new(),
            primary_key: Vec::new(),
            placement: Placement::default(),
        }
    }

    /// Add a field to the table
    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    pub fn field(&self, id: Id) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Derive the primary-key index from the flagged fields
    pub fn finalize(&mut self) {
        self.primary_key = self
            .fields
            .iter()
            .filter(|f| f.primary_key)
            .map(|f| f.id)
            .collect();
    }
}

/// A named enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enum {
    pub id: Id,
    pub name: String,
    pub values: Vec<String>,
}

/// An unresolved foreign-key reference recorded while parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationIntent {
    pub source_field: Id,
    pub target_table: String,
    pub target_field: String,
}

/// A table together with the foreign keys it still has to resolve
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTable {
    pub table: Table,
    pub intents: Vec<RelationIntent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

impl Cardinality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinality::One => "one",
            Cardinality::Many => "many",
        }
    }
}

/// A resolved foreign key
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub id: Id,
    pub source_schema: String,
    pub source_table: Id,
    pub source_field: Id,
    pub target_schema: String,
    pub target_table: Id,
    pub target_field: Id,
    pub source_cardinality: Cardinality,
    pub target_cardinality: Cardinality,
}

/// A visual grouping rectangle, one per schema region
#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    pub id: Id,
    pub name: String,
    pub color: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// The complete model built by one export run
#[derive(Debug, Clone, Default)]
pub struct SchemaModel {
    pub name: String,
    pub tables: Vec<Table>,
    pub relationships: Vec<Relationship>,
    pub enums: Vec<Enum>,
    pub areas: Vec<Area>,
}

impl SchemaModel {
    pub fn table(&self, id: Id) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == id)
    }

    /// Relationships whose source is the given table
    pub fn relationships_from(&self, table: Id) -> impl Iterator<Item = &Relationship> {
        self.relationships
            .iter()
            .filter(move |r| r.source_table == table)
    }

    pub fn enum_by_name(&self, name: &str) -> Option<&Enum> {
        self.enums.iter().find(|e| e.name == name)
    }
}
