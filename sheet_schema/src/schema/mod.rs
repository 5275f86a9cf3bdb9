//! Schema module for sheet_schema
//!
//! This module infers the schema model from sheets: type mapping, enum and
//! table parsing, foreign-key resolution and assembly.

pub mod assembler;
pub mod context;
pub mod diagnostics;
pub mod enum_parser;
pub mod resolver;
pub mod table_parser;
pub mod type_mapper;
pub mod types;

// Re-export key types
pub use assembler::{assemble, build_model};
pub use context::{BuildContext, IdGenerator, RunClock};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use enum_parser::EnumParser;
pub use resolver::{resolve_relationships, TableIndex};
pub use table_parser::{parse_constraints, parse_relation, Constraints, RelationSpec, TableParser};
pub use type_mapper::map_type;
pub use types::{
    Area, Cardinality, Enum, Field, Id, NormalizedType, ParsedTable, Placement,
    RelationIntent, Relationship, ScalarKind, SchemaModel, Table, MAX_NUMERIC_DIGITS,
};
