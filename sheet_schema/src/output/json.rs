//! Diagram JSON serializer
//!
//! Emits the strict document format read by the diagramming tool. Every
//! collection the tool's validator requires is present, even when empty,
//! and every identity is a string.

use serde::Serialize;

use crate::config::JsonConfig;
use crate::error::Result;
use crate::schema::context::BuildContext;
use crate::schema::type_mapper::declared_length;
use crate::schema::types::{
    Area, Enum, Field, Id, NormalizedType, Relationship, ScalarKind, SchemaModel, Table,
    MAX_NUMERIC_DIGITS,
};
use crate::utils::naming::to_key;

const DEFAULT_PRECISION: u32 = 10;
const DEFAULT_SCALE: u32 = 2;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramDocument {
    pub id: Id,
    pub name: String,
    pub database_type: String,
    pub tables: Vec<DiagramTable>,
    pub relationships: Vec<DiagramRelationship>,
    pub areas: Vec<DiagramArea>,
    pub custom_types: Vec<DiagramCustomType>,
    pub notes: Vec<serde_json::Value>,
    pub subject_areas: Vec<serde_json::Value>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramTable {
    pub id: Id,
    pub name: String,
    pub schema: String,
    pub color: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub fields: Vec<DiagramField>,
    pub indexes: Vec<DiagramIndex>,
    pub is_view: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramField {
    pub id: Id,
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataTypeRef,
    pub primary_key: bool,
    pub unique: bool,
    pub nullable: bool,
    pub increment: bool,
    pub default: Option<String>,
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_maximum_length: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTypeRef {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_attributes: Option<FieldAttributes>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_char_max_length: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<Bounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<Bounds>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bounds {
    pub min: u32,
    pub max: u32,
    pub default: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramIndex {
    pub id: Id,
    pub name: String,
    pub unique: bool,
    pub is_primary_key: bool,
    pub field_ids: Vec<Id>,
    pub created_at: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramRelationship {
    pub id: Id,
    pub name: String,
    pub source_schema: String,
    pub source_table_id: Id,
    pub source_field_id: Id,
    pub target_schema: String,
    pub target_table_id: Id,
    pub target_field_id: Id,
    pub source_cardinality: &'static str,
    pub target_cardinality: &'static str,
    pub created_at: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramArea {
    pub id: Id,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramCustomType {
    pub id: Id,
    pub name: String,
    pub kind: &'static str,
    pub values: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Diagram JSON generator
pub struct JsonSerializer<'a> {
    config: &'a JsonConfig,
}

impl<'a> JsonSerializer<'a> {
    /// Create a new diagram JSON serializer
    pub fn new(config: &'a JsonConfig) -> Self {
        Self { config }
    }

    /// Render the model as a pretty-printed document
    pub fn serialize(&self, model: &SchemaModel, ctx: &mut BuildContext) -> Result<String> {
        let document = self.document(model, ctx);
        Ok(serde_json::to_string_pretty(&document)?)
    }

    /// Build the document; index and document identities are issued from `ctx`
    pub fn document(&self, model: &SchemaModel, ctx: &mut BuildContext) -> DiagramDocument {
        let millis = ctx.clock.epoch_millis();

        let tables = model
            .tables
            .iter()
            .map(|table| self.table(table, millis, ctx))
            .collect();

        let relationships = model
            .relationships
            .iter()
            .filter_map(|rel| self.relationship(model, rel, millis))
            .collect();

        let areas = model.areas.iter().map(|a| area(a, millis)).collect();
        let custom_types = model.enums.iter().map(|e| custom_type(e, millis)).collect();

        let iso = ctx.clock.iso();
        DiagramDocument {
            id: ctx.next_id(),
            name: model.name.clone(),
            database_type: self.config.database_type.clone(),
            tables,
            relationships,
            areas,
            custom_types,
            notes: Vec::new(),
            subject_areas: Vec::new(),
            created_at: iso.clone(),
            updated_at: iso,
        }
    }

    fn table(&self, table: &Table, millis: i64, ctx: &mut BuildContext) -> DiagramTable {
        let mut indexes = Vec::new();
        if !table.primary_key.is_empty() {
            indexes.push(DiagramIndex {
                id: ctx.next_id(),
                name: format!("{}_pkey", to_key(&table.name)),
                unique: true,
                is_primary_key: true,
                field_ids: table.primary_key.clone(),
                created_at: millis,
            });
        }

        DiagramTable {
            id: table.id,
            name: table.name.clone(),
            schema: table.schema.clone(),
            color: table.placement.color.clone(),
            x: table.placement.x,
            y: table.placement.y,
            width: table.placement.width,
            fields: table.fields.iter().map(|f| field(f, millis)).collect(),
            indexes,
            is_view: false,
            created_at: millis,
            updated_at: millis,
        }
    }

    fn relationship(
        &self,
        model: &SchemaModel,
        rel: &Relationship,
        millis: i64,
    ) -> Option<DiagramRelationship> {
        let source = model.table(rel.source_table)?;
        let source_field = source.field(rel.source_field)?;

        Some(DiagramRelationship {
            id: rel.id,
            name: format!("{}_{}_fk", to_key(&source.name), to_key(&source_field.name)),
            source_schema: rel.source_schema.clone(),
            source_table_id: rel.source_table,
            source_field_id: rel.source_field,
            target_schema: rel.target_schema.clone(),
            target_table_id: rel.target_table,
            target_field_id: rel.target_field,
            source_cardinality: rel.source_cardinality.as_str(),
            target_cardinality: rel.target_cardinality.as_str(),
            created_at: millis,
        })
    }
}

fn field(field: &Field, millis: i64) -> DiagramField {
    let (precision, scale) = match &field.data_type {
        NormalizedType::Numeric {
            precision, scale, ..
        } => (
            Some(precision.unwrap_or(DEFAULT_PRECISION).clamp(1, MAX_NUMERIC_DIGITS)),
            Some(scale.unwrap_or(DEFAULT_SCALE).min(MAX_NUMERIC_DIGITS)),
        ),
        _ => (None, None),
    };

    let character_maximum_length = match &field.data_type {
        NormalizedType::Scalar {
            kind: ScalarKind::Text,
            raw,
        } => declared_length(raw),
        _ => None,
    };

    DiagramField {
        id: field.id,
        name: field.name.clone(),
        data_type: data_type_ref(&field.data_type),
        primary_key: field.primary_key,
        unique: field.unique,
        nullable: field.nullable,
        increment: field.increment,
        default: None,
        comment: field.description.clone(),
        character_maximum_length,
        precision,
        scale,
        created_at: millis,
    }
}

fn area(area: &Area, millis: i64) -> DiagramArea {
    DiagramArea {
        id: area.id,
        name: area.name.clone(),
        x: area.x,
        y: area.y,
        width: area.width,
        height: area.height,
        color: area.color.clone(),
        created_at: millis,
        updated_at: millis,
    }
}

fn custom_type(enum_def: &Enum, millis: i64) -> DiagramCustomType {
    DiagramCustomType {
        id: enum_def.id,
        name: enum_def.name.clone(),
        kind: "enum",
        values: enum_def.values.clone(),
        created_at: millis,
        updated_at: millis,
    }
}

/// Structured type descriptor, normalized to the tool's canonical names
pub fn data_type_ref(data_type: &NormalizedType) -> DataTypeRef {
    let simple = |name: &str| DataTypeRef {
        id: to_key(name),
        name: name.to_string(),
        field_attributes: None,
    };

    match data_type {
        NormalizedType::Numeric { .. } => DataTypeRef {
            id: "numeric".to_string(),
            name: "numeric".to_string(),
            field_attributes: Some(FieldAttributes {
                has_char_max_length: None,
                precision: Some(Bounds {
                    min: 1,
                    max: MAX_NUMERIC_DIGITS,
                    default: DEFAULT_PRECISION,
                }),
                scale: Some(Bounds {
                    min: 0,
                    max: MAX_NUMERIC_DIGITS,
                    default: DEFAULT_SCALE,
                }),
            }),
        },
        NormalizedType::Enum(name) => simple(name),
        NormalizedType::Scalar { kind, raw } => match kind {
            ScalarKind::Text => {
                let base = raw.split('(').next().unwrap_or("").trim().to_lowercase();
                let name = if base.is_empty() { "varchar".to_string() } else { base };
                DataTypeRef {
                    id: to_key(&name),
                    name,
                    field_attributes: Some(FieldAttributes {
                        has_char_max_length: Some(true),
                        precision: None,
                        scale: None,
                    }),
                }
            }
            ScalarKind::Integer if raw.to_lowercase().starts_with("smallint") => simple("smallint"),
            ScalarKind::Integer => simple("integer"),
            ScalarKind::BigInt => simple("bigint"),
            ScalarKind::Timestamp => simple("timestamp with time zone"),
            ScalarKind::Date => simple("date"),
            ScalarKind::Boolean => simple("boolean"),
            ScalarKind::Money => simple("money"),
            ScalarKind::Other(name) => simple(&name.to_lowercase()),
        },
    }
}
