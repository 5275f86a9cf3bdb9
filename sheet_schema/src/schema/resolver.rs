//! Foreign-key resolution
//!
//! Second pass over the parsed tables: every recorded foreign-key intent is
//! looked up by name within its own schema and turned into a many-to-one
//! relationship, or reported and dropped.

use indexmap::IndexMap;

use crate::schema::context::BuildContext;
use crate::schema::diagnostics::DiagnosticKind;
use crate::schema::types::{Cardinality, Id, ParsedTable, Relationship, Table};

/// Identity and field names of one table, keyed for lookup
#[derive(Debug, Clone)]
pub struct TableEntry {
    pub id: Id,
    pub schema: String,
    pub fields: IndexMap<String, Id>,
}

/// `(schema, table name)` lookup over all parsed tables
#[derive(Debug, Default)]
pub struct TableIndex {
    entries: IndexMap<(String, String), TableEntry>,
}

impl TableIndex {
    /// Index the tables; on repeated names the first table wins
    pub fn build<'a, I>(tables: I) -> Self
    where
        I: IntoIterator<Item = &'a Table>,
    {
        let mut entries = IndexMap::new();

        for table in tables {
            entries
                .entry((table.schema.clone(), table.name.clone()))
                .or_insert_with(|| TableEntry {
                    id: table.id,
                    schema: table.schema.clone(),
                    fields: table
                        .fields
                        .iter()
                        .map(|f| (f.name.clone(), f.id))
                        .collect(),
                });
        }

        Self { entries }
    }

    pub fn lookup(&self, schema: &str, name: &str) -> Option<&TableEntry> {
        self.entries.get(&(schema.to_string(), name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve all intents, consuming them
///
/// Returns the tables stripped of their intents, and the relationships in
/// intent order.
pub fn resolve_relationships(
    parsed: Vec<ParsedTable>,
    ctx: &mut BuildContext,
) -> (Vec<Table>, Vec<Relationship>) {
    let index = TableIndex::build(parsed.iter().map(|p| &p.table));
    let mut relationships = Vec::new();
    let mut tables = Vec::with_capacity(parsed.len());

    for ParsedTable { table, intents } in parsed {
        for intent in intents {
            let source_name = table
                .field(intent.source_field)
                .map(|f| f.name.as_str())
                .unwrap_or("?");

            let Some(target) = index.lookup(&table.schema, &intent.target_table) else {
                ctx.diagnostics.report(
                    DiagnosticKind::UnresolvedTable,
                    format!(
                        "{}.{}.{} references missing table '{}' in schema '{}'",
                        table.schema, table.name, source_name, intent.target_table, table.schema
                    ),
                );
                continue;
            };

            let Some(&target_field) = target.fields.get(&intent.target_field) else {
                ctx.diagnostics.report(
                    DiagnosticKind::UnresolvedField,
                    format!(
                        "{}.{}.{} references missing field '{}.{}'",
                        table.schema,
                        table.name,
                        source_name,
                        intent.target_table,
                        intent.target_field
                    ),
                );
                continue;
            };

            relationships.push(Relationship {
                id: ctx.next_id(),
                source_schema: table.schema.clone(),
                source_table: table.id,
                source_field: intent.source_field,
                target_schema: target.schema.clone(),
                target_table: target.id,
                target_field,
                source_cardinality: Cardinality::Many,
                target_cardinality: Cardinality::One,
            });
        }

        tables.push(table);
    }

    tracing::debug!(
        tables = tables.len(),
        relationships = relationships.len(),
        "Resolved relationships"
    );

    (tables, relationships)
}
