//! Table sheet parser
//!
//! Walks one sheet top to bottom. A detected table start opens a table,
//! every following row is a field, a continuation of the previous field's
//! description, or a header row to skip.

use std::collections::HashSet;

use crate::config::ColumnLayout;
use crate::schema::context::BuildContext;
use crate::schema::diagnostics::DiagnosticKind;
use crate::schema::type_mapper::map_type;
use crate::schema::types::{
    Field, NormalizedType, ParsedTable, RelationIntent, Table, MAX_NUMERIC_DIGITS,
};
use crate::sheet::{is_header_row, Sheet, TableStartDetector};
use crate::utils::naming::sanitize_identifier;

/// What a relation cell asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationSpec {
    None,
    ForeignKey { table: String, field: String },
    EnumRef(String),
    Unrecognized,
}

/// Parse a relation cell such as `ForeignKey, Agency.id` or `Enum, Status`
pub fn parse_relation(cell: &str) -> RelationSpec {
    let cell = cell.trim();
    if cell.is_empty() {
        return RelationSpec::None;
    }

    let (kind, target) = match cell.split_once(',') {
        Some((kind, target)) => (kind.trim().to_lowercase().replace(' ', ""), target.trim()),
        None => return RelationSpec::Unrecognized,
    };

    if target.is_empty() {
        return RelationSpec::Unrecognized;
    }

    if kind.starts_with("foreignkey") {
        let (table, field) = match target.split_once('.') {
            Some((table, field)) if !field.trim().is_empty() => (table.trim(), field.trim()),
            Some((table, _)) => (table.trim(), "id"),
            None => (target, "id"),
        };
        return RelationSpec::ForeignKey {
            table: table.to_string(),
            field: field.to_string(),
        };
    }

    if kind == "enum" || kind == "base" {
        return RelationSpec::EnumRef(sanitize_identifier(target));
    }

    RelationSpec::Unrecognized
}

/// Flags read from the constraints column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Constraints {
    pub unique: bool,
    pub increment: bool,
}

/// Parse a constraints cell such as `unique, increment`
///
/// Words are matched whole; a word preceded by `no`, `not` or `non` does not
/// count.
pub fn parse_constraints(cell: &str) -> Constraints {
    let lower = cell.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let has = |names: &[&str]| {
        words.iter().enumerate().any(|(i, word)| {
            names.contains(word)
                && !(i > 0 && matches!(words[i - 1], "no" | "not" | "non"))
        })
    };

    Constraints {
        unique: has(&["unique"]),
        increment: has(&["increment", "autoincrement", "serial"]),
    }
}

/// Table being filled while its rows are scanned
struct OpenTable {
    parsed: ParsedTable,
    field_names: HashSet<String>,
    /// Index of the field continuation rows attach to
    last_field: Option<usize>,
}

impl OpenTable {
    fn finish(mut self) -> ParsedTable {
        self.parsed.table.finalize();
        self.parsed
    }
}

/// Parser for table regions
pub struct TableParser<'a> {
    detector: &'a dyn TableStartDetector,
    columns: ColumnLayout,
    known_enums: &'a HashSet<String>,
}

impl<'a> TableParser<'a> {
    pub fn new(
        detector: &'a dyn TableStartDetector,
        columns: ColumnLayout,
        known_enums: &'a HashSet<String>,
    ) -> Self {
        Self {
            detector,
            columns,
            known_enums,
        }
    }

    /// Parse every table in the sheet; the sheet name is the schema
    pub fn parse(&self, sheet: &Sheet, ctx: &mut BuildContext) -> Vec<ParsedTable> {
        let schema = sheet.name.trim();
        let mut tables = Vec::new();
        let mut table_names = HashSet::new();
        let mut current: Option<OpenTable> = None;

        let mut row = 0;
        while row < sheet.row_count() {
            if let Some(start) = self.detector.detect(sheet, row) {
                if let Some(open) = current.take() {
                    tables.push(open.finish());
                }

                if !table_names.insert(start.name.clone()) {
                    ctx.diagnostics.report(
                        DiagnosticKind::DuplicateTable,
                        format!(
                            "Table '{}' appears more than once in schema '{}'; references resolve to the first",
                            start.name, schema
                        ),
                    );
                }

                tracing::debug!(schema = %schema, table = %start.name, row = row + 1, "Table start");
                current = Some(OpenTable {
                    parsed: ParsedTable {
                        table: Table::new(ctx.next_id(), schema, &start.name),
                        intents: Vec::new(),
                    },
                    field_names: HashSet::new(),
                    last_field: None,
                });
                row += start.rows_consumed.max(1);
                continue;
            }

            if let Some(open) = current.as_mut() {
                self.parse_row(sheet, row, open, ctx);
            }
            row += 1;
        }

        if let Some(open) = current.take() {
            tables.push(open.finish());
        }

        tracing::debug!(schema = %schema, count = tables.len(), "Parsed table sheet");
        tables
    }

    fn parse_row(&self, sheet: &Sheet, row: usize, open: &mut OpenTable, ctx: &mut BuildContext) {
        let cells = sheet.row(row);
        if is_header_row(cells, &self.columns) {
            return;
        }

        let name = sheet.cell(row, self.columns.name).trim();
        if name.is_empty() {
            let line = sheet.cell(row, self.columns.description).trim();
            if line.is_empty() {
                return;
            }
            if let Some(index) = open.last_field {
                let field = &mut open.parsed.table.fields[index];
                if field.description.is_empty() {
                    field.description = line.to_string();
                } else {
                    field.description.push('\n');
                    field.description.push_str(line);
                }
            }
            return;
        }

        let table = &open.parsed.table;
        if !open.field_names.insert(name.to_string()) {
            ctx.diagnostics.report(
                DiagnosticKind::DuplicateField,
                format!(
                    "Field '{}' repeats in table '{}.{}' (row {}); keeping the first",
                    name,
                    table.schema,
                    table.name,
                    row + 1
                ),
            );
            open.last_field = None;
            return;
        }

        let (field, intent) = self.parse_field(sheet, row, name, table, ctx);
        if let Some(intent) = intent {
            open.parsed.intents.push(intent);
        }
        open.parsed.table.add_field(field);
        open.last_field = Some(open.parsed.table.fields.len() - 1);
    }

    fn parse_field(
        &self,
        sheet: &Sheet,
        row: usize,
        name: &str,
        table: &Table,
        ctx: &mut BuildContext,
    ) -> (Field, Option<RelationIntent>) {
        let cols = &self.columns;
        let id = ctx.next_id();

        let required = sheet.cell(row, cols.optional_flag).trim().eq_ignore_ascii_case("n");
        let primary_key = name.eq_ignore_ascii_case("id");
        let constraints = parse_constraints(sheet.cell(row, cols.constraints));

        let raw_type = sheet.cell(row, cols.field_type).trim();
        let mut data_type = map_type(raw_type);
        if data_type.is_fallback() && !raw_type.is_empty() {
            ctx.diagnostics.report(
                DiagnosticKind::UnknownType,
                format!(
                    "Type '{}' of '{}.{}' is not recognised; passed through as-is",
                    raw_type, table.name, name
                ),
            );
        }
        if let NormalizedType::Numeric { precision, scale, .. } = &data_type {
            let too_wide = |v: &Option<u32>| v.map_or(false, |v| v > MAX_NUMERIC_DIGITS);
            if too_wide(precision) || too_wide(scale) {
                ctx.diagnostics.report(
                    DiagnosticKind::UnknownType,
                    format!(
                        "Type '{}' of '{}.{}' exceeds {} digits; diagram output is clamped",
                        raw_type, table.name, name, MAX_NUMERIC_DIGITS
                    ),
                );
            }
        }

        let mut intent = None;
        let relation_cell = sheet.cell(row, cols.relation);
        match parse_relation(relation_cell) {
            RelationSpec::None => {}
            RelationSpec::ForeignKey { table: target_table, field: target_field } => {
                intent = Some(RelationIntent {
                    source_field: id,
                    target_table,
                    target_field,
                });
            }
            RelationSpec::EnumRef(enum_name) => {
                if !self.known_enums.contains(&enum_name) {
                    ctx.diagnostics.report(
                        DiagnosticKind::UnknownEnum,
                        format!(
                            "Field '{}.{}' references undeclared enum '{}'",
                            table.name, name, enum_name
                        ),
                    );
                }
                data_type = NormalizedType::Enum(enum_name);
            }
            RelationSpec::Unrecognized => {
                ctx.diagnostics.report(
                    DiagnosticKind::UnrecognizedRelation,
                    format!(
                        "Relation '{}' on '{}.{}' is neither a foreign key nor an enum",
                        relation_cell.trim(),
                        table.name,
                        name
                    ),
                );
            }
        }

        let field = Field {
            id,
            name: name.to_string(),
            data_type,
            nullable: !required && !primary_key,
            primary_key,
            unique: constraints.unique,
            increment: constraints.increment,
            description: sheet.cell(row, cols.description).trim().to_string(),
        };

        (field, intent)
    }
}
