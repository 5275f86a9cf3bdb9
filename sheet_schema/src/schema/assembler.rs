//! Model assembly
//!
//! Runs the parse and resolve passes over a workbook and gathers the result
//! into one `SchemaModel`, with a placeholder grid layout for diagrams.

use std::collections::HashSet;

use crate::config::{ColumnLayout, Config, LayoutConfig};
use crate::schema::context::BuildContext;
use crate::schema::enum_parser::EnumParser;
use crate::schema::resolver::resolve_relationships;
use crate::schema::table_parser::TableParser;
use crate::schema::types::{Area, Enum, Relationship, SchemaModel, Table};
use crate::sheet::{enum_detector, table_detector, Workbook};

/// Parse, resolve and assemble a workbook into a model
pub fn build_model(
    workbook: &Workbook,
    config: &Config,
    columns: ColumnLayout,
    ctx: &mut BuildContext,
) -> SchemaModel {
    let detection = &config.detection;
    let enum_strategy = enum_detector(detection);
    let table_strategy = table_detector(detection, columns);

    let sheets: Vec<_> = workbook
        .sheets
        .iter()
        .filter(|sheet| {
            let skipped = detection.is_skipped(&sheet.name);
            if skipped {
                tracing::debug!(sheet = %sheet.name, "Skipping sheet");
            }
            !skipped
        })
        .collect();

    // Enums first so table fields can check their enum references
    let mut enum_names = HashSet::new();
    let mut enums = Vec::new();
    let enum_parser = EnumParser::new(enum_strategy.as_ref());
    for sheet in sheets.iter().filter(|s| detection.is_enum_sheet(&s.name)) {
        enums.extend(enum_parser.parse(sheet, &mut enum_names, ctx));
    }

    let mut schemas = Vec::new();
    let mut parsed = Vec::new();
    let table_parser = TableParser::new(table_strategy.as_ref(), columns, &enum_names);
    for sheet in sheets.iter().filter(|s| !detection.is_enum_sheet(&s.name)) {
        let schema = sheet.name.trim().to_string();
        if !schemas.contains(&schema) {
            schemas.push(schema);
        }
        parsed.extend(table_parser.parse(sheet, ctx));
    }

    let (tables, relationships) = resolve_relationships(parsed, ctx);

    let name = config
        .json
        .diagram_name
        .clone()
        .or_else(|| workbook.name.clone())
        .unwrap_or_else(|| "Schema".to_string());

    assemble(name, &schemas, enums, tables, relationships, &config.layout, ctx)
}

/// Gather the parsed pieces into a model and lay the tables out on a grid
///
/// Each schema gets a block of `tables_per_row` columns, stacked vertically,
/// and one area framing that block.
pub fn assemble(
    name: String,
    schemas: &[String],
    enums: Vec<Enum>,
    mut tables: Vec<Table>,
    relationships: Vec<Relationship>,
    layout: &LayoutConfig,
    ctx: &mut BuildContext,
) -> SchemaModel {
    let per_row = layout.tables_per_row.max(1);
    let mut areas = Vec::with_capacity(schemas.len());
    let mut block_y = 0.0;

    for (schema_index, schema) in schemas.iter().enumerate() {
        let color = layout.color(schema_index);
        let mut count = 0usize;

        for table in tables.iter_mut().filter(|t| &t.schema == schema) {
            let col = (count % per_row) as f64;
            let row = (count / per_row) as f64;
            table.placement.x = layout.area_padding + col * layout.column_spacing;
            table.placement.y = block_y + layout.area_padding + row * layout.row_spacing;
            table.placement.width = layout.table_width;
            table.placement.color = color.clone();
            count += 1;
        }

        let cols = count.clamp(1, per_row) as f64;
        let rows = count.div_ceil(per_row).max(1) as f64;
        let width = 2.0 * layout.area_padding + (cols - 1.0) * layout.column_spacing + layout.table_width;
        let height = 2.0 * layout.area_padding + rows * layout.row_spacing;

        areas.push(Area {
            id: ctx.next_id(),
            name: schema.clone(),
            color,
            x: 0.0,
            y: block_y,
            width,
            height,
        });

        block_y += height + layout.area_gap;
    }

    tracing::info!(
        tables = tables.len(),
        relationships = relationships.len(),
        enums = enums.len(),
        areas = areas.len(),
        "Assembled schema model"
    );

    SchemaModel {
        name,
        tables,
        relationships,
        enums,
        areas,
    }
}
