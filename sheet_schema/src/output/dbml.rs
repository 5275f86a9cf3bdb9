//! DBML serializer
//!
//! Enums first, then each table followed by the `Ref:` lines it owns.

use crate::config::DbmlConfig;
use crate::schema::types::{Enum, Field, NormalizedType, ScalarKind, SchemaModel, Table};
use crate::utils::naming::{dbml_identifier, escape_block_comment};

/// DBML text generator
pub struct DbmlSerializer<'a> {
    config: &'a DbmlConfig,
}

impl<'a> DbmlSerializer<'a> {
    /// Create a new DBML serializer
    pub fn new(config: &'a DbmlConfig) -> Self {
        Self { config }
    }

    /// Render the whole model
    pub fn serialize(&self, model: &SchemaModel) -> String {
        let mut blocks = Vec::new();

        for enum_def in &model.enums {
            blocks.push(self.enum_block(enum_def));
        }

        for table in &model.tables {
            let mut block = self.table_block(table);

            for rel in model.relationships_from(table.id) {
                let target = model.table(rel.target_table);
                let source_field = table.field(rel.source_field);
                let target_field = target.and_then(|t| t.field(rel.target_field));

                if let (Some(target), Some(source_field), Some(target_field)) =
                    (target, source_field, target_field)
                {
                    block.push_str(&format!(
                        "Ref: {}.{} > {}.{}\n",
                        self.table_name(table),
                        dbml_identifier(&source_field.name),
                        self.table_name(target),
                        dbml_identifier(&target_field.name)
                    ));
                }
            }

            blocks.push(block);
        }

        blocks.join("\n")
    }

    fn enum_block(&self, enum_def: &Enum) -> String {
        let mut out = format!("Enum {} {{\n", dbml_identifier(&enum_def.name));
        for value in &enum_def.values {
            out.push_str(&format!("  {}\n", dbml_identifier(value)));
        }
        out.push_str("}\n");
        out
    }

    fn table_block(&self, table: &Table) -> String {
        let mut out = format!("Table {} {{\n", self.table_name(table));
        for field in &table.fields {
            out.push_str(&self.field_line(field));
        }
        out.push_str("}\n");
        out
    }

    fn field_line(&self, field: &Field) -> String {
        let mut out = String::new();
        let description = field.description.trim();
        let multiline = description.contains('\n');

        if multiline {
            out.push_str("  /*\n");
            for line in description.lines() {
                out.push_str(&format!("    {}\n", escape_block_comment(line)));
            }
            out.push_str("  */\n");
        }

        out.push_str(&format!(
            "  {} {}",
            dbml_identifier(&field.name),
            render_type(&field.data_type)
        ));

        let settings = field_settings(field);
        if !settings.is_empty() {
            out.push_str(&format!(" [{}]", settings.join(", ")));
        }

        if !multiline && !description.is_empty() {
            out.push_str(&format!(" // {}", description));
        }

        out.push('\n');
        out
    }

    fn table_name(&self, table: &Table) -> String {
        if self.config.qualify_schema && !table.schema.is_empty() {
            format!(
                "{}.{}",
                dbml_identifier(&table.schema),
                dbml_identifier(&table.name)
            )
        } else {
            dbml_identifier(&table.name)
        }
    }
}

fn field_settings(field: &Field) -> Vec<&'static str> {
    let mut settings = Vec::new();
    if field.primary_key {
        settings.push("pk");
    }
    if field.increment {
        settings.push("increment");
    }
    if field.unique {
        settings.push("unique");
    }
    if !field.nullable {
        settings.push("not null");
    }
    settings
}

/// DBML keeps the sheet's literal token where it carries detail
pub fn render_type(data_type: &NormalizedType) -> String {
    let name = match data_type {
        NormalizedType::Numeric { raw, .. } => raw.clone(),
        NormalizedType::Enum(name) => return dbml_identifier(name),
        NormalizedType::Scalar { kind, raw } => match kind {
            ScalarKind::Text if raw.is_empty() => "varchar".to_string(),
            ScalarKind::Text => raw.clone(),
            ScalarKind::Integer if raw.to_lowercase().starts_with("smallint") => "smallint".to_string(),
            ScalarKind::Integer => "int".to_string(),
            ScalarKind::BigInt => "bigint".to_string(),
            ScalarKind::Timestamp => "timestamp".to_string(),
            ScalarKind::Date => "date".to_string(),
            ScalarKind::Boolean => "boolean".to_string(),
            ScalarKind::Money => raw.split('(').next().unwrap_or(raw).trim().to_string(),
            ScalarKind::Other(name) => name.clone(),
        },
    };

    if name.contains(char::is_whitespace) {
        format!("\"{}\"", name)
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::type_mapper::map_type;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("numeric(5,2)", "numeric(5,2)")]
    #[case("", "varchar")]
    #[case("varchar(40)", "varchar(40)")]
    #[case("INTEGER", "int")]
    #[case("smallint", "smallint")]
    #[case("BIGINT", "bigint")]
    #[case("datetime", "timestamp")]
    #[case("Date", "date")]
    #[case("bool", "boolean")]
    #[case("money", "money")]
    #[case("uuid", "uuid")]
    #[case("double precision", "\"double precision\"")]
    fn dbml_types(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(render_type(&map_type(raw)), expected);
    }

    #[test]
    fn enum_types_render_by_name() {
        assert_eq!(render_type(&NormalizedType::Enum("Status".to_string())), "Status");
    }
}
