//! Tests for sheet_schema
//!
//! End-to-end tests running whole workbooks through the exporter.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::fs;

    use chrono::{DateTime, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use rstest::*;
    use serde_json::Value;
    use tempfile::tempdir;

    use crate::config::{Config, EnumStrategy, TableStrategy};
    use crate::schema::DiagnosticKind;
    use crate::{export_file, Exporter, OutputFormat, Sheet, Workbook};

    const HEADER: &[&str] = &["Logical name", "Optional", "Type", "Relation", "Constraints", "Description"];

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn run_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
    }

    // Helper function to create a test configuration
    fn test_config() -> Config {
        let config_str = r###"
        [detection]
        table_strategy = "header_lookahead"
        enum_strategy = "text"
        no_color = "#ffffff"
        enum_sheet_pattern = "enum"
        skip_sheets = ["Notes"]

        [columns]
        name = 0
        optional_flag = 1
        field_type = 2
        relation = 3
        constraints = 4
        description = 5

        [dbml]
        qualify_schema = false

        [json]
        diagram_name = "Billing model"
        database_type = "postgresql"

        [layout]
        tables_per_row = 4
        "###;

        toml::from_str(config_str).expect("Failed to parse test config")
    }

    #[fixture]
    fn workbook() -> Workbook {
        Workbook {
            name: Some("crm".to_string()),
            sheets: vec![
                Sheet::new(
                    "Enums",
                    grid(&[&["Status"], &["ACTIVE"], &["INACTIVE"], &["Type"], &["A"]]),
                ),
                Sheet::new(
                    "Billing",
                    grid(&[
                        &["Agency"],
                        HEADER,
                        &["id", "N", "bigint", "", "increment", "Agency key"],
                        &["Name", "N", "varchar", "", "", "Primary"],
                        &["", "", "", "", "", "display name"],
                        &["Invoice"],
                        HEADER,
                        &["id", "N", "bigint", "", "", ""],
                        &["agency_id", "N", "bigint", "ForeignKey, Agency.id", "", ""],
                        &["total", "", "numeric(5,2)", "", "", "Gross */ net"],
                        &["status", "N", "varchar", "Enum, Status", "", ""],
                        &["owner_id", "", "int", "ForeignKey, User", "", ""],
                    ]),
                ),
                Sheet::new("Notes", grid(&[&["Scratch"], HEADER, &["x", "", "", "", "", ""]])),
            ],
        }
    }

    fn export_json(workbook: &Workbook, config: &Config) -> (Value, crate::Export) {
        let export = Exporter::new(config)
            .with_clock(run_clock())
            .export(workbook, OutputFormat::Json)
            .unwrap();
        let doc: Value = serde_json::from_str(&export.content).unwrap();
        (doc, export)
    }

    #[rstest]
    fn test_dbml_output(workbook: Workbook) {
        let config = test_config();
        let export = Exporter::new(&config).dbml(&workbook).unwrap();

        let expected = r#"Enum Status {
  ACTIVE
  INACTIVE
}

Enum Type {
  A
}

Table Agency {
  id bigint [pk, increment, not null] // Agency key
  /*
    Primary
    display name
  */
  Name varchar [not null]
}

Table Invoice {
  id bigint [pk, not null]
  agency_id bigint [not null]
  total numeric(5,2) // Gross */ net
  status Status [not null]
  owner_id int
}
Ref: Invoice.agency_id > Agency.id
"#;
        assert_eq!(export.content, expected);
    }

    #[rstest]
    fn test_dbml_qualified_names(workbook: Workbook) {
        let mut config = test_config();
        config.dbml.qualify_schema = true;
        let export = Exporter::new(&config).dbml(&workbook).unwrap();

        assert!(export.content.contains("Table Billing.Invoice {"));
        assert!(export.content.contains("Ref: Billing.Invoice.agency_id > Billing.Agency.id\n"));
    }

    #[test]
    fn test_block_comment_escaping() {
        let workbook = Workbook {
            name: None,
            sheets: vec![Sheet::new(
                "Main",
                grid(&[
                    &["Doc"],
                    HEADER,
                    &["body", "", "text", "", "", "ends with */"],
                    &["", "", "", "", "", "then more"],
                ]),
            )],
        };
        let export = Exporter::new(&Config::default()).dbml(&workbook).unwrap();

        assert!(export.content.contains("    ends with * /\n    then more\n  */\n  body text\n"));
    }

    #[test]
    fn test_header_words_in_descriptions() {
        let workbook = Workbook {
            name: None,
            sheets: vec![Sheet::new(
                "Billing",
                grid(&[
                    &["Invoice"],
                    HEADER,
                    &["id", "N", "int", "", "", ""],
                    &["kind", "", "varchar", "", "", "Copied from the legacy field type column"],
                    &["total", "", "int", "", "", "Matches logical name in ledger"],
                ]),
            )],
        };
        let export = Exporter::new(&Config::default()).dbml(&workbook).unwrap();

        assert_eq!(
            export.content,
            "Table Invoice {\n  id int [pk, not null]\n  kind varchar // Copied from the legacy field type column\n  total int // Matches logical name in ledger\n}\n"
        );
        assert!(export.diagnostics.is_empty());
    }

    #[rstest]
    fn test_unresolved_fk_is_one_warning(workbook: Workbook) {
        let config = test_config();
        let export = Exporter::new(&config).dbml(&workbook).unwrap();

        assert_eq!(export.warnings().count(), 1);
        assert_eq!(export.diagnostics.len(), 1);
        assert_eq!(export.diagnostics[0].kind, DiagnosticKind::UnresolvedTable);
        assert_eq!(export.content.matches("Ref:").count(), 1);
    }

    #[rstest]
    fn test_json_document_shape(workbook: Workbook) {
        let (doc, _) = export_json(&workbook, &test_config());

        let keys: HashSet<&str> = doc.as_object().unwrap().keys().map(String::as_str).collect();
        let expected: HashSet<&str> = [
            "id", "name", "databaseType", "tables", "relationships", "areas", "customTypes",
            "notes", "subjectAreas", "createdAt", "updatedAt",
        ]
        .into_iter()
        .collect();
        assert_eq!(keys, expected);

        assert_eq!(doc["name"], "Billing model");
        assert_eq!(doc["databaseType"], "postgresql");
        assert_eq!(doc["notes"], Value::Array(vec![]));
        assert_eq!(doc["subjectAreas"], Value::Array(vec![]));
        assert_eq!(doc["createdAt"], "2024-03-01T12:30:00.000Z");
        assert_eq!(doc["updatedAt"], "2024-03-01T12:30:00.000Z");

        let table = &doc["tables"][0];
        for key in [
            "id", "name", "schema", "color", "x", "y", "width", "fields", "indexes", "isView",
            "createdAt", "updatedAt",
        ] {
            assert!(table.get(key).is_some(), "table is missing {key}");
        }
        assert_eq!(table["createdAt"], 1_709_296_200_000i64);
        assert_eq!(table["isView"], false);

        let field = &table["fields"][0];
        for key in [
            "id", "name", "type", "primaryKey", "unique", "nullable", "increment", "default",
            "comment", "createdAt",
        ] {
            assert!(field.get(key).is_some(), "field is missing {key}");
        }
        assert_eq!(field["createdAt"], 1_709_296_200_000i64);

        assert_eq!(doc["customTypes"][0]["name"], "Status");
        assert_eq!(doc["customTypes"][0]["kind"], "enum");
        assert_eq!(doc["areas"].as_array().unwrap().len(), 1);
        assert_eq!(doc["areas"][0]["name"], "Billing");

        for (label, entity) in [("area", &doc["areas"][0]), ("custom type", &doc["customTypes"][0])] {
            assert_eq!(entity["createdAt"], 1_709_296_200_000i64, "{label} createdAt");
            assert_eq!(entity["updatedAt"], 1_709_296_200_000i64, "{label} updatedAt");
        }
    }

    #[rstest]
    fn test_json_relationship(workbook: Workbook) {
        let (doc, export) = export_json(&workbook, &test_config());

        let rels = doc["relationships"].as_array().unwrap();
        assert_eq!(rels.len(), 1);
        let rel = &rels[0];

        let tables = doc["tables"].as_array().unwrap();
        let agency = &tables[0];
        let invoice = &tables[1];
        assert_eq!(agency["name"], "Agency");
        assert_eq!(invoice["name"], "Invoice");

        assert_eq!(rel["sourceSchema"], "Billing");
        assert_eq!(rel["targetSchema"], "Billing");
        assert_eq!(rel["sourceTableId"], invoice["id"]);
        assert_eq!(rel["sourceFieldId"], invoice["fields"][1]["id"]);
        assert_eq!(rel["targetTableId"], agency["id"]);
        assert_eq!(rel["targetFieldId"], agency["fields"][0]["id"]);
        assert_eq!(rel["sourceCardinality"], "many");
        assert_eq!(rel["targetCardinality"], "one");
        assert_eq!(rel["name"], "invoice_agency_id_fk");
        assert_eq!(export.warnings().count(), 1);
    }

    #[rstest]
    fn test_json_field_types(workbook: Workbook) {
        let (doc, _) = export_json(&workbook, &test_config());
        let invoice = &doc["tables"][1];

        let total = &invoice["fields"][2];
        assert_eq!(total["type"]["name"], "numeric");
        assert_eq!(total["precision"], 5);
        assert_eq!(total["scale"], 2);
        assert_eq!(total["type"]["fieldAttributes"]["precision"]["max"], 999);
        assert_eq!(total["type"]["fieldAttributes"]["scale"]["min"], 0);
        assert_eq!(total["comment"], "Gross */ net");

        let status = &invoice["fields"][3];
        assert_eq!(status["type"]["name"], "Status");

        let agency_name = &doc["tables"][0]["fields"][1];
        assert_eq!(agency_name["comment"], "Primary\ndisplay name");
        assert_eq!(agency_name["nullable"], false);

        let pk = &doc["tables"][0]["indexes"][0];
        assert_eq!(pk["isPrimaryKey"], true);
        assert_eq!(pk["fieldIds"][0], doc["tables"][0]["fields"][0]["id"]);
    }

    #[rstest]
    fn test_round_trip_names(workbook: Workbook) {
        let (doc, _) = export_json(&workbook, &test_config());

        let tables: Vec<(String, String, Vec<String>)> = doc["tables"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| {
                (
                    t["schema"].as_str().unwrap().to_string(),
                    t["name"].as_str().unwrap().to_string(),
                    t["fields"]
                        .as_array()
                        .unwrap()
                        .iter()
                        .map(|f| f["name"].as_str().unwrap().to_string())
                        .collect(),
                )
            })
            .collect();

        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(
            tables,
            vec![
                ("Billing".to_string(), "Agency".to_string(), owned(&["id", "Name"])),
                (
                    "Billing".to_string(),
                    "Invoice".to_string(),
                    owned(&["id", "agency_id", "total", "status", "owner_id"])
                ),
            ]
        );
    }

    /// Collect every `id` value in the document, in document order
    fn collect_ids(value: &Value, out: &mut Vec<String>) {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    if key == "id" {
                        assert!(child.is_string(), "identity {child} is not a string");
                        out.push(child.as_str().unwrap().to_string());
                    } else {
                        collect_ids(child, out);
                    }
                }
            }
            Value::Array(items) => items.iter().for_each(|v| collect_ids(v, out)),
            _ => {}
        }
    }

    #[rstest]
    fn test_identities_unique_and_contiguous(workbook: Workbook) {
        let (doc, _) = export_json(&workbook, &test_config());

        let mut ids = Vec::new();
        collect_ids(&doc, &mut ids);
        // type descriptors also carry an `id`, and they are not identities
        let mut numeric: Vec<u64> = ids.iter().filter_map(|id| id.parse().ok()).collect();
        numeric.sort_unstable();

        let distinct: HashSet<u64> = numeric.iter().copied().collect();
        assert_eq!(distinct.len(), numeric.len());
        assert_eq!(numeric, (1..=numeric.len() as u64).collect::<Vec<_>>());
        assert_eq!(doc["id"], numeric.len().to_string());
    }

    #[rstest]
    fn test_runs_are_renumbered(workbook: Workbook) {
        let config = test_config();
        let exporter = Exporter::new(&config).with_clock(run_clock());
        let first = exporter.json(&workbook).unwrap();
        let second = exporter.json(&workbook).unwrap();

        assert_eq!(first.content, second.content);
    }

    #[test]
    fn test_color_strategies_end_to_end() {
        let mut config = Config::default();
        config.detection.table_strategy = TableStrategy::ColorBoundary;
        config.detection.enum_strategy = EnumStrategy::Color;
        config.detection.no_color = "#FFFFFF".to_string();

        let workbook = Workbook {
            name: None,
            sheets: vec![
                Sheet::new("Enum list", grid(&[&["LEVEL"], &["LOW"], &["HIGH"]]))
                    .with_backgrounds(grid(&[&["#fce5cd"], &["#ffffff"], &["#ffffff"]])),
                Sheet::new(
                    "Ops",
                    grid(&[
                        &["Ticket"],
                        HEADER,
                        &["id", "N", "int", "", "", ""],
                        &["level", "", "", "Enum, LEVEL", "", ""],
                        &["user_id", "", "int", "ForeignKey, User.id", "", ""],
                        &["User"],
                        &["id", "N", "int", "", "", ""],
                    ]),
                )
                .with_backgrounds(grid(&[
                    &["#d9ead3"],
                    &["#d9ead3"],
                    &["#ffffff"],
                    &["#ffffff"],
                    &["#ffffff"],
                    &["#d9ead3"],
                    &["#ffffff"],
                ])),
            ],
        };

        let export = Exporter::new(&config).dbml(&workbook).unwrap();
        assert!(export.diagnostics.is_empty(), "{:?}", export.diagnostics);
        assert!(export.content.contains("Enum LEVEL {\n  LOW\n  HIGH\n}\n"));
        assert!(export.content.contains("  level LEVEL\n"));
        assert!(export.content.contains("Ref: Ticket.user_id > User.id\n"));
        assert!(export.content.contains("Table User {\n  id int [pk, not null]\n}\n"));
    }

    #[test]
    fn test_export_file_from_disk() {
        let temp_dir = tempdir().unwrap();
        let workbook_path = temp_dir.path().join("workbook.json");
        let config_path = temp_dir.path().join("sheet_schema.toml");

        fs::write(
            &workbook_path,
            r#"{"sheets": [{"name": "Main", "values": [["Thing"], ["Logical name"], ["id", "N", "int"], ["weight", "", "jsonb", null, "", 7]]}]}"#,
        )
        .unwrap();
        fs::write(&config_path, "[dbml]\nqualify_schema = true\n").unwrap();

        let export = export_file(
            workbook_path.to_str().unwrap(),
            Some(config_path.to_str().unwrap()),
            OutputFormat::Dbml,
        )
        .unwrap();

        assert_eq!(
            export.content,
            "Table Main.Thing {\n  id int [pk, not null]\n  weight jsonb // 7\n}\n"
        );
        assert_eq!(export.diagnostics.len(), 1);
        assert_eq!(export.diagnostics[0].kind, DiagnosticKind::UnknownType);
    }

    #[test]
    fn test_empty_workbook() {
        let export = Exporter::new(&Config::default())
            .with_clock(run_clock())
            .json(&Workbook::default())
            .unwrap();
        let doc: Value = serde_json::from_str(&export.content).unwrap();

        assert_eq!(doc["id"], "1");
        assert_eq!(doc["name"], "Schema");
        assert_eq!(doc["tables"], Value::Array(vec![]));
        assert_eq!(doc["customTypes"], Value::Array(vec![]));
    }

    #[rstest]
    #[case("dbml", OutputFormat::Dbml)]
    #[case("JSON", OutputFormat::Json)]
    fn test_output_format_parsing(#[case] input: &str, #[case] expected: OutputFormat) {
        assert_eq!(input.parse::<OutputFormat>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_output_format() {
        assert!("svg".parse::<OutputFormat>().is_err());
    }
}
