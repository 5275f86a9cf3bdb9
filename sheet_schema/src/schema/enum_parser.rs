//! Enum sheet parser
//!
//! Scans column A of an enum sheet. A boundary row names a new enum, the
//! rows after it are its values.

use std::collections::HashSet;

use crate::schema::context::BuildContext;
use crate::schema::diagnostics::DiagnosticKind;
use crate::schema::types::Enum;
use crate::sheet::{EnumBoundaryDetector, Sheet};
use crate::utils::naming::sanitize_identifier;

/// Parser for enum regions
pub struct EnumParser<'a> {
    detector: &'a dyn EnumBoundaryDetector,
}

impl<'a> EnumParser<'a> {
    pub fn new(detector: &'a dyn EnumBoundaryDetector) -> Self {
        Self { detector }
    }

    /// Parse every enum in the sheet, in row order
    ///
    /// Names already taken by `known` (or earlier in this sheet) are reported
    /// as duplicates and the later definition is dropped along with its values.
    pub fn parse(
        &self,
        sheet: &Sheet,
        known: &mut HashSet<String>,
        ctx: &mut BuildContext,
    ) -> Vec<Enum> {
        let mut enums = Vec::new();
        let mut current: Option<Enum> = None;
        // Values of a rejected enum are swallowed rather than reported as orphans
        let mut skipping = false;

        for row in 0..sheet.row_count() {
            let cell = sheet.cell(row, 0).trim();
            if cell.is_empty() {
                continue;
            }

            if self.detector.is_boundary(sheet, row) {
                if let Some(done) = current.take() {
                    enums.push(done);
                }

                let name = sanitize_identifier(cell);
                if name.is_empty() {
                    ctx.diagnostics.report(
                        DiagnosticKind::InvalidEnumName,
                        format!(
                            "Enum name '{}' in sheet '{}' row {} has no usable characters; skipping it",
                            cell,
                            sheet.name,
                            row + 1
                        ),
                    );
                    skipping = true;
                    continue;
                }

                if !known.insert(name.clone()) {
                    ctx.diagnostics.report(
                        DiagnosticKind::DuplicateEnum,
                        format!(
                            "Enum '{}' in sheet '{}' duplicates an earlier enum; keeping the first",
                            name, sheet.name
                        ),
                    );
                    skipping = true;
                    continue;
                }

                skipping = false;
                current = Some(Enum {
                    id: ctx.next_id(),
                    name,
                    values: Vec::new(),
                });
                continue;
            }

            match current.as_mut() {
                Some(enum_def) => enum_def.values.push(cell.to_string()),
                None if skipping => {}
                None => ctx.diagnostics.report(
                    DiagnosticKind::OrphanEnumValue,
                    format!(
                        "Value '{}' in sheet '{}' row {} precedes any enum name",
                        cell,
                        sheet.name,
                        row + 1
                    ),
                ),
            }
        }

        if let Some(done) = current.take() {
            enums.push(done);
        }

        tracing::debug!(sheet = %sheet.name, count = enums.len(), "Parsed enum sheet");
        enums
    }
}
