//! Naming utilities for sheet_schema
//!
//! Identifier cleanup for names typed into sheets, and quoting for the
//! output grammars.

use inflector::Inflector;
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

static PLAIN_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// Turn a sheet label into an identifier
///
/// Whitespace runs become a single underscore, anything else that is not
/// alphanumeric or `_` is dropped.
pub fn sanitize_identifier(name: &str) -> String {
    let collapsed = WHITESPACE.replace_all(name.trim(), "_");
    collapsed
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

/// Whether a name can appear unquoted in DBML
pub fn is_plain_identifier(name: &str) -> bool {
    PLAIN_IDENTIFIER.is_match(name)
}

/// Quote a DBML identifier when needed
pub fn dbml_identifier(name: &str) -> String {
    if is_plain_identifier(name) {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

/// Keep `*/` inside a description from closing a block comment early
pub fn escape_block_comment(text: &str) -> String {
    text.replace("*/", "* /")
}

/// Stable snake_case key for type and constraint ids
pub fn to_key(name: &str) -> String {
    name.to_snake_case()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("Status", "Status")]
    #[case("  Payment   Method ", "Payment_Method")]
    #[case("Order-Type (v2)", "OrderType_v2")]
    #[case("tab\tname", "tab_name")]
    #[case("!!!", "")]
    fn sanitizing(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_identifier(input), expected);
    }

    #[rstest]
    #[case("invoice", "invoice")]
    #[case("_hidden1", "_hidden1")]
    #[case("line item", "\"line item\"")]
    #[case("1st", "\"1st\"")]
    #[case("say \"hi\"", "\"say \\\"hi\\\"\"")]
    fn dbml_quoting(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(dbml_identifier(input), expected);
    }

    #[test]
    fn block_comment_terminators_are_broken() {
        assert_eq!(escape_block_comment("a */ b */"), "a * / b * /");
        assert_eq!(escape_block_comment("plain"), "plain");
    }

    #[test]
    fn keys() {
        assert_eq!(to_key("timestamp with time zone"), "timestamp_with_time_zone");
        assert_eq!(to_key("Status"), "status");
    }
}
