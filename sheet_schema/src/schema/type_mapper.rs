//! Raw column type mapping
//!
//! Maps the free-text type cell of a field row to a `NormalizedType`. The
//! mapping is total: unknown tokens degrade to a best-effort scalar.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::types::{NormalizedType, ScalarKind};

static PRECISION_SCALE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\s*(\d+)\s*(?:,\s*(\d+)\s*)?\)").expect("valid regex"));

static LENGTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\s*(\d+)\s*\)").expect("valid regex"));

/// Map a raw type token to a normalized type
pub fn map_type(raw: &str) -> NormalizedType {
    let raw = raw.trim();
    let lower = raw.to_lowercase();

    let scalar = |kind: ScalarKind| NormalizedType::Scalar {
        kind,
        raw: raw.to_string(),
    };

    if lower.is_empty() {
        return scalar(ScalarKind::Text);
    }

    if lower.starts_with("numeric") || lower.starts_with("decimal") {
        let (precision, scale) = match PRECISION_SCALE.captures(&lower) {
            Some(caps) => (
                caps.get(1).and_then(|m| m.as_str().parse().ok()),
                caps.get(2).and_then(|m| m.as_str().parse().ok()),
            ),
            None => (None, None),
        };
        return NormalizedType::Numeric {
            precision,
            scale,
            raw: raw.to_string(),
        };
    }

    if lower.starts_with("bigint") {
        return scalar(ScalarKind::BigInt);
    }

    if is_integer(&lower) {
        return scalar(ScalarKind::Integer);
    }

    if lower.contains("char") || lower == "text" {
        return scalar(ScalarKind::Text);
    }

    if lower.starts_with("timestamp") || lower.starts_with("datetime") {
        return scalar(ScalarKind::Timestamp);
    }

    if lower.starts_with("date") {
        return scalar(ScalarKind::Date);
    }

    if lower.starts_with("bool") {
        return scalar(ScalarKind::Boolean);
    }

    if lower.starts_with("money") {
        return scalar(ScalarKind::Money);
    }

    let name = raw.split('(').next().unwrap_or(raw).trim();
    scalar(ScalarKind::Other(name.to_string()))
}

/// `int`, `int4`, `int(11)`, `integer`, `smallint`, but not `interval`
fn is_integer(lower: &str) -> bool {
    if lower.starts_with("integer") || lower.starts_with("smallint") {
        return true;
    }

    match lower.strip_prefix("int") {
        Some(rest) => !rest.starts_with(|c: char| c.is_ascii_alphabetic()),
        None => false,
    }
}

/// Declared length of a character type, e.g. `50` for `varchar(50)`
pub fn declared_length(raw: &str) -> Option<String> {
    LENGTH
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn kind_of(raw: &str) -> ScalarKind {
        match map_type(raw) {
            NormalizedType::Scalar { kind, .. } => kind,
            other => panic!("expected scalar for {raw:?}, got {other:?}"),
        }
    }

    #[rstest]
    #[case("", ScalarKind::Text)]
    #[case("   ", ScalarKind::Text)]
    #[case("BIGINT", ScalarKind::BigInt)]
    #[case("int", ScalarKind::Integer)]
    #[case("Integer", ScalarKind::Integer)]
    #[case("smallint", ScalarKind::Integer)]
    #[case("int4", ScalarKind::Integer)]
    #[case("VARCHAR", ScalarKind::Text)]
    #[case("varchar(255)", ScalarKind::Text)]
    #[case("nchar(2)", ScalarKind::Text)]
    #[case("text", ScalarKind::Text)]
    #[case("timestamp", ScalarKind::Timestamp)]
    #[case("DateTime", ScalarKind::Timestamp)]
    #[case("date", ScalarKind::Date)]
    #[case("boolean", ScalarKind::Boolean)]
    #[case("bool", ScalarKind::Boolean)]
    #[case("money", ScalarKind::Money)]
    #[case("interval", ScalarKind::Other("interval".to_string()))]
    #[case("uuid", ScalarKind::Other("uuid".to_string()))]
    #[case("geometry(Point, 4326)", ScalarKind::Other("geometry".to_string()))]
    fn scalar_mapping(#[case] raw: &str, #[case] expected: ScalarKind) {
        assert_eq!(kind_of(raw), expected);
    }

    #[test]
    fn numeric_with_precision_and_scale() {
        assert_eq!(
            map_type("numeric(5,2)"),
            NormalizedType::Numeric {
                precision: Some(5),
                scale: Some(2),
                raw: "numeric(5,2)".to_string()
            }
        );
        assert_eq!(
            map_type("DECIMAL( 12 , 4 )"),
            NormalizedType::Numeric {
                precision: Some(12),
                scale: Some(4),
                raw: "DECIMAL( 12 , 4 )".to_string()
            }
        );
    }

    #[test]
    fn numeric_without_parameters() {
        assert_eq!(
            map_type("numeric"),
            NormalizedType::Numeric {
                precision: None,
                scale: None,
                raw: "numeric".to_string()
            }
        );
    }

    #[test]
    fn mapping_is_total_on_garbage() {
        for raw in ["(", ")", "((", "???", "日本語", "numeric(x,y)", "\u{0}"] {
            let mapped = map_type(raw);
            assert_eq!(mapped.raw(), raw.trim());
        }
        assert!(map_type("???").is_fallback());
        assert!(!map_type("").is_fallback());
    }

    #[test]
    fn declared_lengths() {
        assert_eq!(declared_length("varchar(50)"), Some("50".to_string()));
        assert_eq!(declared_length("varchar"), None);
        assert_eq!(declared_length("numeric(5,2)"), None);
    }
}
