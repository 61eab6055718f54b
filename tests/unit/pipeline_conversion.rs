//! Unit tests for the reader/writer pipeline
//!
//! Tests cover:
//! - The documented conversion scenarios (comma, semicolon, skipped rows, empty data)
//! - Pretty vs compact equivalence
//! - Idempotence and row ordering
//! - Fatal error propagation

use csvjson::conversion::{convert_csv_str, ConversionConfig, ConversionEngine, DelimiterType};
use csvjson::error::{ConversionError, ConversionErrorKind};
use serde_json::Value;

fn parse(json: &str) -> Vec<Value> {
    match serde_json::from_str::<Value>(json).unwrap() {
        Value::Array(items) => items,
        other => panic!("expected array, got {}", other),
    }
}

#[cfg(test)]
mod scenarios {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn comma_delimited_rows() {
        let json = convert_csv_str("a,b\n1,2\n3,4", &ConversionConfig::default()).unwrap();
        assert_eq!(json, r#"[{"a":"1","b":"2"},{"a":"3","b":"4"}]"#);
    }

    #[test]
    fn semicolon_delimited_rows() {
        let config = ConversionConfig::default().with_delimiter(DelimiterType::Semicolon);
        let json = convert_csv_str("a;b\n1;2", &config).unwrap();
        assert_eq!(json, r#"[{"a":"1","b":"2"}]"#);
    }

    #[test]
    fn short_row_is_skipped() {
        let engine = ConversionEngine::new(ConversionConfig::default());
        let out = engine.convert("a,b\n1,2\n3".as_bytes(), Vec::new()).unwrap();
        assert_eq!(String::from_utf8(out.sink).unwrap(), r#"[{"a":"1","b":"2"}]"#);
        assert_eq!(out.stats.rows_skipped, 1);
    }

    #[test]
    fn empty_data_section() {
        let json = convert_csv_str("a,b\n", &ConversionConfig::default()).unwrap();
        assert_eq!(json, "[]");
    }

    #[test]
    fn pretty_mode_adds_whitespace_only() {
        let input = "a,b\n1,2\n3,4";
        let compact = convert_csv_str(input, &ConversionConfig::default()).unwrap();
        let pretty =
            convert_csv_str(input, &ConversionConfig::default().with_pretty(true)).unwrap();

        assert!(pretty.contains("\n"));
        assert!(pretty.starts_with("[\n"));
        assert!(pretty.ends_with("\n]"));
        assert_eq!(parse(&compact), parse(&pretty));
    }

    #[test]
    fn numeric_looking_values_stay_strings() {
        let json = convert_csv_str("n,flag,empty\n42,true,\n", &ConversionConfig::default()).unwrap();
        assert_eq!(json, r#"[{"n":"42","flag":"true","empty":""}]"#);
    }
}

#[cfg(test)]
mod properties {
    use super::*;
    use pretty_assertions::assert_eq;

    fn generated(rows: usize, fields: usize) -> String {
        let header: Vec<String> = (0..fields).map(|i| format!("col{}", i)).collect();
        let mut csv = header.join(",");
        csv.push('\n');
        for r in 0..rows {
            let row: Vec<String> = (0..fields).map(|f| format!("r{}f{}", r, f)).collect();
            csv.push_str(&row.join(","));
            csv.push('\n');
        }
        csv
    }

    #[test]
    fn n_rows_become_n_objects_with_k_keys_in_order() {
        let json = convert_csv_str(&generated(250, 6), &ConversionConfig::default()).unwrap();
        let items = parse(&json);
        assert_eq!(items.len(), 250);

        for (r, item) in items.iter().enumerate() {
            let object = item.as_object().unwrap();
            let keys: Vec<&str> = object.keys().map(String::as_str).collect();
            assert_eq!(keys, vec!["col0", "col1", "col2", "col3", "col4", "col5"]);
            assert_eq!(object["col3"], Value::String(format!("r{}f3", r)));
        }
    }

    #[test]
    fn skipped_rows_reduce_output_count() {
        let input = "a,b,c\n1,2,3\n4,5\n6,7,8,9\n10,11,12\n13\n";
        let engine = ConversionEngine::new(ConversionConfig::default());
        let out = engine.convert(input.as_bytes(), Vec::new()).unwrap();
        let items = parse(std::str::from_utf8(&out.sink).unwrap());

        assert_eq!(out.stats.rows_read, 5);
        assert_eq!(out.stats.rows_skipped, 3);
        assert_eq!(items.len() as u64, out.stats.rows_read - out.stats.rows_skipped);
        assert_eq!(out.stats.skipped_lines, vec![3, 4, 6]);
        assert_eq!(items[1]["a"], "10");
    }

    #[test]
    fn conversion_is_idempotent() {
        let input = generated(100, 3);
        for pretty in [false, true] {
            let config = ConversionConfig::default().with_pretty(pretty);
            let first = convert_csv_str(&input, &config).unwrap();
            let second = convert_csv_str(&input, &config).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn channel_capacity_does_not_change_output() {
        let input = generated(300, 4);
        let expected = convert_csv_str(&input, &ConversionConfig::default()).unwrap();
        for capacity in [0, 1, 1024] {
            let config = ConversionConfig::default().with_channel_capacity(capacity);
            assert_eq!(convert_csv_str(&input, &config).unwrap(), expected);
        }
    }
}

#[cfg(test)]
mod failures {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn missing_header_is_fatal() {
        let err = convert_csv_str("", &ConversionConfig::default()).unwrap_err();
        assert_matches!(err.kind(), Some(ConversionErrorKind::MissingHeader));
    }

    #[test]
    fn duplicate_header_is_fatal() {
        let err = convert_csv_str("a,a\n1,2\n", &ConversionConfig::default()).unwrap_err();
        assert_matches!(err.kind(), Some(ConversionErrorKind::DuplicateHeader { .. }));
    }

    #[test]
    fn invalid_utf8_is_fatal() {
        let engine = ConversionEngine::new(ConversionConfig::default());
        let input: &[u8] = b"a,b\n1,2\n\xc3\x28,4\n";
        let err = engine.convert(input, Vec::new()).unwrap_err();
        assert_matches!(err, ConversionError::ParseError(_));
        assert!(err.user_message().starts_with("CSV parse error"));
    }
}
