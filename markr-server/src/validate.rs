//! Record validation
//!
//! Turns the generic document tree into typed result records. Every item is
//! matched against the `ValidatedRecord` schema in one serde step; the first
//! item that does not match rejects the whole batch. Items and their marks
//! must be mappings.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{value::MapAccessDeserializer, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ImportError;

/// Root element name
pub const RESULTS_ROOT: &str = "mcq-test-results";

/// Per-result element name
pub const RESULT_ITEM: &str = "mcq-test-result";

/// One scanned result, type-checked
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ValidatedRecord {
    #[serde(rename = "first-name")]
    pub first_name: String,
    #[serde(rename = "last-name")]
    pub last_name: String,
    #[serde(rename = "student-number")]
    pub student_number: i64,
    #[serde(rename = "test-id")]
    pub test_id: i64,
    #[serde(rename = "summary-marks", deserialize_with = "object")]
    pub summary_marks: SummaryMarks,
    /// Raw timestamp text; parsed by the importer
    #[serde(rename = "@_scanned-on")]
    pub scanned_on: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SummaryMarks {
    #[serde(rename = "@_available")]
    pub available: i64,
    #[serde(rename = "@_obtained")]
    pub obtained: i64,
}

/// Validate a parsed document into records, preserving input order
pub fn validate_document(document: &Value) -> Result<Vec<ValidatedRecord>, ImportError> {
    let root = document
        .as_object()
        .and_then(|map| map.get(RESULTS_ROOT))
        .ok_or(ImportError::RootNotFound)?;

    result_items(root)
        .iter()
        .map(|item| object::<_, ValidatedRecord>(*item).map_err(|_| ImportError::InvalidResult))
        .collect()
}

/// Deserialize `T` from a mapping only
///
/// Derived structs also accept a sequence positionally, which would let
/// repeated elements such as `[20, 13]` pass as a marks object.
fn object<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    struct ObjectVisitor<T>(PhantomData<T>);

    impl<'de, T: Deserialize<'de>> Visitor<'de> for ObjectVisitor<T> {
        type Value = T;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a mapping")
        }

        fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<T, A::Error> {
            T::deserialize(MapAccessDeserializer::new(map))
        }
    }

    deserializer.deserialize_map(ObjectVisitor(PhantomData))
}

/// The result items under the root, normalized to a sequence
///
/// A missing, empty or scalar item list counts as no results.
fn result_items(root: &Value) -> Vec<&Value> {
    match root.get(RESULT_ITEM) {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(item @ Value::Object(_)) => vec![item],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_document;
    use serde_json::json;

    fn jane() -> ValidatedRecord {
        ValidatedRecord {
            first_name: "Jane".to_string(),
            last_name: "Austen".to_string(),
            student_number: 521585128,
            test_id: 1234,
            summary_marks: SummaryMarks {
                available: 20,
                obtained: 13,
            },
            scanned_on: "2017-12-04T12:12:10+11:00".to_string(),
        }
    }

    #[test]
    fn test_single_result() {
        let doc = parse_document(
            r#"
<mcq-test-results>
    <mcq-test-result scanned-on="2017-12-04T12:12:10+11:00">
        <first-name>Jane</first-name>
        <last-name>Austen</last-name>
        <student-number>521585128</student-number>
        <test-id>1234</test-id>
        <summary-marks available="20" obtained="13" />
    </mcq-test-result>
</mcq-test-results>
"#,
        )
        .unwrap();

        assert_eq!(validate_document(&doc).unwrap(), vec![jane()]);
    }

    #[test]
    fn test_two_results_keep_order() {
        let doc = parse_document(
            r#"
<mcq-test-results>
    <mcq-test-result scanned-on="2017-12-04T12:12:10+11:00">
        <first-name>Jane</first-name>
        <last-name>Austen</last-name>
        <student-number>521585128</student-number>
        <test-id>1234</test-id>
        <summary-marks available="20" obtained="13" />
    </mcq-test-result>
    <mcq-test-result scanned-on="2017-11-03T11:11:09+11:00">
        <first-name>KJ</first-name>
        <last-name>Alysander</last-name>
        <student-number>002299</student-number>
        <test-id>9863</test-id>
        <summary-marks available="20" obtained="7" />
    </mcq-test-result>
</mcq-test-results>
"#,
        )
        .unwrap();

        let records = validate_document(&doc).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], jane());
        assert_eq!(
            records[1],
            ValidatedRecord {
                first_name: "KJ".to_string(),
                last_name: "Alysander".to_string(),
                student_number: 2299,
                test_id: 9863,
                summary_marks: SummaryMarks {
                    available: 20,
                    obtained: 7,
                },
                scanned_on: "2017-11-03T11:11:09+11:00".to_string(),
            }
        );
    }

    #[test]
    fn test_no_results() {
        let doc = parse_document("<mcq-test-results>\n</mcq-test-results>").unwrap();
        assert!(validate_document(&doc).unwrap().is_empty());
    }

    #[test]
    fn test_scalar_item_list_is_empty() {
        let doc = json!({ "mcq-test-results": { "mcq-test-result": 42 } });
        assert!(validate_document(&doc).unwrap().is_empty());
    }

    #[test]
    fn test_no_body() {
        let doc = parse_document("").unwrap();
        let err = validate_document(&doc).unwrap_err();
        assert!(matches!(err, ImportError::RootNotFound));
        assert_eq!(
            err.to_string(),
            "\"mcq-test-results\" not found on the root node"
        );
    }

    #[test]
    fn test_missing_attribute() {
        let doc = parse_document(
            r#"
<mcq-test-results>
    <mcq-test-result scanned-on="2017-12-04T12:12:10+11:00">
        <first-name>Jane</first-name>
        <last-name>Austen</last-name>
        <student-number>521585128</student-number>
        <test-id>1234</test-id>
    </mcq-test-result>
</mcq-test-results>
"#,
        )
        .unwrap();

        let err = validate_document(&doc).unwrap_err();
        assert!(matches!(err, ImportError::InvalidResult));
        assert_eq!(
            err.to_string(),
            "Invalid result provided, please validate if attributes are missing"
        );
    }

    #[test]
    fn test_wrong_attribute_type() {
        let doc = parse_document(
            r#"
<mcq-test-results>
    <mcq-test-result scanned-on="2017-12-04T12:12:10+11:00">
        <first-name>1234</first-name>
        <last-name>567890</last-name>
        <student-number>test</student-number>
        <test-id>1234</test-id>
        <summary-marks available="20" obtained="13" />
    </mcq-test-result>
</mcq-test-results>
"#,
        )
        .unwrap();

        assert!(matches!(
            validate_document(&doc),
            Err(ImportError::InvalidResult)
        ));
    }

    #[test]
    fn test_one_bad_item_rejects_batch() {
        let mut good = json!({
            "first-name": "Jane",
            "last-name": "Austen",
            "student-number": 1,
            "test-id": 2,
            "summary-marks": { "@_available": 20, "@_obtained": 13 },
            "@_scanned-on": "2017-12-04T12:12:10+11:00"
        });
        let mut bad = good.clone();
        bad["summary-marks"]["@_obtained"] = json!(12.5);
        good["student-number"] = json!(3);

        let doc = json!({ "mcq-test-results": { "mcq-test-result": [good, bad] } });
        assert!(matches!(
            validate_document(&doc),
            Err(ImportError::InvalidResult)
        ));
    }

    #[test]
    fn test_repeated_summary_marks_rejected() {
        let doc = parse_document(
            r#"
<mcq-test-results>
    <mcq-test-result scanned-on="2017-12-04T12:12:10+11:00">
        <first-name>Jane</first-name>
        <last-name>Austen</last-name>
        <student-number>521585128</student-number>
        <test-id>1234</test-id>
        <summary-marks>20</summary-marks>
        <summary-marks>13</summary-marks>
    </mcq-test-result>
</mcq-test-results>
"#,
        )
        .unwrap();
        assert_eq!(
            doc["mcq-test-results"]["mcq-test-result"]["summary-marks"],
            json!([20, 13])
        );

        assert!(matches!(
            validate_document(&doc),
            Err(ImportError::InvalidResult)
        ));
    }

    #[test]
    fn test_sequence_item_rejected() {
        let item = json!([
            "Jane",
            "Austen",
            521585128,
            1234,
            { "@_available": 20, "@_obtained": 13 },
            "2017-12-04T12:12:10+11:00"
        ]);
        let doc = json!({ "mcq-test-results": { "mcq-test-result": [item] } });

        assert!(matches!(
            validate_document(&doc),
            Err(ImportError::InvalidResult)
        ));
    }

    #[test]
    fn test_non_object_root_document() {
        assert!(matches!(
            validate_document(&json!("mcq-test-results")),
            Err(ImportError::RootNotFound)
        ));
    }
}
