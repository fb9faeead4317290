//! Core data models: record files, record metadata, and parsed records.
//!
//! Record files follow the `{stock_code}_{company_name}.json` naming
//! convention. The company name is everything after the *first* underscore,
//! so names that contain underscores survive intact.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::LookupError;

/// One row of a section: an insertion-ordered field → value map.
pub type Row = Map<String, Value>;

/// A well-formed record file in a period listing. Not yet loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// Part of the file name before the first underscore.
    pub stock_code: String,
    /// Part of the file name after the first underscore, without `.json`.
    pub company_name: String,
    /// Bare file name, e.g. `035720_카카오.json`.
    pub file_name: String,
    /// Store-specific location (a filesystem path for the on-disk store).
    /// Never serialized, so JSON output does not expose the data root.
    #[serde(skip)]
    pub location: String,
}

impl CatalogEntry {
    /// Builds an entry from a bare file name, or `None` if the name does not
    /// follow the record naming convention.
    pub fn from_file_name(file_name: &str, location: impl Into<String>) -> Option<Self> {
        let (stock_code, company_name) = parse_record_file_name(file_name)?;
        Some(Self {
            stock_code: stock_code.to_string(),
            company_name: company_name.to_string(),
            file_name: file_name.to_string(),
            location: location.into(),
        })
    }
}

/// Splits `{code}_{name}.json` into `(code, name)`.
///
/// Returns `None` for names without the `.json` suffix, without an
/// underscore, or with an empty company part. An empty name would be a
/// substring of every query, so it is treated as malformed.
pub fn parse_record_file_name(file_name: &str) -> Option<(&str, &str)> {
    let stem = file_name.strip_suffix(".json")?;
    let (code, name) = stem.split_once('_')?;
    if name.is_empty() {
        return None;
    }
    Some((code, name))
}

/// Collection metadata written alongside each record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corp_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corp_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub successful_apis: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_quarter: Option<String>,
    /// Everything else the collector wrote (`bsns_year`, `reprt_code`, …).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RecordMetadata {
    /// Reads metadata key by key so one oddly typed field does not discard
    /// the rest. Text fields accept any scalar; `successful_apis` accepts a
    /// number or a numeric string. Values that cannot be read are kept in
    /// `extra` under their original key.
    pub fn from_value(value: &Value) -> Self {
        let mut meta = Self::default();
        let Some(obj) = value.as_object() else {
            return meta;
        };
        for (key, v) in obj {
            let slot = match key.as_str() {
                "corp_name" => &mut meta.corp_name,
                "corp_code" => &mut meta.corp_code,
                "stock_code" => &mut meta.stock_code,
                "collection_date" => &mut meta.collection_date,
                "year_quarter" => &mut meta.year_quarter,
                "successful_apis" => {
                    match count_value(v) {
                        Some(n) => meta.successful_apis = Some(n),
                        None if v.is_null() => {}
                        None => {
                            meta.extra.insert(key.clone(), v.clone());
                        }
                    }
                    continue;
                }
                _ => {
                    meta.extra.insert(key.clone(), v.clone());
                    continue;
                }
            };
            match v {
                Value::Null => {}
                Value::Array(_) | Value::Object(_) => {
                    meta.extra.insert(key.clone(), v.clone());
                }
                scalar => *slot = Some(value_text(scalar)),
            }
        }
        meta
    }

    /// `year_quarter` if present, otherwise built from `bsns_year` + `quarter`.
    pub fn period_label(&self) -> Option<String> {
        if let Some(yq) = &self.year_quarter {
            return Some(yq.clone());
        }
        let year = self.extra.get("bsns_year").map(value_text)?;
        let quarter = self.extra.get("quarter").map(value_text)?;
        Some(format!("{}_{}", year, quarter))
    }
}

fn count_value(v: &Value) -> Option<u32> {
    match v {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Top-level key holding the sections. `api_data` is the on-disk name.
pub const SECTIONS_KEY: &str = "sections";
pub const SECTIONS_KEY_ALIAS: &str = "api_data";

/// A parsed company record: metadata plus per-section rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompanyRecord {
    pub metadata: RecordMetadata,
    pub sections: BTreeMap<String, Vec<Row>>,
}

impl CompanyRecord {
    /// Parses a raw record document.
    ///
    /// Fails with [`LookupError::MissingData`] when neither `sections` nor
    /// `api_data` is present. Section values are normalized leniently: see
    /// [`section_rows`].
    pub fn from_value(raw: &Value) -> Result<Self, LookupError> {
        let sections_value = raw
            .get(SECTIONS_KEY)
            .or_else(|| raw.get(SECTIONS_KEY_ALIAS))
            .ok_or_else(|| LookupError::MissingData {
                key: SECTIONS_KEY.to_string(),
            })?;

        let sections_obj = sections_value
            .as_object()
            .ok_or_else(|| LookupError::MissingData {
                key: SECTIONS_KEY.to_string(),
            })?;

        let metadata = raw
            .get("metadata")
            .map(RecordMetadata::from_value)
            .unwrap_or_default();

        let sections = sections_obj
            .iter()
            .map(|(id, value)| (id.clone(), section_rows(value)))
            .collect();

        Ok(Self { metadata, sections })
    }

    /// Company name from metadata, if the collector recorded one.
    pub fn corp_name(&self) -> Option<&str> {
        self.metadata.corp_name.as_deref()
    }
}

/// Extracts the rows of one section value.
///
/// - an array contributes its object elements (anything else is skipped);
/// - `null` (a failed API call at collection time) is an empty section;
/// - an object with a `list` array (the raw API envelope) contributes that list;
/// - anything else is an empty section.
pub fn section_rows(value: &Value) -> Vec<Row> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(obj) => match obj.get("list") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };
    items
        .iter()
        .filter_map(|item| item.as_object().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_file_name() {
        assert_eq!(
            parse_record_file_name("035720_카카오.json"),
            Some(("035720", "카카오"))
        );
        // Split on the first underscore only.
        assert_eq!(
            parse_record_file_name("000001_Foo_Bar.json"),
            Some(("000001", "Foo_Bar"))
        );
    }

    #[test]
    fn test_parse_file_name_rejects_malformed() {
        assert_eq!(parse_record_file_name("progress.json"), None);
        assert_eq!(parse_record_file_name("035720_카카오.txt"), None);
        assert_eq!(parse_record_file_name("035720_.json"), None);
        assert_eq!(parse_record_file_name(".json"), None);
    }

    #[test]
    fn test_from_value_accepts_api_data_alias() {
        let raw = json!({
            "metadata": {"corp_name": "신한은행", "stock_code": "000010", "successful_apis": 2},
            "api_data": {
                "api_01": [{"se": "보통주", "stock_knd": "-"}],
                "api_02": []
            }
        });
        let record = CompanyRecord::from_value(&raw).unwrap();
        assert_eq!(record.corp_name(), Some("신한은행"));
        assert_eq!(record.metadata.successful_apis, Some(2));
        assert_eq!(record.sections.len(), 2);
        assert_eq!(record.sections["api_01"].len(), 1);
        assert!(record.sections["api_02"].is_empty());
    }

    #[test]
    fn test_from_value_missing_sections() {
        let raw = json!({"metadata": {"corp_name": "x"}});
        let err = CompanyRecord::from_value(&raw).unwrap_err();
        assert!(matches!(err, LookupError::MissingData { .. }));
    }

    #[test]
    fn test_section_rows_lenient() {
        assert!(section_rows(&Value::Null).is_empty());
        assert!(section_rows(&json!("oops")).is_empty());
        assert!(section_rows(&json!({"status": "013", "message": "no data"})).is_empty());

        let envelope = json!({"status": "000", "list": [{"a": "1"}, {"a": "2"}]});
        assert_eq!(section_rows(&envelope).len(), 2);

        let mixed = json!([{"a": "1"}, 3, "x", {"a": "2"}]);
        assert_eq!(section_rows(&mixed).len(), 2);
    }

    #[test]
    fn test_row_field_order_preserved() {
        let raw = json!({"sections": {"api_01": [{"z": "1", "a": "2", "m": "3"}]}});
        let record = CompanyRecord::from_value(&raw).unwrap();
        let keys: Vec<&str> = record.sections["api_01"][0].keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_mistyped_metadata_fields_keep_the_rest() {
        let raw = json!({
            "metadata": {
                "corp_name": "카카오",
                "corp_code": 258801,
                "stock_code": "035720",
                "collection_date": "2025-05-15",
                "successful_apis": "3",
                "year_quarter": ["2025", "Q1"]
            },
            "api_data": {}
        });
        let meta = CompanyRecord::from_value(&raw).unwrap().metadata;
        assert_eq!(meta.corp_name.as_deref(), Some("카카오"));
        assert_eq!(meta.corp_code.as_deref(), Some("258801"));
        assert_eq!(meta.stock_code.as_deref(), Some("035720"));
        assert_eq!(meta.collection_date.as_deref(), Some("2025-05-15"));
        assert_eq!(meta.successful_apis, Some(3));
        assert_eq!(meta.year_quarter, None);
        assert_eq!(meta.extra["year_quarter"], json!(["2025", "Q1"]));
    }

    #[test]
    fn test_unreadable_count_moves_to_extra() {
        let meta =
            RecordMetadata::from_value(&json!({"corp_name": "카카오", "successful_apis": "many"}));
        assert_eq!(meta.corp_name.as_deref(), Some("카카오"));
        assert_eq!(meta.successful_apis, None);
        assert_eq!(meta.extra["successful_apis"], json!("many"));
        assert_eq!(RecordMetadata::from_value(&json!("oops")), RecordMetadata::default());
    }

    #[test]
    fn test_period_label_fallback() {
        let meta: RecordMetadata =
            serde_json::from_value(json!({"bsns_year": "2025", "quarter": "Q1"})).unwrap();
        assert_eq!(meta.period_label().as_deref(), Some("2025_Q1"));

        let meta: RecordMetadata =
            serde_json::from_value(json!({"year_quarter": "2024_Q4"})).unwrap();
        assert_eq!(meta.period_label().as_deref(), Some("2024_Q4"));
    }
}
