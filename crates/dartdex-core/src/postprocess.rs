//! Record post-processing: nested section rows → rendered tables.
//!
//! Every row drops a fixed set of identifier fields that repeat the record
//! metadata ([`EXCLUDED_FIELDS`]). Each section then renders one of:
//!
//! - **no data**: the section has zero rows;
//! - **key/value**: exactly one row, shown as a `Field | Value` table;
//! - **table**: several rows, one column per field;
//! - **no relevant data**: rows exist but every field was excluded.
//!
//! Sections come out sorted by identifier. Processing is a pure function of
//! the input document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::Result;
use crate::models::{CompanyRecord, RecordMetadata, Row};
use crate::sections;

/// Fields removed from every row before rendering.
pub const EXCLUDED_FIELDS: [&str; 5] = ["rcept_no", "corp_cls", "corp_code", "corp_name", "stlm_dt"];

/// Placeholder for a cell whose row lacks the column's field.
pub const MISSING_CELL: &str = "-";

pub fn is_excluded(field: &str) -> bool {
    EXCLUDED_FIELDS.contains(&field)
}

/// How the header of a multi-row section is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderMode {
    /// Union of every row's fields, in first-seen order. No value is lost.
    #[default]
    Union,
    /// Fields of the first row only; later rows' extra fields are dropped.
    FirstRow,
}

/// Rendered shape of one section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionTable {
    NoData,
    NoRelevantData,
    KeyValue {
        rows: Vec<(String, String)>,
    },
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

/// One processed section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedSection {
    pub id: String,
    /// Human title from the section catalog, when the id is known.
    pub title: Option<String>,
    pub table: SectionTable,
}

impl RenderedSection {
    pub fn heading(&self) -> String {
        match &self.title {
            Some(title) => format!("## {} - {}", self.id, title),
            None => format!("## {}", self.id),
        }
    }

    /// Markdown rendering: heading line followed by the table or placeholder.
    pub fn to_markdown(&self) -> String {
        let mut lines = vec![self.heading()];
        match &self.table {
            SectionTable::NoData => lines.push("No data available".to_string()),
            SectionTable::NoRelevantData => lines.push("No relevant data".to_string()),
            SectionTable::KeyValue { rows } => {
                lines.push("| Field | Value |".to_string());
                lines.push("| --- | --- |".to_string());
                for (field, value) in rows {
                    lines.push(format!(
                        "| {} | {} |",
                        markdown_cell(field),
                        markdown_cell(value)
                    ));
                }
            }
            SectionTable::Table { headers, rows } => {
                lines.push(markdown_row(headers));
                lines.push(format!("| {} |", vec!["---"; headers.len()].join(" | ")));
                for row in rows {
                    lines.push(markdown_row(row));
                }
            }
        }
        lines.join("\n")
    }
}

fn markdown_row(cells: &[String]) -> String {
    let cells: Vec<String> = cells.iter().map(|c| markdown_cell(c)).collect();
    format!("| {} |", cells.join(" | "))
}

/// Escapes a cell for a markdown table row: `|` is backslash-escaped and
/// line breaks become `<br>`.
pub fn markdown_cell(text: &str) -> String {
    text.replace('|', "\\|")
        .replace("\r\n", "<br>")
        .replace(['\n', '\r'], "<br>")
}

/// A fully processed record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedReport {
    pub metadata: RecordMetadata,
    pub sections: BTreeMap<String, RenderedSection>,
}

impl ProcessedReport {
    /// JSON form: metadata as-is, each section as its markdown string.
    pub fn to_json(&self) -> Value {
        let sections: Map<String, Value> = self
            .sections
            .iter()
            .map(|(id, s)| (id.clone(), Value::String(s.to_markdown())))
            .collect();
        serde_json::json!({
            "metadata": self.metadata,
            "sections": sections,
        })
    }

    /// Metadata header block for the markdown document.
    pub fn metadata_markdown(&self) -> String {
        let m = &self.metadata;
        let or_dash = |v: &Option<String>| v.clone().unwrap_or_else(|| MISSING_CELL.to_string());
        [
            format!(
                "# {} - {}",
                m.corp_name.as_deref().unwrap_or("Unknown"),
                m.period_label().unwrap_or_else(|| "Unknown".to_string())
            ),
            format!("- **stock_code**: {}", or_dash(&m.stock_code)),
            format!("- **corp_code**: {}", or_dash(&m.corp_code)),
            format!("- **collection_date**: {}", or_dash(&m.collection_date)),
            format!("- **successful_apis**: {}", m.successful_apis.unwrap_or(0)),
        ]
        .join("\n")
    }

    /// Markdown document: metadata header, then every section.
    pub fn to_markdown(&self) -> String {
        let mut parts = vec![self.metadata_markdown()];
        parts.extend(self.sections.values().map(|s| s.to_markdown()));
        let mut doc = parts.join("\n\n");
        doc.push('\n');
        doc
    }
}

/// Turns raw records into [`ProcessedReport`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostProcessor {
    header_mode: HeaderMode,
}

impl PostProcessor {
    pub fn new(header_mode: HeaderMode) -> Self {
        Self { header_mode }
    }

    /// Processes a raw record document.
    ///
    /// Fails with [`LookupError::MissingData`](crate::LookupError::MissingData)
    /// if the document has neither `sections` nor `api_data`.
    pub fn process(&self, raw: &Value) -> Result<ProcessedReport> {
        let record = CompanyRecord::from_value(raw)?;
        Ok(self.process_record(&record))
    }

    pub fn process_record(&self, record: &CompanyRecord) -> ProcessedReport {
        let sections = record
            .sections
            .iter()
            .map(|(id, rows)| (id.clone(), self.render_section(id, rows)))
            .collect();
        ProcessedReport {
            metadata: record.metadata.clone(),
            sections,
        }
    }

    pub fn render_section(&self, id: &str, rows: &[Row]) -> RenderedSection {
        let table = match rows {
            [] => SectionTable::NoData,
            [row] => {
                let pairs: Vec<(String, String)> = row
                    .iter()
                    .filter(|(k, _)| !is_excluded(k))
                    .map(|(k, v)| (k.clone(), cell_text(v)))
                    .collect();
                if pairs.is_empty() {
                    SectionTable::NoRelevantData
                } else {
                    SectionTable::KeyValue { rows: pairs }
                }
            }
            _ => {
                let headers = self.headers(rows);
                if headers.is_empty() {
                    SectionTable::NoRelevantData
                } else {
                    let body: Vec<Vec<String>> = rows
                        .iter()
                        .map(|row| {
                            headers
                                .iter()
                                .map(|h| {
                                    row.get(h)
                                        .map(cell_text)
                                        .unwrap_or_else(|| MISSING_CELL.to_string())
                                })
                                .collect()
                        })
                        .collect();
                    SectionTable::Table {
                        headers,
                        rows: body,
                    }
                }
            }
        };

        RenderedSection {
            id: id.to_string(),
            title: sections::lookup(id).map(|s| s.title.to_string()),
            table,
        }
    }

    fn headers(&self, rows: &[Row]) -> Vec<String> {
        let mut headers: Vec<String> = Vec::new();
        let source: &[Row] = match self.header_mode {
            HeaderMode::FirstRow => &rows[..1],
            HeaderMode::Union => rows,
        };
        for row in source {
            for key in row.keys() {
                if !is_excluded(key) && !headers.iter().any(|h| h == key) {
                    headers.push(key.clone());
                }
            }
        }
        headers
    }
}

/// Text of one cell: strings verbatim, `null` as `-`, anything else as JSON.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => MISSING_CELL.to_string(),
        other => other.to_string(),
    }
}
