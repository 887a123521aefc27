//! Rendering command results as JSON, YAML, CSV or a plain-text table.

use gridline_query::{export_csv, to_query_string, AuditEvent, FilterCondition, Page, SavedFilter};
use serde::Serialize;
use serde_json::Value as Json;
use thiserror::Error;

use crate::cli::OutputFormat;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV serialization failed: {0}")]
    Csv(String),
}

/// Renders one page of query results.
///
/// JSON and YAML carry the pagination metadata; CSV holds only the rows;
/// text is a table followed by a page footer.
pub fn render_page(page: &Page<&Json>, format: OutputFormat) -> Result<String, OutputError> {
    match format {
        OutputFormat::Json => structured(page, format),
        OutputFormat::Yaml => structured(page, format),
        OutputFormat::Csv => {
            let (headers, rows) = record_rows(&page.items);
            write_csv(&headers, &rows)
        }
        OutputFormat::Text => {
            if page.is_empty() {
                return Ok(format!(
                    "No matching records ({} in total).\n",
                    page.total_items
                ));
            }
            let (headers, rows) = record_rows(&page.items);
            Ok(format!(
                "{}\nPage {} of {}, {} records\n",
                text_table(&headers, &rows),
                page.current_page,
                page.total_pages.max(1),
                page.total_items
            ))
        }
    }
}

/// Renders saved filters. Tabular formats show each filter's query string.
pub fn render_filters(filters: &[SavedFilter], format: OutputFormat) -> Result<String, OutputError> {
    match format {
        OutputFormat::Json | OutputFormat::Yaml => structured(&filters, format),
        OutputFormat::Csv | OutputFormat::Text => {
            if format == OutputFormat::Text && filters.is_empty() {
                return Ok("No saved filters.\n".to_string());
            }
            let headers = ["name", "conditions", "description", "updated"].map(String::from);
            let rows: Vec<Vec<String>> = filters
                .iter()
                .map(|f| {
                    vec![
                        f.name.clone(),
                        to_query_string(&f.conditions),
                        f.description.clone().unwrap_or_default(),
                        f.updated_at.format("%Y-%m-%d %H:%M").to_string(),
                    ]
                })
                .collect();
            if format == OutputFormat::Csv {
                write_csv(&headers, &rows)
            } else {
                Ok(text_table(&headers, &rows))
            }
        }
    }
}

/// Renders decoded conditions.
pub fn render_conditions(
    conditions: &[FilterCondition],
    format: OutputFormat,
) -> Result<String, OutputError> {
    let headers = ["field", "operator", "value"].map(String::from);
    let rows = || {
        conditions
            .iter()
            .map(|c| vec![c.field.clone(), c.operator.to_string(), c.value.to_text()])
            .collect::<Vec<_>>()
    };
    match format {
        OutputFormat::Json | OutputFormat::Yaml => structured(&conditions, format),
        OutputFormat::Csv => write_csv(&headers, &rows()),
        OutputFormat::Text => Ok(text_table(&headers, &rows())),
    }
}

/// Renders audit events. CSV uses the audit export layout.
pub fn render_audit(events: &[AuditEvent], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json | OutputFormat::Yaml => Ok(structured(&events, format)?),
        OutputFormat::Csv => {
            let mut csv = export_csv(events)?;
            csv.push('\n');
            Ok(csv)
        }
        OutputFormat::Text => {
            if events.is_empty() {
                return Ok("No audit events.\n".to_string());
            }
            let headers = ["time", "user", "action", "resource", "status", "details"]
                .map(String::from);
            let rows: Vec<Vec<String>> = events
                .iter()
                .map(|e| {
                    vec![
                        e.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                        e.actor().to_string(),
                        e.event.action.as_str().to_string(),
                        e.event.resource.clone(),
                        e.event.status.as_str().to_string(),
                        e.event.details.clone().unwrap_or_default(),
                    ]
                })
                .collect();
            Ok(text_table(&headers, &rows))
        }
    }
}

fn structured<T: Serialize + ?Sized>(data: &T, format: OutputFormat) -> Result<String, OutputError> {
    match format {
        OutputFormat::Yaml => Ok(serde_yaml::to_string(data)?),
        _ => {
            let mut json = serde_json::to_string_pretty(data)?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Splits records into a header row and cell rows.
///
/// Headers are the union of object keys in first-seen order. Records that
/// are not objects land in a single `value` column.
fn record_rows(items: &[&Json]) -> (Vec<String>, Vec<Vec<String>>) {
    let mut headers: Vec<String> = Vec::new();
    let mut scalar = false;
    for item in items {
        match item {
            Json::Object(obj) => {
                for key in obj.keys() {
                    if !headers.iter().any(|h| h == key) {
                        headers.push(key.clone());
                    }
                }
            }
            _ => scalar = true,
        }
    }
    if scalar {
        headers.push("value".to_string());
    }

    let rows = items
        .iter()
        .map(|item| match item {
            Json::Object(obj) => headers
                .iter()
                .map(|h| obj.get(h).map(value_to_string).unwrap_or_default())
                .collect(),
            other => headers
                .iter()
                .map(|h| {
                    if h == "value" {
                        value_to_string(other)
                    } else {
                        String::new()
                    }
                })
                .collect(),
        })
        .collect();
    (headers, rows)
}

fn write_csv(headers: &[String], rows: &[Vec<String>]) -> Result<String, OutputError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    if !headers.is_empty() {
        wtr.write_record(headers)
            .map_err(|e| OutputError::Csv(e.to_string()))?;
    }
    for row in rows {
        wtr.write_record(row)
            .map_err(|e| OutputError::Csv(e.to_string()))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| OutputError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| OutputError::Csv(e.to_string()))
}

/// Left-aligned columns separated by two spaces.
fn text_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| {
                let pad = width.saturating_sub(cell.chars().count());
                format!("{cell}{}", " ".repeat(pad))
            })
            .collect();
        let mut text = padded.join("  ").trim_end().to_string();
        text.push('\n');
        text
    };

    let mut out = line(headers);
    for row in rows {
        out.push_str(&line(row));
    }
    out
}

/// Converts a JSON value to a cell.
fn value_to_string(v: &Json) -> String {
    match v {
        Json::String(s) => s.clone(),
        Json::Null => String::new(),
        other => other.to_string(),
    }
}
