use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::db::models::{Collection, Font};
use crate::library::{LibraryError, Result};

pub const CSV_HEADER: &str = "Name,Family,Style,Weight,Format,License,Category,Date Installed,Path";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(LibraryError::validation(format!("unsupported export format '{other}'"))),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportedCollection<'a> {
    name: &'a str,
    description: &'a str,
    created_at: &'a DateTime<Utc>,
}

#[derive(Serialize)]
struct ExportDocument<'a> {
    collection: ExportedCollection<'a>,
    fonts: &'a [Font],
}

/// Looks up the collection's font ids in `fonts`, keeping the collection's
/// order. Ids without a matching font are skipped.
pub fn resolve_fonts(collection: &Collection, fonts: Vec<Font>) -> Vec<Font> {
    let mut by_id: HashMap<String, Font> = fonts.into_iter().map(|f| (f.id.clone(), f)).collect();
    collection
        .font_ids
        .iter()
        .filter_map(|id| by_id.remove(id))
        .collect()
}

pub fn render(collection: &Collection, fonts: &[Font], format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Csv => Ok(to_csv(fonts)),
        ExportFormat::Json => to_json(collection, fonts),
    }
}

fn to_json(collection: &Collection, fonts: &[Font]) -> Result<String> {
    let document = ExportDocument {
        collection: ExportedCollection {
            name: &collection.name,
            description: &collection.description,
            created_at: &collection.created_at,
        },
        fonts,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

fn to_csv(fonts: &[Font]) -> String {
    let mut lines = Vec::with_capacity(fonts.len() + 1);
    lines.push(CSV_HEADER.to_string());
    for font in fonts {
        let installed = font.date_installed.to_rfc3339_opts(SecondsFormat::AutoSi, true);
        lines.push(format!(
            "{},{},{},{},{},{},{},{},{}",
            quote(&font.name),
            quote(&font.family),
            quote(&font.style),
            font.weight,
            quote(font.format.as_str()),
            quote(font.license.as_str()),
            quote(font.category.as_str()),
            quote(&installed),
            quote(&font.path),
        ));
    }
    lines.join("\n")
}

/// Wraps a field in double quotes, doubling any quote inside it.
fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::FontDraft;

    fn sample(name: &str) -> Font {
        FontDraft::new(name, "sans-serif", format!("/fonts/{name}.otf"))
            .into_font("u", Utc::now())
            .unwrap()
    }

    fn collection_with(ids: &[&str]) -> Collection {
        let mut c = Collection::new("u", "Brand", "Corporate faces", "#3B82F6", Utc::now()).unwrap();
        c.font_ids = ids.iter().map(|s| s.to_string()).collect();
        c
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!(matches!("xml".parse::<ExportFormat>(), Err(LibraryError::Validation(_))));
    }

    #[test]
    fn test_resolve_skips_dangling_and_keeps_order() {
        let a = sample("A");
        let b = sample("B");
        let collection = collection_with(&[&b.id, "gone", &a.id]);
        let resolved = resolve_fonts(&collection, vec![a.clone(), b.clone(), sample("C")]);
        assert_eq!(resolved, vec![b, a]);
    }

    #[test]
    fn test_csv_layout() {
        let font = sample("Inter Regular");
        let collection = collection_with(&[&font.id]);
        let csv = render(&collection, std::slice::from_ref(&font), ExportFormat::Csv).unwrap();

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], CSV_HEADER);
        assert!(lines[1].starts_with(r#""Inter Regular","Inter Regular","Regular",400,"TTF","free","sans-serif","#));
        assert!(lines[1].ends_with(r#","/fonts/Inter Regular.otf""#));
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn test_csv_escapes_embedded_quotes() {
        let mut font = sample("Quoted");
        font.name = r#"The "Best" Sans"#.to_string();
        let csv = render(&collection_with(&[]), &[font], ExportFormat::Csv).unwrap();
        assert!(csv.contains(r#""The ""Best"" Sans""#));
    }

    #[test]
    fn test_empty_collection_csv_is_header_only() {
        let csv = render(&collection_with(&[]), &[], ExportFormat::Csv).unwrap();
        assert_eq!(csv, CSV_HEADER);
    }

    #[test]
    fn test_json_document_round_trips_ids() {
        let a = sample("A");
        let b = sample("B");
        let collection = collection_with(&[&a.id, "gone", &b.id]);
        let fonts = resolve_fonts(&collection, vec![b.clone(), a.clone()]);
        let json = render(&collection, &fonts, ExportFormat::Json).unwrap();

        assert!(json.contains("\n  \"collection\": {\n    \"name\": \"Brand\""));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["collection"]["description"], "Corporate faces");
        assert!(value["collection"]["createdAt"].is_string());
        let ids: Vec<&str> = value["fonts"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec![a.id.as_str(), b.id.as_str()]);

        let parsed: Vec<Font> = serde_json::from_value(value["fonts"].clone()).unwrap();
        assert_eq!(parsed, vec![a, b]);
    }
}
