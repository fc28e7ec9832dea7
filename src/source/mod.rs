//! Source abstraction for Woohoo.
//!
//! A source is one unit of input content: the extracted text of an uploaded PDF,
//! or a bibliographic record (Zotero item, BibTeX entry, CSV row). Every source
//! normalizes to plain text plus a set of tags, and normalization never fails.

mod bibliography;
mod zotero;

pub use bibliography::{parse_bibtex, parse_csv};
pub use zotero::{ZoteroCreator, ZoteroItem, ZoteroItemData, ZoteroTag};

use crate::error::{Result, WoohooError};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, instrument};

/// Maximum number of characters a PDF contributes to the prompt.
pub const PDF_EXCERPT_CHARS: usize = 2000;

/// A unit of input content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Source {
    /// Text already extracted from an uploaded PDF.
    Pdf(PdfSource),
    /// A bibliographic record.
    Bibliographic(BibliographicRecord),
}

/// Text and metadata extracted from a PDF.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfSource {
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub metadata: PdfMetadata,
}

/// PDF document metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfMetadata {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(deserialize_with = "null_as_default")]
    pub pages: u32,
    /// Comma-separated keywords, as stored in the PDF info dictionary.
    #[serde(deserialize_with = "null_as_default")]
    pub keywords: String,
}

/// A bibliographic record such as a Zotero item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BibliographicRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub authors: Vec<String>,
    #[serde(
        rename = "abstract",
        alias = "abstractNote",
        deserialize_with = "null_as_default"
    )]
    pub abstract_note: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

/// Deserialize an explicit `null` as the type's default, like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl Source {
    /// Create a PDF source.
    pub fn pdf(text: impl Into<String>, metadata: PdfMetadata) -> Self {
        Source::Pdf(PdfSource {
            text: text.into(),
            metadata,
        })
    }

    /// Display title of the source.
    pub fn title(&self) -> &str {
        match self {
            Source::Pdf(pdf) => &pdf.metadata.title,
            Source::Bibliographic(record) => &record.title,
        }
    }

    /// Short label for the source kind.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Source::Pdf(_) => "pdf",
            Source::Bibliographic(_) => "bibliographic",
        }
    }

    /// Text this source contributes to the script prompt.
    ///
    /// PDFs contribute a bounded excerpt; bibliographic records their abstract.
    pub fn extracted_text(&self) -> &str {
        match self {
            Source::Pdf(pdf) => truncate_chars(&pdf.text, PDF_EXCERPT_CHARS),
            Source::Bibliographic(record) => &record.abstract_note,
        }
    }

    /// Tags carried by this source.
    pub fn tags(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            Source::Pdf(pdf) => pdf.metadata.keywords.split(',').collect(),
            Source::Bibliographic(record) => record.tags.iter().map(String::as_str).collect(),
        };

        raw.into_iter()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Flatten sources into a single prompt text.
///
/// Sources without text are skipped; the rest are joined by a blank line in input order.
pub fn normalize(sources: &[Source]) -> String {
    sources
        .iter()
        .map(|s| s.extracted_text().trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Collect the distinct tags of all sources.
pub fn extract_tags(sources: &[Source]) -> BTreeSet<String> {
    sources.iter().flat_map(Source::tags).collect()
}

/// Load sources from a file.
///
/// Supports `.bib` (BibTeX), `.csv` (header row with title, authors, abstract, tags)
/// and `.json` (an array of sources, or an array of Zotero API items).
#[instrument]
pub fn load_sources(path: &Path) -> Result<Vec<Source>> {
    let content = std::fs::read_to_string(path)?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let sources = match extension.as_str() {
        "bib" => parse_bibtex(&content),
        "csv" => parse_csv(&content),
        "json" => parse_json_sources(&content)?,
        _ => {
            return Err(WoohooError::UnsupportedSource(format!(
                "{} (expected .json, .bib or .csv)",
                path.display()
            )))
        }
    };

    debug!("Loaded {} sources from {}", sources.len(), path.display());
    Ok(sources)
}

fn parse_json_sources(content: &str) -> Result<Vec<Source>> {
    match serde_json::from_str::<Vec<Source>>(content) {
        Ok(sources) => Ok(sources),
        Err(source_err) => match serde_json::from_str::<Vec<ZoteroItem>>(content) {
            Ok(items) => Ok(items.into_iter().map(Source::from).collect()),
            Err(_) => Err(source_err.into()),
        },
    }
}

/// Truncate to at most `max_chars` characters without splitting a character.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf_with_keywords(text: &str, keywords: &str) -> Source {
        Source::pdf(
            text,
            PdfMetadata {
                keywords: keywords.to_string(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_extract_tags_collapses_duplicates() {
        let sources = vec![
            pdf_with_keywords("a", "ai, science"),
            pdf_with_keywords("b", "science, policy"),
        ];

        let tags = extract_tags(&sources);
        let expected: BTreeSet<String> = ["ai", "science", "policy"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(tags, expected);
    }

    #[test]
    fn test_extract_tags_keeps_case_and_mixes_kinds() {
        let sources = vec![
            pdf_with_keywords("", ""),
            Source::Bibliographic(BibliographicRecord {
                tags: vec!["Climate".to_string(), " ".to_string()],
                ..Default::default()
            }),
        ];

        let tags: Vec<String> = extract_tags(&sources).into_iter().collect();
        assert_eq!(tags, vec!["Climate".to_string()]);
    }

    #[test]
    fn test_normalize_skips_empty_sources() {
        let sources = vec![
            pdf_with_keywords("First document.", ""),
            Source::Bibliographic(BibliographicRecord {
                title: "No abstract".to_string(),
                ..Default::default()
            }),
            Source::Bibliographic(BibliographicRecord {
                abstract_note: "An abstract.".to_string(),
                ..Default::default()
            }),
        ];

        assert_eq!(normalize(&sources), "First document.\n\nAn abstract.");
        assert_eq!(normalize(&[]), "");
    }

    #[test]
    fn test_pdf_text_is_truncated_on_char_boundary() {
        let text = "é".repeat(PDF_EXCERPT_CHARS + 10);
        let source = pdf_with_keywords(&text, "");
        assert_eq!(source.extracted_text().chars().count(), PDF_EXCERPT_CHARS);
    }

    #[test]
    fn test_source_deserializes_with_missing_fields() {
        let json = r#"[
            {"kind": "pdf", "text": "Climate models show warming trends...", "metadata": {"keywords": "climate,science"}},
            {"kind": "bibliographic", "title": "Paper"},
            {"kind": "pdf"}
        ]"#;

        let sources: Vec<Source> = serde_json::from_str(json).unwrap();
        assert_eq!(sources.len(), 3);
        assert_eq!(sources[1].extracted_text(), "");
        assert!(sources[2].tags().is_empty());
        assert_eq!(sources[0].tags(), vec!["climate".to_string(), "science".to_string()]);
    }

    #[test]
    fn test_null_fields_load_as_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sources.json");
        std::fs::write(
            &path,
            r#"[
                {"kind": "pdf", "text": "Body", "metadata": {"author": null, "keywords": null}},
                {"kind": "pdf", "text": null, "metadata": null},
                {"kind": "bibliographic", "title": "Paper", "authors": null, "abstract": null, "tags": null}
            ]"#,
        )
        .unwrap();

        let sources = load_sources(&path).unwrap();
        assert_eq!(sources.len(), 3);
        assert_eq!(sources[0].extracted_text(), "Body");
        assert!(sources[0].tags().is_empty());
        assert_eq!(sources[1].extracted_text(), "");
        assert_eq!(sources[2].title(), "Paper");
        assert!(sources[2].tags().is_empty());
    }

    #[test]
    fn test_zotero_null_fields_load_as_defaults() {
        let item: ZoteroItem = serde_json::from_str(
            r#"{"key": null, "data": {"title": "T", "abstractNote": null, "url": null,
                "creators": [{"creatorType": "author", "firstName": null, "lastName": "Lee"}],
                "tags": null}}"#,
        )
        .unwrap();

        let record = BibliographicRecord::from(item);
        assert_eq!(record.authors, vec!["Lee".to_string()]);
        assert!(record.abstract_note.is_empty());
        assert!(record.tags.is_empty());
    }

    #[test]
    fn test_load_sources_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.docx");
        std::fs::write(&path, "x").unwrap();

        assert!(matches!(
            load_sources(&path),
            Err(WoohooError::UnsupportedSource(_))
        ));
    }

    #[test]
    fn test_load_sources_accepts_zotero_items() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zotero.json");
        std::fs::write(
            &path,
            r#"[{"key": "ABCD1234", "data": {"title": "Ocean heat", "abstractNote": "Oceans absorb heat.",
                "creators": [{"creatorType": "author", "firstName": "Ada", "lastName": "Lee"}],
                "tags": [{"tag": "oceans"}]}}]"#,
        )
        .unwrap();

        let sources = load_sources(&path).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].title(), "Ocean heat");
        assert_eq!(sources[0].extracted_text(), "Oceans absorb heat.");
    }
}
