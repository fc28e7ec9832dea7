//! Bibliography file import (BibTeX and CSV exports).

use super::{BibliographicRecord, Source};
use regex::Regex;
use std::sync::OnceLock;
use tracing::warn;

fn entry_regex() -> &'static Regex {
    static ENTRY: OnceLock<Regex> = OnceLock::new();
    ENTRY.get_or_init(|| {
        Regex::new(r"@(\w+)\s*\{").expect("BibTeX entry pattern is valid")
    })
}

/// Parse BibTeX entries into bibliographic sources.
///
/// Uses `title`, `author` (split on " and "), `abstract` and `keywords`
/// (split on commas and semicolons). Malformed entries are skipped.
pub fn parse_bibtex(content: &str) -> Vec<Source> {
    let mut sources = Vec::new();
    let mut pos = 0;

    while let Some(caps) = entry_regex().captures_at(content, pos) {
        let Some(whole) = caps.get(0) else { break };
        let kind = caps[1].to_lowercase();

        let Some(body) = balanced_body(&content[whole.end()..]) else {
            warn!("Skipping unterminated BibTeX entry @{}", kind);
            pos = whole.end();
            continue;
        };
        // Resume after the closing brace; an `@` inside a field is not an entry
        pos = whole.end() + body.len() + 1;

        if matches!(kind.as_str(), "comment" | "preamble" | "string") {
            continue;
        }

        let fields = parse_fields(body);
        let field = |name: &str| {
            fields
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
                .unwrap_or_default()
        };

        let authors = split_list(&field("author"), &[" and "]);
        let tags = split_list(&field("keywords"), &[",", ";"]);

        sources.push(Source::Bibliographic(BibliographicRecord {
            title: field("title"),
            authors,
            abstract_note: field("abstract"),
            tags,
        }));
    }

    sources
}

/// Parse a CSV export into bibliographic sources.
///
/// The header row must name the columns; `title`, `authors`, `abstract` and `tags`
/// are used, with `;` separating multiple authors or tags.
pub fn parse_csv(content: &str) -> Vec<Source> {
    let mut rows = parse_csv_rows(content).into_iter();
    let Some(header) = rows.next() else {
        return Vec::new();
    };
    let header: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();
    let column = |row: &[String], name: &str| {
        header
            .iter()
            .position(|h| h == name)
            .and_then(|idx| row.get(idx))
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    };

    rows.filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .map(|row| {
            Source::Bibliographic(BibliographicRecord {
                title: column(&row, "title"),
                authors: split_list(&column(&row, "authors"), &[";"]),
                abstract_note: column(&row, "abstract"),
                tags: split_list(&column(&row, "tags"), &[";"]),
            })
        })
        .collect()
}

/// Return the text inside the braces of an entry whose opening brace was just consumed.
fn balanced_body(rest: &str) -> Option<&str> {
    let mut depth = 1usize;
    for (idx, ch) in rest.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&rest[..idx]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse `key = {value}` / `key = "value"` / `key = 123` fields after the citation key.
fn parse_fields(body: &str) -> Vec<(String, String)> {
    let mut fields = Vec::new();
    // Skip the citation key
    let Some(start) = body.find(',') else {
        return fields;
    };
    let mut rest = &body[start + 1..];

    loop {
        let Some(eq) = rest.find('=') else { break };
        let name = rest[..eq].trim().trim_start_matches(',').trim().to_lowercase();
        let after = rest[eq + 1..].trim_start();

        let (value, remainder) = match after.chars().next() {
            Some('{') => match balanced_body(&after[1..]) {
                Some(inner) => (inner.to_string(), &after[1 + inner.len() + 1..]),
                None => break,
            },
            Some('"') => match after[1..].find('"') {
                Some(end) => (after[1..1 + end].to_string(), &after[end + 2..]),
                None => break,
            },
            Some(_) => {
                let end = after.find(',').unwrap_or(after.len());
                (after[..end].trim().to_string(), &after[end..])
            }
            None => break,
        };

        if !name.is_empty() {
            fields.push((name, clean_value(&value)));
        }
        rest = remainder;
    }

    fields
}

/// Drop nested braces and collapse whitespace.
fn clean_value(value: &str) -> String {
    value
        .replace(['{', '}'], "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn split_list(value: &str, separators: &[&str]) -> Vec<String> {
    let mut parts = vec![value.to_string()];
    for sep in separators {
        parts = parts
            .iter()
            .flat_map(|p| p.split(sep).map(str::to_string).collect::<Vec<_>>())
            .collect();
    }
    parts
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Minimal RFC 4180 reader: quoted cells, doubled quotes, CRLF or LF line ends.
fn parse_csv_rows(content: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    cell.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => cell.push(ch),
            }
            continue;
        }

        match ch {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut cell)),
            '\r' => {}
            '\n' => {
                row.push(std::mem::take(&mut cell));
                rows.push(std::mem::take(&mut row));
            }
            _ => cell.push(ch),
        }
    }

    if !cell.is_empty() || !row.is_empty() {
        row.push(cell);
        rows.push(row);
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bibtex_entries() {
        let bib = r#"
@comment{exported by Zotero}
@article{lee2023,
  title = {Ocean {Heat} Content},
  author = {Lee, Ada and Kim, Bo},
  abstract = "Oceans absorb most excess heat.",
  keywords = {climate, oceans; science},
  year = 2023
}

@book{doe2020,
  title = {Civic Life},
}
"#;

        let sources = parse_bibtex(bib);
        assert_eq!(sources.len(), 2);

        let Source::Bibliographic(first) = &sources[0] else {
            panic!("expected bibliographic source");
        };
        assert_eq!(first.title, "Ocean Heat Content");
        assert_eq!(first.authors, vec!["Lee, Ada".to_string(), "Kim, Bo".to_string()]);
        assert_eq!(first.abstract_note, "Oceans absorb most excess heat.");
        assert_eq!(first.tags, vec!["climate", "oceans", "science"]);

        assert_eq!(sources[1].title(), "Civic Life");
        assert_eq!(sources[1].extracted_text(), "");
    }

    #[test]
    fn test_entry_markers_inside_fields_are_not_entries() {
        let bib = r#"
@article{lee2023,
  title = {Citing software},
  abstract = {Cite it as @misc{tool, title = {Bogus}} in your paper.},
  keywords = {software}
}
@comment{old entry: @book{gone, title = {Gone}}}
@book{doe2020,
  title = {Civic Life},
}
"#;

        let sources = parse_bibtex(bib);
        let titles: Vec<&str> = sources.iter().map(Source::title).collect();
        assert_eq!(titles, vec!["Citing software", "Civic Life"]);
        assert_eq!(
            sources[0].extracted_text(),
            "Cite it as @misctool, title = Bogus in your paper."
        );
    }

    #[test]
    fn test_parse_csv_with_quotes() {
        let csv = "title,authors,abstract,tags\r\n\
                   \"Heat, and more\",Ada Lee; Bo Kim,\"She said \"\"hi\"\"\",climate;policy\r\n\
                   ,,,\r\n";

        let sources = parse_csv(csv);
        assert_eq!(sources.len(), 1);

        let Source::Bibliographic(record) = &sources[0] else {
            panic!("expected bibliographic source");
        };
        assert_eq!(record.title, "Heat, and more");
        assert_eq!(record.authors, vec!["Ada Lee", "Bo Kim"]);
        assert_eq!(record.abstract_note, "She said \"hi\"");
        assert_eq!(record.tags, vec!["climate", "policy"]);
    }

    #[test]
    fn test_parse_csv_empty_input() {
        assert!(parse_csv("").is_empty());
        assert!(parse_csv("title,abstract\n").is_empty());
    }
}
