//! Zotero API items.

use super::{null_as_default, BibliographicRecord, Source};
use serde::{Deserialize, Serialize};

/// An item as returned by the Zotero web API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoteroItem {
    #[serde(deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub data: ZoteroItemData,
}

/// The `data` payload of a Zotero item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ZoteroItemData {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub item_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub abstract_note: String,
    #[serde(deserialize_with = "null_as_default")]
    pub creators: Vec<ZoteroCreator>,
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<ZoteroTag>,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub date: String,
}

/// A creator entry. Single-field names use `name` instead of first/last.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ZoteroCreator {
    #[serde(deserialize_with = "null_as_default")]
    pub creator_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoteroTag {
    #[serde(deserialize_with = "null_as_default")]
    pub tag: String,
}

impl ZoteroCreator {
    fn display_name(&self) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        [self.first_name.as_str(), self.last_name.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<ZoteroItem> for BibliographicRecord {
    fn from(item: ZoteroItem) -> Self {
        let data = item.data;
        let authors = data
            .creators
            .iter()
            .filter(|c| c.creator_type.is_empty() || c.creator_type == "author")
            .map(ZoteroCreator::display_name)
            .filter(|name| !name.is_empty())
            .collect();

        BibliographicRecord {
            title: data.title,
            authors,
            abstract_note: data.abstract_note,
            tags: data.tags.into_iter().map(|t| t.tag).collect(),
        }
    }
}

impl From<ZoteroItem> for Source {
    fn from(item: ZoteroItem) -> Self {
        Source::Bibliographic(item.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_authors_are_kept() {
        let item: ZoteroItem = serde_json::from_str(
            r#"{"data": {"title": "T", "creators": [
                {"creatorType": "author", "firstName": "Ada", "lastName": "Lee"},
                {"creatorType": "editor", "firstName": "Bo", "lastName": "Kim"},
                {"creatorType": "author", "name": "IPCC"}
            ]}}"#,
        )
        .unwrap();

        let record = BibliographicRecord::from(item);
        assert_eq!(record.authors, vec!["Ada Lee".to_string(), "IPCC".to_string()]);
        assert!(record.abstract_note.is_empty());
    }
}
