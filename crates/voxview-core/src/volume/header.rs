use std::collections::HashMap;
use std::path::Path;

use dicom::core::dictionary::{DataDictionary, DataDictionaryEntry};
use dicom::core::Tag;
use dicom::dictionary_std::StandardDataDictionary;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{HEADER_TRUNCATE_LENGTH, HEADER_TRUNCATE_THRESHOLD};
use crate::error::Result;

/// One header element as read from the source file.
#[derive(Clone, Debug, PartialEq)]
pub struct HeaderElement {
    pub tag: Tag,
    /// Printable value, `None` when the element has no string form
    /// (sequences, encapsulated data, ...).
    pub value: Option<String>,
    /// Declared element length in bytes, when defined.
    pub length: Option<u32>,
}

impl HeaderElement {
    pub fn new(tag: Tag, value: impl Into<String>, length: Option<u32>) -> Self {
        Self {
            tag,
            value: Some(value.into()),
            length,
        }
    }

    pub fn unprintable(tag: Tag, length: Option<u32>) -> Self {
        Self {
            tag,
            value: None,
            length,
        }
    }

    pub fn entry(&self) -> Option<HeaderEntry<'_>> {
        self.value.as_deref().map(|value| HeaderEntry {
            tag: self.tag,
            value,
            length: self.length,
        })
    }
}

/// A printable header element borrowed from a volume.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeaderEntry<'a> {
    pub tag: Tag,
    pub value: &'a str,
    pub length: Option<u32>,
}

impl HeaderEntry<'_> {
    /// Tag formatted as `(GGGG,EEEE)`.
    pub fn key(&self) -> String {
        tag_key(self.tag)
    }
}

/// Row of the header table: display name and (possibly truncated) value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HeaderRow {
    pub name: String,
    pub value: String,
}

/// How header values are shortened for display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeaderDisplayConfig {
    /// Elements longer than this many bytes are truncated.
    #[serde(default = "default_truncate_threshold")]
    pub truncate_threshold: u32,
    /// Characters kept from a truncated value.
    #[serde(default = "default_truncate_length")]
    pub truncate_length: usize,
}

fn default_truncate_threshold() -> u32 {
    HEADER_TRUNCATE_THRESHOLD
}
fn default_truncate_length() -> usize {
    HEADER_TRUNCATE_LENGTH
}

impl Default for HeaderDisplayConfig {
    fn default() -> Self {
        Self {
            truncate_threshold: HEADER_TRUNCATE_THRESHOLD,
            truncate_length: HEADER_TRUNCATE_LENGTH,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct DictionaryFile {
    #[serde(default)]
    names: HashMap<String, String>,
}

/// Maps header tags to human-readable names.
///
/// Built once at startup and handed to whatever formats header output.
/// Explicit entries win over the standard DICOM dictionary.
#[derive(Clone, Debug, Default)]
pub struct HeaderDictionary {
    names: HashMap<String, String>,
    standard: bool,
}

impl HeaderDictionary {
    /// Dictionary with no names; keys are shown as raw tags.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Dictionary backed by the standard DICOM data dictionary.
    pub fn standard() -> Self {
        Self {
            names: HashMap::new(),
            standard: true,
        }
    }

    pub fn from_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut dictionary = Self::empty();
        for (key, name) in entries {
            dictionary.insert(key.as_ref(), name);
        }
        dictionary
    }

    /// Add the `[names]` table of a TOML document on top of this dictionary.
    pub fn with_overrides_toml(mut self, text: &str) -> Result<Self> {
        let file: DictionaryFile = toml::from_str(text)?;
        for (key, name) in file.names {
            self.insert(&key, name);
        }
        Ok(self)
    }

    pub fn load_overrides(self, path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let dictionary = self.with_overrides_toml(&text)?;
        debug!(path = %path.display(), names = dictionary.names.len(), "Loaded header names");
        Ok(dictionary)
    }

    pub fn insert(&mut self, key: &str, name: impl Into<String>) {
        self.names.insert(normalize_key(key), name.into());
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && !self.standard
    }

    pub fn lookup(&self, tag: Tag) -> Option<String> {
        if let Some(name) = self.names.get(&tag_key(tag)) {
            return Some(name.clone());
        }
        if self.standard {
            return StandardDataDictionary
                .by_tag(tag)
                .map(|entry| entry.alias().to_string());
        }
        None
    }

    /// Display name for a tag, falling back to the raw `(GGGG,EEEE)` key.
    pub fn display_name(&self, tag: Tag) -> String {
        self.lookup(tag).unwrap_or_else(|| tag_key(tag))
    }
}

/// Turn header entries into table rows, naming keys and truncating long values.
pub fn format_header_rows<'a>(
    entries: impl Iterator<Item = HeaderEntry<'a>>,
    dictionary: &HeaderDictionary,
    config: &HeaderDisplayConfig,
) -> Vec<HeaderRow> {
    entries
        .map(|entry| {
            let long = entry
                .length
                .is_some_and(|len| len > config.truncate_threshold);
            let value = if long {
                entry.value.chars().take(config.truncate_length).collect()
            } else {
                entry.value.to_string()
            };
            HeaderRow {
                name: dictionary.display_name(entry.tag),
                value,
            }
        })
        .collect()
}

pub fn tag_key(tag: Tag) -> String {
    format!("({:04X},{:04X})", tag.0, tag.1)
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_key_strips_spaces_and_case() {
        assert_eq!(normalize_key("(0010, 00ab)"), "(0010,00AB)");
    }

    #[test]
    fn tag_key_is_zero_padded_hex() {
        assert_eq!(tag_key(Tag(0x0008, 0x0016)), "(0008,0016)");
    }
}
