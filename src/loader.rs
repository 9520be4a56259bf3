// SPDX-License-Identifier: PMPL-1.0-or-later

//! Where catalog documents come from.
//!
//! A [`CatalogSource`] maps a locale tag (`zh_CN`, `en`) to document text.
//! Sources only fetch; parsing and locale fallback live in
//! [`Catalog::load`](crate::Catalog::load).

use crate::error::CatalogError;
use crate::i18n::Locale;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Raw document text plus a label for error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub origin: String,
    pub text: String,
}

/// Supplies `.ts` documents by locale tag.
pub trait CatalogSource: Send + Sync {
    /// Document for `tag`, or `Ok(None)` when this source has none.
    fn fetch(&self, tag: &str) -> Result<Option<Resource>, CatalogError>;

    /// Human-readable name of the resource `tag` maps to.
    fn describe(&self, tag: &str) -> String;

    /// Locale tags this source has a document for, sorted.
    fn available(&self) -> Result<Vec<String>, CatalogError>;
}

/// Looks for `<dir>/<prefix><tag>.ts` in each directory, in order.
#[derive(Debug, Clone)]
pub struct FsSource {
    dirs: Vec<PathBuf>,
    prefix: String,
}

impl FsSource {
    /// Source over one directory with no file-name prefix.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dirs: vec![dir.into()],
            prefix: String::new(),
        }
    }

    /// Source searching several directories, first match wins.
    pub fn with_dirs(dirs: Vec<PathBuf>) -> Self {
        Self {
            dirs,
            prefix: String::new(),
        }
    }

    /// File-name prefix, e.g. `plotter_` for `plotter_zh_CN.ts`.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Search directories in order.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    fn file_name(&self, tag: &str) -> String {
        format!("{}{}.ts", self.prefix, tag)
    }
}

impl CatalogSource for FsSource {
    fn fetch(&self, tag: &str) -> Result<Option<Resource>, CatalogError> {
        let name = self.file_name(tag);
        for dir in &self.dirs {
            let path = dir.join(&name);
            match read_resource(&path) {
                Ok(text) => {
                    return Ok(Some(Resource {
                        origin: path.display().to_string(),
                        text,
                    }));
                }
                Err(CatalogError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                    tracing::trace!(path = %path.display(), "no catalog here");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(None)
    }

    fn describe(&self, tag: &str) -> String {
        let name = self.file_name(tag);
        match self.dirs.as_slice() {
            [dir] => dir.join(name).display().to_string(),
            _ => name,
        }
    }

    /// Tags of every `<prefix><tag>.ts` in the search directories. Names
    /// whose middle part is not a locale are ignored, so an empty prefix
    /// does not pick up `plotter_en_US.ts` as a tag.
    fn available(&self) -> Result<Vec<String>, CatalogError> {
        let mut tags = BTreeSet::new();
        for dir in &self.dirs {
            let entries = match fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(err) if err.kind() == ErrorKind::NotFound => continue,
                Err(source) => {
                    return Err(CatalogError::Io {
                        path: dir.clone(),
                        source,
                    })
                }
            };
            for entry in entries {
                let entry = entry.map_err(|source| CatalogError::Io {
                    path: dir.clone(),
                    source,
                })?;
                let name = entry.file_name();
                let Some(tag) = name
                    .to_str()
                    .and_then(|n| n.strip_prefix(self.prefix.as_str()))
                    .and_then(|n| n.strip_suffix(".ts"))
                else {
                    continue;
                };
                if Locale::parse(tag).is_ok() {
                    tags.insert(tag.to_string());
                }
            }
        }
        Ok(tags.into_iter().collect())
    }
}

/// In-memory documents keyed by locale tag. Mostly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    label: String,
    documents: HashMap<String, String>,
}

impl MemorySource {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            documents: HashMap::new(),
        }
    }

    /// Add or replace the document for `tag`.
    pub fn with(mut self, tag: impl Into<String>, text: impl Into<String>) -> Self {
        self.documents.insert(tag.into(), text.into());
        self
    }

    pub fn insert(&mut self, tag: impl Into<String>, text: impl Into<String>) {
        self.documents.insert(tag.into(), text.into());
    }
}

impl CatalogSource for MemorySource {
    fn fetch(&self, tag: &str) -> Result<Option<Resource>, CatalogError> {
        Ok(self.documents.get(tag).map(|text| Resource {
            origin: self.describe(tag),
            text: text.clone(),
        }))
    }

    fn describe(&self, tag: &str) -> String {
        format!("{}:{}", self.label, tag)
    }

    fn available(&self) -> Result<Vec<String>, CatalogError> {
        let tags: BTreeSet<&String> = self.documents.keys().collect();
        Ok(tags.into_iter().cloned().collect())
    }
}

/// Read a document from disk.
///
/// A byte-order mark selects UTF-8, UTF-16LE or UTF-16BE; without one the
/// file must be UTF-8.
pub fn read_resource(path: &Path) -> Result<String, CatalogError> {
    let bytes = fs::read(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode(&bytes).ok_or_else(|| CatalogError::Malformed {
        origin: path.display().to_string(),
        line: 1,
        column: 1,
        message: "document is not valid UTF-8 or BOM-marked UTF-16".to_string(),
    })
}

fn decode(bytes: &[u8]) -> Option<String> {
    let (encoding, bom_len) =
        encoding_rs::Encoding::for_bom(bytes).unwrap_or((encoding_rs::UTF_8, 0));
    let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
    if had_errors {
        return None;
    }
    Some(text.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn decodes_boms() {
        assert_eq!(decode(b"\xEF\xBB\xBF<TS/>").as_deref(), Some("<TS/>"));
        assert_eq!(decode(b"\xFF\xFE<\0T\0").as_deref(), Some("<T"));
        assert_eq!(decode(b"\xFE\xFF\0<\0T").as_deref(), Some("<T"));
        assert_eq!(decode("起始".as_bytes()).as_deref(), Some("起始"));
        assert_eq!(decode(b"\xC3\x28"), None);
    }

    #[test]
    fn fs_source_searches_dirs_in_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fs::write(second.path().join("app_zh.ts"), "second").unwrap();
        let source = FsSource::with_dirs(vec![first.path().into(), second.path().into()])
            .prefix("app_");

        let found = source.fetch("zh").unwrap().unwrap();
        assert_eq!(found.text, "second");
        assert!(found.origin.ends_with("app_zh.ts"));
        assert!(source.fetch("ja").unwrap().is_none());

        fs::write(first.path().join("app_zh.ts"), "first").unwrap();
        assert_eq!(source.fetch("zh").unwrap().unwrap().text, "first");
    }

    #[test]
    fn undecodable_file_is_malformed() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("en.ts"), b"\xC3\x28").unwrap();
        let err = FsSource::new(dir.path()).fetch("en").unwrap_err();
        assert!(matches!(err, CatalogError::Malformed { .. }));
    }

    #[test]
    fn memory_source_labels_origin() {
        let source = MemorySource::new("embedded").with("en_US", "<TS/>");
        let found = source.fetch("en_US").unwrap().unwrap();
        assert_eq!(found.origin, "embedded:en_US");
        assert!(source.fetch("en").unwrap().is_none());
    }

    #[test]
    fn lists_available_tags_per_prefix() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        for name in ["plotter_en_US.ts", "plotter_zh.ts", "plotter_notes.txt", "zh_CN.ts"] {
            fs::write(first.path().join(name), "").unwrap();
        }
        fs::write(second.path().join("plotter_ja.ts"), "").unwrap();
        fs::write(second.path().join("plotter_zh.ts"), "").unwrap();
        let dirs = vec![
            first.path().to_path_buf(),
            second.path().to_path_buf(),
            first.path().join("missing"),
        ];

        let plotter = FsSource::with_dirs(dirs.clone()).prefix("plotter_");
        assert_eq!(plotter.available().unwrap(), vec!["en_US", "ja", "zh"]);
        let bare = FsSource::with_dirs(dirs);
        assert_eq!(bare.available().unwrap(), vec!["zh_CN"]);
    }

    #[test]
    fn memory_source_lists_its_tags() {
        let source = MemorySource::new("embedded").with("zh_CN", "").with("en", "");
        assert_eq!(source.available().unwrap(), vec!["en", "zh_CN"]);
        assert!(MemorySource::new("empty").available().unwrap().is_empty());
    }
}
