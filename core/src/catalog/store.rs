//! file: core/src/catalog/store.rs
//! description: append-only catalog and localization stores.
//!
//! Both stores only ever grow: an existing id or key is never replaced. A
//! missing file loads as an empty store; anything else that fails to load is
//! fatal, so a run never silently drops previously generated entries.

use std::collections::BTreeMap;
use std::path::Path;

use crate::catalog::entry::CatalogEntry;
use crate::catalog::err::CatalogError;
use crate::error::BlockwrightErrorExt;

/// Write `contents` next to `path` and rename it into place.
pub(crate) fn write_atomically(path: &Path, contents: &str, issuer: &str) -> Result<(), Box<dyn BlockwrightErrorExt>> {
    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = std::path::PathBuf::from(temp);
    std::fs::write(&temp, contents).map_err(|e| CatalogError::boxed(format!("write: {}", e), issuer, &temp))?;
    std::fs::rename(&temp, path).map_err(|e| {
        let _ = std::fs::remove_file(&temp);
        CatalogError::boxed(format!("rename: {}", e), issuer, path)
    })
}

fn read_if_exists(path: &Path, issuer: &str) -> Result<Option<String>, Box<dyn BlockwrightErrorExt>> {
    match std::fs::read_to_string(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(CatalogError::boxed(format!("read: {}", e), issuer, path)),
    }
}

/// Catalog entries keyed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog::default()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Catalog, Box<dyn BlockwrightErrorExt>> {
        const ISSUER: &str = "blockwright.catalog.store.load";
        let path = path.as_ref();
        let mut catalog = Catalog::new();
        let Some(raw) = read_if_exists(path, ISSUER)? else {
            return Ok(catalog);
        };
        if raw.trim().is_empty() {
            return Ok(catalog);
        }
        let entries: Vec<CatalogEntry> =
            serde_json::from_str(&raw).map_err(|e| CatalogError::boxed(format!("parse: {}", e), ISSUER, path))?;
        for entry in entries {
            catalog.insert_if_absent(entry);
        }
        Ok(catalog)
    }

    /// Add `entry` unless its id is already present. Returns whether it was added.
    pub fn insert_if_absent(&mut self, entry: CatalogEntry) -> bool {
        if self.entries.contains_key(&entry.id) {
            return false;
        }
        self.entries.insert(entry.id.clone(), entry);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    pub fn to_json(&self) -> Result<String, Box<dyn BlockwrightErrorExt>> {
        let entries: Vec<&CatalogEntry> = self.entries.values().collect();
        serde_json::to_string_pretty(&entries).map_err(|e| {
            Box::new(CatalogError::with(
                crate::error::Level::Critical,
                format!("encode catalog: {}", e),
                "blockwright.catalog.store.to_json",
                None,
            )) as Box<dyn BlockwrightErrorExt>
        })
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn BlockwrightErrorExt>> {
        write_atomically(path.as_ref(), &self.to_json()?, "blockwright.catalog.store.write")
    }
}

/// Display strings keyed by `<id>.title`, `<id>.category` and `<id>.parameters`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Localization {
    entries: BTreeMap<String, String>,
}

impl Localization {
    pub fn new() -> Self {
        Localization::default()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Localization, Box<dyn BlockwrightErrorExt>> {
        const ISSUER: &str = "blockwright.catalog.store.load";
        let path = path.as_ref();
        match read_if_exists(path, ISSUER)? {
            Some(raw) => Localization::parse(&raw).map_err(|(line, text)| {
                CatalogError::boxed(format!("line {}: expected key=value, found '{}'", line, text), ISSUER, path)
            }),
            None => Ok(Localization::new()),
        }
    }

    /// Parse `key=value` lines, split at the first `=`. On error returns the
    /// 1-based line number and its text.
    pub fn parse(raw: &str) -> Result<Localization, (usize, String)> {
        let mut labels = Localization::new();
        for (index, line) in raw.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match line.split_once('=') {
                Some((key, value)) => {
                    labels.put_if_absent(key, value);
                }
                None => return Err((index + 1, line.to_string())),
            }
        }
        Ok(labels)
    }

    /// Set `key` unless it already has a value. Returns whether it was set.
    pub fn put_if_absent(&mut self, key: &str, value: &str) -> bool {
        if self.entries.contains_key(key) {
            return false;
        }
        self.entries.insert(key.to_string(), value.to_string());
        true
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Lines sorted by key, joined with `\n`.
    pub fn to_text(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn BlockwrightErrorExt>> {
        write_atomically(path.as_ref(), &self.to_text(), "blockwright.catalog.store.write")
    }
}
