//! The TOSCA.meta manifest: which files an archive holds and their media types.
//!
//! The file is a sequence of blank-line separated blocks of `Key: Value`
//! lines. The first block is the archive header; every block with a
//! `Name` key describes one file.
//!
//! ```text
//! TOSCA-Meta-File-Version: 1.0
//! CSAR-Version: 1.0
//! Created-By: Winery 2.0.0
//! Entry-Definitions: Definitions/app.tosca
//!
//! Name: Definitions/app.tosca
//! Content-Type: application/vnd.oasis.tosca.definitions
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use csar_fs::{CsarPath, NormalizedPath, io};
use serde::Serialize;
use walkdir::WalkDir;

use crate::{Error, Result};

/// Media type of TOSCA definitions documents.
pub const DEFINITIONS_MEDIA_TYPE: &str = "application/vnd.oasis.tosca.definitions";

const NAME_KEY: &str = "Name";
const CONTENT_TYPE_KEY: &str = "Content-Type";
const ENTRY_DEFINITIONS_KEY: &str = "Entry-Definitions";

/// One file listed in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub path: NormalizedPath,
    pub media_type: String,
    /// Further `Key: Value` lines of the entry block, in order
    pub attributes: Vec<(String, String)>,
}

/// Result of comparing the manifest with the workspace contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestAudit {
    /// Entries whose file does not exist
    pub missing: Vec<NormalizedPath>,
    /// Files without an entry (the manifest itself excluded)
    pub unregistered: Vec<NormalizedPath>,
}

impl ManifestAudit {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.unregistered.is_empty()
    }
}

/// In-memory TOSCA.meta, ordered by insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    header: Vec<(String, String)>,
    entries: Vec<ManifestEntry>,
    index: HashMap<NormalizedPath, usize>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new()
    }
}

impl Manifest {
    /// An empty manifest with a minimal header.
    pub fn new() -> Self {
        Self {
            header: vec![
                ("TOSCA-Meta-File-Version".to_string(), "1.0".to_string()),
                ("CSAR-Version".to_string(), "1.0".to_string()),
                ("Created-By".to_string(), "csar-rr".to_string()),
            ],
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Load the workspace's manifest, or start an empty one if it has none.
    pub fn init(workspace: &Path) -> Result<Self> {
        let path = NormalizedPath::new(CsarPath::MetaFile.as_str()).under(workspace);
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "No manifest, starting empty");
            return Ok(Self::new());
        }
        let manifest = Self::parse(&io::read_text(&path)?, &path)?;
        tracing::debug!(entries = manifest.len(), "Loaded manifest");
        Ok(manifest)
    }

    /// Parse manifest text. `origin` is only used in error messages.
    pub fn parse(text: &str, origin: &Path) -> Result<Self> {
        let mut manifest = Self {
            header: Vec::new(),
            entries: Vec::new(),
            index: HashMap::new(),
        };

        let mut block: Vec<(String, String)> = Vec::new();
        let mut first_block = true;
        for (number, raw) in text.lines().enumerate() {
            let line = raw.trim_end_matches('\r');
            if line.trim().is_empty() {
                if !block.is_empty() {
                    manifest.absorb_block(std::mem::take(&mut block), first_block);
                    first_block = false;
                }
                continue;
            }
            // Continuation of the previous value
            if let Some(rest) = line.strip_prefix(' ') {
                match block.last_mut() {
                    Some((_, value)) => value.push_str(rest),
                    None => {
                        return Err(Error::ManifestParse {
                            path: origin.to_path_buf(),
                            line: number + 1,
                            message: "continuation line without a preceding key".into(),
                        });
                    }
                }
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                return Err(Error::ManifestParse {
                    path: origin.to_path_buf(),
                    line: number + 1,
                    message: format!("expected 'Key: Value', found '{line}'"),
                });
            };
            block.push((key.trim().to_string(), value.trim().to_string()));
        }
        if !block.is_empty() {
            manifest.absorb_block(block, first_block);
        }

        Ok(manifest)
    }

    fn absorb_block(&mut self, block: Vec<(String, String)>, first_block: bool) {
        let Some(name) = block
            .iter()
            .find(|(key, _)| key == NAME_KEY)
            .map(|(_, value)| NormalizedPath::new(value))
        else {
            if !first_block {
                tracing::warn!("Manifest block without Name merged into header");
            }
            self.header.extend(block);
            return;
        };

        let mut media_type = String::new();
        let mut attributes = Vec::new();
        for (key, value) in block {
            match key.as_str() {
                NAME_KEY => {}
                CONTENT_TYPE_KEY => media_type = value,
                _ => attributes.push((key, value)),
            }
        }

        match self.index.get(&name) {
            Some(&idx) => {
                let entry = &mut self.entries[idx];
                entry.media_type = media_type;
                entry.attributes.extend(attributes);
            }
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push(ManifestEntry {
                    path: name,
                    media_type,
                    attributes,
                });
            }
        }
    }

    /// Register a file, or update its media type if already registered.
    ///
    /// Returns `true` when a new entry was appended.
    pub fn add_entry(&mut self, path: impl Into<NormalizedPath>, media_type: &str) -> bool {
        let path = path.into();
        match self.index.get(&path) {
            Some(&idx) => {
                let entry = &mut self.entries[idx];
                if entry.media_type != media_type {
                    tracing::debug!(path = %path, media_type, "Updated manifest entry");
                    entry.media_type = media_type.to_string();
                }
                false
            }
            None => {
                tracing::debug!(path = %path, media_type, "Registered manifest entry");
                self.index.insert(path.clone(), self.entries.len());
                self.entries.push(ManifestEntry {
                    path,
                    media_type: media_type.to_string(),
                    attributes: Vec::new(),
                });
                true
            }
        }
    }

    pub fn get(&self, path: &NormalizedPath) -> Option<&ManifestEntry> {
        self.index.get(path).map(|&idx| &self.entries[idx])
    }

    pub fn contains(&self, path: &NormalizedPath) -> bool {
        self.index.contains_key(path)
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value of a header key.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.header
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The definitions document the archive declares as its entry point.
    pub fn entry_definitions(&self) -> Option<NormalizedPath> {
        self.header(ENTRY_DEFINITIONS_KEY)
            .filter(|v| !v.is_empty())
            .map(NormalizedPath::new)
    }

    /// Serialize to TOSCA.meta text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.header {
            out.push_str(&format!("{key}: {value}\n"));
        }
        for entry in &self.entries {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("{NAME_KEY}: {}\n", entry.path));
            if !entry.media_type.is_empty() {
                out.push_str(&format!("{CONTENT_TYPE_KEY}: {}\n", entry.media_type));
            }
            for (key, value) in &entry.attributes {
                out.push_str(&format!("{key}: {value}\n"));
            }
        }
        out
    }

    /// Write the manifest back into the workspace.
    pub fn flush(&self, workspace: &Path) -> Result<()> {
        let path = NormalizedPath::new(CsarPath::MetaFile.as_str()).under(workspace);
        io::write_text(&path, &self.render())?;
        tracing::debug!(entries = self.len(), path = %path.display(), "Flushed manifest");
        Ok(())
    }

    /// Compare entries with the files present in the workspace.
    pub fn audit(&self, workspace: &Path) -> Result<ManifestAudit> {
        let meta_file = NormalizedPath::new(CsarPath::MetaFile.as_str());
        let mut on_disk = Vec::new();
        for entry in WalkDir::new(workspace).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(workspace).to_path_buf();
                csar_fs::Error::io(path, std::io::Error::from(e))
            })?;
            if entry.file_type().is_file() {
                on_disk.push(NormalizedPath::relative_to(entry.path(), workspace)?);
            }
        }
        let present: HashSet<&NormalizedPath> = on_disk.iter().collect();

        Ok(ManifestAudit {
            missing: self
                .entries
                .iter()
                .filter(|e| !present.contains(&e.path))
                .map(|e| e.path.clone())
                .collect(),
            unregistered: on_disk
                .iter()
                .filter(|p| **p != meta_file && !self.contains(p))
                .cloned()
                .collect(),
        })
    }
}
