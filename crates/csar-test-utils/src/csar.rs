//! [`TestCsar`] builder.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::fixtures;

/// An in-memory description of a CSAR that can be written to disk.
///
/// # Example
///
/// ```rust,no_run
/// use csar_test_utils::TestCsar;
///
/// let csar = TestCsar::sample();
/// let (_dir, path) = csar.write_temp("app.csar");
/// assert!(path.exists());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TestCsar {
    entries: Vec<(String, Vec<u8>)>,
}

impl TestCsar {
    /// An archive with no entries.
    pub fn new() -> Self {
        Self::default()
    }

    /// The sample application: manifest, service template and install script.
    pub fn sample() -> Self {
        Self::new()
            .with_file("TOSCA-Metadata/TOSCA.meta", fixtures::TOSCA_META)
            .with_file("Definitions/app.tosca", fixtures::SERVICE_TEMPLATE)
            .with_file("Scripts/install.sh", fixtures::INSTALL_SCRIPT)
    }

    /// Add or replace an entry.
    pub fn with_file(mut self, name: &str, content: impl AsRef<[u8]>) -> Self {
        self.entries.retain(|(n, _)| n != name);
        self.entries.push((name.to_string(), content.as_ref().to_vec()));
        self
    }

    /// Drop an entry.
    pub fn without_file(mut self, name: &str) -> Self {
        self.entries.retain(|(n, _)| n != name);
        self
    }

    /// Write the archive to `path`.
    pub fn write_to(&self, path: &Path) {
        let file = File::create(path).expect("TestCsar::write_to: create archive");
        let mut zip = ZipWriter::new(file);
        for (name, content) in &self.entries {
            zip.start_file(name.as_str(), SimpleFileOptions::default())
                .expect("TestCsar::write_to: start entry");
            zip.write_all(content).expect("TestCsar::write_to: write entry");
        }
        zip.finish().expect("TestCsar::write_to: finish archive");
    }

    /// Write the archive into a fresh temporary directory.
    ///
    /// Keep the returned `TempDir` alive for as long as the archive is used.
    pub fn write_temp(&self, file_name: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().expect("TestCsar::write_temp: tempdir");
        let path = dir.path().join(file_name);
        self.write_to(&path);
        (dir, path)
    }
}

/// Read every entry of an archive into a name → content map.
pub fn read_entries(path: &Path) -> BTreeMap<String, Vec<u8>> {
    let file = File::open(path).expect("read_entries: open archive");
    let mut zip = ZipArchive::new(file).expect("read_entries: valid zip");
    let mut entries = BTreeMap::new();
    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).expect("read_entries: entry");
        if entry.is_dir() {
            continue;
        }
        let mut content = Vec::new();
        entry.read_to_end(&mut content).expect("read_entries: read entry");
        entries.insert(entry.name().to_string(), content);
    }
    entries
}

/// Read one text entry of an archive.
pub fn read_entry(path: &Path, name: &str) -> Option<String> {
    read_entries(path)
        .remove(name)
        .map(|bytes| String::from_utf8(bytes).expect("read_entry: utf-8 entry"))
}
