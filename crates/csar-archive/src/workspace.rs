//! Extraction of a CSAR into a working directory and repacking it.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use csar_fs::NormalizedPath;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::{Error, Result};

/// Appended to the archive path to name its default working directory.
pub const WORKSPACE_SUFFIX: &str = "_temp_references_resolver";

/// An unpacked CSAR.
///
/// The workspace owns its directory: opening deletes whatever was there
/// before, and [`ArchiveWorkspace::discard`] removes it again.
#[derive(Debug)]
pub struct ArchiveWorkspace {
    archive: PathBuf,
    dir: PathBuf,
    /// Extracted files in archive order
    files: Vec<NormalizedPath>,
}

impl ArchiveWorkspace {
    /// Default working directory for an archive: a sibling named
    /// `<archive>_temp_references_resolver`.
    pub fn default_dir_for(archive: &Path) -> PathBuf {
        let mut name = OsString::from(archive.as_os_str());
        name.push(WORKSPACE_SUFFIX);
        PathBuf::from(name)
    }

    /// Unpack `archive` into its default working directory.
    pub fn open(archive: impl AsRef<Path>) -> Result<Self> {
        let archive = archive.as_ref();
        Self::open_in(archive, Self::default_dir_for(archive))
    }

    /// Unpack `archive` into `dir`, replacing any previous contents of `dir`.
    pub fn open_in(archive: impl AsRef<Path>, dir: impl Into<PathBuf>) -> Result<Self> {
        let archive = archive.as_ref().to_path_buf();
        let dir = dir.into();

        let file = File::open(&archive).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::ArchiveNotFound {
                path: archive.clone(),
            },
            _ => csar_fs::Error::io(&archive, e).into(),
        })?;

        if csar_fs::io::remove_dir_if_exists(&dir)? {
            tracing::debug!(dir = %dir.display(), "Removed stale workspace");
        }
        fs::create_dir_all(&dir).map_err(|e| csar_fs::Error::io(&dir, e))?;

        let files = extract(&archive, BufReader::new(file), &dir)?;
        tracing::info!(
            archive = %archive.display(),
            dir = %dir.display(),
            files = files.len(),
            "Unpacked archive"
        );

        Ok(Self {
            archive,
            dir,
            files,
        })
    }

    /// The archive this workspace was unpacked from.
    pub fn archive(&self) -> &Path {
        &self.archive
    }

    /// The working directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files extracted from the archive, in archive order.
    pub fn files(&self) -> &[NormalizedPath] {
        &self.files
    }

    /// Pack the current workspace contents into `target`.
    ///
    /// Originally extracted files keep their archive order; files created
    /// since then follow, sorted by path. The target is written next to
    /// its final location and renamed into place.
    pub fn close(&self, target: impl AsRef<Path>) -> Result<()> {
        let target = target.as_ref();
        let Some(file_name) = target.file_name().filter(|n| !n.is_empty()) else {
            return Err(Error::InvalidTarget);
        };

        let entries = self.pack_order()?;
        let temp = target.with_file_name(format!(
            ".{}.{}.tmp",
            file_name.to_string_lossy(),
            std::process::id()
        ));

        if let Err(e) = self.write_archive(&temp, &entries) {
            let _ = fs::remove_file(&temp);
            return Err(e);
        }
        fs::rename(&temp, target).map_err(|e| csar_fs::Error::io(target, e))?;

        tracing::info!(
            target = %target.display(),
            entries = entries.len(),
            "Packed archive"
        );
        Ok(())
    }

    /// Remove the working directory.
    pub fn discard(self) -> Result<()> {
        csar_fs::io::remove_dir_if_exists(&self.dir)?;
        tracing::debug!(dir = %self.dir.display(), "Discarded workspace");
        Ok(())
    }

    /// Every file currently in the workspace, in pack order.
    pub fn pack_order(&self) -> Result<Vec<NormalizedPath>> {
        let mut present = Vec::new();
        for entry in WalkDir::new(&self.dir).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(&self.dir).to_path_buf();
                csar_fs::Error::io(path, io::Error::from(e))
            })?;
            if entry.file_type().is_file() {
                present.push(NormalizedPath::relative_to(entry.path(), &self.dir)?);
            }
        }

        let on_disk: HashSet<&NormalizedPath> = present.iter().collect();
        let known: HashSet<&NormalizedPath> = self.files.iter().collect();

        let mut order: Vec<NormalizedPath> = self
            .files
            .iter()
            .filter(|f| on_disk.contains(f))
            .cloned()
            .collect();
        order.extend(present.iter().filter(|f| !known.contains(f)).cloned());
        Ok(order)
    }

    fn write_archive(&self, path: &Path, entries: &[NormalizedPath]) -> Result<()> {
        let packing = |message: String| Error::Packing {
            path: path.to_path_buf(),
            message,
        };

        let file = File::create(path).map_err(|e| csar_fs::Error::io(path, e))?;
        let mut zip = ZipWriter::new(BufWriter::new(file));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for entry in entries {
            zip.start_file(entry.as_str(), options)
                .map_err(|e| packing(e.to_string()))?;
            let source = entry.under(&self.dir);
            let mut reader = File::open(&source).map_err(|e| csar_fs::Error::io(&source, e))?;
            io::copy(&mut reader, &mut zip).map_err(|e| csar_fs::Error::io(&source, e))?;
        }

        let mut writer = zip.finish().map_err(|e| packing(e.to_string()))?;
        writer.flush().map_err(|e| csar_fs::Error::io(path, e))?;
        Ok(())
    }
}

fn extract(archive: &Path, reader: BufReader<File>, dir: &Path) -> Result<Vec<NormalizedPath>> {
    let extraction = |message: String| Error::Extraction {
        path: archive.to_path_buf(),
        message,
    };

    let mut zip = ZipArchive::new(reader).map_err(|e| extraction(e.to_string()))?;
    let mut files = Vec::with_capacity(zip.len());

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(|e| extraction(e.to_string()))?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(extraction(format!(
                "entry '{}' escapes the workspace",
                entry.name()
            )));
        };
        let relative = NormalizedPath::new(relative);
        let target = relative.under(dir);

        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(|e| csar_fs::Error::io(&target, e))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| csar_fs::Error::io(parent, e))?;
        }
        let mut out = File::create(&target).map_err(|e| csar_fs::Error::io(&target, e))?;
        io::copy(&mut entry, &mut out)
            .map_err(|e| extraction(format!("{}: {e}", relative)))?;

        tracing::debug!(entry = %relative, "Extracted");
        files.push(relative);
    }

    Ok(files)
}
