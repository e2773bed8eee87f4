//! Archive source service for quarterly filing archives
//!
//! This module turns the configured archive list into readable ZIP archives.
//! Archives come either from the ANS open-data server or from a local
//! directory and are always processed in the configured order.
//!
//! # Architecture
//!
//! - [`fetch`] - HTTP download and local file opening
//! - [`entries`] - Iteration over the `.csv` entries of an archive

pub mod entries;
pub mod fetch;

pub use entries::{for_each_text_entry, is_text_table};
pub use fetch::ArchiveFetcher;

use crate::constants::ARCHIVE_EXTENSION;
use crate::{Error, Result};
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Where an archive is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveLocation {
    /// Full download URL
    Remote(String),
    /// Path on the local filesystem
    Local(PathBuf),
}

/// One archive of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSpec {
    /// Archive file name, e.g. `1T2025.zip`; carries the quarter period
    pub name: String,
    pub location: ArchiveLocation,
}

impl ArchiveSpec {
    /// Archive served under `base_url`
    pub fn remote(base_url: &str, name: impl Into<String>) -> Self {
        let name = name.into();
        let url = format!("{}/{}", base_url.trim_end_matches('/'), name);
        Self {
            name,
            location: ArchiveLocation::Remote(url),
        }
    }

    /// Archive stored at `path`
    pub fn local(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            location: ArchiveLocation::Local(path),
        }
    }
}

/// Archives downloaded from `base_url`, in the given order
pub fn remote_specs(base_url: &str, names: &[String]) -> Vec<ArchiveSpec> {
    names
        .iter()
        .map(|name| ArchiveSpec::remote(base_url, name.as_str()))
        .collect()
}

/// Archives read from a local directory
///
/// With configured names, those names are used in order; a missing file is
/// reported now and fails when opened. Without names, every `.zip` file
/// directly inside `dir` is used in lexical order.
///
/// # Errors
/// * Returns `Error::Configuration` if `dir` is not a directory
pub fn discover_local(dir: &Path, names: &[String]) -> Result<Vec<ArchiveSpec>> {
    if !dir.is_dir() {
        return Err(Error::configuration(format!(
            "Archive directory does not exist: {}",
            dir.display()
        )));
    }

    if !names.is_empty() {
        return Ok(names
            .iter()
            .map(|name| {
                let path = dir.join(name);
                if !path.is_file() {
                    warn!("Configured archive not found: {}", path.display());
                }
                ArchiveSpec::local(path)
            })
            .collect());
    }

    let specs: Vec<ArchiveSpec> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable directory entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && has_archive_extension(entry.path()))
        .map(|entry| ArchiveSpec::local(entry.into_path()))
        .collect();

    debug!("Discovered {} archives in {}", specs.len(), dir.display());
    Ok(specs)
}

fn has_archive_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION.trim_start_matches('.')))
        .unwrap_or(false)
}

/// An archive ready to be read as ZIP
pub enum OpenedArchive {
    /// Downloaded bytes
    Memory(Cursor<Vec<u8>>),
    /// Local file
    File(BufReader<File>),
}

impl Read for OpenedArchive {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Memory(cursor) => cursor.read(buf),
            Self::File(file) => file.read(buf),
        }
    }
}

impl Seek for OpenedArchive {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            Self::Memory(cursor) => cursor.seek(pos),
            Self::File(file) => file.seek(pos),
        }
    }
}
