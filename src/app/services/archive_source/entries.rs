//! Iteration over the text tables inside a quarterly ZIP archive

use crate::constants::TEXT_TABLE_EXTENSION;
use crate::{Error, Result};
use std::io::{Read, Seek};
use tracing::debug;
use zip::ZipArchive;

/// Check if an entry name looks like a delimited text table
pub fn is_text_table(entry_name: &str) -> bool {
    entry_name.len() >= TEXT_TABLE_EXTENSION.len()
        && entry_name.is_char_boundary(entry_name.len() - TEXT_TABLE_EXTENSION.len())
        && entry_name[entry_name.len() - TEXT_TABLE_EXTENSION.len()..]
            .eq_ignore_ascii_case(TEXT_TABLE_EXTENSION)
}

/// Visit every `.csv` file entry of an archive in archive order
///
/// Directories and other files are ignored. Returns the number of entries
/// handed to `visit`. Errors opening the archive or an entry are
/// `Error::Archive`; errors returned by `visit` are passed through as is.
pub fn for_each_text_entry<R, F>(reader: R, archive_name: &str, mut visit: F) -> Result<usize>
where
    R: Read + Seek,
    F: FnMut(&str, &mut dyn Read) -> Result<()>,
{
    let mut archive = ZipArchive::new(reader)
        .map_err(|e| Error::archive(archive_name, "Failed to open ZIP archive", Some(e)))?;

    let mut visited = 0;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|e| {
            Error::archive(archive_name, format!("Failed to open entry #{}", index), Some(e))
        })?;

        let entry_name = entry.name().to_string();
        if entry.is_dir() || !is_text_table(&entry_name) {
            debug!("Ignoring entry '{}' in {}", entry_name, archive_name);
            continue;
        }

        debug!("Reading entry '{}' from {}", entry_name, archive_name);
        visit(&entry_name, &mut entry)?;
        visited += 1;
    }

    Ok(visited)
}
