//! Archive retrieval
//!
//! Remote archives are downloaded whole with one GET each and read from
//! memory; local archives are read straight from disk. Every failure here is
//! scoped to one archive so the run can go on with the next one.

use super::{ArchiveLocation, ArchiveSpec, OpenedArchive};
use crate::constants::HTTP_TIMEOUT_SECS;
use crate::{Error, Result};
use std::fs::{self, File};
use std::io::{BufReader, Cursor};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Opens archives from either location
#[derive(Debug, Clone)]
pub struct ArchiveFetcher {
    client: reqwest::Client,

    /// Where downloaded archives are kept, if anywhere
    downloads_dir: Option<PathBuf>,
}

impl ArchiveFetcher {
    /// Create a fetcher; downloads are kept in `downloads_dir` when given
    pub fn new(downloads_dir: Option<PathBuf>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            downloads_dir,
        })
    }

    /// Open one archive for reading
    ///
    /// # Errors
    /// * `Error::ArchiveFetch` for transport errors and non-success statuses
    /// * `Error::Archive` when a local archive cannot be opened
    pub async fn open(&self, spec: &ArchiveSpec) -> Result<OpenedArchive> {
        match &spec.location {
            ArchiveLocation::Remote(url) => {
                let bytes = self.download(&spec.name, url).await?;
                Ok(OpenedArchive::Memory(Cursor::new(bytes)))
            }
            ArchiveLocation::Local(path) => open_local(&spec.name, path),
        }
    }

    async fn download(&self, name: &str, url: &str) -> Result<Vec<u8>> {
        info!("Downloading {}", url);
        let start = Instant::now();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::archive_fetch(name, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::archive_fetch(name, format!("HTTP status {} from {}", status, url)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::archive_fetch(name, e.to_string()))?
            .to_vec();

        info!(
            "Downloaded {} ({} bytes in {:.1}s)",
            name,
            bytes.len(),
            start.elapsed().as_secs_f64()
        );

        if let Some(dir) = &self.downloads_dir {
            // best effort
            if let Err(e) = keep_download(dir, name, &bytes) {
                warn!("Could not keep downloaded archive {}: {}", name, e);
            }
        }

        Ok(bytes)
    }
}

fn open_local(name: &str, path: &Path) -> Result<OpenedArchive> {
    debug!("Opening local archive {}", path.display());

    let file = File::open(path).map_err(|e| {
        Error::archive(name, format!("Failed to open {}: {}", path.display(), e), None)
    })?;
    Ok(OpenedArchive::File(BufReader::new(file)))
}

fn keep_download(dir: &Path, name: &str, bytes: &[u8]) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    fs::write(&path, bytes)?;
    debug!("Kept download at {}", path.display());
    Ok(())
}
