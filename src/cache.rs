//! Local cache for the COVID-19 Open Data epidemiology file.
//!
//! The CSV is downloaded once on first use and reused afterwards. Offline
//! mode never touches the network.

use crate::config;
use crate::error::{CoviscopeError, Result};
use reqwest::blocking::Client;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Downloads and caches the epidemiology dataset.
pub struct DatasetCache {
    /// Directory where cached files are stored.
    pub cache_dir: PathBuf,
    /// If true, never download (use cached files only).
    pub offline: bool,
    timeout: Duration,
    client: Option<Client>,
}

impl DatasetCache {
    /// Create a new cache.
    ///
    /// If `cache_dir` is `None`, uses the platform-appropriate default cache directory.
    /// Creates the cache directory if it does not exist.
    pub fn new(cache_dir: Option<PathBuf>, offline: bool, timeout: Duration) -> Result<Self> {
        let dir = cache_dir.unwrap_or_else(config::default_cache_dir);
        fs::create_dir_all(&dir)?;
        Ok(Self {
            cache_dir: dir,
            offline,
            timeout,
            client: None,
        })
    }

    /// Lazy HTTP client, created on first use.
    fn client(&mut self) -> Result<&Client> {
        if self.client.is_none() {
            let client = Client::builder()
                .timeout(self.timeout)
                .redirect(reqwest::redirect::Policy::limited(10))
                .build()?;
            self.client = Some(client);
        }
        self.client
            .as_ref()
            .ok_or_else(|| CoviscopeError::InvalidArgument("HTTP client unavailable".into()))
    }

    /// Where the dataset lives once cached.
    pub fn dataset_path(&self) -> PathBuf {
        self.cache_dir.join(config::DATASET_FILE)
    }

    /// Whether the dataset has already been downloaded.
    pub fn is_cached(&self) -> bool {
        self.dataset_path().exists()
    }

    /// Ensure the dataset is cached locally, downloading it if needed.
    ///
    /// Returns the local path. In offline mode a missing file is
    /// [`CoviscopeError::NotFound`].
    pub fn ensure_dataset(&mut self) -> Result<PathBuf> {
        let local_path = self.dataset_path();
        if local_path.exists() {
            return Ok(local_path);
        }
        if self.offline {
            return Err(CoviscopeError::NotFound(format!(
                "Dataset {} not cached and offline mode is enabled",
                config::DATASET_FILE
            )));
        }
        self.download(config::DATASET_URL, &local_path)?;
        Ok(local_path)
    }

    /// Downloads to a temp file first and renames on success, so an
    /// interrupted download never leaves a corrupt partial file behind.
    fn download(&mut self, url: &str, dest: &Path) -> Result<()> {
        tracing::info!(%url, "downloading dataset");

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_dest = dest.with_extension("csv.tmp");

        let client = self.client()?.clone();
        let result = (|| -> Result<()> {
            let mut resp = client.get(url).send()?.error_for_status()?;
            let mut file = fs::File::create(&tmp_dest)?;
            let bytes = resp.copy_to(&mut file)?;
            fs::rename(&tmp_dest, dest)?;
            tracing::info!(bytes, path = %dest.display(), "dataset cached");
            Ok(())
        })();

        if result.is_err() {
            let _ = fs::remove_file(&tmp_dest);
        }

        result
    }

    /// Remove all cached files and recreate the cache directory.
    pub fn clear(&self) -> Result<()> {
        if self.cache_dir.exists() {
            fs::remove_dir_all(&self.cache_dir)?;
            fs::create_dir_all(&self.cache_dir)?;
        }
        Ok(())
    }
}
