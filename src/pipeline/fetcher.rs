// Media fetch - streams a direct URL into the storage root

use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::errors::AcquireError;
use super::models::LocalFile;

/// Base name given to a fetched video; collisions get numeric suffixes.
pub const TEMP_BASE_NAME: &str = "temp_video.mp4";

/// Name prefix identifying every artifact the pipeline writes.
pub const TEMP_PREFIX: &str = "temp_video";

/// Streams direct media URLs to uniquely named files under a storage root.
pub struct Fetcher {
    client: reqwest::Client,
    storage_root: PathBuf,
    timeout_seconds: u64,
}

impl Fetcher {
    pub fn new(client: reqwest::Client, storage_root: impl Into<PathBuf>, timeout_seconds: u64) -> Self {
        Self {
            client,
            storage_root: storage_root.into(),
            timeout_seconds,
        }
    }

    /// Fetches `direct_url` into a freshly allocated temp file, streaming
    /// the body chunk by chunk. A failed fetch leaves any partial file in
    /// place for the next sweep.
    pub async fn fetch(&self, direct_url: &str) -> Result<LocalFile, AcquireError> {
        let response = self
            .client
            .get(direct_url)
            .send()
            .await
            .map_err(|e| self.network_error(direct_url, e))?;

        let mut response = response
            .error_for_status()
            .map_err(|e| self.network_error(direct_url, e))?;

        let (path, mut file) = self.allocate_output().await?;
        debug!("writing {} to {}", direct_url, path.display());

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.network_error(direct_url, e))?
        {
            file.write_all(&chunk).await.map_err(|e| AcquireError::Write {
                path: path.clone(),
                source: e,
            })?;
        }

        file.flush().await.map_err(|e| AcquireError::Write {
            path: path.clone(),
            source: e,
        })?;

        Ok(LocalFile::new(path))
    }

    /// Opens the first free temp name with O_EXCL semantics, so concurrent
    /// fetches can never claim the same file. Names run temp_video.mp4,
    /// temp_video_1.mp4, temp_video_2.mp4, ...
    async fn allocate_output(&self) -> Result<(PathBuf, File), AcquireError> {
        let mut counter = 0u32;
        loop {
            let name = if counter == 0 {
                TEMP_BASE_NAME.to_string()
            } else {
                format!("{}_{}.mp4", TEMP_PREFIX, counter)
            };
            let path = self.storage_root.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => counter += 1,
                Err(e) => return Err(AcquireError::Write { path, source: e }),
            }
        }
    }

    fn network_error(&self, url: &str, e: reqwest::Error) -> AcquireError {
        if e.is_timeout() {
            AcquireError::Timeout {
                operation: format!("fetching {}", url),
                seconds: self.timeout_seconds,
            }
        } else {
            AcquireError::Network {
                context: format!("fetching {}", url),
                source: e,
            }
        }
    }
}

/// Deletes every regular file in `root` whose name starts with the temp
/// prefix. Other files are left alone.
pub fn sweep_temp_artifacts(root: &Path) -> Result<(), AcquireError> {
    let cleanup_error = |source| AcquireError::Cleanup {
        dir: root.to_path_buf(),
        source,
    };

    for entry in std::fs::read_dir(root).map_err(cleanup_error)? {
        let entry = entry.map_err(cleanup_error)?;
        let name = entry.file_name();
        if !name.to_string_lossy().starts_with(TEMP_PREFIX) {
            continue;
        }
        let is_file = entry.file_type().map_err(cleanup_error)?.is_file();
        if is_file {
            debug!("sweeping {}", entry.path().display());
            std::fs::remove_file(entry.path()).map_err(cleanup_error)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_fetcher(root: &Path) -> Fetcher {
        Fetcher::new(reqwest::Client::new(), root, 30)
    }

    #[tokio::test]
    async fn test_allocate_starts_at_base_name() {
        let dir = tempfile::tempdir().unwrap();
        let (path, _file) = test_fetcher(dir.path()).allocate_output().await.unwrap();
        assert_eq!(path, dir.path().join("temp_video.mp4"));
    }

    #[tokio::test]
    async fn test_allocate_suffixes_on_collision() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("temp_video.mp4"), b"first").unwrap();

        let fetcher = test_fetcher(dir.path());
        let (path, _file) = fetcher.allocate_output().await.unwrap();
        assert_eq!(path, dir.path().join("temp_video_1.mp4"));

        let (path, _file) = fetcher.allocate_output().await.unwrap();
        assert_eq!(path, dir.path().join("temp_video_2.mp4"));
    }

    #[tokio::test]
    async fn test_allocate_fills_gaps_in_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("temp_video.mp4"), b"a").unwrap();
        std::fs::write(dir.path().join("temp_video_2.mp4"), b"b").unwrap();

        let (path, _file) = test_fetcher(dir.path()).allocate_output().await.unwrap();
        assert_eq!(path, dir.path().join("temp_video_1.mp4"));
    }

    #[test]
    fn test_sweep_removes_only_prefixed_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("temp_video.mp4"), b"a").unwrap();
        std::fs::write(dir.path().join("temp_video_3.mp4"), b"b").unwrap();
        std::fs::write(dir.path().join("temp_video_1.mp3"), b"c").unwrap();
        std::fs::write(dir.path().join("keep.txt"), b"d").unwrap();

        sweep_temp_artifacts(dir.path()).unwrap();

        assert!(!dir.path().join("temp_video.mp4").exists());
        assert!(!dir.path().join("temp_video_3.mp4").exists());
        assert!(!dir.path().join("temp_video_1.mp3").exists());
        assert!(dir.path().join("keep.txt").exists());
    }

    #[test]
    fn test_sweep_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("temp_video_dir")).unwrap();

        sweep_temp_artifacts(dir.path()).unwrap();
        assert!(dir.path().join("temp_video_dir").exists());
    }

    #[test]
    fn test_sweep_missing_root_is_cleanup_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = sweep_temp_artifacts(&missing).unwrap_err();
        assert!(matches!(err, AcquireError::Cleanup { .. }));
    }
}
