// Pipeline orchestration - classify, resolve, fetch, post-process

use std::path::PathBuf;
use tracing::{info, warn};

use super::classifier::{extract_url, PlatformSet};
use super::errors::AcquireError;
use super::fetcher::{sweep_temp_artifacts, Fetcher};
use super::models::{AcquireOptions, FfmpegConfig, LocalFile, NetworkConfig};
use super::postprocess::PostProcessor;
use super::resolver::{AllDownResolver, MediaResolver};

/// One-shot media acquisition pipeline.
///
/// Each [`acquire`](Self::acquire) call is self-contained: nothing is
/// retried and no state carries over between calls. Only one call should
/// run against a given storage root at a time, since the temp-file naming
/// and the sweep treat the directory as theirs.
pub struct MediaPipeline {
    resolver: Box<dyn MediaResolver>,
    platforms: PlatformSet,
    storage_root: PathBuf,
    fetcher: Fetcher,
    postprocessor: PostProcessor,
}

impl MediaPipeline {
    /// Pipeline over `storage_root` with the hosted resolver and default
    /// network and ffmpeg settings.
    pub fn new(storage_root: impl Into<PathBuf>) -> Result<Self, AcquireError> {
        let network = NetworkConfig::default();
        let resolver = AllDownResolver::hosted(&network)?;
        Self::with_resolver(storage_root, Box::new(resolver), network, FfmpegConfig::default())
    }

    /// Pipeline with an injected resolver and explicit configuration.
    pub fn with_resolver(
        storage_root: impl Into<PathBuf>,
        resolver: Box<dyn MediaResolver>,
        network: NetworkConfig,
        ffmpeg: FfmpegConfig,
    ) -> Result<Self, AcquireError> {
        let storage_root = storage_root.into();
        let fetcher = Fetcher::new(network.build_client()?, &storage_root, network.timeout_seconds);
        Ok(Self {
            resolver,
            platforms: PlatformSet::default(),
            storage_root,
            fetcher,
            postprocessor: PostProcessor::new(&ffmpeg),
        })
    }

    /// Replaces the default platform set.
    pub fn with_platforms(mut self, platforms: PlatformSet) -> Self {
        self.platforms = platforms;
        self
    }

    /// Acquires the media referenced by `raw_input` (a URL, or text that
    /// contains one) and returns the finished file in the storage root.
    pub async fn acquire(&self, raw_input: &str, options: &AcquireOptions) -> Result<LocalFile, AcquireError> {
        let url = extract_url(raw_input)
            .ok_or_else(|| AcquireError::InvalidInput(raw_input.to_string()))?;

        let fetched = if self.platforms.matches(url) {
            self.acquire_platform(url).await?
        } else {
            info!("fetching direct URL {}", url);
            self.fetcher.fetch(url).await.map_err(|e| AcquireError::UnsupportedUrl {
                url: url.to_string(),
                source: Box::new(e),
            })?
        };

        self.post_process(fetched, options).await
    }

    /// Platform path: sweep leftovers, resolve the share link, then fetch
    /// the best candidate URL.
    async fn acquire_platform(&self, url: &str) -> Result<LocalFile, AcquireError> {
        sweep_temp_artifacts(&self.storage_root)?;

        info!("resolving {} via {}", url, self.resolver.name());
        let resolved = self
            .resolver
            .resolve(url)
            .await?
            .ok_or_else(|| AcquireError::Resolution {
                url: url.to_string(),
                detail: "resolver returned no data".to_string(),
            })?;

        if resolved.is_sensitive {
            warn!("resolver flagged {} as sensitive, refusing", url);
            return Err(AcquireError::SensitiveContent {
                url: url.to_string(),
            });
        }

        let direct_url = resolved
            .best_url()
            .ok_or_else(|| AcquireError::NoMediaFound(url.to_string()))?;

        info!("fetching resolved media from {}", direct_url);
        self.fetcher.fetch(direct_url).await
    }

    /// Applies at most one transform; audio extraction wins when both are
    /// requested.
    async fn post_process(&self, file: LocalFile, options: &AcquireOptions) -> Result<LocalFile, AcquireError> {
        if options.extract_audio {
            self.postprocessor.extract_audio(&file).await
        } else if options.autocrop {
            self.postprocessor.auto_crop(&file).await
        } else {
            Ok(file)
        }
    }
}
