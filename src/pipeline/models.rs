// Common data models for the acquisition pipeline

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::errors::AcquireError;

/// Post-processing options for a single acquisition
#[derive(Debug, Clone, Copy, Default)]
pub struct AcquireOptions {
    /// Extract the audio track to an mp3 instead of keeping the video
    pub extract_audio: bool,
    /// Detect and crop away black borders
    pub autocrop: bool,
}

impl AcquireOptions {
    pub fn with_extract_audio(mut self, enabled: bool) -> Self {
        self.extract_audio = enabled;
        self
    }

    pub fn with_autocrop(mut self, enabled: bool) -> Self {
        self.autocrop = enabled;
        self
    }
}

/// Network configuration shared by the resolver client and the fetcher
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Proxy URL (e.g., "socks5://127.0.0.1:1080" or "http://proxy:8080")
    pub proxy: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            timeout_seconds: 30,
        }
    }
}

impl NetworkConfig {
    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Builds an HTTP client honoring the proxy and timeout settings.
    pub fn build_client(&self) -> Result<reqwest::Client, AcquireError> {
        let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(self.timeout_seconds));

        if let Some(proxy_url) = self.proxy.as_deref() {
            let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| AcquireError::Network {
                context: format!("configuring proxy {}", proxy_url),
                source: e,
            })?;
            builder = builder.proxy(proxy);
        }

        builder.build().map_err(|e| AcquireError::Network {
            context: "building the HTTP client".to_string(),
            source: e,
        })
    }
}

/// External transcoder configuration
#[derive(Debug, Clone)]
pub struct FfmpegConfig {
    /// Explicit ffmpeg binary; discovered from common paths and PATH when unset
    pub binary: Option<PathBuf>,
    /// Per-invocation timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            binary: None,
            timeout_seconds: 300,
        }
    }
}

impl FfmpegConfig {
    pub fn with_binary(mut self, binary: Option<PathBuf>) -> Self {
        self.binary = binary;
        self
    }
}

/// Candidate direct media URLs returned by the resolver service
#[derive(Debug, Clone, Deserialize)]
pub struct ResolvedMedia {
    /// High-quality direct URL, when the platform offers one
    pub high: Option<String>,
    /// Low-quality fallback URL
    pub low: Option<String>,
    /// Platform marked the content as sensitive
    #[serde(default, rename = "isSensitiveContent")]
    pub is_sensitive: bool,
}

impl ResolvedMedia {
    /// Best available direct URL: high quality wins over the low fallback.
    pub fn best_url(&self) -> Option<&str> {
        self.high.as_deref().or(self.low.as_deref())
    }
}

/// A finished media artifact on disk. The caller owns the file once it
/// is handed back; nothing in the pipeline touches it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub path: PathBuf,
}

impl LocalFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Crop window reported by ffmpeg's cropdetect filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

impl CropRegion {
    /// Renders the region as an ffmpeg crop filter argument, `crop=w:h:x:y`.
    pub fn to_filter(&self) -> String {
        format!("crop={}:{}:{}:{}", self.width, self.height, self.x, self.y)
    }
}
