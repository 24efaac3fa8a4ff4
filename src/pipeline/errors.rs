// Error types for the acquisition pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by [`MediaPipeline::acquire`](super::orchestrator::MediaPipeline::acquire).
///
/// Every failure is fatal to the call that raised it: the pipeline never
/// retries and never hands back a partial result.
#[derive(Debug, Error)]
pub enum AcquireError {
    /// Input text contained no http(s) URL
    #[error("no video URL found in input: {0:?}")]
    InvalidInput(String),

    /// Direct fetch of a non-platform URL failed
    #[error("URL not supported: {url}")]
    UnsupportedUrl {
        url: String,
        #[source]
        source: Box<AcquireError>,
    },

    /// Resolver service failed or answered with no data
    #[error("could not resolve {url}: {detail}")]
    Resolution { url: String, detail: String },

    /// Resolver flagged the content as sensitive
    #[error("content at {url} is flagged as sensitive and will not be downloaded")]
    SensitiveContent { url: String },

    /// Resolver answered but offered no media URL
    #[error("no downloadable media found for {0}")]
    NoMediaFound(String),

    /// HTTP transport failure
    #[error("network error while {context}")]
    Network {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    /// Filesystem failure while writing a media file
    #[error("failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// External transcode step failed
    #[error("{stage} failed: {detail}")]
    Transcode { stage: &'static str, detail: String },

    /// cropdetect output contained no crop parameters
    #[error("could not detect crop parameters for {}", .0.display())]
    CropDetection(PathBuf),

    /// Sweeping leftover temp artifacts failed
    #[error("failed to clean up temp files in {}", .dir.display())]
    Cleanup {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Network call or external tool ran past its timeout
    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: String, seconds: u64 },
}
