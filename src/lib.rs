//! mediagrab: fetch videos from social platforms or direct URLs.
//!
//! Free text goes in, a finished media file comes out. Platform share links
//! (TikTok, Instagram, X, ...) are resolved to direct media URLs through an
//! external resolver service; anything else is fetched as-is. Optional
//! ffmpeg post-processing extracts the audio track or crops black borders.
//!
//! ```ignore
//! use mediagrab::{AcquireOptions, MediaPipeline};
//!
//! let pipeline = MediaPipeline::new("/tmp/downloads")?;
//! let options = AcquireOptions::default().with_extract_audio(true);
//! let file = pipeline.acquire("check this https://vm.tiktok.com/ZMabc/", &options).await?;
//! println!("{}", file.path.display());
//! ```

pub mod pipeline;

pub use pipeline::classifier::{extract_url, PlatformSet};
pub use pipeline::errors::AcquireError;
pub use pipeline::models::{
    AcquireOptions, CropRegion, FfmpegConfig, LocalFile, NetworkConfig, ResolvedMedia,
};
pub use pipeline::orchestrator::MediaPipeline;
pub use pipeline::resolver::{AllDownResolver, MediaResolver};
