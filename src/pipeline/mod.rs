// Acquisition pipeline - classify, resolve, fetch, post-process

pub mod classifier;
pub mod errors;
pub mod fetcher;
pub mod models;
pub mod orchestrator;
pub mod postprocess;
pub mod resolver;
pub mod tools;

pub use classifier::{extract_url, PlatformSet};
pub use errors::AcquireError;
pub use models::{AcquireOptions, CropRegion, FfmpegConfig, LocalFile, NetworkConfig, ResolvedMedia};
pub use orchestrator::MediaPipeline;
pub use resolver::{AllDownResolver, MediaResolver};
