// mediagrab CLI - one-shot media acquisition

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use mediagrab::pipeline::tools;
use mediagrab::{AcquireOptions, AllDownResolver, FfmpegConfig, MediaPipeline, NetworkConfig};

/// Fetch a video from a social platform link or a direct media URL.
#[derive(Parser, Debug)]
#[command(name = "mediagrab", version, about)]
struct Args {
    /// URL of the video, or any text containing one
    input: String,

    /// Extract the audio track to an mp3 instead of keeping the video
    #[arg(long)]
    extract_audio: bool,

    /// Detect and crop away black borders
    #[arg(long)]
    autocrop: bool,

    /// Directory to write files into
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Resolver service endpoint override
    #[arg(long)]
    resolver_url: Option<String>,

    /// Proxy URL (e.g. socks5://127.0.0.1:1080)
    #[arg(long)]
    proxy: Option<String>,

    /// Network timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Path to the ffmpeg binary (default: common paths, then PATH)
    #[arg(long)]
    ffmpeg: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let network = NetworkConfig::default()
        .with_proxy(args.proxy.clone())
        .with_timeout(args.timeout);

    let resolver = match args.resolver_url.as_deref() {
        Some(endpoint) => AllDownResolver::new(endpoint, &network),
        None => AllDownResolver::hosted(&network),
    }
    .context("failed to build resolver client")?;

    let ffmpeg = FfmpegConfig::default().with_binary(args.ffmpeg.clone());
    if args.extract_audio || args.autocrop {
        let binary = args.ffmpeg.clone().unwrap_or_else(tools::find_ffmpeg);
        match tools::ffmpeg_version(&binary) {
            Some(version) => tracing::debug!("post-processing with {}", version),
            None => tracing::warn!("{} does not look runnable, post-processing will fail", binary.display()),
        }
    }

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("failed to create output directory {}", args.output_dir.display()))?;

    let options = AcquireOptions::default()
        .with_extract_audio(args.extract_audio)
        .with_autocrop(args.autocrop);

    let pipeline = MediaPipeline::with_resolver(&args.output_dir, Box::new(resolver), network, ffmpeg)?;
    let file = pipeline.acquire(&args.input, &options).await?;

    println!("{}", file.path.display());
    Ok(())
}
