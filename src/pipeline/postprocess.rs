// Post-processing - ffmpeg audio extraction and auto-crop

use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};
use tokio::process::Command as TokioCommand;
use tracing::info;

use super::errors::AcquireError;
use super::models::{CropRegion, FfmpegConfig, LocalFile};
use super::tools::{self, run_output_with_timeout};

lazy_static! {
    static ref CROP_RE: Regex = Regex::new(r"crop=(\d+):(\d+):(\d+):(\d+)").unwrap();
}

/// Runs ffmpeg over fetched media files.
pub struct PostProcessor {
    binary: PathBuf,
    timeout_seconds: u64,
}

impl PostProcessor {
    pub fn new(config: &FfmpegConfig) -> Self {
        let binary = config.binary.clone().unwrap_or_else(tools::find_ffmpeg);
        Self {
            binary,
            timeout_seconds: config.timeout_seconds,
        }
    }

    /// Demuxes the audio track to an mp3 next to the input file
    /// (`temp_video.mp4` becomes `temp_video.mp3`).
    pub async fn extract_audio(&self, input: &LocalFile) -> Result<LocalFile, AcquireError> {
        let output_path = input.path.with_extension("mp3");

        let mut cmd = TokioCommand::new(&self.binary);
        cmd.arg("-i")
            .arg(&input.path)
            .args(["-vn", "-acodec", "libmp3lame", "-y"])
            .arg(&output_path);

        let output = run_output_with_timeout(cmd, "ffmpeg audio extraction", self.timeout_seconds).await?;
        if !output.status.success() {
            return Err(AcquireError::Transcode {
                stage: "ffmpeg audio extraction",
                detail: last_stderr_line(&output.stderr),
            });
        }

        info!("extracted audio to {}", output_path.display());
        Ok(LocalFile::new(output_path))
    }

    /// Detects black borders and writes a cropped copy of the video
    /// (`temp_video.mp4` becomes `temp_video_cropped.mp4`).
    ///
    /// Two ffmpeg passes: a cropdetect run whose diagnostic output yields
    /// the crop window, then a crop filter run applying it.
    pub async fn auto_crop(&self, input: &LocalFile) -> Result<LocalFile, AcquireError> {
        let mut detect = TokioCommand::new(&self.binary);
        detect
            .arg("-i")
            .arg(&input.path)
            .args(["-vf", "cropdetect", "-f", "null", "-"]);

        let output = run_output_with_timeout(detect, "ffmpeg crop detection", self.timeout_seconds).await?;
        if !output.status.success() {
            return Err(AcquireError::Transcode {
                stage: "ffmpeg crop detection",
                detail: last_stderr_line(&output.stderr),
            });
        }

        // cropdetect reports on stderr alongside the usual ffmpeg banner
        let diagnostics = String::from_utf8_lossy(&output.stderr);
        let region = parse_crop_filter(&diagnostics)
            .ok_or_else(|| AcquireError::CropDetection(input.path.clone()))?;
        info!("detected crop window {}", region.to_filter());

        let output_path = cropped_output_path(&input.path);
        let filter = region.to_filter();
        let mut apply = TokioCommand::new(&self.binary);
        apply
            .arg("-i")
            .arg(&input.path)
            .args(["-vf", filter.as_str(), "-y"])
            .arg(&output_path);

        let output = run_output_with_timeout(apply, "ffmpeg crop", self.timeout_seconds).await?;
        if !output.status.success() {
            return Err(AcquireError::Transcode {
                stage: "ffmpeg crop",
                detail: last_stderr_line(&output.stderr),
            });
        }

        info!("cropped video written to {}", output_path.display());
        Ok(LocalFile::new(output_path))
    }
}

/// Extracts the first `crop=<w>:<h>:<x>:<y>` occurrence from cropdetect
/// diagnostic text.
pub fn parse_crop_filter(diagnostics: &str) -> Option<CropRegion> {
    let caps = CROP_RE.captures(diagnostics)?;
    Some(CropRegion {
        width: caps.get(1)?.as_str().parse().ok()?,
        height: caps.get(2)?.as_str().parse().ok()?,
        x: caps.get(3)?.as_str().parse().ok()?,
        y: caps.get(4)?.as_str().parse().ok()?,
    })
}

/// `video.mp4` -> `video_cropped.mp4`; the suffix goes before the extension.
fn cropped_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string());
    let extension = input
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mp4".to_string());
    input.with_file_name(format!("{}_cropped.{}", stem, extension))
}

fn last_stderr_line(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    text.lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("no error output")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_crop_filter() {
        let region = parse_crop_filter("crop=640:480:10:5").unwrap();
        assert_eq!(
            region,
            CropRegion {
                width: 640,
                height: 480,
                x: 10,
                y: 5
            }
        );
    }

    #[test]
    fn test_parse_crop_filter_from_cropdetect_line() {
        let diagnostics = "[Parsed_cropdetect_0 @ 0x7f9] x1:0 x2:639 y1:64 y2:415 \
                           w:640 h:352 x:0 y:64 pts:4096 t:0.170667 crop=640:352:0:64";
        let region = parse_crop_filter(diagnostics).unwrap();
        assert_eq!(region.to_filter(), "crop=640:352:0:64");
    }

    #[test]
    fn test_parse_crop_filter_takes_first_match() {
        let diagnostics = "crop=640:352:0:64\nsome noise\ncrop=320:240:8:8";
        let region = parse_crop_filter(diagnostics).unwrap();
        assert_eq!(region.to_filter(), "crop=640:352:0:64");
    }

    #[test]
    fn test_parse_crop_filter_rejects_malformed_text() {
        assert!(parse_crop_filter("").is_none());
        assert!(parse_crop_filter("frame=  100 fps= 25 size=  1024kB").is_none());
        assert!(parse_crop_filter("crop=640:480:10").is_none());
    }

    #[test]
    fn test_cropped_output_path_keeps_extension() {
        assert_eq!(
            cropped_output_path(Path::new("/tmp/temp_video.mp4")),
            Path::new("/tmp/temp_video_cropped.mp4")
        );
        assert_eq!(
            cropped_output_path(Path::new("/tmp/temp_video_2.mp4")),
            Path::new("/tmp/temp_video_2_cropped.mp4")
        );
    }

    #[test]
    fn test_last_stderr_line_skips_trailing_blanks() {
        assert_eq!(last_stderr_line(b"first\nreal error\n\n"), "real error");
        assert_eq!(last_stderr_line(b""), "no error output");
    }
}
