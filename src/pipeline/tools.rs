// External tool discovery and invocation helpers

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command as TokioCommand;
use tokio::time::{timeout, Duration};

use super::errors::AcquireError;

/// Finds the ffmpeg binary, preferring common install locations over PATH.
pub fn find_ffmpeg() -> PathBuf {
    let common_paths = [
        "/opt/homebrew/bin/ffmpeg", // Homebrew on Apple Silicon
        "/usr/local/bin/ffmpeg",    // Homebrew on Intel Mac
        "/usr/bin/ffmpeg",          // System installation
    ];

    // 1. Try common paths first
    for path in common_paths {
        if Path::new(path).exists() {
            return PathBuf::from(path);
        }
    }

    // 2. Fallback: ask PATH
    if let Ok(output) = std::process::Command::new("which").arg("ffmpeg").output() {
        if output.status.success() {
            if let Ok(stdout) = String::from_utf8(output.stdout) {
                let trimmed = stdout.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
        }
    }

    // Let the eventual spawn report the failure
    PathBuf::from("ffmpeg")
}

/// Probes `binary -version` and returns the first line when it runs.
pub fn ffmpeg_version(binary: &Path) -> Option<String> {
    match std::process::Command::new(binary).arg("-version").output() {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            stdout.lines().next().map(|line| line.trim().to_string())
        }
        _ => None,
    }
}

/// Runs a prepared command to completion, capturing stdout and stderr,
/// killing the process if it outlives `timeout_seconds`.
///
/// `stage` labels the invocation in errors ("ffmpeg crop detection", ...).
pub async fn run_output_with_timeout(
    mut cmd: TokioCommand,
    stage: &'static str,
    timeout_seconds: u64,
) -> Result<std::process::Output, AcquireError> {
    let transcode_error = |detail: String| AcquireError::Transcode { stage, detail };

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| transcode_error(format!("failed to start: {}", e)))?;

    let mut stdout_pipe = child
        .stdout
        .take()
        .ok_or_else(|| transcode_error("failed to capture stdout".to_string()))?;
    let mut stderr_pipe = child
        .stderr
        .take()
        .ok_or_else(|| transcode_error("failed to capture stderr".to_string()))?;

    // Drain both pipes while waiting; a full pipe buffer blocks the child
    let stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stdout_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stderr_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });

    match timeout(Duration::from_secs(timeout_seconds), child.wait()).await {
        Ok(status) => {
            let status = status.map_err(|e| transcode_error(format!("failed to wait: {}", e)))?;
            let stdout = stdout_task
                .await
                .map_err(|e| transcode_error(format!("stdout reader failed: {}", e)))?
                .map_err(|e| transcode_error(format!("failed to read stdout: {}", e)))?;
            let stderr = stderr_task
                .await
                .map_err(|e| transcode_error(format!("stderr reader failed: {}", e)))?
                .map_err(|e| transcode_error(format!("failed to read stderr: {}", e)))?;

            Ok(std::process::Output {
                status,
                stdout,
                stderr,
            })
        }
        Err(_) => {
            let _ = child.kill().await;
            stdout_task.abort();
            stderr_task.abort();
            Err(AcquireError::Timeout {
                operation: stage.to_string(),
                seconds: timeout_seconds,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_probe_of_missing_binary() {
        assert!(ffmpeg_version(Path::new("/nonexistent/ffmpeg")).is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_captures_output() {
        let mut cmd = TokioCommand::new("echo");
        cmd.arg("hello");
        let output = run_output_with_timeout(cmd, "echo test", 10).await.unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_kills_process_on_timeout() {
        let mut cmd = TokioCommand::new("sleep");
        cmd.arg("30");
        let err = run_output_with_timeout(cmd, "sleep test", 1).await.unwrap_err();
        assert!(matches!(err, AcquireError::Timeout { seconds: 1, .. }));
    }
}
