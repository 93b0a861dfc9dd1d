//! Stream geometry extraction with ffprobe.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use crate::error::{ProcessingError, ProcessingResult};

const TOOL: &str = "ffprobe";

/// Geometry of the first stream in a media file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProbeResult {
    pub width: u32,
    pub height: u32,
    /// Display aspect ratio exactly as ffprobe reports it, e.g. "16:9"
    pub display_aspect_ratio: String,
}

#[async_trait]
pub trait MediaProber: Send + Sync {
    async fn probe(&self, path: &Path) -> ProcessingResult<ProbeResult>;
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    #[serde(default)]
    display_aspect_ratio: String,
}

/// Runs `ffprobe -v error -print_format json -show_streams <path>`.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    ffprobe_path: String,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: impl Into<String>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
        }
    }

    fn parse(stdout: &[u8]) -> ProcessingResult<ProbeResult> {
        let output: ProbeOutput =
            serde_json::from_slice(stdout).map_err(|e| ProcessingError::MalformedOutput {
                tool: TOOL.to_string(),
                reason: e.to_string(),
            })?;

        let stream = output
            .streams
            .into_iter()
            .next()
            .ok_or(ProcessingError::NoStreamFound)?;

        Ok(ProbeResult {
            width: stream.width,
            height: stream.height,
            display_aspect_ratio: stream.display_aspect_ratio,
        })
    }
}

#[async_trait]
impl MediaProber for FfprobeProber {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
    ))]
    async fn probe(&self, path: &Path) -> ProcessingResult<ProbeResult> {
        let start = std::time::Instant::now();

        let output = Command::new(&self.ffprobe_path)
            .args(["-v", "error", "-print_format", "json", "-show_streams"])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ProcessingError::spawn(TOOL, e))?;

        if !output.status.success() {
            let err = ProcessingError::from_output(TOOL, &output);
            tracing::warn!(error = %err, "ffprobe failed");
            return Err(err);
        }

        let result = Self::parse(&output.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            width = result.width,
            height = result.height,
            display_aspect_ratio = %result.display_aspect_ratio,
            "Video probe completed"
        );

        Ok(result)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn fake_tool(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("ffprobe");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn prober(path: &Path) -> FfprobeProber {
        FfprobeProber::new(path.to_string_lossy().into_owned())
    }

    #[tokio::test]
    async fn test_probe_reads_first_stream() {
        let dir = TempDir::new().unwrap();
        let tool = fake_tool(
            &dir,
            r#"cat <<'JSON'
{"streams": [
  {"index": 0, "codec_type": "video", "width": 1920, "height": 1080, "display_aspect_ratio": "16:9"},
  {"index": 1, "codec_type": "audio"}
]}
JSON"#,
        );

        let result = prober(&tool).probe(Path::new("/tmp/in.mp4")).await.unwrap();
        assert_eq!(
            result,
            ProbeResult {
                width: 1920,
                height: 1080,
                display_aspect_ratio: "16:9".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_missing_fields_default() {
        let dir = TempDir::new().unwrap();
        let tool = fake_tool(&dir, r#"echo '{"streams": [{"codec_type": "audio"}]}'"#);

        let result = prober(&tool).probe(Path::new("/tmp/in.mp4")).await.unwrap();
        assert_eq!(result, ProbeResult::default());
    }

    #[tokio::test]
    async fn test_zero_streams() {
        let dir = TempDir::new().unwrap();
        let tool = fake_tool(&dir, r#"echo '{"streams": []}'"#);

        let err = prober(&tool).probe(Path::new("/tmp/in.mp4")).await.unwrap_err();
        assert!(matches!(err, ProcessingError::NoStreamFound));
    }

    #[tokio::test]
    async fn test_non_zero_exit_carries_diagnostics() {
        let dir = TempDir::new().unwrap();
        let tool = fake_tool(
            &dir,
            "echo 'moov atom not found' >&2\nexit 1",
        );

        let err = prober(&tool).probe(Path::new("/tmp/in.mp4")).await.unwrap_err();
        match err {
            ProcessingError::ExternalToolFailure { tool, diagnostics } => {
                assert_eq!(tool, "ffprobe");
                assert!(diagnostics.contains("moov atom not found"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unparseable_output_is_malformed() {
        let dir = TempDir::new().unwrap();
        let tool = fake_tool(&dir, "echo 'not json'");

        let err = prober(&tool).probe(Path::new("/tmp/in.mp4")).await.unwrap_err();
        assert!(matches!(err, ProcessingError::MalformedOutput { .. }));
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("no-such-ffprobe");

        let err = prober(&missing).probe(Path::new("/tmp/in.mp4")).await.unwrap_err();
        assert!(matches!(err, ProcessingError::Spawn { .. }));
    }
}
