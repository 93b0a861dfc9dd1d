//! Fast-start remuxing: move the `moov` atom to the front without re-encoding.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{ProcessingError, ProcessingResult};

const TOOL: &str = "ffmpeg";
const OUTPUT_SUFFIX: &str = ".processing";

/// Path the remuxer writes to for `input`: the input path plus `.processing`.
///
/// Exposed so callers can take ownership of the output before the remux
/// starts and clean up partial files on failure.
pub fn faststart_output_path(input: &Path) -> PathBuf {
    let mut path: OsString = input.as_os_str().to_owned();
    path.push(OUTPUT_SUFFIX);
    PathBuf::from(path)
}

#[async_trait]
pub trait Remuxer: Send + Sync {
    /// Remux `input` to [`faststart_output_path`]`(input)` and return that path.
    /// The input file is left untouched.
    async fn remux(&self, input: &Path) -> ProcessingResult<PathBuf>;
}

/// Runs `ffmpeg -i <in> -c copy -movflags faststart -f mp4 <out>`.
#[derive(Debug, Clone)]
pub struct FfmpegRemuxer {
    ffmpeg_path: String,
}

impl FfmpegRemuxer {
    pub fn new(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }
}

#[async_trait]
impl Remuxer for FfmpegRemuxer {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
    ))]
    async fn remux(&self, input: &Path) -> ProcessingResult<PathBuf> {
        let start = std::time::Instant::now();
        let output_path = faststart_output_path(input);

        let output = Command::new(&self.ffmpeg_path)
            .arg("-i")
            .arg(input)
            .args(["-c", "copy", "-movflags", "faststart", "-f", "mp4"])
            .arg(&output_path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ProcessingError::spawn(TOOL, e))?;

        if !output.status.success() {
            let err = ProcessingError::from_output(TOOL, &output);
            tracing::warn!(error = %err, "ffmpeg remux failed");
            return Err(err);
        }

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            output = %output_path.display(),
            "Fast-start remux completed"
        );

        Ok(output_path)
    }
}
