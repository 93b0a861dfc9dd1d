//! Error types for external media tools.

use reelstash_core::AppError;
use thiserror::Error;

/// Errors from running ffprobe or ffmpeg.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// The tool ran and exited non-zero. Usually a corrupt or unsupported input.
    #[error("{tool} exited unsuccessfully: {diagnostics}")]
    ExternalToolFailure { tool: String, diagnostics: String },

    /// The tool exited zero but its output was not what we expected.
    /// Usually a tool version or output schema mismatch.
    #[error("{tool} produced unexpected output: {reason}")]
    MalformedOutput { tool: String, reason: String },

    /// The probe succeeded but reported zero streams.
    #[error("no streams found in media file")]
    NoStreamFound,

    /// The tool binary could not be started.
    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for processing operations
pub type ProcessingResult<T> = Result<T, ProcessingError>;

impl ProcessingError {
    pub(crate) fn spawn(tool: &str, source: std::io::Error) -> Self {
        ProcessingError::Spawn {
            tool: tool.to_string(),
            source,
        }
    }

    /// Build a failure from a finished process, keeping stderr then stdout as
    /// the diagnostic text.
    pub(crate) fn from_output(tool: &str, output: &std::process::Output) -> Self {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut diagnostics = format!("{}", output.status);
        for part in [stderr.trim(), stdout.trim()] {
            if !part.is_empty() {
                diagnostics.push_str(": ");
                diagnostics.push_str(part);
            }
        }
        ProcessingError::ExternalToolFailure {
            tool: tool.to_string(),
            diagnostics,
        }
    }
}

impl From<ProcessingError> for AppError {
    fn from(err: ProcessingError) -> Self {
        match err {
            ProcessingError::ExternalToolFailure { tool, diagnostics } => {
                AppError::ExternalToolFailure { tool, diagnostics }
            }
            ProcessingError::Spawn { tool, source } => AppError::ExternalToolFailure {
                diagnostics: format!("failed to start {}: {}", tool, source),
                tool,
            },
            ProcessingError::MalformedOutput { tool, reason } => {
                AppError::MalformedToolOutput { tool, reason }
            }
            ProcessingError::NoStreamFound => AppError::MalformedToolOutput {
                tool: "ffprobe".to_string(),
                reason: "no streams found".to_string(),
            },
        }
    }
}
