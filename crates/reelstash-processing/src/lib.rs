//! Reelstash Processing Library
//!
//! Content sniffing and the ffprobe/ffmpeg steps of video ingestion. Nothing
//! here re-encodes media: videos are probed for geometry and remuxed so the
//! container metadata sits at the front of the file.

pub mod error;
pub mod sniff;
pub mod video;

pub use error::{ProcessingError, ProcessingResult};
pub use sniff::{sniff_content_type, SNIFF_LEN};
pub use video::{
    faststart_output_path, FfmpegRemuxer, FfprobeProber, MediaProber, Orientation, ProbeResult,
    Remuxer,
};
