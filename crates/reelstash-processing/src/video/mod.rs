//! Video processing module

pub mod faststart;
pub mod orientation;
pub mod probe;

pub use faststart::{faststart_output_path, FfmpegRemuxer, Remuxer};
pub use orientation::Orientation;
pub use probe::{FfprobeProber, MediaProber, ProbeResult};
