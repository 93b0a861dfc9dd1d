//! Content type sniffing from leading bytes.
//!
//! Only the handful of formats this service cares about are recognised;
//! everything else is `application/octet-stream`. The client-declared
//! content type is never consulted.

/// Number of leading bytes considered when sniffing
pub const SNIFF_LEN: usize = 512;

pub const VIDEO_MP4: &str = "video/mp4";
pub const VIDEO_WEBM: &str = "video/webm";
pub const IMAGE_JPEG: &str = "image/jpeg";
pub const IMAGE_PNG: &str = "image/png";
pub const IMAGE_GIF: &str = "image/gif";
pub const IMAGE_WEBP: &str = "image/webp";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Classify `data` by its leading bytes. Bytes past [`SNIFF_LEN`] are ignored.
pub fn sniff_content_type(data: &[u8]) -> &'static str {
    let data = &data[..data.len().min(SNIFF_LEN)];

    if data.starts_with(b"\xFF\xD8\xFF") {
        IMAGE_JPEG
    } else if data.starts_with(b"\x89PNG\r\n\x1A\n") {
        IMAGE_PNG
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        IMAGE_GIF
    } else if data.len() >= 14 && &data[0..4] == b"RIFF" && &data[8..14] == b"WEBPVP" {
        IMAGE_WEBP
    } else if data.starts_with(b"\x1A\x45\xDF\xA3") {
        VIDEO_WEBM
    } else if is_mp4(data) {
        VIDEO_MP4
    } else {
        OCTET_STREAM
    }
}

/// ISO base media file with an `ftyp` box whose major or compatible brands
/// start with "mp4".
fn is_mp4(data: &[u8]) -> bool {
    if data.len() < 12 {
        return false;
    }

    let box_size = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if data.len() < box_size || box_size % 4 != 0 {
        return false;
    }
    if &data[4..8] != b"ftyp" {
        return false;
    }

    // Brands are 4-byte entries from offset 8; offset 12 is the minor version.
    (8..box_size)
        .step_by(4)
        .filter(|&st| st != 12)
        .any(|st| data.get(st..st + 3) == Some(b"mp4".as_slice()))
}
