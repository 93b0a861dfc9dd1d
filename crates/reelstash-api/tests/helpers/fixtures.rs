//! Byte fixtures for uploads.

#![allow(dead_code)]

/// Bytes that sniff as `video/mp4`: an `ftyp` box followed by `len - 24`
/// bytes of filler.
pub fn mp4_bytes(len: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(len.max(24));
    data.extend_from_slice(&24u32.to_be_bytes());
    data.extend_from_slice(b"ftyp");
    data.extend_from_slice(b"isom");
    data.extend_from_slice(&[0, 0, 2, 0]);
    data.extend_from_slice(b"isom");
    data.extend_from_slice(b"mp41");
    data.resize(len.max(24), 0x42);
    data
}

/// PNG signature plus an IHDR chunk header
pub fn png_bytes() -> Vec<u8> {
    let mut data = b"\x89PNG\r\n\x1A\n\0\0\0\rIHDR".to_vec();
    data.extend_from_slice(&[0, 0, 0, 1, 0, 0, 0, 1, 8, 6, 0, 0, 0]);
    data
}

pub fn jpeg_bytes() -> Vec<u8> {
    let mut data = b"\xFF\xD8\xFF\xE0\0\x10JFIF\0".to_vec();
    data.resize(256, 0);
    data
}

/// Matches `{prefix}/{64 hex chars}.mp4`
pub fn is_video_key(key: &str, prefix: &str) -> bool {
    let Some(rest) = key.strip_prefix(&format!("{}/", prefix)) else {
        return false;
    };
    let Some(id) = rest.strip_suffix(".mp4") else {
        return false;
    };
    id.len() == 64 && id.chars().all(|c| c.is_ascii_hexdigit())
}
