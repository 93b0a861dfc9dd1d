//! Object key generation for uploaded videos.
//!
//! Key format: `{prefix}/{64 lowercase hex chars}.mp4`, where the prefix is the
//! video's orientation class.

use std::fmt::{Display, Formatter, Result as FmtResult};

use rand::RngCore;

const RANDOM_ID_BYTES: usize = 32;

/// Storage key for a processed video object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Generate a fresh key under `prefix`.
    ///
    /// The random part comes from the OS-seeded thread RNG, so two calls never
    /// collide in practice and re-uploads always land on a new key.
    pub fn random(prefix: impl Display) -> Self {
        let mut id = [0u8; RANDOM_ID_BYTES];
        rand::rng().fill_bytes(&mut id);
        ObjectKey(format!("{}/{}.mp4", prefix, hex::encode(id)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for ObjectKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
