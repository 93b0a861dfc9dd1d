use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

/// Coarse orientation bucket, used as the object key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
    Other,
}

impl Orientation {
    /// Classify a display aspect ratio string as reported by ffprobe.
    ///
    /// Only the exact strings "16:9" and "9:16" are recognised. Ratios that
    /// are close but not equal (e.g. "1920:1081", "64:27") fall into `Other`.
    pub fn from_aspect_ratio(display_aspect_ratio: &str) -> Self {
        match display_aspect_ratio {
            "16:9" => Orientation::Landscape,
            "9:16" => Orientation::Portrait,
            _ => Orientation::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
            Orientation::Other => "other",
        }
    }
}

impl Display for Orientation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_ratios() {
        assert_eq!(Orientation::from_aspect_ratio("16:9"), Orientation::Landscape);
        assert_eq!(Orientation::from_aspect_ratio("9:16"), Orientation::Portrait);
    }

    #[test]
    fn test_everything_else_is_other() {
        for ratio in ["", "4:3", "1:1", "16:10", "1920:1080", " 16:9", "16:9 ", "N/A", "garbage"] {
            assert_eq!(
                Orientation::from_aspect_ratio(ratio),
                Orientation::Other,
                "ratio {:?}",
                ratio
            );
        }
    }

    #[test]
    fn test_display_matches_key_prefix() {
        assert_eq!(Orientation::Landscape.to_string(), "landscape");
        assert_eq!(Orientation::Portrait.to_string(), "portrait");
        assert_eq!(Orientation::Other.to_string(), "other");
    }
}
