use serde::{Deserialize, Serialize};

/// Fixed output frame rate for every Roomloop render.
pub const DEFAULT_FPS: u32 = 30;

/// Output resolution of a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// 1920x1080.
    #[serde(rename = "1080p")]
    Hd1080,
    /// 3840x2160.
    #[serde(rename = "4k")]
    Uhd4k,
}

impl Resolution {
    /// Output width in pixels.
    pub fn width(&self) -> u32 {
        match self {
            Resolution::Hd1080 => 1920,
            Resolution::Uhd4k => 3840,
        }
    }

    /// Output height in pixels.
    pub fn height(&self) -> u32 {
        match self {
            Resolution::Hd1080 => 1080,
            Resolution::Uhd4k => 2160,
        }
    }

    /// `(width, height)` pair.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution::Hd1080
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (w, h) = self.dimensions();
        write!(f, "{}x{}", w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_dimensions() {
        assert_eq!(Resolution::Hd1080.dimensions(), (1920, 1080));
        assert_eq!(Resolution::Uhd4k.dimensions(), (3840, 2160));
    }

    #[test]
    fn test_resolution_serde_names() {
        let r: Resolution = serde_json::from_str("\"1080p\"").unwrap();
        assert_eq!(r, Resolution::Hd1080);
        assert_eq!(serde_json::to_string(&Resolution::Uhd4k).unwrap(), "\"4k\"");
    }

    #[test]
    fn test_resolution_display() {
        assert_eq!(format!("{}", Resolution::Hd1080), "1920x1080");
    }
}
