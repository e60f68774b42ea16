//! Video container geometry and aspect classification.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Visual track geometry extracted from a container's track header.
///
/// Computed once per upload and immutable afterwards. A width or height of
/// zero means the container carried no usable geometry (e.g. audio-only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ContainerGeometry {
    pub width: u32,
    pub height: u32,
}

impl ContainerGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width/height ratio, or `None` when either dimension is zero.
    pub fn ratio(&self) -> Option<f64> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        Some(self.width as f64 / self.height as f64)
    }

    /// Classify the aspect with the given tolerance around a 1:1 ratio.
    ///
    /// `tolerance` absorbs encoder rounding (e.g. anamorphic pixels scaled to
    /// 1082x1080); ratios within it count as square.
    pub fn classify(&self, tolerance: f64) -> AspectClass {
        match self.ratio() {
            None => AspectClass::Unclassified,
            Some(ratio) if ratio > 1.0 + tolerance => AspectClass::Landscape,
            Some(ratio) if ratio < 1.0 - tolerance => AspectClass::Portrait,
            Some(_) => AspectClass::Square,
        }
    }
}

/// Coarse geometric bucket derived from the width/height ratio.
///
/// Used as the leading path segment of storage keys, so `Display` must stay
/// stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectClass {
    Landscape,
    Portrait,
    Square,
    Unclassified,
}

impl Display for AspectClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AspectClass::Landscape => write!(f, "landscape"),
            AspectClass::Portrait => write!(f, "portrait"),
            AspectClass::Square => write!(f, "square"),
            AspectClass::Unclassified => write!(f, "unclassified"),
        }
    }
}

impl FromStr for AspectClass {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "landscape" => Ok(AspectClass::Landscape),
            "portrait" => Ok(AspectClass::Portrait),
            "square" => Ok(AspectClass::Square),
            "unclassified" => Ok(AspectClass::Unclassified),
            _ => Err(anyhow::anyhow!("Invalid aspect class: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 0.02;

    #[test]
    fn test_classify_landscape() {
        let geometry = ContainerGeometry::new(1920, 1080);
        assert_eq!(geometry.classify(TOLERANCE), AspectClass::Landscape);
    }

    #[test]
    fn test_classify_portrait() {
        let geometry = ContainerGeometry::new(1080, 1920);
        assert_eq!(geometry.classify(TOLERANCE), AspectClass::Portrait);
    }

    #[test]
    fn test_classify_square_exact() {
        let geometry = ContainerGeometry::new(720, 720);
        assert_eq!(geometry.classify(TOLERANCE), AspectClass::Square);
    }

    #[test]
    fn test_classify_square_within_tolerance() {
        // 1082/1080 = 1.00185..., inside the 2% band
        let geometry = ContainerGeometry::new(1082, 1080);
        assert_eq!(geometry.classify(TOLERANCE), AspectClass::Square);
    }

    #[test]
    fn test_classify_unclassified_on_zero_dimension() {
        assert_eq!(
            ContainerGeometry::new(0, 1080).classify(TOLERANCE),
            AspectClass::Unclassified
        );
        assert_eq!(
            ContainerGeometry::new(1920, 0).classify(TOLERANCE),
            AspectClass::Unclassified
        );
    }

    #[test]
    fn test_aspect_class_display_matches_from_str() {
        for class in [
            AspectClass::Landscape,
            AspectClass::Portrait,
            AspectClass::Square,
            AspectClass::Unclassified,
        ] {
            assert_eq!(class.to_string().parse::<AspectClass>().unwrap(), class);
        }
    }
}
