//! Viewport display style bitmask.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use crate::config::WireframeQuality;
use crate::scene_index::ReprVariant;

/// Display style bits of a viewport frame.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DisplayStyle(u32);

impl DisplayStyle {
    pub const NONE: Self = Self(0);
    pub const SHADED: Self = Self(1 << 0);
    pub const WIREFRAME: Self = Self(1 << 1);
    pub const BOUNDING_BOX: Self = Self(1 << 2);
    pub const XRAY: Self = Self(1 << 3);
    pub const TEXTURED: Self = Self(1 << 4);
    pub const DEFAULT_MATERIAL: Self = Self(1 << 5);
    pub const FLAT_SHADED: Self = Self(1 << 6);

    /// Bits whose change rebuilds the filtering chain. Every other bit is
    /// applied to the existing stages.
    pub const REBUILD_MASK: Self = Self(Self::SHADED.0 | Self::WIREFRAME.0 | Self::BOUNDING_BOX.0 | Self::XRAY.0);

    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn set(&mut self, other: Self, on: bool) {
        if on {
            self.0 |= other.0;
        } else {
            self.0 &= !other.0;
        }
    }

    /// True if going from `previous` to `self` needs a new chain.
    #[inline]
    pub fn requires_rebuild(self, previous: Self) -> bool {
        (self.0 ^ previous.0) & Self::REBUILD_MASK.0 != 0
    }

    /// Geometry stage this style selects.
    pub fn geometry_mode(self, quality: WireframeQuality) -> GeometryMode {
        if self.contains(Self::BOUNDING_BOX) {
            return GeometryMode::BoundingBox;
        }
        match (self.contains(Self::WIREFRAME), self.contains(Self::SHADED)) {
            (true, true) => GeometryMode::Wireframe(match quality {
                WireframeQuality::Full => ReprVariant::WireframeOnSurfaceRefined,
                WireframeQuality::Reduced => ReprVariant::WireframeOnSurface,
            }),
            (true, false) => GeometryMode::Wireframe(ReprVariant::WireframeRefined),
            _ => GeometryMode::Shaded,
        }
    }
}

impl BitOr for DisplayStyle {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for DisplayStyle {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for DisplayStyle {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for DisplayStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(DisplayStyle, &str); 7] = [
            (DisplayStyle::SHADED, "SHADED"),
            (DisplayStyle::WIREFRAME, "WIREFRAME"),
            (DisplayStyle::BOUNDING_BOX, "BOUNDING_BOX"),
            (DisplayStyle::XRAY, "XRAY"),
            (DisplayStyle::TEXTURED, "TEXTURED"),
            (DisplayStyle::DEFAULT_MATERIAL, "DEFAULT_MATERIAL"),
            (DisplayStyle::FLAT_SHADED, "FLAT_SHADED"),
        ];
        let names: Vec<&str> = NAMES.iter().filter(|(s, _)| self.contains(*s)).map(|(_, n)| *n).collect();
        if names.is_empty() {
            f.write_str("DisplayStyle(NONE)")
        } else {
            write!(f, "DisplayStyle({})", names.join(" | "))
        }
    }
}

/// Stage 7 of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryMode {
    Shaded,
    Wireframe(ReprVariant),
    BoundingBox,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebuild_bits() {
        let shaded = DisplayStyle::SHADED;
        assert!(!(shaded | DisplayStyle::TEXTURED).requires_rebuild(shaded));
        assert!(!(shaded | DisplayStyle::DEFAULT_MATERIAL).requires_rebuild(shaded | DisplayStyle::TEXTURED));
        assert!((shaded | DisplayStyle::WIREFRAME).requires_rebuild(shaded));
        assert!((shaded | DisplayStyle::XRAY).requires_rebuild(shaded));
        assert!(DisplayStyle::BOUNDING_BOX.requires_rebuild(shaded));
    }

    #[test]
    fn test_geometry_mode() {
        let full = WireframeQuality::Full;
        assert_eq!(DisplayStyle::SHADED.geometry_mode(full), GeometryMode::Shaded);
        assert_eq!(
            DisplayStyle::WIREFRAME.geometry_mode(full),
            GeometryMode::Wireframe(ReprVariant::WireframeRefined)
        );
        assert_eq!(
            (DisplayStyle::SHADED | DisplayStyle::WIREFRAME).geometry_mode(WireframeQuality::Reduced),
            GeometryMode::Wireframe(ReprVariant::WireframeOnSurface)
        );
        assert_eq!(
            (DisplayStyle::SHADED | DisplayStyle::BOUNDING_BOX).geometry_mode(full),
            GeometryMode::BoundingBox
        );
    }

    #[test]
    fn test_debug_names() {
        let s = format!("{:?}", DisplayStyle::SHADED | DisplayStyle::XRAY);
        assert_eq!(s, "DisplayStyle(SHADED | XRAY)");
    }
}
