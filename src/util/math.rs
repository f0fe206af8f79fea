//! Math type re-exports and viewport-specific math utilities.
//!
//! This module re-exports the `glam` types used by data sources and pick
//! hits and provides the axis-aligned [`Extent`] read from prim extents.

pub use glam::{DVec3, Vec3, Vec4};

/// RGBA color, linear.
pub type Color = Vec4;

/// Axis-aligned bounding box as authored in a prim's `extent` field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent {
    pub min: DVec3,
    pub max: DVec3,
}

impl Extent {
    #[inline]
    pub const fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// The 8 corners of the box.
    ///
    /// Corner `i` takes x from `max` when bit 2 is set, y when bit 1 is set
    /// and z when bit 0 is set, so 0 is `min` and 7 is `max`.
    pub fn corners(&self) -> [Vec3; 8] {
        let lo = self.min.as_vec3();
        let hi = self.max.as_vec3();
        let mut pts = [Vec3::ZERO; 8];
        let mut i = 0;
        for x in [lo.x, hi.x] {
            for y in [lo.y, hi.y] {
                for z in [lo.z, hi.z] {
                    pts[i] = Vec3::new(x, y, z);
                    i += 1;
                }
            }
        }
        pts
    }

    /// Box center.
    #[inline]
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }
}

/// Segment indices joining [`Extent::corners`] into the 12 box edges.
///
/// Bottom face, top face, then the vertical edge pairs.
pub const BOX_CURVE_INDICES: [i32; 24] = [
    0, 4, 4, 6, 6, 2, 2, 0,
    1, 5, 5, 7, 7, 3, 3, 1,
    0, 1, 4, 5, 6, 7, 2, 3,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_corners() {
        let e = Extent::new(DVec3::new(-1.0, -2.0, -3.0), DVec3::new(1.0, 2.0, 3.0));
        let c = e.corners();
        assert_eq!(c[0], Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(c[7], Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(c[4], Vec3::new(1.0, -2.0, -3.0));
        assert_eq!(e.center(), DVec3::ZERO);
    }

    #[test]
    fn test_box_indices_in_range() {
        assert!(BOX_CURVE_INDICES.iter().all(|&i| (0..8).contains(&i)));
    }
}
