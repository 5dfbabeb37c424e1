//! Math utilities
//!
//! Re-exports from glam plus the axis-aligned bounds used for camera framing
//! and depth-range optimization.

pub use glam::{Mat4, Vec3};

/// Axis-aligned bounding box
///
/// [`Aabb::EMPTY`] (every min = +inf, every max = -inf) is the degenerate
/// sentinel returned for an empty or all-invisible set of drawables. Callers
/// must check [`Aabb::is_empty`] before framing a camera on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// The degenerate box
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Create an AABB from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create a unit AABB centered at origin
    pub fn unit() -> Self {
        Self::new(Vec3::splat(-0.5), Vec3::splat(0.5))
    }

    /// Smallest box enclosing the given points
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Self {
        let mut result = Self::EMPTY;
        for &point in points {
            result.expand_to_include(point);
        }
        result
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the full size of the AABB
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Length of the box diagonal
    pub fn diagonal(&self) -> f32 {
        self.size().length()
    }

    /// Check if the AABB is degenerate
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand the AABB to include a point
    pub fn expand_to_include(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Merge with another AABB
    pub fn merge(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Transform the AABB by a matrix
    pub fn transform(&self, matrix: Mat4) -> Aabb {
        // Infinite corners would turn into NaN under rotation.
        if self.is_empty() {
            return Aabb::EMPTY;
        }

        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];

        let mut result = Aabb::EMPTY;
        for corner in corners {
            result.expand_to_include(matrix.transform_point3(corner));
        }
        result
    }

    /// The six scalars `[min x, min y, min z, max x, max y, max z]`
    pub fn to_array(&self) -> [f32; 6] {
        [self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z]
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Anything that contributes to scene bounds
pub trait Drawable {
    /// Whether the drawable takes part in rendering and bounds
    fn is_visible(&self) -> bool;

    /// Current world-space bounds
    fn world_bounds(&self) -> Aabb;
}

impl<T: Drawable + ?Sized> Drawable for &T {
    fn is_visible(&self) -> bool {
        (**self).is_visible()
    }

    fn world_bounds(&self) -> Aabb {
        (**self).world_bounds()
    }
}

/// Bounds of every visible drawable
///
/// Returns [`Aabb::EMPTY`] when nothing visible is supplied.
pub fn bounding_volume<D: Drawable>(drawables: impl IntoIterator<Item = D>) -> Aabb {
    drawables
        .into_iter()
        .filter(|drawable| drawable.is_visible())
        .fold(Aabb::EMPTY, |bounds, drawable| bounds.merge(&drawable.world_bounds()))
}

/// Half the diagonal length of a box, used for zoom-to-fit
pub fn radius_from_bounds(bounds: &Aabb) -> f32 {
    0.5 * bounds.diagonal()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe {
        visible: bool,
        bounds: Aabb,
    }

    impl Drawable for Probe {
        fn is_visible(&self) -> bool {
            self.visible
        }

        fn world_bounds(&self) -> Aabb {
            self.bounds
        }
    }

    #[test]
    fn test_aabb_creation() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert_eq!(aabb.center(), Vec3::splat(0.5));
        assert_eq!(aabb.size(), Vec3::ONE);
    }

    #[test]
    fn test_empty_bounding_volume_is_sentinel() {
        let bounds = bounding_volume(Vec::<Probe>::new());
        assert!(bounds.is_empty());
        let values = bounds.to_array();
        assert!(values[..3].iter().all(|v| *v == f32::INFINITY));
        assert!(values[3..].iter().all(|v| *v == f32::NEG_INFINITY));
    }

    #[test]
    fn test_unit_cube_bounding_volume() {
        let probes = [Probe { visible: true, bounds: Aabb::unit() }];
        let bounds = bounding_volume(&probes);
        assert_eq!(bounds.to_array(), [-0.5, -0.5, -0.5, 0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_invisible_drawables_excluded() {
        let probes = [
            Probe { visible: true, bounds: Aabb::unit() },
            Probe {
                visible: false,
                bounds: Aabb::new(Vec3::splat(10.0), Vec3::splat(11.0)),
            },
        ];
        assert_eq!(bounding_volume(&probes), Aabb::unit());

        let hidden = [Probe { visible: false, bounds: Aabb::unit() }];
        assert!(bounding_volume(&hidden).is_empty());
    }

    #[test]
    fn test_radius_is_half_diagonal() {
        let radius = radius_from_bounds(&Aabb::new(Vec3::ZERO, Vec3::new(3.0, 4.0, 0.0)));
        assert!((radius - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_transform_empty_stays_empty() {
        let transformed = Aabb::EMPTY.transform(Mat4::from_rotation_y(0.7));
        assert!(transformed.is_empty());
        assert_eq!(transformed, Aabb::EMPTY);
    }

    #[test]
    fn test_transform_translates_box() {
        let moved = Aabb::unit().transform(Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)));
        assert!((moved.center() - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-6);
        assert!((moved.size() - Vec3::ONE).length() < 1e-6);
    }
}
