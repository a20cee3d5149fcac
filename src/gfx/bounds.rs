//! Axis-aligned bounding boxes for meshes and models
//!
//! A [`BoundingBox`] is an immutable value: every change of geometry or scale
//! produces a new box. [`ScaledBounds`] keeps the unscaled box around so that
//! rescaling always starts from the original extents and never compounds.

use cgmath::{ElementWise, Vector3, Zero};

/// Axis-aligned extent descriptor
///
/// Invariants: `max >= min` on every axis, `center == (min + max) / 2`, and
/// `width/height/depth` are the per-axis extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    min: Vector3<f32>,
    max: Vector3<f32>,
    center: Vector3<f32>,
    width: f32,
    height: f32,
    depth: f32,
}

impl BoundingBox {
    /// Builds a box from two opposite corners
    ///
    /// The corners may be given in any order; they are sorted per axis.
    pub fn from_corners(a: Vector3<f32>, b: Vector3<f32>) -> Self {
        let min = Vector3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z));
        let max = Vector3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z));
        let size = max - min;

        Self {
            min,
            max,
            center: (min + max) / 2.0,
            width: size.x,
            height: size.y,
            depth: size.z,
        }
    }

    /// The degenerate zero-sized box centered at the origin
    pub fn zero() -> Self {
        Self::from_corners(Vector3::zero(), Vector3::zero())
    }

    /// Computes the tightest box around a point set in a single pass
    ///
    /// An empty point set yields [`BoundingBox::zero`]; callers must not
    /// assume a positive volume.
    pub fn compute_from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Vector3<f32>>,
    {
        let mut min = Vector3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY);
        let mut max = Vector3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY);
        let mut seen = false;

        for p in points {
            seen = true;
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        if !seen {
            return Self::zero();
        }

        Self::from_corners(min, max)
    }

    /// Componentwise union of a set of boxes
    ///
    /// Used to build a model's bounds from its meshes. An empty set yields the
    /// zero box.
    pub fn union_of<'a, I>(boxes: I) -> Self
    where
        I: IntoIterator<Item = &'a BoundingBox>,
    {
        let mut iter = boxes.into_iter();
        let Some(first) = iter.next() else {
            return Self::zero();
        };

        let (min, max) = iter.fold((first.min, first.max), |(min, max), b| {
            (
                Vector3::new(min.x.min(b.min.x), min.y.min(b.min.y), min.z.min(b.min.z)),
                Vector3::new(max.x.max(b.max.x), max.y.max(b.max.y), max.z.max(b.max.z)),
            )
        });

        Self::from_corners(min, max)
    }

    /// Returns a new box with every extremum multiplied by the axis scale
    ///
    /// Apply this to an unscaled box only. Negative factors mirror the box and
    /// the corners are re-sorted so the min/max invariant still holds.
    pub fn rescale(&self, scale: Vector3<f32>) -> Self {
        Self::from_corners(
            self.min.mul_element_wise(scale),
            self.max.mul_element_wise(scale),
        )
    }

    /// Translates the box by an offset
    pub fn translate(&self, offset: Vector3<f32>) -> Self {
        Self::from_corners(self.min + offset, self.max + offset)
    }

    pub fn min(&self) -> Vector3<f32> {
        self.min
    }

    pub fn max(&self) -> Vector3<f32> {
        self.max
    }

    pub fn center(&self) -> Vector3<f32> {
        self.center
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    pub fn min_x(&self) -> f32 {
        self.min.x
    }

    pub fn min_y(&self) -> f32 {
        self.min.y
    }

    pub fn min_z(&self) -> f32 {
        self.min.z
    }

    pub fn max_x(&self) -> f32 {
        self.max.x
    }

    pub fn max_y(&self) -> f32 {
        self.max.y
    }

    pub fn max_z(&self) -> f32 {
        self.max.z
    }

    /// True when the box has no extent on any axis
    pub fn is_degenerate(&self) -> bool {
        self.width == 0.0 && self.height == 0.0 && self.depth == 0.0
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::zero()
    }
}

/// A bounding box together with the scale currently applied to it
///
/// The unscaled box is cached so every scale change is a fresh recomputation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledBounds {
    unscaled: BoundingBox,
    scale: Vector3<f32>,
    scaled: BoundingBox,
}

impl ScaledBounds {
    pub fn new(unscaled: BoundingBox) -> Self {
        Self {
            unscaled,
            scale: Vector3::new(1.0, 1.0, 1.0),
            scaled: unscaled,
        }
    }

    /// Replaces the source geometry box and reapplies the current scale
    pub fn set_unscaled(&mut self, unscaled: BoundingBox) {
        self.unscaled = unscaled;
        self.scaled = unscaled.rescale(self.scale);
    }

    /// Sets the absolute scale, recomputing from the unscaled extents
    pub fn set_scale(&mut self, scale: Vector3<f32>) {
        self.scale = scale;
        self.scaled = self.unscaled.rescale(scale);
    }

    pub fn scale(&self) -> Vector3<f32> {
        self.scale
    }

    pub fn unscaled(&self) -> &BoundingBox {
        &self.unscaled
    }

    /// The box with the current scale applied
    pub fn current(&self) -> &BoundingBox {
        &self.scaled
    }
}

impl Default for ScaledBounds {
    fn default() -> Self {
        Self::new(BoundingBox::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_points() -> Vec<Vector3<f32>> {
        vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::new(-1.0, -2.0, 0.5),
            Vector3::new(0.25, 4.0, -3.0),
        ]
    }

    #[test]
    fn test_compute_from_points() {
        let bb = BoundingBox::compute_from_points(unit_points());

        assert_eq!(bb.min(), Vector3::new(-1.0, -2.0, -3.0));
        assert_eq!(bb.max(), Vector3::new(1.0, 4.0, 3.0));
        assert_eq!(bb.center(), (bb.min() + bb.max()) / 2.0);
        assert_eq!(bb.width(), 2.0);
        assert_eq!(bb.height(), 6.0);
        assert_eq!(bb.depth(), 6.0);
    }

    #[test]
    fn test_min_never_exceeds_max() {
        let sets = [
            vec![Vector3::new(5.0, -5.0, 0.0)],
            vec![Vector3::new(3.0, 3.0, 3.0), Vector3::new(-3.0, -3.0, -3.0)],
            unit_points(),
        ];

        for points in sets {
            let bb = BoundingBox::compute_from_points(points);
            assert!(bb.min_x() <= bb.max_x());
            assert!(bb.min_y() <= bb.max_y());
            assert!(bb.min_z() <= bb.max_z());
            assert_eq!(bb.center(), (bb.min() + bb.max()) / 2.0);
        }
    }

    #[test]
    fn test_empty_point_set_is_zero_box() {
        let bb = BoundingBox::compute_from_points(Vec::new());
        assert_eq!(bb, BoundingBox::zero());
        assert!(bb.is_degenerate());
        assert_eq!(bb.center(), Vector3::zero());
    }

    #[test]
    fn test_union_takes_componentwise_extrema() {
        let a = BoundingBox::from_corners(Vector3::new(-1.0, 0.0, 2.0), Vector3::new(1.0, 1.0, 3.0));
        let b = BoundingBox::from_corners(Vector3::new(0.0, -4.0, -2.0), Vector3::new(0.5, 6.0, 2.5));

        let u = BoundingBox::union_of([&a, &b]);
        assert_eq!(u.min(), Vector3::new(-1.0, -4.0, -2.0));
        assert_eq!(u.max(), Vector3::new(1.0, 6.0, 3.0));

        assert_eq!(BoundingBox::union_of(std::iter::empty()), BoundingBox::zero());
    }

    #[test]
    fn test_identity_rescale_is_noop() {
        let bb = BoundingBox::compute_from_points(unit_points());
        assert_eq!(bb.rescale(Vector3::new(1.0, 1.0, 1.0)), bb);
    }

    #[test]
    fn test_negative_scale_keeps_ordering() {
        let bb = BoundingBox::from_corners(Vector3::new(1.0, 1.0, 1.0), Vector3::new(2.0, 3.0, 4.0));
        let mirrored = bb.rescale(Vector3::new(-1.0, 1.0, 1.0));

        assert_eq!(mirrored.min_x(), -2.0);
        assert_eq!(mirrored.max_x(), -1.0);
        assert_eq!(mirrored.width(), 1.0);
    }

    #[test]
    fn test_scaled_bounds_do_not_compound() {
        let bb = BoundingBox::from_corners(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));
        let mut bounds = ScaledBounds::new(bb);

        for _ in 0..5 {
            bounds.set_scale(Vector3::new(2.0, 2.0, 2.0));
        }

        assert_eq!(bounds.current().max(), Vector3::new(2.0, 2.0, 2.0));
        assert_eq!(bounds.current().min(), Vector3::new(-2.0, -2.0, -2.0));
        assert_eq!(bounds.unscaled(), &bb);

        bounds.set_scale(Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(bounds.current(), &bb);
    }
}
