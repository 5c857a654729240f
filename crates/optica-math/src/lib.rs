#![warn(missing_docs)]

//! Math types for the optica ray-tracing kernel.
//!
//! Thin wrappers around nalgebra providing the domain types used by
//! every other crate: points, vectors, unit directions, affine
//! transforms, and tolerance constants for ray/surface predicates.

use nalgebra::{Matrix3, Matrix4, Unit, Vector2, Vector3, Vector4};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit-length direction, e.g. of a ray or a surface normal.
pub type Dir3 = Unit<Vector3<f64>>;

/// A point in 2D surface-parameter space.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in 2D space.
pub type Vec2 = Vector2<f64>;

/// A 3x3 matrix (linear part of an affine map, local bases).
pub type Mat3 = Matrix3<f64>;

/// Normalize `v`, returning `None` for zero-length or non-finite input.
///
/// Used wherever a direction is computed at trace time, so that a
/// degenerate configuration is caught at the point of computation.
pub fn try_dir(v: Vec3) -> Option<Dir3> {
    if !v.iter().all(|c| c.is_finite()) {
        return None;
    }
    Dir3::try_new(v, 1e-15)
}

/// Any unit vector perpendicular to `d`.
pub fn any_perpendicular(d: &Dir3) -> Dir3 {
    let arbitrary = if d.as_ref().x.abs() < 0.9 {
        Vec3::x()
    } else {
        Vec3::y()
    };
    Dir3::new_normalize(arbitrary.cross(d.as_ref()))
}

/// An affine map of space stored as a homogeneous 4x4 matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// The transform that changes nothing.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Shift every point by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// Translation by a vector.
    pub fn translation_by(v: &Vec3) -> Self {
        Self::translation(v.x, v.y, v.z)
    }

    /// Non-uniform scale by `(sx, sy, sz)` about the origin.
    pub fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 0)] = sx;
        m[(1, 1)] = sy;
        m[(2, 2)] = sz;
        Self { matrix: m }
    }

    /// Uniform scale by `s` about the origin.
    pub fn uniform_scale(s: f64) -> Self {
        Self::scale(s, s, s)
    }

    /// Rotation about the X axis by `angle` radians.
    pub fn rotation_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(1, 1)] = c;
        m[(1, 2)] = -s;
        m[(2, 1)] = s;
        m[(2, 2)] = c;
        Self { matrix: m }
    }

    /// Rotation about the Y axis by `angle` radians.
    pub fn rotation_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(0, 0)] = c;
        m[(0, 2)] = s;
        m[(2, 0)] = -s;
        m[(2, 2)] = c;
        Self { matrix: m }
    }

    /// Rotation about the Z axis by `angle` radians.
    pub fn rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(0, 0)] = c;
        m[(0, 1)] = -s;
        m[(1, 0)] = s;
        m[(1, 1)] = c;
        Self { matrix: m }
    }

    /// Right-handed rotation by `angle` radians about `axis` through the origin
    /// (Rodrigues' formula).
    pub fn rotation_about_axis(axis: &Dir3, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        let (x, y, z) = (axis.as_ref().x, axis.as_ref().y, axis.as_ref().z);
        let mut m = Matrix4::identity();
        m[(0, 0)] = t * x * x + c;
        m[(0, 1)] = t * x * y - s * z;
        m[(0, 2)] = t * x * z + s * y;
        m[(1, 0)] = t * x * y + s * z;
        m[(1, 1)] = t * y * y + c;
        m[(1, 2)] = t * y * z - s * x;
        m[(2, 0)] = t * x * z - s * y;
        m[(2, 1)] = t * y * z + s * x;
        m[(2, 2)] = t * z * z + c;
        Self { matrix: m }
    }

    /// Rotation about an axis through `point` by `angle` radians.
    pub fn rotation_about_line(point: &Point3, axis: &Dir3, angle: f64) -> Self {
        let to_origin = Self::translation(-point.x, -point.y, -point.z);
        let back = Self::translation(point.x, point.y, point.z);
        to_origin
            .then(&Self::rotation_about_axis(axis, angle))
            .then(&back)
    }

    /// `outer ∘ inner`: the transform that applies `inner` first, then `outer`.
    pub fn compose(outer: &Transform, inner: &Transform) -> Self {
        Self {
            matrix: outer.matrix * inner.matrix,
        }
    }

    /// Apply `self` first, then `next`.
    pub fn then(&self, next: &Transform) -> Self {
        Self::compose(next, self)
    }

    /// Map a point, translation included.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }

    /// Map a direction or displacement; translation has no effect.
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        let r = self.matrix * Vector4::new(v.x, v.y, v.z, 0.0);
        Vec3::new(r.x, r.y, r.z)
    }

    /// Map a surface normal through the inverse transpose of the linear part.
    ///
    /// The result is not renormalized.
    pub fn apply_normal(&self, n: &Vec3) -> Vec3 {
        match self.linear_part().try_inverse() {
            Some(inv) => inv.transpose() * n,
            // Singular transform; leave the normal alone
            None => *n,
        }
    }

    /// The upper-left 3x3 (rotation/scale/shear) block.
    pub fn linear_part(&self) -> Mat3 {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// The undoing transform, or `None` when the matrix is singular.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }

    /// The scale factor `s` if this transform is a similarity
    /// (`MᵀM = s²I` for the linear part), otherwise `None`.
    ///
    /// Shapes that are only closed under similarities (spheres, discs,
    /// cylinders) use this to decide whether they can transform natively.
    pub fn similarity_scale(&self) -> Option<f64> {
        let m = self.linear_part();
        let mtm = m.transpose() * m;
        let s2 = mtm[(0, 0)];
        if s2 <= 0.0 || !s2.is_finite() {
            return None;
        }
        let tol = 1e-9 * s2.max(1.0);
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { s2 } else { 0.0 };
                if (mtm[(i, j)] - expected).abs() > tol {
                    return None;
                }
            }
        }
        Some(s2.sqrt())
    }

    /// Entry-wise comparison within `eps`.
    pub fn approx_eq(&self, other: &Transform, eps: f64) -> bool {
        self.matrix
            .iter()
            .zip(other.matrix.iter())
            .all(|(a, b)| (a - b).abs() <= eps)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Tolerance constants for ray/surface comparisons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Distances closer than this are treated as equal (scene units).
    pub linear: f64,
    /// Angular tolerance in radians.
    pub angular: f64,
}

impl Tolerance {
    /// Default tolerances for scenes of roughly unit scale.
    pub const DEFAULT: Self = Self {
        linear: 1e-9,
        angular: 1e-12,
    };

    /// Tolerances scaled to a scene whose characteristic size is `scale`.
    pub fn for_scale(scale: f64) -> Self {
        Self {
            linear: Self::DEFAULT.linear * scale.abs().max(1.0),
            angular: Self::DEFAULT.angular,
        }
    }

    /// Check if two points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if a scalar distance is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }

    /// Check if two distances along a ray coincide.
    pub fn distances_equal(&self, a: f64, b: f64) -> bool {
        a == b || (a - b).abs() < self.linear
    }

    /// Check if two angles are effectively equal (in radians).
    pub fn angles_equal(&self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.angular
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_identity_leaves_ray_alone() {
        let t = Transform::default();
        let origin = Point3::new(-0.5, 4.0, 2.25);
        let dir = Vec3::new(0.0, 0.6, -0.8);
        assert_relative_eq!(t.apply_point(&origin), origin, epsilon = 1e-15);
        assert_relative_eq!(t.apply_vec(&dir), dir, epsilon = 1e-15);
    }

    #[test]
    fn test_translation_moves_origins_not_directions() {
        let t = Transform::translation_by(&Vec3::new(100.0, 0.0, -3.0));
        let moved = t.apply_point(&Point3::new(0.0, 0.3, 5.0));
        assert_relative_eq!(moved, Point3::new(100.0, 0.3, 2.0), epsilon = 1e-12);
        let v = t.apply_vec(&Vec3::z());
        assert_relative_eq!(v, Vec3::z(), epsilon = 1e-12);
    }

    #[test]
    fn test_quarter_turns() {
        let about_z = Transform::rotation_z(PI / 2.0).apply_vec(&Vec3::x());
        assert_relative_eq!(about_z, Vec3::y(), epsilon = 1e-12);
        let about_x = Transform::rotation_x(PI / 2.0).apply_vec(&Vec3::y());
        assert_relative_eq!(about_x, Vec3::z(), epsilon = 1e-12);
        let about_y = Transform::rotation_y(PI / 2.0).apply_vec(&Vec3::z());
        assert_relative_eq!(about_y, Vec3::x(), epsilon = 1e-12);
    }

    #[test]
    fn test_non_uniform_scale_stretches_axes() {
        let t = Transform::scale(0.5, 2.0, 3.0);
        let corner = t.apply_point(&Point3::new(-2.0, 1.0, -1.0));
        assert_relative_eq!(corner, Point3::new(-1.0, 2.0, -3.0), epsilon = 1e-12);
    }

    #[test]
    fn test_then_applies_self_first() {
        // translate (0,0,0) -> (1,0,0), then scale -> (2,0,0)
        let translate = Transform::translation(1.0, 0.0, 0.0);
        let scale = Transform::uniform_scale(2.0);
        let composed = translate.then(&scale);
        let result = composed.apply_point(&Point3::origin());
        assert!((result.x - 2.0).abs() < 1e-12);

        let same = Transform::compose(&scale, &translate);
        assert!(composed.approx_eq(&same, 1e-12));
    }

    #[test]
    fn test_compose_is_associative() {
        let a = Transform::rotation_x(0.3);
        let b = Transform::translation(1.0, -2.0, 0.5);
        let c = Transform::scale(1.0, 2.0, 3.0);
        let left = Transform::compose(&Transform::compose(&c, &b), &a);
        let right = Transform::compose(&c, &Transform::compose(&b, &a));
        assert!(left.approx_eq(&right, 1e-12));
    }

    #[test]
    fn test_inverse_undoes_rigid_motion() {
        let t = Transform::rotation_about_axis(&Dir3::new_normalize(Vec3::new(1.0, 2.0, 2.0)), 0.9)
            .then(&Transform::translation(-4.0, 0.5, 7.0));
        let back = t.inverse().unwrap();
        let p = Point3::new(0.25, -1.0, 3.0);
        assert_relative_eq!(back.apply_point(&t.apply_point(&p)), p, epsilon = 1e-12);
        assert!(t.then(&back).approx_eq(&Transform::identity(), 1e-12));
        assert!(Transform::uniform_scale(0.0).inverse().is_none());
    }

    #[test]
    fn test_rotation_about_axis() {
        let axis = Dir3::new_normalize(Vec3::z());
        let quarter = Transform::rotation_about_axis(&axis, PI / 2.0);
        assert!(quarter.approx_eq(&Transform::rotation_z(PI / 2.0), 1e-12));

        // Half turn about (1,1,0) swaps x and y
        let diagonal = Dir3::new_normalize(Vec3::new(1.0, 1.0, 0.0));
        let half = Transform::rotation_about_axis(&diagonal, PI);
        assert_relative_eq!(half.apply_vec(&Vec3::x()), Vec3::y(), epsilon = 1e-12);
        assert_relative_eq!(half.apply_vec(&Vec3::z()), -Vec3::z(), epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_about_line() {
        let axis = Dir3::new_normalize(Vec3::z());
        let t = Transform::rotation_about_line(&Point3::new(1.0, 0.0, 0.0), &axis, PI);
        let result = t.apply_point(&Point3::new(2.0, 0.0, 5.0));
        assert_relative_eq!(result, Point3::new(0.0, 0.0, 5.0), epsilon = 1e-12);
    }

    #[test]
    fn test_normal_uses_inverse_transpose() {
        // Plane x + y = 0 has normal (1,1,0). Stretch x by 2: the plane becomes
        // x/2 + y = 0 with normal proportional to (1, 2, 0).
        let t = Transform::scale(2.0, 1.0, 1.0);
        let n = t.apply_normal(&Vec3::new(1.0, 1.0, 0.0));
        let n = n.normalize();
        let expected = Vec3::new(1.0, 2.0, 0.0).normalize();
        assert_relative_eq!(n, expected, epsilon = 1e-12);

        // The transformed normal stays perpendicular to a transformed tangent.
        let tangent = t.apply_vec(&Vec3::new(1.0, -1.0, 0.0));
        assert!(n.dot(&tangent).abs() < 1e-12);
    }

    #[test]
    fn test_similarity_scale() {
        let rigid = Transform::rotation_y(0.7).then(&Transform::translation(3.0, 0.0, 1.0));
        assert!((rigid.similarity_scale().unwrap() - 1.0).abs() < 1e-12);

        let uniform = Transform::rotation_x(1.1).then(&Transform::uniform_scale(2.5));
        assert!((uniform.similarity_scale().unwrap() - 2.5).abs() < 1e-9);

        assert!(Transform::scale(1.0, 2.0, 1.0).similarity_scale().is_none());
        assert!(Transform::uniform_scale(0.0).similarity_scale().is_none());
    }

    #[test]
    fn test_try_dir() {
        assert!(try_dir(Vec3::zeros()).is_none());
        assert!(try_dir(Vec3::new(f64::NAN, 0.0, 1.0)).is_none());
        let d = try_dir(Vec3::new(0.0, 3.0, 4.0)).unwrap();
        assert!((d.as_ref().norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_any_perpendicular() {
        for v in [Vec3::x(), Vec3::y(), Vec3::z(), Vec3::new(1.0, 2.0, -3.0)] {
            let d = Dir3::new_normalize(v);
            let p = any_perpendicular(&d);
            assert!(p.as_ref().dot(d.as_ref()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_tolerance_points_equal() {
        let tol = Tolerance::DEFAULT;
        let a = Point3::new(1.0, 2.0, 3.0);
        let b = Point3::new(1.0 + 1e-10, 2.0, 3.0);
        assert!(tol.points_equal(&a, &b));
        let c = Point3::new(1.001, 2.0, 3.0);
        assert!(!tol.points_equal(&a, &c));
    }

    #[test]
    fn test_tolerance_for_scale() {
        let tol = Tolerance::for_scale(1000.0);
        assert!(tol.distances_equal(5.0, 5.0 + 1e-7));
        assert!(!Tolerance::DEFAULT.distances_equal(5.0, 5.0 + 1e-7));
        assert!(tol.distances_equal(f64::INFINITY, f64::INFINITY));
    }
}
