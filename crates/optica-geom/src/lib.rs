#![warn(missing_docs)]

//! Analytic shapes for the optica ray-tracing kernel.
//!
//! Provides a trait-based abstraction for the closed-form shapes a scene is
//! built from: spheres, planes, discs, capped cylinders, parallelepipeds and
//! triangles. Every shape knows its outward normal, its local surface
//! parametrisation `(u, v)`, whether it bounds a solid interior, and how to
//! produce a transformed copy of itself.
//!
//! Ray intersection lives in `optica-raytrace`, which dispatches on
//! [`ShapeKind`].

use std::any::Any;
use std::f64::consts::PI;

use optica_math::{any_perpendicular, Dir3, Mat3, Point2, Point3, Transform, Vec3};

/// Distance below which a point is considered to lie on a face edge.
const ON_SURFACE_EPS: f64 = 1e-9;

// =============================================================================
// Shape trait
// =============================================================================

/// The kind of a shape (for match-based dispatch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// Sphere.
    Sphere,
    /// Infinite plane bounding a half-space.
    Plane,
    /// Flat circular disc.
    Disc,
    /// Finite cylinder with flat end caps.
    Cylinder,
    /// Parallelepiped spanned by three edge vectors.
    Parallelepiped,
    /// Flat triangle.
    Triangle,
    /// Any shape under a non-similarity affine transform.
    Transformed,
}

/// Orthonormal frame at a surface point.
///
/// `du` follows increasing `u` where the parametrisation allows it,
/// `dv = normal × du`.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceFrame {
    /// Unit tangent along `u`.
    pub du: Dir3,
    /// Unit tangent completing the right-handed frame.
    pub dv: Dir3,
    /// Outward unit normal.
    pub normal: Dir3,
}

impl SurfaceFrame {
    /// Build an orthonormal frame from a normal and an approximate `u` tangent.
    ///
    /// Falls back to an arbitrary tangent if `tangent` is parallel to the normal.
    pub fn from_normal_and_tangent(normal: Dir3, tangent: &Vec3) -> Self {
        let n = normal.as_ref();
        let projected = tangent - tangent.dot(n) * n;
        let du = Dir3::try_new(projected, 1e-12).unwrap_or_else(|| any_perpendicular(&normal));
        let dv = Dir3::new_normalize(n.cross(du.as_ref()));
        Self { du, dv, normal }
    }
}

/// A closed-form shape in 3D space.
pub trait Shape: Send + Sync + std::fmt::Debug {
    /// Outward unit normal at a point on the surface.
    fn normal_at(&self, p: &Point3) -> Dir3;

    /// Surface parameters `(u, v)` of a point on the surface.
    fn uv_at(&self, p: &Point3) -> Point2;

    /// Point at surface parameters `(u, v)`, if `uv` is inside the domain
    /// and the shape has a global parametrisation.
    fn evaluate(&self, uv: Point2) -> Option<Point3>;

    /// Orthonormal surface frame at a point on the surface.
    fn frame_at(&self, p: &Point3) -> SurfaceFrame;

    /// Parameter domain as `((u_min, u_max), (v_min, v_max))`.
    fn domain(&self) -> ((f64, f64), (f64, f64));

    /// Whether [`Shape::evaluate`] is a one-to-one inverse of [`Shape::uv_at`].
    fn is_parametrised(&self) -> bool {
        true
    }

    /// Whether the shape bounds a solid interior.
    fn has_interior(&self) -> bool;

    /// Whether `p` lies inside the solid interior. Always `false` for
    /// shapes without an interior.
    fn contains(&self, p: &Point3) -> bool;

    /// The kind of this shape.
    fn shape_kind(&self) -> ShapeKind;

    /// Clone this shape into a boxed trait object.
    fn clone_box(&self) -> Box<dyn Shape>;

    /// Downcast to a concrete type via `Any`.
    fn as_any(&self) -> &dyn Any;

    /// Apply an affine transform, returning a new shape.
    fn transform(&self, t: &Transform) -> Box<dyn Shape>;
}

impl Clone for Box<dyn Shape> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

fn in_range(x: f64, (lo, hi): (f64, f64)) -> bool {
    x >= lo - ON_SURFACE_EPS && x <= hi + ON_SURFACE_EPS
}

fn wrap_angle(a: f64) -> f64 {
    if a < 0.0 {
        a + 2.0 * PI
    } else {
        a
    }
}

// =============================================================================
// Sphere
// =============================================================================

/// A sphere defined by centre and radius.
///
/// Parameterization: `P(u, v) = center + radius * (cos(v) * (cos(u) * x + sin(u) * y) + sin(v) * z)`
///
/// Where `u ∈ [0, 2π)` is longitude and `v ∈ [-π/2, π/2]` is latitude.
#[derive(Debug, Clone)]
pub struct Sphere {
    /// Centre of the sphere.
    pub center: Point3,
    /// Radius of the sphere.
    pub radius: f64,
    /// Reference direction for u=0 (perpendicular to axis).
    pub ref_dir: Dir3,
    /// Axis direction (north pole).
    pub axis: Dir3,
}

impl Sphere {
    /// Create a sphere centred at the origin with the given radius.
    pub fn new(radius: f64) -> Self {
        Self::with_center(Point3::origin(), radius)
    }

    /// Create a sphere with a custom centre.
    pub fn with_center(center: Point3, radius: f64) -> Self {
        Self {
            center,
            radius,
            ref_dir: Dir3::new_normalize(Vec3::x()),
            axis: Dir3::new_normalize(Vec3::z()),
        }
    }

    fn y_dir(&self) -> Vec3 {
        self.axis.as_ref().cross(self.ref_dir.as_ref())
    }
}

impl Shape for Sphere {
    fn normal_at(&self, p: &Point3) -> Dir3 {
        Dir3::try_new(p - self.center, 1e-300).unwrap_or(self.axis)
    }

    fn uv_at(&self, p: &Point3) -> Point2 {
        let axis = self.axis.as_ref();
        let ref_dir = self.ref_dir.as_ref();
        let to_point = (p - self.center) / self.radius;

        // v = latitude (angle from equator)
        let z = to_point.dot(axis);
        let v = z.clamp(-1.0, 1.0).asin();

        let proj = to_point - z * axis;
        if proj.norm() < 1e-12 {
            // At a pole - longitude is undefined, use 0
            return Point2::new(0.0, v);
        }
        let u = proj.dot(&self.y_dir()).atan2(proj.dot(ref_dir));
        Point2::new(wrap_angle(u), v)
    }

    fn evaluate(&self, uv: Point2) -> Option<Point3> {
        let (du, dv) = self.domain();
        if !in_range(uv.x, du) || !in_range(uv.y, dv) {
            return None;
        }
        let (sin_u, cos_u) = uv.x.sin_cos();
        let (sin_v, cos_v) = uv.y.sin_cos();
        Some(
            self.center
                + self.radius
                    * (cos_v * (cos_u * self.ref_dir.as_ref() + sin_u * self.y_dir())
                        + sin_v * self.axis.as_ref()),
        )
    }

    fn frame_at(&self, p: &Point3) -> SurfaceFrame {
        let normal = self.normal_at(p);
        // Eastward tangent; degenerates at the poles, where the fallback kicks in
        let east = self.axis.as_ref().cross(normal.as_ref());
        SurfaceFrame::from_normal_and_tangent(normal, &east)
    }

    fn domain(&self) -> ((f64, f64), (f64, f64)) {
        ((0.0, 2.0 * PI), (-PI / 2.0, PI / 2.0))
    }

    fn has_interior(&self) -> bool {
        true
    }

    fn contains(&self, p: &Point3) -> bool {
        (p - self.center).norm_squared() < self.radius * self.radius
    }

    fn shape_kind(&self) -> ShapeKind {
        ShapeKind::Sphere
    }

    fn clone_box(&self) -> Box<dyn Shape> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn transform(&self, t: &Transform) -> Box<dyn Shape> {
        match t.similarity_scale() {
            Some(scale) => Box::new(Sphere {
                center: t.apply_point(&self.center),
                radius: self.radius * scale,
                ref_dir: Dir3::new_normalize(t.apply_vec(self.ref_dir.as_ref())),
                axis: Dir3::new_normalize(t.apply_vec(self.axis.as_ref())),
            }),
            None => Box::new(TransformedShape::new(self.clone_box(), t.clone())),
        }
    }
}

// =============================================================================
// Plane
// =============================================================================

/// An infinite plane defined by an origin point and a coordinate frame.
///
/// Parameterization: `P(u, v) = origin + u * x_dir + v * y_dir`.
/// As a solid, the plane bounds the half-space on the side opposite its normal.
#[derive(Debug, Clone)]
pub struct Plane {
    /// Origin point on the plane.
    pub origin: Point3,
    /// Unit vector along the u direction.
    pub x_dir: Dir3,
    /// Unit vector along the v direction.
    pub y_dir: Dir3,
    /// Unit normal (x_dir × y_dir).
    pub normal_dir: Dir3,
}

impl Plane {
    /// Create a plane from origin and two direction vectors.
    /// The vectors do not need to be normalized; `y_dir` is made orthogonal to `x_dir`.
    pub fn new(origin: Point3, x_dir: Vec3, y_dir: Vec3) -> Self {
        let n = Dir3::new_normalize(x_dir.cross(&y_dir));
        let x = Dir3::new_normalize(x_dir);
        let y = Dir3::new_normalize(n.as_ref().cross(x.as_ref()));
        Self {
            origin,
            x_dir: x,
            y_dir: y,
            normal_dir: n,
        }
    }

    /// Create a plane from origin and normal. X/Y directions are chosen arbitrarily.
    pub fn from_normal(origin: Point3, normal: Vec3) -> Self {
        let n = Dir3::new_normalize(normal);
        let x = any_perpendicular(&n);
        let y = Dir3::new_normalize(n.as_ref().cross(x.as_ref()));
        Self {
            origin,
            x_dir: x,
            y_dir: y,
            normal_dir: n,
        }
    }

    /// XY plane at the origin, normal +Z.
    pub fn xy() -> Self {
        Self::new(Point3::origin(), Vec3::x(), Vec3::y())
    }

    /// Project a 3D point onto this plane's (u, v) parameter space.
    pub fn project(&self, p: &Point3) -> Point2 {
        let d = p - self.origin;
        Point2::new(d.dot(self.x_dir.as_ref()), d.dot(self.y_dir.as_ref()))
    }

    /// Signed distance from a point to this plane.
    pub fn signed_distance(&self, p: &Point3) -> f64 {
        (p - self.origin).dot(self.normal_dir.as_ref())
    }
}

impl Shape for Plane {
    fn normal_at(&self, _p: &Point3) -> Dir3 {
        self.normal_dir
    }

    fn uv_at(&self, p: &Point3) -> Point2 {
        self.project(p)
    }

    fn evaluate(&self, uv: Point2) -> Option<Point3> {
        Some(self.origin + uv.x * self.x_dir.as_ref() + uv.y * self.y_dir.as_ref())
    }

    fn frame_at(&self, _p: &Point3) -> SurfaceFrame {
        SurfaceFrame {
            du: self.x_dir,
            dv: self.y_dir,
            normal: self.normal_dir,
        }
    }

    fn domain(&self) -> ((f64, f64), (f64, f64)) {
        ((f64::NEG_INFINITY, f64::INFINITY), (f64::NEG_INFINITY, f64::INFINITY))
    }

    fn has_interior(&self) -> bool {
        true
    }

    fn contains(&self, p: &Point3) -> bool {
        self.signed_distance(p) < 0.0
    }

    fn shape_kind(&self) -> ShapeKind {
        ShapeKind::Plane
    }

    fn clone_box(&self) -> Box<dyn Shape> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn transform(&self, t: &Transform) -> Box<dyn Shape> {
        // Affine maps take planes to planes; keep the half-space side via the
        // inverse-transpose normal.
        let origin = t.apply_point(&self.origin);
        let x = t.apply_vec(self.x_dir.as_ref());
        let y = t.apply_vec(self.y_dir.as_ref());
        let mut plane = Plane::new(origin, x, y);
        let n = t.apply_normal(self.normal_dir.as_ref());
        if n.dot(plane.normal_dir.as_ref()) < 0.0 {
            // Orientation-reversing transform: flip so the interior is preserved
            plane = Plane::new(origin, x, -y);
        }
        Box::new(plane)
    }
}

// =============================================================================
// Disc
// =============================================================================

/// A flat circular disc.
///
/// Parameterization: `u = r / radius ∈ [0, 1]`, `v = φ ∈ [0, 2π)` measured
/// from `ref_dir` towards `normal × ref_dir`.
#[derive(Debug, Clone)]
pub struct Disc {
    /// Centre of the disc.
    pub center: Point3,
    /// Unit normal.
    pub normal: Dir3,
    /// Reference direction for φ = 0.
    pub ref_dir: Dir3,
    /// Radius of the disc.
    pub radius: f64,
}

impl Disc {
    /// Create a disc from centre, normal and radius.
    pub fn new(center: Point3, normal: Vec3, radius: f64) -> Self {
        let n = Dir3::new_normalize(normal);
        Self {
            center,
            ref_dir: any_perpendicular(&n),
            normal: n,
            radius,
        }
    }

    fn y_dir(&self) -> Vec3 {
        self.normal.as_ref().cross(self.ref_dir.as_ref())
    }

    /// Whether a point in the disc's plane lies within the rim.
    pub fn within_rim(&self, p: &Point3) -> bool {
        (p - self.center).norm() <= self.radius + ON_SURFACE_EPS
    }
}

impl Shape for Disc {
    fn normal_at(&self, _p: &Point3) -> Dir3 {
        self.normal
    }

    fn uv_at(&self, p: &Point3) -> Point2 {
        let d = p - self.center;
        let x = d.dot(self.ref_dir.as_ref());
        let y = d.dot(&self.y_dir());
        let r = (x * x + y * y).sqrt();
        let phi = if r < 1e-12 { 0.0 } else { wrap_angle(y.atan2(x)) };
        Point2::new(r / self.radius, phi)
    }

    fn evaluate(&self, uv: Point2) -> Option<Point3> {
        if !in_range(uv.x, (0.0, 1.0)) {
            return None;
        }
        let (sin_v, cos_v) = uv.y.sin_cos();
        Some(
            self.center
                + uv.x * self.radius * (cos_v * self.ref_dir.as_ref() + sin_v * self.y_dir()),
        )
    }

    fn frame_at(&self, _p: &Point3) -> SurfaceFrame {
        SurfaceFrame::from_normal_and_tangent(self.normal, self.ref_dir.as_ref())
    }

    fn domain(&self) -> ((f64, f64), (f64, f64)) {
        ((0.0, 1.0), (0.0, 2.0 * PI))
    }

    fn has_interior(&self) -> bool {
        false
    }

    fn contains(&self, _p: &Point3) -> bool {
        false
    }

    fn shape_kind(&self) -> ShapeKind {
        ShapeKind::Disc
    }

    fn clone_box(&self) -> Box<dyn Shape> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn transform(&self, t: &Transform) -> Box<dyn Shape> {
        match t.similarity_scale() {
            Some(scale) => Box::new(Disc {
                center: t.apply_point(&self.center),
                normal: Dir3::new_normalize(t.apply_normal(self.normal.as_ref())),
                ref_dir: Dir3::new_normalize(t.apply_vec(self.ref_dir.as_ref())),
                radius: self.radius * scale,
            }),
            None => Box::new(TransformedShape::new(self.clone_box(), t.clone())),
        }
    }
}

// =============================================================================
// Cylinder
// =============================================================================

/// A finite solid cylinder with flat end caps.
///
/// Mantle parameterization: `P(u, v) = start + radius * (cos(u) * x + sin(u) * y) + v * axis`
/// with `u ∈ [0, 2π)` and `v ∈ [0, length]`. Cap points share the
/// parametrisation of the rim, so only the mantle evaluates.
#[derive(Debug, Clone)]
pub struct Cylinder {
    /// Centre of the start cap.
    pub start: Point3,
    /// Unit direction from the start cap to the end cap.
    pub axis: Dir3,
    /// Reference direction for u=0 (perpendicular to axis).
    pub ref_dir: Dir3,
    /// Distance between the caps.
    pub length: f64,
    /// Radius of the mantle.
    pub radius: f64,
}

impl Cylinder {
    /// Create a cylinder between two cap centres.
    pub fn new(start: Point3, end: Point3, radius: f64) -> Self {
        let along = end - start;
        let axis = Dir3::new_normalize(along);
        Self {
            start,
            ref_dir: any_perpendicular(&axis),
            axis,
            length: along.norm(),
            radius,
        }
    }

    fn y_dir(&self) -> Vec3 {
        self.axis.as_ref().cross(self.ref_dir.as_ref())
    }

    /// Height along the axis and radial vector of a point.
    pub fn decompose(&self, p: &Point3) -> (f64, Vec3) {
        let d = p - self.start;
        let h = d.dot(self.axis.as_ref());
        (h, d - h * self.axis.as_ref())
    }
}

impl Shape for Cylinder {
    fn normal_at(&self, p: &Point3) -> Dir3 {
        let (h, radial) = self.decompose(p);
        let to_mantle = (radial.norm() - self.radius).abs();
        let to_start = h.abs();
        let to_end = (h - self.length).abs();
        if to_start < to_mantle && to_start <= to_end {
            -self.axis
        } else if to_end < to_mantle {
            self.axis
        } else {
            Dir3::try_new(radial, 1e-300).unwrap_or(self.ref_dir)
        }
    }

    fn uv_at(&self, p: &Point3) -> Point2 {
        let (h, radial) = self.decompose(p);
        let x = radial.dot(self.ref_dir.as_ref());
        let y = radial.dot(&self.y_dir());
        Point2::new(wrap_angle(y.atan2(x)), h)
    }

    fn evaluate(&self, uv: Point2) -> Option<Point3> {
        if !in_range(uv.y, (0.0, self.length)) {
            return None;
        }
        let (sin_u, cos_u) = uv.x.sin_cos();
        Some(
            self.start
                + self.radius * (cos_u * self.ref_dir.as_ref() + sin_u * self.y_dir())
                + uv.y * self.axis.as_ref(),
        )
    }

    fn frame_at(&self, p: &Point3) -> SurfaceFrame {
        let normal = self.normal_at(p);
        let around = self.axis.as_ref().cross(normal.as_ref());
        SurfaceFrame::from_normal_and_tangent(normal, &around)
    }

    fn domain(&self) -> ((f64, f64), (f64, f64)) {
        ((0.0, 2.0 * PI), (0.0, self.length))
    }

    fn has_interior(&self) -> bool {
        true
    }

    fn contains(&self, p: &Point3) -> bool {
        let (h, radial) = self.decompose(p);
        h > 0.0 && h < self.length && radial.norm_squared() < self.radius * self.radius
    }

    fn shape_kind(&self) -> ShapeKind {
        ShapeKind::Cylinder
    }

    fn clone_box(&self) -> Box<dyn Shape> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn transform(&self, t: &Transform) -> Box<dyn Shape> {
        match t.similarity_scale() {
            Some(scale) => Box::new(Cylinder {
                start: t.apply_point(&self.start),
                axis: Dir3::new_normalize(t.apply_vec(self.axis.as_ref())),
                ref_dir: Dir3::new_normalize(t.apply_vec(self.ref_dir.as_ref())),
                length: self.length * scale,
                radius: self.radius * scale,
            }),
            None => Box::new(TransformedShape::new(self.clone_box(), t.clone())),
        }
    }
}

// =============================================================================
// Parallelepiped
// =============================================================================

/// A solid parallelepiped `center + α·a + β·b + γ·c`, `α, β, γ ∈ [-½, ½]`.
///
/// A box is the special case of three orthogonal edges. There is no global
/// parametrisation; `uv_at` reports the in-face coordinates in `[0, 1]²`.
#[derive(Debug, Clone)]
pub struct Parallelepiped {
    /// Centre point.
    pub center: Point3,
    /// The three full-length edge vectors.
    pub edges: [Vec3; 3],
}

impl Parallelepiped {
    /// Create a parallelepiped from its centre and three edge vectors.
    pub fn new(center: Point3, a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self {
            center,
            edges: [a, b, c],
        }
    }

    /// Axis-aligned box centred at `center` with side lengths `size`.
    pub fn cuboid(center: Point3, size: Vec3) -> Self {
        Self::new(
            center,
            Vec3::new(size.x, 0.0, 0.0),
            Vec3::new(0.0, size.y, 0.0),
            Vec3::new(0.0, 0.0, size.z),
        )
    }

    /// Dual basis: row `i` is perpendicular to the two edges other than `i`
    /// and has unit dot product with edge `i`. `None` if the edges are coplanar.
    pub fn dual_basis(&self) -> Option<[Vec3; 3]> {
        let inv = Mat3::from_columns(&self.edges).try_inverse()?;
        Some([
            inv.row(0).transpose(),
            inv.row(1).transpose(),
            inv.row(2).transpose(),
        ])
    }

    /// Coordinates `(α, β, γ)` of a point, or `None` if degenerate.
    pub fn local_coordinates(&self, p: &Point3) -> Option<Vec3> {
        let dual = self.dual_basis()?;
        let d = p - self.center;
        Some(Vec3::new(dual[0].dot(&d), dual[1].dot(&d), dual[2].dot(&d)))
    }

    /// Index of the face-pair a surface point lies on and the sign of the face.
    fn face_of(&self, p: &Point3) -> Option<(usize, f64, Vec3)> {
        let coords = self.local_coordinates(p)?;
        let mut axis = 0;
        for i in 1..3 {
            if coords[i].abs() > coords[axis].abs() {
                axis = i;
            }
        }
        Some((axis, coords[axis].signum(), coords))
    }
}

impl Shape for Parallelepiped {
    fn normal_at(&self, p: &Point3) -> Dir3 {
        match (self.face_of(p), self.dual_basis()) {
            (Some((axis, sign, _)), Some(dual)) => {
                Dir3::try_new(sign * dual[axis], 1e-300).unwrap_or_else(|| Dir3::new_normalize(Vec3::z()))
            }
            _ => Dir3::new_normalize(Vec3::z()),
        }
    }

    fn uv_at(&self, p: &Point3) -> Point2 {
        match self.face_of(p) {
            Some((axis, _, coords)) => {
                let (i, j) = ((axis + 1) % 3, (axis + 2) % 3);
                Point2::new(coords[i] + 0.5, coords[j] + 0.5)
            }
            None => Point2::origin(),
        }
    }

    fn evaluate(&self, _uv: Point2) -> Option<Point3> {
        None
    }

    fn frame_at(&self, p: &Point3) -> SurfaceFrame {
        let normal = self.normal_at(p);
        let tangent = match self.face_of(p) {
            Some((axis, _, _)) => self.edges[(axis + 1) % 3],
            None => Vec3::x(),
        };
        SurfaceFrame::from_normal_and_tangent(normal, &tangent)
    }

    fn domain(&self) -> ((f64, f64), (f64, f64)) {
        ((0.0, 1.0), (0.0, 1.0))
    }

    fn is_parametrised(&self) -> bool {
        false
    }

    fn has_interior(&self) -> bool {
        true
    }

    fn contains(&self, p: &Point3) -> bool {
        self.local_coordinates(p)
            .map(|c| c.iter().all(|x| x.abs() < 0.5))
            .unwrap_or(false)
    }

    fn shape_kind(&self) -> ShapeKind {
        ShapeKind::Parallelepiped
    }

    fn clone_box(&self) -> Box<dyn Shape> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn transform(&self, t: &Transform) -> Box<dyn Shape> {
        Box::new(Parallelepiped {
            center: t.apply_point(&self.center),
            edges: [
                t.apply_vec(&self.edges[0]),
                t.apply_vec(&self.edges[1]),
                t.apply_vec(&self.edges[2]),
            ],
        })
    }
}

// =============================================================================
// Triangle
// =============================================================================

/// A flat triangle with barycentric parametrisation.
///
/// `P(u, v) = v0 + u * (v1 - v0) + v * (v2 - v0)`, valid for `u, v ≥ 0`, `u + v ≤ 1`.
#[derive(Debug, Clone)]
pub struct Triangle {
    /// The three corners, counter-clockwise seen from the normal side.
    pub vertices: [Point3; 3],
}

impl Triangle {
    /// Create a triangle from three corners.
    pub fn new(v0: Point3, v1: Point3, v2: Point3) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// The two edge vectors from `v0`.
    pub fn edges(&self) -> (Vec3, Vec3) {
        (
            self.vertices[1] - self.vertices[0],
            self.vertices[2] - self.vertices[0],
        )
    }
}

impl Shape for Triangle {
    fn normal_at(&self, _p: &Point3) -> Dir3 {
        let (e1, e2) = self.edges();
        Dir3::try_new(e1.cross(&e2), 1e-300).unwrap_or_else(|| Dir3::new_normalize(Vec3::z()))
    }

    fn uv_at(&self, p: &Point3) -> Point2 {
        let (e1, e2) = self.edges();
        let d = p - self.vertices[0];
        let d11 = e1.dot(&e1);
        let d12 = e1.dot(&e2);
        let d22 = e2.dot(&e2);
        let dp1 = d.dot(&e1);
        let dp2 = d.dot(&e2);
        let denom = d11 * d22 - d12 * d12;
        if denom.abs() < 1e-300 {
            return Point2::origin();
        }
        Point2::new(
            (d22 * dp1 - d12 * dp2) / denom,
            (d11 * dp2 - d12 * dp1) / denom,
        )
    }

    fn evaluate(&self, uv: Point2) -> Option<Point3> {
        if uv.x < -ON_SURFACE_EPS || uv.y < -ON_SURFACE_EPS || uv.x + uv.y > 1.0 + ON_SURFACE_EPS {
            return None;
        }
        let (e1, e2) = self.edges();
        Some(self.vertices[0] + uv.x * e1 + uv.y * e2)
    }

    fn frame_at(&self, p: &Point3) -> SurfaceFrame {
        let (e1, _) = self.edges();
        SurfaceFrame::from_normal_and_tangent(self.normal_at(p), &e1)
    }

    fn domain(&self) -> ((f64, f64), (f64, f64)) {
        ((0.0, 1.0), (0.0, 1.0))
    }

    fn has_interior(&self) -> bool {
        false
    }

    fn contains(&self, _p: &Point3) -> bool {
        false
    }

    fn shape_kind(&self) -> ShapeKind {
        ShapeKind::Triangle
    }

    fn clone_box(&self) -> Box<dyn Shape> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn transform(&self, t: &Transform) -> Box<dyn Shape> {
        let [v0, v1, v2] = self.vertices.map(|v| t.apply_point(&v));
        // A mirror reverses the winding; keep the normal on the mapped side
        let vertices = if t.linear_part().determinant() < 0.0 {
            [v0, v2, v1]
        } else {
            [v0, v1, v2]
        };
        Box::new(Triangle { vertices })
    }
}

// =============================================================================
// Transformed shape
// =============================================================================

/// A shape placed in the world by an arbitrary affine transform.
///
/// Used when a concrete shape cannot represent the transform natively
/// (e.g. a sphere under non-uniform scaling becomes an ellipsoid).
/// Normals map with the inverse transpose; parameters are those of the
/// local shape.
#[derive(Debug, Clone)]
pub struct TransformedShape {
    /// Shape in its own coordinate system.
    pub local: Box<dyn Shape>,
    /// Local-to-world transform.
    pub to_world: Transform,
    /// World-to-local transform, `None` if `to_world` is singular.
    pub to_local: Option<Transform>,
}

impl TransformedShape {
    /// Wrap `local` with the local-to-world transform `to_world`.
    pub fn new(local: Box<dyn Shape>, to_world: Transform) -> Self {
        let to_local = to_world.inverse();
        Self {
            local,
            to_world,
            to_local,
        }
    }

    /// Map a world point into local coordinates (identity if singular).
    pub fn local_point(&self, p: &Point3) -> Point3 {
        match &self.to_local {
            Some(inv) => inv.apply_point(p),
            None => *p,
        }
    }

    /// Map a local normal to a world normal.
    fn world_normal(&self, n: &Dir3) -> Dir3 {
        Dir3::try_new(self.to_world.apply_normal(n.as_ref()), 1e-300).unwrap_or(*n)
    }
}

impl Shape for TransformedShape {
    fn normal_at(&self, p: &Point3) -> Dir3 {
        self.world_normal(&self.local.normal_at(&self.local_point(p)))
    }

    fn uv_at(&self, p: &Point3) -> Point2 {
        self.local.uv_at(&self.local_point(p))
    }

    fn evaluate(&self, uv: Point2) -> Option<Point3> {
        self.local.evaluate(uv).map(|p| self.to_world.apply_point(&p))
    }

    fn frame_at(&self, p: &Point3) -> SurfaceFrame {
        let local = self.local.frame_at(&self.local_point(p));
        let normal = self.world_normal(&local.normal);
        SurfaceFrame::from_normal_and_tangent(normal, &self.to_world.apply_vec(local.du.as_ref()))
    }

    fn domain(&self) -> ((f64, f64), (f64, f64)) {
        self.local.domain()
    }

    fn is_parametrised(&self) -> bool {
        self.local.is_parametrised()
    }

    fn has_interior(&self) -> bool {
        self.local.has_interior()
    }

    fn contains(&self, p: &Point3) -> bool {
        self.to_local.is_some() && self.local.contains(&self.local_point(p))
    }

    fn shape_kind(&self) -> ShapeKind {
        ShapeKind::Transformed
    }

    fn clone_box(&self) -> Box<dyn Shape> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn transform(&self, t: &Transform) -> Box<dyn Shape> {
        Box::new(TransformedShape::new(
            self.local.clone_box(),
            self.to_world.then(t),
        ))
    }
}
