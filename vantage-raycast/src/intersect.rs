//! Ray-triangle intersection routines.
//!
//! Two variants back the engine's query surface. The standard test is the
//! classic single-precision Möller-Trumbore algorithm. The precise test is a
//! watertight algorithm in the style of Woop, Benthin and Wald: the ray is
//! sheared into a frame whose Z axis is the dominant component of the ray
//! direction, and signed edge products decide coverage in double precision.
//! Rays crossing a shared triangle edge are counted exactly once.

// Standard notation for the Möller-Trumbore algorithm
#![allow(clippy::many_single_char_names, clippy::similar_names)]

use nalgebra::{Point3, Vector3};

/// Hits closer than this along the ray are rejected as self-intersections.
pub(crate) const MIN_T: f32 = 1e-7;

/// Möller-Trumbore ray-triangle intersection in single precision.
///
/// Returns the parametric distance `t` of the hit in `[MIN_T, t_max]`, in
/// units of the (possibly non-unit) direction vector.
pub(crate) fn moller_trumbore(
    origin: &Point3<f32>,
    direction: &Vector3<f32>,
    v0: &Point3<f32>,
    v1: &Point3<f32>,
    v2: &Point3<f32>,
    t_max: f32,
) -> Option<f32> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = direction.cross(&edge2);
    let a = edge1.dot(&h);

    if a.abs() < MIN_T {
        return None; // Ray parallel to triangle
    }

    let f = 1.0 / a;
    let s = origin - v0;
    let u = f * s.dot(&h);

    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = f * direction.dot(&q);

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(&q);
    if t < MIN_T || t > t_max {
        return None;
    }

    Some(t)
}

/// Per-ray state for the watertight intersection test.
///
/// The dominant axis and shear coefficients depend only on the ray, so they
/// are computed once per ray and reused across every candidate triangle the
/// traversal produces. State lives on the querying thread's stack; nothing
/// is shared or memoized across rays.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WatertightRay {
    origin: [f64; 3],
    kx: usize,
    ky: usize,
    kz: usize,
    sx: f64,
    sy: f64,
    sz: f64,
}

impl WatertightRay {
    /// Precompute the shear transform for a ray.
    ///
    /// Returns `None` for a zero direction, which cannot hit anything.
    pub(crate) fn new(origin: &Point3<f32>, direction: &Vector3<f32>) -> Option<Self> {
        let d = [
            f64::from(direction.x),
            f64::from(direction.y),
            f64::from(direction.z),
        ];

        // Dominant axis of the direction becomes the shear Z axis
        let mut kz = 0;
        for axis in 1..3 {
            if d[axis].abs() > d[kz].abs() {
                kz = axis;
            }
        }
        if d[kz] == 0.0 {
            return None;
        }

        // Swap kx/ky to preserve winding when the dominant axis is negative
        let (kx, ky) = if d[kz] < 0.0 {
            ((kz + 2) % 3, (kz + 1) % 3)
        } else {
            ((kz + 1) % 3, (kz + 2) % 3)
        };

        let sz = 1.0 / d[kz];
        Some(Self {
            origin: [f64::from(origin.x), f64::from(origin.y), f64::from(origin.z)],
            kx,
            ky,
            kz,
            sx: d[kx] * sz,
            sy: d[ky] * sz,
            sz,
        })
    }

    /// Watertight ray-triangle test in double precision.
    ///
    /// Returns the parametric distance `t` of the hit in `(0, t_max]`.
    pub(crate) fn intersect(
        &self,
        v0: &Point3<f32>,
        v1: &Point3<f32>,
        v2: &Point3<f32>,
        t_max: f32,
    ) -> Option<f64> {
        let a = self.translate(v0);
        let b = self.translate(v1);
        let c = self.translate(v2);

        // Shear the triangle into the ray-aligned frame
        let ax = self.sx.mul_add(-a[self.kz], a[self.kx]);
        let ay = self.sy.mul_add(-a[self.kz], a[self.ky]);
        let bx = self.sx.mul_add(-b[self.kz], b[self.kx]);
        let by = self.sy.mul_add(-b[self.kz], b[self.ky]);
        let cx = self.sx.mul_add(-c[self.kz], c[self.kx]);
        let cy = self.sy.mul_add(-c[self.kz], c[self.ky]);

        // Signed edge products; a hit requires all three to share a sign.
        // A zero product means the ray pierces the edge itself: the fill
        // rule below assigns such hits to exactly one of the two triangles
        // sharing the edge, keyed off the edge's sheared 2-D direction.
        let u = cx.mul_add(by, -(cy * bx));
        let v = ax.mul_add(cy, -(ay * cx));
        let w = bx.mul_add(ay, -(by * ax));

        let front = covers(u, bx - cx, by - cy)
            && covers(v, cx - ax, cy - ay)
            && covers(w, ax - bx, ay - by);
        let back = covers(-u, cx - bx, cy - by)
            && covers(-v, ax - cx, ay - cy)
            && covers(-w, bx - ax, by - ay);
        if !front && !back {
            return None;
        }

        let det = u + v + w;
        if det == 0.0 {
            return None;
        }

        let az = self.sz * a[self.kz];
        let bz = self.sz * b[self.kz];
        let cz = self.sz * c[self.kz];
        let t = (u * az + v * bz + w * cz) / det;

        if t <= 0.0 || t > f64::from(t_max) {
            return None;
        }

        Some(t)
    }

    fn translate(&self, v: &Point3<f32>) -> [f64; 3] {
        [
            f64::from(v.x) - self.origin[0],
            f64::from(v.y) - self.origin[1],
            f64::from(v.z) - self.origin[2],
        ]
    }
}

/// Edge coverage with a top-left fill rule.
///
/// A strictly positive edge product covers unconditionally. A zero product
/// (ray exactly on the edge) covers only for edges pointing "up" in the
/// sheared frame, or leftwards when horizontal. Triangles sharing an edge
/// traverse it in opposite directions, so exactly one of them claims it.
fn covers(value: f64, edge_x: f64, edge_y: f64) -> bool {
    if value != 0.0 {
        return value > 0.0;
    }
    edge_y > 0.0 || (edge_y == 0.0 && edge_x < 0.0)
}
