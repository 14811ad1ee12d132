use glam::Vec3;

/// Determinant threshold below which a ray counts as parallel to a triangle.
const PARALLEL_EPSILON: f32 = 1e-7;

/// A half-line used for terrain picking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Point at distance parameter `t` along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Möller-Trumbore ray/triangle intersection.
///
/// Returns the ray parameter of the hit, only if it is strictly positive.
/// Both windings are accepted.
pub fn ray_triangle(ray: &Ray, triangle: [Vec3; 3]) -> Option<f32> {
    let [v0, v1, v2] = triangle;
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);
    if a.abs() < PARALLEL_EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    if t > PARALLEL_EPSILON {
        Some(t)
    } else {
        None
    }
}

/// Linear interpolation in the `a + t * (b - a)` form, exact when `a == b`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

/// Bilinear interpolation over a unit cell.
///
/// `h00` is at (0, 0), `h10` at (1, 0), `h01` at (0, 1), `h11` at (1, 1);
/// `fx` and `fz` are the fractional position inside the cell.
pub fn bilinear(h00: f32, h10: f32, h01: f32, h11: f32, fx: f32, fz: f32) -> f32 {
    let near = lerp(h00, h10, fx);
    let far = lerp(h01, h11, fx);
    lerp(near, far, fz)
}
