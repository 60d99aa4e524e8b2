use crate::batch::{ Batch, Mask };
use crate::consts::{ CHECKER_DARK, CHECKER_LIGHT, FARAWAY, FEQ_EPSILON };
use crate::matrix::Matrix3;
use crate::vector::{ Rgb, Vec3, Vec3x, Vector3 };

/// A sphere with a constant diffuse color.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f64,
    pub color: Rgb,
}

/// A sphere carrying a two-tone checkerboard instead of a constant color.
///
/// The tiles are keyed off the hit point's x/z coordinates, so a huge
/// checkered sphere makes a convincing ground plane.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CheckeredSphere {
    pub sphere: Sphere,
    pub scale: f64,
}

/// A triangle with a constant diffuse color.
///
/// Edge vectors and the face normal are derived from the vertices at
/// construction and kept alongside them.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Triangle {
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
    pub color: Rgb,

    e1: Vec3,
    e2: Vec3,
    normal: Vec3,
}

/// Anything a ray batch can hit.
///
/// Every variant answers intersection distances, occlusion, outward normals
/// and base colors for a whole batch of rays per call; callers never branch
/// on the variant themselves.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Shape {
    Sphere(Sphere),
    CheckeredSphere(CheckeredSphere),
    Triangle(Triangle),
}

fn rotate_point(point: Vec3, rotation: Matrix3, pivot: Vec3) -> Vec3 {
    rotation * (point - pivot) + pivot
}

impl Sphere {
    pub fn new(center: Vec3, radius: f64, color: Rgb) -> Sphere {
        Sphere { center, radius, color }
    }

    /// Nearest positive intersection distance per ray, FARAWAY for misses.
    ///
    /// Solves `|O + tD - C|^2 = r^2` for every lane at once. Tangent rays
    /// (discriminant of zero) count as hits with both roots equal.
    pub fn intersect(&self, origin: Vec3, directions: &Vec3x) -> Batch {
        let oc = origin - self.center;
        let a = directions.dot(directions);
        let b = directions.dot_scalar(oc) * 2.0;
        let c = oc.dot(&oc) - self.radius * self.radius;

        let discriminant = &b * &b - &a * (4.0 * c);
        let root = discriminant.max(0.0).sqrt();

        // Prefer the smaller root; fall back to the larger one when the
        // origin sits on or inside the surface
        let denom = a * 2.0;
        let near = (-&b - &root) / &denom;
        let far = (-&b + &root) / &denom;
        let t = near.gt_scalar(0.0).select(&near, &far);

        let hit = discriminant.ge_scalar(0.0) & t.gt_scalar(0.0);
        hit.select_or(&t, FARAWAY)
    }

    /// True per lane when the ray from `points` along `direction` strikes
    /// this sphere at any positive distance.
    pub fn occludes(&self, points: &Vec3x, direction: Vec3) -> Mask {
        let oc = points - self.center;
        let a = direction.dot(&direction);
        let b = oc.dot_scalar(direction) * 2.0;
        let c = oc.dot(&oc) - self.radius * self.radius;

        let discriminant = &b * &b - c * (4.0 * a);
        let root = discriminant.max(0.0).sqrt();

        let denom = 2.0 * a;
        let near = (-&b - &root) / denom;
        let far = (-&b + &root) / denom;
        let t = near.gt_scalar(0.0).select(&near, &far);

        discriminant.ge_scalar(0.0) & t.gt_scalar(0.0)
    }

    pub fn normal_at(&self, hits: &Vec3x) -> Vec3x {
        (hits - self.center) / self.radius
    }

    pub fn surface_color(&self, hits: &Vec3x) -> Vec3x {
        Vec3x::splat(self.color, hits.len())
    }

    fn rotated(&self, rotation: Matrix3, pivot: Vec3) -> Sphere {
        Sphere { center: rotate_point(self.center, rotation, pivot), ..*self }
    }
}

impl CheckeredSphere {
    pub fn new(center: Vec3, radius: f64, color: Rgb, scale: f64) -> CheckeredSphere {
        CheckeredSphere { sphere: Sphere::new(center, radius, color), scale }
    }

    pub fn intersect(&self, origin: Vec3, directions: &Vec3x) -> Batch {
        self.sphere.intersect(origin, directions)
    }

    pub fn occludes(&self, points: &Vec3x, direction: Vec3) -> Mask {
        self.sphere.occludes(points, direction)
    }

    pub fn normal_at(&self, hits: &Vec3x) -> Vec3x {
        self.sphere.normal_at(hits)
    }

    /// Two tones of the stored color, alternating over a grid of `scale`
    /// sized tiles in x and z.
    pub fn surface_color(&self, hits: &Vec3x) -> Vec3x {
        let cells = (&hits.x / self.scale).floor() + (&hits.z / self.scale).floor();
        let even = cells.rem_euclid(2.0).lt_scalar(0.5);

        let light = Vec3x::splat(self.sphere.color * CHECKER_LIGHT, hits.len());
        let dark = Vec3x::splat(self.sphere.color * CHECKER_DARK, hits.len());
        Vector3::select(&even, &light, &dark)
    }

    fn rotated(&self, rotation: Matrix3, pivot: Vec3) -> CheckeredSphere {
        CheckeredSphere { sphere: self.sphere.rotated(rotation, pivot), ..*self }
    }
}

impl Triangle {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, color: Rgb) -> Triangle {
        let e1 = v1 - v0;
        let e2 = v2 - v0;
        let normal = e1.cross(&e2).norm();

        Triangle { v0, v1, v2, color, e1, e2, normal }
    }

    /// Möller-Trumbore over the whole batch, both faces. Lanes running
    /// nearly parallel to the triangle's plane miss, as do hits on or
    /// outside the edges.
    pub fn intersect(&self, origin: Vec3, directions: &Vec3x) -> Batch {
        let dir_cross_e2 = directions.cross_scalar(self.e2);
        let determinant = dir_cross_e2.dot_scalar(self.e1);
        let f = 1.0 / &determinant;

        let v0_to_origin = origin - self.v0;
        let u = dir_cross_e2.dot_scalar(v0_to_origin) * &f;

        let origin_cross_e1 = v0_to_origin.cross(&self.e1);
        let v = directions.dot_scalar(origin_cross_e1) * &f;
        let t = self.e2.dot(&origin_cross_e1) * f;

        // Parallel lanes carry junk from the division by ~0; the
        // determinant term filters them before anything is kept
        let inside = determinant.abs().ge_scalar(FEQ_EPSILON)
            & u.gt_scalar(0.0)
            & v.gt_scalar(0.0)
            & (&u + &v).lt_scalar(1.0)
            & t.gt_scalar(0.0);
        inside.select_or(&t, FARAWAY)
    }

    /// True per lane when the ray from `points` along `direction` passes
    /// strictly inside this triangle at a positive distance.
    pub fn occludes(&self, points: &Vec3x, direction: Vec3) -> Mask {
        // One shared direction: the plane test collapses to a scalar
        let dir_cross_e2 = direction.cross(&self.e2);
        let determinant = self.e1.dot(&dir_cross_e2);
        if determinant.abs() < FEQ_EPSILON {
            return Mask::splat(false, points.len());
        }
        let f = 1.0 / determinant;

        let v0_to_origin = points - self.v0;
        let u = v0_to_origin.dot_scalar(dir_cross_e2) * f;

        let origin_cross_e1 = v0_to_origin.cross_scalar(self.e1);
        let v = origin_cross_e1.dot_scalar(direction) * f;
        let t = origin_cross_e1.dot_scalar(self.e2) * f;

        u.gt_scalar(0.0)
            & v.gt_scalar(0.0)
            & (&u + &v).lt_scalar(1.0)
            & t.gt_scalar(0.0)
    }

    /// The face normal, constant across every hit on this triangle.
    pub fn normal_at(&self, hits: &Vec3x) -> Vec3x {
        Vec3x::splat(self.normal, hits.len())
    }

    pub fn surface_color(&self, hits: &Vec3x) -> Vec3x {
        Vec3x::splat(self.color, hits.len())
    }

    fn rotated(&self, rotation: Matrix3, pivot: Vec3) -> Triangle {
        Triangle::new(
            rotate_point(self.v0, rotation, pivot),
            rotate_point(self.v1, rotation, pivot),
            rotate_point(self.v2, rotation, pivot),
            self.color,
        )
    }
}

impl Shape {
    pub fn sphere(center: Vec3, radius: f64, color: Rgb) -> Shape {
        Shape::Sphere(Sphere::new(center, radius, color))
    }

    pub fn checkered_sphere(center: Vec3, radius: f64, color: Rgb, scale: f64) -> Shape {
        Shape::CheckeredSphere(CheckeredSphere::new(center, radius, color, scale))
    }

    pub fn triangle(v0: Vec3, v1: Vec3, v2: Vec3, color: Rgb) -> Shape {
        Shape::Triangle(Triangle::new(v0, v1, v2, color))
    }

    pub fn intersect(&self, origin: Vec3, directions: &Vec3x) -> Batch {
        match self {
            Shape::Sphere(s) => s.intersect(origin, directions),
            Shape::CheckeredSphere(s) => s.intersect(origin, directions),
            Shape::Triangle(t) => t.intersect(origin, directions),
        }
    }

    pub fn occludes(&self, points: &Vec3x, direction: Vec3) -> Mask {
        match self {
            Shape::Sphere(s) => s.occludes(points, direction),
            Shape::CheckeredSphere(s) => s.occludes(points, direction),
            Shape::Triangle(t) => t.occludes(points, direction),
        }
    }

    pub fn normal_at(&self, hits: &Vec3x) -> Vec3x {
        match self {
            Shape::Sphere(s) => s.normal_at(hits),
            Shape::CheckeredSphere(s) => s.normal_at(hits),
            Shape::Triangle(t) => t.normal_at(hits),
        }
    }

    pub fn surface_color(&self, hits: &Vec3x) -> Vec3x {
        match self {
            Shape::Sphere(s) => s.surface_color(hits),
            Shape::CheckeredSphere(s) => s.surface_color(hits),
            Shape::Triangle(t) => t.surface_color(hits),
        }
    }

    /// A copy of this shape rigidly rotated about `pivot`. Only positions
    /// move; radius, colors and checker scale are untouched.
    pub fn rotated(&self, rotation: Matrix3, pivot: Vec3) -> Shape {
        match self {
            Shape::Sphere(s) => Shape::Sphere(s.rotated(rotation, pivot)),
            Shape::CheckeredSphere(s) => Shape::CheckeredSphere(s.rotated(rotation, pivot)),
            Shape::Triangle(t) => Shape::Triangle(t.rotated(rotation, pivot)),
        }
    }

    /// The shape's positional anchor: a sphere's center, a triangle's
    /// vertex centroid. Scenes average these to find a rotation pivot.
    pub fn anchor(&self) -> Vec3 {
        match self {
            Shape::Sphere(s) => s.center,
            Shape::CheckeredSphere(s) => s.sphere.center,
            Shape::Triangle(t) => (t.v0 + t.v1 + t.v2) / 3.0,
        }
    }
}

/* Tests */

#[cfg(test)]
fn single_ray(direction: Vec3) -> Vec3x {
    Vec3x::splat(direction, 1)
}

#[test]
fn sphere_head_on_distance() {
    let s = Sphere::new(Vec3::new(0.0, 0.0, 5.0), 1.0, Rgb::white());
    let t = s.intersect(Vec3::zero(), &single_ray(Vec3::new(0.0, 0.0, 1.0)));

    // |origin - center| - radius
    assert!(crate::feq(t[0], 4.0));
}

#[test]
fn sphere_miss_is_faraway() {
    let s = Sphere::new(Vec3::new(0.0, 0.0, 5.0), 1.0, Rgb::white());
    let t = s.intersect(Vec3::zero(), &single_ray(Vec3::new(0.0, 1.0, 0.0)));

    assert!(t[0].is_infinite());
}

#[test]
fn sphere_tangent_counts_as_hit() {
    let s = Sphere::new(Vec3::zero(), 1.0, Rgb::white());
    let t = s.intersect(Vec3::new(0.0, 1.0, -5.0), &single_ray(Vec3::new(0.0, 0.0, 1.0)));

    assert!(crate::feq(t[0], 5.0));
}

#[test]
fn sphere_from_inside_takes_far_root() {
    let s = Sphere::new(Vec3::zero(), 1.0, Rgb::white());
    let t = s.intersect(Vec3::zero(), &single_ray(Vec3::new(0.0, 0.0, 1.0)));

    assert!(crate::feq(t[0], 1.0));
}

#[test]
fn sphere_behind_ray_misses() {
    let s = Sphere::new(Vec3::zero(), 1.0, Rgb::white());
    let t = s.intersect(Vec3::new(0.0, 0.0, 5.0), &single_ray(Vec3::new(0.0, 0.0, 1.0)));

    assert!(t[0].is_infinite());
}

#[test]
fn sphere_handles_non_unit_directions() {
    let s = Sphere::new(Vec3::zero(), 1.0, Rgb::white());
    let t = s.intersect(Vec3::new(0.0, 0.0, -5.0), &single_ray(Vec3::new(0.0, 0.0, 2.0)));

    // Twice the speed, half the distance
    assert!(crate::feq(t[0], 2.0));
}

#[test]
fn sphere_normals_point_outward() {
    let s = Sphere::new(Vec3::new(0.0, 1.0, 0.0), 2.0, Rgb::white());
    let hits = single_ray(Vec3::new(0.0, 3.0, 0.0));

    assert_eq!(s.normal_at(&hits).lane(0), Vec3::new(0.0, 1.0, 0.0));
}

#[test]
fn triangle_head_on_distance() {
    let t = Triangle::new(
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(-1.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Rgb::white(),
    );
    let d = t.intersect(Vec3::new(0.0, 0.5, -2.0), &single_ray(Vec3::new(0.0, 0.0, 1.0)));

    assert!(crate::feq(d[0], 2.0));
}

#[test]
fn triangle_hits_from_both_sides() {
    let t = Triangle::new(
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(-1.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Rgb::white(),
    );
    let d = t.intersect(Vec3::new(0.0, 0.5, 2.0), &single_ray(Vec3::new(0.0, 0.0, -1.0)));

    assert!(crate::feq(d[0], 2.0));
}

#[test]
fn triangle_outside_edges_misses() {
    let t = Triangle::new(
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(-1.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Rgb::white(),
    );
    let d = t.intersect(Vec3::new(1.0, 1.0, -2.0), &single_ray(Vec3::new(0.0, 0.0, 1.0)));

    assert!(d[0].is_infinite());
}

#[test]
fn triangle_vertex_graze_misses() {
    // Boundary hits are rejected: only strictly interior points count
    let t = Triangle::new(
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(-1.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Rgb::white(),
    );
    let d = t.intersect(Vec3::new(0.0, 1.0, -2.0), &single_ray(Vec3::new(0.0, 0.0, 1.0)));

    assert!(d[0].is_infinite());
}

#[test]
fn triangle_parallel_ray_misses() {
    let t = Triangle::new(
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(-1.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Rgb::white(),
    );
    let d = t.intersect(Vec3::new(0.0, 0.5, -1.0), &single_ray(Vec3::new(1.0, 0.0, 0.0)));

    assert!(d[0].is_infinite());
}

#[test]
fn triangle_normal_is_constant() {
    let t = Triangle::new(
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(-1.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Rgb::white(),
    );
    let hits = Vec3x::splat(Vec3::new(0.2, 0.3, 0.0), 3);

    let normals = t.normal_at(&hits);
    assert_eq!(normals.lane(0), Vec3::new(0.0, 0.0, 1.0));
    assert_eq!(normals.lane(1), normals.lane(0));
    assert_eq!(normals.lane(2), normals.lane(0));
}

#[test]
fn checker_tone_flips_across_one_scale() {
    let floor = CheckeredSphere::new(
        Vec3::new(0.0, -99999.5, 0.0), 99999.0, Rgb::new(0.9, 0.9, 0.9), 0.25,
    );
    let hits = Vector3::new(
        Batch::from_vec(vec![0.1, 0.35, 0.6]),
        Batch::from_vec(vec![-0.5, -0.5, -0.5]),
        Batch::from_vec(vec![0.1, 0.1, 0.1]),
    );

    let tones = floor.surface_color(&hits);

    // One scale along x flips the tone, two scales restore it
    assert_ne!(tones.lane(0), tones.lane(1));
    assert_eq!(tones.lane(0), tones.lane(2));
}

#[test]
fn checker_tones_scale_stored_color() {
    let floor = CheckeredSphere::new(Vec3::zero(), 1.0, Rgb::new(0.9, 0.9, 0.9), 0.25);
    let hits = single_ray(Vec3::new(0.05, 1.0, 0.05));

    let tone = floor.surface_color(&hits).lane(0);
    assert_eq!(tone, Rgb::new(0.9, 0.9, 0.9) * crate::consts::CHECKER_LIGHT);
}

#[test]
fn checkered_sphere_intersects_like_a_sphere() {
    let plain = Sphere::new(Vec3::new(0.0, 0.0, 5.0), 1.0, Rgb::white());
    let checkered = CheckeredSphere::new(Vec3::new(0.0, 0.0, 5.0), 1.0, Rgb::white(), 0.25);
    let dirs = single_ray(Vec3::new(0.0, 0.0, 1.0));

    assert_eq!(
        plain.intersect(Vec3::zero(), &dirs),
        checkered.intersect(Vec3::zero(), &dirs),
    );
}

#[test]
fn occlusion_agrees_with_intersection() {
    let shape = Shape::sphere(Vec3::new(0.0, 0.0, 5.0), 1.0, Rgb::white());
    let points = Vec3x::splat(Vec3::zero(), 2);

    assert_eq!(
        shape.occludes(&points, Vec3::new(0.0, 0.0, 1.0)),
        Mask::splat(true, 2),
    );
    assert_eq!(
        shape.occludes(&points, Vec3::new(0.0, 1.0, 0.0)),
        Mask::splat(false, 2),
    );
}

#[test]
fn triangle_occludes_interior_rays() {
    let shape = Shape::triangle(
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(-1.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Rgb::white(),
    );
    let points = Vector3::new(
        Batch::from_vec(vec![0.0, 5.0]),
        Batch::from_vec(vec![0.5, 0.5]),
        Batch::from_vec(vec![-2.0, -2.0]),
    );

    assert_eq!(
        shape.occludes(&points, Vec3::new(0.0, 0.0, 1.0)),
        Mask::from_vec(vec![true, false]),
    );
}

#[test]
fn rotation_moves_center_and_nothing_else() {
    let shape = Shape::sphere(Vec3::new(1.0, 0.0, 0.0), 0.5, Rgb::red());
    let turned = shape.rotated(Matrix3::rotation_y(std::f64::consts::FRAC_PI_2), Vec3::zero());

    match turned {
        Shape::Sphere(s) => {
            assert_eq!(s.center, Vec3::new(0.0, 0.0, -1.0));
            assert_eq!(s.radius, 0.5);
            assert_eq!(s.color, Rgb::red());
        }
        _ => panic!("rotation changed the shape kind"),
    }
}

#[test]
fn rotation_rebuilds_triangle_normal() {
    let shape = Shape::triangle(
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(-1.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Rgb::white(),
    );
    let turned = shape.rotated(Matrix3::rotation_x(std::f64::consts::FRAC_PI_2), Vec3::zero());

    let normals = turned.normal_at(&single_ray(Vec3::zero()));
    assert_eq!(normals.lane(0), Vec3::new(0.0, -1.0, 0.0));
}

#[test]
fn anchors_track_positions() {
    let sphere = Shape::sphere(Vec3::new(1.0, 2.0, 3.0), 1.0, Rgb::white());
    let triangle = Shape::triangle(
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(3.0, 0.0, 0.0),
        Vec3::new(0.0, 3.0, 0.0),
        Rgb::white(),
    );

    assert_eq!(sphere.anchor(), Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(triangle.anchor(), Vec3::new(1.0, 1.0, 0.0));
}
