use log::debug;

use crate::batch::{ Batch, Mask };
use crate::consts::{ FARAWAY, SHADOW_BIAS };
use crate::light::lighting;
use crate::scene::Scene;
use crate::vector::{ Vec3, Vec3x };

/// Winner index of a ray that hit nothing.
const NO_HIT: u32 = u32::MAX;

/// Traces one batch of rays through the scene and returns their colors,
/// clamped to [0, 1] per channel.
///
/// Every shape is intersected against the whole batch at once; per ray,
/// the shape with the strictly smallest positive distance wins (earlier
/// shapes keep ties). Winning lanes are shaded with the scene's light,
/// in shadow wherever any shape occludes the path toward it. Lanes that
/// hit nothing keep the scene's background color untouched.
pub fn raytrace(origin: Vec3, directions: &Vec3x, scene: &Scene) -> Vec3x {
    let n = directions.len();
    debug!("tracing {} rays against {} shapes", n, scene.shapes.len());

    let (nearest, winner) = nearest_hits(origin, directions, scene);

    let mut colors = Vec3x::splat(scene.background, n);
    for (index, shape) in scene.shapes.iter().enumerate() {
        let won: Mask = winner.iter().map(|w| *w == index as u32).collect();
        if !won.any() {
            continue;
        }

        // Shade only this shape's lanes, then scatter them back in place
        let distances = nearest.gather(&won);
        let dirs = directions.gather(&won);

        let hits = origin + &dirs * &distances;
        let normals = shape.normal_at(&hits);
        let base = shape.surface_color(&hits);
        let eyev = (origin - &hits).norm();

        let lit = !shadowed(scene, &hits, &normals);
        let shaded = lighting(&base, &scene.light, &normals, &eyev, &lit);
        shaded.scatter_into(&won, &mut colors);
    }

    colors.clamp(0.0, 1.0)
}

/// Composites intersection distances across all shapes: the smallest
/// positive distance per ray, with the owning shape's index alongside it.
fn nearest_hits(origin: Vec3, directions: &Vec3x, scene: &Scene) -> (Batch, Vec<u32>) {
    let mut nearest = Batch::splat(FARAWAY, directions.len());
    let mut winner = vec![NO_HIT; directions.len()];

    for (index, shape) in scene.shapes.iter().enumerate() {
        let distances = shape.intersect(origin, directions);
        let closer = distances.lt(&nearest);

        nearest = closer.select(&distances, &nearest);
        for (lane, flag) in winner.iter_mut().zip(closer.iter()) {
            if flag {
                *lane = index as u32;
            }
        }
    }

    (nearest, winner)
}

/// Shadow test for a batch of surface points. Each point steps off its
/// surface along the normal, then casts toward the light; any shape in the
/// way at a positive distance blocks it (the light sits at infinity).
fn shadowed(scene: &Scene, hits: &Vec3x, normals: &Vec3x) -> Mask {
    let nudged = hits + &(normals * SHADOW_BIAS);

    let mut occluded = Mask::splat(false, hits.len());
    for shape in scene.shapes.iter() {
        occluded = occluded | shape.occludes(&nudged, scene.light.direction);
    }

    occluded
}

/* Tests */

#[cfg(test)]
use crate::light::DirectionalLight;
#[cfg(test)]
use crate::shape::Shape;
#[cfg(test)]
use crate::vector::{ Rgb, Vector3 };

#[cfg(test)]
fn lit_scene(shapes: Vec<Shape>, background: Rgb) -> Scene {
    // Light shining straight back at the camera side of every surface
    let light = DirectionalLight::new(Vec3::new(0.0, 0.0, -1.0), Rgb::white());
    Scene::new(shapes, light, background)
}

#[test]
fn misses_keep_exact_background() {
    let scene = lit_scene(
        vec![Shape::sphere(Vec3::new(0.0, 0.0, 5.0), 1.0, Rgb::red())],
        Rgb::new(0.125, 0.25, 0.375),
    );
    let up = Vec3x::splat(Vec3::new(0.0, 1.0, 0.0), 3);

    let colors = raytrace(Vec3::zero(), &up, &scene);

    assert_eq!(colors.len(), 3);
    assert_eq!(colors.x.as_slice(), &[0.125, 0.125, 0.125]);
    assert_eq!(colors.y.as_slice(), &[0.25, 0.25, 0.25]);
    assert_eq!(colors.z.as_slice(), &[0.375, 0.375, 0.375]);
}

#[test]
fn empty_scene_traces_background() {
    let scene = lit_scene(Vec::new(), Rgb::new(0.5, 0.0, 0.5));
    let dirs = Vec3x::splat(Vec3::new(0.0, 0.0, 1.0), 2);

    let colors = raytrace(Vec3::zero(), &dirs, &scene);

    assert_eq!(colors.x.as_slice(), &[0.5, 0.5]);
    assert_eq!(colors.y.as_slice(), &[0.0, 0.0]);
}

#[test]
fn lit_hit_outshines_ambient() {
    // Head-on hit, light directly behind the eye: full diffuse and a full
    // highlight, clamped per channel
    let scene = lit_scene(
        vec![Shape::sphere(Vec3::new(0.0, 0.0, 5.0), 1.0, Rgb::red())],
        Rgb::zero(),
    );
    let dirs = Vec3x::splat(Vec3::new(0.0, 0.0, 1.0), 1);

    let colors = raytrace(Vec3::zero(), &dirs, &scene);

    assert_eq!(colors.lane(0), Rgb::new(1.0, 0.5, 0.5));
}

#[test]
fn shadowed_hit_gets_ambient_only() {
    // Light overhead; a wide triangle hangs above the eye, off the primary
    // path but square across the shadow path
    let light = DirectionalLight::new(Vec3::new(0.0, 1.0, 0.0), Rgb::white());
    let scene = Scene::new(
        vec![
            Shape::sphere(Vec3::zero(), 1.0, Rgb::red()),
            Shape::triangle(
                Vec3::new(-5.0, 5.0, -5.0),
                Vec3::new(5.0, 5.0, -5.0),
                Vec3::new(0.0, 5.0, 5.0),
                Rgb::white(),
            ),
        ],
        light,
        Rgb::zero(),
    );
    let down = Vec3x::splat(Vec3::new(0.0, -1.0, 0.0), 1);

    let colors = raytrace(Vec3::new(0.0, 3.0, 0.0), &down, &scene);

    assert_eq!(colors.x.as_slice(), &[0.05]);
    assert_eq!(colors.y.as_slice(), &[0.0]);
    assert_eq!(colors.z.as_slice(), &[0.0]);
}

#[test]
fn unshadowed_twin_confirms_suppression() {
    let light = DirectionalLight::new(Vec3::new(0.0, 1.0, 0.0), Rgb::white());
    let scene = Scene::new(
        vec![Shape::sphere(Vec3::zero(), 1.0, Rgb::red())],
        light,
        Rgb::zero(),
    );
    let down = Vec3x::splat(Vec3::new(0.0, -1.0, 0.0), 1);

    let colors = raytrace(Vec3::new(0.0, 3.0, 0.0), &down, &scene);

    // Same geometry as the shadowed case, minus the occluder
    assert!(colors.lane(0).x > 0.05);
}

#[test]
fn nearer_sphere_wins() {
    let near = Shape::sphere(Vec3::new(0.0, 0.0, 5.0), 1.0, Rgb::red());
    let far = Shape::sphere(Vec3::new(0.0, 0.0, 10.0), 1.0, Rgb::blue());
    let dirs = Vec3x::splat(Vec3::new(0.0, 0.0, 1.0), 1);

    let both = raytrace(Vec3::zero(), &dirs, &lit_scene(vec![near, far], Rgb::zero()));
    let near_only = raytrace(Vec3::zero(), &dirs, &lit_scene(vec![near], Rgb::zero()));

    assert_eq!(both.lane(0), near_only.lane(0));
    assert!(both.lane(0).x > both.lane(0).z);
}

#[test]
fn tie_goes_to_first_shape() {
    // Identical geometry, different colors: the update rule is strict, so
    // the second sphere never replaces the first
    let first = Shape::sphere(Vec3::new(0.0, 0.0, 5.0), 1.0, Rgb::red());
    let second = Shape::sphere(Vec3::new(0.0, 0.0, 5.0), 1.0, Rgb::blue());
    let dirs = Vec3x::splat(Vec3::new(0.0, 0.0, 1.0), 1);

    let colors = raytrace(Vec3::zero(), &dirs, &lit_scene(vec![first, second], Rgb::zero()));
    let red_only = raytrace(Vec3::zero(), &dirs, &lit_scene(vec![first], Rgb::zero()));

    assert_eq!(colors.lane(0), red_only.lane(0));
}

#[test]
fn lanes_shade_against_their_own_winners() {
    let scene = lit_scene(
        vec![
            Shape::sphere(Vec3::new(-2.0, 0.0, 5.0), 1.0, Rgb::red()),
            Shape::sphere(Vec3::new(2.0, 0.0, 5.0), 1.0, Rgb::blue()),
        ],
        Rgb::new(0.125, 0.125, 0.125),
    );
    let dirs = Vector3::new(
        Batch::from_vec(vec![-2.0, 2.0, 0.0]),
        Batch::from_vec(vec![0.0, 0.0, 1.0]),
        Batch::from_vec(vec![5.0, 5.0, 0.0]),
    ).norm();

    let colors = raytrace(Vec3::zero(), &dirs, &scene);

    assert!(colors.lane(0).x > colors.lane(0).z);
    assert!(colors.lane(1).z > colors.lane(1).x);
    assert_eq!(colors.lane(2), Rgb::new(0.125, 0.125, 0.125));
}

#[test]
fn two_lane_end_to_end() {
    // One ray square onto a red sphere under full light, one into the void
    let scene = lit_scene(
        vec![Shape::sphere(Vec3::new(0.0, 0.0, 5.0), 1.0, Rgb::red())],
        Rgb::new(0.25, 0.25, 0.25),
    );
    let dirs = Vector3::new(
        Batch::from_vec(vec![0.0, 0.0]),
        Batch::from_vec(vec![0.0, 1.0]),
        Batch::from_vec(vec![1.0, 0.0]),
    );

    let colors = raytrace(Vec3::zero(), &dirs, &scene);

    assert_eq!(colors.lane(0), Rgb::new(1.0, 0.5, 0.5));
    assert_eq!(colors.x.as_slice()[1], 0.25);
    assert_eq!(colors.y.as_slice()[1], 0.25);
    assert_eq!(colors.z.as_slice()[1], 0.25);
}
