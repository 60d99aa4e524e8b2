use crate::consts::ROTATE_STEP;
use crate::light::DirectionalLight;
use crate::matrix::{ Axis, Matrix3 };
use crate::shape::Shape;
use crate::vector::{ Rgb, Vec3 };

/// Shapes under one directional light, plus the frame-to-frame rotation
/// state.
///
/// Shape order is significant: when two shapes sit at exactly the same
/// distance along a ray, the earlier entry wins. The pivot is fixed when
/// the scene is built and every interactive rotation turns about it.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub shapes: Vec<Shape>,
    pub light: DirectionalLight,
    pub background: Rgb,
    pub pivot: Vec3,
    pub step: f64,
}

impl Default for Scene {
    fn default() -> Scene {
        let anchor0 = Vec3::new(0.4, 0.6, 0.7);
        let anchor1 = Vec3::new(0.0, 1.2, 0.7);
        let anchor2 = Vec3::new(-0.4, 0.6, 0.7);

        let shapes = vec![
            Shape::sphere(anchor0, 0.3, Rgb::red()),
            Shape::sphere(anchor1, 0.3, Rgb::blue()),
            Shape::sphere(anchor2, 0.3, Rgb::green()),
            Shape::triangle(anchor0, anchor1, anchor2, Rgb::new(1.0, 1.0, 0.0)),
            Shape::checkered_sphere(
                Vec3::new(0.0, -99999.5, 0.0),
                99999.0,
                Rgb::new(0.9, 0.9, 0.9),
                0.25,
            ),
        ];

        Scene::new(shapes, Default::default(), Rgb::zero())
    }
}

impl Scene {
    /// Builds a scene, fixing the rotation pivot at the centroid of the
    /// first three shapes' anchors.
    pub fn new(shapes: Vec<Shape>, light: DirectionalLight, background: Rgb) -> Scene {
        let pivot = centroid(&shapes);
        Scene { shapes, light, background, pivot, step: ROTATE_STEP }
    }

    /// Creates an empty scene with the default light source.
    pub fn empty() -> Scene {
        Scene::new(Vec::new(), Default::default(), Rgb::zero())
    }

    /// Rigidly rotates every shape by `angle` radians about an axis line
    /// through `pivot`. Positions move; radii, colors and checker scales
    /// do not.
    pub fn rotate(&mut self, angle: f64, axis: Axis, pivot: Vec3) {
        let rotation = Matrix3::rotation(axis, angle);
        for shape in self.shapes.iter_mut() {
            *shape = shape.rotated(rotation, pivot);
        }
    }

    /// One interactive step counterclockwise about the vertical axis
    /// through the scene's pivot.
    pub fn rotate_positive(&mut self) {
        self.rotate(self.step, Axis::Y, self.pivot);
    }

    /// One interactive step clockwise about the vertical axis through the
    /// scene's pivot.
    pub fn rotate_negative(&mut self) {
        self.rotate(-self.step, Axis::Y, self.pivot);
    }
}

/// Mean anchor of the first three shapes, matching the scene's visual
/// center when the arrangement leads with its foreground pieces. Scenes
/// with fewer shapes average what they have; an empty scene pivots on the
/// origin.
fn centroid(shapes: &[Shape]) -> Vec3 {
    let mut sum = Vec3::zero();
    let mut count = 0;
    for shape in shapes.iter().take(3) {
        sum = sum + shape.anchor();
        count += 1;
    }

    if count == 0 {
        Vec3::zero()
    } else {
        sum / (count as f64)
    }
}

/* Tests */

#[test]
fn template_scene_layout() {
    let scene = Scene::default();

    assert_eq!(scene.shapes.len(), 5);
    assert_eq!(scene.pivot, Vec3::new(0.0, 0.8, 0.7));
    assert!(crate::feq(scene.step, std::f64::consts::PI / 10.0));

    match scene.shapes[0] {
        Shape::Sphere(s) => {
            assert_eq!(s.center, Vec3::new(0.4, 0.6, 0.7));
            assert_eq!(s.radius, 0.3);
            assert_eq!(s.color, Rgb::red());
        }
        _ => panic!("template scene leads with a sphere"),
    }
    match scene.shapes[4] {
        Shape::CheckeredSphere(s) => assert_eq!(s.scale, 0.25),
        _ => panic!("template scene ends with the checkered floor"),
    }
}

#[test]
fn pivot_averages_first_three_anchors() {
    let shapes = vec![
        Shape::sphere(Vec3::new(3.0, 0.0, 0.0), 1.0, Rgb::white()),
        Shape::sphere(Vec3::new(0.0, 3.0, 0.0), 1.0, Rgb::white()),
        Shape::sphere(Vec3::new(0.0, 0.0, 3.0), 1.0, Rgb::white()),
        Shape::sphere(Vec3::new(100.0, 100.0, 100.0), 1.0, Rgb::white()),
    ];
    let scene = Scene::new(shapes, Default::default(), Rgb::zero());

    // The fourth shape plays no part
    assert_eq!(scene.pivot, Vec3::new(1.0, 1.0, 1.0));
}

#[test]
fn pivot_of_empty_scene_is_origin() {
    assert_eq!(Scene::empty().pivot, Vec3::zero());
}

#[test]
fn rotation_round_trips() {
    let mut scene = Scene::default();
    let before = scene.shapes.clone();

    scene.rotate_positive();
    scene.rotate_negative();

    assert_eq!(scene.shapes, before);
}

#[test]
fn rotation_moves_off_pivot_shapes() {
    let mut scene = Scene::default();
    let before = scene.shapes[0].anchor();

    scene.rotate_positive();

    assert_ne!(scene.shapes[0].anchor(), before);
}

#[test]
fn rotation_preserves_surface_attributes() {
    let mut scene = Scene::default();

    scene.rotate_positive();

    match scene.shapes[4] {
        Shape::CheckeredSphere(s) => {
            assert_eq!(s.sphere.radius, 99999.0);
            assert_eq!(s.sphere.color, Rgb::new(0.9, 0.9, 0.9));
            assert_eq!(s.scale, 0.25);
        }
        _ => panic!("rotation changed the shape kind"),
    }
}

#[test]
fn shape_on_pivot_axis_stays_put() {
    let pivot = Vec3::new(0.0, 0.8, 0.7);
    let mut scene = Scene::default();
    scene.shapes = vec![Shape::sphere(pivot, 0.3, Rgb::white())];
    scene.pivot = pivot;

    scene.rotate_positive();

    assert_eq!(scene.shapes[0].anchor(), pivot);
}

#[test]
fn explicit_rotation_about_chosen_axis() {
    let mut scene = Scene::new(
        vec![Shape::sphere(Vec3::new(0.0, 1.0, 0.0), 1.0, Rgb::white())],
        Default::default(),
        Rgb::zero(),
    );

    scene.rotate(std::f64::consts::FRAC_PI_2, Axis::X, Vec3::zero());

    assert_eq!(scene.shapes[0].anchor(), Vec3::new(0.0, 0.0, 1.0));
}
