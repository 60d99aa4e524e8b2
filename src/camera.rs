use crate::batch::Batch;
use crate::canvas::Canvas;
use crate::consts::{ FRAME_HEIGHT, FRAME_WIDTH };
use crate::raytrace::raytrace;
use crate::scene::Scene;
use crate::vector::{ Vec3, Vec3x, Vector3 };

/// A fixed camera for generating a canvas.
///
/// The camera shoots one ray per pixel from the eye through a virtual
/// screen rectangle on the z = 0 plane. The rectangle spans x in [-1, 1];
/// its vertical extent follows the aspect ratio and is shifted up half a
/// unit so scenes resting on a floor sit naturally in frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    /// The horizontal size of the resultant canvas.
    pub width: usize,

    /// The vertical size of the resultant canvas.
    pub height: usize,

    /// The eye position rays originate from.
    pub eye: Vec3,
}

impl Default for Camera {
    fn default() -> Camera {
        Camera::new(FRAME_WIDTH, FRAME_HEIGHT, Camera::DEFAULT_EYE)
    }
}

impl Camera {
    /// Where the eye sits unless a caller moves it.
    pub const DEFAULT_EYE: Vec3 = Vec3::new(0.0, 0.35, -1.0);

    pub fn new(width: usize, height: usize, eye: Vec3) -> Camera {
        Camera { width, height, eye }
    }

    /// Unit ray directions through every screen point, one lane per pixel,
    /// laid out row-major with x varying fastest to match the raster.
    pub fn ray_directions(&self) -> Vec3x {
        let r = (self.width as f64) / (self.height as f64);

        // Screen corners: x0, y0, x1, y1
        let screen = (-1.0, 1.0 / r + 0.5, 1.0, -1.0 / r + 0.5);

        let x = Batch::linspace(screen.0, screen.2, self.width).tile(self.height);
        let y = Batch::linspace(screen.1, screen.3, self.height).repeat_each(self.width);
        let z = Batch::splat(0.0, self.width * self.height);

        (Vector3::new(x, y, z) - self.eye).norm()
    }

    /// Traces one frame of the scene onto a fresh canvas.
    pub fn render(&self, scene: &Scene) -> Canvas {
        let colors = raytrace(self.eye, &self.ray_directions(), scene);
        Canvas::from_colors(self.width, self.height, &colors)
    }
}

/* Tests */

#[test]
fn one_ray_per_pixel() {
    let camera = Camera::new(4, 3, Camera::DEFAULT_EYE);

    assert_eq!(camera.ray_directions().len(), 12);
}

#[test]
fn directions_are_unit_length() {
    let camera = Camera::new(3, 2, Camera::DEFAULT_EYE);
    let dirs = camera.ray_directions();

    for lane in 0..dirs.len() {
        assert!(crate::feq(dirs.lane(lane).magnitude(), 1.0));
    }
}

#[test]
fn raster_runs_left_to_right_then_down() {
    let camera = Camera::new(2, 2, Camera::DEFAULT_EYE);
    let dirs = camera.ray_directions();

    // Lanes pair up into rows: x sweeps within a row, y drops between rows
    assert!(dirs.lane(0).x < dirs.lane(1).x);
    assert!(crate::feq(dirs.lane(0).y, dirs.lane(1).y));
    assert!(crate::feq(dirs.lane(2).y, dirs.lane(3).y));
    assert!(dirs.lane(0).y > dirs.lane(2).y);
}

#[test]
fn screen_height_tracks_aspect_ratio() {
    // Twice as wide as tall: the screen rectangle spans y in [0, 1], and
    // every ray from an eye behind its lower edge leans up and forward
    let camera = Camera::new(2, 1, Vec3::new(0.0, 0.0, -1.0));
    let dirs = camera.ray_directions();

    let top_left = dirs.lane(0);
    assert!(top_left.x < 0.0);
    assert!(top_left.y > 0.0);
    assert!(top_left.z > 0.0);
}

#[test]
fn single_pixel_frame_is_legal() {
    let camera = Camera::new(1, 1, Camera::DEFAULT_EYE);
    let dirs = camera.ray_directions();

    assert_eq!(dirs.len(), 1);
    assert!(crate::feq(dirs.lane(0).magnitude(), 1.0));
}

#[test]
fn render_covers_the_canvas() {
    let mut scene = Scene::empty();
    scene.background = crate::vector::Rgb::new(1.0, 0.0, 0.0);
    let camera = Camera::new(2, 2, Camera::DEFAULT_EYE);

    let canvas = camera.render(&scene);

    assert_eq!((canvas.width, canvas.height), (2, 2));
    for y in 0..2 {
        for x in 0..2 {
            assert_eq!(
                canvas.read_pixel(x, y),
                Some(crate::vector::Rgb::new(1.0, 0.0, 0.0)),
            );
        }
    }
}
