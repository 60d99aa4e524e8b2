use std::convert::TryFrom;
use std::fs;
use std::path::Path;

use serde::{ Serialize, Deserialize };
use thiserror::Error;

use crate::camera::Camera;
use crate::consts::FEQ_EPSILON;
use crate::light::DirectionalLight;
use crate::scene::Scene;
use crate::shape::Shape;
use crate::vector::{ Rgb, Vec3 };

/// Everything a scene file describes: the scene itself plus the eye the
/// camera should shoot from.
#[derive(Debug, Clone)]
pub struct SceneFile {
    pub scene: Scene,
    pub eye: Vec3,
}

/// Ways a scene description can fail to load.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("could not read scene file")]
    Io(#[from] std::io::Error),

    #[error("scene file is not valid JSON")]
    Json(#[from] serde_json::Error),

    #[error("expected three vector components, got {0:?}")]
    BadVector(Vec<f64>),

    #[error("shape {ty:?} is missing its {field:?} field")]
    MissingField { ty: String, field: &'static str },

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("a triangle needs exactly three vertices, got {0}")]
    BadTriangle(usize),

    #[error("triangle vertices are collinear")]
    CollinearTriangle,

    #[error("light direction must not be the zero vector")]
    ZeroLightDirection,

    #[error("unrecognized shape type {0:?}")]
    UnknownShape(String),
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SceneJson {
    light: LightJson,
    background: Option<Vec<f64>>,
    eye: Option<Vec<f64>>,
    pivot: Option<Vec<f64>>,
    step: Option<f64>,
    shapes: Vec<ShapeJson>,
}

#[derive(Clone, Serialize, Deserialize)]
struct LightJson {
    direction: Vec<f64>,
    intensity: Vec<f64>,
}

#[derive(Clone, Serialize, Deserialize)]
struct ShapeJson {
    ty: String,
    color: Vec<f64>,
    center: Option<Vec<f64>>,
    radius: Option<f64>,
    scale: Option<f64>,
    vertices: Option<Vec<Vec<f64>>>,
}

/// Reads and validates a JSON scene description from disk.
pub fn load_scene(path: &Path) -> Result<SceneFile, SceneError> {
    let text = fs::read_to_string(path)?;
    parse_scene(&text)
}

/// Parses and validates a JSON scene description.
pub fn parse_scene(text: &str) -> Result<SceneFile, SceneError> {
    let scene_json: SceneJson = serde_json::from_str(text)?;
    SceneFile::try_from(scene_json)
}

fn vector(components: &[f64]) -> Result<Vec3, SceneError> {
    if components.len() != 3 {
        return Err(SceneError::BadVector(components.to_vec()));
    }

    Ok(Vec3::new(components[0], components[1], components[2]))
}

fn missing(ty: &str, field: &'static str) -> SceneError {
    SceneError::MissingField { ty: ty.to_string(), field }
}

fn positive(field: &'static str, value: Option<f64>, ty: &str) -> Result<f64, SceneError> {
    let value = value.ok_or_else(|| missing(ty, field))?;
    if value <= 0.0 {
        return Err(SceneError::NotPositive { field, value });
    }

    Ok(value)
}

impl TryFrom<ShapeJson> for Shape {
    type Error = SceneError;

    fn try_from(shape_json: ShapeJson) -> Result<Shape, SceneError> {
        let ty = shape_json.ty.as_str();
        let color = vector(&shape_json.color)?;

        match ty {
            "sphere" | "checkered_sphere" => {
                let center = match &shape_json.center {
                    Some(center) => vector(center)?,
                    None => return Err(missing(ty, "center")),
                };
                let radius = positive("radius", shape_json.radius, ty)?;

                if ty == "sphere" {
                    Ok(Shape::sphere(center, radius, color))
                } else {
                    let scale = positive("scale", shape_json.scale, ty)?;
                    Ok(Shape::checkered_sphere(center, radius, color, scale))
                }
            }
            "triangle" => {
                let vertices = match &shape_json.vertices {
                    Some(vertices) => vertices,
                    None => return Err(missing(ty, "vertices")),
                };
                if vertices.len() != 3 {
                    return Err(SceneError::BadTriangle(vertices.len()));
                }

                let v0 = vector(&vertices[0])?;
                let v1 = vector(&vertices[1])?;
                let v2 = vector(&vertices[2])?;

                // Collinear vertices have no face normal; the engine
                // trusts its input, so the check lives here.
                if (v1 - v0).cross(&(v2 - v0)).magnitude() < FEQ_EPSILON {
                    return Err(SceneError::CollinearTriangle);
                }

                Ok(Shape::triangle(v0, v1, v2, color))
            }
            _ => Err(SceneError::UnknownShape(shape_json.ty)),
        }
    }
}

impl TryFrom<SceneJson> for SceneFile {
    type Error = SceneError;

    fn try_from(scene_json: SceneJson) -> Result<SceneFile, SceneError> {
        let direction = vector(&scene_json.light.direction)?;
        if direction.magnitude() == 0.0 {
            return Err(SceneError::ZeroLightDirection);
        }
        let light = DirectionalLight::new(direction, vector(&scene_json.light.intensity)?);

        let background = match &scene_json.background {
            Some(background) => vector(background)?,
            None => Rgb::zero(),
        };

        let eye = match &scene_json.eye {
            Some(eye) => vector(eye)?,
            None => Camera::DEFAULT_EYE,
        };

        let pivot = match &scene_json.pivot {
            Some(pivot) => Some(vector(pivot)?),
            None => None,
        };

        // Convert all the shape JSONs to shapes, failing on the first bad one
        let shapes = scene_json.shapes.into_iter()
            .map(Shape::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let mut scene = Scene::new(shapes, light, background);
        if let Some(pivot) = pivot {
            scene.pivot = pivot;
        }
        if let Some(step) = scene_json.step {
            scene.step = step;
        }

        Ok(SceneFile { scene, eye })
    }
}

/* Tests */

#[test]
fn parse_full_scene() {
    let file = parse_scene(r#"{
        "light": { "direction": [5, 5, -10], "intensity": [1, 1, 1] },
        "background": [0.1, 0.1, 0.1],
        "eye": [0, 2, -4],
        "shapes": [
            { "ty": "sphere", "color": [1, 0, 0],
              "center": [0.4, 0.6, 0.7], "radius": 0.3 },
            { "ty": "checkered_sphere", "color": [0.9, 0.9, 0.9],
              "center": [0, -99999.5, 0], "radius": 99999, "scale": 0.25 },
            { "ty": "triangle", "color": [1, 1, 0],
              "vertices": [[0, 1, 0], [-1, 0, 0], [1, 0, 0]] }
        ]
    }"#).unwrap();

    assert_eq!(file.scene.shapes.len(), 3);
    assert_eq!(file.eye, Vec3::new(0.0, 2.0, -4.0));
    assert_eq!(file.scene.background, Rgb::new(0.1, 0.1, 0.1));
    assert_eq!(file.scene.light.direction, Vec3::new(5.0, 5.0, -10.0).norm());

    match file.scene.shapes[1] {
        Shape::CheckeredSphere(s) => assert_eq!(s.scale, 0.25),
        _ => panic!("second shape should be the checkered floor"),
    }
}

#[test]
fn absent_fields_take_defaults() {
    let file = parse_scene(r#"{
        "light": { "direction": [0, 1, 0], "intensity": [1, 1, 1] },
        "shapes": []
    }"#).unwrap();

    assert_eq!(file.scene.background, Rgb::zero());
    assert_eq!(file.eye, Camera::DEFAULT_EYE);
    assert_eq!(file.scene.pivot, Vec3::zero());
    assert_eq!(file.scene.step, crate::consts::ROTATE_STEP);
}

#[test]
fn pivot_and_step_override_their_defaults() {
    let file = parse_scene(r#"{
        "light": { "direction": [0, 1, 0], "intensity": [1, 1, 1] },
        "pivot": [1, 2, 3],
        "step": 0.5,
        "shapes": [
            { "ty": "sphere", "color": [1, 0, 0],
              "center": [4, 5, 6], "radius": 1.0 }
        ]
    }"#).unwrap();

    assert_eq!(file.scene.pivot, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(file.scene.step, 0.5);
}

#[test]
fn malformed_json_is_rejected() {
    let result = parse_scene("{ not json");

    assert!(matches!(result, Err(SceneError::Json(_))));
}

#[test]
fn unknown_shape_type_is_rejected() {
    let result = parse_scene(r#"{
        "light": { "direction": [0, 1, 0], "intensity": [1, 1, 1] },
        "shapes": [ { "ty": "torus", "color": [1, 1, 1] } ]
    }"#);

    assert!(matches!(result, Err(SceneError::UnknownShape(_))));
}

#[test]
fn nonpositive_radius_is_rejected() {
    let result = parse_scene(r#"{
        "light": { "direction": [0, 1, 0], "intensity": [1, 1, 1] },
        "shapes": [ { "ty": "sphere", "color": [1, 0, 0],
                      "center": [0, 0, 0], "radius": -2.0 } ]
    }"#);

    assert!(matches!(
        result,
        Err(SceneError::NotPositive { field: "radius", .. }),
    ));
}

#[test]
fn missing_center_is_rejected() {
    let result = parse_scene(r#"{
        "light": { "direction": [0, 1, 0], "intensity": [1, 1, 1] },
        "shapes": [ { "ty": "sphere", "color": [1, 0, 0], "radius": 1.0 } ]
    }"#);

    assert!(matches!(
        result,
        Err(SceneError::MissingField { field: "center", .. }),
    ));
}

#[test]
fn short_vectors_are_rejected() {
    let result = parse_scene(r#"{
        "light": { "direction": [0, 1], "intensity": [1, 1, 1] },
        "shapes": []
    }"#);

    assert!(matches!(result, Err(SceneError::BadVector(_))));
}

#[test]
fn two_vertex_triangle_is_rejected() {
    let result = parse_scene(r#"{
        "light": { "direction": [0, 1, 0], "intensity": [1, 1, 1] },
        "shapes": [ { "ty": "triangle", "color": [1, 1, 0],
                      "vertices": [[0, 1, 0], [-1, 0, 0]] } ]
    }"#);

    assert!(matches!(result, Err(SceneError::BadTriangle(2))));
}

#[test]
fn collinear_triangle_is_rejected() {
    let result = parse_scene(r#"{
        "light": { "direction": [0, 1, 0], "intensity": [1, 1, 1] },
        "shapes": [ { "ty": "triangle", "color": [1, 1, 0],
                      "vertices": [[0, 0, 0], [1, 1, 1], [2, 2, 2]] } ]
    }"#);

    assert!(matches!(result, Err(SceneError::CollinearTriangle)));
}

#[test]
fn zero_light_direction_is_rejected() {
    let result = parse_scene(r#"{
        "light": { "direction": [0, 0, 0], "intensity": [1, 1, 1] },
        "shapes": []
    }"#);

    assert!(matches!(result, Err(SceneError::ZeroLightDirection)));
}
