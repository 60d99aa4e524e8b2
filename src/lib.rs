pub mod batch;
pub mod vector;
pub mod matrix;
pub mod light;

pub mod shape;
pub mod scene;
pub mod raytrace;

pub mod camera;
pub mod canvas;

pub mod config;
pub mod consts;

pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < consts::FEQ_EPSILON
}
