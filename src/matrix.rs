use std::ops::{ Index, IndexMut, Mul };

use crate::feq;
use crate::vector::{ Vec3, Vector3 };

/// One of the three coordinate axes, selecting a rotation plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// A row-major 3x3 matrix.
///
/// Scenes only ever transform rigidly, so the full affine machinery of a
/// 4x4 homogeneous matrix is unnecessary: rotations act on positions
/// directly, with translation handled by the caller around the pivot.
#[derive(Debug, Default, Copy, Clone)]
pub struct Matrix3 {
    data: [f64; 9],
}

impl PartialEq for Matrix3 {
    fn eq(&self, other: &Matrix3) -> bool {
        self.data.iter().zip(other.data.iter()).all(|(x, y)| feq(*x, *y))
    }
}

impl Index<(usize, usize)> for Matrix3 {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &f64 {
        &self.data[(index.0 * 3) + index.1]
    }
}

impl IndexMut<(usize, usize)> for Matrix3 {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut f64 {
        &mut self.data[(index.0 * 3) + index.1]
    }
}

impl Matrix3 {
    /// Instantiates a 3x3 identity matrix.
    pub fn identity() -> Matrix3 {
        let mut buf = [0.0; 9];
        buf[0] = 1.0; buf[4] = 1.0; buf[8] = 1.0;

        Matrix3 { data: buf }
    }

    /// Instantiates a rotation matrix about the X axis.
    ///
    /// Assumes that parameter `r` is in radians.
    pub fn rotation_x(r: f64) -> Matrix3 {
        let mut rotate = Self::identity();
        rotate[(1, 1)] =  r.cos();
        rotate[(1, 2)] = -r.sin();
        rotate[(2, 1)] =  r.sin();
        rotate[(2, 2)] =  r.cos();

        rotate
    }

    /// Instantiates a rotation matrix about the Y axis.
    ///
    /// Assumes that parameter `r` is in radians.
    pub fn rotation_y(r: f64) -> Matrix3 {
        let mut rotate = Self::identity();
        rotate[(0, 0)] =  r.cos();
        rotate[(0, 2)] =  r.sin();
        rotate[(2, 0)] = -r.sin();
        rotate[(2, 2)] =  r.cos();

        rotate
    }

    /// Instantiates a rotation matrix about the Z axis.
    ///
    /// Assumes that parameter `r` is in radians.
    pub fn rotation_z(r: f64) -> Matrix3 {
        let mut rotate = Self::identity();
        rotate[(0, 0)] =  r.cos();
        rotate[(0, 1)] = -r.sin();
        rotate[(1, 0)] =  r.sin();
        rotate[(1, 1)] =  r.cos();

        rotate
    }

    /// Instantiates a rotation matrix about the chosen axis.
    pub fn rotation(axis: Axis, r: f64) -> Matrix3 {
        match axis {
            Axis::X => Self::rotation_x(r),
            Axis::Y => Self::rotation_y(r),
            Axis::Z => Self::rotation_z(r),
        }
    }
}

impl Mul<Vec3> for Matrix3 {
    type Output = Vec3;

    fn mul(self, v: Vec3) -> Vec3 {
        Vector3::new(
            self[(0, 0)] * v.x + self[(0, 1)] * v.y + self[(0, 2)] * v.z,
            self[(1, 0)] * v.x + self[(1, 1)] * v.y + self[(1, 2)] * v.z,
            self[(2, 0)] * v.x + self[(2, 1)] * v.y + self[(2, 2)] * v.z,
        )
    }
}

#[test]
fn identity_leaves_vectors_alone() {
    let v = Vec3::new(1.0, 2.0, 3.0);

    assert_eq!(Matrix3::identity() * v, v);
}

#[test]
fn rotation_x_quarter_turn() {
    let r = Matrix3::rotation_x(std::f64::consts::FRAC_PI_2);

    assert_eq!(r * Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
}

#[test]
fn rotation_y_quarter_turn() {
    let r = Matrix3::rotation_y(std::f64::consts::FRAC_PI_2);

    assert_eq!(r * Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 0.0));
}

#[test]
fn rotation_z_quarter_turn() {
    let r = Matrix3::rotation_z(std::f64::consts::FRAC_PI_2);

    assert_eq!(r * Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
}

#[test]
fn rotation_round_trip() {
    let v = Vec3::new(0.3, -1.2, 2.4);
    let angle = 0.8;

    for axis in [Axis::X, Axis::Y, Axis::Z] {
        let there = Matrix3::rotation(axis, angle) * v;
        let back = Matrix3::rotation(axis, -angle) * there;

        assert_eq!(back, v);
    }
}
