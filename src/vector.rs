use std::ops::{ Add, Sub, Mul, Div, Neg };

use crate::batch::{ Batch, Mask };
use crate::feq;

/// A 3-component value type generic over its component representation.
///
/// Components are either plain scalars (`Vec3`, one point, direction or
/// color) or batches with one lane per ray (`Vec3x`). All three components
/// of an instance always share one shape; elementwise arithmetic is
/// implemented once over the component type, and a small set of broadcast
/// operators mixes the two shapes.
#[derive(Debug, Default, Copy, Clone)]
pub struct Vector3<T> {
    pub x: T,
    pub y: T,
    pub z: T
}

/// One point, direction or color.
pub type Vec3 = Vector3<f64>;

/// One lane per ray.
pub type Vec3x = Vector3<Batch>;

/// Colors are vectors: x/y/z carry the red/green/blue channels.
pub type Rgb = Vector3<f64>;

impl PartialEq for Vector3<f64> {
    fn eq(&self, other: &Vector3<f64>) -> bool {
        feq(self.x, other.x) &&
            feq(self.y, other.y) &&
            feq(self.z, other.z)
    }
}

impl PartialEq for Vector3<Batch> {
    fn eq(&self, other: &Vector3<Batch>) -> bool {
        self.x == other.x &&
            self.y == other.y &&
            self.z == other.z
    }
}

impl<T> Vector3<T> {
    pub const fn new(x: T, y: T, z: T) -> Vector3<T> {
        Vector3 { x, y, z }
    }

    /// Exposes the component triple for interop.
    pub fn components(&self) -> (&T, &T, &T) {
        (&self.x, &self.y, &self.z)
    }

    pub fn dot(&self, other: &Vector3<T>) -> T
    where
        for<'p> &'p T: Mul<&'p T, Output = T>,
        T: Add<Output = T>,
    {
        &self.x * &other.x + &self.y * &other.y + &self.z * &other.z
    }
}

impl Vector3<f64> {
    pub const fn zero() -> Vec3 {
        Vector3::new(0.0, 0.0, 0.0)
    }

    pub const fn white() -> Rgb {
        Vector3::new(1.0, 1.0, 1.0)
    }

    pub const fn red() -> Rgb {
        Vector3::new(1.0, 0.0, 0.0)
    }

    pub const fn green() -> Rgb {
        Vector3::new(0.0, 1.0, 0.0)
    }

    pub const fn blue() -> Rgb {
        Vector3::new(0.0, 0.0, 1.0)
    }

    pub fn magnitude(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction. Undefined for zero-length input;
    /// callers never normalize a zero vector.
    pub fn norm(&self) -> Vec3 {
        let mag = self.magnitude();
        Vector3::new(self.x / mag, self.y / mag, self.z / mag)
    }

    pub fn cross(&self, other: &Vec3) -> Vec3 {
        Vector3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }
}

impl Vector3<Batch> {
    /// Number of lanes. All three components always agree.
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.x.len(), self.y.len());
        debug_assert_eq!(self.x.len(), self.z.len());
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Broadcasts one scalar vector across `len` lanes.
    pub fn splat(value: Vec3, len: usize) -> Vec3x {
        Vector3::new(
            Batch::splat(value.x, len),
            Batch::splat(value.y, len),
            Batch::splat(value.z, len),
        )
    }

    /// The scalar vector held by one lane.
    pub fn lane(&self, lane: usize) -> Vec3 {
        Vector3::new(self.x[lane], self.y[lane], self.z[lane])
    }

    /// Dot product against one scalar vector, broadcast across all lanes.
    pub fn dot_scalar(&self, other: Vec3) -> Batch {
        &self.x * other.x + &self.y * other.y + &self.z * other.z
    }

    /// Cross product against one scalar vector, broadcast across all lanes.
    pub fn cross_scalar(&self, other: Vec3) -> Vec3x {
        Vector3::new(
            &self.y * other.z - &self.z * other.y,
            &self.z * other.x - &self.x * other.z,
            &self.x * other.y - &self.y * other.x,
        )
    }

    pub fn magnitude(&self) -> Batch {
        self.dot(self).sqrt()
    }

    /// Per-lane unit vectors. Zero-length lanes pass through unchanged
    /// (the divide is guarded), so dead lanes never poison a batch.
    pub fn norm(&self) -> Vec3x {
        let mag = self.magnitude();
        let safe = mag.gt_scalar(0.0).select_or(&mag, 1.0);
        self / &safe
    }

    /// Componentwise selection: `a`'s lane where the mask is true, `b`'s
    /// elsewhere.
    pub fn select(mask: &Mask, a: &Vec3x, b: &Vec3x) -> Vec3x {
        Vector3::new(
            mask.select(&a.x, &b.x),
            mask.select(&a.y, &b.y),
            mask.select(&a.z, &b.z),
        )
    }

    /// Compresses all three components down to the lanes where `keep` is
    /// true.
    pub fn gather(&self, keep: &Mask) -> Vec3x {
        Vector3::new(self.x.gather(keep), self.y.gather(keep), self.z.gather(keep))
    }

    /// Writes this vector's lanes into `out` at the positions where
    /// `slots` is true.
    pub fn scatter_into(&self, slots: &Mask, out: &mut Vec3x) {
        self.x.scatter_into(slots, &mut out.x);
        self.y.scatter_into(slots, &mut out.y);
        self.z.scatter_into(slots, &mut out.z);
    }

    /// Clamps every lane of every component into `[lo, hi]`.
    pub fn clamp(&self, lo: f64, hi: f64) -> Vec3x {
        Vector3::new(self.x.clamp(lo, hi), self.y.clamp(lo, hi), self.z.clamp(lo, hi))
    }
}

macro_rules! vector_binop {
    ($imp:ident, $method:ident) => {
        impl<T: $imp<Output = T>> $imp for Vector3<T> {
            type Output = Vector3<T>;

            fn $method(self, other: Vector3<T>) -> Vector3<T> {
                Vector3::new(
                    self.x.$method(other.x),
                    self.y.$method(other.y),
                    self.z.$method(other.z),
                )
            }
        }

        impl<'a, 'b, T> $imp<&'b Vector3<T>> for &'a Vector3<T>
        where
            &'a T: $imp<&'b T, Output = T>,
        {
            type Output = Vector3<T>;

            fn $method(self, other: &'b Vector3<T>) -> Vector3<T> {
                Vector3::new(
                    (&self.x).$method(&other.x),
                    (&self.y).$method(&other.y),
                    (&self.z).$method(&other.z),
                )
            }
        }

        impl<'a, T> $imp<&'a Vector3<T>> for Vector3<T>
        where
            T: $imp<&'a T, Output = T>,
        {
            type Output = Vector3<T>;

            fn $method(self, other: &'a Vector3<T>) -> Vector3<T> {
                Vector3::new(
                    self.x.$method(&other.x),
                    self.y.$method(&other.y),
                    self.z.$method(&other.z),
                )
            }
        }

        impl<'a, T> $imp<Vector3<T>> for &'a Vector3<T>
        where
            &'a T: $imp<T, Output = T>,
        {
            type Output = Vector3<T>;

            fn $method(self, other: Vector3<T>) -> Vector3<T> {
                Vector3::new(
                    (&self.x).$method(other.x),
                    (&self.y).$method(other.y),
                    (&self.z).$method(other.z),
                )
            }
        }
    };
}

vector_binop!(Add, add);
vector_binop!(Sub, sub);
vector_binop!(Mul, mul);

impl<T: Neg<Output = T>> Neg for Vector3<T> {
    type Output = Vector3<T>;

    fn neg(self) -> Vector3<T> {
        Vector3::new(-self.x, -self.y, -self.z)
    }
}

impl<'a, T> Neg for &'a Vector3<T>
where
    &'a T: Neg<Output = T>,
{
    type Output = Vector3<T>;

    fn neg(self) -> Vector3<T> {
        Vector3::new(-&self.x, -&self.y, -&self.z)
    }
}

/// Scales every component by one factor of the component type: a plain
/// scalar for `Vec3`, a per-lane batch of factors for `Vec3x`.
///
/// ```
/// use beamtrace::vector::Vec3;
///
/// let v = Vec3::new(1.0, -2.0, 3.0);
///
/// assert_eq!(v * 2.0, Vec3::new(2.0, -4.0, 6.0));
/// ```
impl<T> Mul<T> for Vector3<T>
where
    T: Mul<Output = T> + Clone,
{
    type Output = Vector3<T>;

    fn mul(self, factor: T) -> Vector3<T> {
        Vector3::new(
            self.x * factor.clone(),
            self.y * factor.clone(),
            self.z * factor,
        )
    }
}

impl<'a, 'b, T> Mul<&'b T> for &'a Vector3<T>
where
    &'a T: Mul<&'b T, Output = T>,
{
    type Output = Vector3<T>;

    fn mul(self, factor: &'b T) -> Vector3<T> {
        Vector3::new(&self.x * factor, &self.y * factor, &self.z * factor)
    }
}

impl<'a, T> Mul<&'a T> for Vector3<T>
where
    T: Mul<&'a T, Output = T>,
{
    type Output = Vector3<T>;

    fn mul(self, factor: &'a T) -> Vector3<T> {
        Vector3::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

impl<T> Div<T> for Vector3<T>
where
    T: Div<Output = T> + Clone,
{
    type Output = Vector3<T>;

    fn div(self, divisor: T) -> Vector3<T> {
        Vector3::new(
            self.x / divisor.clone(),
            self.y / divisor.clone(),
            self.z / divisor,
        )
    }
}

impl<'a, 'b, T> Div<&'b T> for &'a Vector3<T>
where
    &'a T: Div<&'b T, Output = T>,
{
    type Output = Vector3<T>;

    fn div(self, divisor: &'b T) -> Vector3<T> {
        Vector3::new(&self.x / divisor, &self.y / divisor, &self.z / divisor)
    }
}

/// Implements scalar left-multiplication for a plain vector.
impl Mul<Vec3> for f64 {
    type Output = Vec3;

    fn mul(self, other: Vec3) -> Vec3 {
        Vector3::new(self * other.x, self * other.y, self * other.z)
    }
}

/* Scalar <-> batch broadcast operators. */

impl Add<Vec3> for &Vec3x {
    type Output = Vec3x;

    fn add(self, other: Vec3) -> Vec3x {
        Vector3::new(&self.x + other.x, &self.y + other.y, &self.z + other.z)
    }
}

impl Add<Vec3> for Vec3x {
    type Output = Vec3x;

    fn add(self, other: Vec3) -> Vec3x {
        Vector3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub<Vec3> for &Vec3x {
    type Output = Vec3x;

    fn sub(self, other: Vec3) -> Vec3x {
        Vector3::new(&self.x - other.x, &self.y - other.y, &self.z - other.z)
    }
}

impl Sub<Vec3> for Vec3x {
    type Output = Vec3x;

    fn sub(self, other: Vec3) -> Vec3x {
        Vector3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Add<Vec3x> for Vec3 {
    type Output = Vec3x;

    fn add(self, other: Vec3x) -> Vec3x {
        Vector3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Add<&Vec3x> for Vec3 {
    type Output = Vec3x;

    fn add(self, other: &Vec3x) -> Vec3x {
        Vector3::new(self.x + &other.x, self.y + &other.y, self.z + &other.z)
    }
}

impl Sub<Vec3x> for Vec3 {
    type Output = Vec3x;

    fn sub(self, other: Vec3x) -> Vec3x {
        Vector3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Sub<&Vec3x> for Vec3 {
    type Output = Vec3x;

    fn sub(self, other: &Vec3x) -> Vec3x {
        Vector3::new(self.x - &other.x, self.y - &other.y, self.z - &other.z)
    }
}

/// Componentwise product against one scalar vector, broadcast across all
/// lanes. This is the color modulation path: batch colors times a plain
/// color.
impl Mul<Vec3> for &Vec3x {
    type Output = Vec3x;

    fn mul(self, other: Vec3) -> Vec3x {
        Vector3::new(&self.x * other.x, &self.y * other.y, &self.z * other.z)
    }
}

impl Mul<Vec3> for Vec3x {
    type Output = Vec3x;

    fn mul(self, other: Vec3) -> Vec3x {
        Vector3::new(self.x * other.x, self.y * other.y, self.z * other.z)
    }
}

impl Mul<f64> for &Vec3x {
    type Output = Vec3x;

    fn mul(self, factor: f64) -> Vec3x {
        Vector3::new(&self.x * factor, &self.y * factor, &self.z * factor)
    }
}

impl Mul<f64> for Vec3x {
    type Output = Vec3x;

    fn mul(self, factor: f64) -> Vec3x {
        Vector3::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

impl Div<f64> for Vec3x {
    type Output = Vec3x;

    fn div(self, divisor: f64) -> Vec3x {
        Vector3::new(self.x / divisor, self.y / divisor, self.z / divisor)
    }
}

impl Div<f64> for &Vec3x {
    type Output = Vec3x;

    fn div(self, divisor: f64) -> Vec3x {
        Vector3::new(&self.x / divisor, &self.y / divisor, &self.z / divisor)
    }
}

/// One scalar vector scaled into a batch by per-lane factors.
impl Mul<&Batch> for Vec3 {
    type Output = Vec3x;

    fn mul(self, factors: &Batch) -> Vec3x {
        Vector3::new(self.x * factors, self.y * factors, self.z * factors)
    }
}

/* Tests */

#[test]
fn add_vectors() {
    let a = Vec3::new(3.0, -2.0, 5.0);
    let b = Vec3::new(-2.0, 3.0, 1.0);

    assert_eq!(a + b, Vec3::new(1.0, 1.0, 6.0));
}

#[test]
fn sub_vectors() {
    let a = Vec3::new(3.0, 2.0, 1.0);
    let b = Vec3::new(5.0, 6.0, 7.0);

    assert_eq!(a - b, Vec3::new(-2.0, -4.0, -6.0));
}

#[test]
fn neg_vector() {
    let a = Vec3::new(1.0, -2.0, 3.0);

    assert_eq!(-a, Vec3::new(-1.0, 2.0, -3.0));
}

#[test]
fn scale_both_sides() {
    let a = Vec3::new(1.0, -2.0, 3.0);

    assert_eq!(a * 3.5, Vec3::new(3.5, -7.0, 10.5));
    assert_eq!(0.5 * a, Vec3::new(0.5, -1.0, 1.5));
    assert_eq!(a / 2.0, Vec3::new(0.5, -1.0, 1.5));
}

#[test]
fn dot_vectors() {
    let a = Vec3::new(1.0, 2.0, 3.0);
    let b = Vec3::new(2.0, 3.0, 4.0);

    assert_eq!(a.dot(&b), 20.0);
}

#[test]
fn cross_vectors() {
    let a = Vec3::new(1.0, 2.0, 3.0);
    let b = Vec3::new(2.0, 3.0, 4.0);

    assert_eq!(a.cross(&b), Vec3::new(-1.0, 2.0, -1.0));
    assert_eq!(b.cross(&a), Vec3::new(1.0, -2.0, 1.0));
}

#[test]
fn magnitude_and_norm() {
    let v = Vec3::new(1.0, 2.0, 3.0);

    assert!(feq(v.magnitude(), f64::sqrt(14.0)));
    assert!(feq(v.norm().magnitude(), 1.0));
    assert_eq!(Vec3::new(4.0, 0.0, 0.0).norm(), Vec3::new(1.0, 0.0, 0.0));
}

#[test]
fn splat_broadcasts_lanes() {
    let v = Vec3x::splat(Vec3::new(1.0, 2.0, 3.0), 2);

    assert_eq!(v.len(), 2);
    assert_eq!(v.lane(0), Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(v.lane(1), Vec3::new(1.0, 2.0, 3.0));
}

#[test]
fn batch_arithmetic_is_elementwise() {
    let a = Vector3::new(
        Batch::from_vec(vec![1.0, 2.0]),
        Batch::from_vec(vec![3.0, 4.0]),
        Batch::from_vec(vec![5.0, 6.0]),
    );
    let b = Vec3x::splat(Vec3::new(1.0, 1.0, 1.0), 2);

    let sum = &a + &b;
    assert_eq!(sum.lane(0), Vec3::new(2.0, 4.0, 6.0));
    assert_eq!(sum.lane(1), Vec3::new(3.0, 5.0, 7.0));
}

#[test]
fn scalar_vector_broadcasts_against_batch() {
    let batch = Vector3::new(
        Batch::from_vec(vec![1.0, 2.0]),
        Batch::from_vec(vec![0.0, 1.0]),
        Batch::from_vec(vec![2.0, 0.0]),
    );
    let offset = Vec3::new(1.0, 2.0, 3.0);

    let shifted = &batch + offset;
    assert_eq!(shifted.lane(0), Vec3::new(2.0, 2.0, 5.0));
    assert_eq!(shifted.lane(1), Vec3::new(3.0, 3.0, 3.0));

    let back = shifted - offset;
    assert_eq!(back.lane(0), batch.lane(0));
    assert_eq!(back.lane(1), batch.lane(1));
}

#[test]
fn dot_scalar_matches_per_lane_dot() {
    let batch = Vector3::new(
        Batch::from_vec(vec![1.0, -1.0]),
        Batch::from_vec(vec![2.0, 0.5]),
        Batch::from_vec(vec![3.0, 2.0]),
    );
    let v = Vec3::new(2.0, 3.0, 4.0);

    let dots = batch.dot_scalar(v);
    assert!(feq(dots[0], batch.lane(0).dot(&v)));
    assert!(feq(dots[1], batch.lane(1).dot(&v)));
}

#[test]
fn cross_scalar_matches_per_lane_cross() {
    let batch = Vector3::new(
        Batch::from_vec(vec![1.0, 0.0]),
        Batch::from_vec(vec![2.0, 1.0]),
        Batch::from_vec(vec![3.0, 0.0]),
    );
    let v = Vec3::new(2.0, 3.0, 4.0);

    let crosses = batch.cross_scalar(v);
    assert_eq!(crosses.lane(0), batch.lane(0).cross(&v));
    assert_eq!(crosses.lane(1), batch.lane(1).cross(&v));
}

#[test]
fn batch_norm_produces_unit_lanes() {
    let batch = Vector3::new(
        Batch::from_vec(vec![3.0, 0.0]),
        Batch::from_vec(vec![4.0, 5.0]),
        Batch::from_vec(vec![0.0, 0.0]),
    );

    let unit = batch.norm();
    assert_eq!(unit.lane(0), Vec3::new(0.6, 0.8, 0.0));
    assert_eq!(unit.lane(1), Vec3::new(0.0, 1.0, 0.0));
}

#[test]
fn batch_norm_passes_zero_lanes_through() {
    let batch = Vec3x::splat(Vec3::zero(), 2);

    assert_eq!(batch.norm().lane(0), Vec3::zero());
}

#[test]
fn select_is_componentwise() {
    let mask = Mask::from_vec(vec![true, false]);
    let a = Vec3x::splat(Vec3::new(1.0, 1.0, 1.0), 2);
    let b = Vec3x::splat(Vec3::new(9.0, 9.0, 9.0), 2);

    let picked = Vector3::select(&mask, &a, &b);
    assert_eq!(picked.lane(0), Vec3::new(1.0, 1.0, 1.0));
    assert_eq!(picked.lane(1), Vec3::new(9.0, 9.0, 9.0));
}

#[test]
fn gather_then_scatter_restores_lanes() {
    let batch = Vector3::new(
        Batch::from_vec(vec![1.0, 2.0, 3.0]),
        Batch::from_vec(vec![4.0, 5.0, 6.0]),
        Batch::from_vec(vec![7.0, 8.0, 9.0]),
    );
    let keep = Mask::from_vec(vec![true, false, true]);

    let packed = batch.gather(&keep);
    assert_eq!(packed.len(), 2);
    assert_eq!(packed.lane(0), batch.lane(0));
    assert_eq!(packed.lane(1), batch.lane(2));

    let mut out = Vec3x::splat(Vec3::zero(), 3);
    packed.scatter_into(&keep, &mut out);
    assert_eq!(out.lane(0), batch.lane(0));
    assert_eq!(out.lane(1), Vec3::zero());
    assert_eq!(out.lane(2), batch.lane(2));
}

#[test]
fn components_exposes_triple() {
    let v = Vec3::new(1.0, 2.0, 3.0);
    let (x, y, z) = v.components();

    assert_eq!((*x, *y, *z), (1.0, 2.0, 3.0));
}
