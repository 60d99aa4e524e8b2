use std::iter::FromIterator;
use std::ops::{ Add, Sub, Mul, Div, Neg, Index, BitAnd, BitOr, Not };

use crate::feq;

/// A fixed-length batch of per-ray scalars, processed as one data-parallel
/// unit. One lane per active ray; every elementwise operation requires both
/// operands to hold the same number of lanes.
///
/// ```
/// use beamtrace::batch::Batch;
///
/// let a = Batch::splat(1.0, 4);
/// let b = Batch::linspace(0.0, 3.0, 4);
///
/// assert_eq!(a + &b, Batch::from_vec(vec![1.0, 2.0, 3.0, 4.0]));
/// ```
#[derive(Debug, Clone)]
pub struct Batch(Box<[f64]>);

/// Boolean companion to [`Batch`]: the result of lane comparisons, consumed
/// by selection, gathering and scattering.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask(Box<[bool]>);

impl PartialEq for Batch {
    fn eq(&self, other: &Batch) -> bool {
        self.len() == other.len() &&
            self.0.iter().zip(other.0.iter()).all(|(a, b)| feq(*a, *b))
    }
}

impl Batch {
    pub fn from_vec(values: Vec<f64>) -> Batch {
        Batch(values.into_boxed_slice())
    }

    /// A batch holding `len` copies of one value.
    pub fn splat(value: f64, len: usize) -> Batch {
        Batch(vec![value; len].into_boxed_slice())
    }

    /// `count` evenly spaced lanes from `start` to `stop` inclusive. A
    /// single-lane batch sits at `start`.
    pub fn linspace(start: f64, stop: f64, count: usize) -> Batch {
        if count < 2 {
            return Batch::splat(start, count);
        }

        let step = (stop - start) / ((count - 1) as f64);
        (0..count).map(|i| start + step * (i as f64)).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }

    /// The whole batch repeated `count` times end to end.
    pub fn tile(&self, count: usize) -> Batch {
        let mut lanes = Vec::with_capacity(self.len() * count);
        for _ in 0..count {
            lanes.extend_from_slice(&self.0);
        }

        Batch(lanes.into_boxed_slice())
    }

    /// Each lane repeated `count` times in place.
    pub fn repeat_each(&self, count: usize) -> Batch {
        let mut lanes = Vec::with_capacity(self.len() * count);
        for value in self.iter() {
            for _ in 0..count {
                lanes.push(value);
            }
        }

        Batch(lanes.into_boxed_slice())
    }

    fn map(&self, op: impl Fn(f64) -> f64) -> Batch {
        self.0.iter().map(|v| op(*v)).collect()
    }

    pub fn sqrt(&self) -> Batch {
        self.map(f64::sqrt)
    }

    pub fn floor(&self) -> Batch {
        self.map(f64::floor)
    }

    pub fn abs(&self) -> Batch {
        self.map(f64::abs)
    }

    pub fn powf(&self, exponent: f64) -> Batch {
        self.map(|v| v.powf(exponent))
    }

    pub fn clamp(&self, lo: f64, hi: f64) -> Batch {
        self.map(|v| v.clamp(lo, hi))
    }

    pub fn rem_euclid(&self, modulus: f64) -> Batch {
        self.map(|v| v.rem_euclid(modulus))
    }

    /// Elementwise maximum against one scalar.
    pub fn max(&self, floor: f64) -> Batch {
        self.map(|v| v.max(floor))
    }

    pub fn lt(&self, other: &Batch) -> Mask {
        debug_assert_eq!(self.len(), other.len());
        self.0.iter().zip(other.0.iter()).map(|(a, b)| a < b).collect()
    }

    pub fn lt_scalar(&self, value: f64) -> Mask {
        self.0.iter().map(|v| *v < value).collect()
    }

    pub fn gt_scalar(&self, value: f64) -> Mask {
        self.0.iter().map(|v| *v > value).collect()
    }

    pub fn ge_scalar(&self, value: f64) -> Mask {
        self.0.iter().map(|v| *v >= value).collect()
    }

    pub fn is_finite(&self) -> Mask {
        self.0.iter().map(|v| v.is_finite()).collect()
    }

    /// Compresses the batch down to the lanes where `keep` is true.
    pub fn gather(&self, keep: &Mask) -> Batch {
        debug_assert_eq!(self.len(), keep.len());
        self.iter().zip(keep.iter()).filter(|(_, k)| *k).map(|(v, _)| v).collect()
    }

    /// Writes this batch's lanes into `out` at the positions where `slots`
    /// is true. Inverse of [`Batch::gather`]: `self` must hold exactly as
    /// many lanes as `slots` has true entries.
    pub fn scatter_into(&self, slots: &Mask, out: &mut Batch) {
        debug_assert_eq!(slots.len(), out.len());
        debug_assert_eq!(self.len(), slots.count());

        let mut lanes = self.0.iter();
        for (slot, selected) in out.0.iter_mut().zip(slots.iter()) {
            if selected {
                if let Some(value) = lanes.next() {
                    *slot = *value;
                }
            }
        }
    }
}

impl Mask {
    pub fn splat(value: bool, len: usize) -> Mask {
        Mask(vec![value; len].into_boxed_slice())
    }

    pub fn from_vec(values: Vec<bool>) -> Mask {
        Mask(values.into_boxed_slice())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().copied()
    }

    pub fn any(&self) -> bool {
        self.0.iter().any(|v| *v)
    }

    /// Number of true lanes.
    pub fn count(&self) -> usize {
        self.0.iter().filter(|v| **v).count()
    }

    /// Per-lane choice: `a` where true, `b` where false.
    pub fn select(&self, a: &Batch, b: &Batch) -> Batch {
        debug_assert_eq!(self.len(), a.len());
        debug_assert_eq!(self.len(), b.len());
        self.iter().enumerate().map(|(i, k)| if k { a[i] } else { b[i] }).collect()
    }

    /// Per-lane choice against one scalar: `a` where true, `fill` elsewhere.
    pub fn select_or(&self, a: &Batch, fill: f64) -> Batch {
        debug_assert_eq!(self.len(), a.len());
        self.iter().enumerate().map(|(i, k)| if k { a[i] } else { fill }).collect()
    }

    /// The mask as 1.0/0.0 lanes, for use as a multiplicative gate.
    pub fn to_batch(&self) -> Batch {
        self.iter().map(|k| if k { 1.0 } else { 0.0 }).collect()
    }
}

impl FromIterator<f64> for Batch {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Batch {
        Batch(iter.into_iter().collect())
    }
}

impl FromIterator<bool> for Mask {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Mask {
        Mask(iter.into_iter().collect())
    }
}

impl Index<usize> for Batch {
    type Output = f64;

    fn index(&self, lane: usize) -> &f64 {
        &self.0[lane]
    }
}

impl Index<usize> for Mask {
    type Output = bool;

    fn index(&self, lane: usize) -> &bool {
        &self.0[lane]
    }
}

macro_rules! batch_binop {
    ($imp:ident, $method:ident, $op:tt) => {
        impl $imp<&Batch> for &Batch {
            type Output = Batch;

            fn $method(self, other: &Batch) -> Batch {
                debug_assert_eq!(self.len(), other.len());
                self.0.iter().zip(other.0.iter()).map(|(a, b)| a $op b).collect()
            }
        }

        impl $imp<&Batch> for Batch {
            type Output = Batch;

            fn $method(mut self, other: &Batch) -> Batch {
                debug_assert_eq!(self.len(), other.len());
                for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
                    *a = *a $op b;
                }
                self
            }
        }

        impl $imp<Batch> for &Batch {
            type Output = Batch;

            fn $method(self, mut other: Batch) -> Batch {
                debug_assert_eq!(self.len(), other.len());
                for (b, a) in other.0.iter_mut().zip(self.0.iter()) {
                    *b = a $op *b;
                }
                other
            }
        }

        impl $imp<Batch> for Batch {
            type Output = Batch;

            fn $method(self, other: Batch) -> Batch {
                self.$method(&other)
            }
        }

        impl $imp<f64> for &Batch {
            type Output = Batch;

            fn $method(self, other: f64) -> Batch {
                self.0.iter().map(|a| a $op other).collect()
            }
        }

        impl $imp<f64> for Batch {
            type Output = Batch;

            fn $method(mut self, other: f64) -> Batch {
                for a in self.0.iter_mut() {
                    *a = *a $op other;
                }
                self
            }
        }

        impl $imp<&Batch> for f64 {
            type Output = Batch;

            fn $method(self, other: &Batch) -> Batch {
                other.0.iter().map(|b| self $op b).collect()
            }
        }

        impl $imp<Batch> for f64 {
            type Output = Batch;

            fn $method(self, mut other: Batch) -> Batch {
                for b in other.0.iter_mut() {
                    *b = self $op *b;
                }
                other
            }
        }
    };
}

batch_binop!(Add, add, +);
batch_binop!(Sub, sub, -);
batch_binop!(Mul, mul, *);
batch_binop!(Div, div, /);

impl Neg for &Batch {
    type Output = Batch;

    fn neg(self) -> Batch {
        self.0.iter().map(|a| -a).collect()
    }
}

impl Neg for Batch {
    type Output = Batch;

    fn neg(mut self) -> Batch {
        for a in self.0.iter_mut() {
            *a = -*a;
        }
        self
    }
}

macro_rules! mask_binop {
    ($imp:ident, $method:ident, $op:tt) => {
        impl $imp<&Mask> for &Mask {
            type Output = Mask;

            fn $method(self, other: &Mask) -> Mask {
                debug_assert_eq!(self.len(), other.len());
                self.0.iter().zip(other.0.iter()).map(|(a, b)| *a $op *b).collect()
            }
        }

        impl $imp<Mask> for Mask {
            type Output = Mask;

            fn $method(self, other: Mask) -> Mask {
                (&self).$method(&other)
            }
        }
    };
}

mask_binop!(BitAnd, bitand, &);
mask_binop!(BitOr, bitor, |);

impl Not for &Mask {
    type Output = Mask;

    fn not(self) -> Mask {
        self.0.iter().map(|v| !v).collect()
    }
}

impl Not for Mask {
    type Output = Mask;

    fn not(mut self) -> Mask {
        for v in self.0.iter_mut() {
            *v = !*v;
        }
        self
    }
}

/* Tests */

#[test]
fn splat_fills_lanes() {
    let b = Batch::splat(2.5, 3);

    assert_eq!(b.len(), 3);
    assert_eq!(b, Batch::from_vec(vec![2.5, 2.5, 2.5]));
}

#[test]
fn linspace_includes_endpoints() {
    let b = Batch::linspace(0.0, 1.0, 5);

    assert_eq!(b, Batch::from_vec(vec![0.0, 0.25, 0.5, 0.75, 1.0]));
}

#[test]
fn linspace_single_lane() {
    let b = Batch::linspace(3.0, 9.0, 1);

    assert_eq!(b, Batch::from_vec(vec![3.0]));
}

#[test]
fn elementwise_arithmetic() {
    let a = Batch::from_vec(vec![1.0, 2.0, 3.0]);
    let b = Batch::from_vec(vec![4.0, 5.0, 6.0]);

    assert_eq!(&a + &b, Batch::from_vec(vec![5.0, 7.0, 9.0]));
    assert_eq!(&b - &a, Batch::from_vec(vec![3.0, 3.0, 3.0]));
    assert_eq!(&a * &b, Batch::from_vec(vec![4.0, 10.0, 18.0]));
    assert_eq!(&b / &a, Batch::from_vec(vec![4.0, 2.5, 2.0]));
}

#[test]
fn scalar_broadcasting() {
    let a = Batch::from_vec(vec![1.0, 2.0, 3.0]);

    assert_eq!(&a * 2.0, Batch::from_vec(vec![2.0, 4.0, 6.0]));
    assert_eq!(1.0 - &a, Batch::from_vec(vec![0.0, -1.0, -2.0]));
    assert_eq!(6.0 / &a, Batch::from_vec(vec![6.0, 3.0, 2.0]));
    assert_eq!(-a, Batch::from_vec(vec![-1.0, -2.0, -3.0]));
}

#[test]
fn tile_and_repeat() {
    let b = Batch::from_vec(vec![1.0, 2.0]);

    assert_eq!(b.tile(3), Batch::from_vec(vec![1.0, 2.0, 1.0, 2.0, 1.0, 2.0]));
    assert_eq!(b.repeat_each(3), Batch::from_vec(vec![1.0, 1.0, 1.0, 2.0, 2.0, 2.0]));
}

#[test]
fn comparisons_produce_masks() {
    let a = Batch::from_vec(vec![1.0, 5.0, 3.0]);
    let b = Batch::from_vec(vec![2.0, 4.0, 3.0]);

    assert_eq!(a.lt(&b), Mask::from_vec(vec![true, false, false]));
    assert_eq!(a.gt_scalar(2.0), Mask::from_vec(vec![false, true, true]));
    assert_eq!(a.ge_scalar(3.0), Mask::from_vec(vec![false, true, true]));
    assert_eq!(a.lt_scalar(3.0), Mask::from_vec(vec![true, false, false]));
}

#[test]
fn infinity_is_not_finite() {
    let b = Batch::from_vec(vec![1.0, f64::INFINITY, 0.0]);

    assert_eq!(b.is_finite(), Mask::from_vec(vec![true, false, true]));
}

#[test]
fn mask_selection() {
    let m = Mask::from_vec(vec![true, false, true]);
    let a = Batch::from_vec(vec![1.0, 2.0, 3.0]);
    let b = Batch::from_vec(vec![9.0, 8.0, 7.0]);

    assert_eq!(m.select(&a, &b), Batch::from_vec(vec![1.0, 8.0, 3.0]));
    assert_eq!(m.select_or(&a, 0.5), Batch::from_vec(vec![1.0, 0.5, 3.0]));
    assert_eq!(m.to_batch(), Batch::from_vec(vec![1.0, 0.0, 1.0]));
}

#[test]
fn mask_logic() {
    let a = Mask::from_vec(vec![true, true, false]);
    let b = Mask::from_vec(vec![true, false, false]);

    assert_eq!(&a & &b, Mask::from_vec(vec![true, false, false]));
    assert_eq!(&a | &b, Mask::from_vec(vec![true, true, false]));
    assert_eq!(!&a, Mask::from_vec(vec![false, false, true]));
    assert!(a.any());
    assert_eq!(a.count(), 2);
}

#[test]
fn gather_compresses_lanes() {
    let b = Batch::from_vec(vec![1.0, 2.0, 3.0, 4.0]);
    let keep = Mask::from_vec(vec![true, false, false, true]);

    assert_eq!(b.gather(&keep), Batch::from_vec(vec![1.0, 4.0]));
}

#[test]
fn scatter_inverts_gather() {
    let slots = Mask::from_vec(vec![false, true, false, true]);
    let packed = Batch::from_vec(vec![7.0, 9.0]);
    let mut out = Batch::splat(0.0, 4);

    packed.scatter_into(&slots, &mut out);
    assert_eq!(out, Batch::from_vec(vec![0.0, 7.0, 0.0, 9.0]));
}

#[test]
fn map_operations() {
    let b = Batch::from_vec(vec![4.0, 9.0]);
    assert_eq!(b.sqrt(), Batch::from_vec(vec![2.0, 3.0]));

    let b = Batch::from_vec(vec![-1.5, 2.7]);
    assert_eq!(b.floor(), Batch::from_vec(vec![-2.0, 2.0]));
    assert_eq!(b.abs(), Batch::from_vec(vec![1.5, 2.7]));
    assert_eq!(b.max(0.0), Batch::from_vec(vec![0.0, 2.7]));
    assert_eq!(b.clamp(0.0, 1.0), Batch::from_vec(vec![0.0, 1.0]));

    let b = Batch::from_vec(vec![2.0, 3.0]);
    assert_eq!(b.powf(2.0), Batch::from_vec(vec![4.0, 9.0]));

    let b = Batch::from_vec(vec![-1.0, 5.0]);
    assert_eq!(b.rem_euclid(2.0), Batch::from_vec(vec![1.0, 1.0]));
}
