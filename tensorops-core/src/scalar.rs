use std::fmt::Debug;

use num_complex::Complex32;
use num_complex::Complex64;
use num_traits::NumAssign;
use num_traits::One;
use num_traits::Zero;

/// Element types the kernels operate on: the real and complex floating kinds.
///
/// The trait is open; types without a gemm binding in the matrix backend are
/// still accepted everywhere, contraction just stays on the native strided
/// path for them.
pub trait Scalar:
    Copy + PartialEq + Debug + Send + Sync + NumAssign + 'static
{
    /// Complex conjugate; the identity on real kinds.
    fn conj(self) -> Self;
}

impl Scalar for f32 {
    fn conj(self) -> Self {
        self
    }
}

impl Scalar for f64 {
    fn conj(self) -> Self {
        self
    }
}

impl Scalar for Complex32 {
    fn conj(self) -> Self {
        Complex32::new(self.re, -self.im)
    }
}

impl Scalar for Complex64 {
    fn conj(self) -> Self {
        Complex64::new(self.re, -self.im)
    }
}

/// A scaling coefficient with the trivial values lifted into the type.
///
/// The kernels dispatch on the `(alpha, beta)` pair once per block, so the
/// innermost loops never multiply by one or add zero. Plain scalars normalize
/// on conversion, `Val` never holds 0 or 1 past a public entry point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coeff<T> {
    Zero,
    One,
    Val(T),
}

impl<T: Scalar> From<T> for Coeff<T> {
    fn from(t: T) -> Self {
        if t.is_zero() {
            Coeff::Zero
        } else if t.is_one() {
            Coeff::One
        } else {
            Coeff::Val(t)
        }
    }
}

impl<T: Scalar> Coeff<T> {
    /// Materializes the coefficient, for handing off to the matrix backend.
    pub fn value(self) -> T {
        match self {
            Coeff::Zero => T::zero(),
            Coeff::One => T::one(),
            Coeff::Val(t) => t,
        }
    }
}
