//! Element-kind dispatch onto the matrix-multiply backend.
//!
//! matrixmultiply takes arbitrary row/column strides for all three matrices
//! and, for the complex kinds, a per-operand conjugation flag, so the planner
//! never has to transpose or conjugate anything itself.

use std::any::TypeId;

use matrixmultiply::cgemm;
use matrixmultiply::dgemm;
use matrixmultiply::sgemm;
use matrixmultiply::zgemm;
use matrixmultiply::CGemmOption;
use num_complex::Complex32;
use num_complex::Complex64;

use crate::scalar::Scalar;
use crate::view::Conj;

/// Whether `T` has a gemm kernel in the backend.
pub(crate) fn supported<T: Scalar>() -> bool {
    let t = TypeId::of::<T>();
    t == TypeId::of::<f32>()
        || t == TypeId::of::<f64>()
        || t == TypeId::of::<Complex32>()
        || t == TypeId::of::<Complex64>()
}

/// C ← β·C + α·op(A)·op(B) on (m×k)·(k×n) matrices with element strides
/// (rs, cs) per operand. Returns false when `T` has no gemm kernel.
///
/// Safety: callers guarantee every index (i, j) within the given extents
/// stays inside the allocations behind the three pointers, and that C
/// overlaps neither source.
#[allow(clippy::too_many_arguments)]
pub(crate) fn gemm<T: Scalar>(
    m: usize,
    k: usize,
    n: usize,
    alpha: T,
    a: *const T,
    rsa: isize,
    csa: isize,
    conj_a: Conj,
    b: *const T,
    rsb: isize,
    csb: isize,
    conj_b: Conj,
    beta: T,
    c: *mut T,
    rsc: isize,
    csc: isize,
) -> bool {
    let t = TypeId::of::<T>();
    unsafe {
        if t == TypeId::of::<f32>() {
            sgemm(
                m,
                k,
                n,
                cast::<T, f32>(alpha),
                a as *const f32,
                rsa,
                csa,
                b as *const f32,
                rsb,
                csb,
                cast::<T, f32>(beta),
                c as *mut f32,
                rsc,
                csc,
            );
            true
        } else if t == TypeId::of::<f64>() {
            dgemm(
                m,
                k,
                n,
                cast::<T, f64>(alpha),
                a as *const f64,
                rsa,
                csa,
                b as *const f64,
                rsb,
                csb,
                cast::<T, f64>(beta),
                c as *mut f64,
                rsc,
                csc,
            );
            true
        } else if t == TypeId::of::<Complex32>() {
            let al = cast::<T, Complex32>(alpha);
            let be = cast::<T, Complex32>(beta);
            cgemm(
                flag(conj_a),
                flag(conj_b),
                m,
                k,
                n,
                [al.re, al.im],
                a as *const [f32; 2],
                rsa,
                csa,
                b as *const [f32; 2],
                rsb,
                csb,
                [be.re, be.im],
                c as *mut [f32; 2],
                rsc,
                csc,
            );
            true
        } else if t == TypeId::of::<Complex64>() {
            let al = cast::<T, Complex64>(alpha);
            let be = cast::<T, Complex64>(beta);
            zgemm(
                flag(conj_a),
                flag(conj_b),
                m,
                k,
                n,
                [al.re, al.im],
                a as *const [f64; 2],
                rsa,
                csa,
                b as *const [f64; 2],
                rsb,
                csb,
                [be.re, be.im],
                c as *mut [f64; 2],
                rsc,
                csc,
            );
            true
        } else {
            false
        }
    }
}

fn flag(conj: Conj) -> CGemmOption {
    match conj {
        Conj::Normal => CGemmOption::Standard,
        Conj::Conjugated => CGemmOption::Conjugate,
    }
}

/// Reinterprets a value whose type has already been checked by `TypeId`.
unsafe fn cast<T: 'static, U: 'static + Copy>(v: T) -> U {
    debug_assert_eq!(TypeId::of::<T>(), TypeId::of::<U>());
    std::ptr::read(&v as *const T as *const U)
}
