use num_traits::Zero;

use super::scale_strided;
use super::BLOCK_ELEMS;
use crate::layout::loop_order;
use crate::layout::split_axis;
use crate::scalar::Coeff;
use crate::scalar::Scalar;
use crate::view::StridedView;
use crate::view::StridedViewMut;

/// C ← β·C + α·Σ op(A)·op(B), the native strided fallback for element types
/// the matrix backend does not cover (and for `ForceNative`).
///
/// The loop space is [open_A..., open_B..., contracted...]; `strides_*` give
/// each operand's stride per loop axis, zero where the operand does not move.
/// β is applied in a pass over C's own layout, then the recursion
/// accumulates partial products.
#[allow(clippy::too_many_arguments)]
pub(crate) fn contract_strided<T: Scalar>(
    alpha: Coeff<T>,
    a: &StridedView<'_, T>,
    strides_a: &[isize],
    b: &StridedView<'_, T>,
    strides_b: &[isize],
    beta: Coeff<T>,
    c: &mut StridedViewMut<'_, T>,
    strides_c: &[isize],
    dims: &[usize],
) {
    scale_strided(beta, c);
    if matches!(alpha, Coeff::Zero) {
        return;
    }
    if dims.iter().product::<usize>() == 0 {
        // some extent is zero: either C is empty or the contracted sum is
        return;
    }
    let order = loop_order(dims, &[strides_c, strides_a, strides_b]);
    let mut dims = order.dims.clone();
    let (sc, sa, sb) = (
        &order.strides[0][..],
        &order.strides[1][..],
        &order.strides[2][..],
    );
    let ms = &order.min_strides[..];
    match alpha {
        Coeff::Zero => unreachable!(),
        Coeff::One => contract_rec(a, b, c, &mut dims, sa, sb, sc, ms, 0, 0, 0, |x| x),
        Coeff::Val(al) => {
            contract_rec(a, b, c, &mut dims, sa, sb, sc, ms, 0, 0, 0, move |x| al * x)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn contract_rec<T: Scalar, F: Fn(T) -> T + Copy>(
    a: &StridedView<'_, T>,
    b: &StridedView<'_, T>,
    c: &mut StridedViewMut<'_, T>,
    dims: &mut [usize],
    sa: &[isize],
    sb: &[isize],
    sc: &[isize],
    min_strides: &[usize],
    off_a: isize,
    off_b: isize,
    off_c: isize,
    f: F,
) {
    let total: usize = dims.iter().product();
    if total <= BLOCK_ELEMS {
        contract_block(a, b, c, dims, sa, sb, sc, off_a, off_b, off_c, f);
        return;
    }
    let k = split_axis(dims, min_strides);
    let d = dims[k];
    let d1 = d / 2;
    dims[k] = d1;
    contract_rec(a, b, c, dims, sa, sb, sc, min_strides, off_a, off_b, off_c, f);
    dims[k] = d - d1;
    contract_rec(
        a,
        b,
        c,
        dims,
        sa,
        sb,
        sc,
        min_strides,
        off_a + d1 as isize * sa[k],
        off_b + d1 as isize * sb[k],
        off_c + d1 as isize * sc[k],
        f,
    );
    dims[k] = d;
}

#[allow(clippy::too_many_arguments)]
fn contract_block<T: Scalar, F: Fn(T) -> T + Copy>(
    a: &StridedView<'_, T>,
    b: &StridedView<'_, T>,
    c: &mut StridedViewMut<'_, T>,
    dims: &[usize],
    sa: &[isize],
    sb: &[isize],
    sc: &[isize],
    off_a: isize,
    off_b: isize,
    off_c: isize,
    f: F,
) {
    match dims.len() {
        0 => {
            let v = f(a.get(off_a) * b.get(off_b));
            *c.at(off_c) += v;
        }
        1 => {
            if sc[0] == 0 {
                // contracted axis innermost: sum in a register, fold once
                let mut acc = T::zero();
                let (mut oa, mut ob) = (off_a, off_b);
                for _ in 0..dims[0] {
                    acc += a.get(oa) * b.get(ob);
                    oa += sa[0];
                    ob += sb[0];
                }
                *c.at(off_c) += f(acc);
            } else {
                let (mut oa, mut ob, mut oc) = (off_a, off_b, off_c);
                for _ in 0..dims[0] {
                    let v = f(a.get(oa) * b.get(ob));
                    *c.at(oc) += v;
                    oa += sa[0];
                    ob += sb[0];
                    oc += sc[0];
                }
            }
        }
        _ => {
            let (mut oa, mut ob, mut oc) = (off_a, off_b, off_c);
            for _ in 0..dims[0] {
                contract_block(
                    a,
                    b,
                    c,
                    &dims[1..],
                    &sa[1..],
                    &sb[1..],
                    &sc[1..],
                    oa,
                    ob,
                    oc,
                    f,
                );
                oa += sa[0];
                ob += sb[0];
                oc += sc[0];
            }
        }
    }
}
