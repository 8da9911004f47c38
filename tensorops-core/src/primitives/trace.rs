use num_traits::Zero;

use super::scale_strided;
use super::BLOCK_ELEMS;
use crate::layout::loop_order;
use crate::layout::split_axis;
use crate::scalar::Coeff;
use crate::scalar::Scalar;
use crate::view::StridedView;
use crate::view::StridedViewMut;

/// C ← β·C + α·partial_trace(op(A)).
///
/// `strides_a` lists, per destination axis, the stride of the source axis
/// feeding it, followed by one entry per diagonal pair: the sum of the two
/// paired strides, so stepping one such axis walks the diagonal. `diag_dims`
/// are the matched extents. β is applied in a pass over C's own layout, then
/// the recursion accumulates; diagonal axes carry destination stride 0, so a
/// destination cell is revisited once per diagonal element.
pub(crate) fn trace_strided<T: Scalar>(
    alpha: Coeff<T>,
    a: &StridedView<'_, T>,
    strides_a: &[isize],
    diag_dims: &[usize],
    beta: Coeff<T>,
    c: &mut StridedViewMut<'_, T>,
) {
    scale_strided(beta, c);
    if matches!(alpha, Coeff::Zero) {
        return;
    }
    let mut dims: Vec<usize> = c.dims().to_vec();
    dims.extend_from_slice(diag_dims);
    if dims.iter().product::<usize>() == 0 {
        return;
    }
    let mut sc: Vec<isize> = c.strides().to_vec();
    sc.extend(std::iter::repeat(0).take(diag_dims.len()));

    let order = loop_order(&dims, &[&sc, strides_a]);
    let mut dims = order.dims.clone();
    let (sc, sa) = (&order.strides[0][..], &order.strides[1][..]);
    let ms = &order.min_strides[..];
    match alpha {
        Coeff::Zero => unreachable!(),
        Coeff::One => trace_rec(a, c, &mut dims, sa, sc, ms, 0, 0, |x| x),
        Coeff::Val(al) => trace_rec(a, c, &mut dims, sa, sc, ms, 0, 0, move |x| al * x),
    }
}

#[allow(clippy::too_many_arguments)]
fn trace_rec<T: Scalar, F: Fn(T) -> T + Copy>(
    a: &StridedView<'_, T>,
    c: &mut StridedViewMut<'_, T>,
    dims: &mut [usize],
    sa: &[isize],
    sc: &[isize],
    min_strides: &[usize],
    off_a: isize,
    off_c: isize,
    f: F,
) {
    let total: usize = dims.iter().product();
    if total <= BLOCK_ELEMS {
        trace_block(a, c, dims, sa, sc, off_a, off_c, f);
        return;
    }
    let k = split_axis(dims, min_strides);
    let d = dims[k];
    let d1 = d / 2;
    dims[k] = d1;
    trace_rec(a, c, dims, sa, sc, min_strides, off_a, off_c, f);
    dims[k] = d - d1;
    trace_rec(
        a,
        c,
        dims,
        sa,
        sc,
        min_strides,
        off_a + d1 as isize * sa[k],
        off_c + d1 as isize * sc[k],
        f,
    );
    dims[k] = d;
}

#[allow(clippy::too_many_arguments)]
fn trace_block<T: Scalar, F: Fn(T) -> T + Copy>(
    a: &StridedView<'_, T>,
    c: &mut StridedViewMut<'_, T>,
    dims: &[usize],
    sa: &[isize],
    sc: &[isize],
    off_a: isize,
    off_c: isize,
    f: F,
) {
    match dims.len() {
        0 => {
            let v = f(a.get(off_a));
            *c.at(off_c) += v;
        }
        1 => {
            if sc[0] == 0 {
                // diagonal axis innermost: sum in a register, fold once
                let mut acc = T::zero();
                let mut oa = off_a;
                for _ in 0..dims[0] {
                    acc += a.get(oa);
                    oa += sa[0];
                }
                *c.at(off_c) += f(acc);
            } else {
                let (mut oa, mut oc) = (off_a, off_c);
                for _ in 0..dims[0] {
                    let v = f(a.get(oa));
                    *c.at(oc) += v;
                    oa += sa[0];
                    oc += sc[0];
                }
            }
        }
        _ => {
            let (mut oa, mut oc) = (off_a, off_c);
            for _ in 0..dims[0] {
                trace_block(a, c, &dims[1..], &sa[1..], &sc[1..], oa, oc, f);
                oa += sa[0];
                oc += sc[0];
            }
        }
    }
}
