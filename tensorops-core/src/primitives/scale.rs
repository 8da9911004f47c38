use num_traits::Zero;

use super::BLOCK_ELEMS;
use crate::layout::loop_order;
use crate::layout::split_axis;
use crate::scalar::Coeff;
use crate::scalar::Scalar;
use crate::view::StridedViewMut;

/// C ← β·C over the destination's own layout. β = One is a no-op; the β = 0
/// pass writes zeros without reading C.
pub(crate) fn scale_strided<T: Scalar>(beta: Coeff<T>, c: &mut StridedViewMut<'_, T>) {
    if matches!(beta, Coeff::One) {
        return;
    }
    if c.dims().iter().product::<usize>() == 0 {
        return;
    }
    let order = loop_order(c.dims(), &[c.strides()]);
    let mut dims = order.dims.clone();
    let strides = &order.strides[0];
    match beta {
        Coeff::One => unreachable!(),
        Coeff::Zero => scale_rec(c, &mut dims, strides, &order.min_strides, 0, |x| {
            *x = T::zero()
        }),
        Coeff::Val(b) => scale_rec(c, &mut dims, strides, &order.min_strides, 0, |x| *x *= b),
    }
}

fn scale_rec<T: Scalar, F: Fn(&mut T) + Copy>(
    c: &mut StridedViewMut<'_, T>,
    dims: &mut [usize],
    strides: &[isize],
    min_strides: &[usize],
    off: isize,
    f: F,
) {
    let total: usize = dims.iter().product();
    if total <= BLOCK_ELEMS {
        scale_block(c, dims, strides, off, f);
        return;
    }
    let k = split_axis(dims, min_strides);
    let d = dims[k];
    let d1 = d / 2;
    dims[k] = d1;
    scale_rec(c, dims, strides, min_strides, off, f);
    dims[k] = d - d1;
    scale_rec(c, dims, strides, min_strides, off + d1 as isize * strides[k], f);
    dims[k] = d;
}

fn scale_block<T: Scalar, F: Fn(&mut T) + Copy>(
    c: &mut StridedViewMut<'_, T>,
    dims: &[usize],
    strides: &[isize],
    off: isize,
    f: F,
) {
    match dims.len() {
        0 => f(c.at(off)),
        1 => {
            let mut o = off;
            for _ in 0..dims[0] {
                f(c.at(o));
                o += strides[0];
            }
        }
        _ => {
            let mut o = off;
            for _ in 0..dims[0] {
                scale_block(c, &dims[1..], &strides[1..], o, f);
                o += strides[0];
            }
        }
    }
}
