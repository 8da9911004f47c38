use super::scale_strided;
use super::BLOCK_ELEMS;
use crate::layout::loop_order;
use crate::layout::split_axis;
use crate::scalar::Coeff;
use crate::scalar::Scalar;
use crate::view::StridedView;
use crate::view::StridedViewMut;

/// C ← β·C + α·op(permute(A)).
///
/// `strides_a` must already be permuted into destination axis order; shape
/// agreement is the caller's business. The `(α, β)` pair picks one of six
/// compiled loop bodies, and the α = 0 paths never touch A.
pub(crate) fn add_strided<T: Scalar>(
    alpha: Coeff<T>,
    a: &StridedView<'_, T>,
    strides_a: &[isize],
    beta: Coeff<T>,
    c: &mut StridedViewMut<'_, T>,
) {
    if matches!(alpha, Coeff::Zero) {
        scale_strided(beta, c);
        return;
    }
    if c.dims().iter().product::<usize>() == 0 {
        return;
    }
    let order = loop_order(c.dims(), &[c.strides(), strides_a]);
    let mut dims = order.dims.clone();
    let (sc, sa) = (&order.strides[0][..], &order.strides[1][..]);
    let ms = &order.min_strides[..];
    match (alpha, beta) {
        (Coeff::Zero, _) => unreachable!(),
        (Coeff::One, Coeff::Zero) => {
            add_rec(a, c, &mut dims, sa, sc, ms, 0, 0, |c, a| *c = a)
        }
        (Coeff::One, Coeff::One) => {
            add_rec(a, c, &mut dims, sa, sc, ms, 0, 0, |c, a| *c += a)
        }
        (Coeff::One, Coeff::Val(b)) => {
            add_rec(a, c, &mut dims, sa, sc, ms, 0, 0, move |c, a| *c = b * *c + a)
        }
        (Coeff::Val(al), Coeff::Zero) => {
            add_rec(a, c, &mut dims, sa, sc, ms, 0, 0, move |c, a| *c = al * a)
        }
        (Coeff::Val(al), Coeff::One) => {
            add_rec(a, c, &mut dims, sa, sc, ms, 0, 0, move |c, a| *c += al * a)
        }
        (Coeff::Val(al), Coeff::Val(b)) => add_rec(a, c, &mut dims, sa, sc, ms, 0, 0, move |c, a| {
            *c = b * *c + al * a
        }),
    }
}

#[allow(clippy::too_many_arguments)]
fn add_rec<T: Scalar, F: Fn(&mut T, T) + Copy>(
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
        add_block(a, c, dims, sa, sc, off_a, off_c, f);
        return;
    }
    let k = split_axis(dims, min_strides);
    let d = dims[k];
    let d1 = d / 2;
    dims[k] = d1;
    add_rec(a, c, dims, sa, sc, min_strides, off_a, off_c, f);
    dims[k] = d - d1;
    add_rec(
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
fn add_block<T: Scalar, F: Fn(&mut T, T) + Copy>(
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
        0 => f(c.at(off_c), a.get(off_a)),
        1 => {
            let (mut oa, mut oc) = (off_a, off_c);
            for _ in 0..dims[0] {
                f(c.at(oc), a.get(oa));
                oa += sa[0];
                oc += sc[0];
            }
        }
        _ => {
            let (mut oa, mut oc) = (off_a, off_c);
            for _ in 0..dims[0] {
                add_block(a, c, &dims[1..], &sa[1..], &sc[1..], oa, oc, f);
                oa += sa[0];
                oc += sc[0];
            }
        }
    }
}
