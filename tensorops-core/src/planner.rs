//! Top-level dispatch for contraction: route a call onto the matrix backend
//! when the element type has a gemm kernel, aliasing operands as matrices
//! where their axis groups fuse and permuting them through the add kernel
//! where they do not; otherwise fall through to the native strided loop.

use num_traits::One;
use num_traits::Zero;

use crate::gemm;
use crate::layout::col_major_strides;
use crate::layout::fuse_axes;
use crate::primitives::add_strided;
use crate::primitives::contract_strided;
use crate::primitives::scale_strided;
use crate::scalar::Coeff;
use crate::scalar::Scalar;
use crate::view::Conj;
use crate::view::StridedView;
use crate::view::StridedViewMut;

/// Contraction backend selector. `Auto` takes the library path whenever the
/// element type has a gemm kernel; either force variant pins the choice, and
/// `ForceLibraryGemm` on an uncovered element type falls back to native.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContractMethod {
    #[default]
    Auto,
    ForceNative,
    ForceLibraryGemm,
}

/// One contraction operand lowered to a matrix: either an alias of the
/// original strided memory or a fresh column-major copy kept alive here.
struct MatOperand<T> {
    _buf: Option<Vec<T>>,
    ptr: *const T,
    rs: isize,
    cs: isize,
    conj: Conj,
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn contract_dispatch<T: Scalar>(
    alpha: Coeff<T>,
    a: &StridedView<'_, T>,
    b: &StridedView<'_, T>,
    beta: Coeff<T>,
    c: &mut StridedViewMut<'_, T>,
    oind_a: &[usize],
    cind_a: &[usize],
    oind_b: &[usize],
    cind_b: &[usize],
    ind_c: &[usize],
    method: ContractMethod,
) {
    if matches!(alpha, Coeff::Zero) {
        scale_strided(beta, c);
        return;
    }
    let use_gemm = match method {
        ContractMethod::ForceNative => false,
        ContractMethod::Auto | ContractMethod::ForceLibraryGemm => gemm::supported::<T>(),
    };
    if use_gemm {
        log::trace!("contract: library gemm path ({:?})", method);
        gemm_contract(alpha, a, b, beta, c, oind_a, cind_a, oind_b, cind_b, ind_c);
    } else {
        log::trace!("contract: native strided path ({:?})", method);
        native_contract(alpha, a, b, beta, c, oind_a, cind_a, oind_b, cind_b, ind_c);
    }
}

/// Expands the index lists into per-axis strides over the loop space
/// [open_A..., open_B..., contracted...] and runs the recursive kernel.
#[allow(clippy::too_many_arguments)]
fn native_contract<T: Scalar>(
    alpha: Coeff<T>,
    a: &StridedView<'_, T>,
    b: &StridedView<'_, T>,
    beta: Coeff<T>,
    c: &mut StridedViewMut<'_, T>,
    oind_a: &[usize],
    cind_a: &[usize],
    oind_b: &[usize],
    cind_b: &[usize],
    ind_c: &[usize],
) {
    let (n_ao, n_bo, n_k) = (oind_a.len(), oind_b.len(), cind_a.len());
    let n_eff = n_ao + n_bo + n_k;
    let mut dims = vec![0usize; n_eff];
    let mut sa = vec![0isize; n_eff];
    let mut sb = vec![0isize; n_eff];
    let mut sc = vec![0isize; n_eff];
    for (p, &ax) in oind_a.iter().enumerate() {
        dims[p] = a.dims()[ax];
        sa[p] = a.strides()[ax];
    }
    for (i, &ax) in oind_b.iter().enumerate() {
        dims[n_ao + i] = b.dims()[ax];
        sb[n_ao + i] = b.strides()[ax];
    }
    for (j, (&ax_a, &ax_b)) in cind_a.iter().zip(cind_b).enumerate() {
        dims[n_ao + n_bo + j] = a.dims()[ax_a];
        sa[n_ao + n_bo + j] = a.strides()[ax_a];
        sb[n_ao + n_bo + j] = b.strides()[ax_b];
    }
    for (i, &p) in ind_c.iter().enumerate() {
        sc[p] = c.strides()[i];
    }
    contract_strided(alpha, a, &sa, b, &sb, beta, c, &sc, &dims);
}

#[allow(clippy::too_many_arguments)]
fn gemm_contract<T: Scalar>(
    alpha: Coeff<T>,
    a: &StridedView<'_, T>,
    b: &StridedView<'_, T>,
    beta: Coeff<T>,
    c: &mut StridedViewMut<'_, T>,
    oind_a: &[usize],
    cind_a: &[usize],
    oind_b: &[usize],
    cind_b: &[usize],
    ind_c: &[usize],
) {
    let olen_a: usize = oind_a.iter().map(|&k| a.dims()[k]).product();
    let olen_b: usize = oind_b.iter().map(|&k| b.dims()[k]).product();
    let clen: usize = cind_a.iter().map(|&k| a.dims()[k]).product();

    if olen_a == 0 || olen_b == 0 {
        return;
    }
    if clen == 0 {
        // the sum over contracted indices is empty
        scale_strided(beta, c);
        return;
    }

    // A as (olen_a x clen): rows open, columns contracted. B mirrored so the
    // product comes out (olen_a x olen_b).
    let mat_a = matrix_operand(a, oind_a, cind_a);
    let mat_b = matrix_operand(b, cind_b, oind_b);

    // The destination in open-axes-of-AB order; if both its groups fuse,
    // gemm writes straight into C with the caller's coefficients.
    let n_c = ind_c.len();
    let mut c_dims = vec![0usize; n_c];
    let mut c_strides = vec![0isize; n_c];
    for (i, &p) in ind_c.iter().enumerate() {
        c_dims[p] = c.dims()[i];
        c_strides[p] = c.strides()[i];
    }
    let row_group: Vec<usize> = (0..oind_a.len()).collect();
    let col_group: Vec<usize> = (oind_a.len()..n_c).collect();
    if let (Some((_, rsc)), Some((_, csc))) = (
        fuse_axes(&c_dims, &c_strides, &row_group),
        fuse_axes(&c_dims, &c_strides, &col_group),
    ) {
        log::trace!("contract: gemm writes destination directly");
        let ok = gemm::gemm(
            olen_a,
            clen,
            olen_b,
            alpha.value(),
            mat_a.ptr,
            mat_a.rs,
            mat_a.cs,
            mat_a.conj,
            mat_b.ptr,
            mat_b.rs,
            mat_b.cs,
            mat_b.conj,
            beta.value(),
            c.base_ptr_mut(),
            rsc,
            csc,
        );
        debug_assert!(ok);
        return;
    }

    // Otherwise gemm fills a column-major scratch with coefficients 1 and 0,
    // and the add kernel folds it into C with the caller's α, β and axis map.
    log::trace!("contract: gemm into scratch, folding into destination");
    let mut scratch = vec![T::zero(); olen_a * olen_b];
    let ok = gemm::gemm(
        olen_a,
        clen,
        olen_b,
        T::one(),
        mat_a.ptr,
        mat_a.rs,
        mat_a.cs,
        mat_a.conj,
        mat_b.ptr,
        mat_b.rs,
        mat_b.cs,
        mat_b.conj,
        T::zero(),
        scratch.as_mut_ptr(),
        1,
        olen_a as isize,
    );
    debug_assert!(ok);
    let scratch_strides = col_major_strides(&c_dims);
    let scratch_view = StridedView::new(&scratch, &c_dims, &scratch_strides, 0, Conj::Normal)
        .expect("scratch layout is dense");
    let sa_fold: Vec<isize> = ind_c.iter().map(|&p| scratch_strides[p]).collect();
    add_strided(alpha, &scratch_view, &sa_fold, beta, c);
}

/// Lowers one operand to a matrix with the given row and column axis groups.
/// When both groups fuse the matrix aliases the operand's memory and keeps
/// its conjugation flag for the backend; otherwise the operand is permuted
/// into a fresh column-major buffer, folding op(·) into the copy.
fn matrix_operand<T: Scalar>(
    v: &StridedView<'_, T>,
    rows: &[usize],
    cols: &[usize],
) -> MatOperand<T> {
    if let (Some((nr, rs)), Some((nc, cs))) = (
        fuse_axes(v.dims(), v.strides(), rows),
        fuse_axes(v.dims(), v.strides(), cols),
    ) {
        log::trace!("contract: aliasing operand as a {}x{} matrix", nr, nc);
        return MatOperand {
            _buf: None,
            ptr: v.base_ptr(),
            rs,
            cs,
            conj: v.conj(),
        };
    }

    let perm: Vec<usize> = rows.iter().chain(cols).copied().collect();
    let dims: Vec<usize> = perm.iter().map(|&k| v.dims()[k]).collect();
    let strides = col_major_strides(&dims);
    let nr: usize = rows.iter().map(|&k| v.dims()[k]).product();
    let nc: usize = cols.iter().map(|&k| v.dims()[k]).product();
    log::trace!(
        "contract: permuting operand into a {}x{} column-major copy",
        nr,
        nc
    );
    let mut buf = vec![T::zero(); dims.iter().product()];
    {
        let mut dst = StridedViewMut::new(&mut buf, &dims, &strides, 0)
            .expect("permute buffer layout is dense");
        let sa: Vec<isize> = perm.iter().map(|&k| v.strides()[k]).collect();
        add_strided(Coeff::One, v, &sa, Coeff::Zero, &mut dst);
    }
    let ptr = buf.as_ptr();
    MatOperand {
        _buf: Some(buf),
        ptr,
        rs: 1,
        cs: nr as isize,
        conj: Conj::Normal,
    }
}
