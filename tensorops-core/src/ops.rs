//! Public entry points. Every call validates its index maps and extents
//! before any write; malformed calls come back as `ShapeMismatch` with the
//! destination untouched.

use crate::error::ErrorKind;
use crate::error::Result;
use crate::planner;
use crate::planner::ContractMethod;
use crate::primitives::add_strided;
use crate::primitives::trace_strided;
use crate::scalar::Coeff;
use crate::scalar::Scalar;
use crate::view::StridedView;
use crate::view::StridedViewMut;

/// C ← β·C + α·op(permute(A, ind_c_in_a)).
///
/// `ind_c_in_a[i]` names the axis of A feeding destination axis `i`; it must
/// be a permutation of A's axes. With α = 0 the source is never read.
pub fn add<T: Scalar>(
    alpha: impl Into<Coeff<T>>,
    a: &StridedView<'_, T>,
    beta: impl Into<Coeff<T>>,
    c: &mut StridedViewMut<'_, T>,
    ind_c_in_a: &[usize],
) -> Result<()> {
    let (alpha, beta) = (alpha.into(), beta.into());
    require_permutation("add", ind_c_in_a, a.rank())?;
    require_rank("add", c.rank(), ind_c_in_a.len())?;
    for (i, &ax) in ind_c_in_a.iter().enumerate() {
        require_extent("add", i, c.dims()[i], a.dims()[ax])?;
    }
    if matches!(alpha, Coeff::Zero) && matches!(beta, Coeff::One) {
        return Ok(());
    }
    let sa: Vec<isize> = ind_c_in_a.iter().map(|&ax| a.strides()[ax]).collect();
    add_strided(alpha, a, &sa, beta, c);
    Ok(())
}

/// C ← β·C + α·partial_trace(op(A)).
///
/// `cind_a1[j]` and `cind_a2[j]` are traced against each other; together with
/// `ind_c_in_a` the three lists must cover every axis of A exactly once, and
/// each traced pair must have equal extents.
pub fn trace<T: Scalar>(
    alpha: impl Into<Coeff<T>>,
    a: &StridedView<'_, T>,
    beta: impl Into<Coeff<T>>,
    c: &mut StridedViewMut<'_, T>,
    ind_c_in_a: &[usize],
    cind_a1: &[usize],
    cind_a2: &[usize],
) -> Result<()> {
    let (alpha, beta) = (alpha.into(), beta.into());
    if cind_a1.len() != cind_a2.len() {
        return Err((
            ErrorKind::ShapeMismatch,
            format!(
                "trace: {} first-trace axes vs {} second-trace axes",
                cind_a1.len(),
                cind_a2.len()
            ),
        )
            .into());
    }
    let all: Vec<usize> = ind_c_in_a
        .iter()
        .chain(cind_a1)
        .chain(cind_a2)
        .copied()
        .collect();
    require_permutation("trace", &all, a.rank())?;
    require_rank("trace", c.rank(), ind_c_in_a.len())?;
    for (j, (&x, &y)) in cind_a1.iter().zip(cind_a2).enumerate() {
        if a.dims()[x] != a.dims()[y] {
            return Err((
                ErrorKind::ShapeMismatch,
                format!(
                    "trace: traced pair {} has extents {} and {}",
                    j,
                    a.dims()[x],
                    a.dims()[y]
                ),
            )
                .into());
        }
    }
    for (i, &ax) in ind_c_in_a.iter().enumerate() {
        require_extent("trace", i, c.dims()[i], a.dims()[ax])?;
    }
    if matches!(alpha, Coeff::Zero) && matches!(beta, Coeff::One) {
        return Ok(());
    }
    let mut sa: Vec<isize> = ind_c_in_a.iter().map(|&ax| a.strides()[ax]).collect();
    sa.extend(
        cind_a1
            .iter()
            .zip(cind_a2)
            .map(|(&x, &y)| a.strides()[x] + a.strides()[y]),
    );
    let diag_dims: Vec<usize> = cind_a1.iter().map(|&x| a.dims()[x]).collect();
    trace_strided(alpha, a, &sa, &diag_dims, beta, c);
    Ok(())
}

/// C ← β·C + α·Σ op(A)·op(B) over the paired contracted axes.
///
/// `oind_a`/`cind_a` partition A's axes into open and contracted, likewise
/// `oind_b`/`cind_b` for B; `ind_c_in_o_ab[i]` names the position, in the
/// concatenation [open_A..., open_B...], feeding destination axis `i`.
#[allow(clippy::too_many_arguments)]
pub fn contract<T: Scalar>(
    alpha: impl Into<Coeff<T>>,
    a: &StridedView<'_, T>,
    b: &StridedView<'_, T>,
    beta: impl Into<Coeff<T>>,
    c: &mut StridedViewMut<'_, T>,
    oind_a: &[usize],
    cind_a: &[usize],
    oind_b: &[usize],
    cind_b: &[usize],
    ind_c_in_o_ab: &[usize],
    method: ContractMethod,
) -> Result<()> {
    let (alpha, beta) = (alpha.into(), beta.into());
    let all_a: Vec<usize> = oind_a.iter().chain(cind_a).copied().collect();
    require_permutation("contract", &all_a, a.rank())?;
    let all_b: Vec<usize> = oind_b.iter().chain(cind_b).copied().collect();
    require_permutation("contract", &all_b, b.rank())?;
    if cind_a.len() != cind_b.len() {
        return Err((
            ErrorKind::ShapeMismatch,
            format!(
                "contract: {} contracted axes on A vs {} on B",
                cind_a.len(),
                cind_b.len()
            ),
        )
            .into());
    }
    for (j, (&x, &y)) in cind_a.iter().zip(cind_b).enumerate() {
        if a.dims()[x] != b.dims()[y] {
            return Err((
                ErrorKind::ShapeMismatch,
                format!(
                    "contract: contracted pair {} has extents {} and {}",
                    j,
                    a.dims()[x],
                    b.dims()[y]
                ),
            )
                .into());
        }
    }
    require_permutation("contract", ind_c_in_o_ab, oind_a.len() + oind_b.len())?;
    require_rank("contract", c.rank(), ind_c_in_o_ab.len())?;
    for (i, &p) in ind_c_in_o_ab.iter().enumerate() {
        let open = if p < oind_a.len() {
            a.dims()[oind_a[p]]
        } else {
            b.dims()[oind_b[p - oind_a.len()]]
        };
        require_extent("contract", i, c.dims()[i], open)?;
    }
    if matches!(alpha, Coeff::Zero) && matches!(beta, Coeff::One) {
        return Ok(());
    }
    planner::contract_dispatch(
        alpha, a, b, beta, c, oind_a, cind_a, oind_b, cind_b, ind_c_in_o_ab, method,
    );
    Ok(())
}

/// The single element of a rank-0 view, read at the view's base offset
/// (index 0 of the backing layout).
pub fn scalar<T: Scalar>(a: &StridedView<'_, T>) -> Result<T> {
    if a.rank() != 0 {
        return Err((
            ErrorKind::ShapeMismatch,
            format!("scalar: expected a rank-0 view, got rank {}", a.rank()),
        )
            .into());
    }
    Ok(a.get(0))
}

fn require_permutation(op: &str, ind: &[usize], rank: usize) -> Result<()> {
    let mut seen = vec![false; rank];
    let mut ok = ind.len() == rank;
    if ok {
        for &ax in ind {
            if ax >= rank || seen[ax] {
                ok = false;
                break;
            }
            seen[ax] = true;
        }
    }
    if !ok {
        return Err((
            ErrorKind::ShapeMismatch,
            format!(
                "{}: index map {:?} is not a permutation of 0..{}",
                op, ind, rank
            ),
        )
            .into());
    }
    Ok(())
}

fn require_rank(op: &str, got: usize, want: usize) -> Result<()> {
    if got != want {
        return Err((
            ErrorKind::ShapeMismatch,
            format!(
                "{}: destination is rank {} but the index map implies {}",
                op, got, want
            ),
        )
            .into());
    }
    Ok(())
}

fn require_extent(op: &str, axis: usize, got: usize, want: usize) -> Result<()> {
    if got != want {
        return Err((
            ErrorKind::ShapeMismatch,
            format!(
                "{}: destination axis {} has extent {} but the sources give {}",
                op, axis, got, want
            ),
        )
            .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use num_complex::Complex64;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::ErrorKind;
    use crate::view::Conj;

    #[test]
    fn test_add_transpose() -> Result<()> {
        // row-major [[1, 2], [3, 4]] into its transpose
        let a_data = vec![1.0, 2.0, 3.0, 4.0];
        let a = StridedView::new(&a_data, &[2, 2], &[2, 1], 0, Conj::Normal)?;
        let mut c_data = vec![0.0; 4];
        let mut c = StridedViewMut::new(&mut c_data, &[2, 2], &[2, 1], 0)?;
        add(1.0, &a, 0.0, &mut c, &[1, 0])?;
        assert_eq!(c_data, vec![1.0, 3.0, 2.0, 4.0]);
        Ok(())
    }

    #[test]
    fn test_add_roundtrip_is_identity() -> Result<()> {
        let a_data: Vec<f64> = (0..24).map(|i| (i as f64).sin()).collect();
        let a = StridedView::col_major(&a_data, &[2, 3, 4])?;
        let mut c_data = vec![0.0; 24];
        {
            let mut c = StridedViewMut::col_major(&mut c_data, &[4, 2, 3])?;
            add(1.0, &a, 0.0, &mut c, &[2, 0, 1])?;
        }
        let c = StridedView::col_major(&c_data, &[4, 2, 3])?;
        let mut back_data = vec![0.0; 24];
        {
            let mut back = StridedViewMut::col_major(&mut back_data, &[2, 3, 4])?;
            add(1.0, &c, 0.0, &mut back, &[1, 2, 0])?;
        }
        assert_eq!(back_data, a_data);
        Ok(())
    }

    #[test]
    fn test_add_scaling_law() -> Result<()> {
        let a_data = vec![1.5, -2.0, 0.25];
        let a = StridedView::col_major(&a_data, &[3])?;
        let mut once = vec![0.0; 3];
        {
            let mut c = StridedViewMut::col_major(&mut once, &[3])?;
            add(2.5, &a, 0.0, &mut c, &[0])?;
        }
        let mut unit = vec![0.0; 3];
        {
            let mut c = StridedViewMut::col_major(&mut unit, &[3])?;
            add(1.0, &a, 0.0, &mut c, &[0])?;
        }
        for (x, y) in once.iter().zip(&unit) {
            assert_eq!(*x, 2.5 * y);
        }
        Ok(())
    }

    #[test]
    fn test_add_conjugated_complex() -> Result<()> {
        let a_data = vec![Complex64::new(1.0, 2.0), Complex64::new(3.0, -1.0)];
        let a = StridedView::col_major(&a_data, &[2])?.conjugated();
        let mut c_data = vec![Complex64::new(0.0, 0.0); 2];
        let mut c = StridedViewMut::col_major(&mut c_data, &[2])?;
        add(Complex64::new(1.0, 0.0), &a, Complex64::new(0.0, 0.0), &mut c, &[0])?;
        assert_eq!(
            c_data,
            vec![Complex64::new(1.0, -2.0), Complex64::new(3.0, 1.0)]
        );
        Ok(())
    }

    #[test]
    fn test_add_alpha_zero_beta_one_is_noop() -> Result<()> {
        let a_data = vec![f64::NAN; 4];
        let a = StridedView::col_major(&a_data, &[2, 2])?;
        let mut c_data = vec![1.0, 2.0, 3.0, 4.0];
        let mut c = StridedViewMut::col_major(&mut c_data, &[2, 2])?;
        add(0.0, &a, 1.0, &mut c, &[0, 1])?;
        assert_eq!(c_data, vec![1.0, 2.0, 3.0, 4.0]);
        Ok(())
    }

    #[test]
    fn test_add_rejects_bad_permutation() {
        let a_data = vec![0.0; 4];
        let a = StridedView::col_major(&a_data, &[2, 2]).unwrap();
        let mut c_data = vec![7.0; 4];
        let mut c = StridedViewMut::col_major(&mut c_data, &[2, 2]).unwrap();
        let err = add(1.0, &a, 0.0, &mut c, &[0, 0]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ShapeMismatch);
        // rejected before any write
        assert_eq!(c_data, vec![7.0; 4]);
    }

    #[test]
    fn test_add_rejects_extent_mismatch() {
        let a_data = vec![0.0; 6];
        let a = StridedView::col_major(&a_data, &[2, 3]).unwrap();
        let mut c_data = vec![0.0; 6];
        let mut c = StridedViewMut::col_major(&mut c_data, &[2, 3]).unwrap();
        // the transpose would be (3, 2)
        assert!(add(1.0, &a, 0.0, &mut c, &[1, 0]).is_err());
    }

    #[test]
    fn test_trace_matrix_diagonal() -> Result<()> {
        let a_data: Vec<f64> = (1..=9).map(|i| i as f64).collect();
        // column-major 3x3: diagonal 1, 5, 9
        let a = StridedView::col_major(&a_data, &[3, 3])?;
        let mut c_data = vec![0.0];
        let mut c = StridedViewMut::new(&mut c_data, &[], &[], 0)?;
        trace(1.0, &a, 0.0, &mut c, &[], &[0], &[1])?;
        assert_eq!(scalar(&StridedView::col_major(&c_data, &[])?)?, 15.0);
        Ok(())
    }

    #[test]
    fn test_trace_partial_keeps_open_axis() -> Result<()> {
        // A[i, j, k] = i + 2j + 4k on (2, 2, 2): C[j] = 5 + 4j
        let a_data: Vec<f64> = (0..8).map(|i| i as f64).collect();
        let a = StridedView::col_major(&a_data, &[2, 2, 2])?;
        let mut c_data = vec![0.0; 2];
        let mut c = StridedViewMut::col_major(&mut c_data, &[2])?;
        trace(1.0, &a, 0.0, &mut c, &[1], &[0], &[2])?;
        assert_eq!(c_data, vec![5.0, 9.0]);
        Ok(())
    }

    #[test]
    fn test_trace_conjugated_complex() -> Result<()> {
        // diagonal i and 2 - 3i: conj(i) + conj(2 - 3i) = 2 + 2i
        let a_data = vec![
            Complex64::new(0.0, 1.0),
            Complex64::new(5.0, 5.0),
            Complex64::new(-3.0, 0.5),
            Complex64::new(2.0, -3.0),
        ];
        let a = StridedView::col_major(&a_data, &[2, 2])?.conjugated();
        let mut c_data = vec![Complex64::new(0.0, 0.0)];
        let mut c = StridedViewMut::new(&mut c_data, &[], &[], 0)?;
        trace(
            Complex64::new(1.0, 0.0),
            &a,
            Complex64::new(0.0, 0.0),
            &mut c,
            &[],
            &[0],
            &[1],
        )?;
        assert_eq!(c_data, vec![Complex64::new(2.0, 2.0)]);
        Ok(())
    }

    #[test]
    fn test_trace_rejects_unequal_pair() {
        let a_data = vec![0.0; 6];
        let a = StridedView::col_major(&a_data, &[2, 3]).unwrap();
        let mut c_data = vec![0.0];
        let mut c = StridedViewMut::new(&mut c_data, &[], &[], 0).unwrap();
        let err = trace(1.0, &a, 0.0, &mut c, &[], &[0], &[1]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ShapeMismatch);
    }

    #[test]
    fn test_trace_rejects_overlapping_lists() {
        let a_data = vec![0.0; 8];
        let a = StridedView::col_major(&a_data, &[2, 2, 2]).unwrap();
        let mut c_data = vec![0.0; 2];
        let mut c = StridedViewMut::col_major(&mut c_data, &[2]).unwrap();
        assert!(trace(1.0, &a, 0.0, &mut c, &[0], &[0], &[2]).is_err());
    }

    #[test]
    fn test_contract_matmul_both_methods() -> Result<()> {
        let a_data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let b_data = vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        let a = StridedView::new(&a_data, &[2, 3], &[3, 1], 0, Conj::Normal)?;
        let b = StridedView::new(&b_data, &[3, 2], &[2, 1], 0, Conj::Normal)?;
        for method in [ContractMethod::ForceNative, ContractMethod::ForceLibraryGemm] {
            let mut c_data = vec![0.0; 4];
            let mut c = StridedViewMut::new(&mut c_data, &[2, 2], &[2, 1], 0)?;
            contract(
                1.0, &a, &b, 0.0, &mut c, &[0], &[1], &[1], &[0], &[0, 1], method,
            )?;
            assert_eq!(c_data, vec![58.0, 64.0, 139.0, 154.0]);
        }
        Ok(())
    }

    #[test]
    fn test_contract_outer_product_permuted() -> Result<()> {
        let a_data = vec![2.0, 3.0];
        let b_data = vec![5.0, 7.0, 11.0];
        let a = StridedView::col_major(&a_data, &[2])?;
        let b = StridedView::col_major(&b_data, &[3])?;
        let mut c_data = vec![0.0; 6];
        let mut c = StridedViewMut::col_major(&mut c_data, &[3, 2])?;
        contract(
            1.0,
            &a,
            &b,
            0.0,
            &mut c,
            &[0],
            &[],
            &[0],
            &[],
            &[1, 0],
            ContractMethod::Auto,
        )?;
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(c_data[j + 3 * i], a_data[i] * b_data[j]);
            }
        }
        Ok(())
    }

    #[test]
    fn test_contract_rejects_mismatched_contracted_extents() {
        let a_data = vec![0.0; 6];
        let a = StridedView::col_major(&a_data, &[2, 3]).unwrap();
        let b_data = vec![0.0; 8];
        let b = StridedView::col_major(&b_data, &[4, 2]).unwrap();
        let mut c_data = vec![0.0; 4];
        let mut c = StridedViewMut::col_major(&mut c_data, &[2, 2]).unwrap();
        let err = contract(
            1.0,
            &a,
            &b,
            0.0,
            &mut c,
            &[0],
            &[1],
            &[1],
            &[0],
            &[0, 1],
            ContractMethod::Auto,
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ShapeMismatch);
    }

    #[test]
    fn test_contract_rank0_is_dot() -> Result<()> {
        let a_data = vec![1.0, 2.0, 3.0];
        let b_data = vec![4.0, 5.0, 6.0];
        let a = StridedView::col_major(&a_data, &[3])?;
        let b = StridedView::col_major(&b_data, &[3])?;
        let mut c_data = vec![0.0];
        let mut c = StridedViewMut::new(&mut c_data, &[], &[], 0)?;
        contract(
            1.0,
            &a,
            &b,
            0.0,
            &mut c,
            &[],
            &[0],
            &[],
            &[0],
            &[],
            ContractMethod::Auto,
        )?;
        assert_eq!(c_data, vec![32.0]);
        Ok(())
    }

    #[test]
    fn test_scalar_of_rank0() -> Result<()> {
        let data = vec![42.0f32];
        let v = StridedView::new(&data, &[], &[], 0, Conj::Normal)?;
        assert_eq!(scalar(&v)?, 42.0);
        let w = StridedView::col_major(&data, &[1])?;
        assert!(scalar(&w).is_err());
        Ok(())
    }
}
