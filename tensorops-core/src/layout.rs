//! Axis-order selection for the recursive kernels, and the axis-group fusing
//! test the contraction planner uses to alias operands as matrices.

/// Column-major strides (first axis fastest) for a dense buffer of `dims`.
pub fn col_major_strides(dims: &[usize]) -> Vec<isize> {
    let mut strides = Vec::with_capacity(dims.len());
    let mut s: isize = 1;
    for &d in dims {
        strides.push(s);
        s *= d as isize;
    }
    strides
}

/// A loop space reordered for locality. Axis k of the output corresponds to
/// axis `order[k]` of the input space; the destination's smallest-stride axis
/// is innermost (last), ties broken by the source stride tuples in order.
pub(crate) struct LoopOrder {
    pub dims: Vec<usize>,
    /// One reordered stride tuple per operand, destination first.
    pub strides: Vec<Vec<isize>>,
    /// Smallest nonzero stride magnitude per axis across all operands; 0 when
    /// the axis moves no operand at all.
    pub min_strides: Vec<usize>,
}

/// Reorders a loop space over `dims`. `operands[0]` must be the destination
/// stride tuple; size-1 axes are dropped. Pure function of its inputs.
pub(crate) fn loop_order(dims: &[usize], operands: &[&[isize]]) -> LoopOrder {
    let mut axes: Vec<usize> = (0..dims.len()).filter(|&k| dims[k] != 1).collect();
    axes.sort_by(|&x, &y| {
        for set in operands {
            let (sx, sy) = (set[x].unsigned_abs(), set[y].unsigned_abs());
            if sx != sy {
                return sy.cmp(&sx);
            }
        }
        std::cmp::Ordering::Equal
    });

    let min_strides = axes
        .iter()
        .map(|&k| {
            operands
                .iter()
                .map(|set| set[k].unsigned_abs())
                .filter(|&s| s != 0)
                .min()
                .unwrap_or(0)
        })
        .collect();

    LoopOrder {
        dims: axes.iter().map(|&k| dims[k]).collect(),
        strides: operands
            .iter()
            .map(|set| axes.iter().map(|&k| set[k]).collect())
            .collect(),
        min_strides,
    }
}

/// The axis whose subdivision most shrinks the touched footprint: largest
/// `extent * min_stride` among axes of extent at least 2.
pub(crate) fn split_axis(dims: &[usize], min_strides: &[usize]) -> usize {
    let mut best = 0;
    let mut best_score = 0;
    for (k, (&d, &ms)) in dims.iter().zip(min_strides).enumerate() {
        if d < 2 {
            continue;
        }
        let score = d * ms.max(1);
        if score > best_score {
            best_score = score;
            best = k;
        }
    }
    best
}

/// Collapses an axis group into a single `(extent, stride)` pair when the
/// group addresses memory like one strided axis. The group's listed order is
/// the enumeration order, first axis fastest, and the strides must chain in
/// that order: `stride[next] == stride[prev] * dim[prev]`. Returns `None`
/// otherwise; the caller then has to materialize a permuted copy.
///
/// The listed order matters: contracted groups of two operands enumerate in
/// pairing order, and fusing against any other order would alias a layout
/// whose element order disagrees with the partner operand.
pub(crate) fn fuse_axes(
    dims: &[usize],
    strides: &[isize],
    group: &[usize],
) -> Option<(usize, isize)> {
    let extent: usize = group.iter().map(|&k| dims[k]).product();
    let active: Vec<usize> = group.iter().copied().filter(|&k| dims[k] > 1).collect();
    if active.is_empty() {
        return Some((extent, 0));
    }
    let inner = strides[active[0]];
    let mut expect = inner * dims[active[0]] as isize;
    for &k in &active[1..] {
        if strides[k] != expect {
            return None;
        }
        expect *= dims[k] as isize;
    }
    Some((extent, inner))
}
