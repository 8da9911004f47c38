use crate::error::ErrorKind;
use crate::error::Result;
use crate::scalar::Scalar;

/// Whether reads of an operand go through the complex conjugate.
///
/// Carried on the source view rather than applied as a separate pass: a
/// conjugating read is one sign flip on the imaginary lane. On real element
/// types the flag is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conj {
    Normal,
    Conjugated,
}

/// Non-owning read descriptor over strided memory: a backing slice, the
/// position of the all-zeros multi-index, one stride per axis (in elements,
/// possibly negative or zero), and the conjugation flag.
///
/// Construction checks that every reachable multi-index stays inside the
/// backing slice; the kernels then index without further bounds reasoning.
#[derive(Debug)]
pub struct StridedView<'a, T> {
    data: &'a [T],
    offset: usize,
    dims: Vec<usize>,
    strides: Vec<isize>,
    conj: Conj,
}

/// Mutable destination descriptor. Destinations are never conjugated, and
/// zero strides are rejected since they would alias distinct indices onto
/// one cell.
#[derive(Debug)]
pub struct StridedViewMut<'a, T> {
    data: &'a mut [T],
    offset: usize,
    dims: Vec<usize>,
    strides: Vec<isize>,
}

fn require_in_bounds(
    what: &str,
    len: usize,
    dims: &[usize],
    strides: &[isize],
    offset: usize,
    writable: bool,
) -> Result<()> {
    if dims.len() != strides.len() {
        return Err((
            ErrorKind::ShapeMismatch,
            format!(
                "{}: {} dims but {} strides",
                what,
                dims.len(),
                strides.len()
            ),
        )
            .into());
    }
    if dims.iter().any(|&d| d == 0) {
        // no reachable cells
        return Ok(());
    }
    let mut lo = offset as isize;
    let mut hi = offset as isize;
    for (&d, &s) in dims.iter().zip(strides) {
        if writable && s == 0 && d > 1 {
            return Err((
                ErrorKind::ShapeMismatch,
                format!("{}: zero stride on an axis of extent {}", what, d),
            )
                .into());
        }
        let span = s * (d as isize - 1);
        if span >= 0 {
            hi += span;
        } else {
            lo += span;
        }
    }
    if lo < 0 || hi >= len as isize {
        return Err((
            ErrorKind::ShapeMismatch,
            format!(
                "{}: dims {:?} with strides {:?} at offset {} reach [{}, {}] outside a buffer of {}",
                what, dims, strides, offset, lo, hi, len
            ),
        )
            .into());
    }
    Ok(())
}

impl<'a, T: Scalar> StridedView<'a, T> {
    pub fn new(
        data: &'a [T],
        dims: &[usize],
        strides: &[isize],
        offset: usize,
        conj: Conj,
    ) -> Result<Self> {
        require_in_bounds("source view", data.len(), dims, strides, offset, false)?;
        Ok(StridedView {
            data,
            offset,
            dims: dims.to_vec(),
            strides: strides.to_vec(),
            conj,
        })
    }

    /// Column-major (first axis fastest) view over a whole slice.
    pub fn col_major(data: &'a [T], dims: &[usize]) -> Result<Self> {
        let strides = crate::layout::col_major_strides(dims);
        StridedView::new(data, dims, &strides, 0, Conj::Normal)
    }

    /// Same view with reads going through the conjugate.
    pub fn conjugated(mut self) -> Self {
        self.conj = Conj::Conjugated;
        self
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn conj(&self) -> Conj {
        self.conj
    }

    /// Reads the element `delta` elements away from the all-zeros index,
    /// applying the conjugation flag.
    #[inline(always)]
    pub(crate) fn get(&self, delta: isize) -> T {
        let v = self.data[(self.offset as isize + delta) as usize];
        match self.conj {
            Conj::Normal => v,
            Conj::Conjugated => v.conj(),
        }
    }

    pub(crate) fn base_ptr(&self) -> *const T {
        self.data.as_ptr().wrapping_add(self.offset)
    }
}

impl<'a, T: Scalar> StridedViewMut<'a, T> {
    pub fn new(
        data: &'a mut [T],
        dims: &[usize],
        strides: &[isize],
        offset: usize,
    ) -> Result<Self> {
        require_in_bounds("destination view", data.len(), dims, strides, offset, true)?;
        Ok(StridedViewMut {
            data,
            offset,
            dims: dims.to_vec(),
            strides: strides.to_vec(),
        })
    }

    /// Column-major (first axis fastest) view over a whole slice.
    pub fn col_major(data: &'a mut [T], dims: &[usize]) -> Result<Self> {
        let strides = crate::layout::col_major_strides(dims);
        StridedViewMut::new(data, dims, &strides, 0)
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    #[inline(always)]
    pub(crate) fn at(&mut self, delta: isize) -> &mut T {
        &mut self.data[(self.offset as isize + delta) as usize]
    }

    pub(crate) fn base_ptr_mut(&mut self) -> *mut T {
        self.data.as_mut_ptr().wrapping_add(self.offset)
    }
}
