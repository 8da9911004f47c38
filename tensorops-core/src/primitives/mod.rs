mod add;
mod contract;
mod scale;
mod trace;

pub(crate) use add::add_strided;
pub(crate) use contract::contract_strided;
pub(crate) use scale::scale_strided;
pub(crate) use trace::trace_strided;

/// Blocks of at most this many scalar operations run as plain nested loops;
/// anything larger is split along the axis with the widest memory footprint.
pub(crate) const BLOCK_ELEMS: usize = 2048;
