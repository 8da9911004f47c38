//! Strided kernels for dense tensor computation: permuted addition, partial
//! trace, and pairwise contraction over arbitrary stride layouts.

pub mod error;
pub mod ops;
pub mod scalar;
pub mod view;

mod gemm;
mod layout;
mod planner;
mod primitives;

pub use error::Error;
pub use error::ErrorKind;
pub use error::Result;
pub use layout::col_major_strides;
pub use ops::add;
pub use ops::contract;
pub use ops::scalar as scalar_value;
pub use ops::trace;
pub use planner::ContractMethod;
pub use scalar::Coeff;
pub use scalar::Scalar;
pub use view::Conj;
pub use view::StridedView;
pub use view::StridedViewMut;
