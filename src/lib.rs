//! box-cox-rs: differentiable Box-Cox bijection over `burn` tensor backends.
//!
//! A learned distribution is expressed as a transform applied to a base
//! distribution. [`BoxCoxTransform`] is that transform for positive-valued
//! observations; [`BoxCoxTransformOutput`] turns raw network outputs into
//! valid transform parameters.

pub mod bijection;
pub mod error;
pub mod numerics;
pub mod settings;

/// Test utilities for backend-aware tensor construction
pub mod test_utils;

pub use bijection::{
    ArgProjection, ArgsDim, Bijection, BijectionOutput, BoxCoxOutputConfig, BoxCoxTransform,
    BoxCoxTransformOutput, ClampReport, InverseBijection, InverseBoxCoxTransform,
    InverseBoxCoxTransformOutput,
};
pub use error::{BoxCoxError, Result};
pub use numerics::PowerKernel;
pub use settings::{settings, Settings};
