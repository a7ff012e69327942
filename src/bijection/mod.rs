//! Invertible elementwise transforms over `burn` tensors.
//!
//! A bijection is a forward map, its inverse, and the log-absolute Jacobian
//! determinant of the forward map. The only family implemented here is
//! Box-Cox; [`InverseBijection`] gives any bijection the reverse role.

pub mod box_cox;
pub mod output;
pub mod projection;

use burn::tensor::{backend::Backend, Tensor};

pub use box_cox::{BoxCoxTransform, ClampReport, InverseBoxCoxTransform};
pub use output::{
    ArgsDim, BijectionOutput, BoxCoxOutputConfig, BoxCoxTransformOutput,
    InverseBoxCoxTransformOutput,
};
pub use projection::ArgProjection;

/// Invertible elementwise map on tensors of rank `D`.
pub trait Bijection<B: Backend, const D: usize> {
    /// `y = f(x)`
    fn forward(&self, x: Tensor<B, D>) -> Tensor<B, D>;

    /// `x = f^-1(y)`
    fn inverse(&self, y: Tensor<B, D>) -> Tensor<B, D>;

    /// `log |df/dx|` evaluated at `x`, where `y = f(x)`.
    ///
    /// Implementations may use either argument; both must describe the same
    /// point.
    fn log_abs_det_jac(&self, x: Tensor<B, D>, y: Tensor<B, D>) -> Tensor<B, D>;

    /// Rank of a single event (0 for scalar random variables).
    fn event_dim(&self) -> usize;
}

/// Swaps the roles of a bijection's forward and inverse maps.
#[derive(Debug, Clone)]
pub struct InverseBijection<T> {
    inner: T,
}

impl<T> InverseBijection<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// The bijection applied in the opposite direction.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<B, const D: usize, T> Bijection<B, D> for InverseBijection<T>
where
    B: Backend,
    T: Bijection<B, D>,
{
    fn forward(&self, x: Tensor<B, D>) -> Tensor<B, D> {
        self.inner.inverse(x)
    }

    fn inverse(&self, y: Tensor<B, D>) -> Tensor<B, D> {
        self.inner.forward(y)
    }

    fn log_abs_det_jac(&self, x: Tensor<B, D>, y: Tensor<B, D>) -> Tensor<B, D> {
        // Here x lives in the inner bijection's output space and y in its input space.
        self.inner.log_abs_det_jac(y, x).neg()
    }

    fn event_dim(&self) -> usize {
        self.inner.event_dim()
    }
}
