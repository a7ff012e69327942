//! Box-Cox transformation of a univariate random variable.
//!
//! ```text
//! BoxCox(z; l1, l2)     = ((z + l2)^l1 - 1) / l1     if |l1| >= tol
//!                       = log(z + l2)                otherwise
//!
//! BoxCox^-1(y; l1, l2)  = relu(y * l1 + 1)^(1 / l1) - l2   if |l1| >= tol
//!                       = exp(y) - l2                      otherwise
//! ```
//!
//! Both parameters may be tensors; every element of the broadcast `l1`
//! picks its own branch. `tol` replaces an exact comparison with zero so the
//! power branch never divides by a vanishing `l1`.
//!
//! # Domain
//!
//! The forward map needs `z + l2 > 0`. That is the caller's contract (see
//! [`BoxCoxTransformOutput`](super::BoxCoxTransformOutput), which picks `l2`
//! from a lower bound on the observations); outside it the backend's NaN is
//! returned as is.
//!
//! The inverse needs `y * l1 + 1 >= 0`, which cannot be guaranteed when `y`
//! is a sample from a distribution fitted in the transformed space. With
//! `l1 = 1.1, l2 = 0` the forward image of `(0, 1)` is `(-0.909, 0)`, and a
//! Gaussian fitted there happily produces `y = -0.91`, for which
//! `(y * l1 + 1)^(1 / l1)` is complex. The base is therefore clamped at
//! zero. This is a lossy recovery, not an error: such samples map to `-l2`.

use burn::tensor::{backend::Backend, Bool, Shape, Tensor};

use super::{Bijection, InverseBijection};
use crate::numerics::{self, broadcast_dims, count_true, select, PowerFn, PowerKernel};
use crate::settings::{TransformSettings, DEFAULT_TOL_LAMBDA_1};

/// Names of the transform parameters, in argument order.
pub const ARG_NAMES: [&str; 2] = ["box_cox.lambda_1", "box_cox.lambda_2"];

/// Box-Cox bijection with power parameter `lambda_1` and shift `lambda_2`.
///
/// Built fresh from the current parameter tensors for each pass and never
/// mutated afterwards. The device is taken from `lambda_1` at construction.
#[derive(Debug, Clone)]
pub struct BoxCoxTransform<B: Backend, const D: usize> {
    lambda_1: Tensor<B, D>,
    lambda_2: Tensor<B, D>,
    tol_lambda_1: f64,
    kernel: PowerKernel,
    power: PowerFn<B, D>,
    device: B::Device,
}

/// How many inverse evaluations hit the `y * lambda_1 + 1 < 0` clamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClampReport {
    /// Elements on the power branch whose base was clamped to zero.
    pub clamped: usize,
    /// Elements evaluated.
    pub total: usize,
}

impl ClampReport {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.clamped as f64 / self.total as f64
        }
    }
}

impl<B: Backend, const D: usize> BoxCoxTransform<B, D> {
    /// Transform with the default tolerance and the native power kernel.
    pub fn new(lambda_1: Tensor<B, D>, lambda_2: Tensor<B, D>) -> Self {
        let device = lambda_1.device();
        let kernel = PowerKernel::default();
        Self {
            lambda_1,
            lambda_2,
            tol_lambda_1: DEFAULT_TOL_LAMBDA_1,
            kernel,
            power: kernel.resolve::<B, D>(),
            device,
        }
    }

    pub fn from_settings(
        lambda_1: Tensor<B, D>,
        lambda_2: Tensor<B, D>,
        settings: &TransformSettings,
    ) -> Self {
        Self::new(lambda_1, lambda_2)
            .with_tolerance(settings.tol_lambda_1)
            .with_power_kernel(settings.power_kernel)
    }

    /// Treat `|lambda_1| < tol_lambda_1` as zero.
    pub fn with_tolerance(mut self, tol_lambda_1: f64) -> Self {
        self.tol_lambda_1 = tol_lambda_1;
        self
    }

    pub fn with_power_kernel(mut self, kernel: PowerKernel) -> Self {
        self.kernel = kernel;
        self.power = kernel.resolve::<B, D>();
        self
    }

    pub fn lambda_1(&self) -> &Tensor<B, D> {
        &self.lambda_1
    }

    pub fn lambda_2(&self) -> &Tensor<B, D> {
        &self.lambda_2
    }

    pub fn tol_lambda_1(&self) -> f64 {
        self.tol_lambda_1
    }

    pub fn power_kernel(&self) -> PowerKernel {
        self.kernel
    }

    pub fn device(&self) -> &B::Device {
        &self.device
    }

    /// Current parameter values, in [`ARG_NAMES`] order.
    pub fn args(&self) -> [Tensor<B, D>; 2] {
        [self.lambda_1.clone(), self.lambda_2.clone()]
    }

    /// Forward transformation of observations `z`.
    pub fn forward(&self, z: Tensor<B, D>) -> Tensor<B, D> {
        let (z, lambda_1, lambda_2) = self.broadcast(z);
        let power_branch = self.power_branch(&lambda_1);
        let lambda_1 = self.guard(lambda_1, &power_branch);

        let shifted = z.add(lambda_2);
        let power = (self.power)(shifted.clone(), lambda_1.clone())
            .sub_scalar(1.0)
            .div(lambda_1);

        select(power_branch, power, shifted.log())
    }

    /// Inverse transformation of `y`, with the base of the power branch
    /// clamped at zero.
    pub fn inverse(&self, y: Tensor<B, D>) -> Tensor<B, D> {
        let (x, clamped) = self.inverse_with_mask(y);

        if log::log_enabled!(log::Level::Debug) {
            let total = clamped.shape().num_elements();
            let count = count_true(clamped);
            if count > 0 {
                log::debug!(
                    "Box-Cox inverse clamped {} of {} elements with y * lambda_1 + 1 < 0",
                    count,
                    total
                );
            }
        }

        x
    }

    /// [`inverse`](Self::inverse), also reporting how many elements were
    /// clamped. Reads the count back to the host.
    pub fn inverse_with_report(&self, y: Tensor<B, D>) -> (Tensor<B, D>, ClampReport) {
        let (x, clamped) = self.inverse_with_mask(y);
        let report = ClampReport {
            total: clamped.shape().num_elements(),
            clamped: count_true(clamped),
        };
        (x, report)
    }

    /// `log |d/dz BoxCox(z)|`. The derivative is non-negative wherever the
    /// forward map is defined.
    pub fn log_abs_det_jacobian(&self, z: Tensor<B, D>) -> Tensor<B, D> {
        let (z, lambda_1, lambda_2) = self.broadcast(z);
        let power_branch = self.power_branch(&lambda_1);

        let log_shifted = z.add(lambda_2).log();
        let power = log_shifted.clone().mul(lambda_1.sub_scalar(1.0));

        select(power_branch, power, log_shifted.neg())
    }

    fn inverse_with_mask(&self, y: Tensor<B, D>) -> (Tensor<B, D>, Tensor<B, D, Bool>) {
        let (y, lambda_1, lambda_2) = self.broadcast(y);
        let power_branch = self.power_branch(&lambda_1);

        let affine = y.clone().mul(lambda_1.clone()).add_scalar(1.0);
        let clamped = affine.clone().lower_elem(0.0).bool_and(power_branch.clone());
        let base = numerics::relu(affine);

        let exponent = self.guard(lambda_1, &power_branch).recip();
        // d/dp 0^p = 0^p * log 0 is NaN; evaluate clamped elements on a unit
        // base and put the edge value back with the exponent detached.
        let safe_base = base.clone().mask_fill(clamped.clone(), 1.0);
        let edge = (self.power)(base.zeros_like(), exponent.clone().detach());
        let power = select(clamped.clone(), edge, (self.power)(safe_base, exponent))
            .sub(lambda_2.clone());
        let exp = y.exp().sub(lambda_2);

        (select(power_branch, power, exp), clamped)
    }

    /// Expand the input and both parameters to their common shape.
    fn broadcast(&self, x: Tensor<B, D>) -> (Tensor<B, D>, Tensor<B, D>, Tensor<B, D>) {
        let dims = broadcast_dims(
            broadcast_dims(x.dims(), self.lambda_1.dims()),
            self.lambda_2.dims(),
        );
        (
            x.expand(Shape::new(dims)),
            self.lambda_1.clone().expand(Shape::new(dims)),
            self.lambda_2.clone().expand(Shape::new(dims)),
        )
    }

    fn power_branch(&self, lambda_1: &Tensor<B, D>) -> Tensor<B, D, Bool> {
        lambda_1.clone().abs().greater_equal_elem(self.tol_lambda_1)
    }

    /// Replace `lambda_1` by one where the log branch is taken, so the
    /// discarded power branch never evaluates `0 / 0` and its gradient stays
    /// finite.
    fn guard(&self, lambda_1: Tensor<B, D>, power_branch: &Tensor<B, D, Bool>) -> Tensor<B, D> {
        let ones = lambda_1.ones_like();
        lambda_1.mask_where(power_branch.clone().bool_not(), ones)
    }
}

impl<B: Backend, const D: usize> Bijection<B, D> for BoxCoxTransform<B, D> {
    fn forward(&self, x: Tensor<B, D>) -> Tensor<B, D> {
        BoxCoxTransform::forward(self, x)
    }

    fn inverse(&self, y: Tensor<B, D>) -> Tensor<B, D> {
        BoxCoxTransform::inverse(self, y)
    }

    fn log_abs_det_jac(&self, x: Tensor<B, D>, _y: Tensor<B, D>) -> Tensor<B, D> {
        self.log_abs_det_jacobian(x)
    }

    fn event_dim(&self) -> usize {
        0
    }
}

/// Box-Cox applied in the reverse role: `forward` is `BoxCox^-1`.
pub type InverseBoxCoxTransform<B, const D: usize> = InverseBijection<BoxCoxTransform<B, D>>;

impl<B: Backend, const D: usize> InverseBijection<BoxCoxTransform<B, D>> {
    pub fn box_cox(lambda_1: Tensor<B, D>, lambda_2: Tensor<B, D>) -> Self {
        Self::new(BoxCoxTransform::new(lambda_1, lambda_2))
    }
}
