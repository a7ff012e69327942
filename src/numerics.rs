//! Elementwise helpers shared by the transforms.
//!
//! Everything here is written against `burn`'s `Backend` so the same code runs
//! eagerly on `NdArray` and under `Autodiff`. Branching is always done with
//! `mask_where` on tensors, never on host values read back from a tensor.

use burn::tensor::{activation, backend::Backend, Bool, ElementConversion, Tensor};
use serde::{Deserialize, Serialize};

/// Signature of a resolved power primitive: `base ^ exponent`, elementwise.
pub type PowerFn<B, const D: usize> = fn(Tensor<B, D>, Tensor<B, D>) -> Tensor<B, D>;

/// Exponentiation convention used by a transform.
///
/// The kernel is resolved into a [`PowerFn`] once, when a transform is built,
/// and every power evaluation of that transform goes through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerKernel {
    /// The backend's binary `powf` with a tensor exponent.
    #[default]
    Native,
    /// `exp(exponent * log(base))`, for backends without a differentiable
    /// tensor-exponent power.
    ExpLog,
}

impl PowerKernel {
    pub fn resolve<B: Backend, const D: usize>(self) -> PowerFn<B, D> {
        match self {
            PowerKernel::Native => native_power::<B, D>,
            PowerKernel::ExpLog => exp_log_power::<B, D>,
        }
    }
}

fn native_power<B: Backend, const D: usize>(
    base: Tensor<B, D>,
    exponent: Tensor<B, D>,
) -> Tensor<B, D> {
    base.powf(exponent)
}

fn exp_log_power<B: Backend, const D: usize>(
    base: Tensor<B, D>,
    exponent: Tensor<B, D>,
) -> Tensor<B, D> {
    // log(0) = -inf keeps 0^p = 0 for p > 0 and inf for p < 0.
    base.log().mul(exponent).exp()
}

/// Elementwise `where`: `if_true` where `condition` holds, `if_false` elsewhere.
///
/// All three tensors must already share one shape.
pub fn select<B: Backend, const D: usize>(
    condition: Tensor<B, D, Bool>,
    if_true: Tensor<B, D>,
    if_false: Tensor<B, D>,
) -> Tensor<B, D> {
    if_false.mask_where(condition, if_true)
}

/// `log(1 + exp(x))`, evaluated as `relu(x) + log1p(exp(-|x|))` so large
/// inputs do not overflow and small ones keep their (tiny) positive value.
pub fn softplus<B: Backend, const D: usize>(x: Tensor<B, D>) -> Tensor<B, D> {
    let tail = x.clone().abs().neg().exp().log1p();
    activation::relu(x).add(tail)
}

/// Clamp at zero.
pub fn relu<B: Backend, const D: usize>(x: Tensor<B, D>) -> Tensor<B, D> {
    activation::relu(x)
}

/// Broadcast result of two same-rank shapes: singleton axes take the other
/// side's extent. Incompatible extents are left to the backend to reject.
pub fn broadcast_dims<const D: usize>(lhs: [usize; D], rhs: [usize; D]) -> [usize; D] {
    let mut dims = lhs;
    for (dim, other) in dims.iter_mut().zip(rhs) {
        if *dim == 1 {
            *dim = other;
        }
    }
    dims
}

/// Number of NaN or infinite entries. Reads back to the host.
pub fn count_non_finite<B: Backend, const D: usize>(x: &Tensor<B, D>) -> usize {
    let nan = x.clone().is_nan().int().sum().into_scalar().elem::<i64>();
    let inf = x.clone().is_inf().int().sum().into_scalar().elem::<i64>();
    (nan + inf) as usize
}

/// Number of `true` entries in a mask. Reads back to the host.
pub fn count_true<B: Backend, const D: usize>(mask: Tensor<B, D, Bool>) -> usize {
    mask.int().sum().into_scalar().elem::<i64>() as usize
}
