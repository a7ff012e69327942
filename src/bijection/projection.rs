//! Projection from network features to raw Box-Cox arguments.

use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::tensor::{backend::Backend, Tensor};

use super::box_cox::ARG_NAMES;
use super::output::ArgsDim;
use crate::error::{BoxCoxError, Result};

/// One linear head per Box-Cox argument.
///
/// Maps features `[.., in_features]` to raw `lambda_1` and `lambda_2`
/// tensors `[.., dim]`, with `dim` taken from the argument declaration. The
/// raw outputs are unconstrained; pass them through
/// [`BoxCoxTransformOutput::constrain`](super::BoxCoxTransformOutput::constrain).
#[derive(Module, Debug)]
pub struct ArgProjection<B: Backend> {
    lambda_1: Linear<B>,
    lambda_2: Linear<B>,
}

impl<B: Backend> ArgProjection<B> {
    pub fn new(in_features: usize, args_dim: &ArgsDim, device: &B::Device) -> Result<Self> {
        let head = |name: &str| -> Result<Linear<B>> {
            let dim = args_dim.dim(name).ok_or_else(|| {
                BoxCoxError::InvalidArgsDim(format!("missing argument `{}`", name))
            })?;
            Ok(LinearConfig::new(in_features, dim).init(device))
        };

        Ok(Self {
            lambda_1: head(ARG_NAMES[0])?,
            lambda_2: head(ARG_NAMES[1])?,
        })
    }

    /// Raw `(lambda_1, lambda_2)` for the given features.
    pub fn forward<const D: usize>(&self, features: Tensor<B, D>) -> (Tensor<B, D>, Tensor<B, D>) {
        (
            self.lambda_1.forward(features.clone()),
            self.lambda_2.forward(features),
        )
    }
}
