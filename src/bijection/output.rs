//! Parameter outputs: from raw network outputs to valid transform parameters.

use burn::tensor::{backend::Backend, Tensor};
use serde::{Deserialize, Serialize};

use super::box_cox::{BoxCoxTransform, InverseBoxCoxTransform, ARG_NAMES};
use super::projection::ArgProjection;
use crate::error::{BoxCoxError, Result};
use crate::numerics::softplus;
use crate::settings::{Settings, TransformSettings};

/// Ordered declaration of how many raw values each bijection argument takes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgsDim {
    entries: Vec<(String, usize)>,
}

impl ArgsDim {
    /// Validate a declaration: at least one argument, unique names, and a
    /// positive count for every argument.
    pub fn new<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String>,
    {
        let mut validated: Vec<(String, usize)> = Vec::new();
        for (name, dim) in entries {
            let name = name.into();
            if name.is_empty() {
                return Err(BoxCoxError::InvalidArgsDim("empty argument name".to_string()));
            }
            if dim == 0 {
                return Err(BoxCoxError::InvalidArgsDim(format!(
                    "argument `{}` declares zero dimensions",
                    name
                )));
            }
            if validated.iter().any(|(seen, _)| *seen == name) {
                return Err(BoxCoxError::InvalidArgsDim(format!("duplicate name `{}`", name)));
            }
            validated.push((name, dim));
        }

        if validated.is_empty() {
            return Err(BoxCoxError::InvalidArgsDim("no arguments declared".to_string()));
        }

        Ok(Self { entries: validated })
    }

    pub fn dim(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, dim)| *dim)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(name, dim)| (name.as_str(), *dim))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Require exactly `names`, in order, each with the given count.
    fn expect(&self, names: &[&str], dim: usize) -> Result<()> {
        let declared: Vec<&str> = self.iter().map(|(name, _)| name).collect();
        if declared != names {
            return Err(BoxCoxError::InvalidArgsDim(format!(
                "expected arguments {:?}, got {:?}",
                names, declared
            )));
        }
        if let Some((name, got)) = self.iter().find(|(_, got)| *got != dim) {
            return Err(BoxCoxError::InvalidArgsDim(format!(
                "argument `{}` must have dimension {} for a scalar event, got {}",
                name, dim, got
            )));
        }
        Ok(())
    }
}

/// Description of the parameters a bijection family consumes.
pub trait BijectionOutput {
    /// Raw values per argument, in argument order.
    fn args_dim(&self) -> &ArgsDim;

    /// Shape of one event; empty for scalar random variables.
    fn event_shape(&self) -> &[usize];

    fn event_dim(&self) -> usize {
        self.event_shape().len()
    }
}

/// Construction-time configuration of a Box-Cox output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxCoxOutputConfig {
    /// Lower bound assumed on raw observations.
    pub lb_obs: f64,
    /// Fix `lambda_2` at `lb_obs` instead of learning it.
    pub fix_lambda_2: bool,
    /// Passed on to every transform the output builds.
    pub transform: TransformSettings,
}

impl Default for BoxCoxOutputConfig {
    fn default() -> Self {
        Self {
            lb_obs: 0.0,
            fix_lambda_2: true,
            transform: TransformSettings::default(),
        }
    }
}

impl BoxCoxOutputConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            lb_obs: settings.output.lb_obs,
            fix_lambda_2: settings.output.fix_lambda_2,
            transform: settings.transform,
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.lb_obs.is_finite() {
            return Err(BoxCoxError::InvalidLowerBound(self.lb_obs));
        }
        let tol = self.transform.tol_lambda_1;
        if !tol.is_finite() || tol <= 0.0 {
            return Err(BoxCoxError::InvalidTolerance(tol));
        }
        Ok(())
    }
}

/// Maps raw network outputs to `(lambda_1, lambda_2)` and builds
/// [`BoxCoxTransform`]s from them.
///
/// `lambda_1` is left unconstrained. `lambda_2` is either the constant
/// `lb_obs`, or `softplus(raw) - lb_obs`, which is above `-lb_obs` in exact
/// arithmetic. In f32 `softplus(raw)` falls below the rounding step of
/// `lb_obs` for very negative raw values (about -16 for `lb_obs = 5`), and
/// `lambda_2` then saturates at exactly `-lb_obs`.
#[derive(Debug, Clone)]
pub struct BoxCoxTransformOutput {
    config: BoxCoxOutputConfig,
    args_dim: ArgsDim,
}

impl BoxCoxTransformOutput {
    pub fn build(config: BoxCoxOutputConfig) -> Result<Self> {
        let args_dim = ArgsDim::new(ARG_NAMES.iter().map(|name| (*name, 1)))?;
        Self::with_args_dim(config, args_dim)
    }

    /// Build with an explicit argument declaration. The declaration must name
    /// both Box-Cox parameters, in order, with one value each.
    pub fn with_args_dim(config: BoxCoxOutputConfig, args_dim: ArgsDim) -> Result<Self> {
        config.validate()?;
        args_dim.expect(&ARG_NAMES, 1)?;

        log::debug!(
            "Box-Cox output: lb_obs={}, fix_lambda_2={}, tol_lambda_1={}",
            config.lb_obs,
            config.fix_lambda_2,
            config.transform.tol_lambda_1
        );

        Ok(Self { config, args_dim })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::build(BoxCoxOutputConfig::from_settings(settings))
    }

    pub fn config(&self) -> &BoxCoxOutputConfig {
        &self.config
    }

    /// Constrain raw parameters and drop their trailing singleton axis.
    ///
    /// `D2` must be `D - 1`, and the last axis of both inputs must have size 1.
    pub fn constrain<B: Backend, const D: usize, const D2: usize>(
        &self,
        raw_lambda_1: Tensor<B, D>,
        raw_lambda_2: Tensor<B, D>,
    ) -> (Tensor<B, D2>, Tensor<B, D2>) {
        let lambda_2 = if self.config.fix_lambda_2 {
            raw_lambda_2.ones_like().mul_scalar(self.config.lb_obs)
        } else {
            // z + lambda_2 > 0 whenever z > lb_obs, up to f32 saturation of
            // softplus(raw) - lb_obs at -lb_obs for very negative raw values.
            softplus(raw_lambda_2).sub_scalar(self.config.lb_obs)
        };

        (
            raw_lambda_1.squeeze::<D2>(D - 1),
            lambda_2.squeeze::<D2>(D - 1),
        )
    }

    /// Transform with constrained parameters and this output's settings.
    pub fn bijection<B: Backend, const D: usize>(
        &self,
        lambda_1: Tensor<B, D>,
        lambda_2: Tensor<B, D>,
    ) -> BoxCoxTransform<B, D> {
        BoxCoxTransform::from_settings(lambda_1, lambda_2, &self.config.transform)
    }

    /// `constrain` followed by `bijection`.
    pub fn transform_from_raw<B: Backend, const D: usize, const D2: usize>(
        &self,
        raw_lambda_1: Tensor<B, D>,
        raw_lambda_2: Tensor<B, D>,
    ) -> BoxCoxTransform<B, D2> {
        let (lambda_1, lambda_2) = self.constrain::<B, D, D2>(raw_lambda_1, raw_lambda_2);
        self.bijection(lambda_1, lambda_2)
    }

    /// Linear layers producing the raw arguments from `in_features` features.
    pub fn get_args_proj<B: Backend>(
        &self,
        in_features: usize,
        device: &B::Device,
    ) -> Result<ArgProjection<B>> {
        ArgProjection::new(in_features, &self.args_dim, device)
    }
}

impl BijectionOutput for BoxCoxTransformOutput {
    fn args_dim(&self) -> &ArgsDim {
        &self.args_dim
    }

    fn event_shape(&self) -> &[usize] {
        &[]
    }
}

/// Same parameters and constraints as [`BoxCoxTransformOutput`], building the
/// transform in the reverse role.
#[derive(Debug, Clone)]
pub struct InverseBoxCoxTransformOutput {
    inner: BoxCoxTransformOutput,
}

impl InverseBoxCoxTransformOutput {
    pub fn build(config: BoxCoxOutputConfig) -> Result<Self> {
        Ok(Self {
            inner: BoxCoxTransformOutput::build(config)?,
        })
    }

    pub fn with_args_dim(config: BoxCoxOutputConfig, args_dim: ArgsDim) -> Result<Self> {
        Ok(Self {
            inner: BoxCoxTransformOutput::with_args_dim(config, args_dim)?,
        })
    }

    pub fn config(&self) -> &BoxCoxOutputConfig {
        self.inner.config()
    }

    pub fn constrain<B: Backend, const D: usize, const D2: usize>(
        &self,
        raw_lambda_1: Tensor<B, D>,
        raw_lambda_2: Tensor<B, D>,
    ) -> (Tensor<B, D2>, Tensor<B, D2>) {
        self.inner.constrain(raw_lambda_1, raw_lambda_2)
    }

    pub fn bijection<B: Backend, const D: usize>(
        &self,
        lambda_1: Tensor<B, D>,
        lambda_2: Tensor<B, D>,
    ) -> InverseBoxCoxTransform<B, D> {
        InverseBoxCoxTransform::new(self.inner.bijection(lambda_1, lambda_2))
    }

    pub fn transform_from_raw<B: Backend, const D: usize, const D2: usize>(
        &self,
        raw_lambda_1: Tensor<B, D>,
        raw_lambda_2: Tensor<B, D>,
    ) -> InverseBoxCoxTransform<B, D2> {
        let (lambda_1, lambda_2) = self.constrain::<B, D, D2>(raw_lambda_1, raw_lambda_2);
        self.bijection(lambda_1, lambda_2)
    }

    pub fn get_args_proj<B: Backend>(
        &self,
        in_features: usize,
        device: &B::Device,
    ) -> Result<ArgProjection<B>> {
        self.inner.get_args_proj(in_features, device)
    }
}

impl BijectionOutput for InverseBoxCoxTransformOutput {
    fn args_dim(&self) -> &ArgsDim {
        self.inner.args_dim()
    }

    fn event_shape(&self) -> &[usize] {
        self.inner.event_shape()
    }
}
