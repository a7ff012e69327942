//! Error types for box-cox-rs.
//!
//! Evaluation of a transform never fails; only construction-time
//! configuration is checked.

use thiserror::Error;

/// Result alias used by construction-time APIs.
pub type Result<T> = std::result::Result<T, BoxCoxError>;

#[derive(Error, Debug)]
pub enum BoxCoxError {
    /// The declared argument dimensions do not describe the bijection.
    #[error("invalid argument declaration: {0}")]
    InvalidArgsDim(String),

    /// `tol_lambda_1` must be finite and strictly positive.
    #[error("invalid tolerance for lambda_1: {0}")]
    InvalidTolerance(f64),

    /// `lb_obs` must be finite.
    #[error("invalid observation lower bound: {0}")]
    InvalidLowerBound(f64),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
