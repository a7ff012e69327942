//! Settings module for Box-Cox transform configuration.

use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::numerics::PowerKernel;

/// Tolerance below which `|lambda_1|` is treated as zero.
pub const DEFAULT_TOL_LAMBDA_1: f64 = 1e-2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformSettings {
    /// Branch threshold for `lambda_1`. The log/exp branch is used when
    /// `|lambda_1| < tol_lambda_1`.
    pub tol_lambda_1: f64,

    /// Exponentiation convention, resolved once per transform.
    pub power_kernel: PowerKernel,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            tol_lambda_1: DEFAULT_TOL_LAMBDA_1,
            power_kernel: PowerKernel::Native,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Lower bound assumed on raw observations.
    pub lb_obs: f64,

    /// Keep `lambda_2` fixed at `lb_obs` instead of learning it.
    pub fix_lambda_2: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            lb_obs: 0.0,
            fix_lambda_2: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Settings {
    pub transform: TransformSettings,
    pub output: OutputSettings,
}

impl Settings {
    /// Load settings from an optional `boxcox` config file and environment
    /// variables. The prefix and every nested key are separated by "__",
    /// e.g. `BOXCOX__OUTPUT__LB_OBS=5.0`; `BOXCOX_OUTPUT__LB_OBS` is ignored.
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_environment(Self::environment())
    }

    fn with_environment(environment: Environment) -> Result<Self, ConfigError> {
        let settings = Self::with_defaults()?
            .add_source(File::with_name("boxcox").required(false))
            .add_source(environment)
            .build()?;

        settings.try_deserialize()
    }

    fn environment() -> Environment {
        Environment::with_prefix("BOXCOX").separator("__")
    }

    /// Load settings from TOML text layered over the defaults.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let settings = Self::with_defaults()?
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()?;

        settings.try_deserialize()
    }

    fn with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let defaults = Self::default();
        Config::builder()
            .set_default("transform.tol_lambda_1", defaults.transform.tol_lambda_1)?
            .set_default("transform.power_kernel", "native")?
            .set_default("output.lb_obs", defaults.output.lb_obs)?
            .set_default("output.fix_lambda_2", defaults.output.fix_lambda_2)
    }
}

/// Global settings instance
static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// Get the global settings instance, initializing it if necessary.
pub fn settings() -> &'static Settings {
    SETTINGS.get_or_init(|| {
        Settings::new().unwrap_or_else(|err| {
            log::warn!("falling back to default Box-Cox settings: {}", err);
            Settings::default()
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();

        assert_eq!(settings.transform.tol_lambda_1, 0.01);
        assert_eq!(settings.transform.power_kernel, PowerKernel::Native);
        assert_eq!(settings.output.lb_obs, 0.0);
        assert!(settings.output.fix_lambda_2);
    }

    #[test]
    fn test_from_toml_overrides_defaults() {
        let settings = Settings::from_toml(
            r#"
            [transform]
            power_kernel = "exp_log"

            [output]
            lb_obs = 5.0
            fix_lambda_2 = false
            "#,
        )
        .expect("valid TOML should load");

        assert_eq!(settings.transform.tol_lambda_1, DEFAULT_TOL_LAMBDA_1);
        assert_eq!(settings.transform.power_kernel, PowerKernel::ExpLog);
        assert_eq!(settings.output.lb_obs, 5.0);
        assert!(!settings.output.fix_lambda_2);
    }

    #[test]
    fn test_from_toml_rejects_unknown_kernel() {
        let result = Settings::from_toml(
            r#"
            [transform]
            power_kernel = "operator"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_new_with_defaults() {
        let settings = Settings::new().unwrap_or_else(|_| Settings::default());

        assert!(settings.transform.tol_lambda_1 > 0.0);
        assert!(settings.output.lb_obs.is_finite());
    }

    #[test]
    fn test_environment_overrides_defaults() {
        let vars = HashMap::from([
            ("BOXCOX__OUTPUT__LB_OBS".to_string(), "5.0".to_string()),
            ("BOXCOX__OUTPUT__FIX_LAMBDA_2".to_string(), "false".to_string()),
            ("BOXCOX__TRANSFORM__POWER_KERNEL".to_string(), "exp_log".to_string()),
        ]);
        let settings = Settings::with_environment(Settings::environment().source(Some(vars)))
            .expect("environment overrides should load");

        assert_eq!(settings.output.lb_obs, 5.0);
        assert!(!settings.output.fix_lambda_2);
        assert_eq!(settings.transform.power_kernel, PowerKernel::ExpLog);
        assert_eq!(settings.transform.tol_lambda_1, DEFAULT_TOL_LAMBDA_1);
    }

    #[test]
    fn test_environment_needs_double_underscore_after_prefix() {
        let vars = HashMap::from([("BOXCOX_OUTPUT__LB_OBS".to_string(), "5.0".to_string())]);
        let settings = Settings::with_environment(Settings::environment().source(Some(vars)))
            .expect("unmatched variables are skipped");

        assert_eq!(settings.output.lb_obs, 0.0);
    }

    #[test]
    fn test_settings_serialization() {
        let settings = Settings::default();

        let json = serde_json::to_string(&settings).expect("Should serialize to JSON");
        assert!(json.contains("tol_lambda_1"));
        assert!(json.contains("\"power_kernel\":\"native\""));
        assert!(json.contains("lb_obs"));
        assert!(json.contains("fix_lambda_2"));

        let deserialized: Settings =
            serde_json::from_str(&json).expect("Should deserialize from JSON");
        assert_eq!(deserialized, settings);
    }

    #[test]
    fn test_global_settings_singleton() {
        let settings1 = settings();
        let settings2 = settings();

        assert_eq!(settings1 as *const Settings, settings2 as *const Settings);
    }
}
