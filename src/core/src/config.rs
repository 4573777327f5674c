//! Configuration management.
//!
//! Settings come from an optional file (TOML, JSON or YAML by extension)
//! overlaid by `FORMKIT__*` environment variables, e.g.
//! `FORMKIT__VALIDATION__FAILURE_MODE=collect_all`.

use crate::error::{FormError, Result};
use crate::form::{FormState, FormTemplate};
use crate::telemetry::LoggingConfig;
use crate::validation::ValidationPolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "FORMKIT";

/// Main configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormkitConfig {
    /// How field values are validated
    #[serde(default)]
    pub validation: ValidationPolicy,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Directory holding form templates, looked up by name
    #[serde(default)]
    pub templates_dir: Option<PathBuf>,
}

impl FormkitConfig {
    /// Load configuration from the environment only.
    pub fn load() -> Result<Self> {
        Self::build(None, environment())
    }

    /// Load from a specific file path, overlaid by the environment.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::build(Some(path.as_ref()), environment())
    }

    fn build(path: Option<&Path>, env: config::Environment) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        let config = builder.add_source(env).build()?;

        let cfg: FormkitConfig = config.try_deserialize()?;
        Ok(cfg)
    }

    /// The policy forms should be built with.
    pub fn validation_policy(&self) -> ValidationPolicy {
        self.validation
    }

    /// Load the template `name` from `templates_dir`, trying `.toml` then `.json`.
    pub fn template(&self, name: &str) -> Result<FormTemplate> {
        let dir = self
            .templates_dir
            .as_deref()
            .ok_or_else(|| FormError::configuration("templates_dir is not set"))?;

        ["toml", "json"]
            .iter()
            .map(|ext| dir.join(format!("{}.{}", name, ext)))
            .find(|path| path.is_file())
            .ok_or_else(|| {
                FormError::invalid_template(format!(
                    "no template named '{}' in {}",
                    name,
                    dir.display()
                ))
            })
            .and_then(FormTemplate::from_file)
    }

    /// Instantiate the template `name` with the configured policy.
    ///
    /// Failures are logged before they are returned.
    pub fn form(&self, name: &str) -> Result<FormState> {
        self.template(name)
            .and_then(|template| template.instantiate_with(self.validation))
            .inspect_err(FormError::log)
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}
