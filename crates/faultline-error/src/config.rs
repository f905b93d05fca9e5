use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::trace::{BacktraceProvider, DEFAULT_OPS_DEPTH, LocationProvider, NoTrace, TraceProvider};

/// Prefix of the environment variables read by [`DiagnosticsConfig::load`],
/// e.g. `FAULTLINE_OPS_DEPTH=10`.
pub const ENV_PREFIX: &str = "FAULTLINE";

pub const MAX_OPS_DEPTH: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load diagnostics config: {0}")]
    Load(#[from] ::config::ConfigError),
    #[error("ops_depth must be within 1..={max}, got {got}")]
    InvalidOpsDepth { got: usize, max: usize },
}

/// How much call-site information new errors record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceMode {
    /// Walk the stack; up to `ops_depth` ops plus the rendered backtrace.
    #[default]
    Backtrace,
    /// Only the construction site.
    Location,
    Off,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub ops_depth: usize,
    pub trace_mode: TraceMode,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            ops_depth: DEFAULT_OPS_DEPTH,
            trace_mode: TraceMode::default(),
        }
    }
}

impl DiagnosticsConfig {
    /// Defaults, overridden by the TOML `file` when it exists, overridden by
    /// `FAULTLINE_*` environment variables.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_sources(file, ::config::Environment::with_prefix(ENV_PREFIX))
    }

    /// [`DiagnosticsConfig::load`] with an explicit environment source.
    pub fn from_sources(
        file: Option<&Path>,
        env: ::config::Environment,
    ) -> Result<Self, ConfigError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(::config::File::from(path).required(false));
        }
        let loaded = builder
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize::<DiagnosticsConfig>()?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if (1..=MAX_OPS_DEPTH).contains(&self.ops_depth) {
            Ok(())
        } else {
            Err(ConfigError::InvalidOpsDepth {
                got: self.ops_depth,
                max: MAX_OPS_DEPTH,
            })
        }
    }

    pub fn trace_provider(&self) -> Arc<dyn TraceProvider> {
        match self.trace_mode {
            TraceMode::Backtrace => Arc::new(BacktraceProvider::new(self.ops_depth)),
            TraceMode::Location => Arc::new(LocationProvider),
            TraceMode::Off => Arc::new(NoTrace),
        }
    }
}
