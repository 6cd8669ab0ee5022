//! Application configuration management.
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then environment variables.

use nem_solver::{BackendSettings, DispatchSettings};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The main application configuration that composes all component configs
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct AppConfig {
    /// Numerical backend limits (iterations, time, verbosity)
    #[serde(default)]
    pub solver: BackendSettings,

    /// Interpretation of the solution (precision, pricing rule)
    #[serde(default)]
    pub dispatch: DispatchSettings,

    /// Rules applied when reading market data
    #[serde(default)]
    pub input: InputConfig,
}

/// Rules applied when reading market data
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    /// The number of bid segments every generator must offer; 0 accepts any number
    pub bid_segments: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { bid_segments: 4 }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (highest priority)
    /// 2. Config file given on the command line
    /// 3. Default values (lowest priority)
    ///
    /// Environment variables are mapped using the pattern:
    /// `APP_<SECTION>__<KEY>` maps to `<section>.<key>`
    ///
    /// # Examples
    ///
    /// ```bash
    /// # Report the raw dual instead of the marginal unit's price
    /// export APP_DISPATCH__PRICING="shadow_price"
    ///
    /// # Give up after 50 iterations
    /// export APP_SOLVER__MAX_ITER=50
    /// ```
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        // Start with default values
        config = config.add_source(config::Config::try_from(&Self::default())?);

        // Layer on config file if it is specified and exists
        if let Some(path) = path {
            if path.exists() {
                config = config.add_source(config::File::from(path))
            } else {
                return Err(anyhow::anyhow!(
                    "Config file {} does not exist",
                    path.display()
                ));
            }
        }

        // Override with environment variables
        // This maps APP_SOLVER__MAX_ITER to solver.max_iter
        config = config.add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let built_config = config.build()?;
        built_config.try_deserialize().map_err(Into::into)
    }
}
