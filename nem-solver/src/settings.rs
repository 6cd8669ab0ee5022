/// How the clearing price of a region is derived from the solved program
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum PricingRule {
    /// Report the dual of the region's balance constraint as returned by the backend
    ShadowPrice,
    /// Report the price of the most expensive unit serving the region, which
    /// coincides with the dual whenever the dual is unique
    #[default]
    MarginalUnit,
}

/// Settings for turning a backend solution into a market outcome
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct DispatchSettings {
    /// The number of decimal places reported quantities are rounded to
    pub precision: u32,
    /// How regional prices are derived
    pub pricing: PricingRule,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            precision: 6,
            pricing: PricingRule::default(),
        }
    }
}

impl DispatchSettings {
    /// The finest precision honoured; beyond it an f64 has no digits left to round
    pub const MAX_PRECISION: u32 = 15;

    fn digits(&self) -> i32 {
        self.precision.min(Self::MAX_PRECISION) as i32
    }

    /// The smallest quantity distinguishable from zero at the configured precision
    pub fn tolerance(&self) -> f64 {
        10f64.powi(-self.digits())
    }

    /// Round a value to the configured precision, capped at [`Self::MAX_PRECISION`]
    pub fn round(&self, value: f64) -> f64 {
        let scale = 10f64.powi(self.digits());
        // adding 0.0 normalizes -0.0
        (value * scale).round() / scale + 0.0
    }
}

/// Limits and verbosity for the numerical backend
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct BackendSettings {
    /// The maximum number of solver iterations
    pub max_iter: u32,
    /// The wall-clock limit in seconds, if any
    pub time_limit: Option<f64>,
    /// Whether the backend prints its own progress
    pub verbose: bool,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            max_iter: 200,
            time_limit: None,
            verbose: false,
        }
    }
}
