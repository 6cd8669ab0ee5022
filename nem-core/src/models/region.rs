/// A pricing region with its demand for the interval
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RegionDto", into = "RegionDto")
)]
pub struct Region {
    demand: f64,
}

impl Region {
    /// Creates a new region, validating the demand
    pub fn new(demand: f64) -> Result<Self, RegionError> {
        Self::try_from(RegionDto { demand })
    }

    /// The quantity that must be served in this region
    pub fn demand(&self) -> f64 {
        self.demand
    }
}

/// DTO to ensure that we always validate when we deserialize from an untrusted source
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug)]
pub struct RegionDto {
    /// The (non-negative, finite) demand
    pub demand: f64,
}

impl From<Region> for RegionDto {
    fn from(value: Region) -> Self {
        Self {
            demand: value.demand,
        }
    }
}

impl TryFrom<RegionDto> for Region {
    type Error = RegionError;

    fn try_from(value: RegionDto) -> Result<Self, Self::Error> {
        if value.demand.is_nan() {
            Err(RegionError::NaN)
        } else if value.demand.is_infinite() {
            Err(RegionError::Infinity)
        } else if value.demand < 0.0 {
            Err(RegionError::Negative(value.demand))
        } else {
            Ok(Self {
                demand: value.demand,
            })
        }
    }
}

/// Errors that can occur when creating a Region
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum RegionError {
    /// Demand is NaN
    #[error("demand is NaN")]
    NaN,
    /// Demand is infinite
    #[error("demand cannot be infinite")]
    Infinity,
    /// Demand is below zero
    #[error("demand cannot be negative, got {0}")]
    Negative(f64),
}
