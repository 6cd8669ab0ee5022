use super::{BidCurve, BidCurveError, BidSegment, RegionId};

// Segment quantities must add up to the nameplate capacity; we allow for the
// rounding that creeps in when capacities are split across bands.
const CAPACITY_TOLERANCE: f64 = 1e-9;

/// A generating unit offering its capacity into the market.
///
/// The generator refers to its region by identifier only; the registry checks
/// that the region exists.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "GeneratorDto", into = "GeneratorDto")
)]
pub struct Generator {
    region: RegionId,
    capacity: f64,
    bids: BidCurve,
}

impl Generator {
    /// Creates a new generator, checking that the bid curve exactly covers the capacity
    pub fn new(region: RegionId, capacity: f64, bids: BidCurve) -> Result<Self, GeneratorError> {
        if !capacity.is_finite() || capacity <= 0.0 {
            return Err(GeneratorError::Capacity(capacity));
        }

        let offered = bids.quantity();
        if (offered - capacity).abs() > CAPACITY_TOLERANCE * capacity.max(1.0) {
            return Err(GeneratorError::CapacityMismatch { capacity, offered });
        }

        Ok(Self {
            region,
            capacity,
            bids,
        })
    }

    /// The region this generator injects into
    pub fn region(&self) -> &RegionId {
        &self.region
    }

    /// The maximum output of the generator
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// The generator's offer curve
    pub fn bids(&self) -> &BidCurve {
        &self.bids
    }
}

/// DTO to ensure that we always validate when we deserialize from an untrusted source
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug)]
pub struct GeneratorDto {
    /// The identifier of the owning region
    pub region: RegionId,
    /// The nameplate capacity
    pub capacity: f64,
    /// The bid segments, ordered by non-decreasing price
    pub bids: Vec<BidSegment>,
}

impl From<Generator> for GeneratorDto {
    fn from(value: Generator) -> Self {
        Self {
            region: value.region,
            capacity: value.capacity,
            bids: value.bids.segments().to_vec(),
        }
    }
}

impl TryFrom<GeneratorDto> for Generator {
    type Error = GeneratorError;

    fn try_from(value: GeneratorDto) -> Result<Self, Self::Error> {
        let bids = BidCurve::new(value.bids)?;
        Self::new(value.region, value.capacity, bids)
    }
}

/// Errors that can occur when creating a Generator
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum GeneratorError {
    /// The capacity is zero, negative or not finite
    #[error("capacity must be positive and finite, got {0}")]
    Capacity(f64),
    /// The bid curve is invalid
    #[error("invalid bid curve: {0}")]
    Bids(#[from] BidCurveError),
    /// The bid curve does not offer exactly the capacity
    #[error("bids offer {offered} but capacity is {capacity}")]
    CapacityMismatch {
        /// The nameplate capacity
        capacity: f64,
        /// The sum of segment quantities
        offered: f64,
    },
}
