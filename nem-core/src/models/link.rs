use super::RegionId;

/// A capacity-limited interconnector between two regions.
///
/// The link carries a single, signed net flow: positive values move power
/// from `from` to `to`, negative values the other way. The limit applies
/// symmetrically in both directions.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "LinkDto", into = "LinkDto")
)]
pub struct TransmissionLink {
    from: RegionId,
    to: RegionId,
    limit: f64,
}

impl TransmissionLink {
    /// Creates a new link, validating the endpoints and limit
    pub fn new(from: RegionId, to: RegionId, limit: f64) -> Result<Self, LinkError> {
        Self::try_from(LinkDto { from, to, limit })
    }

    /// The region that positive flow leaves
    pub fn from_region(&self) -> &RegionId {
        &self.from
    }

    /// The region that positive flow enters
    pub fn to_region(&self) -> &RegionId {
        &self.to
    }

    /// The flow limit in either direction
    pub fn limit(&self) -> f64 {
        self.limit
    }

    /// Does this link have the region as an endpoint?
    pub fn touches(&self, region: &RegionId) -> bool {
        &self.from == region || &self.to == region
    }
}

/// DTO to ensure that we always validate when we deserialize from an untrusted source
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug)]
pub struct LinkDto {
    /// The sending end for positive flow
    pub from: RegionId,
    /// The receiving end for positive flow
    pub to: RegionId,
    /// The (non-negative, finite) limit in each direction
    pub limit: f64,
}

impl From<TransmissionLink> for LinkDto {
    fn from(value: TransmissionLink) -> Self {
        Self {
            from: value.from,
            to: value.to,
            limit: value.limit,
        }
    }
}

impl TryFrom<LinkDto> for TransmissionLink {
    type Error = LinkError;

    fn try_from(value: LinkDto) -> Result<Self, Self::Error> {
        if value.from == value.to {
            return Err(LinkError::SelfLoop(value.from));
        }
        if !value.limit.is_finite() || value.limit < 0.0 {
            return Err(LinkError::Limit(value.limit));
        }
        Ok(Self {
            from: value.from,
            to: value.to,
            limit: value.limit,
        })
    }
}

/// Errors that can occur when creating a TransmissionLink
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum LinkError {
    /// Both endpoints are the same region
    #[error("link connects region {0} to itself")]
    SelfLoop(RegionId),
    /// The limit is negative or not finite
    #[error("limit must be non-negative and finite, got {0}")]
    Limit(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_link() {
        let link = TransmissionLink::new("NSW".into(), "VIC".into(), 50.0).unwrap();
        assert!(link.touches(&"NSW".into()));
        assert!(link.touches(&"VIC".into()));
        assert!(!link.touches(&"QLD".into()));
        assert_eq!(link.limit(), 50.0);
    }

    #[test]
    fn test_zero_limit_is_allowed() {
        assert!(TransmissionLink::new("NSW".into(), "VIC".into(), 0.0).is_ok());
    }

    #[test]
    fn test_invalid_links() {
        assert_eq!(
            TransmissionLink::new("NSW".into(), "NSW".into(), 50.0).unwrap_err(),
            LinkError::SelfLoop("NSW".into())
        );
        assert_eq!(
            TransmissionLink::new("NSW".into(), "VIC".into(), -1.0).unwrap_err(),
            LinkError::Limit(-1.0)
        );
        assert!(matches!(
            TransmissionLink::new("NSW".into(), "VIC".into(), f64::INFINITY),
            Err(LinkError::Limit(_))
        ));
    }
}
