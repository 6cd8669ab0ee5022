/// One (price, quantity) step of a generator's offer curve
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BidSegment {
    /// The offer price (currency per unit quantity)
    pub price: f64,
    /// The quantity offered at this price
    pub quantity: f64,
}

/// A validated, price-ordered sequence of bid segments.
///
/// A bid curve is a piecewise-linear cost function. Its segments must satisfy:
/// - At least one segment is present
/// - Every price and quantity is finite
/// - Every quantity is strictly positive
/// - Every price is non-negative
/// - Prices are non-decreasing from one segment to the next
///
/// The last requirement is what gives the market its merit order: a linear
/// program still solves with an unordered curve, but the dispatch it finds
/// would no longer fill cheaper steps first.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "BidCurveDto", into = "BidCurveDto")
)]
pub struct BidCurve(Vec<BidSegment>);

impl BidCurve {
    /// Creates a new curve from the segments, validating all constraints
    pub fn new(segments: Vec<BidSegment>) -> Result<Self, BidCurveError> {
        Self::try_from(BidCurveDto(segments))
    }

    /// The segments, cheapest first
    pub fn segments(&self) -> &[BidSegment] {
        &self.0
    }

    /// The total quantity offered across all segments
    pub fn quantity(&self) -> f64 {
        self.0.iter().map(|segment| segment.quantity).sum()
    }

    /// The number of segments
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a validated curve
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// DTO to ensure that we always validate when we deserialize from an untrusted source
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
#[derive(Debug)]
pub struct BidCurveDto(pub Vec<BidSegment>);

impl From<BidCurve> for BidCurveDto {
    fn from(value: BidCurve) -> Self {
        Self(value.0)
    }
}

impl TryFrom<BidCurveDto> for BidCurve {
    type Error = BidCurveError;

    fn try_from(value: BidCurveDto) -> Result<Self, Self::Error> {
        if value.0.is_empty() {
            return Err(BidCurveError::Empty);
        }

        let mut prev = 0.0;
        for (index, segment) in value.0.iter().enumerate() {
            if segment.price.is_nan() || segment.quantity.is_nan() {
                return Err(BidCurveError::NaN(index));
            }
            if segment.price.is_infinite() || segment.quantity.is_infinite() {
                return Err(BidCurveError::Infinity(index));
            }
            if segment.quantity <= 0.0 {
                return Err(BidCurveError::NonPositiveQuantity(index));
            }
            if segment.price < 0.0 {
                return Err(BidCurveError::NegativePrice(index));
            }
            if segment.price < prev {
                return Err(BidCurveError::NonMonotone(index));
            }
            prev = segment.price;
        }

        Ok(Self(value.0))
    }
}

/// Errors that can occur when creating or validating a BidCurve
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum BidCurveError {
    /// Error when no segments are provided
    #[error("no segments provided")]
    Empty,
    /// Error when a price or quantity is NaN
    #[error("segment {0}: NaN value encountered")]
    NaN(usize),
    /// Error when a price or quantity is infinite
    #[error("segment {0}: prices and quantities cannot be infinite")]
    Infinity(usize),
    /// Error when a segment offers nothing
    #[error("segment {0}: quantity must be positive")]
    NonPositiveQuantity(usize),
    /// Error when a segment is priced below zero
    #[error("segment {0}: price cannot be negative")]
    NegativePrice(usize),
    /// Error when a segment is cheaper than its predecessor
    #[error("segment {0}: prices must be non-decreasing")]
    NonMonotone(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(price: f64, quantity: f64) -> BidSegment {
        BidSegment { price, quantity }
    }

    #[test]
    fn test_valid_curve() {
        let curve = BidCurve::new(vec![
            seg(10.0, 50.0),
            seg(20.0, 30.0),
            seg(30.0, 10.0),
            seg(40.0, 10.0),
        ])
        .unwrap();
        assert_eq!(curve.len(), 4);
        assert_eq!(curve.quantity(), 100.0);
    }

    #[test]
    fn test_flat_curve_is_monotone() {
        assert!(BidCurve::new(vec![seg(15.0, 50.0), seg(15.0, 50.0)]).is_ok());
    }

    #[test]
    fn test_empty_curve() {
        assert_eq!(BidCurve::new(vec![]).unwrap_err(), BidCurveError::Empty);
    }

    #[test]
    fn test_nan_and_infinity() {
        assert_eq!(
            BidCurve::new(vec![seg(10.0, 1.0), seg(f64::NAN, 1.0)]).unwrap_err(),
            BidCurveError::NaN(1)
        );
        assert_eq!(
            BidCurve::new(vec![seg(10.0, f64::INFINITY)]).unwrap_err(),
            BidCurveError::Infinity(0)
        );
    }

    #[test]
    fn test_non_positive_quantity() {
        assert_eq!(
            BidCurve::new(vec![seg(10.0, 5.0), seg(20.0, 0.0)]).unwrap_err(),
            BidCurveError::NonPositiveQuantity(1)
        );
        assert_eq!(
            BidCurve::new(vec![seg(10.0, -5.0)]).unwrap_err(),
            BidCurveError::NonPositiveQuantity(0)
        );
    }

    #[test]
    fn test_negative_price() {
        assert_eq!(
            BidCurve::new(vec![seg(-1.0, 5.0)]).unwrap_err(),
            BidCurveError::NegativePrice(0)
        );
    }

    #[test]
    fn test_decreasing_price() {
        assert_eq!(
            BidCurve::new(vec![seg(10.0, 5.0), seg(30.0, 5.0), seg(20.0, 5.0)]).unwrap_err(),
            BidCurveError::NonMonotone(2)
        );
    }

    #[test]
    fn test_deserialize_validates() {
        let raw = r#"[
            { "price": 10.0, "quantity": 5.0 },
            { "price": 5.0, "quantity": 5.0 }
        ]"#;
        assert!(serde_json::from_str::<BidCurve>(raw).is_err());

        let raw = r#"[
            { "price": 5.0, "quantity": 5.0 },
            { "price": 10.0, "quantity": 5.0 }
        ]"#;
        assert!(serde_json::from_str::<BidCurve>(raw).is_ok());
    }
}
