mod bid;
mod generator;
mod link;
mod map;
mod outcome;
mod region;
mod registry;

pub use bid::{BidCurve, BidCurveDto, BidCurveError, BidSegment};
pub use generator::{Generator, GeneratorDto, GeneratorError};
pub use link::{LinkDto, LinkError, TransmissionLink};
pub use map::Map;
pub use outcome::{GeneratorOutcome, LinkOutcome, MarketOutcome, RegionOutcome};
pub use region::{Region, RegionDto, RegionError};
pub use registry::{Registry, RegistryDto, RegistryError};

macro_rules! id_wrapper {
    ($struct:ident) => {
        #[doc = concat!("A newtype wrapper for ", stringify!($struct))]
        #[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
        #[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
        #[cfg_attr(
            feature = "serde",
            derive(serde::Serialize, serde::Deserialize),
            serde(transparent)
        )]
        #[repr(transparent)]
        pub struct $struct(String);

        impl $struct {
            /// View the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $struct {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $struct {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl std::borrow::Borrow<str> for $struct {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $struct {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_wrapper!(RegionId);
id_wrapper!(GeneratorId);
id_wrapper!(LinkId);
