use super::{GeneratorId, LinkId, Map, RegionId};

/// The cleared market: dispatch, prices, flows and total cost.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarketOutcome {
    /// Outcomes for each generator, keyed by their ID
    pub generators: Map<GeneratorId, GeneratorOutcome>,
    /// Outcomes for each region, keyed by their ID
    pub regions: Map<RegionId, RegionOutcome>,
    /// Outcomes for each transmission link, keyed by their ID
    pub links: Map<LinkId, LinkOutcome>,
    /// The objective value: the bid-weighted cost of the dispatch
    pub total_cost: f64,
}

impl MarketOutcome {
    /// The dispatch schedule: generator to dispatched quantity
    pub fn dispatch(&self) -> Map<GeneratorId, f64> {
        self.generators
            .iter()
            .map(|(id, outcome)| (id.clone(), outcome.dispatch))
            .collect()
    }

    /// The price schedule: region to clearing price
    pub fn prices(&self) -> Map<RegionId, f64> {
        self.regions
            .iter()
            .map(|(id, outcome)| (id.clone(), outcome.price))
            .collect()
    }
}

/// Solution data for an individual generator
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneratorOutcome {
    /// The region the generator belongs to
    pub region: RegionId,
    /// The total quantity dispatched
    pub dispatch: f64,
    /// The quantity dispatched from each bid segment, in bid order
    pub segments: Vec<f64>,
}

/// Solution data for an individual region
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionOutcome {
    /// The clearing price
    pub price: f64,
    /// The dual value of the region's balance constraint, as reported by the solver
    pub shadow_price: f64,
    /// The demand served
    pub demand: f64,
    /// The total dispatch of generators in the region
    pub generation: f64,
    /// The net flow into the region over all links (negative when exporting)
    pub net_import: f64,
}

/// Solution data for an individual transmission link
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkOutcome {
    /// The net flow, positive in the link's from → to direction
    pub flow: f64,
    /// Whether the flow sits at the link's limit
    pub congested: bool,
}
