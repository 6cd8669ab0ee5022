#![allow(dead_code)]

use nem_core::models::{
    BidCurve, BidSegment, Generator, GeneratorId, LinkId, Region, RegionId, Registry,
    TransmissionLink,
};

/// The four-step stack used throughout: 50 @ 10, 30 @ 20, 10 @ 30, 10 @ 40
pub const STACK: &[(f64, f64)] = &[(10.0, 50.0), (20.0, 30.0), (30.0, 10.0), (40.0, 10.0)];

/// A small registry builder so scenarios read like a description of the market
#[derive(Default)]
pub struct Market {
    regions: Vec<(RegionId, Region)>,
    generators: Vec<(GeneratorId, Generator)>,
    links: Vec<(LinkId, TransmissionLink)>,
}

impl Market {
    pub fn region(mut self, id: &str, demand: f64) -> Self {
        self.regions
            .push((id.into(), Region::new(demand).unwrap()));
        self
    }

    pub fn generator(mut self, id: &str, region: &str, bids: &[(f64, f64)]) -> Self {
        let bids = BidCurve::new(
            bids.iter()
                .map(|&(price, quantity)| BidSegment { price, quantity })
                .collect(),
        )
        .unwrap();
        let capacity = bids.quantity();
        self.generators.push((
            id.into(),
            Generator::new(region.into(), capacity, bids).unwrap(),
        ));
        self
    }

    pub fn link(mut self, id: &str, from: &str, to: &str, limit: f64) -> Self {
        self.links.push((
            id.into(),
            TransmissionLink::new(from.into(), to.into(), limit).unwrap(),
        ));
        self
    }

    pub fn build(self) -> Registry {
        Registry::new(self.regions, self.generators, self.links).unwrap()
    }
}
