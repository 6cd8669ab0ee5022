//! Reading a market snapshot from a directory of CSV files.
//!
//! The directory holds `region_demand.csv` (region, demand), `generators.csv`
//! (region, generator_name, nameplate_capacity), `pricelevel.csv`
//! (pricelevel), `bids.csv` (generator_name, pricelevel, bid_capacity) and,
//! optionally, `interconnectors.csv` (link, from, to, limit). Each generator
//! bids one capacity at every price level; the levels become the segments of
//! its curve, in ascending price order.

use nem_core::models::{
    BidCurve, BidSegment, Generator, GeneratorId, LinkId, Map, Region, RegionId, Registry,
    RegistryError, TransmissionLink,
};
use serde::Deserialize;
use std::{fs::File, io::Read, path::Path};

#[derive(Debug, Deserialize)]
struct DemandRow {
    region: String,
    demand: f64,
}

#[derive(Debug, Deserialize)]
struct GeneratorRow {
    region: String,
    generator_name: String,
    nameplate_capacity: f64,
}

#[derive(Debug, Deserialize)]
struct PriceLevelRow {
    pricelevel: f64,
}

#[derive(Debug, Deserialize)]
struct BidRow {
    generator_name: String,
    pricelevel: f64,
    bid_capacity: f64,
}

#[derive(Debug, Deserialize)]
struct InterconnectorRow {
    link: String,
    from: String,
    to: String,
    limit: f64,
}

/// The ways a CSV snapshot can fail to load
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A file could not be opened
    #[error("{file}: {source}")]
    Io {
        /// The file name
        file: &'static str,
        /// The underlying failure
        source: std::io::Error,
    },
    /// A file could not be parsed
    #[error("{file}: {source}")]
    Csv {
        /// The file name
        file: &'static str,
        /// The underlying failure
        source: csv::Error,
    },
    /// The number of price levels differs from the configured segment count
    #[error("expected {expected} price levels, found {found}")]
    Arity {
        /// The configured segment count
        expected: usize,
        /// The number of levels in pricelevel.csv
        found: usize,
    },
    /// A generator offers the wrong number of bid segments
    #[error("generator {generator} offers {found} bid segments, expected {expected}")]
    Segments {
        /// The generator
        generator: String,
        /// The configured segment count
        expected: usize,
        /// The number of segments offered
        found: usize,
    },
    /// A bid refers to a price level that is not listed
    #[error("generator {generator} bids at unknown price level {price}")]
    UnknownLevel {
        /// The generator
        generator: String,
        /// The price level
        price: f64,
    },
    /// A bid refers to a generator that is not listed
    #[error("bid for unknown generator {0}")]
    UnknownGenerator(String),
    /// A generator bids twice at the same level
    #[error("generator {generator} bids twice at price level {price}")]
    DuplicateBid {
        /// The generator
        generator: String,
        /// The price level
        price: f64,
    },
    /// A generator does not bid at every level
    #[error("generator {generator} has no bid at price level {price}")]
    MissingBid {
        /// The generator
        generator: String,
        /// The price level
        price: f64,
    },
    /// The assembled entities are invalid
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// The raw contents of a CSV snapshot
pub struct Tables<R> {
    /// region_demand.csv
    pub demand: R,
    /// generators.csv
    pub generators: R,
    /// pricelevel.csv
    pub levels: R,
    /// bids.csv
    pub bids: R,
    /// interconnectors.csv, if present
    pub links: Option<R>,
}

/// Open the CSV files of a snapshot directory.
pub fn open(dir: &Path) -> Result<Tables<File>, LoadError> {
    let open = |file: &'static str| {
        File::open(dir.join(file)).map_err(|source| LoadError::Io { file, source })
    };
    let links = dir.join("interconnectors.csv");
    Ok(Tables {
        demand: open("region_demand.csv")?,
        generators: open("generators.csv")?,
        levels: open("pricelevel.csv")?,
        bids: open("bids.csv")?,
        links: if links.exists() {
            Some(open("interconnectors.csv")?)
        } else {
            None
        },
    })
}

fn rows<T: for<'de> Deserialize<'de>>(
    reader: impl Read,
    file: &'static str,
) -> Result<Vec<T>, LoadError> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|source| LoadError::Csv { file, source })
}

/// Build a registry from the tables of a snapshot.
///
/// `segments` is the number of price levels every generator must bid at, or 0
/// to accept any number. A zero bid at some level contributes no segment.
pub fn load<R: Read>(tables: Tables<R>, segments: usize) -> Result<Registry, LoadError> {
    let demand = rows::<DemandRow>(tables.demand, "region_demand.csv")?;
    let generators = rows::<GeneratorRow>(tables.generators, "generators.csv")?;
    let mut levels = rows::<PriceLevelRow>(tables.levels, "pricelevel.csv")?
        .into_iter()
        .map(|row| row.pricelevel)
        .collect::<Vec<_>>();
    let bids = rows::<BidRow>(tables.bids, "bids.csv")?;
    let links = match tables.links {
        Some(reader) => rows::<InterconnectorRow>(reader, "interconnectors.csv")?,
        None => Vec::new(),
    };

    levels.sort_by(f64::total_cmp);
    levels.dedup();
    if segments != 0 && levels.len() != segments {
        return Err(LoadError::Arity {
            expected: segments,
            found: levels.len(),
        });
    }

    // Gather each generator's bid at each level
    let mut offers = generators
        .iter()
        .map(|row| (row.generator_name.as_str(), vec![None; levels.len()]))
        .collect::<Map<_, Vec<Option<f64>>>>();
    for bid in bids.iter() {
        let offer = offers
            .get_mut(bid.generator_name.as_str())
            .ok_or_else(|| LoadError::UnknownGenerator(bid.generator_name.clone()))?;
        let level = levels
            .iter()
            .position(|&price| price == bid.pricelevel)
            .ok_or_else(|| LoadError::UnknownLevel {
                generator: bid.generator_name.clone(),
                price: bid.pricelevel,
            })?;
        if offer[level].replace(bid.bid_capacity).is_some() {
            return Err(LoadError::DuplicateBid {
                generator: bid.generator_name.clone(),
                price: bid.pricelevel,
            });
        }
    }

    let mut entities = Vec::with_capacity(generators.len());
    for row in generators.iter() {
        let offer = &offers[row.generator_name.as_str()];
        let mut segments = Vec::with_capacity(levels.len());
        for (&price, quantity) in levels.iter().zip(offer) {
            let quantity = quantity.ok_or_else(|| LoadError::MissingBid {
                generator: row.generator_name.clone(),
                price,
            })?;
            if quantity != 0.0 {
                segments.push(BidSegment { price, quantity });
            }
        }

        let id = GeneratorId::from(row.generator_name.as_str());
        let generator = BidCurve::new(segments)
            .map_err(Into::into)
            .and_then(|bids| {
                Generator::new(row.region.as_str().into(), row.nameplate_capacity, bids)
            })
            .map_err(|source| RegistryError::Generator {
                id: id.clone(),
                source,
            })?;
        entities.push((id, generator));
    }

    let regions = demand
        .into_iter()
        .map(|row| {
            let id = RegionId::from(row.region);
            Region::new(row.demand)
                .map(|region| (id.clone(), region))
                .map_err(|source| RegistryError::Region { id, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let links = links
        .into_iter()
        .map(|row| {
            let id = LinkId::from(row.link);
            TransmissionLink::new(row.from.into(), row.to.into(), row.limit)
                .map(|link| (id.clone(), link))
                .map_err(|source| RegistryError::Link { id, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Registry::new(regions, entities, links)?)
}

/// Check every generator offers exactly `segments` bid segments (0 accepts any number).
pub fn check_arity(registry: &Registry, segments: usize) -> Result<(), LoadError> {
    if segments == 0 {
        return Ok(());
    }
    for (id, generator) in registry.generators().iter() {
        if generator.bids().len() != segments {
            return Err(LoadError::Segments {
                generator: id.to_string(),
                expected: segments,
                found: generator.bids().len(),
            });
        }
    }
    Ok(())
}
