use super::{
    Generator, GeneratorDto, GeneratorError, GeneratorId, LinkDto, LinkError, LinkId, Map,
    Region, RegionDto, RegionError, RegionId, TransmissionLink,
};

/// The immutable description of one market snapshot.
///
/// Regions, generators and links are stored in flat, insertion-ordered maps
/// keyed by their identifiers. A generator names its region and a link names
/// its endpoints; the registry guarantees every such reference resolves. The
/// registry is read-only once constructed.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RegistryDto", into = "RegistryDto")
)]
pub struct Registry {
    regions: Map<RegionId, Region>,
    generators: Map<GeneratorId, Generator>,
    links: Map<LinkId, TransmissionLink>,
}

impl Registry {
    /// Assemble a registry from already-validated entities, checking identifiers
    /// are unique and that every reference points at a known region.
    pub fn new(
        regions: impl IntoIterator<Item = (RegionId, Region)>,
        generators: impl IntoIterator<Item = (GeneratorId, Generator)>,
        links: impl IntoIterator<Item = (LinkId, TransmissionLink)>,
    ) -> Result<Self, RegistryError> {
        let mut region_map = Map::default();
        for (id, region) in regions {
            if region_map.contains_key(&id) {
                return Err(RegistryError::DuplicateRegion(id));
            }
            region_map.insert(id, region);
        }

        let mut generator_map = Map::default();
        for (id, generator) in generators {
            if generator_map.contains_key(&id) {
                return Err(RegistryError::DuplicateGenerator(id));
            }
            if !region_map.contains_key(generator.region()) {
                return Err(RegistryError::UnknownRegion {
                    region: generator.region().clone(),
                    generator: id,
                });
            }
            generator_map.insert(id, generator);
        }

        let mut link_map = Map::default();
        for (id, link) in links {
            if link_map.contains_key(&id) {
                return Err(RegistryError::DuplicateLink(id));
            }
            for endpoint in [link.from_region(), link.to_region()] {
                if !region_map.contains_key(endpoint) {
                    return Err(RegistryError::UnknownEndpoint {
                        region: endpoint.clone(),
                        link: id,
                    });
                }
            }
            link_map.insert(id, link);
        }

        Ok(Self {
            regions: region_map,
            generators: generator_map,
            links: link_map,
        })
    }

    /// All regions, in registration order
    pub fn regions(&self) -> &Map<RegionId, Region> {
        &self.regions
    }

    /// All generators, in registration order
    pub fn generators(&self) -> &Map<GeneratorId, Generator> {
        &self.generators
    }

    /// All transmission links, in registration order
    pub fn links(&self) -> &Map<LinkId, TransmissionLink> {
        &self.links
    }

    /// The generators located in a region
    pub fn generators_in<'a>(
        &'a self,
        region: &'a RegionId,
    ) -> impl Iterator<Item = (&'a GeneratorId, &'a Generator)> + 'a {
        self.generators
            .iter()
            .filter(move |(_, generator)| generator.region() == region)
    }

    /// The links with the region as one of their endpoints
    pub fn links_touching<'a>(
        &'a self,
        region: &'a RegionId,
    ) -> impl Iterator<Item = (&'a LinkId, &'a TransmissionLink)> + 'a {
        self.links.iter().filter(move |(_, link)| link.touches(region))
    }

    /// The total generating capacity located in a region
    pub fn capacity_in(&self, region: &RegionId) -> f64 {
        self.generators_in(region)
            .map(|(_, generator)| generator.capacity())
            .sum()
    }

    /// The total demand across every region
    pub fn total_demand(&self) -> f64 {
        self.regions.values().map(Region::demand).sum()
    }
}

/// DTO to ensure that we always validate when we deserialize from an untrusted source
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default)]
pub struct RegistryDto {
    /// The regions, keyed by identifier
    pub regions: Map<RegionId, RegionDto>,
    /// The generators, keyed by identifier
    #[cfg_attr(feature = "serde", serde(default))]
    pub generators: Map<GeneratorId, GeneratorDto>,
    /// The transmission links, keyed by identifier
    #[cfg_attr(feature = "serde", serde(default))]
    pub links: Map<LinkId, LinkDto>,
}

impl From<Registry> for RegistryDto {
    fn from(value: Registry) -> Self {
        Self {
            regions: value
                .regions
                .into_iter()
                .map(|(id, region)| (id, region.into()))
                .collect(),
            generators: value
                .generators
                .into_iter()
                .map(|(id, generator)| (id, generator.into()))
                .collect(),
            links: value
                .links
                .into_iter()
                .map(|(id, link)| (id, link.into()))
                .collect(),
        }
    }
}

impl TryFrom<RegistryDto> for Registry {
    type Error = RegistryError;

    fn try_from(value: RegistryDto) -> Result<Self, Self::Error> {
        let regions = value
            .regions
            .into_iter()
            .map(|(id, dto)| match Region::try_from(dto) {
                Ok(region) => Ok((id, region)),
                Err(source) => Err(RegistryError::Region { id, source }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let generators = value
            .generators
            .into_iter()
            .map(|(id, dto)| match Generator::try_from(dto) {
                Ok(generator) => Ok((id, generator)),
                Err(source) => Err(RegistryError::Generator { id, source }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let links = value
            .links
            .into_iter()
            .map(|(id, dto)| match TransmissionLink::try_from(dto) {
                Ok(link) => Ok((id, link)),
                Err(source) => Err(RegistryError::Link { id, source }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(regions, generators, links)
    }
}

/// A registry invariant was violated. Raised before any solve is attempted.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum RegistryError {
    /// A region failed validation
    #[error("region {id}: {source}")]
    Region {
        /// The offending region
        id: RegionId,
        /// What was wrong with it
        source: RegionError,
    },
    /// A generator failed validation
    #[error("generator {id}: {source}")]
    Generator {
        /// The offending generator
        id: GeneratorId,
        /// What was wrong with it
        source: GeneratorError,
    },
    /// A link failed validation
    #[error("link {id}: {source}")]
    Link {
        /// The offending link
        id: LinkId,
        /// What was wrong with it
        source: LinkError,
    },
    /// A region identifier appears twice
    #[error("duplicate region {0}")]
    DuplicateRegion(RegionId),
    /// A generator identifier appears twice
    #[error("duplicate generator {0}")]
    DuplicateGenerator(GeneratorId),
    /// A link identifier appears twice
    #[error("duplicate link {0}")]
    DuplicateLink(LinkId),
    /// A generator refers to a region that does not exist
    #[error("generator {generator} refers to unknown region {region}")]
    UnknownRegion {
        /// The offending generator
        generator: GeneratorId,
        /// The missing region
        region: RegionId,
    },
    /// A link refers to a region that does not exist
    #[error("link {link} refers to unknown region {region}")]
    UnknownEndpoint {
        /// The offending link
        link: LinkId,
        /// The missing region
        region: RegionId,
    },
}
