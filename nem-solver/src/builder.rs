use crate::{ColumnId, LinearProgram, RowId};
use nem_core::{
    models::{GeneratorId, LinkId, Map, RegionId, Registry},
    ports::ClearingError,
};
use tracing::{Level, event};

/// The dispatch program for one registry, with the bookkeeping needed to read
/// its solution back in terms of generators, links and regions.
///
/// For every generator segment there is a column bounded by `[0, quantity]`
/// and costed at the segment price. For every link there is a free-signed
/// flow column bounded by `[-limit, limit]` at zero cost. For every region
/// there is one balance row:
///
/// ```text
/// Σ dispatch in region + Σ flow into region - Σ flow out of region = demand
/// ```
///
/// whose dual is the marginal cost of serving one more unit of demand there.
#[derive(Debug)]
pub struct DispatchModel<'a> {
    registry: &'a Registry,
    program: LinearProgram,
    segments: Map<GeneratorId, Vec<ColumnId>>,
    flows: Map<LinkId, ColumnId>,
    balance: Map<RegionId, Option<RowId>>,
}

impl<'a> DispatchModel<'a> {
    /// Translate the registry into a linear program.
    ///
    /// Fails with [`ClearingError::Infeasible`] when some region obviously cannot
    /// be served: its demand exceeds its own capacity plus every import it could
    /// receive, or its connected group of regions cannot cover its combined
    /// demand. Passing these checks does not guarantee feasibility.
    pub fn build(registry: &'a Registry) -> Result<Self, ClearingError> {
        let short = shortfalls(registry);
        if !short.is_empty() {
            event!(Level::DEBUG, regions = ?short, "demand exceeds reachable supply");
            return Err(ClearingError::Infeasible { regions: short });
        }

        let mut program = LinearProgram::default();

        // We begin by setting up the segment variables, generator by generator.
        let segments = registry
            .generators()
            .iter()
            .map(|(id, generator)| {
                let columns = generator
                    .bids()
                    .segments()
                    .iter()
                    .enumerate()
                    .map(|(k, segment)| {
                        program.add_column(
                            format!("dispatch_{id}_{k}"),
                            segment.price,
                            0.0,
                            segment.quantity,
                        )
                    })
                    .collect();
                (id.clone(), columns)
            })
            .collect::<Map<_, Vec<_>>>();

        // Then the flow variables, whose bounds encode the symmetric limits.
        let flows = registry
            .links()
            .iter()
            .map(|(id, link)| {
                let column =
                    program.add_column(format!("flow_{id}"), 0.0, -link.limit(), link.limit());
                (id.clone(), column)
            })
            .collect::<Map<_, _>>();

        // Finally one balance row per region. A region without generators or links
        // would get an empty row; the shortfall check guarantees its demand is zero,
        // so we leave it out of the program entirely.
        let balance = registry
            .regions()
            .iter()
            .map(|(region_id, region)| {
                let mut coefficients = Vec::new();

                for (generator_id, _) in registry.generators_in(region_id) {
                    for &column in segments[generator_id].iter() {
                        coefficients.push((column, 1.0));
                    }
                }

                for (link_id, link) in registry.links_touching(region_id) {
                    let sign = if link.to_region() == region_id {
                        1.0
                    } else {
                        -1.0
                    };
                    coefficients.push((flows[link_id], sign));
                }

                let row = if coefficients.is_empty() {
                    None
                } else {
                    Some(program.add_row(
                        format!("balance_{region_id}"),
                        coefficients,
                        region.demand(),
                    ))
                };
                (region_id.clone(), row)
            })
            .collect::<Map<_, _>>();

        event!(
            Level::DEBUG,
            columns = program.columns().len(),
            rows = program.rows().len(),
            "built dispatch program"
        );

        Ok(Self {
            registry,
            program,
            segments,
            flows,
            balance,
        })
    }

    /// The registry the program was built from
    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    /// The linear program
    pub fn program(&self) -> &LinearProgram {
        &self.program
    }

    /// The segment columns of each generator, in bid order
    pub fn segments(&self) -> &Map<GeneratorId, Vec<ColumnId>> {
        &self.segments
    }

    /// The flow column of each link
    pub fn flows(&self) -> &Map<LinkId, ColumnId> {
        &self.flows
    }

    /// The balance row of each region, absent for isolated regions without demand
    pub fn balance(&self) -> &Map<RegionId, Option<RowId>> {
        &self.balance
    }
}

/// Identify regions whose demand cannot possibly be met.
///
/// Two necessary conditions are checked: each region's demand must not exceed
/// its local capacity plus the limits of every incident link, and each connected
/// group of regions must hold enough capacity for its combined demand.
pub fn shortfalls(registry: &Registry) -> Vec<RegionId> {
    let regions = registry.regions();
    let mut short = vec![false; regions.len()];

    for (index, (id, region)) in regions.iter().enumerate() {
        let reachable = registry.capacity_in(id)
            + registry
                .links_touching(id)
                .map(|(_, link)| link.limit())
                .sum::<f64>();
        if exceeds(region.demand(), reachable) {
            short[index] = true;
        }
    }

    // Label the connected components with a simple union-find over region indices
    let mut parent = (0..regions.len()).collect::<Vec<_>>();
    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }
    for link in registry.links().values() {
        let (Some(a), Some(b)) = (
            regions.get_index_of(link.from_region()),
            regions.get_index_of(link.to_region()),
        ) else {
            continue;
        };
        let (a, b) = (find(&mut parent, a), find(&mut parent, b));
        parent[a] = b;
    }

    let mut demand = vec![0.0; regions.len()];
    let mut capacity = vec![0.0; regions.len()];
    for (index, (id, region)) in regions.iter().enumerate() {
        let root = find(&mut parent, index);
        demand[root] += region.demand();
        capacity[root] += registry.capacity_in(id);
    }
    for index in 0..regions.len() {
        let root = find(&mut parent, index);
        if exceeds(demand[root], capacity[root]) && regions[index].demand() > 0.0 {
            short[index] = true;
        }
    }

    regions
        .keys()
        .zip(short)
        .filter_map(|(id, short)| short.then(|| id.clone()))
        .collect()
}

// Relative slack absorbing the rounding error in sums of decimal quantities
const ADEQUACY_TOLERANCE: f64 = 1e-9;

fn exceeds(demand: f64, supply: f64) -> bool {
    demand > supply + ADEQUACY_TOLERANCE * supply.max(1.0)
}
