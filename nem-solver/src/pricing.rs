use crate::{DispatchModel, DispatchSettings, LpSolution, PricingRule};
use nem_core::models::{Map, RegionId};
use tracing::{Level, event};

/// The dual of each region's balance row, or 0 for regions without one
pub fn shadow_prices(model: &DispatchModel, solution: &LpSolution) -> Map<RegionId, f64> {
    model
        .balance()
        .iter()
        .map(|(id, row)| (id.clone(), row.map_or(0.0, |row| solution.dual(row))))
        .collect()
}

/// Derive the clearing price of every region according to the configured rule.
pub fn regional_prices(
    model: &DispatchModel,
    solution: &LpSolution,
    settings: &DispatchSettings,
) -> Map<RegionId, f64> {
    let duals = shadow_prices(model, solution);
    match settings.pricing {
        PricingRule::ShadowPrice => duals,
        PricingRule::MarginalUnit => marginal_unit_prices(model, solution, &duals, settings),
    }
}

/// Resolve each region's price to that of the most expensive unit serving it.
///
/// An optimal dispatch implies a set of difference constraints on the prices:
/// a region is priced at least as high as every segment dispatched inside it
/// and at most as high as every segment with headroom, and a link that could
/// carry more flow from `a` to `b` forces `price(a) ≥ price(b)`. When demand
/// sits exactly on a breakpoint these constraints admit an interval of prices,
/// and the dual reported by an interior point method lands somewhere inside it.
/// Here we take the least solution instead, found by propagating lower bounds
/// along the links until nothing changes.
///
/// Regions no dispatched unit can reach take the cheapest increment available
/// to them; regions with neither fall back to their dual.
fn marginal_unit_prices(
    model: &DispatchModel,
    solution: &LpSolution,
    duals: &Map<RegionId, f64>,
    settings: &DispatchSettings,
) -> Map<RegionId, f64> {
    let registry = model.registry();
    let regions = registry.regions();
    let tolerance = settings.tolerance();
    let n = regions.len();

    let mut lower = vec![f64::NEG_INFINITY; n];
    let mut upper = vec![f64::INFINITY; n];

    for (generator_id, generator) in registry.generators().iter() {
        let Some(r) = regions.get_index_of(generator.region()) else {
            continue;
        };
        let columns = &model.segments()[generator_id];
        for (segment, &column) in generator.bids().segments().iter().zip(columns) {
            let x = solution.value(column);
            if x > tolerance {
                lower[r] = lower[r].max(segment.price);
            }
            if x < segment.quantity - tolerance {
                upper[r] = upper[r].min(segment.price);
            }
        }
    }

    // Each edge (a, b) reads price(a) ≥ price(b)
    let mut edges = Vec::new();
    for (link_id, link) in registry.links().iter() {
        let (Some(a), Some(b)) = (
            regions.get_index_of(link.from_region()),
            regions.get_index_of(link.to_region()),
        ) else {
            continue;
        };
        let limit = link.limit();
        if limit <= 0.0 {
            continue;
        }
        let flow = solution.value(model.flows()[link_id]);
        if flow < limit - tolerance {
            edges.push((a, b));
        }
        if flow > -limit + tolerance {
            edges.push((b, a));
        }
    }

    // Propagate the lower bounds. Every edge has zero weight, so a fixpoint is
    // reached within n passes.
    for _ in 0..=n {
        let mut changed = false;
        for &(a, b) in edges.iter() {
            if lower[b] > lower[a] {
                lower[a] = lower[b];
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    // Regions still unbounded below are priced by the cheapest increment that
    // could reach them, respecting the prices already fixed elsewhere.
    let mut cap = (0..n)
        .map(|r| {
            if lower[r].is_finite() {
                lower[r]
            } else {
                upper[r]
            }
        })
        .collect::<Vec<_>>();
    for _ in 0..=n {
        let mut changed = false;
        for &(a, b) in edges.iter() {
            if !lower[b].is_finite() && cap[a] < cap[b] {
                cap[b] = cap[a];
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    regions
        .keys()
        .enumerate()
        .map(|(r, id)| {
            let dual = duals.get(id).copied().unwrap_or_default();
            let price = if cap[r].is_finite() { cap[r] } else { dual };
            if (price - dual).abs() > tolerance {
                event!(
                    Level::DEBUG,
                    region = %id,
                    price,
                    dual,
                    "resolved degenerate price to the marginal unit"
                );
            }
            (id.clone(), price)
        })
        .collect()
}
