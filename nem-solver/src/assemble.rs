use crate::{
    DispatchModel, DispatchSettings, LpSolution,
    pricing::{regional_prices, shadow_prices},
};
use nem_core::models::{GeneratorOutcome, LinkOutcome, MarketOutcome, RegionOutcome};

/// Read an accepted solution back into a [`MarketOutcome`].
///
/// Segment dispatch and flows are first clamped into their bounds, absorbing
/// the small violations an interior point method leaves behind, and every
/// reported quantity is then rounded to the configured precision. Aggregates
/// (generator totals, regional generation and net import, total cost) are
/// summed from the clamped values before rounding.
pub fn assemble(
    model: &DispatchModel,
    solution: &LpSolution,
    settings: &DispatchSettings,
) -> MarketOutcome {
    let registry = model.registry();
    let program = model.program();
    let tolerance = settings.tolerance();

    let clamped = program
        .columns()
        .iter()
        .zip(solution.primal.iter())
        .map(|(column, &x)| x.clamp(column.lower, column.upper))
        .collect::<Vec<_>>();

    let generators = registry
        .generators()
        .iter()
        .map(|(id, generator)| {
            let values = model.segments()[id]
                .iter()
                .map(|column| clamped[column.index()])
                .collect::<Vec<_>>();
            let outcome = GeneratorOutcome {
                region: generator.region().clone(),
                dispatch: settings.round(values.iter().sum()),
                segments: values.into_iter().map(|x| settings.round(x)).collect(),
            };
            (id.clone(), outcome)
        })
        .collect();

    let links = registry
        .links()
        .iter()
        .map(|(id, link)| {
            let flow = clamped[model.flows()[id].index()];
            let outcome = LinkOutcome {
                flow: settings.round(flow),
                congested: link.limit() > 0.0 && link.limit() - flow.abs() <= tolerance,
            };
            (id.clone(), outcome)
        })
        .collect();

    let prices = regional_prices(model, solution, settings);
    let duals = shadow_prices(model, solution);

    let regions = registry
        .regions()
        .iter()
        .map(|(id, region)| {
            let generation = registry
                .generators_in(id)
                .flat_map(|(generator_id, _)| model.segments()[generator_id].iter())
                .map(|column| clamped[column.index()])
                .sum::<f64>();
            let net_import = registry
                .links_touching(id)
                .map(|(link_id, link)| {
                    let flow = clamped[model.flows()[link_id].index()];
                    if link.to_region() == id { flow } else { -flow }
                })
                .sum::<f64>();
            let outcome = RegionOutcome {
                price: settings.round(prices.get(id).copied().unwrap_or_default()),
                shadow_price: settings.round(duals.get(id).copied().unwrap_or_default()),
                demand: region.demand(),
                generation: settings.round(generation),
                net_import: settings.round(net_import),
            };
            (id.clone(), outcome)
        })
        .collect();

    MarketOutcome {
        generators,
        regions,
        links,
        total_cost: settings.round(program.objective(&clamped)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LpStatus;
    use nem_core::models::{
        BidCurve, BidSegment, Generator, GeneratorId, LinkId, Region, RegionId, Registry,
        TransmissionLink,
    };

    fn registry() -> Registry {
        let curve = |bids: &[(f64, f64)]| {
            BidCurve::new(
                bids.iter()
                    .map(|&(price, quantity)| BidSegment { price, quantity })
                    .collect(),
            )
            .unwrap()
        };
        Registry::new(
            vec![
                (RegionId::from("NSW"), Region::new(60.0).unwrap()),
                (RegionId::from("VIC"), Region::new(60.0).unwrap()),
            ],
            vec![
                (
                    GeneratorId::from("G1"),
                    Generator::new("NSW".into(), 100.0, curve(&[(15.0, 100.0)])).unwrap(),
                ),
                (
                    GeneratorId::from("G2"),
                    Generator::new("VIC".into(), 100.0, curve(&[(40.0, 60.0), (50.0, 40.0)]))
                        .unwrap(),
                ),
            ],
            vec![(
                LinkId::from("VNI"),
                TransmissionLink::new("NSW".into(), "VIC".into(), 30.0).unwrap(),
            )],
        )
        .unwrap()
    }

    #[test]
    fn test_assemble() {
        let registry = registry();
        let model = DispatchModel::build(&registry).unwrap();
        // columns: G1_0, G2_0, G2_1, VNI; with the usual interior point fuzz
        let solution = LpSolution {
            status: LpStatus::Optimal,
            primal: vec![90.00000001, 30.0000000004, -2e-10, 30.00000002],
            duals: vec![15.000000001, 39.9999999],
            objective: 2550.0,
            iterations: 9,
        };

        let outcome = assemble(&model, &solution, &DispatchSettings::default());

        let g1 = &outcome.generators["G1"];
        assert_eq!(g1.region, RegionId::from("NSW"));
        assert_eq!(g1.dispatch, 90.0);
        assert_eq!(g1.segments, vec![90.0]);

        let g2 = &outcome.generators["G2"];
        assert_eq!(g2.segments, vec![30.0, 0.0]);
        assert!(g2.segments[1].is_sign_positive());

        let vni = &outcome.links["VNI"];
        assert_eq!(vni.flow, 30.0);
        assert!(vni.congested);

        let nsw = &outcome.regions["NSW"];
        assert_eq!(nsw.price, 15.0);
        assert_eq!(nsw.generation, 90.0);
        assert_eq!(nsw.net_import, -30.0);
        assert_eq!(nsw.demand, 60.0);

        let vic = &outcome.regions["VIC"];
        assert_eq!(vic.price, 40.0);
        assert_eq!(vic.shadow_price, 40.0);
        assert_eq!(vic.net_import, 30.0);

        assert_eq!(outcome.total_cost, 2550.0);
        assert_eq!(outcome.prices()["VIC"], 40.0);
        assert_eq!(outcome.dispatch()["G2"], 30.0);
    }
}
