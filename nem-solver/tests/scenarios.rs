use approx::assert_abs_diff_eq;
use nem_core::{models::RegionId, ports::ClearingError, ports::Solver as _};
use nem_solver::{DispatchSettings, DispatchSolver, PricingRule, clarabel::ClarabelBackend};
use rstest::*;

mod common;
use common::{Market, STACK};

#[fixture]
fn solver() -> DispatchSolver<ClarabelBackend> {
    DispatchSolver::default()
}

#[rstest]
fn isolated_regions_on_a_breakpoint(solver: DispatchSolver<ClarabelBackend>) {
    let registry = Market::default()
        .region("NSW", 50.0)
        .region("VIC", 50.0)
        .generator("G1", "NSW", STACK)
        .generator("G2", "VIC", STACK)
        .build();

    let outcome = solver.solve(&registry).unwrap();

    for (generator, region) in [("G1", "NSW"), ("G2", "VIC")] {
        let segments = &outcome.generators[generator].segments;
        assert_eq!(segments.len(), 4);
        for (value, expected) in segments.iter().zip([50.0, 0.0, 0.0, 0.0]) {
            assert_abs_diff_eq!(*value, expected, epsilon = 1e-6);
        }
        assert_abs_diff_eq!(outcome.regions[region].price, 10.0, epsilon = 1e-6);
    }
    assert_abs_diff_eq!(outcome.total_cost, 1000.0, epsilon = 1e-4);
}

#[rstest]
fn partially_dispatched_segment_sets_price(solver: DispatchSolver<ClarabelBackend>) {
    let registry = Market::default()
        .region("NSW", 70.0)
        .generator("G1", "NSW", STACK)
        .build();

    let outcome = solver.solve(&registry).unwrap();
    let g1 = &outcome.generators["G1"];

    assert_abs_diff_eq!(g1.dispatch, 70.0, epsilon = 1e-6);
    assert_abs_diff_eq!(g1.segments[0], 50.0, epsilon = 1e-6);
    assert_abs_diff_eq!(g1.segments[1], 20.0, epsilon = 1e-6);
    assert_abs_diff_eq!(outcome.regions["NSW"].price, 20.0, epsilon = 1e-6);
    assert_abs_diff_eq!(outcome.regions["NSW"].shadow_price, 20.0, epsilon = 1e-5);
    assert_abs_diff_eq!(outcome.total_cost, 900.0, epsilon = 1e-4);
}

#[rstest]
fn congested_link_separates_prices(solver: DispatchSolver<ClarabelBackend>) {
    let registry = Market::default()
        .region("NSW", 60.0)
        .region("VIC", 60.0)
        .generator("CHEAP", "NSW", &[(15.0, 100.0)])
        .generator("DEAR", "VIC", &[(40.0, 100.0)])
        .link("VNI", "NSW", "VIC", 30.0)
        .build();

    let outcome = solver.solve(&registry).unwrap();

    assert_abs_diff_eq!(outcome.links["VNI"].flow, 30.0, epsilon = 1e-6);
    assert!(outcome.links["VNI"].congested);
    assert_abs_diff_eq!(outcome.generators["CHEAP"].dispatch, 90.0, epsilon = 1e-6);
    assert_abs_diff_eq!(outcome.generators["DEAR"].dispatch, 30.0, epsilon = 1e-6);
    assert_abs_diff_eq!(outcome.regions["NSW"].price, 15.0, epsilon = 1e-6);
    assert_abs_diff_eq!(outcome.regions["VIC"].price, 40.0, epsilon = 1e-6);
    assert_abs_diff_eq!(outcome.regions["NSW"].net_import, -30.0, epsilon = 1e-6);
    assert_abs_diff_eq!(outcome.regions["VIC"].net_import, 30.0, epsilon = 1e-6);
    assert_abs_diff_eq!(outcome.total_cost, 2550.0, epsilon = 1e-4);
}

#[rstest]
fn open_link_equalizes_prices(solver: DispatchSolver<ClarabelBackend>) {
    let registry = Market::default()
        .region("NSW", 30.0)
        .region("VIC", 30.0)
        .generator("CHEAP", "NSW", &[(15.0, 100.0)])
        .generator("DEAR", "VIC", &[(40.0, 100.0)])
        .link("VNI", "NSW", "VIC", 50.0)
        .build();

    let outcome = solver.solve(&registry).unwrap();

    assert_abs_diff_eq!(outcome.links["VNI"].flow, 30.0, epsilon = 1e-6);
    assert!(!outcome.links["VNI"].congested);
    assert_abs_diff_eq!(outcome.generators["DEAR"].dispatch, 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(outcome.regions["NSW"].price, 15.0, epsilon = 1e-6);
    assert_abs_diff_eq!(outcome.regions["VIC"].price, 15.0, epsilon = 1e-6);
}

#[rstest]
fn reversed_link_direction(solver: DispatchSolver<ClarabelBackend>) {
    // the link is declared VIC → NSW, so the export shows as negative flow
    let registry = Market::default()
        .region("NSW", 60.0)
        .region("VIC", 60.0)
        .generator("CHEAP", "NSW", &[(15.0, 100.0)])
        .generator("DEAR", "VIC", &[(40.0, 100.0)])
        .link("VNI", "VIC", "NSW", 30.0)
        .build();

    let outcome = solver.solve(&registry).unwrap();

    assert_abs_diff_eq!(outcome.links["VNI"].flow, -30.0, epsilon = 1e-6);
    assert!(outcome.links["VNI"].congested);
    assert_abs_diff_eq!(outcome.regions["VIC"].price, 40.0, epsilon = 1e-6);
}

#[rstest]
fn demand_beyond_reach_is_infeasible(solver: DispatchSolver<ClarabelBackend>) {
    let registry = Market::default()
        .region("NSW", 0.0)
        .region("VIC", 150.0)
        .generator("CHEAP", "NSW", &[(15.0, 100.0)])
        .generator("DEAR", "VIC", &[(40.0, 100.0)])
        .link("VNI", "NSW", "VIC", 30.0)
        .build();

    assert_eq!(
        solver.solve(&registry).unwrap_err(),
        ClearingError::Infeasible {
            regions: vec![RegionId::from("VIC")]
        }
    );
}

#[rstest]
fn stranded_region_is_infeasible(solver: DispatchSolver<ClarabelBackend>) {
    let registry = Market::default()
        .region("NSW", 10.0)
        .region("TAS", 5.0)
        .generator("G1", "NSW", STACK)
        .build();

    assert_eq!(
        solver.solve(&registry).unwrap_err(),
        ClearingError::Infeasible {
            regions: vec![RegionId::from("TAS")]
        }
    );
}

#[rstest]
fn shortage_across_a_cut_is_infeasible(solver: DispatchSolver<ClarabelBackend>) {
    // Each region alone, and the system as a whole, looks adequate, but only
    // 90 can cross from A into {B, C}.
    let registry = Market::default()
        .region("A", 0.0)
        .region("B", 50.0)
        .region("C", 50.0)
        .generator("G1", "A", &[(10.0, 100.0)])
        .link("AB", "A", "B", 60.0)
        .link("BC", "B", "C", 40.0)
        .link("AC", "A", "C", 30.0)
        .build();

    assert!(matches!(
        solver.solve(&registry),
        Err(ClearingError::Infeasible { .. })
    ));
}

#[rstest]
fn demand_at_full_capacity(solver: DispatchSolver<ClarabelBackend>) {
    let registry = Market::default()
        .region("NSW", 100.0)
        .generator("G1", "NSW", STACK)
        .build();

    let outcome = solver.solve(&registry).unwrap();
    let g1 = &outcome.generators["G1"];

    for (value, expected) in g1.segments.iter().zip([50.0, 30.0, 10.0, 10.0]) {
        assert_abs_diff_eq!(*value, expected, epsilon = 1e-5);
    }
    assert_abs_diff_eq!(outcome.regions["NSW"].price, 40.0, epsilon = 1e-6);
}

#[rstest]
fn decimal_import_exactly_covers_demand(solver: DispatchSolver<ClarabelBackend>) {
    // 0.7 MW local plus 0.1 MW import meets 0.8 MW exactly
    let registry = Market::default()
        .region("NSW", 0.0)
        .region("VIC", 0.8)
        .generator("G1", "NSW", &[(10.0, 5.0)])
        .generator("G2", "VIC", &[(20.0, 0.7)])
        .link("VNI", "NSW", "VIC", 0.1)
        .build();

    let outcome = solver.solve(&registry).unwrap();

    assert_abs_diff_eq!(outcome.generators["G1"].dispatch, 0.1, epsilon = 1e-5);
    assert_abs_diff_eq!(outcome.generators["G2"].dispatch, 0.7, epsilon = 1e-5);
    assert_abs_diff_eq!(outcome.links["VNI"].flow, 0.1, epsilon = 1e-5);
    assert!(outcome.links["VNI"].congested);
    assert_abs_diff_eq!(outcome.regions["NSW"].price, 10.0, epsilon = 1e-6);
    assert_abs_diff_eq!(outcome.regions["VIC"].price, 20.0, epsilon = 1e-6);
}

#[rstest]
fn decimal_capacity_exactly_covers_connected_demand(solver: DispatchSolver<ClarabelBackend>) {
    let registry = Market::default()
        .region("A", 0.1)
        .region("B", 0.2)
        .generator("G1", "A", &[(10.0, 0.3)])
        .link("AB", "A", "B", 1.0)
        .build();

    let outcome = solver.solve(&registry).unwrap();

    assert_abs_diff_eq!(outcome.generators["G1"].dispatch, 0.3, epsilon = 1e-5);
    assert_abs_diff_eq!(outcome.links["AB"].flow, 0.2, epsilon = 1e-5);
    assert!(!outcome.links["AB"].congested);
    assert_abs_diff_eq!(outcome.regions["A"].price, 10.0, epsilon = 1e-6);
    assert_abs_diff_eq!(outcome.regions["B"].price, 10.0, epsilon = 1e-6);
}

#[rstest]
fn zero_demand(solver: DispatchSolver<ClarabelBackend>) {
    let registry = Market::default()
        .region("NSW", 0.0)
        .region("TAS", 0.0)
        .generator("G1", "NSW", STACK)
        .build();

    let outcome = solver.solve(&registry).unwrap();

    assert_abs_diff_eq!(outcome.generators["G1"].dispatch, 0.0, epsilon = 1e-5);
    assert_abs_diff_eq!(outcome.total_cost, 0.0, epsilon = 1e-4);
    // the cheapest increment available
    assert_abs_diff_eq!(outcome.regions["NSW"].price, 10.0, epsilon = 1e-6);
    // no generators, links or demand: nothing to price
    assert_eq!(outcome.regions["TAS"].price, 0.0);
}

#[rstest]
fn empty_market(solver: DispatchSolver<ClarabelBackend>) {
    let registry = Market::default().build();
    let outcome = solver.solve(&registry).unwrap();

    assert!(outcome.generators.is_empty());
    assert!(outcome.regions.is_empty());
    assert_eq!(outcome.total_cost, 0.0);
}

#[rstest]
#[case::marginal_unit(PricingRule::MarginalUnit)]
#[case::shadow_price(PricingRule::ShadowPrice)]
fn pricing_rules_agree_when_dual_is_unique(#[case] pricing: PricingRule) {
    let solver = DispatchSolver::new(
        ClarabelBackend::default(),
        DispatchSettings {
            pricing,
            ..Default::default()
        },
    );
    let registry = Market::default()
        .region("NSW", 70.0)
        .generator("G1", "NSW", STACK)
        .build();

    let outcome = solver.solve(&registry).unwrap();
    assert_abs_diff_eq!(outcome.regions["NSW"].price, 20.0, epsilon = 1e-5);
}

#[test]
fn registry_from_json() {
    let registry: nem_core::models::Registry = serde_json::from_str(
        r#"{
            "regions": { "NSW": { "demand": 60.0 }, "VIC": { "demand": 30.0 } },
            "generators": {
                "ERARING": {
                    "region": "NSW",
                    "capacity": 100.0,
                    "bids": [
                        { "price": 10.0, "quantity": 50.0 },
                        { "price": 20.0, "quantity": 30.0 },
                        { "price": 30.0, "quantity": 10.0 },
                        { "price": 40.0, "quantity": 10.0 }
                    ]
                }
            },
            "links": { "VNI": { "from": "NSW", "to": "VIC", "limit": 50.0 } }
        }"#,
    )
    .unwrap();

    let outcome = DispatchSolver::<ClarabelBackend>::default()
        .solve(&registry)
        .unwrap();

    // 90 in total reaches into the third segment, with 30 exported over the open link
    assert_abs_diff_eq!(outcome.generators["ERARING"].dispatch, 90.0, epsilon = 1e-6);
    assert_abs_diff_eq!(outcome.links["VNI"].flow, 30.0, epsilon = 1e-6);
    assert_abs_diff_eq!(outcome.regions["NSW"].price, 30.0, epsilon = 1e-6);
    assert_abs_diff_eq!(outcome.regions["VIC"].price, 30.0, epsilon = 1e-6);
}

#[test]
fn repeated_json_identifier_is_rejected() {
    let result = serde_json::from_str::<nem_core::models::Registry>(
        r#"{
            "regions": { "NSW": { "demand": 60.0 } },
            "generators": {
                "G1": { "region": "NSW", "capacity": 100.0, "bids": [{ "price": 10.0, "quantity": 100.0 }] },
                "G1": { "region": "NSW", "capacity": 50.0, "bids": [{ "price": 20.0, "quantity": 50.0 }] }
            }
        }"#,
    );

    let error = result.unwrap_err();
    assert!(error.to_string().contains("duplicate identifier G1"));
}
