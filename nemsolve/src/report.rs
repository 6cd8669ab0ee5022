//! A console rendering of a market outcome.

use nem_core::models::MarketOutcome;
use std::io::Write;

/// Write the dispatch schedule, flows and prices as plain text.
pub fn write_table(outcome: &MarketOutcome, buffer: &mut impl Write) -> std::io::Result<()> {
    writeln!(buffer, "Status: Optimal")?;
    writeln!(buffer, "Total Cost: ${:.2}", outcome.total_cost)?;

    writeln!(buffer)?;
    writeln!(buffer, "Dispatch Schedule:")?;
    for (region_id, region) in outcome.regions.iter() {
        writeln!(buffer)?;
        writeln!(
            buffer,
            "Region {region_id} (demand {:.2} MW, price ${:.2}/MWh):",
            region.demand, region.price
        )?;
        for (generator_id, generator) in outcome
            .generators
            .iter()
            .filter(|(_, generator)| &generator.region == region_id)
        {
            writeln!(buffer, "{generator_id}: {:.2} MW", generator.dispatch)?;
        }
    }

    if !outcome.links.is_empty() {
        writeln!(buffer)?;
        writeln!(buffer, "Interconnector Flows:")?;
        for (link_id, link) in outcome.links.iter() {
            let note = if link.congested { " (at limit)" } else { "" };
            writeln!(buffer, "{link_id}: {:.2} MW{note}", link.flow)?;
        }
    }

    writeln!(buffer)?;
    writeln!(buffer, "Regional Prices:")?;
    for (region_id, region) in outcome.regions.iter() {
        writeln!(
            buffer,
            "{region_id}: ${:.2}/MWh (shadow ${:.2}, net import {:.2} MW)",
            region.price, region.shadow_price, region.net_import
        )?;
    }

    Ok(())
}
