//! Route evaluation: how much of one product can move from one market to
//! another under the player's constraints, and what the trip earns.

use super::entities::{CapacityMode, MarketState, PlayerProfile};
use super::trade_route::TradeRoute;

/// Evaluates a single (source, destination, product) candidate.
///
/// Returns `None` when the product is unknown at either market, either
/// side's snapshot is stale this cycle, or no unit can be moved.
pub fn evaluate_route(
    source: &MarketState,
    dest: &MarketState,
    product_name: &str,
    player: &PlayerProfile,
) -> Option<TradeRoute> {
    let source_product = source.product(product_name)?;
    let dest_product = dest.product(product_name)?;
    if source_product.stale || dest_product.stale {
        return None;
    }

    // One trip cannot equalize the two markets beyond half their supply
    // gap, on top of what the player can afford and carry.
    let supply_gap = ((source_product.supply - dest_product.supply).abs() / 2.0).floor();
    let max_qty = source_product
        .max_quantity(player, CapacityMode::Principal)
        .min(source_product.max_quantity(player, CapacityMode::Mass))
        .min(source_product.max_quantity(player, CapacityMode::Volume))
        .min(clamp_gap(supply_gap));
    if max_qty == 0 {
        return None;
    }

    let total_buy = source_product.cumulative_buy_cost(max_qty);
    let total_sell = dest_product.cumulative_sell_revenue(max_qty);
    let profit = total_sell - total_buy;

    let profit_per_pound = if source_product.weight != 0.0 {
        profit as f64 / (source_product.weight * max_qty as f64)
    } else {
        0.0
    };
    let profit_per_item = profit as f64 / max_qty as f64;

    Some(TradeRoute {
        source_market: source.name.clone(),
        dest_market: dest.name.clone(),
        product: source_product.name.clone(),
        quantity: max_qty,
        available: source_product.available,
        total_buy,
        total_sell,
        profit,
        profit_per_pound: round_tenth(profit_per_pound),
        profit_per_item: round_tenth(profit_per_item),
    })
}

fn clamp_gap(value: f64) -> u32 {
    if value <= 0.0 {
        0
    } else if value >= u32::MAX as f64 {
        u32::MAX
    } else {
        value as u32
    }
}

/// Display rounding for the per-unit profit figures.
fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
