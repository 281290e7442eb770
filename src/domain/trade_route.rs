//! Route search across market pairs, plus the result record and ordering.

use std::collections::HashSet;

use super::entities::{MarketState, PlayerProfile};
use super::evaluation::evaluate_route;

/// A profitable trade found in one search cycle: buy at the source,
/// sail, sell at the destination. Ephemeral; recomputed every cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct TradeRoute {
    pub source_market: String,
    pub dest_market: String,
    pub product: String,
    /// Units actually worth hauling this trip.
    pub quantity: u32,
    /// Units the source market had on offer.
    pub available: u32,
    pub total_buy: i64,
    pub total_sell: i64,
    pub profit: i64,
    /// Rounded to one decimal for display.
    pub profit_per_pound: f64,
    pub profit_per_item: f64,
}

impl TradeRoute {
    /// Table cell "traded/available", e.g. "4/7".
    pub fn quantity_label(&self) -> String {
        format!("{}/{}", self.quantity, self.available)
    }
}

/// Static mapping from island group name to its member markets, loaded
/// from config. Only used to scope the search.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IslandGroups {
    groups: Vec<(String, Vec<String>)>,
}

impl IslandGroups {
    pub fn new(groups: Vec<(String, Vec<String>)>) -> Self {
        Self { groups }
    }

    /// Group names in config order, for the checkbox panels.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(name, _)| name.as_str())
    }

    pub fn first_name(&self) -> Option<&str> {
        self.groups.first().map(|(name, _)| name.as_str())
    }

    /// Every member market in config order.
    pub fn markets(&self) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .flat_map(|(_, markets)| markets.iter().map(String::as_str))
    }

    pub fn group_of(&self, market_name: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|(_, markets)| markets.iter().any(|m| m == market_name))
            .map(|(name, _)| name.as_str())
    }
}

/// Enumerates every (source, destination, product) combination within the
/// selected groups and keeps the routes beating the player's profit floor.
pub fn search_routes(
    start_groups: &HashSet<String>,
    end_groups: &HashSet<String>,
    player: &PlayerProfile,
    markets: &[MarketState],
    groups: &IslandGroups,
) -> Vec<TradeRoute> {
    let in_groups = |market: &MarketState, selected: &HashSet<String>| {
        groups
            .group_of(&market.name)
            .map(|group| selected.contains(group))
            .unwrap_or(false)
    };

    let sources: Vec<&MarketState> = markets.iter().filter(|m| in_groups(m, start_groups)).collect();
    let dests: Vec<&MarketState> = markets.iter().filter(|m| in_groups(m, end_groups)).collect();

    let mut routes = Vec::new();
    for source in &sources {
        for dest in &dests {
            // A market may sit in both selections; never trade with itself.
            if source.is_same(dest) {
                continue;
            }
            for product in &source.products {
                if let Some(route) = evaluate_route(source, dest, &product.name, player) {
                    // Strictly above the floor; an exact match is dropped.
                    if route.profit as f64 > player.min_profit {
                        routes.push(route);
                    }
                }
            }
        }
    }

    sort_routes(&mut routes);
    routes
}

/// Source market name ascending, best profit first within each source.
/// Stable, so equal entries keep their enumeration order.
pub fn sort_routes(routes: &mut [TradeRoute]) {
    routes.sort_by(|a, b| {
        a.source_market
            .cmp(&b.source_market)
            .then(b.profit.cmp(&a.profit))
    });
}
