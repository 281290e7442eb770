#![allow(dead_code)]

use serde::{Deserialize, Serialize};

use super::pricing;

/// Static catalog entry for one tradeable product, loaded from config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductDef {
    pub name: String,
    /// Hold volume one unit occupies.
    pub volume: f64,
    /// Weight of one unit in pounds.
    pub weight: f64,
    /// Raw price before currency conversion.
    pub raw_price: f64,
}

/// Ordered product catalog.
///
/// A product's position in the catalog is also its supply-array index in
/// game memory, so the order is fixed for the session and every market
/// holds its products in exactly this order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductCatalog {
    defs: Vec<ProductDef>,
}

impl ProductCatalog {
    pub fn new(defs: Vec<ProductDef>) -> Self {
        Self { defs }
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductDef> {
        self.defs.iter()
    }

    pub fn get(&self, index: usize) -> Option<&ProductDef> {
        self.defs.get(index)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.defs.iter().position(|def| def.name == name)
    }
}

/// Player constraints for route evaluation. Replaced wholesale on edit;
/// invalid input never reaches this struct.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    /// Capital in the active currency.
    pub principal: f64,
    /// Multiplier from raw price units to the active currency.
    pub conversion_rate: f64,
    /// Max cargo weight the ship handles in rough seas.
    pub mass_limit: f64,
    /// Max cargo volume of the hold.
    pub volume_limit: f64,
    /// Routes below this profit are not shown.
    pub min_profit: f64,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self {
            principal: 10_000.0,
            conversion_rate: 311.0,
            mass_limit: 1_000.0,
            volume_limit: 40.0,
            min_profit: 50.0,
        }
    }
}

/// Which constraint bounds the purchase quantity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapacityMode {
    Mass,
    Volume,
    Principal,
}

/// Live pricing snapshot of one product at one market.
///
/// All derived fields are recomputed together by [`ProductState::refresh`];
/// a failed supply read flips `stale` and leaves the previous snapshot
/// untouched so no half-updated state is ever observable.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductState {
    pub name: String,
    pub volume: f64,
    pub weight: f64,
    pub raw_price: f64,
    /// Price-sensitivity limit inherited from the market.
    pub limit: f64,
    pub supply: f64,
    pub base_price: f64,
    pub sell_price: i64,
    pub buy_price: i64,
    /// Units purchasable before the market runs dry: max(0, floor(supply - limit + 1)).
    pub available: u32,
    /// Set when the last supply read faulted; stale products are excluded
    /// from route search for the cycle.
    pub stale: bool,
}

impl ProductState {
    /// Builds an unrefreshed (stale) state from a catalog definition.
    pub fn new(def: &ProductDef, limit: f64) -> Self {
        Self {
            name: def.name.clone(),
            volume: def.volume,
            weight: def.weight,
            raw_price: def.raw_price,
            limit,
            supply: 0.0,
            base_price: 0.0,
            sell_price: 0,
            buy_price: 0,
            available: 0,
            stale: true,
        }
    }

    /// Applies a new supply reading, recomputing every derived field.
    /// `None` marks the product stale for this cycle without touching the
    /// prior snapshot.
    pub fn refresh(&mut self, reading: Option<f64>, conversion_rate: f64) {
        let Some(supply) = reading else {
            self.stale = true;
            return;
        };
        self.supply = supply;
        self.base_price = self.raw_price * conversion_rate;
        self.sell_price = pricing::sell_price(self.base_price, supply);
        self.buy_price = pricing::markup(self.sell_price);
        self.available = clamp_units((supply - self.limit + 1.0).floor());
        self.stale = false;
    }

    /// Total cost of buying `quantity` units one after another. Each
    /// purchase depletes supply by one, so the per-unit price climbs as
    /// the market empties.
    pub fn cumulative_buy_cost(&self, quantity: u32) -> i64 {
        (0..quantity)
            .map(|i| pricing::buy_price(self.base_price, self.supply - i as f64))
            .sum()
    }

    /// Total revenue from selling `quantity` units one after another.
    /// Each sale raises supply by one, so the per-unit price falls.
    pub fn cumulative_sell_revenue(&self, quantity: u32) -> i64 {
        (0..quantity)
            .map(|i| pricing::sell_price(self.base_price, self.supply + i as f64))
            .sum()
    }

    /// Largest quantity the player can carry or afford under one constraint.
    pub fn max_quantity(&self, player: &PlayerProfile, mode: CapacityMode) -> u32 {
        match mode {
            CapacityMode::Mass => capacity_units(player.mass_limit, self.weight),
            CapacityMode::Volume => capacity_units(player.volume_limit, self.volume),
            CapacityMode::Principal => {
                // Sequential accumulation, bounded by the market's stock.
                // Ceiling rounding per unit makes this differ from any
                // closed-form search, so the unit-at-a-time loop stays.
                let mut count = 0u32;
                let mut total = 0i64;
                while count < self.available {
                    total += pricing::buy_price(self.base_price, self.supply - count as f64);
                    if total as f64 > player.principal {
                        break;
                    }
                    count += 1;
                }
                count
            }
        }
    }
}

fn capacity_units(limit: f64, per_unit: f64) -> u32 {
    if per_unit <= 0.0 {
        // Weightless/volumeless product: the other constraints decide.
        return u32::MAX;
    }
    clamp_units((limit / per_unit).floor())
}

fn clamp_units(value: f64) -> u32 {
    if value <= 0.0 {
        0
    } else if value >= u32::MAX as f64 {
        u32::MAX
    } else {
        value as u32
    }
}

/// One discovered island market.
///
/// Identity (addresses, name, index) is resolved once at scan time and
/// immutable afterwards; only the product snapshots change on refresh.
#[derive(Clone, Debug, PartialEq)]
pub struct MarketState {
    /// Address the signature hit resolved to. Doubles as market identity:
    /// two markets can share a display name but never a base address.
    pub base: u64,
    /// Start of the market's per-product supply float array.
    pub supply_base: u64,
    pub name: String,
    pub index: i32,
    /// Price-sensitivity limit shared by all products at this market.
    pub limit: f64,
    /// One state per catalog product, in catalog order.
    pub products: Vec<ProductState>,
}

impl MarketState {
    pub fn new(
        base: u64,
        supply_base: u64,
        name: String,
        index: i32,
        limit: f64,
        catalog: &ProductCatalog,
    ) -> Self {
        let products = catalog
            .iter()
            .map(|def| ProductState::new(def, limit))
            .collect();
        Self {
            base,
            supply_base,
            name,
            index,
            limit,
            products,
        }
    }

    /// Refreshes every product in catalog order. `reading` supplies the
    /// raw supply level for the product at that catalog index, or `None`
    /// when the read faulted.
    pub fn refresh<F>(&mut self, conversion_rate: f64, mut reading: F)
    where
        F: FnMut(usize) -> Option<f64>,
    {
        for (index, product) in self.products.iter_mut().enumerate() {
            product.refresh(reading(index), conversion_rate);
        }
    }

    pub fn product(&self, name: &str) -> Option<&ProductState> {
        self.products.iter().find(|p| p.name == name)
    }

    /// Identity comparison; display names are not unique ("Unknown Market").
    pub fn is_same(&self, other: &MarketState) -> bool {
        self.base == other.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ProductCatalog {
        ProductCatalog::new(vec![
            ProductDef {
                name: "Crate".into(),
                volume: 3.0,
                weight: 10.0,
                raw_price: 2.0,
            },
            ProductDef {
                name: "Barrel".into(),
                volume: 4.0,
                weight: 25.0,
                raw_price: 3.5,
            },
        ])
    }

    fn refreshed(supply: f64) -> ProductState {
        let mut state = ProductState::new(catalog().get(0).unwrap(), 0.0);
        state.refresh(Some(supply), 311.0);
        state
    }

    #[test]
    fn refresh_recomputes_all_derived_fields() {
        let state = refreshed(0.6);
        assert_eq!(state.base_price, 622.0);
        assert_eq!(state.sell_price, 620);
        assert_eq!(state.buy_price, 635);
        assert_eq!(state.available, 1);
        assert!(!state.stale);
    }

    #[test]
    fn failed_reading_keeps_prior_snapshot() {
        let mut state = refreshed(0.6);
        state.refresh(None, 311.0);
        assert!(state.stale);
        assert_eq!(state.sell_price, 620);
        assert_eq!(state.supply, 0.6);
        // A later good reading clears the flag.
        state.refresh(Some(0.6), 311.0);
        assert!(!state.stale);
    }

    #[test]
    fn available_never_negative() {
        let mut state = ProductState::new(catalog().get(0).unwrap(), 5.0);
        state.refresh(Some(0.3), 311.0);
        assert_eq!(state.available, 0);
    }

    #[test]
    fn cumulative_costs_of_zero_are_zero() {
        let state = refreshed(0.6);
        assert_eq!(state.cumulative_buy_cost(0), 0);
        assert_eq!(state.cumulative_sell_revenue(0), 0);
    }

    #[test]
    fn cumulative_buy_cost_is_monotone() {
        let state = refreshed(0.9);
        let mut previous = 0;
        for quantity in 1..=8 {
            let cost = state.cumulative_buy_cost(quantity);
            assert!(cost >= previous, "cost dropped at quantity {quantity}");
            previous = cost;
        }
    }

    #[test]
    fn buying_into_the_steep_branch_raises_unit_cost() {
        // Starting above 0.5, the second simulated unit is priced at
        // supply -0.4 on the steep branch and must cost more than the first.
        let state = refreshed(0.6);
        let first = state.cumulative_buy_cost(1);
        let second = state.cumulative_buy_cost(2) - first;
        assert!(second > first);
    }

    #[test]
    fn mass_and_volume_caps() {
        let state = refreshed(0.6);
        let player = PlayerProfile {
            mass_limit: 95.0,
            volume_limit: 10.0,
            ..PlayerProfile::default()
        };
        assert_eq!(state.max_quantity(&player, CapacityMode::Mass), 9);
        assert_eq!(state.max_quantity(&player, CapacityMode::Volume), 3);
    }

    #[test]
    fn principal_cap_is_maximal() {
        let mut state = ProductState::new(catalog().get(0).unwrap(), -10.0);
        state.refresh(Some(0.9), 311.0);
        assert!(state.available >= 10);

        let player = PlayerProfile {
            principal: 2_000.0,
            ..PlayerProfile::default()
        };
        let quantity = state.max_quantity(&player, CapacityMode::Principal);
        assert!(quantity > 0);
        assert!(state.cumulative_buy_cost(quantity) as f64 <= player.principal);
        assert!(state.cumulative_buy_cost(quantity + 1) as f64 > player.principal);
    }

    #[test]
    fn principal_cap_bounded_by_available() {
        let mut state = ProductState::new(catalog().get(0).unwrap(), 0.0);
        state.refresh(Some(1.8), 311.0);
        assert_eq!(state.available, 2);

        let player = PlayerProfile {
            principal: 1_000_000.0,
            ..PlayerProfile::default()
        };
        assert_eq!(state.max_quantity(&player, CapacityMode::Principal), 2);
    }

    #[test]
    fn market_refresh_walks_catalog_order() {
        let catalog = catalog();
        let mut market = MarketState::new(0x1000, 0x2000, "Gold Rock".into(), 3, 0.0, &catalog);
        market.refresh(311.0, |index| Some(0.1 + index as f64 * 0.5));
        assert_eq!(market.products[0].supply, 0.1);
        assert_eq!(market.products[1].supply, 0.6);
        assert!(market.product("Barrel").is_some());
        assert!(market.product("Rum").is_none());
    }

    #[test]
    fn market_identity_is_address_not_name() {
        let catalog = catalog();
        let a = MarketState::new(0x1000, 0x2000, "Unknown Market".into(), 0, 0.0, &catalog);
        let b = MarketState::new(0x9000, 0xA000, "Unknown Market".into(), 1, 0.0, &catalog);
        assert!(a.is_same(&a));
        assert!(!a.is_same(&b));
    }
}
