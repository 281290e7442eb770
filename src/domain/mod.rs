//! Pricing, market state and route search logic lives here.

pub mod app_state;
pub mod entities;
pub mod evaluation;
pub mod pricing;
pub mod trade_route;

#[allow(unused_imports)]
pub use app_state::{AppState, PersistedState, ScanStatus};
#[allow(unused_imports)]
pub use entities::{
    CapacityMode, MarketState, PlayerProfile, ProductCatalog, ProductDef, ProductState,
};
#[allow(unused_imports)]
pub use evaluation::evaluate_route;
#[allow(unused_imports)]
pub use trade_route::{search_routes, sort_routes, IslandGroups, TradeRoute};
