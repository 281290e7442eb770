//! Market discovery and the per-cycle supply refresh.
//!
//! Markets are located by a fixed byte signature; everything else hangs
//! off the resolved base address through short pointer chains. The
//! offsets mirror the game's market object layout and must stay in sync
//! with [`crate::infra::sim`], which fabricates the same layout.

use thiserror::Error;

use crate::domain::{MarketState, ProductCatalog};
use crate::infra::memory::{MemoryError, ProcessMemory, ScalarKind};

/// A valid game state always exposes exactly this many markets.
pub const EXPECTED_MARKET_COUNT: usize = 27;

/// Signature the market objects carry; `None` bytes vary per market.
pub(crate) const MARKET_SIGNATURE: [Option<u8>; 22] = [
    None,
    None,
    Some(0x00),
    Some(0x00),
    Some(0x80),
    Some(0x3F),
    Some(0x00),
    Some(0x00),
    None,
    Some(0x42),
    None,
    Some(0x00),
    Some(0x00),
    Some(0x00),
    Some(0x6F),
    Some(0x12),
    Some(0x83),
    Some(0x3A),
    Some(0x00),
    Some(0x00),
    Some(0x80),
    Some(0x3F),
];

/// The signature sits this far into the market object.
pub(crate) const SIGNATURE_OFFSET: u64 = 0x4E;
/// Pointer to the market info block (name pointer, numeric index).
pub(crate) const INFO_PTR_OFFSET: u64 = 0x38;
pub(crate) const INFO_INDEX_OFFSET: u64 = 0x58;
pub(crate) const INFO_NAME_PTR_OFFSET: u64 = 0x18;
/// UTF-16 string block: u32 length, then the code units.
pub(crate) const NAME_LEN_OFFSET: u64 = 0x10;
pub(crate) const NAME_DATA_OFFSET: u64 = 0x14;
/// Price-sensitivity limit float, partially overlapped by the signature.
pub(crate) const LIMIT_OFFSET: u64 = 0x4C;
/// Pointer to the block holding the per-product supply array.
pub(crate) const SUPPLY_PTR_OFFSET: u64 = 0x20;
pub(crate) const SUPPLY_BASE_OFFSET: u64 = 0x24;
pub(crate) const SUPPLY_STRIDE: u64 = 4;

/// Fallback when the name pointer chain cannot be followed.
pub const UNKNOWN_MARKET: &str = "Unknown Market";

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("market scan found {found} markets, expected {EXPECTED_MARKET_COUNT}")]
    MarketCount { found: usize },
    #[error(transparent)]
    Memory(#[from] MemoryError),
}

/// Scans the process for market objects and builds their states.
///
/// Any hit count other than [`EXPECTED_MARKET_COUNT`] is a failed scan;
/// the caller keeps its previous market list in that case.
pub fn discover_markets(
    mem: &dyn ProcessMemory,
    catalog: &ProductCatalog,
) -> Result<Vec<MarketState>, DiscoveryError> {
    let hits = mem.pattern_scan(&MARKET_SIGNATURE);
    if hits.len() != EXPECTED_MARKET_COUNT {
        return Err(DiscoveryError::MarketCount { found: hits.len() });
    }

    let mut markets = Vec::with_capacity(hits.len());
    for hit in hits {
        let base = hit - SIGNATURE_OFFSET;
        let (name, index) = resolve_identity(mem, base);
        let limit = mem
            .read_scalar(base + LIMIT_OFFSET, ScalarKind::Float32)?
            .as_f64();
        let supply_base = mem.read_ptr(base + SUPPLY_PTR_OFFSET)? + SUPPLY_BASE_OFFSET;
        markets.push(MarketState::new(
            base,
            supply_base,
            name,
            index,
            limit,
            catalog,
        ));
    }

    for market in &markets {
        println!(
            "{:#x}  {:02} {}",
            market.base, market.index, market.name
        );
    }
    Ok(markets)
}

/// Display name and numeric index via the info-block pointer chain.
/// Faults along the chain fall back to the sentinel identity rather than
/// failing the scan.
fn resolve_identity(mem: &dyn ProcessMemory, base: u64) -> (String, i32) {
    match try_resolve_identity(mem, base) {
        Ok(identity) => identity,
        Err(_) => (UNKNOWN_MARKET.to_string(), -1),
    }
}

fn try_resolve_identity(mem: &dyn ProcessMemory, base: u64) -> Result<(String, i32), MemoryError> {
    let info = mem.read_ptr(base + INFO_PTR_OFFSET)?;
    let index = mem
        .read_scalar(info + INFO_INDEX_OFFSET, ScalarKind::Int32)?
        .as_i64() as i32;

    let name_block = mem.read_ptr(info + INFO_NAME_PTR_OFFSET)?;
    let length = mem
        .read_scalar(name_block + NAME_LEN_OFFSET, ScalarKind::Int32)?
        .as_i64()
        .max(0) as usize;
    let raw = mem.read_bytes(name_block + NAME_DATA_OFFSET, length * 2)?;
    let units: Vec<u16> = raw
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    Ok((String::from_utf16_lossy(&units), index))
}

/// Refreshes every market's products from live supply readings.
///
/// A faulting read only blanks that one product for the cycle; the rest
/// of the refresh carries on.
pub fn refresh_markets(mem: &dyn ProcessMemory, markets: &mut [MarketState], conversion_rate: f64) {
    for market in markets.iter_mut() {
        let supply_base = market.supply_base;
        let name = market.name.clone();
        market.refresh(conversion_rate, |index| {
            let address = supply_base + index as u64 * SUPPLY_STRIDE;
            match mem.read_scalar(address, ScalarKind::Float32) {
                Ok(value) => Some(value.as_f64()),
                Err(err) => {
                    println!("⚠️ Supply read failed at {name}[{index}]: {err}");
                    None
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ProductCatalog, ProductDef};
    use crate::infra::sim::{SimMarket, SimulatedGame};

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

    fn full_game() -> SimulatedGame {
        let markets = (0..EXPECTED_MARKET_COUNT)
            .map(|i| SimMarket {
                name: format!("Isle {i}"),
                index: i as i32,
                limit: 0.1,
                supplies: vec![0.2 + i as f32 * 0.01, 0.7],
            })
            .collect();
        SimulatedGame::new(markets)
    }

    #[test]
    fn discovers_all_markets_with_identity() {
        let game = full_game();
        let markets = discover_markets(&game, &catalog()).expect("scan should succeed");
        assert_eq!(markets.len(), EXPECTED_MARKET_COUNT);
        assert_eq!(markets[3].name, "Isle 3");
        assert_eq!(markets[3].index, 3);
        assert!((markets[3].limit - 0.1).abs() < 1e-6);
        assert_eq!(markets[3].products.len(), 2);
        // Freshly discovered products are stale until the first refresh.
        assert!(markets[3].products.iter().all(|p| p.stale));
    }

    #[test]
    fn wrong_market_count_fails_the_scan() {
        let game = SimulatedGame::new(vec![SimMarket {
            name: "Lonely".into(),
            index: 0,
            limit: 0.0,
            supplies: vec![0.5, 0.5],
        }]);
        match discover_markets(&game, &catalog()) {
            Err(DiscoveryError::MarketCount { found }) => assert_eq!(found, 1),
            other => panic!("expected count mismatch, got {other:?}"),
        }
    }

    #[test]
    fn refresh_maps_catalog_index_to_supply_slot() {
        let game = full_game();
        let mut markets = discover_markets(&game, &catalog()).unwrap();
        refresh_markets(&game, &mut markets, 311.0);

        let market = &markets[5];
        assert!((market.products[0].supply - 0.25).abs() < 1e-6);
        assert!((market.products[1].supply - 0.7).abs() < 1e-6);
        assert!(market.products.iter().all(|p| !p.stale));
    }

    #[test]
    fn faulting_supply_read_only_stales_that_product() {
        let game = full_game();
        let mut markets = discover_markets(&game, &catalog()).unwrap();
        refresh_markets(&game, &mut markets, 311.0);

        game.inject_fault(markets[2].supply_base);
        refresh_markets(&game, &mut markets, 311.0);

        assert!(markets[2].products[0].stale);
        assert!(!markets[2].products[1].stale);
        assert!(markets[3].products.iter().all(|p| !p.stale));
        // The stale product keeps its previous reading.
        assert!((markets[2].products[0].supply - 0.22).abs() < 1e-6);
    }

    #[test]
    fn broken_name_chain_yields_sentinel_identity() {
        let game = full_game();
        // Fault the info pointer of the first market object.
        let first_base = game.market_base(0);
        game.inject_fault(first_base + INFO_PTR_OFFSET);

        let markets = discover_markets(&game, &catalog()).unwrap();
        let broken = markets.iter().find(|m| m.base == first_base).unwrap();
        assert_eq!(broken.name, UNKNOWN_MARKET);
        assert_eq!(broken.index, -1);
        // The rest still resolve normally.
        assert!(markets.iter().any(|m| m.name == "Isle 1"));
    }
}
