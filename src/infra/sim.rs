#![allow(dead_code)]

//! Simulated game-memory image.
//!
//! Fabricates the exact market object layout discovery expects (signature
//! bytes, pointer chains, UTF-16 names, supply arrays) inside a plain byte
//! buffer. Used as the demo backend when no live process backend is
//! compiled in, and as the fixture for discovery/refresh tests. Supports
//! fault injection to exercise the read-failure paths.

use std::collections::HashSet;
use std::sync::{Mutex, RwLock};

use crate::infra::discovery::{
    INFO_INDEX_OFFSET, INFO_NAME_PTR_OFFSET, INFO_PTR_OFFSET, LIMIT_OFFSET, NAME_DATA_OFFSET,
    NAME_LEN_OFFSET, SIGNATURE_OFFSET, SUPPLY_BASE_OFFSET, SUPPLY_PTR_OFFSET, SUPPLY_STRIDE,
};
use crate::infra::memory::{MemoryError, ProcessMemory};

/// Where the fake image is mapped. Arbitrary but stable, so test
/// addresses are easy to eyeball.
const ORIGIN: u64 = 0x0050_0000;
/// One market object plus its side blocks per slot.
const SLOT_SIZE: u64 = 0x400;
/// Slot-relative offsets of the fabricated side blocks.
const INFO_BLOCK: u64 = 0x100;
const NAME_BLOCK: u64 = 0x180;
const SUPPLY_BLOCK: u64 = 0x200;

/// Constant tail of the market signature (bytes after the two wildcard
/// limit bytes), with arbitrary values in the wildcard slots.
const SIGNATURE_TAIL: [u8; 20] = [
    0x00, 0x00, 0x80, 0x3F, 0x00, 0x00, 0x20, 0x42, 0x01, 0x00, 0x00, 0x00, 0x6F, 0x12, 0x83,
    0x3A, 0x00, 0x00, 0x80, 0x3F,
];

/// Blueprint for one fabricated market.
#[derive(Clone, Debug)]
pub struct SimMarket {
    pub name: String,
    pub index: i32,
    pub limit: f32,
    /// One supply level per catalog product.
    pub supplies: Vec<f32>,
}

pub struct SimulatedGame {
    mem: RwLock<Vec<u8>>,
    faults: Mutex<HashSet<u64>>,
    /// Initial supplies, kept so [`tick`](Self::tick) can wander around them.
    baseline: Vec<Vec<f32>>,
    ticks: Mutex<u64>,
}

impl SimulatedGame {
    pub fn new(markets: Vec<SimMarket>) -> Self {
        let mut mem = vec![0u8; markets.len() * SLOT_SIZE as usize];
        for (slot, market) in markets.iter().enumerate() {
            write_market(&mut mem, slot, market);
        }
        Self {
            mem: RwLock::new(mem),
            faults: Mutex::new(HashSet::new()),
            baseline: markets.into_iter().map(|m| m.supplies).collect(),
            ticks: Mutex::new(0),
        }
    }

    /// A full 27-market world using the given market names, with spread-out
    /// deterministic supplies so the route table has something to show.
    pub fn sample(names: &[String], product_count: usize) -> Self {
        let markets = names
            .iter()
            .enumerate()
            .map(|(i, name)| SimMarket {
                name: name.clone(),
                index: i as i32,
                limit: 0.05,
                supplies: (0..product_count)
                    .map(|j| {
                        // Stagger supplies across [-1, 9] so different
                        // market pairs disagree enough to trade.
                        let step = (i * 5 + j * 11) % 21;
                        step as f32 * 0.5 - 1.0
                    })
                    .collect(),
            })
            .collect();
        Self::new(markets)
    }

    /// Base address of the market object in the given slot.
    pub fn market_base(&self, slot: usize) -> u64 {
        ORIGIN + slot as u64 * SLOT_SIZE
    }

    /// Makes every read touching `address` fault until cleared.
    pub fn inject_fault(&self, address: u64) {
        self.faults.lock().expect("fault set poisoned").insert(address);
    }

    pub fn clear_faults(&self) {
        self.faults.lock().expect("fault set poisoned").clear();
    }

    pub fn set_supply(&self, slot: usize, product: usize, value: f32) {
        let address = self.market_base(slot) + SUPPLY_BLOCK + SUPPLY_BASE_OFFSET
            + product as u64 * SUPPLY_STRIDE;
        let offset = (address - ORIGIN) as usize;
        let mut mem = self.mem.write().expect("sim memory poisoned");
        mem[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    /// Deterministically wanders every supply around its baseline so the
    /// polled view keeps changing between cycles.
    pub fn tick(&self) {
        let tick = {
            let mut ticks = self.ticks.lock().expect("tick counter poisoned");
            *ticks += 1;
            *ticks
        };
        for (slot, supplies) in self.baseline.iter().enumerate() {
            for (product, &base) in supplies.iter().enumerate() {
                let phase = ((tick + 3 * slot as u64 + 5 * product as u64) % 20) as f32 / 20.0;
                let wobble = if phase < 0.5 { phase } else { 1.0 - phase };
                self.set_supply(slot, product, base + wobble * 0.6 - 0.15);
            }
        }
    }
}

fn write_market(mem: &mut [u8], slot: usize, market: &SimMarket) {
    let base = slot * SLOT_SIZE as usize;
    let abs = |offset: u64| ORIGIN + (base as u64) + offset;

    mem[base + LIMIT_OFFSET as usize..base + LIMIT_OFFSET as usize + 4]
        .copy_from_slice(&market.limit.to_le_bytes());
    // Signature tail begins right after the two wildcard bytes, which are
    // the limit float's upper half.
    let tail = base + SIGNATURE_OFFSET as usize + 2;
    mem[tail..tail + SIGNATURE_TAIL.len()].copy_from_slice(&SIGNATURE_TAIL);

    let info = base + INFO_BLOCK as usize;
    mem[base + INFO_PTR_OFFSET as usize..base + INFO_PTR_OFFSET as usize + 8]
        .copy_from_slice(&abs(INFO_BLOCK).to_le_bytes());
    mem[info + INFO_INDEX_OFFSET as usize..info + INFO_INDEX_OFFSET as usize + 4]
        .copy_from_slice(&market.index.to_le_bytes());
    mem[info + INFO_NAME_PTR_OFFSET as usize..info + INFO_NAME_PTR_OFFSET as usize + 8]
        .copy_from_slice(&abs(NAME_BLOCK).to_le_bytes());

    let name = base + NAME_BLOCK as usize;
    let units: Vec<u16> = market.name.encode_utf16().collect();
    mem[name + NAME_LEN_OFFSET as usize..name + NAME_LEN_OFFSET as usize + 4]
        .copy_from_slice(&(units.len() as u32).to_le_bytes());
    let mut cursor = name + NAME_DATA_OFFSET as usize;
    for unit in units {
        mem[cursor..cursor + 2].copy_from_slice(&unit.to_le_bytes());
        cursor += 2;
    }

    mem[base + SUPPLY_PTR_OFFSET as usize..base + SUPPLY_PTR_OFFSET as usize + 8]
        .copy_from_slice(&abs(SUPPLY_BLOCK).to_le_bytes());
    let supplies = base + SUPPLY_BLOCK as usize + SUPPLY_BASE_OFFSET as usize;
    for (product, supply) in market.supplies.iter().enumerate() {
        let at = supplies + product * SUPPLY_STRIDE as usize;
        mem[at..at + 4].copy_from_slice(&supply.to_le_bytes());
    }
}

impl ProcessMemory for SimulatedGame {
    fn read_bytes(&self, address: u64, len: usize) -> Result<Vec<u8>, MemoryError> {
        {
            let faults = self.faults.lock().expect("fault set poisoned");
            if faults
                .iter()
                .any(|&fault| fault >= address && fault < address + len as u64)
            {
                return Err(MemoryError::ReadFault { address, len });
            }
        }
        let start = address
            .checked_sub(ORIGIN)
            .ok_or(MemoryError::ReadFault { address, len })? as usize;
        let mem = self.mem.read().expect("sim memory poisoned");
        mem.get(start..start + len)
            .map(<[u8]>::to_vec)
            .ok_or(MemoryError::ReadFault { address, len })
    }

    fn pattern_scan(&self, pattern: &[Option<u8>]) -> Vec<u64> {
        let mem = self.mem.read().expect("sim memory poisoned");
        mem.windows(pattern.len())
            .enumerate()
            .filter(|(_, window)| {
                window
                    .iter()
                    .zip(pattern)
                    .all(|(byte, expect)| expect.map(|e| e == *byte).unwrap_or(true))
            })
            .map(|(offset, _)| ORIGIN + offset as u64)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::discovery::MARKET_SIGNATURE;
    use crate::infra::memory::ScalarKind;

    fn two_markets() -> SimulatedGame {
        SimulatedGame::new(vec![
            SimMarket {
                name: "Neverisle".into(),
                index: 4,
                limit: 0.1,
                supplies: vec![0.6, -0.2],
            },
            SimMarket {
                name: "Gold Rock".into(),
                index: 9,
                limit: 0.2,
                supplies: vec![1.5, 0.0],
            },
        ])
    }

    #[test]
    fn signature_appears_once_per_market() {
        let game = two_markets();
        let hits = game.pattern_scan(&MARKET_SIGNATURE);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0] - SIGNATURE_OFFSET, game.market_base(0));
        assert_eq!(hits[1] - SIGNATURE_OFFSET, game.market_base(1));
    }

    #[test]
    fn supply_slots_are_readable_and_writable() {
        let game = two_markets();
        let address = game.market_base(1) + SUPPLY_BLOCK + SUPPLY_BASE_OFFSET;
        let value = game.read_scalar(address, ScalarKind::Float32).unwrap().as_f64();
        assert!((value - 1.5).abs() < 1e-6);

        game.set_supply(1, 0, 0.25);
        let value = game.read_scalar(address, ScalarKind::Float32).unwrap().as_f64();
        assert!((value - 0.25).abs() < 1e-6);
    }

    #[test]
    fn injected_faults_hit_overlapping_reads() {
        let game = two_markets();
        let address = game.market_base(0) + LIMIT_OFFSET;
        game.inject_fault(address + 2);
        assert!(game.read_bytes(address, 4).is_err());
        game.clear_faults();
        assert!(game.read_bytes(address, 4).is_ok());
    }

    #[test]
    fn tick_moves_supplies_but_stays_near_baseline() {
        let game = two_markets();
        let address = game.market_base(0) + SUPPLY_BLOCK + SUPPLY_BASE_OFFSET;
        game.tick();
        let moved = game.read_scalar(address, ScalarKind::Float32).unwrap().as_f64();
        assert!((moved - 0.6).abs() < 0.5);
    }
}
