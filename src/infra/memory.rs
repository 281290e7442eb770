#![allow(dead_code)]

//! Process-memory access contract.
//!
//! The scanner core never talks to a live process directly; it goes
//! through [`ProcessMemory`], which a platform backend (or the simulator)
//! implements with raw byte reads and signature scanning. Scalar decoding
//! is provided on top of `read_bytes` so every backend agrees on byte
//! order and widths.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("memory read fault at {address:#x} ({len} bytes)")]
    ReadFault { address: u64, len: usize },
}

/// Scalar encodings used by the game's data layouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarKind {
    Int32,
    Float32,
    /// 4-byte integer; the game tooling historically calls this "long".
    Long,
    Int64,
    Float32Be,
    Int32Be,
}

/// A decoded scalar. Integers widen to i64, floats to f64.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScalarValue {
    Int(i64),
    Float(f64),
}

impl ScalarValue {
    pub fn as_f64(self) -> f64 {
        match self {
            ScalarValue::Int(value) => value as f64,
            ScalarValue::Float(value) => value,
        }
    }

    pub fn as_i64(self) -> i64 {
        match self {
            ScalarValue::Int(value) => value,
            ScalarValue::Float(value) => value as i64,
        }
    }
}

/// Read-only view of the target process's address space.
pub trait ProcessMemory: Send + Sync {
    /// Reads `len` raw bytes. Any fault inside the range fails the whole
    /// read; there are no partial results.
    fn read_bytes(&self, address: u64, len: usize) -> Result<Vec<u8>, MemoryError>;

    /// Returns the addresses of every occurrence of `pattern`, where
    /// `None` bytes are wildcards.
    fn pattern_scan(&self, pattern: &[Option<u8>]) -> Vec<u64>;

    /// Reads and decodes one scalar of the given kind.
    fn read_scalar(&self, address: u64, kind: ScalarKind) -> Result<ScalarValue, MemoryError> {
        let value = match kind {
            ScalarKind::Int32 | ScalarKind::Long => {
                ScalarValue::Int(i32::from_le_bytes(read_array::<4>(self, address)?) as i64)
            }
            ScalarKind::Float32 => {
                ScalarValue::Float(f32::from_le_bytes(read_array::<4>(self, address)?) as f64)
            }
            ScalarKind::Int64 => {
                ScalarValue::Int(i64::from_le_bytes(read_array::<8>(self, address)?))
            }
            ScalarKind::Float32Be => {
                ScalarValue::Float(f32::from_be_bytes(read_array::<4>(self, address)?) as f64)
            }
            ScalarKind::Int32Be => {
                ScalarValue::Int(i32::from_be_bytes(read_array::<4>(self, address)?) as i64)
            }
        };
        Ok(value)
    }

    /// Follows an 8-byte little-endian pointer.
    fn read_ptr(&self, address: u64) -> Result<u64, MemoryError> {
        Ok(u64::from_le_bytes(read_array::<8>(self, address)?))
    }
}

/// Fixed-size read on top of [`ProcessMemory::read_bytes`]. Kept outside
/// the trait so `ProcessMemory` stays dyn compatible.
fn read_array<const N: usize>(
    mem: &(impl ProcessMemory + ?Sized),
    address: u64,
) -> Result<[u8; N], MemoryError> {
    let bytes = mem.read_bytes(address, N)?;
    bytes
        .try_into()
        .map_err(|_| MemoryError::ReadFault { address, len: N })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fixed byte buffer mapped at a chosen origin.
    struct Image {
        origin: u64,
        bytes: Vec<u8>,
    }

    impl ProcessMemory for Image {
        fn read_bytes(&self, address: u64, len: usize) -> Result<Vec<u8>, MemoryError> {
            let start = address
                .checked_sub(self.origin)
                .ok_or(MemoryError::ReadFault { address, len })? as usize;
            self.bytes
                .get(start..start + len)
                .map(<[u8]>::to_vec)
                .ok_or(MemoryError::ReadFault { address, len })
        }

        fn pattern_scan(&self, pattern: &[Option<u8>]) -> Vec<u64> {
            self.bytes
                .windows(pattern.len())
                .enumerate()
                .filter(|(_, window)| {
                    window
                        .iter()
                        .zip(pattern)
                        .all(|(byte, expect)| expect.map(|e| e == *byte).unwrap_or(true))
                })
                .map(|(offset, _)| self.origin + offset as u64)
                .collect()
        }
    }

    fn image() -> Image {
        let mut bytes = vec![0u8; 64];
        bytes[0..4].copy_from_slice(&0.75f32.to_le_bytes());
        bytes[4..8].copy_from_slice(&(-12i32).to_le_bytes());
        bytes[8..16].copy_from_slice(&0x1122_3344_5566_7788u64.to_le_bytes());
        bytes[16..20].copy_from_slice(&2.5f32.to_be_bytes());
        bytes[20..24].copy_from_slice(&99i32.to_be_bytes());
        Image {
            origin: 0x4000,
            bytes,
        }
    }

    #[test]
    fn decodes_every_scalar_kind() {
        let mem = image();
        assert_eq!(
            mem.read_scalar(0x4000, ScalarKind::Float32).unwrap().as_f64(),
            0.75
        );
        assert_eq!(
            mem.read_scalar(0x4004, ScalarKind::Int32).unwrap().as_i64(),
            -12
        );
        // "Long" is the same 4-byte integer under its legacy name.
        assert_eq!(
            mem.read_scalar(0x4004, ScalarKind::Long).unwrap(),
            mem.read_scalar(0x4004, ScalarKind::Int32).unwrap()
        );
        assert_eq!(mem.read_ptr(0x4008).unwrap(), 0x1122_3344_5566_7788);
        assert_eq!(
            mem.read_scalar(0x4010, ScalarKind::Float32Be).unwrap().as_f64(),
            2.5
        );
        assert_eq!(
            mem.read_scalar(0x4014, ScalarKind::Int32Be).unwrap().as_i64(),
            99
        );
    }

    #[test]
    fn out_of_range_read_faults() {
        let mem = image();
        assert!(mem.read_scalar(0x403D, ScalarKind::Float32).is_err());
        assert!(mem.read_scalar(0x100, ScalarKind::Int32).is_err());
    }

    #[test]
    fn pattern_scan_honors_wildcards() {
        let mut mem = image();
        mem.bytes[40..44].copy_from_slice(&[0xAA, 0x01, 0xBB, 0x02]);
        mem.bytes[50..54].copy_from_slice(&[0xAA, 0x07, 0xBB, 0x02]);
        let hits = mem.pattern_scan(&[Some(0xAA), None, Some(0xBB), Some(0x02)]);
        assert_eq!(hits, vec![0x4000 + 40, 0x4000 + 50]);
    }
}
