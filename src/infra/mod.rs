//! Process memory access, market discovery and configuration.

pub mod config;
pub mod discovery;
pub mod memory;
pub mod sim;
