//! I/O adapters for the batch loop.

pub mod airdrop;
pub mod config;
pub mod mint_tool;
pub mod pacer;
pub mod process;
pub mod progress;
