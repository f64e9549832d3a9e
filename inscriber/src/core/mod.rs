//! Deterministic, pure logic shared by the minting loop.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data and return deterministic outputs suitable for tests.

pub mod address;
pub mod classifier;
pub mod naming;
pub mod types;
