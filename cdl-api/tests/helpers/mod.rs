//! Test Helper Utilities
//!
//! In-memory record store, messaging gateway and campaign directory with
//! call counters, injected failures and per-item delays.

#![allow(dead_code)]

pub mod fakes;

pub use fakes::{raw_row, user_row, MockDirectory, MockGateway, MockStore};
