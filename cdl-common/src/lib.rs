//! # CDL Common Library
//!
//! Shared code for the CDL campaign service:
//! - Error and result types
//! - Bootstrap configuration loading (TOML file location and parsing)
//! - Phone number normalization for WhatsApp dispatch

pub mod config;
pub mod error;
pub mod phone;

pub use error::{Error, Result};
pub use phone::normalize_phone_number;
