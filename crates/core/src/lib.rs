//! Copperleaf Core - Shared types library.
//!
//! This crate provides common types used across the Copperleaf storefront:
//! type-safe IDs, validated email addresses, decimal prices with minor-unit
//! conversion, and the product property model.
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
