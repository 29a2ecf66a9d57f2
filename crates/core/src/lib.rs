//! BlockFlow Core - Shared types library.
//!
//! This crate provides common types used across all BlockFlow components:
//! - `storefront` - Cart, pricing, checkout and the REST client
//! - `cli` - Terminal front-end for browsing, cart management and checkout
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices and order statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
