//! BlockFlow storefront client library.
//!
//! Cart, pricing and checkout for the BlockFlow block marketplace, plus the
//! REST client and durable slots they run on. Front-ends (the `bf` CLI,
//! integration tests) drive it through [`session::Session`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod models;
pub mod pricing;
pub mod services;
pub mod session;
pub mod state;
pub mod storage;
