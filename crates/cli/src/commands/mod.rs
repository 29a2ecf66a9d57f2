//! Subcommand implementations. Each writes its output to the supplied
//! writer so `main` owns stdout.

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod products;
pub mod orders;
