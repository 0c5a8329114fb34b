//! OPNsense integration.
//!
//! Host aliases live under a single Unbound host override, resolved by
//! name every cycle. Changes only take effect after `reconfigure`.

pub mod client;
pub mod types;

pub use client::{AliasStore, OpnsenseClient, StoreError};
