//! CLI command implementations.

pub mod cart;
pub mod demo;
pub mod remote;
pub mod snapshot;
