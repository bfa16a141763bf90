//! Pokedex API Library
//!
//! Exposes the data pipeline, query engine and HTTP router so the binary and
//! the integration tests share one implementation.

pub mod api;
pub mod builder;
pub mod cache;
pub mod cli;
pub mod data;
pub mod query;
pub mod store;
