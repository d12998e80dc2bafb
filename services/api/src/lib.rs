//! services/api/src/lib.rs
//!
//! The library crate backing the `api` binary: configuration, the adapters
//! implementing the core's ports, and the web layer.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
