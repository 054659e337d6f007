//! Nodes admin console library
//!
//! An async client for the Nodes admin REST API, a keyed query cache over it,
//! and a generic data table engine for presenting the results.

pub mod api;
pub mod auth;
pub mod console;
pub mod error;
pub mod format;
pub mod model;
pub mod proxy;
pub mod query;
pub mod rate_limit;
pub mod table;

mod client;

pub use client::*;
