//! Storage abstractions for service layer
//!
//! A JSON ledger file for local persistence and an object store seam for
//! the remote bucket.

pub mod json_ledger;
pub mod object_store;
