// Copyright 2025 Nearcast Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! # Nearcast Provider
//!
//! Chain primitives, the canonical transaction schema and a JSON-RPC
//! provider for querying access keys and broadcasting transactions.

pub mod error;
pub mod json_rpc;
pub mod message;
mod provider;
pub mod query;
pub mod response;
pub mod tx;
pub mod types;
pub mod util;

pub use error::{Error, Result};
pub use provider::*;
