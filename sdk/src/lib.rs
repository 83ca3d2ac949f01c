// Copyright 2025 Nearcast Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! # Nearcast SDK
//!
//! The top-level user interface for building, signing and broadcasting NEAR
//! transactions.

use nearcast_provider::tx::BroadcastMode;

pub mod account;
pub mod config;
pub mod network;
pub mod tx;

#[cfg(test)]
pub(crate) mod testing;

/// Arguments common to transactions.
#[derive(Clone, Copy, Default, Debug)]
pub struct TxParams {
    /// Access key nonce. The signer picks the next one if unset.
    pub nonce: Option<u64>,
    /// Broadcast mode for the transaction.
    pub broadcast_mode: BroadcastMode,
}
