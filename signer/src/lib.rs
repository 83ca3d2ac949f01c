// Copyright 2025 Nearcast Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! # Nearcast Signer
//!
//! Key handling and a transaction signer for Nearcast.

pub mod key;
mod signer;
mod void;
mod wallet;

pub use signer::Signer;
pub use void::Void;
pub use wallet::Wallet;
