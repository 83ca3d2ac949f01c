// Copyright 2025 Nearcast Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::query::QueryProvider;
use crate::tx::TxProvider;

/// A provider that can both read chain state and submit transactions.
pub trait Provider: QueryProvider + TxProvider {}

impl<P> Provider for P where P: QueryProvider + TxProvider {}
