// Greeter
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Capability boundary towards the wallet that holds the user's keys.
//!
//! The wallet is an external collaborator: it authorizes accounts, signs and
//! broadcasts transactions and answers read-only calls. Everything here is a
//! trait so the front-end can be handed whatever wallet the host provides.

use alloy_primitives::{Address, B256, Bytes};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;

pub type TxHash = B256;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("User rejected the request")]
    UserRejected,
    #[error("Wallet returned no accounts")]
    NoAccounts,
    #[error("Account is not managed by this wallet: {0}")]
    UnknownAccount(Address),
    #[error("Execution reverted: {reason}")]
    Reverted { reason: String },
    #[error("Unknown transaction: {0}")]
    UnknownTransaction(TxHash),
    #[error("Transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub from: Option<Address>,
    pub to: Address,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub transaction_hash: TxHash,
    pub block_number: u64,
    pub from: Address,
    pub to: Address,
    pub success: bool,
}

/// Notifications a wallet pushes after the initial connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    AccountsChanged(Vec<Address>),
    ChainChanged(u64),
    Disconnected,
}

/// Host-injected wallet provider
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the user to authorize accounts. The first entry is the active account.
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// Derive a signer for an authorized account.
    async fn signer(&self, account: Address) -> Result<Arc<dyn Signer>, WalletError>;

    async fn chain_id(&self) -> Result<u64, WalletError>;

    /// Subscribe to account and network changes, if the wallet reports them.
    fn events(&self) -> Option<broadcast::Receiver<WalletEvent>> {
        None
    }
}

/// An authorized handle able to sign for exactly one account.
#[async_trait]
pub trait Signer: Send + Sync {
    fn address(&self) -> Address;

    /// Sign and broadcast, returning as soon as the wallet accepted the transaction.
    async fn send_transaction(&self, request: TransactionRequest) -> Result<TxHash, WalletError>;

    /// Wait until the transaction is included in a block.
    async fn wait_for_receipt(&self, hash: TxHash) -> Result<TransactionReceipt, WalletError>;

    /// Execute a read-only call and return the raw return data.
    async fn call(&self, request: CallRequest) -> Result<Bytes, WalletError>;
}

/// Blocking, user-visible notification surface.
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}
