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

//! In-process development chain.
//!
//! Stands in for both external collaborators, the injected wallet and the
//! deployed greeter contract, so the front-end can run without a browser
//! extension or a node. Calldata goes through the same ABI codec a real
//! contract would see. State can optionally be snapshotted to a JSON file so
//! separate CLI invocations observe the same chain.

use crate::abi::{Abi, AbiError, AbiValue};
use crate::greeter::{GET_SUBMITTED_NAMES, GREET, SUBMITTED_NAMES};
use crate::wallet::{CallRequest, Signer, TransactionReceipt, TransactionRequest, TxHash, WalletError, WalletEvent, WalletProvider};
use alloy_primitives::{Address, Bytes, U256, keccak256};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum DevChainError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
    #[error(transparent)]
    Abi(#[from] AbiError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevChainConfig {
    pub chain_id: u64,
    pub accounts: usize,
    pub block_time_ms: u64,
    /// When false every authorization request is rejected, as if the user declined.
    pub authorize: bool,
    /// Names for which `greet` reverts.
    pub revert_names: Vec<String>,
}

impl Default for DevChainConfig {
    fn default() -> Self {
        Self {
            chain_id: 1337,
            accounts: 3,
            block_time_ms: 250,
            authorize: true,
            revert_names: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ChainState {
    block_number: u64,
    nonces: BTreeMap<Address, u64>,
    contracts: BTreeMap<Address, Vec<String>>,
    receipts: BTreeMap<TxHash, TransactionReceipt>,
}

struct Inner {
    config: DevChainConfig,
    abi: Abi,
    accounts: Vec<Address>,
    selected: Mutex<usize>,
    state: Mutex<ChainState>,
    snapshot: Option<PathBuf>,
    events: broadcast::Sender<WalletEvent>,
}

#[derive(Clone)]
pub struct DevChain {
    inner: Arc<Inner>,
}

impl DevChain {
    /// A fresh in-memory chain with the greeter deployed at `contract`.
    pub fn new(config: DevChainConfig, contract: Address) -> Result<Self, DevChainError> {
        Self::build(config, contract, None, ChainState::default())
    }

    /// Load the chain from `path` if it exists; every change is written back.
    pub fn open(config: DevChainConfig, contract: Address, path: impl AsRef<Path>) -> Result<Self, DevChainError> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            serde_json::from_str(&std::fs::read_to_string(&path)?)?
        } else {
            ChainState::default()
        };
        info!("Dev chain snapshot at {}", path.display());
        Self::build(config, contract, Some(path), state)
    }

    fn build(config: DevChainConfig, contract: Address, snapshot: Option<PathBuf>, mut state: ChainState) -> Result<Self, DevChainError> {
        let abi = Abi::greeter()?;
        state.contracts.entry(contract).or_default();
        let accounts = (0..config.accounts.max(1)).map(dev_account).collect();
        let (events, _) = broadcast::channel(16);

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                abi,
                accounts,
                selected: Mutex::new(0),
                state: Mutex::new(state),
                snapshot,
                events,
            }),
        })
    }

    pub fn config(&self) -> &DevChainConfig {
        &self.inner.config
    }

    pub fn accounts(&self) -> &[Address] {
        &self.inner.accounts
    }

    pub fn block_number(&self) -> u64 {
        self.inner.state.lock().block_number
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.inner.snapshot.as_deref()
    }

    /// Names stored by the greeter at `contract`, in submission order.
    pub fn submitted_names(&self, contract: Address) -> Vec<String> {
        self.inner.state.lock().contracts.get(&contract).cloned().unwrap_or_default()
    }

    pub fn wallet(&self) -> DevWallet {
        DevWallet { chain: self.clone() }
    }

    pub fn signer_for(&self, account: Address) -> Result<Arc<dyn Signer>, WalletError> {
        if !self.inner.accounts.contains(&account) {
            return Err(WalletError::UnknownAccount(account));
        }
        Ok(Arc::new(DevSigner { chain: self.clone(), account }))
    }

    /// Forget all transactions and stored names; deployments stay.
    pub fn reset(&self) -> Result<(), DevChainError> {
        let mut state = self.inner.state.lock();
        let contracts = state.contracts.keys().map(|address| (*address, Vec::new())).collect();
        *state = ChainState { contracts, ..ChainState::default() };
        if let Some(path) = &self.inner.snapshot {
            write_snapshot(path, &state)?;
        }
        info!("Dev chain reset");
        Ok(())
    }

    fn persist(&self, state: &ChainState) {
        let Some(path) = &self.inner.snapshot else {
            return;
        };
        if let Err(e) = write_snapshot(path, state) {
            warn!("Failed to write dev chain snapshot {}: {}", path.display(), e);
        }
    }

    fn transact(&self, request: &TransactionRequest) -> Result<TxHash, WalletError> {
        if !self.inner.accounts.contains(&request.from) {
            return Err(WalletError::UnknownAccount(request.from));
        }
        let function = self.inner.abi.function_for_calldata(&request.data).map_err(revert)?;
        let args = function.decode_call(&request.data).map_err(revert)?;

        let mut state = self.inner.state.lock();
        let names = state.contracts.get_mut(&request.to).ok_or_else(|| no_contract(request.to))?;
        if function.name == GREET {
            let name = args.into_iter().next().and_then(AbiValue::into_string).ok_or_else(|| revert("missing name"))?;
            if self.inner.config.revert_names.contains(&name) {
                return Err(revert(format!("greeting rejected for {}", name)));
            }
            names.push(name);
        }

        let nonce = state.nonces.entry(request.from).or_insert(0);
        let current = *nonce;
        *nonce += 1;
        state.block_number += 1;

        let mut preimage = request.from.to_vec();
        preimage.extend_from_slice(&current.to_be_bytes());
        preimage.extend_from_slice(&request.data);
        let hash = keccak256(&preimage);

        let receipt = TransactionReceipt {
            transaction_hash: hash,
            block_number: state.block_number,
            from: request.from,
            to: request.to,
            success: true,
        };
        state.receipts.insert(hash, receipt);
        self.persist(&state);

        debug!("Dev chain included {} {} in block {}", function.name, hash, state.block_number);
        Ok(hash)
    }

    fn read(&self, request: &CallRequest) -> Result<Bytes, WalletError> {
        let function = self.inner.abi.function_for_calldata(&request.data).map_err(revert)?;
        let args = function.decode_call(&request.data).map_err(revert)?;

        let state = self.inner.state.lock();
        let names = state.contracts.get(&request.to).ok_or_else(|| no_contract(request.to))?;

        let output = match function.name.as_str() {
            GET_SUBMITTED_NAMES => AbiValue::Array(names.iter().cloned().map(AbiValue::from).collect()),
            SUBMITTED_NAMES => {
                let index = args.first().and_then(AbiValue::as_uint).ok_or_else(|| revert("missing index"))?;
                if index >= U256::from(names.len()) {
                    return Err(revert(format!("index {} out of bounds", index)));
                }
                AbiValue::from(names[index.as_limbs()[0] as usize].clone())
            }
            GREET => {
                let name = args.first().and_then(AbiValue::as_str).ok_or_else(|| revert("missing name"))?;
                AbiValue::from(format!("Hello, {}", name))
            }
            other => return Err(revert(format!("unsupported function {}", other))),
        };

        function.encode_output(&[output]).map_err(revert)
    }

    fn receipt(&self, hash: TxHash) -> Option<TransactionReceipt> {
        self.inner.state.lock().receipts.get(&hash).cloned()
    }
}

impl fmt::Debug for DevChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DevChain")
            .field("chain_id", &self.inner.config.chain_id)
            .field("accounts", &self.inner.accounts.len())
            .field("snapshot", &self.inner.snapshot)
            .finish()
    }
}

fn dev_account(index: usize) -> Address {
    let hash = keccak256(format!("greeter-dev-account-{}", index));
    Address::from_slice(&hash[12..])
}

fn write_snapshot(path: &Path, state: &ChainState) -> Result<(), DevChainError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_vec_pretty(state)?)?;
    Ok(())
}

fn revert(reason: impl fmt::Display) -> WalletError {
    WalletError::Reverted { reason: reason.to_string() }
}

fn no_contract(address: Address) -> WalletError {
    WalletError::Transport(format!("no contract deployed at {}", address))
}

/// Wallet provider over the dev chain's accounts.
#[derive(Clone, Debug)]
pub struct DevWallet {
    chain: DevChain,
}

impl DevWallet {
    pub fn chain(&self) -> &DevChain {
        &self.chain
    }

    pub fn selected_account(&self) -> Address {
        let index = *self.chain.inner.selected.lock();
        self.chain.inner.accounts[index]
    }

    /// Switch the active account and notify subscribers.
    pub fn select_account(&self, index: usize) -> Result<Address, WalletError> {
        let account = *self.chain.inner.accounts.get(index).ok_or(WalletError::NoAccounts)?;
        *self.chain.inner.selected.lock() = index;
        // no subscribers is fine
        let _ = self.chain.inner.events.send(WalletEvent::AccountsChanged(vec![account]));
        info!("Dev wallet switched to account {}", account);
        Ok(account)
    }
}

#[async_trait]
impl WalletProvider for DevWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        if !self.chain.inner.config.authorize {
            return Err(WalletError::UserRejected);
        }
        Ok(vec![self.selected_account()])
    }

    async fn signer(&self, account: Address) -> Result<Arc<dyn Signer>, WalletError> {
        self.chain.signer_for(account)
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        Ok(self.chain.inner.config.chain_id)
    }

    fn events(&self) -> Option<broadcast::Receiver<WalletEvent>> {
        Some(self.chain.inner.events.subscribe())
    }
}

pub struct DevSigner {
    chain: DevChain,
    account: Address,
}

#[async_trait]
impl Signer for DevSigner {
    fn address(&self) -> Address {
        self.account
    }

    async fn send_transaction(&self, request: TransactionRequest) -> Result<TxHash, WalletError> {
        if request.from != self.account {
            return Err(WalletError::UnknownAccount(request.from));
        }
        self.chain.transact(&request)
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> Result<TransactionReceipt, WalletError> {
        let block_time = Duration::from_millis(self.chain.inner.config.block_time_ms);
        if !block_time.is_zero() {
            tokio::time::sleep(block_time).await;
        }
        self.chain.receipt(hash).ok_or(WalletError::UnknownTransaction(hash))
    }

    async fn call(&self, request: CallRequest) -> Result<Bytes, WalletError> {
        self.chain.read(&request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::greeter::Greeter;

    const CONTRACT: Address = Address::new([0x22; 20]);

    fn fast() -> DevChainConfig {
        DevChainConfig {
            block_time_ms: 0,
            ..DevChainConfig::default()
        }
    }

    fn greeter(chain: &DevChain) -> Greeter {
        Greeter::connect(CONTRACT, chain.signer_for(chain.accounts()[0]).unwrap()).unwrap()
    }

    #[test]
    fn test_dev_accounts_are_deterministic() {
        let a = DevChain::new(fast(), CONTRACT).unwrap();
        let b = DevChain::new(fast(), CONTRACT).unwrap();
        assert_eq!(a.accounts(), b.accounts());
        assert_eq!(a.accounts().len(), 3);
        assert_ne!(a.accounts()[0], a.accounts()[1]);
    }

    #[tokio::test]
    async fn test_greet_then_read_back() {
        let chain = DevChain::new(fast(), CONTRACT).unwrap();
        let greeter = greeter(&chain);

        for name in ["Alice", "Bob"] {
            let receipt = greeter.greet(name).await.unwrap().wait().await.unwrap();
            assert!(receipt.success);
        }

        assert_eq!(greeter.get_submitted_names().await.unwrap(), vec!["Alice", "Bob"]);
        assert_eq!(greeter.submitted_name(1).await.unwrap(), "Bob");
        assert_eq!(chain.block_number(), 2);
    }

    #[tokio::test]
    async fn test_out_of_bounds_index_reverts() {
        let chain = DevChain::new(fast(), CONTRACT).unwrap();
        let err = greeter(&chain).submitted_name(0).await.unwrap_err();
        assert!(matches!(err, crate::contract::ContractError::Wallet(WalletError::Reverted { .. })));
    }

    #[tokio::test]
    async fn test_configured_names_revert() {
        let config = DevChainConfig {
            revert_names: vec!["Mallory".to_string()],
            ..fast()
        };
        let chain = DevChain::new(config, CONTRACT).unwrap();
        let err = greeter(&chain).greet("Mallory").await.err().unwrap();
        assert!(matches!(err, crate::contract::ContractError::Wallet(WalletError::Reverted { .. })));
        assert!(chain.submitted_names(CONTRACT).is_empty());
        assert_eq!(chain.block_number(), 0);
    }

    #[tokio::test]
    async fn test_unknown_contract_address() {
        let chain = DevChain::new(fast(), CONTRACT).unwrap();
        let elsewhere = Greeter::connect(Address::repeat_byte(0x33), chain.signer_for(chain.accounts()[0]).unwrap()).unwrap();
        assert!(elsewhere.get_submitted_names().await.is_err());
    }

    #[tokio::test]
    async fn test_wallet_authorization_and_events() {
        let chain = DevChain::new(fast(), CONTRACT).unwrap();
        let wallet = chain.wallet();
        let mut events = wallet.events().unwrap();

        assert_eq!(wallet.request_accounts().await.unwrap(), vec![chain.accounts()[0]]);
        assert_eq!(wallet.chain_id().await.unwrap(), 1337);

        let switched = wallet.select_account(2).unwrap();
        assert_eq!(events.recv().await.unwrap(), WalletEvent::AccountsChanged(vec![switched]));
        assert_eq!(wallet.request_accounts().await.unwrap(), vec![switched]);
        assert_eq!(wallet.select_account(9), Err(WalletError::NoAccounts));

        assert!(matches!(wallet.signer(Address::ZERO).await, Err(WalletError::UnknownAccount(_))));
    }

    #[tokio::test]
    async fn test_declined_authorization() {
        let config = DevChainConfig { authorize: false, ..fast() };
        let chain = DevChain::new(config, CONTRACT).unwrap();
        assert_eq!(chain.wallet().request_accounts().await, Err(WalletError::UserRejected));
    }

    #[tokio::test]
    async fn test_snapshot_survives_reopen_and_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain").join("devchain.json");

        {
            let chain = DevChain::open(fast(), CONTRACT, &path).unwrap();
            greeter(&chain).greet("Alice").await.unwrap().wait().await.unwrap();
        }
        assert!(path.exists());

        let reopened = DevChain::open(fast(), CONTRACT, &path).unwrap();
        assert_eq!(reopened.submitted_names(CONTRACT), vec!["Alice"]);
        assert_eq!(reopened.block_number(), 1);

        reopened.reset().unwrap();
        let again = DevChain::open(fast(), CONTRACT, &path).unwrap();
        assert!(again.submitted_names(CONTRACT).is_empty());
        assert_eq!(again.block_number(), 0);
    }
}
