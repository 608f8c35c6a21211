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

//! UI shell state: the greeting, the submitted names and the contract handle,
//! plus the three behaviours that drive them.
//!
//! Every behaviour is split in three steps so an event loop can keep
//! ownership of the shell while the awaited part runs elsewhere:
//!
//! 1. `begin_*` checks preconditions against the current state and hands out
//!    a request carrying everything the awaited part needs;
//! 2. the request's `execute` performs the wallet/contract round trip;
//! 3. `complete_*` applies the outcome back onto the shell.
//!
//! [`Shell::connect`], [`Shell::submit`] and [`Shell::fetch_names`] run all
//! three in sequence for callers that can simply await.

use crate::abi::Abi;
use crate::contract::{ContractError, ContractHandle};
use crate::greeter::Greeter;
use crate::wallet::{Notifier, TransactionReceipt, WalletError, WalletEvent, WalletProvider};
use alloy_primitives::Address;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

pub const MISSING_PROVIDER_ALERT: &str = "Please install a wallet provider to interact with the application!";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShellError {
    #[error("No wallet provider detected")]
    ProviderUnavailable,
    #[error("Contract instance is not available")]
    ContractUnavailable,
    #[error("Wallet connection already in progress")]
    ConnectInFlight,
    #[error("Name is required")]
    EmptyName,
    #[error("A submission is already in progress")]
    SubmitInFlight,
    #[error("Names are already being fetched")]
    FetchInFlight,
    #[error("Connection discarded: {0} while connecting")]
    ConnectionSuperseded(&'static str),
    #[error("Error connecting to wallet: {0}")]
    Connection(#[from] WalletError),
    #[error(transparent)]
    Contract(#[from] ContractError),
}

/// The deployed contract the shell binds to.
#[derive(Debug, Clone)]
pub struct ContractTarget {
    pub address: Address,
    pub abi: Abi,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected { account: Address },
    Unavailable,
    Failed(String),
}

/// Wallet change seen while a connection was being set up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingChange {
    Account(Option<Address>),
    Invalidated(&'static str),
}

/// Marks a request as in flight until it, or its outcome, is dropped.
#[derive(Debug)]
struct InFlight(Arc<AtomicBool>);

impl InFlight {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).ok()?;
        Some(Self(Arc::clone(flag)))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn change_reason(event: &WalletEvent) -> &'static str {
    match event {
        WalletEvent::AccountsChanged(_) => "wallet account changed",
        WalletEvent::ChainChanged(_) => "wallet network changed",
        WalletEvent::Disconnected => "wallet disconnected",
    }
}

pub fn greeting_for(name: &str) -> String {
    format!("Hello, {}", name)
}

pub struct Shell {
    target: ContractTarget,
    greeting: String,
    submitted_names: Vec<String>,
    contract: Option<Arc<Greeter>>,
    connection: ConnectionState,
    pending_change: Option<PendingChange>,
    submit_in_flight: Arc<AtomicBool>,
    fetch_in_flight: Arc<AtomicBool>,
    last_error: Option<String>,
}

impl Shell {
    pub fn new(target: ContractTarget) -> Self {
        Self {
            target,
            greeting: String::new(),
            submitted_names: Vec::new(),
            contract: None,
            connection: ConnectionState::Disconnected,
            pending_change: None,
            submit_in_flight: Arc::new(AtomicBool::new(false)),
            fetch_in_flight: Arc::new(AtomicBool::new(false)),
            last_error: None,
        }
    }

    pub fn target(&self) -> &ContractTarget {
        &self.target
    }

    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    pub fn submitted_names(&self) -> &[String] {
        &self.submitted_names
    }

    pub fn connection(&self) -> &ConnectionState {
        &self.connection
    }

    pub fn contract(&self) -> Option<&Arc<Greeter>> {
        self.contract.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submit_in_flight.load(Ordering::Acquire)
    }

    pub fn is_fetching(&self) -> bool {
        self.fetch_in_flight.load(Ordering::Acquire)
    }

    /// Most recent failure, kept until the next successful action.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    fn fail(&mut self, err: ShellError) -> ShellError {
        self.last_error = Some(err.to_string());
        err
    }

    fn require_contract(&mut self) -> Result<Arc<Greeter>, ShellError> {
        if let Some(contract) = self.contract.as_ref() {
            return Ok(Arc::clone(contract));
        }
        error!("Contract instance is not available.");
        Err(self.fail(ShellError::ContractUnavailable))
    }

    // --- connection ---------------------------------------------------------

    /// Start connecting. Returns `Ok(None)` when a handle already exists, so the
    /// existing one keeps being used.
    pub fn begin_connect(&mut self, provider: Option<Arc<dyn WalletProvider>>, notifier: &dyn Notifier) -> Result<Option<ConnectRequest>, ShellError> {
        match self.connection {
            ConnectionState::Connected { .. } if self.contract.is_some() => return Ok(None),
            ConnectionState::Connecting => return Err(self.fail(ShellError::ConnectInFlight)),
            _ => {}
        }

        let Some(provider) = provider else {
            notifier.alert(MISSING_PROVIDER_ALERT);
            warn!("No wallet provider injected; contract handle stays unset");
            self.connection = ConnectionState::Unavailable;
            return Err(self.fail(ShellError::ProviderUnavailable));
        };

        self.connection = ConnectionState::Connecting;
        self.pending_change = None;
        Ok(Some(ConnectRequest {
            provider,
            target: self.target.clone(),
        }))
    }

    /// Install the handle, unless the wallet changed while it was being built.
    pub fn complete_connect(&mut self, result: Result<Greeter, ShellError>) -> Result<Address, ShellError> {
        let pending = self.pending_change.take();
        match result {
            Ok(greeter) => {
                let account = greeter.handle().account();
                let superseded = match pending {
                    Some(PendingChange::Invalidated(reason)) => Some(reason),
                    Some(PendingChange::Account(active)) if active != Some(account) => Some("wallet account changed"),
                    _ => None,
                };
                if let Some(reason) = superseded {
                    warn!("{} while connecting; discarding handle for {}", reason, account);
                    self.connection = ConnectionState::Disconnected;
                    return Err(self.fail(ShellError::ConnectionSuperseded(reason)));
                }

                info!("Connected as {} to contract {}", account, greeter.handle().address());
                self.contract = Some(Arc::new(greeter));
                self.connection = ConnectionState::Connected { account };
                self.last_error = None;
                Ok(account)
            }
            Err(err) => {
                error!("Error connecting to wallet: {}", err);
                self.connection = ConnectionState::Failed(err.to_string());
                Err(self.fail(err))
            }
        }
    }

    pub async fn connect(&mut self, provider: Option<Arc<dyn WalletProvider>>, notifier: &dyn Notifier) -> Result<Address, ShellError> {
        match self.begin_connect(provider, notifier)? {
            Some(request) => {
                let result = request.execute().await;
                self.complete_connect(result)
            }
            None => match self.connection {
                ConnectionState::Connected { account } => Ok(account),
                _ => Err(ShellError::ContractUnavailable),
            },
        }
    }

    /// Drop the contract handle. Later actions fail until reconnected.
    pub fn disconnect(&mut self) {
        self.contract = None;
        self.connection = ConnectionState::Disconnected;
    }

    /// Apply a wallet notification. Returns true when the handle was dropped.
    ///
    /// While connecting, the change is remembered and checked against the
    /// handle once it arrives.
    pub fn handle_wallet_event(&mut self, event: &WalletEvent) -> bool {
        match self.connection {
            ConnectionState::Connecting => {
                let change = match event {
                    WalletEvent::AccountsChanged(accounts) => PendingChange::Account(accounts.first().copied()),
                    other => PendingChange::Invalidated(change_reason(other)),
                };
                // an account switch never clears an earlier network change
                if !matches!(self.pending_change, Some(PendingChange::Invalidated(_))) {
                    self.pending_change = Some(change);
                }
                debug!("Wallet event {:?} while connecting", event);
                false
            }
            ConnectionState::Connected { account } => {
                if let WalletEvent::AccountsChanged(accounts) = event {
                    if accounts.first() == Some(&account) {
                        return false;
                    }
                }

                let reason = change_reason(event);
                warn!("{}; dropping contract handle", reason);
                self.disconnect();
                self.last_error = Some(format!("{}, reconnect to continue", reason));
                true
            }
            _ => false,
        }
    }

    // --- submit -------------------------------------------------------------

    pub fn begin_submit(&mut self, name: &str) -> Result<SubmitRequest, ShellError> {
        if name.is_empty() {
            return Err(self.fail(ShellError::EmptyName));
        }
        let contract = self.require_contract()?;
        let Some(in_flight) = InFlight::acquire(&self.submit_in_flight) else {
            return Err(self.fail(ShellError::SubmitInFlight));
        };

        Ok(SubmitRequest {
            contract,
            name: name.to_string(),
            in_flight,
        })
    }

    pub fn complete_submit(&mut self, outcome: SubmitOutcome) -> Result<TransactionReceipt, ShellError> {
        let SubmitOutcome { name, result, in_flight } = outcome;
        drop(in_flight);
        match result {
            Ok(receipt) => {
                self.greeting = greeting_for(&name);
                self.last_error = None;
                info!("Transaction successful: {}", receipt.transaction_hash);
                Ok(receipt)
            }
            Err(err) => {
                error!("Error calling greet: {}", err);
                Err(self.fail(err))
            }
        }
    }

    pub async fn submit(&mut self, name: &str) -> Result<TransactionReceipt, ShellError> {
        let request = self.begin_submit(name)?;
        let outcome = request.execute().await;
        self.complete_submit(outcome)
    }

    // --- fetch --------------------------------------------------------------

    pub fn begin_fetch(&mut self) -> Result<FetchRequest, ShellError> {
        let contract = self.require_contract()?;
        let Some(in_flight) = InFlight::acquire(&self.fetch_in_flight) else {
            return Err(self.fail(ShellError::FetchInFlight));
        };

        Ok(FetchRequest { contract, in_flight })
    }

    pub fn complete_fetch(&mut self, outcome: FetchOutcome) -> Result<&[String], ShellError> {
        let FetchOutcome { result, in_flight } = outcome;
        drop(in_flight);
        match result {
            Ok(names) => {
                self.submitted_names = names;
                self.last_error = None;
                Ok(&self.submitted_names)
            }
            Err(err) => {
                error!("Error fetching submitted names: {}", err);
                Err(self.fail(err))
            }
        }
    }

    pub async fn fetch_names(&mut self) -> Result<&[String], ShellError> {
        let request = self.begin_fetch()?;
        let outcome = request.execute().await;
        self.complete_fetch(outcome)
    }
}

pub struct ConnectRequest {
    provider: Arc<dyn WalletProvider>,
    target: ContractTarget,
}

impl ConnectRequest {
    /// Authorize, derive a signer for the active account and bind the contract.
    #[instrument(skip(self))]
    pub async fn execute(self) -> Result<Greeter, ShellError> {
        let accounts = self.provider.request_accounts().await?;
        let account = accounts.first().copied().ok_or(WalletError::NoAccounts)?;
        let signer = self.provider.signer(account).await?;
        Ok(Greeter::new(ContractHandle::new(self.target.address, self.target.abi, signer)))
    }
}

/// A pending submission. The shell accepts another one once this request,
/// or the outcome it produces, is dropped.
pub struct SubmitRequest {
    contract: Arc<Greeter>,
    name: String,
    in_flight: InFlight,
}

impl SubmitRequest {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Send `greet(name)` and wait for inclusion.
    pub async fn execute(self) -> SubmitOutcome {
        let result = send_greeting(&self.contract, &self.name).await.map_err(ShellError::from);
        SubmitOutcome {
            name: self.name,
            result,
            in_flight: self.in_flight,
        }
    }
}

async fn send_greeting(contract: &Greeter, name: &str) -> Result<TransactionReceipt, ContractError> {
    let pending = contract.greet(name).await?;
    info!("Transaction {} pending", pending.hash());
    pending.wait().await
}

#[derive(Debug)]
pub struct SubmitOutcome {
    pub name: String,
    pub result: Result<TransactionReceipt, ShellError>,
    in_flight: InFlight,
}

pub struct FetchRequest {
    contract: Arc<Greeter>,
    in_flight: InFlight,
}

impl FetchRequest {
    pub async fn execute(self) -> FetchOutcome {
        let result = self.contract.get_submitted_names().await.map_err(ShellError::from);
        FetchOutcome {
            result,
            in_flight: self.in_flight,
        }
    }
}

#[derive(Debug)]
pub struct FetchOutcome {
    pub result: Result<Vec<String>, ShellError>,
    in_flight: InFlight,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dev::{DevChain, DevChainConfig};
    use crate::wallet::Signer;
    use async_trait::async_trait;
    use mockall::mock;
    use tokio::sync::broadcast;

    mock! {
        pub Provider {}

        #[async_trait]
        impl WalletProvider for Provider {
            async fn request_accounts(&self) -> Result<Vec<Address>, WalletError>;
            async fn signer(&self, account: Address) -> Result<Arc<dyn Signer>, WalletError>;
            async fn chain_id(&self) -> Result<u64, WalletError>;
            fn events(&self) -> Option<broadcast::Receiver<WalletEvent>>;
        }
    }

    mock! {
        pub Alerts {}

        impl Notifier for Alerts {
            fn alert(&self, message: &str);
        }
    }

    fn silent() -> MockAlerts {
        let mut alerts = MockAlerts::new();
        alerts.expect_alert().never();
        alerts
    }

    fn chain(revert_names: &[&str]) -> DevChain {
        let config = DevChainConfig {
            block_time_ms: 0,
            revert_names: revert_names.iter().map(|n| n.to_string()).collect(),
            ..DevChainConfig::default()
        };
        DevChain::new(config, Address::repeat_byte(0x11)).unwrap()
    }

    fn target() -> ContractTarget {
        ContractTarget {
            address: Address::repeat_byte(0x11),
            abi: Abi::greeter().unwrap(),
        }
    }

    /// Provider authorizing exactly once, backed by `chain`.
    fn provider_for(chain: &DevChain) -> MockProvider {
        let account = chain.accounts()[0];
        let signer = chain.signer_for(account).unwrap();
        let mut provider = MockProvider::new();
        provider.expect_request_accounts().times(1).returning(move || Ok(vec![account]));
        provider.expect_signer().times(1).returning(move |_| Ok(Arc::clone(&signer)));
        provider
    }

    async fn connected(chain: &DevChain) -> Shell {
        let mut shell = Shell::new(target());
        shell.connect(Some(Arc::new(provider_for(chain))), &silent()).await.unwrap();
        shell
    }

    #[tokio::test]
    async fn test_missing_provider_alerts_once_and_leaves_handle_unset() {
        let mut alerts = MockAlerts::new();
        alerts.expect_alert().withf(|m| m.to_string() == MISSING_PROVIDER_ALERT).times(1).return_const(());

        let mut shell = Shell::new(target());
        let result = shell.connect(None, &alerts).await;

        assert_eq!(result, Err(ShellError::ProviderUnavailable));
        assert!(shell.contract().is_none());
        assert_eq!(shell.connection(), &ConnectionState::Unavailable);

        // later actions fail without further alerts
        assert_eq!(shell.submit("Alice").await.unwrap_err(), ShellError::ContractUnavailable);
        assert_eq!(shell.fetch_names().await.unwrap_err(), ShellError::ContractUnavailable);
        assert_eq!(shell.last_error(), Some("Contract instance is not available"));
    }

    #[tokio::test]
    async fn test_rejected_authorization_is_recorded_without_handle() {
        let mut provider = MockProvider::new();
        provider.expect_request_accounts().times(1).returning(|| Err(WalletError::UserRejected));
        provider.expect_signer().never();

        let mut shell = Shell::new(target());
        let err = shell.connect(Some(Arc::new(provider)), &silent()).await.unwrap_err();

        assert_eq!(err, ShellError::Connection(WalletError::UserRejected));
        assert!(shell.contract().is_none());
        assert!(matches!(shell.connection(), ConnectionState::Failed(_)));
    }

    #[tokio::test]
    async fn test_empty_account_list_fails_connection() {
        let mut provider = MockProvider::new();
        provider.expect_request_accounts().returning(|| Ok(Vec::new()));
        provider.expect_signer().never();

        let mut shell = Shell::new(target());
        let err = shell.connect(Some(Arc::new(provider)), &silent()).await.unwrap_err();
        assert_eq!(err, ShellError::Connection(WalletError::NoAccounts));
    }

    #[tokio::test]
    async fn test_handle_is_created_once_and_reused() {
        let chain = chain(&[]);
        let provider: Arc<dyn WalletProvider> = Arc::new(provider_for(&chain));

        let mut shell = Shell::new(target());
        let account = shell.connect(Some(Arc::clone(&provider)), &silent()).await.unwrap();
        assert_eq!(account, chain.accounts()[0]);
        let first = Arc::clone(shell.contract().unwrap());

        // a second connect must not ask the wallet again
        shell.connect(Some(provider), &silent()).await.unwrap();
        shell.submit("Alice").await.unwrap();
        shell.fetch_names().await.unwrap();

        assert!(Arc::ptr_eq(&first, shell.contract().unwrap()));
    }

    #[tokio::test]
    async fn test_submit_sets_templated_greeting() {
        let chain = chain(&[]);
        let mut shell = connected(&chain).await;

        let receipt = shell.submit("Alice").await.unwrap();
        assert!(receipt.success);
        assert_eq!(shell.greeting(), "Hello, Alice");
        assert!(!shell.is_submitting());
        assert_eq!(chain.submitted_names(Address::repeat_byte(0x11)), vec!["Alice".to_string()]);
    }

    #[tokio::test]
    async fn test_revert_leaves_greeting_unchanged() {
        let chain = chain(&["Mallory"]);
        let mut shell = connected(&chain).await;
        shell.submit("Alice").await.unwrap();

        let err = shell.submit("Mallory").await.unwrap_err();
        assert!(matches!(err, ShellError::Contract(ContractError::Wallet(WalletError::Reverted { .. }))));
        assert_eq!(shell.greeting(), "Hello, Alice");
        assert!(shell.last_error().is_some());

        // still usable afterwards
        shell.submit("Bob").await.unwrap();
        assert_eq!(shell.greeting(), "Hello, Bob");
        assert_eq!(shell.last_error(), None);
    }

    #[tokio::test]
    async fn test_second_submit_while_in_flight_is_refused() {
        let chain = chain(&[]);
        let mut shell = connected(&chain).await;

        let request = shell.begin_submit("Alice").unwrap();
        assert!(shell.is_submitting());
        assert_eq!(shell.begin_submit("Alice").err(), Some(ShellError::SubmitInFlight));

        let outcome = request.execute().await;
        shell.complete_submit(outcome).unwrap();
        assert!(shell.begin_submit("Bob").is_ok());
        assert_eq!(chain.submitted_names(Address::repeat_byte(0x11)), vec!["Alice".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_name_never_reaches_the_contract() {
        let chain = chain(&[]);
        let mut shell = connected(&chain).await;
        assert_eq!(shell.submit("").await.unwrap_err(), ShellError::EmptyName);
        assert!(chain.submitted_names(Address::repeat_byte(0x11)).is_empty());
    }

    #[tokio::test]
    async fn test_fetch_replaces_list_in_contract_order() {
        let chain = chain(&[]);
        let mut shell = connected(&chain).await;
        for name in ["Carol", "Alice", "Carol"] {
            shell.submit(name).await.unwrap();
        }

        let names = shell.fetch_names().await.unwrap().to_vec();
        assert_eq!(names, vec!["Carol", "Alice", "Carol"]);

        shell.submit("Bob").await.unwrap();
        shell.fetch_names().await.unwrap();
        assert_eq!(shell.submitted_names(), ["Carol", "Alice", "Carol", "Bob"]);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_list() {
        let chain = chain(&[]);
        let mut shell = connected(&chain).await;
        shell.submit("Alice").await.unwrap();
        shell.fetch_names().await.unwrap();

        let request = shell.begin_fetch().unwrap();
        assert_eq!(shell.begin_fetch().err(), Some(ShellError::FetchInFlight));

        let failed = FetchOutcome {
            result: Err(ShellError::Contract(ContractError::Wallet(WalletError::Transport("node offline".to_string())))),
            in_flight: request.in_flight,
        };
        assert!(shell.complete_fetch(failed).is_err());
        assert_eq!(shell.submitted_names(), ["Alice"]);
        assert!(!shell.is_fetching());
    }

    #[tokio::test]
    async fn test_account_change_drops_handle() {
        let chain = chain(&[]);
        let mut shell = connected(&chain).await;
        let account = chain.accounts()[0];

        assert!(!shell.handle_wallet_event(&WalletEvent::AccountsChanged(vec![account])));
        assert!(shell.contract().is_some());

        assert!(shell.handle_wallet_event(&WalletEvent::AccountsChanged(vec![chain.accounts()[1]])));
        assert!(shell.contract().is_none());
        assert_eq!(shell.connection(), &ConnectionState::Disconnected);
        assert_eq!(shell.submit("Alice").await.unwrap_err(), ShellError::ContractUnavailable);
    }

    #[tokio::test]
    async fn test_chain_change_drops_handle() {
        let chain = chain(&[]);
        let mut shell = connected(&chain).await;
        assert!(shell.handle_wallet_event(&WalletEvent::ChainChanged(5)));
        assert!(!shell.handle_wallet_event(&WalletEvent::Disconnected));
    }

    #[tokio::test]
    async fn test_account_switch_while_connecting_discards_handle() {
        let chain = chain(&[]);
        let wallet = chain.wallet();
        let mut shell = Shell::new(target());

        let request = shell.begin_connect(Some(Arc::new(wallet.clone())), &silent()).unwrap().unwrap();
        let result = request.execute().await;

        let switched = wallet.select_account(1).unwrap();
        assert!(!shell.handle_wallet_event(&WalletEvent::AccountsChanged(vec![switched])));
        assert_eq!(shell.connection(), &ConnectionState::Connecting);

        assert_eq!(shell.complete_connect(result).unwrap_err(), ShellError::ConnectionSuperseded("wallet account changed"));
        assert!(shell.contract().is_none());
        assert_eq!(shell.connection(), &ConnectionState::Disconnected);
        assert!(shell.last_error().is_some());

        let account = shell.connect(Some(Arc::new(wallet)), &silent()).await.unwrap();
        assert_eq!(account, switched);
        assert_eq!(shell.connection(), &ConnectionState::Connected { account: switched });
    }

    #[tokio::test]
    async fn test_same_account_while_connecting_keeps_handle() {
        let chain = chain(&[]);
        let mut shell = Shell::new(target());

        let request = shell.begin_connect(Some(Arc::new(chain.wallet())), &silent()).unwrap().unwrap();
        assert!(!shell.handle_wallet_event(&WalletEvent::AccountsChanged(vec![chain.accounts()[0]])));
        let result = request.execute().await;

        assert_eq!(shell.complete_connect(result).unwrap(), chain.accounts()[0]);
        assert!(shell.contract().is_some());
    }

    #[tokio::test]
    async fn test_network_change_while_connecting_discards_handle() {
        let chain = chain(&[]);
        let mut shell = Shell::new(target());

        let request = shell.begin_connect(Some(Arc::new(chain.wallet())), &silent()).unwrap().unwrap();
        shell.handle_wallet_event(&WalletEvent::ChainChanged(5));
        // switching back to the same account does not undo the network change
        shell.handle_wallet_event(&WalletEvent::AccountsChanged(vec![chain.accounts()[0]]));
        let result = request.execute().await;

        assert_eq!(shell.complete_connect(result).unwrap_err(), ShellError::ConnectionSuperseded("wallet network changed"));
        assert!(shell.contract().is_none());
    }

    #[tokio::test]
    async fn test_dropped_request_releases_in_flight_flag() {
        let chain = chain(&[]);
        let mut shell = connected(&chain).await;

        let request = shell.begin_submit("Alice").unwrap();
        assert!(shell.is_submitting());
        drop(request);
        assert!(!shell.is_submitting());
        assert!(shell.begin_submit("Bob").is_ok());
    }

    #[tokio::test]
    async fn test_panicking_task_releases_in_flight_flag() {
        let chain = chain(&[]);
        let mut shell = connected(&chain).await;

        let request = shell.begin_fetch().unwrap();
        let task = tokio::spawn(async move {
            let _request = request;
            panic!("task aborted");
        });
        assert!(task.await.is_err());

        assert!(!shell.is_fetching());
        shell.fetch_names().await.unwrap();
    }
}
