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

//! Greeter front-end core.
//!
//! Connects to a wallet, binds the deployed greeter contract and keeps the
//! state a front-end renders: the latest greeting and the list of names read
//! back from the contract.

pub mod abi;
pub mod contract;
pub mod dev;
pub mod form;
pub mod greeter;
pub mod shell;
pub mod wallet;

pub use abi::{Abi, AbiError, AbiValue};
pub use contract::{ContractError, ContractHandle, PendingTransaction};
pub use dev::{DevChain, DevChainConfig, DevChainError, DevWallet};
pub use form::{FormError, NameForm};
pub use greeter::{DEFAULT_GREETER_ADDRESS, Greeter, parse_address};
pub use shell::{ConnectionState, ContractTarget, Shell, ShellError};
pub use wallet::{Notifier, Signer, TransactionReceipt, WalletError, WalletEvent, WalletProvider};

pub use alloy_primitives::Address;
