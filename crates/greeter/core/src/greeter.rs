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

//! Typed binding for the deployed greeter contract.

use crate::abi::{Abi, AbiError, AbiValue};
use crate::contract::{ContractError, ContractHandle, PendingTransaction};
use crate::wallet::Signer;
use alloy_primitives::Address;
use std::sync::Arc;

/// Address the greeter contract is deployed at.
pub const DEFAULT_GREETER_ADDRESS: &str = "0xa21Ef89844edb83EbdfDa83dB2400fb7e837C9c2";

pub const GREET: &str = "greet";
pub const GET_SUBMITTED_NAMES: &str = "getSubmittedNames";
pub const SUBMITTED_NAMES: &str = "submittedNames";

#[derive(Debug)]
pub struct Greeter {
    handle: ContractHandle,
}

impl Greeter {
    pub fn new(handle: ContractHandle) -> Self {
        Self { handle }
    }

    /// Bind the embedded greeter interface at `address` to `signer`.
    pub fn connect(address: Address, signer: Arc<dyn Signer>) -> Result<Self, AbiError> {
        Ok(Self::new(ContractHandle::new(address, Abi::greeter()?, signer)))
    }

    pub fn handle(&self) -> &ContractHandle {
        &self.handle
    }

    pub async fn greet(&self, name: &str) -> Result<PendingTransaction, ContractError> {
        self.handle.send(GREET, &[AbiValue::from(name)]).await
    }

    pub async fn get_submitted_names(&self) -> Result<Vec<String>, ContractError> {
        let outputs = self.handle.call(GET_SUBMITTED_NAMES, &[]).await?;
        let names = outputs
            .into_iter()
            .next()
            .and_then(AbiValue::into_string_array)
            .ok_or_else(|| AbiError::UnexpectedOutput(format!("{} did not return string[]", GET_SUBMITTED_NAMES)))?;
        Ok(names)
    }

    pub async fn submitted_name(&self, index: u64) -> Result<String, ContractError> {
        let outputs = self.handle.call(SUBMITTED_NAMES, &[AbiValue::from(index)]).await?;
        let name = outputs
            .into_iter()
            .next()
            .and_then(AbiValue::into_string)
            .ok_or_else(|| AbiError::UnexpectedOutput(format!("{} did not return string", SUBMITTED_NAMES)))?;
        Ok(name)
    }
}

/// Parse a contract address from its hex form.
pub fn parse_address(value: &str) -> Result<Address, AbiError> {
    value.parse::<Address>().map_err(|e| AbiError::InvalidAddress(format!("{}: {}", value, e)))
}
