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

//! Contract handle: a deployed address and its interface bound to a signer.

use crate::abi::{Abi, AbiError, AbiFunction, AbiValue, StateMutability};
use crate::wallet::{CallRequest, Signer, TransactionReceipt, TransactionRequest, TxHash, WalletError};
use alloy_primitives::Address;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    #[error(transparent)]
    Abi(#[from] AbiError),
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error("{function} is {mutability} and cannot be {action}")]
    WrongMutability {
        function: String,
        mutability: StateMutability,
        action: &'static str,
    },
    #[error("Transaction {0} was included but failed")]
    TransactionFailed(TxHash),
}

pub struct ContractHandle {
    address: Address,
    abi: Abi,
    signer: Arc<dyn Signer>,
}

impl ContractHandle {
    pub fn new(address: Address, abi: Abi, signer: Arc<dyn Signer>) -> Self {
        Self { address, abi, signer }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn abi(&self) -> &Abi {
        &self.abi
    }

    /// Account the handle signs for.
    pub fn account(&self) -> Address {
        self.signer.address()
    }

    /// Submit a state-changing call. The returned transaction is pending until waited on.
    #[instrument(skip(self, args))]
    pub async fn send(&self, function: &str, args: &[AbiValue]) -> Result<PendingTransaction, ContractError> {
        let function = self.abi.function(function)?;
        if !function.is_mutating() {
            return Err(wrong_mutability(function, "sent as a transaction"));
        }

        let request = TransactionRequest {
            from: self.signer.address(),
            to: self.address,
            data: function.encode_call(args)?,
        };
        let hash = self.signer.send_transaction(request).await?;
        debug!("Transaction {} submitted to {}", hash, self.address);

        Ok(PendingTransaction {
            hash,
            signer: Arc::clone(&self.signer),
        })
    }

    /// Execute a read-only call and decode its outputs.
    #[instrument(skip(self, args))]
    pub async fn call(&self, function: &str, args: &[AbiValue]) -> Result<Vec<AbiValue>, ContractError> {
        let function = self.abi.function(function)?;
        if function.is_mutating() {
            return Err(wrong_mutability(function, "called read-only"));
        }

        let request = CallRequest {
            from: Some(self.signer.address()),
            to: self.address,
            data: function.encode_call(args)?,
        };
        let output = self.signer.call(request).await?;
        Ok(function.decode_output(&output)?)
    }
}

impl fmt::Debug for ContractHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractHandle")
            .field("address", &self.address)
            .field("account", &self.signer.address())
            .field("functions", &self.abi.functions().len())
            .finish()
    }
}

fn wrong_mutability(function: &AbiFunction, action: &'static str) -> ContractError {
    ContractError::WrongMutability {
        function: function.name.clone(),
        mutability: function.state_mutability,
        action,
    }
}

/// A broadcast transaction that has not been confirmed yet.
pub struct PendingTransaction {
    hash: TxHash,
    signer: Arc<dyn Signer>,
}

impl PendingTransaction {
    pub fn hash(&self) -> TxHash {
        self.hash
    }

    /// Wait for inclusion. A receipt reporting failure is an error.
    pub async fn wait(self) -> Result<TransactionReceipt, ContractError> {
        let receipt = self.signer.wait_for_receipt(self.hash).await?;
        if !receipt.success {
            return Err(ContractError::TransactionFailed(self.hash));
        }
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{B256, Bytes};
    use async_trait::async_trait;
    use mockall::mock;
    use mockall::predicate::always;

    mock! {
        pub TestSigner {}

        #[async_trait]
        impl Signer for TestSigner {
            fn address(&self) -> Address;
            async fn send_transaction(&self, request: TransactionRequest) -> Result<TxHash, WalletError>;
            async fn wait_for_receipt(&self, hash: TxHash) -> Result<TransactionReceipt, WalletError>;
            async fn call(&self, request: CallRequest) -> Result<Bytes, WalletError>;
        }
    }

    fn handle(signer: MockTestSigner) -> ContractHandle {
        ContractHandle::new(Address::repeat_byte(0xaa), Abi::greeter().unwrap(), Arc::new(signer))
    }

    #[tokio::test]
    async fn test_send_encodes_calldata_for_the_contract() {
        let mut signer = MockTestSigner::new();
        signer.expect_address().return_const(Address::repeat_byte(0x01));
        signer
            .expect_send_transaction()
            .withf(|request| {
                let greet = Abi::greeter().unwrap().function("greet").unwrap().clone();
                request.to == Address::repeat_byte(0xaa) && greet.decode_call(&request.data).ok() == Some(vec![AbiValue::from("Alice")])
            })
            .times(1)
            .returning(|_| Ok(B256::repeat_byte(0x42)));
        signer.expect_wait_for_receipt().with(always()).times(1).returning(|hash| {
            Ok(TransactionReceipt {
                transaction_hash: hash,
                block_number: 7,
                from: Address::repeat_byte(0x01),
                to: Address::repeat_byte(0xaa),
                success: true,
            })
        });

        let pending = handle(signer).send("greet", &[AbiValue::from("Alice")]).await.unwrap();
        assert_eq!(pending.hash(), B256::repeat_byte(0x42));
        let receipt = pending.wait().await.unwrap();
        assert_eq!(receipt.block_number, 7);
    }

    #[tokio::test]
    async fn test_failed_receipt_is_an_error() {
        let mut signer = MockTestSigner::new();
        signer.expect_address().return_const(Address::ZERO);
        signer.expect_send_transaction().returning(|_| Ok(B256::repeat_byte(0x01)));
        signer.expect_wait_for_receipt().returning(|hash| {
            Ok(TransactionReceipt {
                transaction_hash: hash,
                block_number: 1,
                from: Address::ZERO,
                to: Address::repeat_byte(0xaa),
                success: false,
            })
        });

        let pending = handle(signer).send("greet", &[AbiValue::from("Bob")]).await.unwrap();
        assert_eq!(pending.wait().await.unwrap_err(), ContractError::TransactionFailed(B256::repeat_byte(0x01)));
    }

    #[tokio::test]
    async fn test_mutability_is_enforced_before_reaching_the_wallet() {
        let mut signer = MockTestSigner::new();
        signer.expect_address().return_const(Address::ZERO);
        signer.expect_send_transaction().never();
        signer.expect_call().never();
        let handle = handle(signer);

        let err = handle.send("getSubmittedNames", &[]).await.err().unwrap();
        assert!(matches!(err, ContractError::WrongMutability { mutability: StateMutability::View, .. }));

        let err = handle.call("greet", &[AbiValue::from("x")]).await.unwrap_err();
        assert!(matches!(err, ContractError::WrongMutability { mutability: StateMutability::Nonpayable, .. }));

        let err = handle.call("nope", &[]).await.unwrap_err();
        assert_eq!(err, ContractError::Abi(AbiError::UnknownFunction("nope".to_string())));
    }

    #[tokio::test]
    async fn test_call_decodes_outputs() {
        let mut signer = MockTestSigner::new();
        signer.expect_address().return_const(Address::ZERO);
        signer.expect_call().times(1).returning(|_| {
            let abi = Abi::greeter().unwrap();
            let function = abi.function("getSubmittedNames").unwrap();
            Ok(function.encode_output(&[AbiValue::Array(vec![AbiValue::from("Alice"), AbiValue::from("Bob")])]).unwrap())
        });

        let values = handle(signer).call("getSubmittedNames", &[]).await.unwrap();
        assert_eq!(values.into_iter().next().and_then(AbiValue::into_string_array), Some(vec!["Alice".to_string(), "Bob".to_string()]));
    }

    #[tokio::test]
    async fn test_wallet_revert_propagates() {
        let mut signer = MockTestSigner::new();
        signer.expect_address().return_const(Address::ZERO);
        signer.expect_send_transaction().returning(|_| Err(WalletError::Reverted { reason: "nope".to_string() }));

        let err = handle(signer).send("greet", &[AbiValue::from("x")]).await.err().unwrap();
        assert_eq!(err, ContractError::Wallet(WalletError::Reverted { reason: "nope".to_string() }));
    }
}
