//! Fixtures shared by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::{AddTransactionResult, CallContractResult, ContractCall, Provider};
use crate::crypto::{FieldElement, Signature};
use crate::error::{AccountError, Result};

pub const TEST_PRIVATE_KEY: &str =
    "0x2dccce1da22003777062ee0870e9881b460a8b7eca276870f57c601f182136c";

pub const TEST_ACCOUNT_ADDRESS: &str =
    "0x7e00d496e324876bbc8531f2d9a82bf154d1a04a50218ee74cdd372f75a551a";

pub fn felt(hex: &str) -> FieldElement {
    FieldElement::from_hex_be(hex).unwrap()
}

/// How the stub answers `call_contract`.
pub enum CallBehavior {
    Return(Vec<FieldElement>),
    NetworkFailure,
    Reject,
}

/// Provider double that records every request it receives.
pub struct StubProvider {
    pub call_behavior: CallBehavior,
    pub calls: AtomicUsize,
    pub invokes: AtomicUsize,
    pub last_call: Mutex<Option<ContractCall>>,
    pub last_invoke: Mutex<Option<(ContractCall, Signature)>>,
}

impl StubProvider {
    pub fn new(call_behavior: CallBehavior) -> Self {
        Self {
            call_behavior,
            calls: AtomicUsize::new(0),
            invokes: AtomicUsize::new(0),
            last_call: Mutex::new(None),
            last_invoke: Mutex::new(None),
        }
    }

    pub fn returning(result: Vec<FieldElement>) -> Self {
        Self::new(CallBehavior::Return(result))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn invoke_count(&self) -> usize {
        self.invokes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for StubProvider {
    async fn call_contract(&self, call: &ContractCall) -> Result<CallContractResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_call.lock().unwrap() = Some(call.clone());
        match &self.call_behavior {
            CallBehavior::Return(result) => Ok(CallContractResult { result: result.clone() }),
            CallBehavior::NetworkFailure => Err(AccountError::Network("connection refused".to_string())),
            CallBehavior::Reject => Err(AccountError::ContractRead("assertion failed".to_string())),
        }
    }

    async fn invoke_function(
        &self,
        call: &ContractCall,
        signature: &Signature,
    ) -> Result<AddTransactionResult> {
        self.invokes.fetch_add(1, Ordering::SeqCst);
        *self.last_invoke.lock().unwrap() = Some((call.clone(), *signature));
        Ok(AddTransactionResult {
            code: "TRANSACTION_RECEIVED".to_string(),
            transaction_hash: FieldElement::from(0xabcu64),
        })
    }
}
