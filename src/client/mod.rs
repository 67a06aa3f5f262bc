// Client module
pub mod gateway;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::crypto::{FieldElement, Signature};
use crate::error::Result;

pub use crate::transaction::ContractCall;
pub use gateway::GatewayClient;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContractResult {
    pub result: Vec<FieldElement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddTransactionResult {
    pub code: String,
    pub transaction_hash: FieldElement,
}

/// The two network operations an account needs: a read-only contract call
/// and submission of a signed invocation.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn call_contract(&self, call: &ContractCall) -> Result<CallContractResult>;

    async fn invoke_function(
        &self,
        call: &ContractCall,
        signature: &Signature,
    ) -> Result<AddTransactionResult>;
}
