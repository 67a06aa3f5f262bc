//! Account façade.
//!
//! Composes the calldata compiler, transaction assembler, signer and verifier
//! with a [`Provider`] for the three network-bound steps: nonce resolution,
//! submission and delegated verification. Everything else is pure and
//! synchronous.
//!
//! Concurrent `execute` calls on one account race on the fetched nonce;
//! callers issuing overlapping calls must serialize them or pass distinct
//! nonces through [`InvocationsDetails`].

use serde_json::Value;
use tracing::{debug, info};

use crate::client::{AddTransactionResult, Provider};
use crate::crypto::{FieldElement, Signature};
use crate::error::{AccountError, Result};
use crate::signer::Signer;
use crate::transaction::{
    assemble_execute, single_invocation, ContractCall, ExecuteTransaction, Invocation,
    InvocationsDetails,
};
use crate::typed_data::TypedData;
use crate::verifier::{verify_delegated, verify_local};

pub const GET_NONCE_ENTRYPOINT: &str = "get_nonce";

/// Contract ABI entries. Accepted by [`Account::execute`] for richer argument
/// encoding later; not consulted today.
pub type Abi = Value;

pub struct Account<P, S> {
    provider: P,
    signer: S,
    address: FieldElement,
}

impl<P: Provider, S: Signer> Account<P, S> {
    pub fn new(provider: P, signer: S, address: FieldElement) -> Self {
        Self {
            provider,
            signer,
            address,
        }
    }

    pub fn address(&self) -> FieldElement {
        self.address
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn public_key(&self) -> FieldElement {
        self.signer.public_key()
    }

    /// Current nonce as reported by the account contract.
    pub async fn get_nonce(&self) -> Result<FieldElement> {
        let call = ContractCall::new(self.address, GET_NONCE_ENTRYPOINT, Vec::new())?;
        let response = self.provider.call_contract(&call).await?;
        match response.result.as_slice() {
            [nonce] => Ok(*nonce),
            other => Err(AccountError::ContractRead(format!(
                "{} on {:#x} returned {} values, expected 1",
                GET_NONCE_ENTRYPOINT,
                self.address,
                other.len()
            ))),
        }
    }

    /// Builds and signs the `execute` transaction for `invocation` at `nonce`
    /// without submitting it.
    pub fn sign_execute(
        &self,
        invocation: &Invocation,
        nonce: FieldElement,
    ) -> Result<(ExecuteTransaction, Signature)> {
        let inner = invocation.compile()?;
        let tx = assemble_execute(self.address, &inner, nonce)?;
        let signature = self.signer.sign_hash(&tx.hash)?;
        Ok((tx, signature))
    }

    /// Signs and submits one invocation through the account's `execute`
    /// entrypoint. Batches are rejected before any network or signing work;
    /// nonce lookup failures propagate unchanged.
    pub async fn execute(
        &self,
        invocations: &[Invocation],
        abis: &[Abi],
        details: &InvocationsDetails,
    ) -> Result<AddTransactionResult> {
        let invocation = single_invocation(invocations)?;
        let inner = invocation.compile()?;
        if !abis.is_empty() {
            debug!("Ignoring {} ABI entries", abis.len());
        }

        let nonce = match details.nonce {
            Some(nonce) => nonce,
            None => self.get_nonce().await?,
        };

        let tx = assemble_execute(self.address, &inner, nonce)?;
        let signature = self.signer.sign_hash(&tx.hash)?;
        info!(
            "Submitting {} on {:#x} via account {:#x} (nonce {}, hash {:#x})",
            invocation.entrypoint, invocation.contract_address, self.address, nonce, tx.hash
        );

        self.provider.invoke_function(&tx.call, &signature).await
    }

    pub fn hash_message(&self, typed_data: &TypedData) -> Result<FieldElement> {
        typed_data.message_hash(self.address)
    }

    pub fn sign_message(&self, typed_data: &TypedData) -> Result<Signature> {
        self.signer.sign_message(typed_data, self.address)
    }

    /// Delegated check through the account contract. Any failure, including
    /// an unreachable gateway, reads as `false`.
    pub async fn verify_message_hash(&self, hash: FieldElement, signature: &Signature) -> bool {
        verify_delegated(&self.provider, self.address, hash, signature).await
    }

    pub async fn verify_message(&self, typed_data: &TypedData, signature: &Signature) -> bool {
        match self.hash_message(typed_data) {
            Ok(hash) => self.verify_message_hash(hash, signature).await,
            Err(e) => {
                debug!("Could not hash typed data for verification: {}", e);
                false
            }
        }
    }

    /// Local check against the signer's public key only.
    pub fn verify_message_hash_locally(&self, hash: FieldElement, signature: &Signature) -> bool {
        verify_local(&self.signer.public_key(), &hash, signature)
    }

    pub fn verify_message_locally(&self, typed_data: &TypedData, signature: &Signature) -> bool {
        self.hash_message(typed_data)
            .map(|hash| self.verify_message_hash_locally(hash, signature))
            .unwrap_or(false)
    }
}
