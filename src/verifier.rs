//! Signature verification, locally against a known public key or by asking
//! the account contract.

use tracing::{debug, warn};

use crate::client::Provider;
use crate::crypto::{verify_signature, FieldElement, Signature};
use crate::error::{AccountError, Result};
use crate::transaction::ContractCall;

pub const IS_VALID_SIGNATURE_ENTRYPOINT: &str = "is_valid_signature";

/// `is_valid_signature(hash, signature_len, signature...)` on `account`.
pub fn is_valid_signature_call(
    account: FieldElement,
    hash: FieldElement,
    signature: &Signature,
) -> Result<ContractCall> {
    let mut calldata = vec![hash, FieldElement::from(Signature::LEN)];
    calldata.extend(signature.to_vec());
    ContractCall::new(account, IS_VALID_SIGNATURE_ENTRYPOINT, calldata)
}

/// Checks the signature algebra against `public_key` with no network round
/// trip. Accounts that rotate keys or accept several keys can approve
/// signatures this check rejects.
pub fn verify_local(public_key: &FieldElement, hash: &FieldElement, signature: &Signature) -> bool {
    verify_signature(public_key, hash, signature)
}

/// Asks the account contract whether it accepts `signature` over `hash`.
///
/// A completed call means the contract accepted. Every failure maps to
/// `false`: a contract rejection and an unreachable gateway are not told
/// apart here, only in the logs.
pub async fn verify_delegated<P: Provider + ?Sized>(
    provider: &P,
    account: FieldElement,
    hash: FieldElement,
    signature: &Signature,
) -> bool {
    let call = match is_valid_signature_call(account, hash, signature) {
        Ok(call) => call,
        Err(e) => {
            warn!("Could not build is_valid_signature call: {}", e);
            return false;
        }
    };

    match provider.call_contract(&call).await {
        Ok(_) => true,
        Err(AccountError::ContractRead(msg)) => {
            debug!("Account {:#x} rejected signature for {:#x}: {}", account, hash, msg);
            false
        }
        Err(e) => {
            warn!("Signature check for {:#x} failed without a verdict: {}", hash, e);
            false
        }
    }
}
