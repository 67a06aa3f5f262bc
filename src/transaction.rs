//! Assembly of the account `execute` invocation and its transaction hash.

use serde::{Deserialize, Serialize};

use crate::crypto::{hash_on_elements, selector_from_name, FieldElement};
use crate::encoding::{compile_values, ArgValue};
use crate::error::{AccountError, Result};

/// Invocations wrapped per `execute` call. Raising this needs a multicall
/// calldata layout and hash schema.
pub const MAX_BATCH_SIZE: usize = 1;

/// Discriminator folded into every transaction hash.
pub const TRANSACTION_VERSION: u64 = 0;

/// Generic entrypoint every account exposes for wrapped calls.
pub const EXECUTE_ENTRYPOINT: &str = "execute";

/// A contract call as the caller describes it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
    pub contract_address: FieldElement,
    pub entrypoint: String,
    /// Omitted calldata is an empty argument list.
    #[serde(default)]
    pub calldata: Vec<ArgValue>,
}

impl Invocation {
    pub fn new(contract_address: FieldElement, entrypoint: &str) -> Self {
        Self {
            contract_address,
            entrypoint: entrypoint.to_string(),
            calldata: Vec::new(),
        }
    }

    pub fn with_calldata(mut self, calldata: Vec<ArgValue>) -> Self {
        self.calldata = calldata;
        self
    }

    /// Resolves the selector and flattens the arguments.
    pub fn compile(&self) -> Result<ContractCall> {
        Ok(ContractCall {
            contract_address: self.contract_address,
            entry_point_selector: selector_from_name(&self.entrypoint)?,
            calldata: compile_values(&self.calldata)?,
        })
    }
}

/// Optional overrides for an `execute` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationsDetails {
    /// Used instead of querying the account contract when set.
    pub nonce: Option<FieldElement>,
}

impl InvocationsDetails {
    pub fn with_nonce(nonce: FieldElement) -> Self {
        Self { nonce: Some(nonce) }
    }
}

/// A compiled call: what actually goes on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCall {
    pub contract_address: FieldElement,
    pub entry_point_selector: FieldElement,
    pub calldata: Vec<FieldElement>,
}

impl ContractCall {
    pub fn new(contract_address: FieldElement, entrypoint: &str, calldata: Vec<FieldElement>) -> Result<Self> {
        Ok(Self {
            contract_address,
            entry_point_selector: selector_from_name(entrypoint)?,
            calldata,
        })
    }
}

/// The wrapped `execute` call together with the hash the account signs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteTransaction {
    pub call: ContractCall,
    pub hash: FieldElement,
    pub nonce: FieldElement,
}

/// Picks the only invocation out of a request, rejecting anything else.
pub fn single_invocation(invocations: &[Invocation]) -> Result<&Invocation> {
    if invocations.len() > MAX_BATCH_SIZE {
        return Err(AccountError::Usage(format!(
            "at most {} invocation per execute call is supported, got {}",
            MAX_BATCH_SIZE,
            invocations.len()
        )));
    }
    invocations
        .first()
        .ok_or_else(|| AccountError::Usage("execute requires an invocation".to_string()))
}

/// Hash bound to one (account, inner call, nonce) triple.
pub fn transaction_hash(account: FieldElement, inner: &ContractCall, nonce: FieldElement) -> FieldElement {
    hash_on_elements(&[
        account,
        inner.contract_address,
        inner.entry_point_selector,
        hash_on_elements(&inner.calldata),
        nonce,
        FieldElement::from(TRANSACTION_VERSION),
    ])
}

/// Wraps `inner` into the account's `execute` entrypoint:
/// `[to, selector, calldata_len, calldata..., nonce]`.
pub fn assemble_execute(account: FieldElement, inner: &ContractCall, nonce: FieldElement) -> Result<ExecuteTransaction> {
    let mut calldata = Vec::with_capacity(inner.calldata.len() + 4);
    calldata.push(inner.contract_address);
    calldata.push(inner.entry_point_selector);
    calldata.push(FieldElement::from(inner.calldata.len()));
    calldata.extend_from_slice(&inner.calldata);
    calldata.push(nonce);

    Ok(ExecuteTransaction {
        call: ContractCall::new(account, EXECUTE_ENTRYPOINT, calldata)?,
        hash: transaction_hash(account, inner, nonce),
        nonce,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{felt, TEST_ACCOUNT_ADDRESS};

    fn transfer() -> Invocation {
        Invocation::new(felt("0x1"), "transfer").with_calldata(vec![ArgValue::from("0x2"), ArgValue::from(100u64)])
    }

    #[test]
    fn test_compile_invocation() {
        let call = transfer().compile().unwrap();
        assert_eq!(call.contract_address, felt("0x1"));
        assert_eq!(
            call.entry_point_selector,
            felt("0x83afd3f4caedc6eebf44246fe54e38c95e3179a5ec9ea81740eca5b482d12e")
        );
        assert_eq!(call.calldata, vec![felt("0x2"), FieldElement::from(100u64)]);
    }

    #[test]
    fn test_execute_calldata_layout() {
        let account = felt(TEST_ACCOUNT_ADDRESS);
        let inner = transfer().compile().unwrap();
        let tx = assemble_execute(account, &inner, FieldElement::from(5u64)).unwrap();

        assert_eq!(tx.call.contract_address, account);
        assert_eq!(
            tx.call.entry_point_selector,
            felt("0x240060cdb34fcc260f41eac7474ee1d7c80b7e3607daff9ac67c7ea2ebb1c44")
        );
        assert_eq!(
            tx.call.calldata,
            vec![
                felt("0x1"),
                inner.entry_point_selector,
                FieldElement::from(2u64),
                felt("0x2"),
                FieldElement::from(100u64),
                FieldElement::from(5u64),
            ]
        );
    }

    #[test]
    fn test_transaction_hash_golden() {
        let inner = transfer().compile().unwrap();
        let hash = transaction_hash(felt(TEST_ACCOUNT_ADDRESS), &inner, FieldElement::from(5u64));
        assert_eq!(
            hash,
            felt("0x18fc549917b1b71602067abde6e451aff989d6e4a253056db0d25e5d2a84a05")
        );
    }

    #[test]
    fn test_transaction_hash_is_deterministic() {
        let account = felt(TEST_ACCOUNT_ADDRESS);
        let inner = transfer().compile().unwrap();
        let nonce = FieldElement::from(5u64);
        assert_eq!(
            transaction_hash(account, &inner, nonce),
            transaction_hash(account, &inner, nonce)
        );
    }

    #[test]
    fn test_transaction_hash_binds_every_input() {
        let account = felt(TEST_ACCOUNT_ADDRESS);
        let inner = transfer().compile().unwrap();
        let nonce = FieldElement::from(5u64);
        let base = transaction_hash(account, &inner, nonce);

        assert_ne!(base, transaction_hash(felt("0x9"), &inner, nonce));
        assert_ne!(base, transaction_hash(account, &inner, FieldElement::from(6u64)));

        let mut other = inner.clone();
        other.contract_address = felt("0x3");
        assert_ne!(base, transaction_hash(account, &other, nonce));

        let mut other = inner.clone();
        other.entry_point_selector = selector_from_name("approve").unwrap();
        assert_ne!(base, transaction_hash(account, &other, nonce));

        let mut other = inner;
        other.calldata.push(FieldElement::ZERO);
        assert_ne!(base, transaction_hash(account, &other, nonce));
    }

    #[test]
    fn test_omitted_calldata_is_empty() {
        let invocation: Invocation =
            serde_json::from_str(r#"{ "contractAddress": "0x1", "entrypoint": "pause" }"#).unwrap();
        let inner = invocation.compile().unwrap();
        assert!(inner.calldata.is_empty());

        let tx = assemble_execute(felt("0x10"), &inner, FieldElement::ZERO).unwrap();
        assert_eq!(tx.call.calldata.len(), 4);
        assert_eq!(tx.call.calldata[2], FieldElement::ZERO);
    }

    #[test]
    fn test_single_invocation_policy() {
        assert!(matches!(single_invocation(&[]), Err(AccountError::Usage(_))));
        assert!(single_invocation(&[transfer()]).is_ok());
        assert!(matches!(
            single_invocation(&[transfer(), transfer()]),
            Err(AccountError::Usage(_))
        ));
    }
}
