pub mod account;
pub mod cli;
pub mod client;
pub mod config;
pub mod crypto;
pub mod encoding;
pub mod error;
pub mod signer;
pub mod transaction;
pub mod typed_data;
pub mod verifier;

#[cfg(test)]
mod test_utils;

pub use account::Account;
pub use client::{GatewayClient, Provider};
pub use crypto::{FieldElement, KeyPair, Signature};
pub use error::{AccountError, Result};
pub use signer::Signer;
pub use transaction::{Invocation, InvocationsDetails};
pub use typed_data::TypedData;
