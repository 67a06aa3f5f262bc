//! Signing capability held by an account.

use std::sync::Arc;

use crate::crypto::{FieldElement, KeyPair, Signature};
use crate::error::Result;
use crate::typed_data::TypedData;

/// Signs hashes on behalf of an account. Implementations are pure: the same
/// hash always yields the same signature and no shared state is mutated, so
/// one signer may serve concurrent callers.
pub trait Signer: Send + Sync {
    fn public_key(&self) -> FieldElement;

    fn sign_hash(&self, hash: &FieldElement) -> Result<Signature>;

    /// Hashes `typed_data` as approved by `account`, then signs the hash.
    fn sign_message(&self, typed_data: &TypedData, account: FieldElement) -> Result<Signature> {
        let hash = typed_data.message_hash(account)?;
        self.sign_hash(&hash)
    }
}

impl Signer for KeyPair {
    fn public_key(&self) -> FieldElement {
        KeyPair::public_key(self)
    }

    fn sign_hash(&self, hash: &FieldElement) -> Result<Signature> {
        self.sign(hash)
    }
}

impl<S: Signer + ?Sized> Signer for Arc<S> {
    fn public_key(&self) -> FieldElement {
        (**self).public_key()
    }

    fn sign_hash(&self, hash: &FieldElement) -> Result<Signature> {
        (**self).sign_hash(hash)
    }
}
