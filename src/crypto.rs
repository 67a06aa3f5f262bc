//! Stark-curve primitives: chained Pedersen hashing, selectors, short strings
//! and the account key pair.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use starknet_crypto::{
    get_public_key, pedersen_hash, rfc6979_generate_k, sign as ecdsa_sign, verify as ecdsa_verify,
    SignError,
};

pub use starknet_ff::FieldElement;

use crate::error::{AccountError, Result};

/// Longest string that still fits in a single field element.
pub const MAX_SHORT_STRING_LEN: usize = 31;

/// Pedersen hash of two field elements.
pub fn pedersen(a: &FieldElement, b: &FieldElement) -> FieldElement {
    pedersen_hash(a, b)
}

/// Folds `pedersen(acc, x)` over `elements` starting from zero, then folds in
/// the element count.
pub fn hash_on_elements(elements: &[FieldElement]) -> FieldElement {
    let acc = elements
        .iter()
        .fold(FieldElement::ZERO, |acc, x| pedersen_hash(&acc, x));
    pedersen_hash(&acc, &FieldElement::from(elements.len()))
}

/// Keccak-256 truncated to 250 bits.
pub fn starknet_keccak(data: &[u8]) -> FieldElement {
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&Keccak256::digest(data));
    bytes[0] &= 0b0000_0011;
    // Cannot fail: the masked value is below 2^250.
    FieldElement::from_bytes_be(&bytes).unwrap_or(FieldElement::ZERO)
}

/// Entrypoint selector for a function name.
pub fn selector_from_name(name: &str) -> Result<FieldElement> {
    if !name.is_ascii() {
        return Err(AccountError::Encoding(format!(
            "entrypoint name '{}' is not ASCII",
            name
        )));
    }
    match name {
        "__default__" | "__l1_default__" => Ok(FieldElement::ZERO),
        _ => Ok(starknet_keccak(name.as_bytes())),
    }
}

/// Packs an ASCII string of at most 31 bytes into a field element, big-endian.
pub fn encode_short_string(value: &str) -> Result<FieldElement> {
    if !value.is_ascii() {
        return Err(AccountError::Encoding(format!(
            "short string '{}' is not ASCII",
            value
        )));
    }
    if value.len() > MAX_SHORT_STRING_LEN {
        return Err(AccountError::Encoding(format!(
            "short string '{}' exceeds {} characters",
            value, MAX_SHORT_STRING_LEN
        )));
    }
    FieldElement::from_byte_slice_be(value.as_bytes())
        .map_err(|e| AccountError::Encoding(e.to_string()))
}

/// Parses a `0x`-prefixed hex or a plain decimal string.
pub fn parse_felt(value: &str) -> Result<FieldElement> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AccountError::Encoding("empty numeric value".to_string()));
    }
    let parsed = if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        FieldElement::from_hex_be(hex)
    } else {
        FieldElement::from_dec_str(trimmed)
    };
    parsed.map_err(|e| AccountError::Encoding(format!("'{}': {}", value, e)))
}

/// Hashes accepted by the signing equation are strictly below 2^251.
pub fn is_signable(hash: &FieldElement) -> bool {
    hash.to_bytes_be()[0] < 0x08
}

/// ECDSA signature over a Stark field element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub r: FieldElement,
    pub s: FieldElement,
}

impl Signature {
    /// Number of field elements the signature occupies in calldata.
    pub const LEN: usize = 2;

    pub fn to_vec(&self) -> Vec<FieldElement> {
        vec![self.r, self.s]
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x},{:#x}", self.r, self.s)
    }
}

impl FromStr for Signature {
    type Err = AccountError;

    /// Accepts `r,s` with each component in hex or decimal.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != Self::LEN {
            return Err(AccountError::Encoding(format!(
                "expected signature as 'r,s', got '{}'",
                s
            )));
        }
        Ok(Signature {
            r: parse_felt(parts[0])?,
            s: parse_felt(parts[1])?,
        })
    }
}

/// Checks `signature` over `hash` against a public key. Malformed inputs
/// (out-of-range components, a key that is not on the curve) verify as false.
pub fn verify_signature(public_key: &FieldElement, hash: &FieldElement, signature: &Signature) -> bool {
    ecdsa_verify(public_key, hash, &signature.r, &signature.s).unwrap_or(false)
}

/// Stark key pair. The private scalar never leaves this struct.
#[derive(Clone)]
pub struct KeyPair {
    private_key: FieldElement,
    public_key: FieldElement,
}

impl KeyPair {
    pub fn from_private_key(private_key: FieldElement) -> Result<Self> {
        if private_key == FieldElement::ZERO {
            return Err(AccountError::Signing("private key must be non-zero".to_string()));
        }
        Ok(KeyPair {
            private_key,
            public_key: get_public_key(&private_key),
        })
    }

    /// Restore from a hex or decimal private key string.
    pub fn from_hex(private_key: &str) -> Result<Self> {
        Self::from_private_key(parse_felt(private_key)?)
    }

    pub fn public_key(&self) -> FieldElement {
        self.public_key
    }

    /// Signs `hash` with an RFC 6979 nonce. Retries with an incrementing seed
    /// in the rare case the derived nonce yields a degenerate signature.
    pub fn sign(&self, hash: &FieldElement) -> Result<Signature> {
        if !is_signable(hash) {
            return Err(AccountError::Signing(format!(
                "message hash {:#x} is out of range",
                hash
            )));
        }

        let mut seed: Option<FieldElement> = None;
        loop {
            let k = rfc6979_generate_k(hash, &self.private_key, seed.as_ref());
            match ecdsa_sign(&self.private_key, hash, &k) {
                Ok(sig) => return Ok(Signature { r: sig.r, s: sig.s }),
                Err(SignError::InvalidK) => {
                    seed = Some(seed.unwrap_or(FieldElement::ZERO) + FieldElement::ONE);
                }
                Err(e) => return Err(AccountError::Signing(e.to_string())),
            }
        }
    }

    /// Verify a signature against this key pair's public key
    pub fn verify(&self, hash: &FieldElement, signature: &Signature) -> bool {
        verify_signature(&self.public_key, hash, signature)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &format_args!("{:#x}", self.public_key))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TEST_PRIVATE_KEY;

    fn felt(hex: &str) -> FieldElement {
        FieldElement::from_hex_be(hex).unwrap()
    }

    fn flip_bit(value: FieldElement, bit: usize) -> FieldElement {
        let mut bytes = value.to_bytes_be();
        bytes[31 - bit / 8] ^= 1 << (bit % 8);
        FieldElement::from_bytes_be(&bytes).unwrap()
    }

    #[test]
    fn test_selector_from_name() {
        assert_eq!(
            selector_from_name("transfer").unwrap(),
            felt("0x83afd3f4caedc6eebf44246fe54e38c95e3179a5ec9ea81740eca5b482d12e")
        );
        assert_eq!(
            selector_from_name("get_nonce").unwrap(),
            felt("0x1ac47721ee58ba2813c2a816bca188512839a00d3970f67c05eab986b14006d")
        );
        assert_eq!(selector_from_name("__default__").unwrap(), FieldElement::ZERO);
        assert_eq!(selector_from_name("__l1_default__").unwrap(), FieldElement::ZERO);
        assert!(selector_from_name("tränsfer").is_err());
    }

    #[test]
    fn test_pedersen_known_vector() {
        let hash = pedersen(
            &felt("0x03d937c035c878245caf64531a5756109c53068da139362728feb561405371cb"),
            &felt("0x0208a0a10250e382e1e4bbe2880906c2791bf6275695e02fbbc6aeff9cd8b31a"),
        );
        assert_eq!(
            hash,
            felt("0x030e480bed5fe53fa909cc0f8c4d99b8f9f2c016be4c41e13a4848797979c662")
        );
    }

    #[test]
    fn test_hash_on_empty_elements() {
        assert_eq!(
            hash_on_elements(&[]),
            felt("0x49ee3eba8c1600700ee1b87eb599f16716b0b1022947733551fde4050ca6804")
        );
    }

    #[test]
    fn test_short_string() {
        assert_eq!(
            encode_short_string("StarkNet Message").unwrap(),
            felt("0x537461726b4e6574204d657373616765")
        );
        assert_eq!(encode_short_string("").unwrap(), FieldElement::ZERO);
        assert!(encode_short_string(&"a".repeat(31)).is_ok());
        assert!(matches!(
            encode_short_string(&"a".repeat(32)),
            Err(AccountError::Encoding(_))
        ));
        assert!(matches!(encode_short_string("héllo"), Err(AccountError::Encoding(_))));
    }

    #[test]
    fn test_parse_felt() {
        assert_eq!(parse_felt("100").unwrap(), FieldElement::from(100u64));
        assert_eq!(parse_felt("0x64").unwrap(), FieldElement::from(100u64));
        assert!(parse_felt("-1").is_err());
        assert!(parse_felt("").is_err());
        // The modulus itself is not a field element.
        assert!(parse_felt("0x800000000000011000000000000000000000000000000000000000000000001").is_err());
    }

    #[test]
    fn test_public_key() {
        let keypair = KeyPair::from_hex(TEST_PRIVATE_KEY).unwrap();
        assert_eq!(
            keypair.public_key(),
            felt("0x499f65ae2f71d5298d2d88823b2e5e19596a71aac1984710479e406a002439")
        );
        assert!(KeyPair::from_hex("0x0").is_err());
    }

    #[test]
    fn test_sign_and_verify() {
        let keypair = KeyPair::from_hex(TEST_PRIVATE_KEY).unwrap();
        let hash = FieldElement::from(2u64);

        let signature = keypair.sign(&hash).unwrap();
        assert!(keypair.verify(&hash, &signature));
        assert!(verify_signature(&keypair.public_key(), &hash, &signature));

        // Wrong hash
        assert!(!keypair.verify(&FieldElement::from(3u64), &signature));
    }

    #[test]
    fn test_sign_is_deterministic() {
        let keypair = KeyPair::from_hex(TEST_PRIVATE_KEY).unwrap();
        let hash = felt("0x397e76d1667c4454bfb83514e120583af836f8e32a516765497823eabe16a3f");
        assert_eq!(keypair.sign(&hash).unwrap(), keypair.sign(&hash).unwrap());
    }

    #[test]
    fn test_bit_flip_rejected() {
        let keypair = KeyPair::from_hex(TEST_PRIVATE_KEY).unwrap();
        let hash = felt("0x18fc549917b1b71602067abde6e451aff989d6e4a253056db0d25e5d2a84a05");
        let signature = keypair.sign(&hash).unwrap();

        for bit in [0, 1, 7, 31, 64, 127, 128, 200, 249, 250] {
            let bad_r = Signature { r: flip_bit(signature.r, bit), s: signature.s };
            let bad_s = Signature { r: signature.r, s: flip_bit(signature.s, bit) };
            assert!(!keypair.verify(&hash, &bad_r), "r bit {} accepted", bit);
            assert!(!keypair.verify(&hash, &bad_s), "s bit {} accepted", bit);
        }
    }

    #[test]
    fn test_sign_rejects_out_of_range_hash() {
        let keypair = KeyPair::from_hex(TEST_PRIVATE_KEY).unwrap();
        let too_big = felt("0x800000000000000000000000000000000000000000000000000000000000000");
        assert!(matches!(keypair.sign(&too_big), Err(AccountError::Signing(_))));
    }

    #[test]
    fn test_verify_known_vector() {
        let public_key = felt("0x01ef15c18599971b7beced415a40f0c7deacfd9b0d1819e03d723d8bc943cfca");
        let signature = Signature {
            r: felt("0x0411494b501a98abd8262b0da1351e17899a0c4ef23dd2f96fec5ba847310b20"),
            s: felt("0x0405c3191ab3883ef2b763af35bc5f5d15b3b4e99461d70e84c654a351a7c81b"),
        };
        assert!(verify_signature(&public_key, &FieldElement::from(2u64), &signature));

        // Not a curve point: verifies as false instead of erroring.
        let bad_key = felt("0x03ee9bffffffffff26ffffffff60ffffffffffffffffffffffffffff004accff");
        assert!(!verify_signature(&bad_key, &FieldElement::from(2u64), &signature));
    }

    #[test]
    fn test_signature_from_str() {
        let sig: Signature = "0x1,2".parse().unwrap();
        assert_eq!(sig.r, FieldElement::ONE);
        assert_eq!(sig.s, FieldElement::TWO);
        assert_eq!(sig.to_string(), "0x1,0x2");
        assert!("0x1".parse::<Signature>().is_err());
    }

    #[test]
    fn test_debug_hides_private_key() {
        let keypair = KeyPair::from_hex(TEST_PRIVATE_KEY).unwrap();
        let rendered = format!("{:?}", keypair);
        assert!(!rendered.contains("2dccce1da22003777062ee0870e9881b460a8b7eca276870f57c601f182136c"));
        assert!(rendered.contains("public_key"));
    }
}
