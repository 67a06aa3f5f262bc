//! Domain-separated hashing of structured messages.
//!
//! Each declared type gets a type hash from its encoded signature
//! (`Mail(from:Person,...)Person(...)`), and a struct hash chains the type
//! hash with every member's encoding in declared order. The final message
//! hash binds a fixed prefix, the domain struct, the signing account and the
//! primary struct together.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::crypto::{
    encode_short_string, hash_on_elements, parse_felt, starknet_keccak, FieldElement,
};
use crate::error::{AccountError, Result};

/// Type describing the domain separator.
pub const DOMAIN_TYPE: &str = "StarkNetDomain";

/// Prefix folded into every message hash.
pub const MESSAGE_PREFIX: &str = "StarkNet Message";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMember {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl TypeMember {
    pub fn new(name: &str, kind: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: kind.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedData {
    pub types: BTreeMap<String, Vec<TypeMember>>,
    pub primary_type: String,
    /// Values for the `StarkNetDomain` struct.
    pub domain: Value,
    pub message: Value,
}

impl TypedData {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn members(&self, type_name: &str) -> Result<&[TypeMember]> {
        self.types
            .get(type_name)
            .map(Vec::as_slice)
            .ok_or_else(|| AccountError::Encoding(format!("type '{}' is not declared", type_name)))
    }

    /// Collects `type_name` and every struct type it references, depth-first.
    fn dependencies(&self, type_name: &str, found: &mut Vec<String>) {
        let base = type_name.trim_end_matches('*');
        if found.iter().any(|t| t == base) {
            return;
        }
        if let Some(members) = self.types.get(base) {
            found.push(base.to_string());
            for member in members {
                self.dependencies(&member.kind, found);
            }
        }
    }

    /// Canonical signature of a type: the type itself, then its referenced
    /// struct types sorted by name.
    pub fn encode_type(&self, type_name: &str) -> Result<String> {
        if type_name.contains('*') {
            return Err(AccountError::Encoding(format!(
                "type name '{}' must not contain '*'",
                type_name
            )));
        }
        self.members(type_name)?;

        let mut deps = Vec::new();
        self.dependencies(type_name, &mut deps);
        let (primary, rest) = deps.split_first_mut().ok_or_else(|| {
            AccountError::Encoding(format!("type '{}' is not declared", type_name))
        })?;
        rest.sort();

        let mut encoded = String::new();
        for name in std::iter::once(&*primary).chain(rest.iter()) {
            let fields: Vec<String> = self
                .members(name)?
                .iter()
                .map(|m| format!("{}:{}", m.name, m.kind))
                .collect();
            encoded.push_str(&format!("{}({})", name, fields.join(",")));
        }
        Ok(encoded)
    }

    pub fn type_hash(&self, type_name: &str) -> Result<FieldElement> {
        Ok(starknet_keccak(self.encode_type(type_name)?.as_bytes()))
    }

    pub fn struct_hash(&self, type_name: &str, data: &Value) -> Result<FieldElement> {
        let members = self.members(type_name)?;
        let object = data.as_object().ok_or_else(|| {
            AccountError::Encoding(format!("value for '{}' must be an object", type_name))
        })?;

        let mut elements = Vec::with_capacity(members.len() + 1);
        elements.push(self.type_hash(type_name)?);
        for member in members {
            let value = object.get(&member.name).ok_or_else(|| {
                AccountError::Encoding(format!(
                    "missing field '{}' of type '{}'",
                    member.name, type_name
                ))
            })?;
            elements.push(self.encode_value(&member.kind, value)?);
        }
        Ok(hash_on_elements(&elements))
    }

    fn encode_value(&self, kind: &str, value: &Value) -> Result<FieldElement> {
        if self.types.contains_key(kind) {
            return self.struct_hash(kind, value);
        }

        if let Some(element_kind) = kind.strip_suffix('*') {
            let items = value.as_array().ok_or_else(|| {
                AccountError::Encoding(format!("value for '{}' must be an array", kind))
            })?;
            let encoded = if self.types.contains_key(element_kind) {
                items
                    .iter()
                    .map(|item| self.struct_hash(element_kind, item))
                    .collect::<Result<Vec<_>>>()?
            } else {
                items.iter().map(encode_scalar).collect::<Result<Vec<_>>>()?
            };
            return Ok(hash_on_elements(&encoded));
        }

        encode_scalar(value)
    }

    /// Hash of the whole message as approved by `account`.
    pub fn message_hash(&self, account: FieldElement) -> Result<FieldElement> {
        if !self.types.contains_key(DOMAIN_TYPE) {
            return Err(AccountError::Encoding(format!(
                "typed data must declare '{}'",
                DOMAIN_TYPE
            )));
        }
        let elements = [
            encode_short_string(MESSAGE_PREFIX)?,
            self.struct_hash(DOMAIN_TYPE, &self.domain)?,
            account,
            self.struct_hash(&self.primary_type, &self.message)?,
        ];
        Ok(hash_on_elements(&elements))
    }
}

/// Numbers and numeric strings encode as their value; any other string as a
/// short string.
fn encode_scalar(value: &Value) -> Result<FieldElement> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(FieldElement::from)
            .ok_or_else(|| AccountError::Encoding(format!("{} is not a field element", n))),
        Value::String(s) => parse_felt(s).or_else(|_| encode_short_string(s)),
        other => Err(AccountError::Encoding(format!(
            "unsupported typed data value: {}",
            other
        ))),
    }
}
