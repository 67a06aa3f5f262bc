//! Calldata compiler.
//!
//! Every argument becomes a flat run of field elements: scalars encode as
//! themselves, arrays as a length prefix followed by their elements, and
//! structs as their members in declared order. Nesting is flattened
//! depth-first.

use serde::Deserialize;
use serde_json::Value;

use crate::crypto::{parse_felt, FieldElement};
use crate::error::{AccountError, Result};

/// Trait for values that have a canonical calldata representation.
/// This must be deterministic: the same value always yields the same felts.
pub trait CalldataEncode {
    fn encode_calldata(&self, out: &mut Vec<FieldElement>) -> Result<()>;

    fn to_calldata(&self) -> Result<Vec<FieldElement>> {
        let mut buf = Vec::new();
        self.encode_calldata(&mut buf)?;
        Ok(buf)
    }
}

// --- Primitives ---

impl CalldataEncode for FieldElement {
    fn encode_calldata(&self, out: &mut Vec<FieldElement>) -> Result<()> {
        out.push(*self);
        Ok(())
    }
}

impl CalldataEncode for u64 {
    fn encode_calldata(&self, out: &mut Vec<FieldElement>) -> Result<()> {
        out.push(FieldElement::from(*self));
        Ok(())
    }
}

impl CalldataEncode for u128 {
    fn encode_calldata(&self, out: &mut Vec<FieldElement>) -> Result<()> {
        out.push(FieldElement::from(*self));
        Ok(())
    }
}

/// Strings are numeric literals (hex or decimal), not text.
impl CalldataEncode for str {
    fn encode_calldata(&self, out: &mut Vec<FieldElement>) -> Result<()> {
        out.push(parse_felt(self)?);
        Ok(())
    }
}

impl CalldataEncode for String {
    fn encode_calldata(&self, out: &mut Vec<FieldElement>) -> Result<()> {
        self.as_str().encode_calldata(out)
    }
}

impl<T: CalldataEncode> CalldataEncode for [T] {
    fn encode_calldata(&self, out: &mut Vec<FieldElement>) -> Result<()> {
        out.push(FieldElement::from(self.len()));
        for item in self {
            item.encode_calldata(out)?;
        }
        Ok(())
    }
}

impl<T: CalldataEncode> CalldataEncode for Vec<T> {
    fn encode_calldata(&self, out: &mut Vec<FieldElement>) -> Result<()> {
        self.as_slice().encode_calldata(out)
    }
}

/// A single argument value as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub enum ArgValue {
    Felt(FieldElement),
    Int(u128),
    /// Hex (`0x`) or decimal literal.
    Text(String),
    Array(Vec<ArgValue>),
    /// Members in declared order.
    Struct(Vec<(String, ArgValue)>),
}

impl CalldataEncode for ArgValue {
    fn encode_calldata(&self, out: &mut Vec<FieldElement>) -> Result<()> {
        match self {
            ArgValue::Felt(felt) => felt.encode_calldata(out),
            ArgValue::Int(value) => value.encode_calldata(out),
            ArgValue::Text(text) => text.encode_calldata(out),
            ArgValue::Array(items) => items.encode_calldata(out),
            ArgValue::Struct(members) => {
                for (name, member) in members {
                    member
                        .encode_calldata(out)
                        .map_err(|e| within(name, e))?;
                }
                Ok(())
            }
        }
    }
}

impl From<FieldElement> for ArgValue {
    fn from(value: FieldElement) -> Self {
        ArgValue::Felt(value)
    }
}

impl From<u64> for ArgValue {
    fn from(value: u64) -> Self {
        ArgValue::Int(value as u128)
    }
}

impl From<u128> for ArgValue {
    fn from(value: u128) -> Self {
        ArgValue::Int(value)
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Text(value.to_string())
    }
}

impl<T: Into<ArgValue>> From<Vec<T>> for ArgValue {
    fn from(values: Vec<T>) -> Self {
        ArgValue::Array(values.into_iter().map(Into::into).collect())
    }
}

impl TryFrom<Value> for ArgValue {
    type Error = AccountError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Number(n) => {
                if let Some(v) = n.as_u64() {
                    Ok(ArgValue::Int(v as u128))
                } else if n.is_i64() {
                    Err(AccountError::Encoding(format!("negative value {} is not a field element", n)))
                } else {
                    Err(AccountError::Encoding(format!(
                        "{} is not an integer below 2^64; pass large values as strings",
                        n
                    )))
                }
            }
            Value::String(s) => Ok(ArgValue::Text(s)),
            Value::Array(items) => items
                .into_iter()
                .map(ArgValue::try_from)
                .collect::<Result<Vec<_>>>()
                .map(ArgValue::Array),
            Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| ArgValue::try_from(v).map(|v| (k, v)))
                .collect::<Result<Vec<_>>>()
                .map(ArgValue::Struct),
            other => Err(AccountError::Encoding(format!(
                "unsupported calldata value: {}",
                other
            ))),
        }
    }
}

fn within(name: &str, err: AccountError) -> AccountError {
    match err {
        AccountError::Encoding(msg) => AccountError::Encoding(format!("{}: {}", name, msg)),
        other => other,
    }
}

/// Compiles named arguments, in the order given, into flat calldata.
pub fn compile_calldata(args: &[(String, ArgValue)]) -> Result<Vec<FieldElement>> {
    let mut out = Vec::new();
    for (name, value) in args {
        value.encode_calldata(&mut out).map_err(|e| within(name, e))?;
    }
    Ok(out)
}

/// Compiles positional values into flat calldata.
pub fn compile_values(values: &[ArgValue]) -> Result<Vec<FieldElement>> {
    let mut out = Vec::new();
    for value in values {
        value.encode_calldata(&mut out)?;
    }
    Ok(out)
}

/// Reads named arguments from a JSON object, keeping key order.
pub fn args_from_json(value: Value) -> Result<Vec<(String, ArgValue)>> {
    match value {
        Value::Object(map) => map
            .into_iter()
            .map(|(k, v)| ArgValue::try_from(v).map(|v| (k, v)))
            .collect(),
        other => Err(AccountError::Encoding(format!(
            "expected an object of named arguments, got {}",
            other
        ))),
    }
}

/// Reads one length-prefixed array from the head of `calldata` and returns it
/// with the remaining, unread elements.
pub fn decode_array(calldata: &[FieldElement]) -> Result<(Vec<FieldElement>, &[FieldElement])> {
    let (len, rest) = calldata
        .split_first()
        .ok_or_else(|| AccountError::Encoding("missing array length".to_string()))?;
    let len = u64::try_from(*len)
        .ok()
        .and_then(|l| usize::try_from(l).ok())
        .filter(|l| *l <= rest.len())
        .ok_or_else(|| {
            AccountError::Encoding(format!(
                "array length {} exceeds the {} remaining elements",
                len,
                rest.len()
            ))
        })?;
    Ok((rest[..len].to_vec(), &rest[len..]))
}
