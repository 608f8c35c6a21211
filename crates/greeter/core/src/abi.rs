// Greeter
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Contract interface descriptions and the ABI codec used to talk to them.
//!
//! Only the types the greeter interface needs are supported: `uintN`, `string`
//! and dynamic arrays of those. Anything else is rejected when an interface
//! description is parsed, so a loaded [`Abi`] can always encode and decode
//! every function it exposes.

use alloy_primitives::{Bytes, U256, keccak256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Interface description of the deployed greeter contract.
pub const GREETER_ABI_JSON: &str = r#"[
    {
        "inputs": [{ "internalType": "string", "name": "name", "type": "string" }],
        "name": "greet",
        "outputs": [{ "internalType": "string", "name": "", "type": "string" }],
        "stateMutability": "nonpayable",
        "type": "function"
    },
    {
        "inputs": [],
        "name": "getSubmittedNames",
        "outputs": [{ "internalType": "string[]", "name": "", "type": "string[]" }],
        "stateMutability": "view",
        "type": "function"
    },
    {
        "inputs": [{ "internalType": "uint256", "name": "", "type": "uint256" }],
        "name": "submittedNames",
        "outputs": [{ "internalType": "string", "name": "", "type": "string" }],
        "stateMutability": "view",
        "type": "function"
    }
]"#;

const WORD: usize = 32;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    #[error("Invalid interface description: {0}")]
    InvalidJson(String),
    #[error("Unsupported ABI type: {0}")]
    UnsupportedType(String),
    #[error("Function not found in interface: {0}")]
    UnknownFunction(String),
    #[error("Calldata selector 0x{0} does not match any function")]
    UnknownSelector(String),
    #[error("Expected {expected} values, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },
    #[error("Value {index} does not match type {expected}")]
    ArgumentType { index: usize, expected: String },
    #[error("Value does not fit in {0}")]
    Overflow(String),
    #[error("Data too short: needed {needed} bytes at offset {offset}, {available} available")]
    Truncated { offset: usize, needed: usize, available: usize },
    #[error("Length or offset out of range: {0}")]
    OutOfRange(String),
    #[error("Invalid UTF-8 in string value")]
    InvalidUtf8,
    #[error("Unexpected return data: {0}")]
    UnexpectedOutput(String),
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

/// Solidity types understood by the codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiType {
    Uint(usize),
    String,
    Array(Box<AbiType>),
}

impl AbiType {
    pub fn is_dynamic(&self) -> bool {
        !matches!(self, AbiType::Uint(_))
    }
}

impl FromStr for AbiType {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(inner) = s.strip_suffix("[]") {
            return Ok(AbiType::Array(Box::new(inner.parse()?)));
        }
        match s {
            "string" => Ok(AbiType::String),
            "uint" => Ok(AbiType::Uint(256)),
            _ => {
                let bits = s
                    .strip_prefix("uint")
                    .and_then(|bits| bits.parse::<usize>().ok())
                    .filter(|bits| (8..=256).contains(bits) && bits % 8 == 0)
                    .ok_or_else(|| AbiError::UnsupportedType(s.to_string()))?;
                Ok(AbiType::Uint(bits))
            }
        }
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiType::Uint(bits) => write!(f, "uint{}", bits),
            AbiType::String => write!(f, "string"),
            AbiType::Array(inner) => write!(f, "{}[]", inner),
        }
    }
}

/// A decoded or to-be-encoded ABI value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Uint(U256),
    String(String),
    Array(Vec<AbiValue>),
}

impl AbiValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AbiValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            AbiValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn into_string(self) -> Option<String> {
        match self {
            AbiValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Converts a `string[]` value, preserving element order.
    pub fn into_string_array(self) -> Option<Vec<String>> {
        match self {
            AbiValue::Array(items) => items.into_iter().map(AbiValue::into_string).collect(),
            _ => None,
        }
    }

    fn matches(&self, ty: &AbiType) -> bool {
        match (ty, self) {
            (AbiType::Uint(_), AbiValue::Uint(_)) | (AbiType::String, AbiValue::String(_)) => true,
            (AbiType::Array(inner), AbiValue::Array(items)) => items.iter().all(|item| item.matches(inner)),
            _ => false,
        }
    }
}

impl From<&str> for AbiValue {
    fn from(value: &str) -> Self {
        AbiValue::String(value.to_string())
    }
}

impl From<String> for AbiValue {
    fn from(value: String) -> Self {
        AbiValue::String(value)
    }
}

impl From<U256> for AbiValue {
    fn from(value: U256) -> Self {
        AbiValue::Uint(value)
    }
}

impl From<u64> for AbiValue {
    fn from(value: u64) -> Self {
        AbiValue::Uint(U256::from(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    Nonpayable,
    Payable,
}

impl fmt::Display for StateMutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StateMutability::Pure => "pure",
            StateMutability::View => "view",
            StateMutability::Nonpayable => "nonpayable",
            StateMutability::Payable => "payable",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiParam {
    pub name: String,
    pub kind: AbiType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiFunction {
    pub name: String,
    pub inputs: Vec<AbiParam>,
    pub outputs: Vec<AbiParam>,
    pub state_mutability: StateMutability,
}

impl AbiFunction {
    /// Canonical signature, e.g. `greet(string)`.
    pub fn signature(&self) -> String {
        let inputs: Vec<String> = self.inputs.iter().map(|p| p.kind.to_string()).collect();
        format!("{}({})", self.name, inputs.join(","))
    }

    pub fn selector(&self) -> [u8; 4] {
        let hash = keccak256(self.signature().as_bytes());
        let mut selector = [0u8; 4];
        selector.copy_from_slice(&hash[..4]);
        selector
    }

    /// Whether invoking the function changes state and therefore needs a transaction.
    pub fn is_mutating(&self) -> bool {
        matches!(self.state_mutability, StateMutability::Nonpayable | StateMutability::Payable)
    }

    pub fn input_types(&self) -> Vec<AbiType> {
        self.inputs.iter().map(|p| p.kind.clone()).collect()
    }

    pub fn output_types(&self) -> Vec<AbiType> {
        self.outputs.iter().map(|p| p.kind.clone()).collect()
    }

    pub fn encode_call(&self, args: &[AbiValue]) -> Result<Bytes, AbiError> {
        let types = self.input_types();
        check_values(&types, args)?;
        let mut data = self.selector().to_vec();
        data.extend(encode(&types, args)?);
        Ok(Bytes::from(data))
    }

    pub fn decode_call(&self, calldata: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
        let body = calldata.strip_prefix(&self.selector()[..]).ok_or_else(|| AbiError::UnknownSelector(selector_hex(calldata)))?;
        decode(&self.input_types(), body)
    }

    pub fn encode_output(&self, values: &[AbiValue]) -> Result<Bytes, AbiError> {
        let types = self.output_types();
        check_values(&types, values)?;
        Ok(Bytes::from(encode(&types, values)?))
    }

    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
        decode(&self.output_types(), data)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    inputs: Vec<RawParam>,
    #[serde(default)]
    outputs: Vec<RawParam>,
    #[serde(default)]
    state_mutability: Option<StateMutability>,
}

#[derive(Deserialize)]
struct RawParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: String,
}

impl RawParam {
    fn into_param(self) -> Result<AbiParam, AbiError> {
        Ok(AbiParam { name: self.name, kind: self.kind.parse()? })
    }
}

/// Parsed interface description. Only `function` entries are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Abi {
    functions: Vec<AbiFunction>,
}

impl Abi {
    pub fn from_json(json: &str) -> Result<Self, AbiError> {
        let entries: Vec<RawEntry> = serde_json::from_str(json).map_err(|e| AbiError::InvalidJson(e.to_string()))?;

        let mut functions = Vec::new();
        for entry in entries.into_iter().filter(|e| e.kind == "function") {
            let name = entry.name.ok_or_else(|| AbiError::InvalidJson("function entry without a name".to_string()))?;
            let inputs = entry.inputs.into_iter().map(RawParam::into_param).collect::<Result<Vec<_>, _>>()?;
            let outputs = entry.outputs.into_iter().map(RawParam::into_param).collect::<Result<Vec<_>, _>>()?;
            functions.push(AbiFunction {
                name,
                inputs,
                outputs,
                state_mutability: entry.state_mutability.unwrap_or(StateMutability::Nonpayable),
            });
        }

        Ok(Self { functions })
    }

    /// The embedded greeter interface.
    pub fn greeter() -> Result<Self, AbiError> {
        Self::from_json(GREETER_ABI_JSON)
    }

    pub fn functions(&self) -> &[AbiFunction] {
        &self.functions
    }

    pub fn function(&self, name: &str) -> Result<&AbiFunction, AbiError> {
        self.functions.iter().find(|f| f.name == name).ok_or_else(|| AbiError::UnknownFunction(name.to_string()))
    }

    /// Resolves the function addressed by the first four bytes of `calldata`.
    pub fn function_for_calldata(&self, calldata: &[u8]) -> Result<&AbiFunction, AbiError> {
        self.functions
            .iter()
            .find(|f| calldata.starts_with(&f.selector()))
            .ok_or_else(|| AbiError::UnknownSelector(selector_hex(calldata)))
    }
}

fn selector_hex(calldata: &[u8]) -> String {
    calldata.iter().take(4).map(|b| format!("{:02x}", b)).collect()
}

fn check_values(types: &[AbiType], values: &[AbiValue]) -> Result<(), AbiError> {
    if types.len() != values.len() {
        return Err(AbiError::ArgumentCount { expected: types.len(), actual: values.len() });
    }
    for (index, (ty, value)) in types.iter().zip(values).enumerate() {
        if !value.matches(ty) {
            return Err(AbiError::ArgumentType { index, expected: ty.to_string() });
        }
    }
    Ok(())
}

/// Head/tail encodes `values` as a tuple of `types`.
pub fn encode(types: &[AbiType], values: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
    if types.len() != values.len() {
        return Err(AbiError::ArgumentCount { expected: types.len(), actual: values.len() });
    }

    let head_len = types.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for (index, (ty, value)) in types.iter().zip(values).enumerate() {
        if ty.is_dynamic() {
            head.extend_from_slice(&word(head_len + tail.len()));
            tail.extend(encode_value(ty, value, index)?);
        } else {
            head.extend(encode_value(ty, value, index)?);
        }
    }

    head.extend(tail);
    Ok(head)
}

fn encode_value(ty: &AbiType, value: &AbiValue, index: usize) -> Result<Vec<u8>, AbiError> {
    match (ty, value) {
        (AbiType::Uint(bits), AbiValue::Uint(v)) => {
            if v.bit_len() > *bits {
                return Err(AbiError::Overflow(ty.to_string()));
            }
            Ok(v.to_be_bytes::<WORD>().to_vec())
        }
        (AbiType::String, AbiValue::String(s)) => {
            let mut out = word(s.len()).to_vec();
            out.extend_from_slice(s.as_bytes());
            pad_to_word(&mut out);
            Ok(out)
        }
        (AbiType::Array(inner), AbiValue::Array(items)) => {
            let mut out = word(items.len()).to_vec();
            let types = vec![(**inner).clone(); items.len()];
            out.extend(encode(&types, items)?);
            Ok(out)
        }
        _ => Err(AbiError::ArgumentType { index, expected: ty.to_string() }),
    }
}

/// Decodes a tuple of `types` from `data`, bounds-checking every offset and length.
pub fn decode(types: &[AbiType], data: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
    types
        .iter()
        .enumerate()
        .map(|(index, ty)| {
            let slot = index * WORD;
            if ty.is_dynamic() {
                let offset = read_usize(data, slot)?;
                decode_value(ty, data, offset)
            } else {
                decode_value(ty, data, slot)
            }
        })
        .collect()
}

fn decode_value(ty: &AbiType, data: &[u8], at: usize) -> Result<AbiValue, AbiError> {
    match ty {
        AbiType::Uint(bits) => {
            let value = read_word(data, at)?;
            if value.bit_len() > *bits {
                return Err(AbiError::Overflow(ty.to_string()));
            }
            Ok(AbiValue::Uint(value))
        }
        AbiType::String => {
            let len = read_usize(data, at)?;
            let bytes = slice(data, next_word(at)?, len)?;
            String::from_utf8(bytes.to_vec()).map(AbiValue::String).map_err(|_| AbiError::InvalidUtf8)
        }
        AbiType::Array(inner) => {
            let len = read_usize(data, at)?;
            let start = next_word(at)?;
            let body = data.get(start..).ok_or(AbiError::Truncated { offset: start, needed: 0, available: 0 })?;
            // every element occupies at least one head word
            if len > body.len() / WORD {
                return Err(AbiError::OutOfRange(format!("array length {}", len)));
            }
            let types = vec![(**inner).clone(); len];
            decode(&types, body).map(AbiValue::Array)
        }
    }
}

fn word(value: usize) -> [u8; WORD] {
    U256::from(value).to_be_bytes::<WORD>()
}

fn pad_to_word(buf: &mut Vec<u8>) {
    let rem = buf.len() % WORD;
    if rem != 0 {
        buf.resize(buf.len() + WORD - rem, 0);
    }
}

fn next_word(at: usize) -> Result<usize, AbiError> {
    at.checked_add(WORD).ok_or_else(|| AbiError::OutOfRange(format!("offset {}", at)))
}

fn slice(data: &[u8], at: usize, len: usize) -> Result<&[u8], AbiError> {
    let end = at.checked_add(len).ok_or_else(|| AbiError::OutOfRange(format!("offset {} + {}", at, len)))?;
    data.get(at..end).ok_or(AbiError::Truncated {
        offset: at,
        needed: len,
        available: data.len().saturating_sub(at),
    })
}

fn read_word(data: &[u8], at: usize) -> Result<U256, AbiError> {
    Ok(U256::from_be_slice(slice(data, at, WORD)?))
}

fn read_usize(data: &[u8], at: usize) -> Result<usize, AbiError> {
    let value = read_word(data, at)?;
    let limbs = value.as_limbs();
    if limbs[1..].iter().any(|limb| *limb != 0) {
        return Err(AbiError::OutOfRange(value.to_string()));
    }
    usize::try_from(limbs[0]).map_err(|_| AbiError::OutOfRange(value.to_string()))
}
