//! Contract ABI entries as emitted in solc's `abi` output

use serde::{Deserialize, Serialize};
use std::fmt;
use tiny_keccak::{Hasher, Keccak};

/// A parameter of a function, event, error or constructor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawAbiParam")]
pub struct AbiParam {
    /// Empty for unnamed parameters, e.g. most return values
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    /// The Solidity level type; equal to `ty` when solc does not emit it
    pub internal_type: String,
    /// Only meaningful for event parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed: Option<bool>,
    /// Members of a `tuple` typed parameter
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<AbiParam>,
}

impl AbiParam {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        let ty = ty.into();
        Self { name: name.into(), internal_type: ty.clone(), ty, indexed: None, components: vec![] }
    }

    /// The canonical type used in signatures, with tuples expanded into their components:
    /// `tuple[]` with members `uint256, address` becomes `(uint256,address)[]`.
    pub fn canonical_type(&self) -> String {
        match self.ty.strip_prefix("tuple") {
            Some(suffix) => {
                let members = self.components.iter().map(Self::canonical_type).collect::<Vec<_>>();
                format!("({}){suffix}", members.join(","))
            }
            None => self.ty.clone(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAbiParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    internal_type: Option<String>,
    #[serde(default)]
    indexed: Option<bool>,
    #[serde(default)]
    components: Vec<AbiParam>,
}

impl From<RawAbiParam> for AbiParam {
    fn from(raw: RawAbiParam) -> Self {
        let RawAbiParam { name, ty, internal_type, indexed, components } = raw;
        let internal_type = internal_type.unwrap_or_else(|| ty.clone());
        Self { name, ty, internal_type, indexed, components }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    #[default]
    NonPayable,
    Payable,
}

impl StateMutability {
    /// Derives the mutability from the flags used before solc 0.5.0.
    fn from_legacy(constant: Option<bool>, payable: Option<bool>) -> Self {
        if constant.unwrap_or_default() {
            Self::View
        } else if payable.unwrap_or_default() {
            Self::Payable
        } else {
            Self::NonPayable
        }
    }

    fn from_wire(s: &str) -> Option<Self> {
        match s {
            "pure" => Some(Self::Pure),
            "view" => Some(Self::View),
            "nonpayable" => Some(Self::NonPayable),
            "payable" => Some(Self::Payable),
            _ => None,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pure => "pure",
            Self::View => "view",
            Self::NonPayable => "nonpayable",
            Self::Payable => "payable",
        }
    }
}

impl fmt::Display for StateMutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single item of a contract's ABI, discriminated by the `type` field on the wire.
///
/// An item whose `type` is missing or unknown decodes as [`AbiEntry::Fallback`], see
/// [`AbiEntry::is_fallback`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAbiEntry", into = "RawAbiEntry")]
pub enum AbiEntry {
    Function {
        name: String,
        inputs: Vec<AbiParam>,
        outputs: Vec<AbiParam>,
        state_mutability: StateMutability,
    },
    Event {
        name: String,
        inputs: Vec<AbiParam>,
        anonymous: bool,
    },
    Constructor {
        inputs: Vec<AbiParam>,
        state_mutability: StateMutability,
    },
    Fallback {
        state_mutability: StateMutability,
    },
    Receive {
        state_mutability: StateMutability,
    },
    /// Custom error, emitted since solc 0.8.4
    Error {
        name: String,
        inputs: Vec<AbiParam>,
    },
}

impl AbiEntry {
    /// The wire name of this entry's kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Function { .. } => "function",
            Self::Event { .. } => "event",
            Self::Constructor { .. } => "constructor",
            Self::Fallback { .. } => "fallback",
            Self::Receive { .. } => "receive",
            Self::Error { .. } => "error",
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Function { name, .. } | Self::Event { name, .. } | Self::Error { name, .. } => {
                Some(name)
            }
            _ => None,
        }
    }

    pub fn inputs(&self) -> &[AbiParam] {
        match self {
            Self::Function { inputs, .. }
            | Self::Event { inputs, .. }
            | Self::Constructor { inputs, .. }
            | Self::Error { inputs, .. } => inputs,
            Self::Fallback { .. } | Self::Receive { .. } => &[],
        }
    }

    pub fn state_mutability(&self) -> Option<StateMutability> {
        match self {
            Self::Function { state_mutability, .. }
            | Self::Constructor { state_mutability, .. }
            | Self::Fallback { state_mutability }
            | Self::Receive { state_mutability } => Some(*state_mutability),
            Self::Event { .. } | Self::Error { .. } => None,
        }
    }

    pub const fn is_function(&self) -> bool {
        matches!(self, Self::Function { .. })
    }

    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    /// Returns the canonical signature, e.g. `transfer(address,uint256)`, for functions, events
    /// and errors.
    pub fn signature(&self) -> Option<String> {
        let name = self.name()?;
        let types = self.inputs().iter().map(AbiParam::canonical_type).collect::<Vec<_>>();
        Some(format!("{name}({})", types.join(",")))
    }

    /// Returns the 4-byte selector of a function or error: the first four bytes of the
    /// keccak-256 hash of its signature.
    pub fn selector(&self) -> Option<[u8; 4]> {
        if !matches!(self, Self::Function { .. } | Self::Error { .. }) {
            return None;
        }
        let hash = keccak256(self.signature()?.as_bytes());
        Some([hash[0], hash[1], hash[2], hash[3]])
    }
}

fn keccak256(bytes: &[u8]) -> [u8; 32] {
    let mut output = [0u8; 32];
    let mut hasher = Keccak::v256();
    hasher.update(bytes);
    hasher.finalize(&mut output);
    output
}

/// The loosely typed wire representation every entry is read into before dispatching on
/// `type`.
#[derive(Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAbiEntry {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inputs: Option<Vec<AbiParam>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    outputs: Option<Vec<AbiParam>>,
    /// Unknown values fall back to the legacy flags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state_mutability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    anonymous: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    constant: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payable: Option<bool>,
}

impl RawAbiEntry {
    fn state_mutability(&self) -> StateMutability {
        let legacy = || StateMutability::from_legacy(self.constant, self.payable);
        match self.state_mutability.as_deref() {
            Some(value) => StateMutability::from_wire(value).unwrap_or_else(|| {
                warn!(value, "unrecognized state mutability, using legacy flags");
                legacy()
            }),
            None => legacy(),
        }
    }

    fn take_name(&mut self, kind: &str) -> Result<String, String> {
        self.name.take().ok_or_else(|| format!("missing field `name` in {kind} ABI entry"))
    }
}

impl TryFrom<RawAbiEntry> for AbiEntry {
    type Error = String;

    fn try_from(mut raw: RawAbiEntry) -> Result<Self, String> {
        let state_mutability = raw.state_mutability();
        let entry = match raw.kind.as_deref() {
            Some("function") => AbiEntry::Function {
                name: raw.take_name("function")?,
                inputs: raw.inputs.unwrap_or_default(),
                outputs: raw.outputs.unwrap_or_default(),
                state_mutability,
            },
            Some("event") => AbiEntry::Event {
                name: raw.take_name("event")?,
                inputs: raw.inputs.unwrap_or_default(),
                anonymous: raw.anonymous.unwrap_or_default(),
            },
            Some("error") => AbiEntry::Error {
                name: raw.take_name("error")?,
                inputs: raw.inputs.unwrap_or_default(),
            },
            Some("constructor") => {
                AbiEntry::Constructor { inputs: raw.inputs.unwrap_or_default(), state_mutability }
            }
            Some("receive") => AbiEntry::Receive { state_mutability },
            Some("fallback") => AbiEntry::Fallback { state_mutability },
            other => {
                warn!(kind = ?other, "unrecognized ABI entry type, treating it as fallback");
                AbiEntry::Fallback { state_mutability }
            }
        };
        Ok(entry)
    }
}

impl From<AbiEntry> for RawAbiEntry {
    fn from(entry: AbiEntry) -> Self {
        let kind = Some(entry.kind().to_string());
        match entry {
            AbiEntry::Function { name, inputs, outputs, state_mutability } => Self {
                kind,
                name: Some(name),
                inputs: Some(inputs),
                outputs: Some(outputs),
                state_mutability: Some(state_mutability.as_str().to_string()),
                ..Default::default()
            },
            AbiEntry::Event { name, inputs, anonymous } => Self {
                kind,
                name: Some(name),
                inputs: Some(inputs),
                anonymous: Some(anonymous),
                ..Default::default()
            },
            AbiEntry::Error { name, inputs } => {
                Self { kind, name: Some(name), inputs: Some(inputs), ..Default::default() }
            }
            AbiEntry::Constructor { inputs, state_mutability } => Self {
                kind,
                inputs: Some(inputs),
                state_mutability: Some(state_mutability.as_str().to_string()),
                ..Default::default()
            },
            AbiEntry::Fallback { state_mutability } | AbiEntry::Receive { state_mutability } => {
                let state_mutability = Some(state_mutability.as_str().to_string());
                Self { kind, state_mutability, ..Default::default() }
            }
        }
    }
}
