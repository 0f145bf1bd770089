//! bindings for standard json output selection

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Contract name glob -> requested output names
pub type ContractOutputSelection = BTreeMap<String, Vec<String>>;

/// Selects the outputs solc emits per file and contract.
///
/// Both levels are keyed by glob patterns that solc interprets, `"*"` meaning everything. They
/// are passed through verbatim.
///
/// ```
/// use solc_bindings::OutputSelection;
/// let selection = OutputSelection::default_selection();
/// assert_eq!(
///     selection.as_ref()["*"]["*"],
///     vec!["abi", "evm.bytecode", "evm.deployedBytecode", "metadata"]
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputSelection(pub BTreeMap<String, ContractOutputSelection>);

impl OutputSelection {
    /// The outputs requested for every contract of every file unless configured otherwise:
    ///    - "abi"
    ///    - "evm.bytecode"
    ///    - "evm.deployedBytecode"
    ///    - "metadata"
    pub const DEFAULT_OUTPUTS: &'static [&'static str] =
        &["abi", "evm.bytecode", "evm.deployedBytecode", "metadata"];

    /// Selection requesting [`Self::DEFAULT_OUTPUTS`] for all files and contracts.
    pub fn default_selection() -> Self {
        Self::all(Self::DEFAULT_OUTPUTS.iter().copied())
    }

    /// Selection requesting the given outputs for all files and contracts.
    pub fn all<I, S>(outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selection = Self::default();
        selection.insert("*", "*", outputs);
        selection
    }

    /// Appends outputs for the given file and contract globs, skipping duplicates.
    pub fn insert<I, S>(&mut self, file: impl Into<String>, contract: impl Into<String>, outputs: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let requested =
            self.0.entry(file.into()).or_default().entry(contract.into()).or_default();
        for output in outputs {
            let output = output.into();
            if !requested.contains(&output) {
                requested.push(output);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<BTreeMap<String, ContractOutputSelection>> for OutputSelection {
    fn as_ref(&self) -> &BTreeMap<String, ContractOutputSelection> {
        &self.0
    }
}

impl From<BTreeMap<String, ContractOutputSelection>> for OutputSelection {
    fn from(s: BTreeMap<String, ContractOutputSelection>) -> Self {
        Self(s)
    }
}
