//! Solc standard JSON input and output types

use serde::{ser::SerializeMap, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

pub mod abi;
pub use abi::{AbiEntry, AbiParam, StateMutability};
pub mod bytecode;
pub use bytecode::{Bytecode, LinkReference, LinkReferences};
pub mod codec;
pub mod error;
pub use error::{CompilationError, SecondarySourceLocation, Severity, SourceLocation};
pub mod output_selection;
pub use output_selection::OutputSelection;

/// Solidity files are made up of multiple `source units`, a solidity contract is such a `source
/// unit`, therefore a solidity file can contain multiple contracts: (1-N*) relationship.
///
/// This types represents this mapping as `file name -> (contract name -> T)`.
pub type FileToContractsMap<T> = BTreeMap<String, BTreeMap<String, T>>;

/// file -> (contract name -> Contract)
pub type Contracts = FileToContractsMap<Contract>;

/// An ordered list of files and their source
pub type Sources = BTreeMap<String, Source>;

/// The only language this crate builds requests for
pub const SOLIDITY: &str = "Solidity";

/// Content of a solidity file
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct Source {
    pub content: String,
}

impl Source {
    /// Creates a new instance of [Source] with the given content.
    pub fn new(content: impl Into<String>) -> Self {
        Self { content: content.into() }
    }
}

impl AsRef<str> for Source {
    fn as_ref(&self) -> &str {
        &self.content
    }
}

/// Input type `solc` expects
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompilationInput {
    pub language: String,
    pub sources: Sources,
    pub settings: Settings,
}

impl CompilationInput {
    /// Creates a Solidity request for the given sources with [`Settings::default`].
    pub fn new(sources: Sources) -> Self {
        Self::with_settings(sources, Settings::default())
    }

    pub fn with_settings(sources: Sources, settings: Settings) -> Self {
        Self { language: SOLIDITY.to_string(), sources, settings }
    }

    /// Creates a request from `file name -> source text` pairs.
    pub fn from_files<I, K, V>(files: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(files.into_iter().map(|(name, content)| (name.into(), Source::new(content))).collect())
    }
}

/// Compiler settings.
///
/// Every optional field is left out of the request when unset, solc then applies its own
/// default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Selects the outputs solc generates. Without it solc only type checks.
    #[serde(default)]
    pub output_selection: OutputSelection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimizer: Option<Optimizer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evm_version: Option<String>,
    /// Addresses of the libraries. If not all libraries are given here, it can result in
    /// unlinked objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub libraries: Option<Libraries>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remappings: Option<Vec<String>>,
    /// Change compilation pipeline to go through the Yul intermediate representation.
    #[serde(rename = "viaIR", default, skip_serializing_if = "Option::is_none")]
    pub via_ir: Option<bool>,
}

impl Settings {
    /// Settings that request `output_selection` and nothing else.
    pub fn new(output_selection: impl Into<OutputSelection>) -> Self {
        Self {
            output_selection: output_selection.into(),
            optimizer: None,
            evm_version: None,
            libraries: None,
            remappings: None,
            via_ir: None,
        }
    }

    #[must_use]
    pub fn with_optimizer(mut self, optimizer: Optimizer) -> Self {
        self.optimizer = Some(optimizer);
        self
    }

    #[must_use]
    pub fn with_evm_version(mut self, evm_version: impl Into<String>) -> Self {
        self.evm_version = Some(evm_version.into());
        self
    }

    #[must_use]
    pub fn with_libraries(mut self, libraries: Libraries) -> Self {
        self.libraries = Some(libraries);
        self
    }

    #[must_use]
    pub fn with_remappings<I, S>(mut self, remappings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.remappings = Some(remappings.into_iter().map(Into::into).collect());
        self
    }
}

/// Optimizer enabled with 200 runs and [`OutputSelection::default_selection`].
impl Default for Settings {
    fn default() -> Self {
        Self::new(OutputSelection::default_selection()).with_optimizer(Optimizer::default())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Optimizer {
    pub enabled: bool,
    /// Number of expected contract executions to optimize for; solc enforces its own limit
    pub runs: usize,
}

impl Optimizer {
    pub fn disabled() -> Self {
        Self { enabled: false, runs: 200 }
    }
}

impl Default for Optimizer {
    fn default() -> Self {
        Self { enabled: true, runs: 200 }
    }
}

/// Library name -> deployed address.
///
/// solc expects addresses keyed by the file declaring the library. A plain name is placed under
/// the global (empty) file key, a name of the form `path/Lib.sol:Lib` under its file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Libraries(pub BTreeMap<String, String>);

impl Libraries {
    pub fn insert(&mut self, name: impl Into<String>, address: impl Into<String>) {
        self.0.insert(name.into(), address.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The `file -> (library -> address)` layout solc expects.
    pub fn by_file(&self) -> BTreeMap<&str, BTreeMap<&str, &str>> {
        let mut files: BTreeMap<&str, BTreeMap<&str, &str>> = BTreeMap::new();
        for (name, address) in &self.0 {
            let (file, lib) = name.rsplit_once(':').unwrap_or(("", name.as_str()));
            files.entry(file).or_default().insert(lib, address);
        }
        files
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Libraries {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl Serialize for Libraries {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let files = self.by_file();
        let mut map = serializer.serialize_map(Some(files.len()))?;
        for (file, libs) in &files {
            map.serialize_entry(file, libs)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Libraries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let files = BTreeMap::<String, BTreeMap<String, String>>::deserialize(deserializer)?;
        Ok(files
            .into_iter()
            .flat_map(|(file, libs)| {
                libs.into_iter().map(move |(lib, address)| {
                    let name = if file.is_empty() { lib } else { format!("{file}:{lib}") };
                    (name, address)
                })
            })
            .collect())
    }
}

/// Output type `solc` produces.
///
/// Each top level field is `None` when solc omitted the key, which is distinct from an empty
/// collection: a failed compilation may only carry `errors`, a clean one may omit them.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CompilationOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<BTreeMap<String, SourceInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contracts: Option<Contracts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<CompilationError>>,
}

impl CompilationOutput {
    /// All diagnostics, empty if solc emitted none.
    pub fn errors_iter(&self) -> impl Iterator<Item = &CompilationError> {
        self.errors.iter().flatten()
    }

    /// Whether the output contains a compiler error
    pub fn has_error(&self) -> bool {
        self.errors_iter().any(CompilationError::is_error)
    }

    /// Whether the output contains a compiler warning whose code is not ignored
    pub fn has_warning(&self, ignored_error_codes: &[u64]) -> bool {
        self.errors_iter().any(|err| {
            err.is_warning() && err.code().map_or(true, |code| !ignored_error_codes.contains(&code))
        })
    }

    /// Iterate over all contracts and their names
    pub fn contracts_iter(&self) -> impl Iterator<Item = (&String, &Contract)> {
        self.contracts.iter().flat_map(|files| files.values().flatten())
    }

    /// Iterate over all contracts together with the file that declares them
    pub fn contracts_with_files(&self) -> impl Iterator<Item = (&String, &String, &Contract)> {
        self.contracts.iter().flatten().flat_map(|(file, contracts)| {
            contracts.iter().map(move |(name, contract)| (file, name, contract))
        })
    }

    /// Given the contract file's path and the contract's name, returns the contract
    pub fn get(&self, file: &str, contract: &str) -> Option<&Contract> {
        self.contracts.as_ref()?.get(file)?.get(contract)
    }

    /// Finds the _first_ contract with the given name
    pub fn find(&self, contract: &str) -> Option<&Contract> {
        self.contracts_iter().find_map(|(name, c)| (name == contract).then_some(c))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SourceInfo {
    pub id: u32,
    /// The AST, passed through without interpretation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ast: Option<serde_json::Value>,
}

/// Represents a compiled solidity contract
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    #[serde(default, deserialize_with = "default_for_null")]
    pub abi: Vec<AbiEntry>,
    #[serde(default)]
    pub evm: Evm,
    /// The contract metadata, a JSON document encoded as a string
    #[serde(default)]
    pub metadata: String,
}

impl Contract {
    /// Parses the metadata string, `None` if it is empty.
    pub fn metadata_json(&self) -> Option<serde_json::Result<serde_json::Value>> {
        (!self.metadata.is_empty()).then(|| serde_json::from_str(&self.metadata))
    }

    /// Iterate over the contract's functions
    pub fn functions(&self) -> impl Iterator<Item = &AbiEntry> {
        self.abi.iter().filter(|entry| entry.is_function())
    }

    /// The constructor, if the contract declares one
    pub fn constructor(&self) -> Option<&AbiEntry> {
        self.abi.iter().find(|entry| matches!(entry, AbiEntry::Constructor { .. }))
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Evm {
    #[serde(default)]
    pub bytecode: Bytecode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployed_bytecode: Option<Bytecode>,
    /// Function gas estimates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_estimates: Option<GasEstimates>,
    /// The list of function hashes: `signature -> selector hex`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub method_identifiers: BTreeMap<String, String>,
}

/// Gas costs as decimal strings, kept exactly as solc prints them. Values may exceed 64 bits or
/// be `"infinite"`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct GasEstimates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation: Option<CreationGas>,
    #[serde(default)]
    pub external: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub internal: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreationGas {
    pub code_deposit_cost: String,
    pub execution_cost: String,
    pub total_cost: String,
}

fn default_for_null<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
