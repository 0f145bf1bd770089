//! The compiler entry points and the adapter validating them

use crate::{
    artifacts::{codec, CompilationInput, CompilationOutput},
    error::{Result, SolcError},
};
use semver::Version;
use std::fmt;

pub mod solc;
pub use solc::NativeSolc;

/// The capabilities a loaded compiler exposes.
///
/// Each call receives and returns text; failures carry the compiler's own message. A module
/// is neither assumed to be thread safe nor reentrant.
pub trait CompilerModule {
    /// The full version string, e.g. `0.8.19+commit.7dd6d404.Emscripten.clang`.
    fn version(&self) -> std::result::Result<String, String>;

    /// The license text the compiler ships with.
    fn license(&self) -> std::result::Result<String, String>;

    /// Compiles a standard json request and returns the standard json response.
    fn compile(&self, input: &str) -> std::result::Result<String, String>;
}

impl<T: CompilerModule + ?Sized> CompilerModule for Box<T> {
    fn version(&self) -> std::result::Result<String, String> {
        (**self).version()
    }

    fn license(&self) -> std::result::Result<String, String> {
        (**self).license()
    }

    fn compile(&self, input: &str) -> std::result::Result<String, String> {
        (**self).compile(input)
    }
}

/// A compiler module whose version probe succeeded.
///
/// Holds nothing besides the module and the probed version; every compile call goes to the
/// module.
pub struct SolcAdapter<M> {
    module: M,
    version: String,
}

impl<M: CompilerModule> SolcAdapter<M> {
    /// Wraps the module, probing its version once. A failed probe is a [`SolcError::Ffi`].
    pub fn new(module: M) -> Result<Self> {
        let version = module.version().map_err(SolcError::ffi)?;
        debug!(%version, "loaded compiler module");
        Ok(Self { module, version })
    }

    /// The version string probed at construction.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The probed version as [`Version`].
    ///
    /// Build metadata solc cannot express in semver, like the `g++` of
    /// `0.8.19+commit.7dd6d404.Linux.g++`, is normalised first.
    pub fn semver(&self) -> Result<Version> {
        parse_version(&self.version)
    }

    pub fn license(&self) -> Result<String> {
        self.module.license().map_err(SolcError::ffi)
    }

    /// Passes a raw standard json request to the module.
    pub fn compile_json(&self, input: &str) -> Result<String> {
        self.module.compile(input).map_err(SolcError::compilation)
    }

    /// Encodes the input, compiles it and decodes the module's response.
    ///
    /// Diagnostics reported by solc, including errors, are part of the returned output and
    /// do not fail the call.
    pub fn compile(&self, input: &CompilationInput) -> Result<CompilationOutput> {
        let json = codec::encode(input)?;
        trace!(sources = input.sources.len(), "compiling standard json input");
        let output = self.compile_json(&json)?;
        let output = codec::decode(&output).map_err(SolcError::compilation)?;
        if output.has_error() {
            debug!(version = %self.version, "compiler reported errors");
        }
        Ok(output)
    }

    pub fn module(&self) -> &M {
        &self.module
    }

    pub fn into_module(self) -> M {
        self.module
    }
}

impl<M> fmt::Debug for SolcAdapter<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolcAdapter").field("version", &self.version).finish_non_exhaustive()
    }
}

fn parse_version(version: &str) -> Result<Version> {
    let version = version.trim().trim_start_matches('v').replace(".g++", ".gcc");
    Version::parse(&version).map_err(|err| SolcError::ffi(format!("invalid version {version}: {err}")))
}
