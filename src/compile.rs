use crate::{
    artifacts::{CompilationInput, CompilationOutput, Source, Sources},
    compilers::{CompilerModule, NativeSolc, SolcAdapter},
    error::Result,
    releases::ReleaseIndex,
};
use std::path::Path;

/// Loads the compiler at `path`, downloading the requested version there first if the file does
/// not exist. `None` selects the latest release.
///
/// An existing file is loaded as is, whatever its version. The file is read again on every
/// call.
pub async fn load(path: impl AsRef<Path>, version: Option<&str>) -> Result<SolcAdapter<NativeSolc>> {
    let path = path.as_ref();
    if path.exists() {
        return load_path(path);
    }
    load_with(&ReleaseIndex::new()?, path, version).await
}

/// Like [`load`], but downloads from the given index.
pub async fn load_with(
    index: &ReleaseIndex,
    path: impl AsRef<Path>,
    version: Option<&str>,
) -> Result<SolcAdapter<NativeSolc>> {
    let path = path.as_ref();
    if !path.exists() {
        debug!(path = %path.display(), ?version, "installing solc");
        index.install(version, path).await?;
    }
    load_path(path)
}

fn load_path(path: &Path) -> Result<SolcAdapter<NativeSolc>> {
    trace!(path = %path.display(), "loading solc");
    SolcAdapter::new(NativeSolc::new(path))
}

impl<M: CompilerModule> SolcAdapter<M> {
    /// Compiles a single source as `<name>.sol` with the default settings.
    ///
    /// ```no_run
    /// # async fn demo() -> solc_bindings::Result<()> {
    /// let solc = solc_bindings::load("./solc", Some("0.8.19")).await?;
    /// let output = solc.compile_simple("Counter", "contract Counter { uint256 public n; }")?;
    /// assert!(output.find("Counter").is_some());
    /// # Ok(())
    /// # }
    /// ```
    pub fn compile_simple(&self, name: &str, source: &str) -> Result<CompilationOutput> {
        let sources = Sources::from([(format!("{name}.sol"), Source::new(source))]);
        self.compile_multiple(sources)
    }

    /// Compiles all sources in one request with the default settings.
    pub fn compile_multiple(&self, sources: Sources) -> Result<CompilationOutput> {
        self.compile(&CompilationInput::new(sources))
    }
}
