use super::CompilerModule;
use std::{
    fmt,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
};

/// The name of the `solc` binary on the system
pub const SOLC: &str = "solc";

/// A native `solc` executable used as a [`CompilerModule`].
///
/// Every call spawns the executable once: `--version`, `--license` or `--standard-json` with
/// the request piped to stdin.
///
/// By default the executable is taken from the `SOLC_PATH` environment variable, else `solc`
/// is looked up on `PATH`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NativeSolc {
    /// Path to the `solc` executable
    pub path: PathBuf,
    /// Additional arguments passed to the `solc` executable
    pub args: Vec<String>,
}

impl NativeSolc {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), args: Vec::new() }
    }

    /// Adds an argument passed on every invocation.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.path);
        cmd.args(&self.args).stdin(Stdio::piped()).stderr(Stdio::piped()).stdout(Stdio::piped());
        cmd
    }

    fn io_err(&self, err: std::io::Error) -> String {
        format!("\"{}\": {err}", self.path.display())
    }

    fn run(&self, flag: &str) -> Result<Output, String> {
        let output = self.command().arg(flag).output().map_err(|err| self.io_err(err))?;
        trace!(status = ?output.status, flag, "solc exited");
        Ok(output)
    }
}

impl Default for NativeSolc {
    fn default() -> Self {
        if let Ok(solc) = std::env::var("SOLC_PATH") {
            return Self::new(solc);
        }
        Self::new(SOLC)
    }
}

impl fmt::Display for NativeSolc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())?;
        if !self.args.is_empty() {
            write!(f, " {}", self.args.join(" "))?;
        }
        Ok(())
    }
}

impl AsRef<Path> for NativeSolc {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl CompilerModule for NativeSolc {
    #[instrument(level = "debug", skip_all, fields(solc = %self))]
    fn version(&self) -> Result<String, String> {
        version_from_output(self.run("--version")?)
    }

    fn license(&self) -> Result<String, String> {
        stdout(self.run("--license")?)
    }

    #[instrument(name = "compile", level = "debug", skip_all, fields(solc = %self))]
    fn compile(&self, input: &str) -> Result<String, String> {
        let mut child =
            self.command().arg("--standard-json").spawn().map_err(|err| self.io_err(err))?;
        debug!("spawned");

        let mut stdin = child.stdin.take().ok_or("solc stdin is not piped")?;
        // solc may exit before reading its input, its stderr explains why
        if let Err(err) = stdin.write_all(input.as_bytes()) {
            if err.kind() != ErrorKind::BrokenPipe {
                return Err(self.io_err(err));
            }
        }
        drop(stdin);

        let output = child.wait_with_output().map_err(|err| self.io_err(err))?;
        debug!(status = ?output.status, "finished compiling with standard json");
        stdout(output)
    }
}

fn stdout(output: Output) -> Result<String, String> {
    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let msg = if stderr.trim().is_empty() { stdout } else { stderr };
        Err(format!("solc exited with {}: {}", output.status, msg.trim()))
    }
}

/// Extracts the version from the last line of `solc --version`, e.g.
/// `Version: 0.8.19+commit.7dd6d404.Linux.g++`.
fn version_from_output(output: Output) -> Result<String, String> {
    let stdout = stdout(output)?;
    let version = stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .ok_or("version not found in solc output")?;
    Ok(version.trim_start_matches("Version: ").to_string())
}
