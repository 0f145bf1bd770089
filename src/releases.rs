//! Solc release index and artifact downloads from binaries.soliditylang.org

use crate::{
    artifacts::codec::decode_json,
    error::{Result, SolcError},
};
use semver::Version;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};
use tokio::{fs, io::AsyncWriteExt};
use url::Url;

/// Host serving the release index and artifacts of every platform
pub const BINARIES_URL: &str = "https://binaries.soliditylang.org/";

/// Name of the release index within a platform directory
pub const RELEASE_LIST: &str = "list.json";

/// Platform directories of the release host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Platform {
    LinuxAmd64,
    MacosAmd64,
    WindowsAmd64,
    /// Platform independent `soljson` builds
    Wasm,
}

impl Platform {
    /// The native platform of the running process.
    pub fn detect() -> Result<Self> {
        match (std::env::consts::OS, std::env::consts::ARCH) {
            ("linux", "x86_64") => Ok(Self::LinuxAmd64),
            // the macosx-amd64 builds are universal binaries since 0.8.24
            ("macos", "x86_64" | "aarch64") => Ok(Self::MacosAmd64),
            ("windows", "x86_64") => Ok(Self::WindowsAmd64),
            (os, arch) => Err(SolcError::download(format!("unsupported platform {os}-{arch}"))),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LinuxAmd64 => "linux-amd64",
            Self::MacosAmd64 => "macosx-amd64",
            Self::WindowsAmd64 => "windows-amd64",
            Self::Wasm => "wasm",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "linux-amd64" => Ok(Self::LinuxAmd64),
            "macosx-amd64" => Ok(Self::MacosAmd64),
            "windows-amd64" => Ok(Self::WindowsAmd64),
            "wasm" => Ok(Self::Wasm),
            s => Err(format!("unknown platform {s}")),
        }
    }
}

/// A build listed in the release index.
///
/// Older indexes list bare artifact names, the current one lists objects with checksums. Both
/// decode into this type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawBuild")]
pub struct Build {
    /// Artifact name relative to the platform directory
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_version: Option<String>,
    /// Hex encoded, `0x` prefixed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keccak256: Option<String>,
}

impl Build {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), version: None, long_version: None, sha256: None, keccak256: None }
    }

    /// Checks `bytes` against the listed sha256, if any.
    pub fn verify(&self, bytes: &[u8]) -> Result<()> {
        let Some(expected) = &self.sha256 else { return Ok(()) };
        let expected = expected.strip_prefix("0x").unwrap_or(expected);
        let actual = hex::encode(Sha256::digest(bytes));
        if !actual.eq_ignore_ascii_case(expected) {
            return Err(SolcError::download(format!(
                "checksum mismatch for {}: expected {expected}, got {actual}",
                self.path
            )));
        }
        trace!(path = %self.path, "verified checksum");
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBuild {
    Path(String),
    Detailed(DetailedBuild),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetailedBuild {
    path: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    long_version: Option<String>,
    #[serde(default)]
    sha256: Option<String>,
    #[serde(default)]
    keccak256: Option<String>,
}

impl From<RawBuild> for Build {
    fn from(raw: RawBuild) -> Self {
        match raw {
            RawBuild::Path(path) => Self::new(path),
            RawBuild::Detailed(DetailedBuild { path, version, long_version, sha256, keccak256 }) => {
                Self { path, version, long_version, sha256, keccak256 }
            }
        }
    }
}

/// The release index: `version -> artifact name` plus the latest release.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseInfo {
    pub releases: BTreeMap<String, String>,
    pub latest_release: String,
    #[serde(default)]
    pub builds: Vec<Build>,
}

impl ReleaseInfo {
    /// The artifact name of the requested version, or of the latest release if `None`.
    ///
    /// A leading `v` is ignored: `v0.8.19` and `0.8.19` name the same release.
    pub fn resolve(&self, version: Option<&str>) -> Result<&str> {
        let version = match version {
            Some(version) => version.trim().trim_start_matches('v'),
            None => self.latest_release.as_str(),
        };
        self.releases
            .get(version)
            .map(String::as_str)
            .ok_or_else(|| SolcError::VersionNotFound(version.to_string()))
    }

    /// All released versions in ascending order. Keys that are not semver are skipped.
    pub fn versions(&self) -> Vec<Version> {
        let mut versions: Vec<_> =
            self.releases.keys().filter_map(|v| Version::parse(v).ok()).collect();
        versions.sort_unstable();
        versions
    }

    /// The build entry of the given artifact name.
    pub fn build(&self, filename: &str) -> Option<&Build> {
        self.builds.iter().find(|build| build.path == filename)
    }
}

/// Client of the release host for a single platform.
#[derive(Clone, Debug)]
pub struct ReleaseIndex {
    client: reqwest::Client,
    base_url: Url,
}

impl ReleaseIndex {
    /// Index of the native platform.
    pub fn new() -> Result<Self> {
        Self::for_platform(Platform::detect()?)
    }

    pub fn for_platform(platform: Platform) -> Result<Self> {
        let base_url = Url::parse(BINARIES_URL)
            .and_then(|url| url.join(&format!("{platform}/")))
            .map_err(|err| SolcError::download(format!("invalid release host url: {err}")))?;
        Ok(Self { client: reqwest::Client::new(), base_url })
    }

    /// Uses `url` as the platform directory, e.g. a mirror.
    #[must_use]
    pub fn with_base_url(mut self, mut url: Url) -> Self {
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.base_url = url;
        self
    }

    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, filename: &str) -> Result<Url> {
        self.base_url
            .join(filename)
            .map_err(|err| SolcError::download(format!("invalid artifact name {filename}: {err}")))
    }

    async fn get(&self, filename: &str) -> Result<Vec<u8>> {
        let url = self.url(filename)?;
        debug!(%url, "downloading");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SolcError::download(format!("failed to download file: {e}")))?;
        if !response.status().is_success() {
            return Err(SolcError::download(format!(
                "failed to download {filename}: status code {}",
                response.status()
            )));
        }
        let content = response
            .bytes()
            .await
            .map_err(|e| SolcError::download(format!("failed to download file: {e}")))?;
        Ok(content.to_vec())
    }

    /// Fetches and decodes `list.json`.
    #[instrument(level = "debug", skip_all, fields(url = %self.base_url))]
    pub async fn fetch_releases(&self) -> Result<ReleaseInfo> {
        let body = self.get(RELEASE_LIST).await?;
        let info: ReleaseInfo = decode_json(&body)
            .map_err(|e| SolcError::download(format!("invalid release index: {e}")))?;
        debug!(latest = %info.latest_release, releases = info.releases.len(), "fetched release index");
        Ok(info)
    }

    /// Downloads an artifact and writes it to `dest` unchanged.
    pub async fn download(&self, filename: &str, dest: &Path) -> Result<()> {
        self.download_build(&Build::new(filename), dest).await
    }

    /// Downloads the artifact of `build`, verifying its checksum before writing `dest`.
    ///
    /// Missing parent directories are created. On unix the file is made executable.
    #[instrument(level = "debug", skip_all, fields(file = %build.path, dest = %dest.display()))]
    pub async fn download_build(&self, build: &Build, dest: &Path) -> Result<()> {
        let content = self.get(&build.path).await?;
        build.verify(&content)?;

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| SolcError::download_io(e, parent))?;
        }

        let partial = partial_path(dest);
        if let Err(err) = write_artifact(&content, &partial, dest).await {
            let _ = fs::remove_file(&partial).await;
            return Err(err);
        }
        debug!(bytes = content.len(), "wrote artifact");
        Ok(())
    }

    /// Resolves `version` against the index and downloads its artifact to `dest`.
    pub async fn install(&self, version: Option<&str>, dest: &Path) -> Result<()> {
        let info = self.fetch_releases().await?;
        let filename = info.resolve(version)?;
        let build = info.build(filename).cloned().unwrap_or_else(|| Build::new(filename));
        self.download_build(&build, dest).await
    }
}

/// Sibling of `dest` the artifact is written to before it is moved into place
fn partial_path(dest: &Path) -> PathBuf {
    let mut partial = dest.as_os_str().to_owned();
    partial.push(".part");
    PathBuf::from(partial)
}

/// Writes `content` to `partial` and renames it onto `dest`, so `dest` only ever holds a
/// complete artifact.
async fn write_artifact(content: &[u8], partial: &Path, dest: &Path) -> Result<()> {
    let mut output_file =
        fs::File::create(partial).await.map_err(|e| SolcError::download_io(e, partial))?;
    output_file.write_all(content).await.map_err(|e| SolcError::download_io(e, partial))?;
    output_file.flush().await.map_err(|e| SolcError::download_io(e, partial))?;
    drop(output_file);

    #[cfg(unix)]
    {
        use std::{fs::Permissions, os::unix::fs::PermissionsExt};
        fs::set_permissions(partial, Permissions::from_mode(0o755))
            .await
            .map_err(|e| SolcError::download_io(e, partial))?;
    }
    fs::rename(partial, dest).await.map_err(|e| SolcError::download_io(e, dest))
}
