use crate::server::{client, serve};
use pretty_assertions::assert_eq;
use sha2::{Digest, Sha256};
use solc_bindings::{releases::Build, Platform, ReleaseIndex, SolcError};

const ARTIFACT: &[u8] = b"\0asm solc artifact";

fn list(sha256: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "builds": [
            { "path": "solc-v0.8.19.js", "version": "0.8.19", "sha256": sha256 },
            "solc-v0.8.18.js"
        ],
        "releases": {
            "0.8.19": "solc-v0.8.19.js",
            "0.8.18": "solc-v0.8.18.js"
        },
        "latestRelease": "0.8.19"
    }))
    .unwrap()
}

fn checksum(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(Sha256::digest(bytes)))
}

async fn index(routes: Vec<(&str, Vec<u8>)>) -> ReleaseIndex {
    let url = serve(routes).await;
    ReleaseIndex::for_platform(Platform::Wasm).unwrap().with_client(client()).with_base_url(url)
}

#[tokio::test]
async fn fetches_and_resolves_releases() {
    crate::init_tracing();
    let index = index(vec![("list.json", list(&checksum(ARTIFACT)))]).await;

    let info = index.fetch_releases().await.unwrap();
    assert_eq!(info.latest_release, "0.8.19");
    assert_eq!(info.resolve(None).unwrap(), "solc-v0.8.19.js");
    assert_eq!(
        info.resolve(Some("9.9.9")).unwrap_err(),
        SolcError::VersionNotFound("9.9.9".to_string())
    );
    assert_eq!(info.builds.len(), 2);
}

#[tokio::test]
async fn invalid_index_is_download_error() {
    let index = index(vec![("list.json", b"<html>".to_vec())]).await;
    let err = index.fetch_releases().await.unwrap_err();
    assert!(err.is_download(), "{err}");

    let index = self::index(vec![("list.json", br#"{"releases": []}"#.to_vec())]).await;
    let err = index.fetch_releases().await.unwrap_err();
    assert!(err.is_download(), "{err}");

    let body = b"{\"releases\": {\"0.8.19\": \"solc\xff.js\"}, \"latestRelease\": \"0.8.19\"}";
    let index = self::index(vec![("list.json", body.to_vec())]).await;
    let err = index.fetch_releases().await.unwrap_err();
    assert!(err.is_download(), "{err}");
}

#[tokio::test]
async fn missing_artifact_is_download_error() {
    let index = index(vec![]).await;
    let dir = tempfile::tempdir().unwrap();
    let err = index.download("solc-v0.8.19.js", &dir.path().join("solc")).await.unwrap_err();
    assert!(err.message().contains("404"), "{err}");
    assert!(!dir.path().join("solc").exists());
}

#[tokio::test]
async fn downloads_artifact_verbatim() {
    let index = index(vec![("solc-v0.8.18.js", ARTIFACT.to_vec())]).await;
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("nested").join("soljson.js");

    index.download("solc-v0.8.18.js", &dest).await.unwrap();
    assert_eq!(std::fs::read(&dest).unwrap(), ARTIFACT);
}

#[tokio::test]
async fn installs_verified_release() {
    let index = index(vec![
        ("list.json", list(&checksum(ARTIFACT))),
        ("solc-v0.8.19.js", ARTIFACT.to_vec()),
    ])
    .await;
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("soljson.js");

    index.install(None, &dest).await.unwrap();
    assert_eq!(std::fs::read(&dest).unwrap(), ARTIFACT);
}

#[tokio::test]
async fn rejects_checksum_mismatch() {
    let index = index(vec![
        ("list.json", list(&checksum(b"something else"))),
        ("solc-v0.8.19.js", ARTIFACT.to_vec()),
    ])
    .await;
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("soljson.js");

    let err = index.install(Some("0.8.19"), &dest).await.unwrap_err();
    assert!(err.is_download(), "{err}");
    assert!(err.message().contains("checksum mismatch"), "{err}");
    assert!(!dest.exists());

    let unchecked = Build::new("solc-v0.8.19.js");
    index.download_build(&unchecked, &dest).await.unwrap();
    assert!(dest.exists());
}

#[tokio::test]
async fn failed_write_leaves_no_artifact() {
    let index = index(vec![("solc-v0.8.18.js", ARTIFACT.to_vec())]).await;
    let dir = tempfile::tempdir().unwrap();
    // a directory in the way makes the final move onto `dest` fail
    let dest = dir.path().join("solc");
    std::fs::create_dir_all(dest.join("occupied")).unwrap();

    let err = index.download("solc-v0.8.18.js", &dest).await.unwrap_err();
    assert!(err.is_download(), "{err}");
    assert!(!dir.path().join("solc.part").exists());
    assert!(dest.is_dir());

    let fresh = dir.path().join("fresh");
    index.download("solc-v0.8.18.js", &fresh).await.unwrap();
    assert_eq!(std::fs::read(&fresh).unwrap(), ARTIFACT);
    assert!(!dir.path().join("fresh.part").exists());
}
