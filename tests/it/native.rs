//! Drives `NativeSolc` through a shell script posing as solc.

#[cfg(unix)]
#[tokio::test]
async fn downloads_and_runs_native_solc() {
    use crate::server::{client, serve};
    use sha2::{Digest, Sha256};
    use solc_bindings::{load, load_with, CompilerModule, NativeSolc, Platform, ReleaseIndex};

    const SCRIPT: &str = r#"#!/bin/sh
case "$1" in
  --version)
    echo "solc, the solidity compiler commandline interface"
    echo "Version: 0.8.19+commit.7dd6d404.Linux.g++"
    ;;
  --license)
    echo "GPL-3.0"
    ;;
  --standard-json)
    cat > /dev/null
    echo '{"contracts":{"A.sol":{"A":{"abi":[],"evm":{"bytecode":{"object":"6080"}}}}},"sources":{"A.sol":{"id":0}}}'
    ;;
  *)
    echo "unknown option $1" >&2
    exit 1
    ;;
esac
"#;

    crate::init_tracing();
    let list = serde_json::json!({
        "builds": [{
            "path": "solc-linux-amd64-v0.8.19+commit.7dd6d404",
            "version": "0.8.19",
            "sha256": format!("0x{}", hex::encode(Sha256::digest(SCRIPT.as_bytes())))
        }],
        "releases": { "0.8.19": "solc-linux-amd64-v0.8.19+commit.7dd6d404" },
        "latestRelease": "0.8.19"
    });
    let url = serve(vec![
        ("list.json", serde_json::to_vec(&list).unwrap()),
        ("solc-linux-amd64-v0.8.19+commit.7dd6d404", SCRIPT.as_bytes().to_vec()),
    ])
    .await;
    let index = ReleaseIndex::for_platform(Platform::LinuxAmd64)
        .unwrap()
        .with_client(client())
        .with_base_url(url);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bin").join("solc");

    let solc = load_with(&index, &path, Some("v0.8.19")).await.unwrap();
    assert_eq!(solc.version(), "0.8.19+commit.7dd6d404.Linux.g++");
    assert_eq!(solc.semver().unwrap().to_string(), "0.8.19+commit.7dd6d404.Linux.gcc");
    assert_eq!(solc.license().unwrap().trim(), "GPL-3.0");

    let output = solc.compile_simple("A", "contract A {}").unwrap();
    assert_eq!(output.get("A.sol", "A").unwrap().evm.bytecode.object, "6080");

    // an existing file is loaded without touching the network
    let solc = load(&path, Some("0.4.0")).await.unwrap();
    assert_eq!(solc.module(), &NativeSolc::new(&path));

    let err = NativeSolc::new(&path).arg("--bogus").version().unwrap_err();
    assert!(err.contains("unknown option --bogus"), "{err}");
}
