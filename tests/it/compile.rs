use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use solc_bindings::{
    AbiEntry, CompilationInput, CompilerModule, Settings, SolcAdapter, SolcError, Source, Sources,
};
use std::{cell::RefCell, path::Path};

/// Answers every request with one contract per source, named after the file stem.
#[derive(Default)]
struct FakeSolc {
    requests: RefCell<Vec<Value>>,
}

impl CompilerModule for FakeSolc {
    fn version(&self) -> Result<String, String> {
        Ok("0.8.19+commit.7dd6d404.Emscripten.clang".to_string())
    }

    fn license(&self) -> Result<String, String> {
        Ok("GPL-3.0".to_string())
    }

    fn compile(&self, input: &str) -> Result<String, String> {
        let request: Value = serde_json::from_str(input).map_err(|e| e.to_string())?;
        let mut contracts = serde_json::Map::new();
        let mut sources = serde_json::Map::new();
        for (id, file) in request["sources"].as_object().ok_or("no sources")?.keys().enumerate() {
            let name = Path::new(file).file_stem().unwrap().to_string_lossy().to_string();
            contracts.insert(
                file.clone(),
                json!({
                    name: {
                        "abi": [
                            {
                                "type": "function",
                                "name": "f",
                                "inputs": [],
                                "outputs": [{"name": "", "type": "uint256", "internalType": "uint256"}],
                                "stateMutability": "pure"
                            },
                            {"type": "constructor", "inputs": [], "stateMutability": "nonpayable"}
                        ],
                        "evm": {
                            "bytecode": {"object": "6080604052", "linkReferences": {}},
                            "deployedBytecode": {"object": "6080"},
                            "methodIdentifiers": {"f()": "26121ff0"}
                        },
                        "metadata": "{\"compiler\":{\"version\":\"0.8.19\"}}"
                    }
                }),
            );
            sources.insert(file.clone(), json!({ "id": id }));
        }
        self.requests.borrow_mut().push(request);
        Ok(json!({ "contracts": contracts, "sources": sources }).to_string())
    }
}

#[test]
fn compiles_simple_contract() {
    crate::init_tracing();
    let solc = SolcAdapter::new(FakeSolc::default()).unwrap();
    assert_eq!(solc.version(), "0.8.19+commit.7dd6d404.Emscripten.clang");

    let output = solc.compile_simple("A", "contract A { function f() public pure returns (uint256) { return 1; } }").unwrap();
    assert_eq!(output.contracts_iter().count(), 1);
    let contract = output.get("A.sol", "A").unwrap();
    assert_eq!(contract.functions().count(), 1);
    assert!(contract.constructor().is_some());
    assert_eq!(contract.evm.bytecode.bytes().unwrap(), vec![0x60, 0x80, 0x60, 0x40, 0x52]);
    assert_eq!(contract.metadata_json().unwrap().unwrap()["compiler"]["version"], "0.8.19");

    let AbiEntry::Function { outputs, .. } = &contract.abi[0] else { panic!("expected function") };
    assert_eq!(outputs[0].internal_type, "uint256");
    assert_eq!(hex::encode(contract.abi[0].selector().unwrap()), contract.evm.method_identifiers["f()"]);
}

#[test]
fn sends_default_settings() {
    let solc = SolcAdapter::new(FakeSolc::default()).unwrap();
    solc.compile_simple("A", "contract A {}").unwrap();

    let requests = solc.module().requests.borrow();
    let request = &requests[0];
    assert_eq!(request["language"], "Solidity");
    assert_eq!(request["sources"]["A.sol"]["content"], "contract A {}");
    assert_eq!(request["settings"]["optimizer"], json!({"enabled": true, "runs": 200}));
    assert_eq!(
        request["settings"]["outputSelection"],
        json!({"*": {"*": ["abi", "evm.bytecode", "evm.deployedBytecode", "metadata"]}})
    );
    assert!(request["settings"].get("evmVersion").is_none());
    assert!(request["settings"].get("libraries").is_none());
}

#[test]
fn compiles_multiple_sources() {
    let solc = SolcAdapter::new(FakeSolc::default()).unwrap();
    let sources = Sources::from([
        ("src/Token.sol".to_string(), Source::new("contract Token {}")),
        ("src/Vault.sol".to_string(), Source::new("contract Vault {}")),
    ]);
    let output = solc.compile_multiple(sources).unwrap();

    assert_eq!(output.contracts_iter().count(), 2);
    assert!(output.find("Vault").is_some());
    assert!(output.get("src/Token.sol", "Token").is_some());
    assert_eq!(output.sources.as_ref().unwrap()["src/Vault.sol"].id, 1);
    assert_eq!(solc.module().requests.borrow().len(), 1);
}

#[test]
fn compiles_with_custom_settings() {
    let solc = SolcAdapter::new(FakeSolc::default()).unwrap();
    let settings = Settings::default().with_evm_version("london");
    let input = CompilationInput::with_settings(
        Sources::from([("A.sol".to_string(), Source::new("contract A {}"))]),
        settings,
    );
    solc.compile(&input).unwrap();
    assert_eq!(solc.module().requests.borrow()[0]["settings"]["evmVersion"], "london");
}

#[test]
fn module_failures_are_mapped() {
    struct Broken;

    impl CompilerModule for Broken {
        fn version(&self) -> Result<String, String> {
            Ok("0.8.19".to_string())
        }

        fn license(&self) -> Result<String, String> {
            Err("not exported".to_string())
        }

        fn compile(&self, _input: &str) -> Result<String, String> {
            Err("abort(OOM)".to_string())
        }
    }

    let solc = SolcAdapter::new(Broken).unwrap();
    assert_eq!(solc.license().unwrap_err(), SolcError::Ffi("not exported".to_string()));
    assert_eq!(
        solc.compile_simple("A", "contract A {}").unwrap_err(),
        SolcError::CompilationFailed("abort(OOM)".to_string())
    );
}

#[test]
fn boxed_modules_are_modules() {
    let module: Box<dyn CompilerModule> = Box::new(FakeSolc::default());
    let solc = SolcAdapter::new(module).unwrap();
    assert_eq!(solc.semver().unwrap().minor, 8);
}
