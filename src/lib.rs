#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[macro_use]
extern crate tracing;

pub mod artifacts;
pub use artifacts::{
    codec::{decode, encode, DecodeError, EncodeError},
    AbiEntry, AbiParam, Bytecode, CompilationError, CompilationInput, CompilationOutput,
    Contract, Evm, GasEstimates, Libraries, Optimizer, OutputSelection, Settings, Severity,
    Source, SourceLocation, Sources, StateMutability,
};

pub mod compilers;
pub use compilers::{CompilerModule, NativeSolc, SolcAdapter};

mod compile;
pub use compile::{load, load_with};

pub mod error;
pub use error::{Result, SolcError};

pub mod releases;
pub use releases::{Platform, ReleaseIndex, ReleaseInfo};
