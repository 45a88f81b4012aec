//! Loading of compiled contract artifacts
//!
//! Both the Hardhat layout (`"bytecode": "0x.."`) and the Foundry layout
//! (`"bytecode": { "object": "0x.." }`) are accepted.

use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy::{json_abi::JsonAbi, primitives::Bytes};
use itertools::Itertools;
use serde::Deserialize;

use crate::errors::ScriptError;

/// A compiled contract: its ABI and creation code
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    /// The contract ABI
    pub abi: JsonAbi,
    /// The creation code, without constructor arguments
    pub bytecode: Bytes,
}

/// The `bytecode` field of an artifact file
#[derive(Deserialize)]
#[serde(untagged)]
enum BytecodeField {
    /// Hardhat: a hex string
    Hex(Bytes),
    /// Foundry: an object holding the hex string
    Object {
        /// The creation code
        object: Bytes,
    },
}

/// The fields read from an artifact file
#[derive(Deserialize)]
struct ArtifactFile {
    /// The contract ABI
    abi: JsonAbi,
    /// The creation code
    bytecode: BytecodeField,
}

impl ContractArtifact {
    /// Find and parse the artifact for the named contract under `artifacts_dir`
    pub fn load(artifacts_dir: &Path, contract_name: &str) -> Result<Self, ScriptError> {
        let path = artifact_path(artifacts_dir, contract_name).ok_or_else(|| {
            ScriptError::ArtifactParsing(format!(
                "no artifact for {} under {}",
                contract_name,
                artifacts_dir.display()
            ))
        })?;

        let contents =
            fs::read_to_string(&path).map_err(|e| ScriptError::ReadFile(e.to_string()))?;
        Self::parse(&contents)
    }

    /// Parse an artifact from its JSON contents
    pub fn parse(contents: &str) -> Result<Self, ScriptError> {
        let ArtifactFile { abi, bytecode } = serde_json::from_str(contents)
            .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;

        let bytecode = match bytecode {
            BytecodeField::Hex(bytes) | BytecodeField::Object { object: bytes } => bytes,
        };
        if bytecode.is_empty() {
            return Err(ScriptError::ArtifactParsing(
                "artifact has no creation code, is it an interface?".to_string(),
            ));
        }

        Ok(Self { abi, bytecode })
    }

    /// The canonical parameter list of the artifact's constructor, e.g. `(address,uint256)`
    pub fn constructor_signature(&self) -> String {
        let params = self
            .abi
            .constructor
            .as_ref()
            .map(|constructor| {
                constructor
                    .inputs
                    .iter()
                    .map(|param| param.selector_type())
                    .join(",")
            })
            .unwrap_or_default();

        format!("({params})")
    }
}

/// The candidate locations of an artifact, in the Hardhat and Foundry layouts
fn artifact_path(artifacts_dir: &Path, contract_name: &str) -> Option<PathBuf> {
    let file_name = format!("{contract_name}.json");
    let source_dir = format!("{contract_name}.sol");

    [
        artifacts_dir.join(&file_name),
        artifacts_dir.join(&source_dir).join(&file_name),
        artifacts_dir.join("contracts").join(&source_dir).join(&file_name),
    ]
    .into_iter()
    .find(|path| path.is_file())
}
