//! The record of contracts deployed by a run, persisted to a `deployments.json` file

use std::{collections::BTreeMap, fs, path::Path};

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    constants::{NUM_TOKEN_URIS, PRICE_FEED_MOCK_CONTRACT, VRF_COORDINATOR_MOCK_CONTRACT},
    errors::ScriptError,
    network_config::EnvironmentClass,
    types::{DeployedContract, MockDependencies},
};

/// The contracts deployed to a chain, and the token URIs last published for them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    /// The chain the contracts were deployed to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    /// The deployed contracts, keyed by artifact name
    #[serde(default)]
    pub deployments: BTreeMap<String, DeployedContract>,
    /// The most recently published token URIs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_uris: Option<Vec<String>>,
}

impl DeploymentRecord {
    /// Read the record at `path`, or an empty record if the file does not exist
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents =
            fs::read_to_string(path).map_err(|e| ScriptError::ReadFile(e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| ScriptError::Serde(e.to_string()))
    }

    /// Read the record a run against the given chain starts from
    ///
    /// Development chains reset between runs, and deployments to another chain do not
    /// apply, so in both cases only the recorded token URIs carry over.
    pub fn load_for_run(
        path: &Path,
        chain_id: u64,
        environment: EnvironmentClass,
    ) -> Result<Self, ScriptError> {
        let mut record = Self::load(path)?;

        if record.chain_id.is_some_and(|id| id != chain_id) {
            warn!(
                "{} holds deployments for chain {:?}, starting a fresh record for chain {}",
                path.display(),
                record.chain_id,
                chain_id
            );
            record = Self {
                token_uris: record.token_uris,
                ..Default::default()
            };
        } else if environment.is_local() {
            record.deployments.clear();
        }

        record.chain_id = Some(chain_id);
        Ok(record)
    }

    /// Write the record to `path`
    pub fn persist(&self, path: &Path) -> Result<(), ScriptError> {
        let contents =
            serde_json::to_string_pretty(self).map_err(|e| ScriptError::Serde(e.to_string()))?;
        fs::write(path, contents).map_err(|e| ScriptError::WriteFile(e.to_string()))
    }

    /// Record a complete list of published token URIs
    ///
    /// A list of the wrong length is not recorded, so a partial publish never replaces
    /// a usable list. Returns whether the list was recorded.
    pub fn record_token_uris(&mut self, token_uris: Vec<String>) -> bool {
        if token_uris.len() != NUM_TOKEN_URIS {
            warn!(
                published = token_uris.len(),
                expected = NUM_TOKEN_URIS,
                "not recording an incomplete token URI list"
            );
            return false;
        }

        self.token_uris = Some(token_uris);
        true
    }

    /// Record a deployed contract, replacing any earlier deployment of the same artifact
    pub fn record(&mut self, contract: DeployedContract) {
        self.deployments.insert(contract.name.clone(), contract);
    }

    /// The address of the named artifact, if it was deployed
    pub fn address_of(&self, name: &str) -> Option<Address> {
        self.deployments.get(name).map(|contract| contract.address)
    }

    /// The mocked dependencies, if both were deployed
    pub fn mocks(&self) -> Option<MockDependencies> {
        Some(MockDependencies {
            vrf_coordinator: self.address_of(VRF_COORDINATOR_MOCK_CONTRACT)?,
            price_feed: self.address_of(PRICE_FEED_MOCK_CONTRACT)?,
        })
    }
}
