//! Definitions of errors that can occur during deployment of the contracts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur during the execution of the deploy scripts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// The chain id has no entry in the network configuration table
    UnknownChain(u64),
    /// A field required for a live deployment is absent from the chain profile
    MissingLiveConfig {
        /// The name of the chain whose profile is incomplete
        chain: String,
        /// The name of the missing field
        field: &'static str,
    },
    /// A single asset failed to upload to the content-addressed network
    UploadItemFailed(String),
    /// A single metadata document failed to publish
    MetadataPublishFailed(String),
    /// The randomness subscription could not be created
    SubscriptionCreationFailed(String),
    /// The randomness subscription could not be funded
    SubscriptionFundingFailed(String),
    /// Error deploying a contract
    DeployFailed(String),
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// Error parsing a compilation artifact
    ArtifactParsing(String),
    /// Error constructing calldata for a contract method or constructor
    CalldataConstruction(String),
    /// Error calling a contract method
    ContractInteraction(String),
    /// Error reading a file
    ReadFile(String),
    /// Error writing a file
    WriteFile(String),
    /// Error de/serializing JSON
    Serde(String),
    /// One or more deployment cases failed
    CasesFailed(Vec<String>),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::UnknownChain(id) => write!(f, "no network config for chain id {}", id),
            ScriptError::MissingLiveConfig { chain, field } => {
                write!(f, "network config for {} is missing `{}`", chain, field)
            }
            ScriptError::UploadItemFailed(s) => write!(f, "error uploading asset: {}", s),
            ScriptError::MetadataPublishFailed(s) => write!(f, "error publishing metadata: {}", s),
            ScriptError::SubscriptionCreationFailed(s) => {
                write!(f, "error creating subscription: {}", s)
            }
            ScriptError::SubscriptionFundingFailed(s) => {
                write!(f, "error funding subscription: {}", s)
            }
            ScriptError::DeployFailed(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::CalldataConstruction(s) => write!(f, "error constructing calldata: {}", s),
            ScriptError::ContractInteraction(s) => {
                write!(f, "error interacting with contract: {}", s)
            }
            ScriptError::ReadFile(s) => write!(f, "error reading file: {}", s),
            ScriptError::WriteFile(s) => write!(f, "error writing file: {}", s),
            ScriptError::Serde(s) => write!(f, "error de/serializing JSON: {}", s),
            ScriptError::CasesFailed(cases) => {
                write!(f, "deployment cases failed: {}", cases.join(", "))
            }
        }
    }
}

impl Error for ScriptError {}
