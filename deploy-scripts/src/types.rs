//! Type definitions used throughout the scripts

use alloy::primitives::{Address, TxHash};
use serde::{Deserialize, Serialize};

/// A contract deployed by the scripts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedContract {
    /// The name of the deployed artifact
    pub name: String,
    /// The address the contract was deployed at
    pub address: Address,
    /// The hash of the deployment transaction
    pub tx_hash: TxHash,
}

/// The addresses of the mocked external dependencies on a development chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockDependencies {
    /// The mock VRF coordinator
    pub vrf_coordinator: Address,
    /// The mock ETH / USD price feed
    pub price_feed: Address,
}

/// A VRF coordinator paired with a subscription on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VrfSubscription {
    /// The address of the VRF coordinator
    pub coordinator: Address,
    /// The id of the subscription on the coordinator
    pub subscription_id: u64,
}
