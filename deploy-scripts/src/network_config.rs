//! Static per-chain deployment configuration
//!
//! Each [`ChainProfile`] carries the parameters the NFT contracts are constructed with on a
//! given chain. Profiles for development chains omit the live dependency addresses, since
//! those dependencies are mocked; accessing a missing live field is an error at the point of
//! use rather than when the table is read.

use alloy::primitives::{address, b256, Address, B256, U256};

use crate::{
    constants::{
        DEFAULT_CALLBACK_GAS_LIMIT, DEFAULT_INTERVAL, DEFAULT_MINT_FEE, DEVELOPMENT_CHAINS,
        LOCAL_CHAIN_ID, SEPOLIA_CHAIN_ID,
    },
    errors::ScriptError,
};

/// The class of environment a deployment targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentClass {
    /// A development chain, on which external dependencies are mocked
    Local,
    /// A live chain, on which external dependencies are read from the network config
    Live,
}

impl EnvironmentClass {
    /// Classify a chain by its name
    pub fn from_chain_name(name: &str) -> Self {
        if DEVELOPMENT_CHAINS.contains(&name) {
            EnvironmentClass::Local
        } else {
            EnvironmentClass::Live
        }
    }

    /// Whether the environment is a development chain
    pub fn is_local(&self) -> bool {
        matches!(self, EnvironmentClass::Local)
    }
}

/// The deployment parameters for a single chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainProfile {
    /// The chain id
    pub chain_id: u64,
    /// The human-readable name of the chain
    pub name: &'static str,
    /// The address of the live VRF coordinator
    pub vrf_coordinator_v2: Option<Address>,
    /// The id of the live, externally funded VRF subscription
    pub subscription_id: Option<u64>,
    /// The key hash selecting the VRF gas lane
    pub gas_lane: B256,
    /// The gas limit of the VRF fulfillment callback
    pub callback_gas_limit: u32,
    /// The upkeep interval, in seconds
    pub interval: u64,
    /// The mint fee, in wei
    pub mint_fee: u128,
    /// The address of the live ETH / USD price feed
    pub eth_usd_price_feed: Option<Address>,
}

/// The network configuration table
pub static NETWORK_CONFIG: [ChainProfile; 2] = [
    ChainProfile {
        chain_id: SEPOLIA_CHAIN_ID,
        name: "sepolia",
        vrf_coordinator_v2: Some(address!("8103B0A8A00be2DDC778e6e7eaa21791Cd364625")),
        // vrf.chain.link/sepolia/4707
        subscription_id: Some(4707),
        gas_lane: b256!("474e34a077df58807dbe9c96d3c009b23b3c6d0cce433e59bbf5b34f823bc56c"),
        callback_gas_limit: DEFAULT_CALLBACK_GAS_LIMIT,
        interval: DEFAULT_INTERVAL,
        mint_fee: DEFAULT_MINT_FEE,
        eth_usd_price_feed: Some(address!("694AA1769357215DE4FAC081bf1f309aDC325306")),
    },
    ChainProfile {
        chain_id: LOCAL_CHAIN_ID,
        name: "hardhat",
        vrf_coordinator_v2: None,
        subscription_id: None,
        gas_lane: b256!("474e34a077df58807dbe9c96d3c009b23b3c6d0cce433e59bbf5b34f823bc56c"),
        callback_gas_limit: DEFAULT_CALLBACK_GAS_LIMIT,
        interval: DEFAULT_INTERVAL,
        mint_fee: DEFAULT_MINT_FEE,
        eth_usd_price_feed: None,
    },
];

/// Look up the profile for the given chain id
pub fn lookup(chain_id: u64) -> Result<&'static ChainProfile, ScriptError> {
    NETWORK_CONFIG
        .iter()
        .find(|profile| profile.chain_id == chain_id)
        .ok_or(ScriptError::UnknownChain(chain_id))
}

/// Look up the profile of the given chain and classify its environment
///
/// `network` overrides the profile's name when classifying, e.g. `localhost` for a local
/// node running under a live chain id.
pub fn classify_chain(
    chain_id: u64,
    network: Option<&str>,
) -> Result<(&'static ChainProfile, EnvironmentClass), ScriptError> {
    let profile = lookup(chain_id)?;
    let environment = EnvironmentClass::from_chain_name(network.unwrap_or(profile.name));
    Ok((profile, environment))
}

impl ChainProfile {
    /// The environment class implied by the profile's name
    pub fn environment(&self) -> EnvironmentClass {
        EnvironmentClass::from_chain_name(self.name)
    }

    /// The mint fee as a `uint256`
    pub fn mint_fee(&self) -> U256 {
        U256::from(self.mint_fee)
    }

    /// The live VRF coordinator address, required on live chains
    pub fn require_vrf_coordinator(&self) -> Result<Address, ScriptError> {
        self.vrf_coordinator_v2
            .ok_or_else(|| self.missing("vrfCoordinatorV2"))
    }

    /// The live subscription id, required on live chains
    pub fn require_subscription_id(&self) -> Result<u64, ScriptError> {
        self.subscription_id
            .ok_or_else(|| self.missing("subscriptionId"))
    }

    /// The live price feed address, required on live chains
    pub fn require_price_feed(&self) -> Result<Address, ScriptError> {
        self.eth_usd_price_feed
            .ok_or_else(|| self.missing("ethUsdPriceFeed"))
    }

    /// The error for a missing live field
    fn missing(&self, field: &'static str) -> ScriptError {
        ScriptError::MissingLiveConfig {
            chain: self.name.to_string(),
            field,
        }
    }
}
