//! Typed constructor arguments, one variant per deployable contract
//!
//! The argument order of each contract is fixed by its constructor declaration in
//! [`crate::solidity`], so the encoded arguments for identical inputs are byte-identical
//! across runs.

use std::fmt;

use alloy::{
    hex,
    primitives::{aliases::U96, Address, I256, U256},
    sol_types::{SolConstructor, SolType},
};

use crate::{
    constants::{
        BASIC_NFT_CONTRACT, DYNAMIC_SVG_NFT_CONTRACT, NUM_TOKEN_URIS, PRICE_FEED_MOCK_CONTRACT,
        PRICE_FEED_MOCK_DECIMALS, PRICE_FEED_MOCK_INITIAL_ANSWER, RANDOM_IPFS_NFT_CONTRACT,
        VRF_COORDINATOR_MOCK_CONTRACT, VRF_MOCK_BASE_FEE, VRF_MOCK_GAS_PRICE_LINK,
    },
    errors::ScriptError,
    network_config::ChainProfile,
    solidity::{DynamicSvgNft, MockV3Aggregator, RandomIpfsNft, VRFCoordinatorV2Mock},
    types::VrfSubscription,
};

/// The constructor arguments of a deployable contract
#[derive(Clone)]
pub enum ConstructorArgs {
    /// `VRFCoordinatorV2Mock(baseFee, gasPriceLink)`
    VrfCoordinatorMock(VRFCoordinatorV2Mock::constructorCall),
    /// `MockV3Aggregator(decimals, initialAnswer)`
    PriceFeedMock(MockV3Aggregator::constructorCall),
    /// `BasicNft()`
    BasicNft,
    /// `RandomIpfsNft(vrfCoordinatorV2, subscriptionId, gasLane, callbackGasLimit,
    /// dogTokenUris, mintFee)`
    RandomIpfsNft(RandomIpfsNft::constructorCall),
    /// `DynamicSvgNft(priceFeedAddress, lowSvg, highSvg)`
    DynamicSvgNft(DynamicSvgNft::constructorCall),
}

impl fmt::Debug for ConstructorArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorArgs")
            .field("contract", &self.contract_name())
            .field("signature", &self.signature())
            .field("encoded", &hex::encode_prefixed(self.abi_encode()))
            .finish()
    }
}

/// Two argument sets are equal when they construct the same contract with the same
/// encoded arguments
impl PartialEq for ConstructorArgs {
    fn eq(&self, other: &Self) -> bool {
        self.contract_name() == other.contract_name() && self.abi_encode() == other.abi_encode()
    }
}

impl Eq for ConstructorArgs {}

/// Check that a token URI list holds exactly as many URIs as the random IPFS NFT is
/// constructed with
pub fn check_token_uris(token_uris: &[String]) -> Result<(), ScriptError> {
    if token_uris.len() == NUM_TOKEN_URIS {
        return Ok(());
    }

    Err(ScriptError::CalldataConstruction(format!(
        "{} expects {} token URIs, got {}",
        RANDOM_IPFS_NFT_CONTRACT,
        NUM_TOKEN_URIS,
        token_uris.len()
    )))
}

impl ConstructorArgs {
    /// Arguments for the mock VRF coordinator
    pub fn vrf_coordinator_mock() -> Self {
        ConstructorArgs::VrfCoordinatorMock(VRFCoordinatorV2Mock::constructorCall {
            _baseFee: U96::from(VRF_MOCK_BASE_FEE),
            _gasPriceLink: U96::from(VRF_MOCK_GAS_PRICE_LINK),
        })
    }

    /// Arguments for the mock price feed
    pub fn price_feed_mock() -> Self {
        ConstructorArgs::PriceFeedMock(MockV3Aggregator::constructorCall {
            _decimals: PRICE_FEED_MOCK_DECIMALS,
            _initialAnswer: I256::from_raw(U256::from(PRICE_FEED_MOCK_INITIAL_ANSWER)),
        })
    }

    /// Arguments for the random IPFS NFT
    ///
    /// Fails if the token URI list does not hold exactly as many URIs as the contract
    /// is constructed with.
    pub fn random_ipfs_nft(
        vrf: VrfSubscription,
        profile: &ChainProfile,
        token_uris: Vec<String>,
    ) -> Result<Self, ScriptError> {
        check_token_uris(&token_uris)?;
        let dog_token_uris: [String; NUM_TOKEN_URIS] = token_uris.try_into().map_err(|_| {
            ScriptError::CalldataConstruction("token URI list changed length".to_string())
        })?;

        Ok(ConstructorArgs::RandomIpfsNft(RandomIpfsNft::constructorCall {
            vrfCoordinatorV2: vrf.coordinator,
            subscriptionId: vrf.subscription_id,
            gasLane: profile.gas_lane,
            callbackGasLimit: profile.callback_gas_limit,
            dogTokenUris: dog_token_uris,
            mintFee: profile.mint_fee(),
        }))
    }

    /// Arguments for the dynamic SVG NFT
    pub fn dynamic_svg_nft(price_feed: Address, low_svg: String, high_svg: String) -> Self {
        ConstructorArgs::DynamicSvgNft(DynamicSvgNft::constructorCall {
            priceFeedAddress: price_feed,
            lowSvg: low_svg,
            highSvg: high_svg,
        })
    }

    /// The name of the artifact these arguments construct
    pub fn contract_name(&self) -> &'static str {
        match self {
            ConstructorArgs::VrfCoordinatorMock(_) => VRF_COORDINATOR_MOCK_CONTRACT,
            ConstructorArgs::PriceFeedMock(_) => PRICE_FEED_MOCK_CONTRACT,
            ConstructorArgs::BasicNft => BASIC_NFT_CONTRACT,
            ConstructorArgs::RandomIpfsNft(_) => RANDOM_IPFS_NFT_CONTRACT,
            ConstructorArgs::DynamicSvgNft(_) => DYNAMIC_SVG_NFT_CONTRACT,
        }
    }

    /// The canonical parameter list of the constructor, e.g. `(address,string,string)`
    pub fn signature(&self) -> &'static str {
        match self {
            ConstructorArgs::VrfCoordinatorMock(_) => {
                params_of::<VRFCoordinatorV2Mock::constructorCall>()
            }
            ConstructorArgs::PriceFeedMock(_) => params_of::<MockV3Aggregator::constructorCall>(),
            ConstructorArgs::BasicNft => "()",
            ConstructorArgs::RandomIpfsNft(_) => params_of::<RandomIpfsNft::constructorCall>(),
            ConstructorArgs::DynamicSvgNft(_) => params_of::<DynamicSvgNft::constructorCall>(),
        }
    }

    /// ABI-encode the arguments, to be appended to the contract's creation code
    pub fn abi_encode(&self) -> Vec<u8> {
        match self {
            ConstructorArgs::VrfCoordinatorMock(call) => call.abi_encode(),
            ConstructorArgs::PriceFeedMock(call) => call.abi_encode(),
            ConstructorArgs::BasicNft => Vec::new(),
            ConstructorArgs::RandomIpfsNft(call) => call.abi_encode(),
            ConstructorArgs::DynamicSvgNft(call) => call.abi_encode(),
        }
    }
}

/// The Solidity parameter list of a constructor
fn params_of<C: SolConstructor>() -> &'static str {
    <C::Parameters<'static> as SolType>::SOL_NAME
}
