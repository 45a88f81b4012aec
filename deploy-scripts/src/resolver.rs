//! Resolution of the external contracts a deployment depends on
//!
//! On a development chain the dependencies are mocks deployed by the run itself, and a
//! fresh randomness subscription is created and funded on the mock coordinator. On a live
//! chain every dependency is read from the chain's profile and no chain call is made.

use alloy::{
    primitives::{aliases::U96, Address, Log},
    sol_types::SolEvent,
};
use tracing::{info, warn};

use crate::{
    client::ChainClient,
    constants::SUBSCRIPTION_FUND_AMOUNT,
    constructor_args::ConstructorArgs,
    deployments::DeploymentRecord,
    errors::ScriptError,
    network_config::{ChainProfile, EnvironmentClass},
    solidity::VRFCoordinatorV2Mock::SubscriptionCreated,
    types::{DeployedContract, MockDependencies, VrfSubscription},
};

/// The dependencies a deployment needs resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DependencyRequest {
    /// Whether a funded randomness subscription is needed
    pub vrf_subscription: bool,
    /// Whether a price feed is needed
    pub price_feed: bool,
}

impl DependencyRequest {
    /// A request for a randomness subscription only
    pub const VRF_SUBSCRIPTION: Self = Self {
        vrf_subscription: true,
        price_feed: false,
    };
    /// A request for a price feed only
    pub const PRICE_FEED: Self = Self {
        vrf_subscription: false,
        price_feed: true,
    };

    /// Whether nothing is requested
    fn is_empty(&self) -> bool {
        !self.vrf_subscription && !self.price_feed
    }
}

/// The resolved dependencies of a deployment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedDependencies {
    /// The randomness subscription, if requested
    pub vrf: Option<VrfSubscription>,
    /// The price feed address, if requested
    pub price_feed: Option<Address>,
}

/// Resolve the requested dependencies on the given chain
///
/// Mocks deployed while resolving are pushed onto `deployed` as soon as they land, so
/// they can be recorded even when a later step fails.
pub async fn resolve<C: ChainClient + ?Sized>(
    client: &C,
    profile: &ChainProfile,
    environment: EnvironmentClass,
    request: DependencyRequest,
    record: &DeploymentRecord,
    deployed: &mut Vec<DeployedContract>,
) -> Result<ResolvedDependencies, ScriptError> {
    match environment {
        EnvironmentClass::Live => resolve_live(profile, request),
        EnvironmentClass::Local => resolve_local(client, request, record, deployed).await,
    }
}

/// Read the requested dependencies from a live chain's profile
fn resolve_live(
    profile: &ChainProfile,
    request: DependencyRequest,
) -> Result<ResolvedDependencies, ScriptError> {
    let vrf = if request.vrf_subscription {
        Some(VrfSubscription {
            coordinator: profile.require_vrf_coordinator()?,
            subscription_id: profile.require_subscription_id()?,
        })
    } else {
        None
    };
    let price_feed = if request.price_feed {
        Some(profile.require_price_feed()?)
    } else {
        None
    };

    Ok(ResolvedDependencies { vrf, price_feed })
}

/// Resolve the requested dependencies against mocks on a development chain
async fn resolve_local<C: ChainClient + ?Sized>(
    client: &C,
    request: DependencyRequest,
    record: &DeploymentRecord,
    deployed: &mut Vec<DeployedContract>,
) -> Result<ResolvedDependencies, ScriptError> {
    let mut resolved = ResolvedDependencies::default();
    if request.is_empty() {
        return Ok(resolved);
    }

    let mocks = match record.mocks() {
        Some(mocks) => mocks,
        None => {
            info!("Local network detected, deploying mocks...");
            deploy_mocks(client, deployed).await?
        }
    };

    if request.vrf_subscription {
        let subscription_id = create_funded_subscription(client, mocks.vrf_coordinator).await?;
        resolved.vrf = Some(VrfSubscription {
            coordinator: mocks.vrf_coordinator,
            subscription_id,
        });
    }
    if request.price_feed {
        resolved.price_feed = Some(mocks.price_feed);
    }

    Ok(resolved)
}

/// Deploy the mock VRF coordinator and the mock price feed, in that order
///
/// Each mock is pushed onto `deployed` once it lands.
pub async fn deploy_mocks<C: ChainClient + ?Sized>(
    client: &C,
    deployed: &mut Vec<DeployedContract>,
) -> Result<MockDependencies, ScriptError> {
    warn!("Deploying mocks, these contracts are only meant for testing");

    let vrf_coordinator =
        deploy_mock(client, ConstructorArgs::vrf_coordinator_mock(), deployed).await?;
    let price_feed = deploy_mock(client, ConstructorArgs::price_feed_mock(), deployed).await?;

    Ok(MockDependencies {
        vrf_coordinator,
        price_feed,
    })
}

/// Deploy a single mock, returning its address
async fn deploy_mock<C: ChainClient + ?Sized>(
    client: &C,
    args: ConstructorArgs,
    deployed: &mut Vec<DeployedContract>,
) -> Result<Address, ScriptError> {
    let contract = client.deploy(&args).await?;
    info!(
        address = %contract.address,
        tx = %contract.tx_hash,
        "deployed {}",
        contract.name
    );

    let address = contract.address;
    deployed.push(contract);
    Ok(address)
}

/// Create a subscription on the coordinator and fund it with the fixed top-up
async fn create_funded_subscription<C: ChainClient + ?Sized>(
    client: &C,
    coordinator: Address,
) -> Result<u64, ScriptError> {
    let logs = client.create_subscription(coordinator).await?;
    let subscription_id = subscription_id_from_logs(&logs)?;
    info!(subscription_id, "created VRF subscription");

    let amount = U96::from(SUBSCRIPTION_FUND_AMOUNT);
    client.fund_subscription(coordinator, subscription_id, amount).await?;

    let balance = client.subscription_balance(coordinator, subscription_id).await?;
    if balance < amount {
        return Err(ScriptError::SubscriptionFundingFailed(format!(
            "subscription {subscription_id} holds {balance} after funding with {amount}"
        )));
    }
    info!(subscription_id, %balance, "funded VRF subscription");

    Ok(subscription_id)
}

/// Find the id of the created subscription among a creation receipt's logs
fn subscription_id_from_logs(logs: &[Log]) -> Result<u64, ScriptError> {
    logs.iter()
        .filter(|log| log.topics().first() == Some(&SubscriptionCreated::SIGNATURE_HASH))
        .find_map(|log| SubscriptionCreated::decode_log(log).ok())
        .map(|event| event.data.subId)
        .ok_or_else(|| {
            ScriptError::SubscriptionCreationFailed(
                "no SubscriptionCreated event in the creation receipt".to_string(),
            )
        })
}
