//! The deployment cases and the runner that drives them
//!
//! Each [`DeploymentCase`] provisions one contract: it resolves the contract's
//! dependencies, assembles its constructor arguments, deploys it once and wires it up
//! after deployment. The runner executes the selected cases in a fixed order and extends
//! the run's [`DeploymentRecord`] with whatever each case deployed.

use std::{
    fmt::{self, Display},
    path::Path,
};

use alloy::primitives::Address;
use tracing::{error, info};

use crate::{
    client::ChainClient,
    constants::{
        DEFAULT_TOKEN_URIS, DYNAMIC_NFT_IMAGES_DIR, HIGH_SVG_FILE, LOW_SVG_FILE,
        RANDOM_NFT_IMAGES_DIR,
    },
    constructor_args::{check_token_uris, ConstructorArgs},
    deployments::DeploymentRecord,
    errors::ScriptError,
    network_config::{ChainProfile, EnvironmentClass},
    publisher::{AssetPublisher, ContentStore},
    resolver::{deploy_mocks, resolve, DependencyRequest},
    types::DeployedContract,
};

/// A self-contained procedure provisioning one contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentCase {
    /// The mocked VRF coordinator and price feed, on development chains only
    Mocks,
    /// `BasicNft`
    Basic,
    /// `RandomIpfsNft`
    Random,
    /// `DynamicSvgNft`
    Dynamic,
}

impl DeploymentCase {
    /// Every case, in the order the cases run
    pub const ALL: [DeploymentCase; 4] = [
        DeploymentCase::Mocks,
        DeploymentCase::Basic,
        DeploymentCase::Random,
        DeploymentCase::Dynamic,
    ];

    /// The name of the case
    pub fn name(&self) -> &'static str {
        match self {
            DeploymentCase::Mocks => "mocks",
            DeploymentCase::Basic => "basic",
            DeploymentCase::Random => "random",
            DeploymentCase::Dynamic => "dynamic",
        }
    }

    /// The tags selecting the case
    pub fn tags(&self) -> [&'static str; 2] {
        ["all", self.name()]
    }

    /// Whether the case is selected by any of the given tags. No tags select every case.
    pub fn is_selected(&self, tags: &[String]) -> bool {
        tags.is_empty() || tags.iter().any(|tag| self.tags().contains(&tag.as_str()))
    }

    /// Whether the cases after this one can still run if it fails
    pub fn is_independent(&self) -> bool {
        !matches!(self, DeploymentCase::Mocks)
    }
}

impl Display for DeploymentCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything a case needs besides the run's deployment record
pub struct DeploymentContext<'a, C: ?Sized> {
    /// The client deploying and calling contracts
    pub client: &'a C,
    /// The profile of the target chain
    pub profile: &'a ChainProfile,
    /// The class of the target chain
    pub environment: EnvironmentClass,
    /// The directory holding the NFT images
    pub images_dir: &'a Path,
    /// The store token metadata is published to, if it should be re-published
    pub content_store: Option<&'a dyn ContentStore>,
}

/// What a successful case produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseOutcome {
    /// The contracts the case deployed, dependencies included
    pub deployed: Vec<DeployedContract>,
    /// The token URIs the case published
    pub token_uris: Option<Vec<String>>,
}

/// A failed case, with whatever it deployed before failing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseFailure {
    /// The error the case failed with
    pub error: ScriptError,
    /// The contracts that landed on chain before the failure
    pub deployed: Vec<DeployedContract>,
}

impl Display for CaseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

/// Run the cases selected by `tags` in order, persisting the record after each case
///
/// A failing [`DeploymentCase::Mocks`] stops the run; any other failure is logged and the
/// remaining cases still run. Contracts deployed by a failed case are still recorded.
/// Every failure, including a failed write of the record, is reported in the returned
/// error.
pub async fn run_deployments<C: ChainClient + ?Sized>(
    ctx: &DeploymentContext<'_, C>,
    tags: &[String],
    record: &mut DeploymentRecord,
    deployments_path: &Path,
) -> Result<(), ScriptError> {
    let mut failures = Vec::new();

    for case in DeploymentCase::ALL.into_iter().filter(|case| case.is_selected(tags)) {
        info!(case = %case, "running deployment case");

        let (deployed, failed) = match run_case(ctx, case, record).await {
            Ok(outcome) => {
                if let Some(token_uris) = outcome.token_uris {
                    record.record_token_uris(token_uris);
                }
                (outcome.deployed, false)
            }
            Err(failure) => {
                error!(case = %case, error = %failure, "deployment case failed");
                failures.push(format!("{case}: {failure}"));
                (failure.deployed, true)
            }
        };

        if let Err(e) = record_deployed(record, deployed, deployments_path) {
            error!(case = %case, error = %e, "failed to persist deployments");
            failures.push(format!("{case}: {e}"));
        } else if !failed {
            info!(case = %case, "deployment case finished");
        }

        if failed && !case.is_independent() {
            break;
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(ScriptError::CasesFailed(failures))
    }
}

/// Add a case's deployments to the record and write it out
fn record_deployed(
    record: &mut DeploymentRecord,
    deployed: Vec<DeployedContract>,
    deployments_path: &Path,
) -> Result<(), ScriptError> {
    for contract in deployed {
        record.record(contract);
    }
    record.persist(deployments_path)
}

/// Run a single case against the run's record as it stands
pub async fn run_case<C: ChainClient + ?Sized>(
    ctx: &DeploymentContext<'_, C>,
    case: DeploymentCase,
    record: &DeploymentRecord,
) -> Result<CaseOutcome, CaseFailure> {
    let mut deployed = Vec::new();
    let result = match case {
        DeploymentCase::Mocks => deploy_mocks_case(ctx, &mut deployed).await,
        DeploymentCase::Basic => deploy_basic_nft(ctx, &mut deployed).await,
        DeploymentCase::Random => deploy_random_ipfs_nft(ctx, record, &mut deployed).await,
        DeploymentCase::Dynamic => deploy_dynamic_svg_nft(ctx, record, &mut deployed).await,
    };

    match result {
        Ok(token_uris) => Ok(CaseOutcome {
            deployed,
            token_uris,
        }),
        Err(error) => Err(CaseFailure { error, deployed }),
    }
}

/// Deploy the mocks on a development chain, do nothing on a live one
async fn deploy_mocks_case<C: ChainClient + ?Sized>(
    ctx: &DeploymentContext<'_, C>,
    deployed: &mut Vec<DeployedContract>,
) -> Result<Option<Vec<String>>, ScriptError> {
    if !ctx.environment.is_local() {
        info!("{} is a live network, skipping mocks", ctx.profile.name);
        return Ok(None);
    }

    deploy_mocks(ctx.client, deployed).await?;
    Ok(None)
}

/// Deploy the basic NFT, which takes no arguments
async fn deploy_basic_nft<C: ChainClient + ?Sized>(
    ctx: &DeploymentContext<'_, C>,
    deployed: &mut Vec<DeployedContract>,
) -> Result<Option<Vec<String>>, ScriptError> {
    deploy_logged(ctx.client, &ConstructorArgs::BasicNft, deployed).await?;
    Ok(None)
}

/// Deploy the random IPFS NFT and register it as a consumer of its subscription
///
/// The token URIs are published and checked before anything touches the chain, so a
/// failed publish deploys nothing. Returns the URIs when they were published by this case.
async fn deploy_random_ipfs_nft<C: ChainClient + ?Sized>(
    ctx: &DeploymentContext<'_, C>,
    record: &DeploymentRecord,
    deployed: &mut Vec<DeployedContract>,
) -> Result<Option<Vec<String>>, ScriptError> {
    let (token_uris, published) = match ctx.content_store {
        Some(store) => {
            let uris = publish_token_uris(store, ctx.images_dir).await?;
            (uris.clone(), Some(uris))
        }
        None => (recorded_token_uris(record), None),
    };
    check_token_uris(&token_uris)?;

    let resolved = resolve(
        ctx.client,
        ctx.profile,
        ctx.environment,
        DependencyRequest::VRF_SUBSCRIPTION,
        record,
        deployed,
    )
    .await?;
    let vrf = resolved.vrf.ok_or_else(|| {
        ScriptError::SubscriptionCreationFailed("no VRF subscription resolved".to_string())
    })?;

    let args = ConstructorArgs::random_ipfs_nft(vrf, ctx.profile, token_uris)?;
    let address = deploy_logged(ctx.client, &args, deployed).await?;

    if ctx.environment.is_local() {
        ctx.client.add_consumer(vrf.coordinator, vrf.subscription_id, address).await?;
        info!(
            subscription_id = vrf.subscription_id,
            consumer = %address,
            "added VRF consumer"
        );
    }

    Ok(published)
}

/// Deploy the dynamic SVG NFT against the price feed
async fn deploy_dynamic_svg_nft<C: ChainClient + ?Sized>(
    ctx: &DeploymentContext<'_, C>,
    record: &DeploymentRecord,
    deployed: &mut Vec<DeployedContract>,
) -> Result<Option<Vec<String>>, ScriptError> {
    let svg_dir = ctx.images_dir.join(DYNAMIC_NFT_IMAGES_DIR);
    let low_svg = read_svg(&svg_dir.join(LOW_SVG_FILE)).await?;
    let high_svg = read_svg(&svg_dir.join(HIGH_SVG_FILE)).await?;

    let resolved = resolve(
        ctx.client,
        ctx.profile,
        ctx.environment,
        DependencyRequest::PRICE_FEED,
        record,
        deployed,
    )
    .await?;
    let price_feed: Address = resolved.price_feed.ok_or_else(|| ScriptError::MissingLiveConfig {
        chain: ctx.profile.name.to_string(),
        field: "ethUsdPriceFeed",
    })?;

    let args = ConstructorArgs::dynamic_svg_nft(price_feed, low_svg, high_svg);
    deploy_logged(ctx.client, &args, deployed).await?;

    Ok(None)
}

/// Publish the random NFT images and their metadata, returning the token URIs
async fn publish_token_uris(
    store: &dyn ContentStore,
    images_dir: &Path,
) -> Result<Vec<String>, ScriptError> {
    let publisher = AssetPublisher::new(store);
    let report = publisher
        .publish_token_uris(&images_dir.join(RANDOM_NFT_IMAGES_DIR))
        .await?;
    Ok(report.token_uris)
}

/// The token URIs recorded by an earlier run, or the default URIs
fn recorded_token_uris(record: &DeploymentRecord) -> Vec<String> {
    record
        .token_uris
        .clone()
        .unwrap_or_else(|| DEFAULT_TOKEN_URIS.iter().map(|uri| uri.to_string()).collect())
}

/// Read an SVG image
async fn read_svg(path: &Path) -> Result<String, ScriptError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ScriptError::ReadFile(format!("{}: {e}", path.display())))
}

/// Deploy a contract, pushing it onto `deployed` and returning its address
async fn deploy_logged<C: ChainClient + ?Sized>(
    client: &C,
    args: &ConstructorArgs,
    deployed: &mut Vec<DeployedContract>,
) -> Result<Address, ScriptError> {
    info!("Deploying {}...", args.contract_name());
    let contract = client.deploy(args).await?;
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

#[cfg(test)]
mod tests {
    use std::fs;

    use alloy::primitives::{address, aliases::U96};

    use super::*;
    use crate::{
        constants::{
            BASIC_NFT_CONTRACT, DYNAMIC_SVG_NFT_CONTRACT, LOCAL_CHAIN_ID,
            PRICE_FEED_MOCK_CONTRACT, RANDOM_IPFS_NFT_CONTRACT, SEPOLIA_CHAIN_ID,
            SUBSCRIPTION_FUND_AMOUNT, VRF_COORDINATOR_MOCK_CONTRACT,
        },
        network_config::lookup,
        test_helpers::{ChainCall, MockChain, MockContentStore},
    };

    /// A workspace with the dynamic NFT images and a deployments file path
    struct Workspace {
        dir: tempfile::TempDir,
    }

    impl Workspace {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let svg_dir = dir.path().join("images").join(DYNAMIC_NFT_IMAGES_DIR);
            fs::create_dir_all(&svg_dir).unwrap();
            fs::write(svg_dir.join(LOW_SVG_FILE), "<svg>frown</svg>").unwrap();
            fs::write(svg_dir.join(HIGH_SVG_FILE), "<svg>happy</svg>").unwrap();
            Self { dir }
        }

        fn images_dir(&self) -> std::path::PathBuf {
            self.dir.path().join("images")
        }

        fn deployments_path(&self) -> std::path::PathBuf {
            self.dir.path().join("deployments.json")
        }
    }

    fn tags(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|tag| tag.to_string()).collect()
    }

    fn deployed_names(chain: &MockChain) -> Vec<&'static str> {
        chain.deployments().iter().map(|args| args.contract_name()).collect()
    }

    #[test]
    fn test_case_selection() {
        let all = tags(&["all"]);
        assert!(DeploymentCase::ALL.iter().all(|case| case.is_selected(&all)));
        assert!(DeploymentCase::ALL.iter().all(|case| case.is_selected(&[])));

        let selected: Vec<DeploymentCase> = DeploymentCase::ALL
            .into_iter()
            .filter(|case| case.is_selected(&tags(&["random", "mocks"])))
            .collect();
        assert_eq!(selected, vec![DeploymentCase::Mocks, DeploymentCase::Random]);
    }

    #[tokio::test]
    async fn test_local_full_run() {
        let workspace = Workspace::new();
        let chain = MockChain::new(LOCAL_CHAIN_ID);
        let images_dir = workspace.images_dir();
        let ctx = DeploymentContext {
            client: &chain,
            profile: lookup(LOCAL_CHAIN_ID).unwrap(),
            environment: EnvironmentClass::Local,
            images_dir: &images_dir,
            content_store: None,
        };

        let mut record = DeploymentRecord::default();
        let deployments_path = workspace.deployments_path();
        run_deployments(&ctx, &tags(&["all"]), &mut record, &deployments_path)
            .await
            .unwrap();

        // The random NFT reuses the mocks deployed by the mocks case
        assert_eq!(
            deployed_names(&chain),
            vec![
                VRF_COORDINATOR_MOCK_CONTRACT,
                PRICE_FEED_MOCK_CONTRACT,
                BASIC_NFT_CONTRACT,
                RANDOM_IPFS_NFT_CONTRACT,
                DYNAMIC_SVG_NFT_CONTRACT,
            ]
        );

        let coordinator = MockChain::deployed_address(0);
        let random_nft = MockChain::deployed_address(3);
        assert_eq!(
            chain.subscription_calls(),
            vec![
                ChainCall::CreateSubscription(coordinator),
                ChainCall::FundSubscription(coordinator, 1, U96::from(SUBSCRIPTION_FUND_AMOUNT)),
                ChainCall::AddConsumer(coordinator, 1, random_nft),
            ]
        );

        let persisted = DeploymentRecord::load(&deployments_path).unwrap();
        assert_eq!(persisted.deployments.len(), 5);
        assert_eq!(persisted.address_of(RANDOM_IPFS_NFT_CONTRACT), Some(random_nft));
    }

    #[tokio::test]
    async fn test_local_random_case() {
        let workspace = Workspace::new();
        let chain = MockChain::new(LOCAL_CHAIN_ID);
        let images_dir = workspace.images_dir();
        let profile = lookup(LOCAL_CHAIN_ID).unwrap();
        let ctx = DeploymentContext {
            client: &chain,
            profile,
            environment: EnvironmentClass::Local,
            images_dir: &images_dir,
            content_store: None,
        };

        let outcome =
            run_case(&ctx, DeploymentCase::Random, &DeploymentRecord::default()).await.unwrap();

        // Mocks, then a single deployment of the NFT
        assert_eq!(outcome.deployed.len(), 3);
        let random_deploys: Vec<ConstructorArgs> = chain
            .deployments()
            .into_iter()
            .filter(|args| args.contract_name() == RANDOM_IPFS_NFT_CONTRACT)
            .collect();
        assert_eq!(random_deploys.len(), 1);

        let ConstructorArgs::RandomIpfsNft(call) = &random_deploys[0] else {
            panic!("expected random IPFS NFT arguments");
        };
        let coordinator = MockChain::deployed_address(0);
        assert_eq!(call.vrfCoordinatorV2, coordinator);
        assert_eq!(call.subscriptionId, 1);
        assert_eq!(call.gasLane, profile.gas_lane);
        assert_eq!(call.callbackGasLimit, profile.callback_gas_limit);
        let default_uris = recorded_token_uris(&DeploymentRecord::default());
        assert_eq!(call.dogTokenUris.to_vec(), default_uris);
        assert_eq!(call.mintFee, profile.mint_fee());

        let consumer = outcome.deployed[2].address;
        assert_eq!(
            chain.subscription_calls().last(),
            Some(&ChainCall::AddConsumer(coordinator, 1, consumer))
        );
    }

    #[tokio::test]
    async fn test_live_random_case() {
        let workspace = Workspace::new();
        let chain = MockChain::new(SEPOLIA_CHAIN_ID);
        let images_dir = workspace.images_dir();
        let ctx = DeploymentContext {
            client: &chain,
            profile: lookup(SEPOLIA_CHAIN_ID).unwrap(),
            environment: EnvironmentClass::Live,
            images_dir: &images_dir,
            content_store: None,
        };

        let mut record = DeploymentRecord::default();
        let deployments_path = workspace.deployments_path();
        run_deployments(&ctx, &tags(&["all"]), &mut record, &deployments_path)
            .await
            .unwrap();

        assert_eq!(
            deployed_names(&chain),
            vec![BASIC_NFT_CONTRACT, RANDOM_IPFS_NFT_CONTRACT, DYNAMIC_SVG_NFT_CONTRACT]
        );
        assert!(chain.subscription_calls().is_empty());

        let deployments = chain.deployments();
        let ConstructorArgs::RandomIpfsNft(call) = &deployments[1] else {
            panic!("expected random IPFS NFT arguments");
        };
        assert_eq!(call.vrfCoordinatorV2, address!("8103B0A8A00be2DDC778e6e7eaa21791Cd364625"));
        assert_eq!(call.subscriptionId, 4707);

        let ConstructorArgs::DynamicSvgNft(call) = &deployments[2] else {
            panic!("expected dynamic SVG NFT arguments");
        };
        assert_eq!(call.priceFeedAddress, address!("694AA1769357215DE4FAC081bf1f309aDC325306"));
        assert_eq!(call.lowSvg, "<svg>frown</svg>");
        assert_eq!(call.highSvg, "<svg>happy</svg>");
    }

    #[tokio::test]
    async fn test_live_missing_config_deploys_nothing() {
        let workspace = Workspace::new();
        let chain = MockChain::new(LOCAL_CHAIN_ID);
        let images_dir = workspace.images_dir();
        let ctx = DeploymentContext {
            client: &chain,
            profile: lookup(LOCAL_CHAIN_ID).unwrap(),
            environment: EnvironmentClass::Live,
            images_dir: &images_dir,
            content_store: None,
        };

        let mut record = DeploymentRecord::default();
        let deployments_path = workspace.deployments_path();
        let err = run_deployments(&ctx, &tags(&["random"]), &mut record, &deployments_path)
            .await
            .unwrap_err();

        assert!(matches!(err, ScriptError::CasesFailed(ref cases) if cases.len() == 1));
        assert!(chain.calls().is_empty());
    }

    #[tokio::test]
    async fn test_mocks_failure_stops_run() {
        let workspace = Workspace::new();
        let chain = MockChain::new(LOCAL_CHAIN_ID).fail_deploy(VRF_COORDINATOR_MOCK_CONTRACT);
        let images_dir = workspace.images_dir();
        let ctx = DeploymentContext {
            client: &chain,
            profile: lookup(LOCAL_CHAIN_ID).unwrap(),
            environment: EnvironmentClass::Local,
            images_dir: &images_dir,
            content_store: None,
        };

        let mut record = DeploymentRecord::default();
        let err = run_deployments(&ctx, &[], &mut record, &workspace.deployments_path())
            .await
            .unwrap_err();

        let ScriptError::CasesFailed(cases) = err else {
            panic!("expected failed cases");
        };
        assert_eq!(cases.len(), 1);
        assert!(cases[0].starts_with("mocks"));
        assert!(chain.calls().is_empty());
    }

    #[tokio::test]
    async fn test_independent_failure_continues() {
        let workspace = Workspace::new();
        let chain = MockChain::new(LOCAL_CHAIN_ID).fail_deploy(BASIC_NFT_CONTRACT);
        let images_dir = workspace.images_dir();
        let ctx = DeploymentContext {
            client: &chain,
            profile: lookup(LOCAL_CHAIN_ID).unwrap(),
            environment: EnvironmentClass::Local,
            images_dir: &images_dir,
            content_store: None,
        };

        let mut record = DeploymentRecord::default();
        let err = run_deployments(&ctx, &[], &mut record, &workspace.deployments_path())
            .await
            .unwrap_err();

        assert!(matches!(err, ScriptError::CasesFailed(ref cases) if cases.len() == 1));
        assert!(record.address_of(RANDOM_IPFS_NFT_CONTRACT).is_some());
        assert!(record.address_of(DYNAMIC_SVG_NFT_CONTRACT).is_some());
        assert!(record.address_of(BASIC_NFT_CONTRACT).is_none());
    }

    #[tokio::test]
    async fn test_published_token_uris_are_used_and_recorded() {
        let workspace = Workspace::new();
        let random_dir = workspace.images_dir().join(RANDOM_NFT_IMAGES_DIR);
        fs::create_dir_all(&random_dir).unwrap();
        for name in ["pug.png", "shiba-inu.png", "st-bernard.png"] {
            fs::write(random_dir.join(name), name).unwrap();
        }

        let chain = MockChain::new(LOCAL_CHAIN_ID);
        let store = MockContentStore::default();
        let images_dir = workspace.images_dir();
        let ctx = DeploymentContext {
            client: &chain,
            profile: lookup(LOCAL_CHAIN_ID).unwrap(),
            environment: EnvironmentClass::Local,
            images_dir: &images_dir,
            content_store: Some(&store),
        };

        let mut record = DeploymentRecord::default();
        let deployments_path = workspace.deployments_path();
        run_deployments(&ctx, &tags(&["random"]), &mut record, &deployments_path)
            .await
            .unwrap();

        let token_uris = record.token_uris.clone().unwrap();
        assert_eq!(token_uris.len(), 3);
        assert!(token_uris.iter().all(|uri| uri.starts_with("ipfs://")));

        let args = chain.deployments().pop().unwrap();
        let ConstructorArgs::RandomIpfsNft(call) = args else {
            panic!("expected random IPFS NFT arguments");
        };
        assert_eq!(call.dogTokenUris.to_vec(), token_uris);
    }

    #[tokio::test]
    async fn test_partial_publish_aborts_random_case() {
        let workspace = Workspace::new();
        let random_dir = workspace.images_dir().join(RANDOM_NFT_IMAGES_DIR);
        fs::create_dir_all(&random_dir).unwrap();
        for name in ["pug.png", "shiba-inu.png", "st-bernard.png"] {
            fs::write(random_dir.join(name), name).unwrap();
        }

        let chain = MockChain::new(LOCAL_CHAIN_ID);
        let store = MockContentStore::default().fail_upload("pug.png");
        let images_dir = workspace.images_dir();
        let ctx = DeploymentContext {
            client: &chain,
            profile: lookup(LOCAL_CHAIN_ID).unwrap(),
            environment: EnvironmentClass::Local,
            images_dir: &images_dir,
            content_store: Some(&store),
        };

        let failure = run_case(&ctx, DeploymentCase::Random, &DeploymentRecord::default())
            .await
            .unwrap_err();

        assert!(matches!(failure.error, ScriptError::CalldataConstruction(_)));
        assert!(failure.deployed.is_empty());
        // Nothing touches the chain before the token URIs are complete
        assert!(chain.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_publish_leaves_later_cases_intact() {
        let workspace = Workspace::new();
        let random_dir = workspace.images_dir().join(RANDOM_NFT_IMAGES_DIR);
        fs::create_dir_all(&random_dir).unwrap();
        for name in ["pug.png", "shiba-inu.png", "st-bernard.png"] {
            fs::write(random_dir.join(name), name).unwrap();
        }

        let chain = MockChain::new(LOCAL_CHAIN_ID);
        let store = MockContentStore::default().fail_upload("pug.png");
        let images_dir = workspace.images_dir();
        let ctx = DeploymentContext {
            client: &chain,
            profile: lookup(LOCAL_CHAIN_ID).unwrap(),
            environment: EnvironmentClass::Local,
            images_dir: &images_dir,
            content_store: Some(&store),
        };

        let mut record = DeploymentRecord::default();
        let deployments_path = workspace.deployments_path();
        let tags = tags(&["random", "dynamic"]);
        let err = run_deployments(&ctx, &tags, &mut record, &deployments_path)
            .await
            .unwrap_err();

        let ScriptError::CasesFailed(cases) = err else {
            panic!("expected failed cases");
        };
        assert_eq!(cases.len(), 1);
        assert!(cases[0].starts_with("random"));

        // Only the dynamic case deploys, and it deploys the mocks exactly once
        assert_eq!(
            deployed_names(&chain),
            vec![
                VRF_COORDINATOR_MOCK_CONTRACT,
                PRICE_FEED_MOCK_CONTRACT,
                DYNAMIC_SVG_NFT_CONTRACT,
            ]
        );
        assert!(chain.subscription_calls().is_empty());

        let persisted = DeploymentRecord::load(&deployments_path).unwrap();
        assert_eq!(
            persisted.address_of(VRF_COORDINATOR_MOCK_CONTRACT),
            Some(MockChain::deployed_address(0))
        );
        assert!(persisted.token_uris.is_none());
    }

    #[tokio::test]
    async fn test_failed_consumer_registration_records_deployments() {
        let workspace = Workspace::new();
        let chain = MockChain::new(LOCAL_CHAIN_ID).fail_add_consumer();
        let images_dir = workspace.images_dir();
        let ctx = DeploymentContext {
            client: &chain,
            profile: lookup(LOCAL_CHAIN_ID).unwrap(),
            environment: EnvironmentClass::Local,
            images_dir: &images_dir,
            content_store: None,
        };

        let mut record = DeploymentRecord::default();
        let deployments_path = workspace.deployments_path();
        let err = run_deployments(&ctx, &tags(&["random"]), &mut record, &deployments_path)
            .await
            .unwrap_err();
        assert!(matches!(err, ScriptError::CasesFailed(ref cases) if cases.len() == 1));

        // The mocks and the NFT are on chain, so they are recorded
        let persisted = DeploymentRecord::load(&deployments_path).unwrap();
        assert_eq!(persisted.deployments.len(), 3);
        assert_eq!(
            persisted.address_of(RANDOM_IPFS_NFT_CONTRACT),
            Some(MockChain::deployed_address(2))
        );
        assert!(persisted.mocks().is_some());
    }

    #[tokio::test]
    async fn test_failed_write_is_reported_and_run_continues() {
        let workspace = Workspace::new();
        let chain = MockChain::new(LOCAL_CHAIN_ID);
        let images_dir = workspace.images_dir();
        let ctx = DeploymentContext {
            client: &chain,
            profile: lookup(LOCAL_CHAIN_ID).unwrap(),
            environment: EnvironmentClass::Local,
            images_dir: &images_dir,
            content_store: None,
        };

        // A directory cannot be written as a file
        let mut record = DeploymentRecord::default();
        let tags = tags(&["basic", "dynamic"]);
        let err = run_deployments(&ctx, &tags, &mut record, &images_dir)
            .await
            .unwrap_err();

        let ScriptError::CasesFailed(cases) = err else {
            panic!("expected failed cases");
        };
        assert_eq!(cases.len(), 2);
        assert!(cases[0].starts_with("basic"));
        assert!(cases[1].starts_with("dynamic"));
        assert!(record.address_of(BASIC_NFT_CONTRACT).is_some());
        assert!(record.address_of(DYNAMIC_SVG_NFT_CONTRACT).is_some());
    }
}
