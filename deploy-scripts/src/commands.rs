//! Implementations of the various deploy scripts

use std::{path::Path, str::FromStr};

use alloy::primitives::Address;
use tracing::info;

use crate::{
    cli::{DeployArgs, QueryPriceFeedArgs, UploadAssetsArgs},
    client::{AlloyChainClient, ChainClient},
    constants::{NUM_TOKEN_URIS, PRICE_FEED_MOCK_CONTRACT, RANDOM_NFT_IMAGES_DIR},
    deployments::DeploymentRecord,
    errors::ScriptError,
    network_config::{classify_chain, ChainProfile, EnvironmentClass},
    orchestrator::{run_deployments, DeploymentContext},
    publisher::{AssetPublisher, ContentStore},
};

/// Look up the connected chain's profile and classify its environment
async fn target_chain(
    client: &AlloyChainClient,
    network: Option<&str>,
) -> Result<(&'static ChainProfile, EnvironmentClass), ScriptError> {
    let chain_id = client.chain_id().await?;
    let (profile, environment) = classify_chain(chain_id, network)?;

    info!(chain_id, network = profile.name, ?environment, "connected to target chain");
    Ok((profile, environment))
}

/// Run the deployment cases selected by the given tags
pub async fn deploy(
    args: &DeployArgs,
    client: &AlloyChainClient,
    network: Option<&str>,
    deployments_path: &Path,
) -> Result<(), ScriptError> {
    let (profile, environment) = target_chain(client, network).await?;
    let mut record =
        DeploymentRecord::load_for_run(deployments_path, profile.chain_id, environment)?;

    let pinata = if args.upload_to_pinata {
        Some(args.pinata.client()?)
    } else {
        None
    };
    let ctx = DeploymentContext {
        client,
        profile,
        environment,
        images_dir: &args.images_dir,
        content_store: pinata.as_ref().map(|store| store as &dyn ContentStore),
    };

    run_deployments(&ctx, &args.tags, &mut record, deployments_path).await?;
    info!("deployments recorded in {}", deployments_path.display());

    Ok(())
}

/// Publish the random NFT images and metadata, recording the resulting token URIs
pub async fn upload_assets(
    args: &UploadAssetsArgs,
    deployments_path: &Path,
) -> Result<(), ScriptError> {
    let publisher = AssetPublisher::new(args.pinata.client()?);
    let report =
        publisher.publish_token_uris(&args.images_dir.join(RANDOM_NFT_IMAGES_DIR)).await?;

    let skipped = report.upload_failures.len() + report.metadata_failures.len();
    let published = report.token_uris.len();
    info!(published, skipped, "published token URIs");
    for uri in &report.token_uris {
        println!("{uri}");
    }

    let mut record = DeploymentRecord::load(deployments_path)?;
    if !record.record_token_uris(report.token_uris) {
        return Err(ScriptError::CalldataConstruction(format!(
            "published {} of {} token URIs, keeping the recorded list",
            published, NUM_TOKEN_URIS
        )));
    }
    record.persist(deployments_path)
}

/// Read the decimals and latest answer of a price feed
pub async fn query_price_feed(
    args: &QueryPriceFeedArgs,
    client: &AlloyChainClient,
    network: Option<&str>,
    deployments_path: &Path,
) -> Result<(), ScriptError> {
    let price_feed = match &args.price_feed {
        Some(address) => Address::from_str(address)
            .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))?,
        None => default_price_feed(client, network, deployments_path).await?,
    };

    let (decimals, answer) = client.latest_price(price_feed).await?;
    info!(%price_feed, decimals, %answer, "latest price feed answer");

    Ok(())
}

/// The network's ETH / USD price feed, or the mock recorded for a development chain
async fn default_price_feed(
    client: &AlloyChainClient,
    network: Option<&str>,
    deployments_path: &Path,
) -> Result<Address, ScriptError> {
    let (profile, environment) = target_chain(client, network).await?;
    if !environment.is_local() {
        return profile.require_price_feed();
    }

    DeploymentRecord::load(deployments_path)?
        .address_of(PRICE_FEED_MOCK_CONTRACT)
        .ok_or_else(|| {
            ScriptError::ContractInteraction(format!(
                "no {PRICE_FEED_MOCK_CONTRACT} recorded in {}",
                deployments_path.display()
            ))
        })
}
