//! Definitions of CLI arguments and commands for deploy scripts

use std::path::PathBuf;

use clap::{builder::FalseyValueParser, Args, Parser, Subcommand};

use crate::{
    client::{setup_client, AlloyChainClient},
    commands::{deploy, query_price_feed, upload_assets},
    errors::ScriptError,
    publisher::pinata::PinataClient,
};

/// Deploy the NFT contracts and their dependencies to an EVM chain
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Private key of the deployer
    #[arg(short, long, env = "PKEY")]
    pub priv_key: Option<String>,

    /// Network RPC URL
    #[arg(short, long, env = "RPC_URL", default_value = "http://127.0.0.1:8545")]
    pub rpc_url: String,

    /// Path to the file in which deployed addresses are recorded
    #[arg(short, long, default_value = "deployments.json")]
    pub deployments_path: PathBuf,

    /// Directory holding the compiled contract artifacts
    #[arg(short, long, default_value = "artifacts")]
    pub artifacts_dir: PathBuf,

    /// Name of the target network, overriding the name in its network config.
    /// `hardhat` and `localhost` are treated as development chains.
    #[arg(short, long)]
    pub network: Option<String>,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Set up the signing client for the configured chain
    pub fn client(&self) -> Result<AlloyChainClient, ScriptError> {
        let priv_key = self.priv_key.as_deref().ok_or_else(|| {
            ScriptError::ClientInitialization("no deployer private key provided".to_string())
        })?;
        setup_client(priv_key, &self.rpc_url, &self.artifacts_dir)
    }
}

/// The deploy script commands
#[derive(Subcommand)]
pub enum Command {
    /// Deploy the contracts selected by the given tags
    Deploy(DeployArgs),
    /// Publish the random NFT images and metadata to IPFS
    UploadAssets(UploadAssetsArgs),
    /// Read the latest answer of a price feed
    QueryPriceFeed(QueryPriceFeedArgs),
}

impl Command {
    /// Run the command
    pub async fn run(&self, cli: &Cli) -> Result<(), ScriptError> {
        match self {
            Command::Deploy(args) => {
                let client = cli.client()?;
                deploy(args, &client, cli.network.as_deref(), &cli.deployments_path).await
            }
            Command::UploadAssets(args) => upload_assets(args, &cli.deployments_path).await,
            Command::QueryPriceFeed(args) => {
                let client = cli.client()?;
                query_price_feed(args, &client, cli.network.as_deref(), &cli.deployments_path)
                    .await
            }
        }
    }
}

/// Credentials for the Pinata pinning API
#[derive(Args, Clone)]
pub struct PinataArgs {
    /// Pinata API key
    #[arg(long, env = "PINATA_API_KEY")]
    pub pinata_api_key: Option<String>,

    /// Pinata API secret
    #[arg(long, env = "PINATA_API_SECRET")]
    pub pinata_api_secret: Option<String>,
}

impl PinataArgs {
    /// Build a Pinata client from the credentials
    pub fn client(&self) -> Result<PinataClient, ScriptError> {
        match (&self.pinata_api_key, &self.pinata_api_secret) {
            (Some(key), Some(secret)) => PinataClient::new(key.clone(), secret.clone()),
            _ => Err(ScriptError::ClientInitialization(
                "PINATA_API_KEY and PINATA_API_SECRET must both be set".to_string(),
            )),
        }
    }
}

/// Deploy the NFT contracts
///
/// Cases run in a fixed order: `mocks`, `basic`, `random`, `dynamic`. Every case carries
/// the `all` tag and a tag of its own name.
#[derive(Args)]
pub struct DeployArgs {
    /// Tags selecting the cases to run, all cases if none are given
    #[arg(short, long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Directory holding the NFT images
    #[arg(short, long, default_value = "images")]
    pub images_dir: PathBuf,

    /// Re-publish the random NFT images and metadata instead of reusing recorded token URIs.
    /// Values such as `0`, `false` or `no` leave it off.
    #[arg(long, env = "UPLOAD_TO_PINATA", value_parser = FalseyValueParser::new())]
    pub upload_to_pinata: bool,

    /// Pinata credentials
    #[command(flatten)]
    pub pinata: PinataArgs,
}

/// Publish the random NFT images and metadata, recording the resulting token URIs
#[derive(Args)]
pub struct UploadAssetsArgs {
    /// Directory holding the NFT images
    #[arg(short, long, default_value = "images")]
    pub images_dir: PathBuf,

    /// Pinata credentials
    #[command(flatten)]
    pub pinata: PinataArgs,
}

/// Read the decimals and latest answer of a price feed
#[derive(Args)]
pub struct QueryPriceFeedArgs {
    /// Address of the price feed, defaults to the network's ETH / USD feed
    #[arg(long)]
    pub price_feed: Option<String>,
}
