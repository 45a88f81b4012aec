//! The chain interactions performed by the deploy scripts
//!
//! [`ChainClient`] is the seam between the orchestration logic and the chain: the
//! orchestrator only ever deploys contracts and drives a VRF coordinator's subscription
//! lifecycle through it. [`AlloyChainClient`] implements it over an `alloy` provider with a
//! local signer.

use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use alloy::{
    contract::{CallBuilder, CallDecoder},
    network::{Ethereum, TransactionBuilder},
    primitives::{aliases::U96, Address, Log, TxHash, I256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{TransactionReceipt, TransactionRequest},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::{
    artifacts::ContractArtifact,
    constants::{RECEIPT_POLL_ATTEMPTS, RECEIPT_POLL_INTERVAL},
    constructor_args::ConstructorArgs,
    errors::ScriptError,
    solidity::{AggregatorV3Interface, VRFCoordinatorV2Mock},
    types::DeployedContract,
};

/// The provider type used by the scripts
pub type Wallet = DynProvider<Ethereum>;

/// The call builder type used by the scripts
pub type ScriptCallBuilder<'a, C> = CallBuilder<&'a Wallet, C, Ethereum>;

/// The chain operations the orchestrator depends on
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// The id of the connected chain
    async fn chain_id(&self) -> Result<u64, ScriptError>;

    /// Deploy the contract the given arguments construct
    async fn deploy(&self, args: &ConstructorArgs) -> Result<DeployedContract, ScriptError>;

    /// Create a subscription on the given coordinator, returning every log emitted by the
    /// creation transaction
    async fn create_subscription(&self, coordinator: Address) -> Result<Vec<Log>, ScriptError>;

    /// Fund a subscription on the given coordinator
    async fn fund_subscription(
        &self,
        coordinator: Address,
        subscription_id: u64,
        amount: U96,
    ) -> Result<(), ScriptError>;

    /// The current balance of a subscription on the given coordinator
    async fn subscription_balance(
        &self,
        coordinator: Address,
        subscription_id: u64,
    ) -> Result<U96, ScriptError>;

    /// Authorize a consumer contract to request randomness through a subscription
    async fn add_consumer(
        &self,
        coordinator: Address,
        subscription_id: u64,
        consumer: Address,
    ) -> Result<(), ScriptError>;
}

/// A [`ChainClient`] backed by an `alloy` provider with a local signer
#[derive(Clone)]
pub struct AlloyChainClient {
    /// The signing provider
    provider: Wallet,
    /// The directory holding the compiled contract artifacts
    artifacts_dir: PathBuf,
}

/// Sets up the signing client with which contracts are deployed and called
pub fn setup_client(
    priv_key: &str,
    rpc_url: &str,
    artifacts_dir: &Path,
) -> Result<AlloyChainClient, ScriptError> {
    let url = Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let signer = PrivateKeySigner::from_str(priv_key)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

    debug!(deployer = %signer.address(), %url, "connecting deployer");
    let provider = ProviderBuilder::new()
        .wallet(signer)
        .with_simple_nonce_management()
        .connect_http(url);

    Ok(AlloyChainClient {
        provider: DynProvider::new(provider),
        artifacts_dir: artifacts_dir.to_path_buf(),
    })
}

impl AlloyChainClient {
    /// Read the decimals and latest answer of a price feed
    pub async fn latest_price(&self, price_feed: Address) -> Result<(u8, I256), ScriptError> {
        let feed = AggregatorV3Interface::new(price_feed, self.provider.clone());

        let decimals = feed
            .decimals()
            .call()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        let round = feed
            .latestRoundData()
            .call()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

        Ok((decimals, round.answer))
    }

    /// Send a contract call and wait for its receipt, failing if it reverted
    async fn send_tx<C: CallDecoder>(
        &self,
        tx: ScriptCallBuilder<'_, C>,
    ) -> Result<TransactionReceipt, String> {
        let pending_tx = tx.send().await.map_err(|e| format!("pending tx error: {e}"))?;
        let receipt = self.wait_for_receipt(*pending_tx.tx_hash()).await?;
        if !receipt.status() {
            return Err(format!("tx {:#x} reverted", receipt.transaction_hash));
        }

        Ok(receipt)
    }

    /// Poll for a transaction receipt
    ///
    /// Watching the pending transaction directly is unreliable on some nodes, so the receipt
    /// is fetched explicitly. Running out of attempts is a failure of the transaction; it is
    /// never re-sent.
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TransactionReceipt, String> {
        for _ in 0..RECEIPT_POLL_ATTEMPTS {
            match self.provider.get_transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => return Ok(receipt),
                Ok(None) => {}
                Err(e) => warn!("error fetching receipt for {tx_hash:#x}: {e}"),
            }
            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }

        Err(format!("no receipt found for {tx_hash:#x} after {RECEIPT_POLL_ATTEMPTS} attempts"))
    }
}

#[async_trait]
impl ChainClient for AlloyChainClient {
    async fn chain_id(&self) -> Result<u64, ScriptError> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| ScriptError::ClientInitialization(e.to_string()))
    }

    async fn deploy(&self, args: &ConstructorArgs) -> Result<DeployedContract, ScriptError> {
        let name = args.contract_name();
        let artifact = ContractArtifact::load(&self.artifacts_dir, name)?;

        // The typed arguments must match the compiled constructor
        let expected = artifact.constructor_signature();
        if expected != args.signature() {
            return Err(ScriptError::CalldataConstruction(format!(
                "{} constructor takes {}, arguments are {}",
                name,
                expected,
                args.signature()
            )));
        }

        let mut creation_code = artifact.bytecode.to_vec();
        creation_code.extend(args.abi_encode());
        let tx = TransactionRequest::default().with_deploy_code(creation_code);

        let pending_tx = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| ScriptError::DeployFailed(format!("{name}: {e}")))?;
        let receipt = self
            .wait_for_receipt(*pending_tx.tx_hash())
            .await
            .map_err(|e| ScriptError::DeployFailed(format!("{name}: {e}")))?;

        if !receipt.status() {
            return Err(ScriptError::DeployFailed(format!(
                "{name}: tx {:#x} reverted",
                receipt.transaction_hash
            )));
        }
        let address = receipt.contract_address.ok_or_else(|| {
            ScriptError::DeployFailed(format!("{name}: receipt has no contract address"))
        })?;

        Ok(DeployedContract {
            name: name.to_string(),
            address,
            tx_hash: receipt.transaction_hash,
        })
    }

    async fn create_subscription(&self, coordinator: Address) -> Result<Vec<Log>, ScriptError> {
        let coordinator = VRFCoordinatorV2Mock::new(coordinator, self.provider.clone());
        let receipt = self
            .send_tx(coordinator.createSubscription())
            .await
            .map_err(ScriptError::SubscriptionCreationFailed)?;

        Ok(receipt.logs().iter().map(|log| log.inner.clone()).collect())
    }

    async fn fund_subscription(
        &self,
        coordinator: Address,
        subscription_id: u64,
        amount: U96,
    ) -> Result<(), ScriptError> {
        let coordinator = VRFCoordinatorV2Mock::new(coordinator, self.provider.clone());
        self.send_tx(coordinator.fundSubscription(subscription_id, amount))
            .await
            .map_err(ScriptError::SubscriptionFundingFailed)?;

        Ok(())
    }

    async fn subscription_balance(
        &self,
        coordinator: Address,
        subscription_id: u64,
    ) -> Result<U96, ScriptError> {
        let coordinator = VRFCoordinatorV2Mock::new(coordinator, self.provider.clone());
        let subscription = coordinator
            .getSubscription(subscription_id)
            .call()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

        Ok(subscription.balance)
    }

    async fn add_consumer(
        &self,
        coordinator: Address,
        subscription_id: u64,
        consumer: Address,
    ) -> Result<(), ScriptError> {
        let coordinator = VRFCoordinatorV2Mock::new(coordinator, self.provider.clone());
        self.send_tx(coordinator.addConsumer(subscription_id, consumer))
            .await
            .map_err(ScriptError::ContractInteraction)?;

        Ok(())
    }
}
