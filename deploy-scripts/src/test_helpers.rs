//! In-memory stand-ins for the chain and the content store

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use alloy::{
    hex,
    primitives::{aliases::U96, keccak256, Address, Log, LogData, TxHash, B256},
    sol_types::SolEvent,
};
use async_trait::async_trait;
use serde_json::Value;

use crate::{
    client::ChainClient,
    constructor_args::ConstructorArgs,
    errors::ScriptError,
    publisher::ContentStore,
    solidity::VRFCoordinatorV2Mock,
    types::DeployedContract,
};

/// A chain operation performed against a [`MockChain`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainCall {
    /// A contract deployment
    Deploy(ConstructorArgs),
    /// A subscription created on a coordinator
    CreateSubscription(Address),
    /// A subscription funded with an amount
    FundSubscription(Address, u64, U96),
    /// A consumer added to a subscription
    AddConsumer(Address, u64, Address),
}

/// The mutable state of a [`MockChain`]
#[derive(Default)]
struct MockChainState {
    /// Every call made, in order
    calls: Vec<ChainCall>,
    /// Subscription balances by id
    balances: HashMap<u64, U96>,
    /// The id of the last subscription created
    next_subscription: u64,
}

/// A [`ChainClient`] that records every call and deploys to sequential addresses
pub struct MockChain {
    /// The reported chain id
    chain_id: u64,
    /// The contracts whose deployment fails
    failing_deploys: HashSet<&'static str>,
    /// Whether creation receipts carry the `SubscriptionCreated` event
    emit_subscription_event: bool,
    /// Whether funding reverts
    fail_funding: bool,
    /// Whether adding a consumer reverts
    fail_add_consumer: bool,
    /// The recorded calls and balances
    state: Mutex<MockChainState>,
}

impl MockChain {
    /// A chain reporting the given id, on which every call succeeds
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            failing_deploys: HashSet::new(),
            emit_subscription_event: true,
            fail_funding: false,
            fail_add_consumer: false,
            state: Mutex::new(MockChainState::default()),
        }
    }

    /// Fail deployments of the named contract
    pub fn fail_deploy(mut self, contract_name: &'static str) -> Self {
        self.failing_deploys.insert(contract_name);
        self
    }

    /// Omit the `SubscriptionCreated` event from subscription creation receipts
    pub fn without_subscription_event(mut self) -> Self {
        self.emit_subscription_event = false;
        self
    }

    /// Revert subscription funding transactions
    pub fn fail_funding(mut self) -> Self {
        self.fail_funding = true;
        self
    }

    /// Revert consumer registrations
    pub fn fail_add_consumer(mut self) -> Self {
        self.fail_add_consumer = true;
        self
    }

    /// Every call made, in order
    pub fn calls(&self) -> Vec<ChainCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// The arguments of every deployment, in order
    pub fn deployments(&self) -> Vec<ConstructorArgs> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ChainCall::Deploy(args) => Some(args),
                _ => None,
            })
            .collect()
    }

    /// The calls other than deployments, in order
    pub fn subscription_calls(&self) -> Vec<ChainCall> {
        self.calls().into_iter().filter(|call| !matches!(call, ChainCall::Deploy(_))).collect()
    }

    /// The address the `n`th deployment (from zero) lands at
    pub fn deployed_address(n: usize) -> Address {
        Address::with_last_byte(n as u8 + 1)
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn chain_id(&self) -> Result<u64, ScriptError> {
        Ok(self.chain_id)
    }

    async fn deploy(&self, args: &ConstructorArgs) -> Result<DeployedContract, ScriptError> {
        let mut state = self.state.lock().unwrap();
        if self.failing_deploys.contains(args.contract_name()) {
            return Err(ScriptError::DeployFailed(format!("{}: reverted", args.contract_name())));
        }

        let n = state.calls.iter().filter(|call| matches!(call, ChainCall::Deploy(_))).count();
        state.calls.push(ChainCall::Deploy(args.clone()));

        Ok(DeployedContract {
            name: args.contract_name().to_string(),
            address: Self::deployed_address(n),
            tx_hash: TxHash::with_last_byte(n as u8 + 1),
        })
    }

    async fn create_subscription(&self, coordinator: Address) -> Result<Vec<Log>, ScriptError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ChainCall::CreateSubscription(coordinator));
        state.next_subscription += 1;
        let subscription_id = state.next_subscription;
        state.balances.insert(subscription_id, U96::ZERO);

        // An unrelated log precedes the creation event
        let mut logs = vec![Log {
            address: coordinator,
            data: LogData::new_unchecked(vec![B256::repeat_byte(0xaa)], Default::default()),
        }];
        if self.emit_subscription_event {
            let event = VRFCoordinatorV2Mock::SubscriptionCreated {
                subId: subscription_id,
                owner: Address::repeat_byte(0xde),
            };
            logs.push(Log {
                address: coordinator,
                data: event.encode_log_data(),
            });
        }

        Ok(logs)
    }

    async fn fund_subscription(
        &self,
        coordinator: Address,
        subscription_id: u64,
        amount: U96,
    ) -> Result<(), ScriptError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ChainCall::FundSubscription(coordinator, subscription_id, amount));
        if self.fail_funding {
            return Err(ScriptError::SubscriptionFundingFailed("reverted".to_string()));
        }

        let balance = state.balances.entry(subscription_id).or_default();
        *balance += amount;
        Ok(())
    }

    async fn subscription_balance(
        &self,
        _coordinator: Address,
        subscription_id: u64,
    ) -> Result<U96, ScriptError> {
        let state = self.state.lock().unwrap();
        Ok(state.balances.get(&subscription_id).copied().unwrap_or_default())
    }

    async fn add_consumer(
        &self,
        coordinator: Address,
        subscription_id: u64,
        consumer: Address,
    ) -> Result<(), ScriptError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ChainCall::AddConsumer(coordinator, subscription_id, consumer));
        if self.fail_add_consumer {
            return Err(ScriptError::ContractInteraction("addConsumer reverted".to_string()));
        }
        Ok(())
    }
}

/// A [`ContentStore`] holding content in memory, addressed by its hash
#[derive(Clone, Default)]
pub struct MockContentStore {
    /// The names whose uploads fail
    failing_names: Arc<HashSet<String>>,
    /// The stored content by identifier
    content: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MockContentStore {
    /// Fail uploads made under the given name
    pub fn fail_upload(mut self, name: &str) -> Self {
        Arc::make_mut(&mut self.failing_names).insert(name.to_string());
        self
    }

    /// The content stored under a content identifier
    pub fn get(&self, cid: &str) -> Option<Vec<u8>> {
        self.content.lock().unwrap().get(cid).cloned()
    }

    /// Store content under its hash, unless the name is set to fail
    fn store(&self, bytes: Vec<u8>, name: &str) -> Result<String, String> {
        if self.failing_names.contains(name) {
            return Err(format!("{name}: connection reset"));
        }

        let cid = format!("Qm{}", hex::encode(&keccak256(&bytes)[..16]));
        self.content.lock().unwrap().insert(cid.clone(), bytes);
        Ok(cid)
    }
}

#[async_trait]
impl ContentStore for MockContentStore {
    async fn upload(&self, bytes: Vec<u8>, name: &str) -> Result<String, ScriptError> {
        self.store(bytes, name).map_err(ScriptError::UploadItemFailed)
    }

    async fn upload_json(&self, document: &Value, name: &str) -> Result<String, ScriptError> {
        let bytes = serde_json::to_vec(document)
            .map_err(|e| ScriptError::MetadataPublishFailed(e.to_string()))?;
        self.store(bytes, name).map_err(ScriptError::MetadataPublishFailed)
    }
}
