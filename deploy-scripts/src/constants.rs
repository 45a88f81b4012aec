//! Constants used in the deploy scripts

use std::time::Duration;

// ---------
// | Mocks |
// ---------

/// The premium charged by the mock VRF coordinator per request, 0.25 LINK
pub const VRF_MOCK_BASE_FEE: u128 = 250_000_000_000_000_000;

/// The LINK-denominated gas price used by the mock VRF coordinator
pub const VRF_MOCK_GAS_PRICE_LINK: u128 = 1_000_000_000;

/// The number of decimals reported by the mock price feed
pub const PRICE_FEED_MOCK_DECIMALS: u8 = 18;

/// The initial answer of the mock price feed, 2000 with 18 decimals
pub const PRICE_FEED_MOCK_INITIAL_ANSWER: u128 = 2_000_000_000_000_000_000_000;

/// The amount with which a freshly created local subscription is funded, 10 LINK
pub const SUBSCRIPTION_FUND_AMOUNT: u128 = 10_000_000_000_000_000_000;

// ------------
// | Networks |
// ------------

/// The names of chains on which dependencies are mocked instead of read from the
/// network config
pub const DEVELOPMENT_CHAINS: [&str; 2] = ["hardhat", "localhost"];

/// The chain id of the local hardhat / anvil node
pub const LOCAL_CHAIN_ID: u64 = 31337;

/// The chain id of the Sepolia testnet
pub const SEPOLIA_CHAIN_ID: u64 = 11155111;

/// The callback gas limit shared by the configured networks
pub const DEFAULT_CALLBACK_GAS_LIMIT: u32 = 500_000;

/// The upkeep interval, in seconds, shared by the configured networks
pub const DEFAULT_INTERVAL: u64 = 30;

/// The mint fee shared by the configured networks, 0.1 ETH
pub const DEFAULT_MINT_FEE: u128 = 100_000_000_000_000_000;

// -------------
// | Contracts |
// -------------

/// The name of the mock VRF coordinator artifact
pub const VRF_COORDINATOR_MOCK_CONTRACT: &str = "VRFCoordinatorV2Mock";

/// The name of the mock price feed artifact
pub const PRICE_FEED_MOCK_CONTRACT: &str = "MockV3Aggregator";

/// The name of the basic NFT artifact
pub const BASIC_NFT_CONTRACT: &str = "BasicNft";

/// The name of the random IPFS NFT artifact
pub const RANDOM_IPFS_NFT_CONTRACT: &str = "RandomIpfsNft";

/// The name of the dynamic SVG NFT artifact
pub const DYNAMIC_SVG_NFT_CONTRACT: &str = "DynamicSvgNft";

/// The number of token URIs the random IPFS NFT is constructed with
pub const NUM_TOKEN_URIS: usize = 3;

/// The token URIs used when assets are not re-published
pub const DEFAULT_TOKEN_URIS: [&str; NUM_TOKEN_URIS] = [
    "ipfs://QmaVkBn2tKmjbhphU7eyztbvSQU5EXDdqRyXZtRhSGgJGo",
    "ipfs://QmYQC5aGZu2PTH8XzbJrbDnvhj3gVs7ya33H9mqUNvST3d",
    "ipfs://QmZYmH5iDbD6v3U2ixoVAjioSzvWJszDzYdbeCLquGSpVm",
];

// ----------
// | Assets |
// ----------

/// The directory, relative to the images directory, holding the random NFT images
pub const RANDOM_NFT_IMAGES_DIR: &str = "randomNft";

/// The directory, relative to the images directory, holding the dynamic NFT SVGs
pub const DYNAMIC_NFT_IMAGES_DIR: &str = "dynamicNft";

/// The SVG shown by the dynamic NFT when the price is below its threshold
pub const LOW_SVG_FILE: &str = "frown.svg";

/// The SVG shown by the dynamic NFT when the price is at or above its threshold
pub const HIGH_SVG_FILE: &str = "happy.svg";

/// The URI scheme of content identifiers
pub const IPFS_SCHEME: &str = "ipfs";

/// The trait type of the single attribute in every metadata document
pub const METADATA_TRAIT_TYPE: &str = "Cuteness";

/// The value of the single attribute in every metadata document
pub const METADATA_TRAIT_VALUE: u64 = 100;

/// The suffix appended to a metadata document's name when it is pinned
pub const METADATA_FILE_SUFFIX: &str = "-metadata.json";

/// The maximum number of asset uploads in flight at once
pub const MAX_CONCURRENT_UPLOADS: usize = 4;

// ----------
// | Pinata |
// ----------

/// The base URL of the Pinata pinning API
pub const PINATA_API_URL: &str = "https://api.pinata.cloud/";

/// The Pinata endpoint pinning a file
pub const PIN_FILE_ENDPOINT: &str = "pinning/pinFileToIPFS";

/// The Pinata endpoint pinning a JSON document
pub const PIN_JSON_ENDPOINT: &str = "pinning/pinJSONToIPFS";

/// The timeout applied to each request to the pinning API
pub const PINATA_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// ------------
// | Receipts |
// ------------

/// The number of times to poll for a transaction receipt
pub const RECEIPT_POLL_ATTEMPTS: usize = 120;

/// The interval between receipt polls
pub const RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(500);
