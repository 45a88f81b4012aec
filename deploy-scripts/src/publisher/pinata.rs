//! A [`ContentStore`] backed by the Pinata pinning service

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, RequestBuilder,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use super::ContentStore;
use crate::{
    constants::{PINATA_API_URL, PINATA_REQUEST_TIMEOUT, PIN_FILE_ENDPOINT, PIN_JSON_ENDPOINT},
    errors::ScriptError,
};

/// The header carrying the Pinata API key
const API_KEY_HEADER: &str = "pinata_api_key";
/// The header carrying the Pinata API secret
const API_SECRET_HEADER: &str = "pinata_secret_api_key";

/// The name a pinned item is listed under
#[derive(Debug, Serialize, PartialEq)]
struct PinataMetadata<'a> {
    /// The listed name
    name: &'a str,
}

/// The response to a pinning request
#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct PinResponse {
    /// The content identifier of the pinned item
    pub ipfs_hash: String,
    /// The size of the pinned item in bytes
    #[serde(default)]
    pub pin_size: u64,
    /// When the item was pinned
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// A client for the Pinata pinning API
pub struct PinataClient {
    /// The HTTP client, with the request timeout applied
    client: Client,
    /// The base URL the pinning endpoints are joined onto
    base: Url,
    /// The API key sent with every request
    api_key: String,
    /// The API secret sent with every request
    api_secret: String,
}

impl PinataClient {
    /// A client for the public Pinata API
    pub fn new(api_key: String, api_secret: String) -> Result<Self, ScriptError> {
        let base = Url::parse(PINATA_API_URL)
            .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
        Self::with_base_url(base, api_key, api_secret)
    }

    /// A client for a Pinata-compatible API at `base`
    pub fn with_base_url(
        base: Url,
        api_key: String,
        api_secret: String,
    ) -> Result<Self, ScriptError> {
        if base.cannot_be_a_base() {
            return Err(ScriptError::ClientInitialization(format!("invalid Pinata URL {base}")));
        }

        let client = Client::builder()
            .timeout(PINATA_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

        Ok(Self {
            client,
            base,
            api_key,
            api_secret,
        })
    }

    /// An authenticated POST request to the given endpoint
    fn post(&self, endpoint: &str) -> Result<RequestBuilder, String> {
        let url = self.base.join(endpoint).map_err(|e| e.to_string())?;
        Ok(self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(API_SECRET_HEADER, &self.api_secret))
    }

    /// Send a pinning request and parse the content identifier from its response
    async fn pin(request: RequestBuilder) -> Result<PinResponse, String> {
        let resp = request.send().await.map_err(|e| e.to_string())?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| e.to_string())?;
        if !status.is_success() {
            return Err(format!("Pinata responded {status}: {body}"));
        }

        serde_json::from_str(&body).map_err(|e| e.to_string())
    }
}

/// The body of a JSON pinning request
fn pin_json_body(document: &Value, name: &str) -> Value {
    json!({
        "pinataContent": document,
        "pinataMetadata": PinataMetadata { name },
    })
}

#[async_trait]
impl ContentStore for PinataClient {
    async fn upload(&self, bytes: Vec<u8>, name: &str) -> Result<String, ScriptError> {
        let err = |e: String| ScriptError::UploadItemFailed(format!("{name}: {e}"));

        let metadata = serde_json::to_string(&PinataMetadata { name })
            .map_err(|e| err(e.to_string()))?;
        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(name.to_string()))
            .text("pinataMetadata", metadata);

        let response = Self::pin(self.post(PIN_FILE_ENDPOINT).map_err(err)?.multipart(form))
            .await
            .map_err(err)?;
        debug!("{name} pinned to IPFS with CID: {}", response.ipfs_hash);

        Ok(response.ipfs_hash)
    }

    async fn upload_json(&self, document: &Value, name: &str) -> Result<String, ScriptError> {
        let err = |e: String| ScriptError::MetadataPublishFailed(format!("{name}: {e}"));

        let body = pin_json_body(document, name);
        let response = Self::pin(self.post(PIN_JSON_ENDPOINT).map_err(err)?.json(&body))
            .await
            .map_err(err)?;
        debug!("{name} pinned to IPFS with CID: {}", response.ipfs_hash);

        Ok(response.ipfs_hash)
    }
}
