//! Publishing of NFT images and their token metadata to IPFS
//!
//! Publishing runs in two phases. The first uploads every file in a directory and yields
//! an [`AssetRecord`] per successful upload; the second builds a [`MetadataDocument`] for
//! each record and publishes it, yielding the token URIs the NFT contract is constructed
//! with. A failure of a single item in either phase is logged and the item is skipped.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::{stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    constants::{
        IPFS_SCHEME, MAX_CONCURRENT_UPLOADS, METADATA_FILE_SUFFIX, METADATA_TRAIT_TYPE,
        METADATA_TRAIT_VALUE,
    },
    errors::ScriptError,
};

pub mod pinata;

/// A content-addressed storage network
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Upload raw bytes under the given name, returning their content identifier
    async fn upload(&self, bytes: Vec<u8>, name: &str) -> Result<String, ScriptError>;

    /// Upload a JSON document under the given name, returning its content identifier
    async fn upload_json(&self, document: &Value, name: &str) -> Result<String, ScriptError>;
}

#[async_trait]
impl<T: ContentStore + ?Sized> ContentStore for &T {
    async fn upload(&self, bytes: Vec<u8>, name: &str) -> Result<String, ScriptError> {
        (**self).upload(bytes, name).await
    }

    async fn upload_json(&self, document: &Value, name: &str) -> Result<String, ScriptError> {
        (**self).upload_json(document, name).await
    }
}

/// An uploaded file and its content identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    /// The name of the uploaded file
    pub file_name: String,
    /// The content identifier of the file
    pub cid: String,
}

impl AssetRecord {
    /// The `ipfs://` URI of the uploaded file
    pub fn uri(&self) -> String {
        content_uri(&self.cid)
    }

    /// The file name with its extension stripped, e.g. `st-bernard` for `st-bernard.png`
    pub fn base_name(&self) -> String {
        Path::new(&self.file_name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file_name.clone())
    }
}

/// A single token attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// The attribute name
    pub trait_type: String,
    /// The attribute value
    pub value: u64,
}

/// The token metadata published for an uploaded image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataDocument {
    /// The token name
    pub name: String,
    /// The token description
    pub description: String,
    /// The URI of the token image
    pub image: String,
    /// The token attributes
    pub attributes: Vec<Attribute>,
}

impl MetadataDocument {
    /// Build the metadata document describing an uploaded image
    pub fn for_asset(record: &AssetRecord) -> Self {
        let name = record.base_name();
        Self {
            description: format!("An adorable {name} pup!"),
            image: record.uri(),
            attributes: vec![Attribute {
                trait_type: METADATA_TRAIT_TYPE.to_string(),
                value: METADATA_TRAIT_VALUE,
            }],
            name,
        }
    }

    /// The name the document is pinned under
    pub fn pin_name(&self) -> String {
        format!("{}{}", self.name, METADATA_FILE_SUFFIX)
    }
}

/// An item that was skipped because it failed to publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishFailure {
    /// The name of the skipped file or document
    pub item: String,
    /// The cause of the failure
    pub error: ScriptError,
}

/// The outcome of publishing a directory of images
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// The token URIs of every metadata document that published, in file order
    pub token_uris: Vec<String>,
    /// The files that failed to upload
    pub upload_failures: Vec<PublishFailure>,
    /// The metadata documents that failed to publish
    pub metadata_failures: Vec<PublishFailure>,
}

/// Publishes images and token metadata to a [`ContentStore`]
pub struct AssetPublisher<S> {
    /// The store content is published to
    store: S,
}

impl<S: ContentStore> AssetPublisher<S> {
    /// Constructor
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Upload every file in `dir`, in directory enumeration order
    ///
    /// Returns a record for each file that uploaded, in the order the files were
    /// enumerated, alongside the files that failed. Only a failure to read the directory
    /// itself is an error.
    pub async fn publish_assets(
        &self,
        dir: &Path,
    ) -> Result<(Vec<AssetRecord>, Vec<PublishFailure>), ScriptError> {
        let files = list_files(dir)?;
        info!("Uploading {} files from {} to IPFS...", files.len(), dir.display());

        // `buffered` yields results in the order the uploads were started
        let results: Vec<(String, Result<String, ScriptError>)> = stream::iter(files)
            .map(|(file_name, path)| async move {
                info!("Uploading {file_name}...");
                let result = self.upload_file(&path, &file_name).await;
                (file_name, result)
            })
            .buffered(MAX_CONCURRENT_UPLOADS)
            .collect()
            .await;

        let mut records = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for (file_name, result) in results {
            match result {
                Ok(cid) => records.push(AssetRecord { file_name, cid }),
                Err(error) => {
                    warn!(file = %file_name, %error, "upload failed, skipping");
                    failures.push(PublishFailure {
                        item: file_name,
                        error,
                    });
                }
            }
        }

        Ok((records, failures))
    }

    /// Publish a metadata document, returning its content identifier
    pub async fn publish_metadata(
        &self,
        document: &MetadataDocument,
    ) -> Result<String, ScriptError> {
        let value = serde_json::to_value(document)
            .map_err(|e| ScriptError::MetadataPublishFailed(e.to_string()))?;
        self.store.upload_json(&value, &document.pin_name()).await
    }

    /// Publish the images in `dir` and a metadata document for each of them
    pub async fn publish_token_uris(&self, dir: &Path) -> Result<PublishReport, ScriptError> {
        let (records, upload_failures) = self.publish_assets(dir).await?;

        let mut token_uris = Vec::with_capacity(records.len());
        let mut metadata_failures = Vec::new();
        for record in &records {
            let document = MetadataDocument::for_asset(record);
            info!("Uploading {} metadata...", document.name);

            match self.publish_metadata(&document).await {
                Ok(cid) => token_uris.push(content_uri(&cid)),
                Err(error) => {
                    warn!(name = %document.name, %error, "failed to upload metadata, skipping");
                    metadata_failures.push(PublishFailure {
                        item: document.name,
                        error,
                    });
                }
            }
        }

        info!("Token URIs uploaded: {token_uris:?}");
        Ok(PublishReport {
            token_uris,
            upload_failures,
            metadata_failures,
        })
    }

    /// Read a file and upload it under its name
    async fn upload_file(&self, path: &Path, file_name: &str) -> Result<String, ScriptError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ScriptError::UploadItemFailed(format!("{file_name}: {e}")))?;
        self.store.upload(bytes, file_name).await
    }
}

/// The `ipfs://` URI of a content identifier
pub fn content_uri(cid: &str) -> String {
    format!("{IPFS_SCHEME}://{cid}")
}

/// The regular files in `dir`, in directory enumeration order
fn list_files(dir: &Path) -> Result<Vec<(String, PathBuf)>, ScriptError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| ScriptError::ReadFile(format!("{}: {e}", dir.display())))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ScriptError::ReadFile(e.to_string()))?.path();
        if !path.is_file() {
            continue;
        }

        match path.file_name().and_then(|name| name.to_str()) {
            Some(name) => files.push((name.to_string(), path.clone())),
            None => warn!("skipping file with non UTF-8 name: {}", path.display()),
        }
    }

    Ok(files)
}
