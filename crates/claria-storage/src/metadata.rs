use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use aws_sdk_s3::Client;
use claria_core::models::metadata::ReportMetadata;
use claria_core::s3_keys;

use crate::error::StorageError;
use crate::{blob, client};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Opaque per-report metadata storage.
///
/// `load` of a report that was never saved returns an empty blob.
pub trait MetadataStore: Send + Sync {
    fn load<'a>(&'a self, report_id: &'a str)
    -> BoxFuture<'a, Result<ReportMetadata, StorageError>>;

    fn save<'a>(
        &'a self,
        report_id: &'a str,
        metadata: &'a ReportMetadata,
    ) -> BoxFuture<'a, Result<(), StorageError>>;
}

/// Metadata blobs stored as JSON objects at `reports/{id}/metadata.json`.
pub struct S3MetadataStore {
    pub client: Client,
    pub bucket: String,
}

impl S3MetadataStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Bucket from `CLARIA_BUCKET`, defaulting to `claria`.
    pub fn from_env(client: Client) -> Self {
        let bucket = std::env::var("CLARIA_BUCKET").unwrap_or_else(|_| "claria".to_string());
        Self::new(client, bucket)
    }

    /// [`from_env`](Self::from_env) with a client from the default AWS chain.
    pub async fn connect() -> Self {
        Self::from_env(client::build_client().await)
    }
}

impl MetadataStore for S3MetadataStore {
    fn load<'a>(
        &'a self,
        report_id: &'a str,
    ) -> BoxFuture<'a, Result<ReportMetadata, StorageError>> {
        Box::pin(async move {
            let key = s3_keys::report_metadata(report_id);
            match blob::read_json(&self.client, &self.bucket, &key).await {
                Ok(metadata) => Ok(metadata),
                Err(StorageError::NotFound { .. }) => {
                    tracing::debug!(report_id, "no metadata in S3, starting empty");
                    Ok(ReportMetadata::default())
                }
                Err(e) => Err(e),
            }
        })
    }

    fn save<'a>(
        &'a self,
        report_id: &'a str,
        metadata: &'a ReportMetadata,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let key = s3_keys::report_metadata(report_id);
            blob::write_json(&self.client, &self.bucket, &key, metadata).await?;
            tracing::debug!(
                bucket = %self.bucket,
                key = %key,
                changes = metadata.field_changes.len(),
                "report metadata saved"
            );
            Ok(())
        })
    }
}

/// Process-local store, used in tests and offline sessions.
#[derive(Default)]
pub struct MemoryMetadataStore {
    blobs: Mutex<HashMap<String, ReportMetadata>>,
    unavailable: AtomicBool,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`StorageError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn get(&self, report_id: &str) -> Option<ReportMetadata> {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(report_id)
            .cloned()
    }

    pub fn insert(&self, report_id: impl Into<String>, metadata: ReportMetadata) {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(report_id.into(), metadata);
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StorageError::Unavailable("memory store disabled".to_string()))
        } else {
            Ok(())
        }
    }
}

impl MetadataStore for MemoryMetadataStore {
    fn load<'a>(
        &'a self,
        report_id: &'a str,
    ) -> BoxFuture<'a, Result<ReportMetadata, StorageError>> {
        Box::pin(async move {
            self.check_available()?;
            Ok(self.get(report_id).unwrap_or_default())
        })
    }

    fn save<'a>(
        &'a self,
        report_id: &'a str,
        metadata: &'a ReportMetadata,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            self.check_available()?;
            self.insert(report_id, metadata.clone());
            Ok(())
        })
    }
}
