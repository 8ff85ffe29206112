//! JSON blobs in S3.

use aws_sdk_s3::Client;
use aws_smithy_types::byte_stream::ByteStream;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::StorageError;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Fetch and decode the JSON object at `key`.
///
/// A missing key is reported as [`StorageError::NotFound`] so callers can
/// treat it as "never saved".
pub async fn read_json<T: DeserializeOwned>(
    client: &Client,
    bucket: &str,
    key: &str,
) -> Result<T, StorageError> {
    let output = client
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| match e.into_service_error() {
            err if err.is_no_such_key() => StorageError::NotFound {
                key: key.to_string(),
            },
            err => StorageError::GetObject(err.to_string()),
        })?;

    let bytes = output
        .body
        .collect()
        .await
        .map_err(|e| StorageError::GetObject(e.to_string()))?
        .into_bytes();

    Ok(serde_json::from_slice(&bytes)?)
}

/// Encode `value` and overwrite the object at `key`.
pub async fn write_json<T: Serialize>(
    client: &Client,
    bucket: &str,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let body = serde_json::to_vec_pretty(value)?;
    let size = body.len();

    client
        .put_object()
        .bucket(bucket)
        .key(key)
        .content_type(JSON_CONTENT_TYPE)
        .body(ByteStream::from(body))
        .send()
        .await
        .map_err(|e| StorageError::PutObject(e.into_service_error().to_string()))?;

    tracing::trace!(bucket, key, size, "json blob written");
    Ok(())
}
