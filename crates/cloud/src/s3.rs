//! S3-compatible provider (Supabase storage, MinIO, AWS).

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::{Credentials, Region},
    error::DisplayErrorContext,
    operation::get_object::GetObjectError,
    primitives::ByteStream,
    Client,
};

use crate::error::StorageError;
use crate::provider::{StorageBackend, StorageProvider};

/// Connection settings for an S3-compatible endpoint.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub endpoint: String,
    pub bucket: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
}

#[derive(Clone)]
pub struct S3Provider {
    client: Client,
    bucket: String,
}

impl S3Provider {
    pub fn new(config: &S3Config) -> Self {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "realeagent",
        );

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint)
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            // Supabase and MinIO only support path-style addressing.
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        }
    }

    /// Log whether the bucket is reachable. Failures are not fatal; uploads
    /// fall back to local disk.
    pub async fn check_bucket(&self) {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => tracing::info!(bucket = %self.bucket, "Connected to S3 bucket"),
            Err(e) => tracing::warn!(
                bucket = %self.bucket,
                error = %e,
                "Could not verify S3 bucket, will attempt operations anyway"
            ),
        }
    }
}

#[async_trait]
impl StorageProvider for S3Provider {
    fn backend(&self) -> StorageBackend {
        StorageBackend::S3
    }

    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| {
                StorageError::S3(format!(
                    "Failed to upload {key}: {}",
                    DisplayErrorContext(&e)
                ))
            })?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let status = e.raw_response().map(|r| r.status().as_u16());
                if is_missing_object(e.as_service_error(), status) {
                    StorageError::NotFound(key.to_string())
                } else {
                    StorageError::S3(format!(
                        "Failed to download {key}: {}",
                        DisplayErrorContext(&e)
                    ))
                }
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::S3(format!("Failed to read body of {key}: {e}")))?;
        Ok(data.into_bytes().to_vec())
    }
}

/// A `NoSuchKey` service error, or a bare 404 from providers that omit the
/// error code.
fn is_missing_object(service_error: Option<&GetObjectError>, status: Option<u16>) -> bool {
    service_error.is_some_and(GetObjectError::is_no_such_key) || status == Some(404)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::types::error::{InvalidObjectState, NoSuchKey};

    #[test]
    fn no_such_key_is_missing() {
        let err = GetObjectError::NoSuchKey(NoSuchKey::builder().build());
        assert!(is_missing_object(Some(&err), Some(404)));
        assert!(is_missing_object(Some(&err), None));
    }

    #[test]
    fn bare_404_is_missing() {
        assert!(is_missing_object(None, Some(404)));
    }

    #[test]
    fn other_service_errors_are_not_missing() {
        let err = GetObjectError::InvalidObjectState(InvalidObjectState::builder().build());
        assert!(!is_missing_object(Some(&err), Some(403)));
        assert!(!is_missing_object(None, Some(500)));
        assert!(!is_missing_object(None, None));
    }
}
