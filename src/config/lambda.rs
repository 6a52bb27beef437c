use crate::domain::ports::Storage;
use crate::utils::error::{BuchaError, Result};
use crate::utils::validation::{self, Validate};
use aws_sdk_s3::Client as S3Client;
use std::env;

/// Where the Lambda build persists reports.
#[derive(Debug, Clone)]
pub struct LambdaConfig {
    pub s3_bucket: String,
    pub s3_prefix: String,
    pub s3_region: String,
}

impl LambdaConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            s3_bucket: env::var("S3_BUCKET").map_err(|_| BuchaError::MissingConfigError {
                field: "S3_BUCKET".to_string(),
            })?,
            s3_prefix: env::var("S3_PREFIX").unwrap_or_else(|_| "menus".to_string()),
            s3_region: env::var("S3_REGION").unwrap_or_else(|_| "eu-west-1".to_string()),
        })
    }
}

impl Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("S3_BUCKET", &self.s3_bucket)?;
        validation::validate_non_empty_string("S3_PREFIX", &self.s3_prefix)?;
        validation::validate_non_empty_string("S3_REGION", &self.s3_region)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct S3Storage {
    client: S3Client,
    bucket: String,
    prefix: String,
}

impl S3Storage {
    pub fn new(client: S3Client, bucket: String, prefix: String) -> Self {
        Self {
            client,
            bucket,
            prefix,
        }
    }

    fn key(&self, path: &str) -> String {
        format!("{}/{}", self.prefix.trim_end_matches('/'), path)
    }
}

impl Storage for S3Storage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(self.key(path))
            .content_type("text/plain; charset=utf-8")
            .body(data.to_vec().into())
            .send()
            .await
            .map_err(|e| BuchaError::StorageError {
                message: format!("Failed to write to S3: {}", e),
            })?;
        Ok(())
    }

    fn describe(&self, path: &str) -> String {
        format!("s3://{}/{}", self.bucket, self.key(path))
    }
}
