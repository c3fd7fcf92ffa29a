/// Object store contract
///
/// Content-addressed blob storage with put/get by key and time-limited URL
/// issuance. The production implementation is S3-compatible (works against
/// MinIO via a custom endpoint); tests substitute an in-memory fake.
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

use crate::error::Result;

pub mod s3;

pub use s3::S3ObjectStorage;

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store a blob under the given key, overwriting any existing object
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()>;

    /// Fetch the full blob stored under the given key
    async fn get(&self, key: &str) -> Result<Bytes>;

    /// Issue a presigned GET URL valid for `ttl`
    async fn url_for(&self, key: &str, ttl: Duration) -> Result<String>;
}
