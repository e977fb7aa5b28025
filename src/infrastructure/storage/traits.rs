//! Blob storage port for courier license images.
//!
//! Production deployments plug a real object store here; the core only
//! depends on this trait.

use async_trait::async_trait;

use crate::shared::errors::InfraError;

#[async_trait]
pub trait CnhImageStore: Send + Sync {
    /// Stores the image bytes and returns the stable reference to the blob.
    async fn store(&self, file_name: &str, content: &[u8]) -> Result<String, InfraError>;
}
