//! In-memory image store for tests and local runs.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::traits::CnhImageStore;
use crate::shared::errors::InfraError;

#[derive(Debug, Default)]
pub struct InMemoryImageStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.lock().contains_key(file_name)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.blobs.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl CnhImageStore for InMemoryImageStore {
    async fn store(&self, file_name: &str, content: &[u8]) -> Result<String, InfraError> {
        self.lock().insert(file_name.to_string(), content.to_vec());
        Ok(format!("memory://{}", file_name))
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_keeps_bytes_and_returns_reference() {
        let store = InMemoryImageStore::new();
        let path = store.store("cnh_1.png", &[1, 2, 3]).await.unwrap();
        assert_eq!(path, "memory://cnh_1.png");
        assert!(store.contains("cnh_1.png"));
        assert_eq!(store.len(), 1);
    }
}
