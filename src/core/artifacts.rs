//! Reply artifact storage.
//!
//! Synthesized reply audio is write-once, read-many: stored under a freshly
//! generated UUID locator, retrievable over the read-only fetch path until
//! the retention window expires. The store is an in-memory TTL cache bounded
//! by total byte size, so an abandoned turn's audio is reclaimed without any
//! explicit cleanup path.

use bytes::Bytes;
use moka::future::Cache;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// One stored reply artifact.
#[derive(Debug, Clone)]
pub struct ReplyArtifact {
    /// Synthesized audio bytes
    pub data: Bytes,
    /// Content type the fetch path serves the audio with
    pub content_type: &'static str,
}

/// In-memory, TTL-bounded store for synthesized reply audio.
///
/// Locators are UUID v4, unique across all sessions for the process
/// lifetime; no two artifacts ever share a locator.
#[derive(Clone)]
pub struct ArtifactStore {
    cache: Cache<String, ReplyArtifact>,
}

impl ArtifactStore {
    /// Create a store with the given retention window and total byte bound.
    pub fn new(ttl: Duration, max_bytes: u64) -> Self {
        let cache = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(max_bytes)
            .weigher(|_key: &String, artifact: &ReplyArtifact| {
                artifact.data.len().try_into().unwrap_or(u32::MAX)
            })
            .build();
        Self { cache }
    }

    /// Store a new artifact and return its locator.
    pub async fn store(&self, data: Bytes, content_type: &'static str) -> String {
        let locator = Uuid::new_v4().to_string();
        debug!(
            locator = %locator,
            bytes = data.len(),
            "Storing reply artifact"
        );
        self.cache
            .insert(locator.clone(), ReplyArtifact { data, content_type })
            .await;
        locator
    }

    /// Fetch an artifact by locator. Returns `None` for unknown or expired
    /// locators.
    pub async fn fetch(&self, locator: &str) -> Option<ReplyArtifact> {
        self.cache.get(locator).await
    }

    /// Number of artifacts currently retained.
    pub fn len(&self) -> u64 {
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn test_store() -> ArtifactStore {
        ArtifactStore::new(Duration::from_secs(60), 1024 * 1024)
    }

    #[tokio::test]
    async fn test_store_and_fetch() {
        let store = test_store();
        let locator = store
            .store(Bytes::from_static(b"fake mp3 bytes"), "audio/mpeg")
            .await;

        let artifact = store.fetch(&locator).await.unwrap();
        assert_eq!(artifact.data.as_ref(), b"fake mp3 bytes");
        assert_eq!(artifact.content_type, "audio/mpeg");
    }

    #[tokio::test]
    async fn test_unknown_locator() {
        let store = test_store();
        assert!(store.fetch("no-such-locator").await.is_none());
    }

    #[tokio::test]
    async fn test_locators_never_repeat() {
        let store = test_store();
        let mut seen = HashSet::new();
        for _ in 0..100 {
            let locator = store.store(Bytes::from_static(b"x"), "audio/mpeg").await;
            assert!(seen.insert(locator), "locator reused");
        }
    }

    #[tokio::test]
    async fn test_expired_artifact_not_served() {
        let store = ArtifactStore::new(Duration::from_millis(10), 1024);
        let locator = store.store(Bytes::from_static(b"x"), "audio/mpeg").await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(store.fetch(&locator).await.is_none());
    }
}
