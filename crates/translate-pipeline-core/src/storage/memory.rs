use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use super::{ObjectStore, PutOptions};
use crate::error::{Error, Result};

/// An object held by [`MemoryObjectStore`], with the options it was written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Bytes,
    pub options: PutOptions,
}

/// In-process object store.
///
/// Keeps every object and counts writes, which makes it the store of choice
/// for tests and for running the front-end without a storage directory.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<BTreeMap<(String, String), StoredObject>>,
    puts: AtomicUsize,
    gets: AtomicUsize,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an object without counting it as a read.
    pub async fn object(&self, location: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .read()
            .await
            .get(&(location.to_string(), key.to_string()))
            .cloned()
    }

    /// Insert an object without counting it as a write.
    pub async fn seed(&self, location: &str, key: &str, body: impl Into<Bytes>) {
        self.objects.write().await.insert(
            (location.to_string(), key.to_string()),
            StoredObject {
                body: body.into(),
                options: PutOptions::json(),
            },
        );
    }

    /// Total `put` calls, including overwrites.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Total `get` calls.
    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn scheme(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, location: &str, key: &str) -> Result<Bytes> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.object(location, key)
            .await
            .map(|o| o.body)
            .ok_or_else(|| Error::ObjectNotFound {
                location: location.to_string(),
                key: key.to_string(),
            })
    }

    async fn put(&self, location: &str, key: &str, body: Bytes, options: PutOptions) -> Result<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.objects
            .write()
            .await
            .insert((location.to_string(), key.to_string()), StoredObject { body, options });
        Ok(())
    }

    async fn list(&self, location: &str, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .objects
            .read()
            .await
            .keys()
            .filter(|(loc, key)| loc == location && key.starts_with(prefix))
            .map(|(_, key)| key.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::AccessPolicy;

    #[tokio::test]
    async fn test_counts_and_options() {
        let store = MemoryObjectStore::new();
        store.seed("in", "a.json", &b"{}"[..]).await;
        assert_eq!(store.put_count(), 0);

        store
            .put("out", "t/a.txt", Bytes::from_static(b"hi"), PutOptions::text())
            .await
            .unwrap();
        assert_eq!(store.put_count(), 1);

        let obj = store.object("out", "t/a.txt").await.unwrap();
        assert_eq!(obj.options.content_type, "text/plain");
        assert_eq!(obj.options.access_policy, AccessPolicy::BucketOwnerFullControl);

        assert_eq!(&store.get("in", "a.json").await.unwrap()[..], b"{}");
        assert_eq!(store.get_count(), 1);
        assert_eq!(store.list("out", "t/").await.unwrap(), vec!["t/a.txt"]);
        assert_eq!(store.uri("out", "t/a.txt"), "memory://out/t/a.txt");
    }
}
