mod fs;
mod memory;

pub use fs::FsObjectStore;
pub use memory::{MemoryObjectStore, StoredObject};

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_TEXT: &str = "text/plain";

/// Access policy attached to written objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessPolicy {
    #[default]
    Private,
    /// Ownership of the object transfers to the owner of the location
    BucketOwnerFullControl,
}

impl AccessPolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::BucketOwnerFullControl => "bucket-owner-full-control",
        }
    }
}

/// Options for [`ObjectStore::put`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutOptions {
    pub content_type: &'static str,
    pub access_policy: AccessPolicy,
}

impl PutOptions {
    /// JSON object handed over to the location owner.
    pub const fn json() -> Self {
        Self {
            content_type: CONTENT_TYPE_JSON,
            access_policy: AccessPolicy::BucketOwnerFullControl,
        }
    }

    /// Plain text object handed over to the location owner.
    pub const fn text() -> Self {
        Self {
            content_type: CONTENT_TYPE_TEXT,
            access_policy: AccessPolicy::BucketOwnerFullControl,
        }
    }
}

/// Blob storage addressed by (location, key).
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// URI scheme used when reporting object locations
    fn scheme(&self) -> &'static str;

    /// Fetch an object; [`crate::Error::ObjectNotFound`] if absent.
    async fn get(&self, location: &str, key: &str) -> Result<Bytes>;

    /// Create or overwrite an object.
    async fn put(&self, location: &str, key: &str, body: Bytes, options: PutOptions) -> Result<()>;

    /// Keys in `location` starting with `prefix`, sorted.
    async fn list(&self, location: &str, prefix: &str) -> Result<Vec<String>>;

    /// `<scheme>://<location>/<key>`
    fn uri(&self, location: &str, key: &str) -> String {
        format!("{}://{location}/{key}", self.scheme())
    }
}
