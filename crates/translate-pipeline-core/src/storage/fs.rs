use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;

use super::{ObjectStore, PutOptions};
use crate::error::{Error, Result};

/// Filesystem-backed object store.
///
/// Each location is a directory under `root`; keys map to relative paths.
/// Writes go to a hidden temporary file first and are renamed into place, so
/// readers never observe a partial object. Hidden files are not listed.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve (location, key) to a path, rejecting anything that could
    /// escape the location directory.
    fn object_path(&self, location: &str, key: &str) -> Result<PathBuf> {
        check_relative(location, location)?;
        check_relative(key, key)?;
        Ok(self.root.join(location).join(key))
    }
}

fn check_relative(value: &str, key: &str) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidKey {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    if value.is_empty() {
        return Err(invalid("empty"));
    }
    for component in Path::new(value).components() {
        match component {
            Component::Normal(_) => {}
            Component::CurDir | Component::ParentDir => {
                return Err(invalid("relative path segments are not allowed"));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid("absolute paths are not allowed"));
            }
        }
    }
    Ok(())
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    fn scheme(&self) -> &'static str {
        "file"
    }

    async fn get(&self, location: &str, key: &str) -> Result<Bytes> {
        let path = self.object_path(location, key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::ObjectNotFound {
                location: location.to_string(),
                key: key.to_string(),
            }),
            Err(e) => Err(Error::StorageRead {
                location: location.to_string(),
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    async fn put(&self, location: &str, key: &str, body: Bytes, options: PutOptions) -> Result<()> {
        let path = self.object_path(location, key)?;
        let write_err = |e: std::io::Error| Error::StorageWrite {
            location: location.to_string(),
            key: key.to_string(),
            reason: e.to_string(),
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp_path = path.with_file_name(format!(".{file_name}.{}.tmp", std::process::id()));

        fs::write(&tmp_path, &body).await.map_err(write_err)?;
        fs::rename(&tmp_path, &path).await.map_err(write_err)?;

        debug!(
            "Wrote {} bytes to {} ({}, {})",
            body.len(),
            path.display(),
            options.content_type,
            options.access_policy.as_str()
        );
        Ok(())
    }

    async fn list(&self, location: &str, prefix: &str) -> Result<Vec<String>> {
        check_relative(location, location)?;
        let base = self.root.join(location);
        let read_err = |e: std::io::Error| Error::StorageRead {
            location: location.to_string(),
            key: prefix.to_string(),
            reason: e.to_string(),
        };

        let mut keys = Vec::new();
        let mut pending = vec![(base, String::new())];

        while let Some((dir, rel)) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(read_err(e)),
            };

            while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
                let name = entry.file_name().to_string_lossy().into_owned();
                if name.starts_with('.') {
                    continue;
                }
                let key = format!("{rel}{name}");
                let file_type = entry.file_type().await.map_err(read_err)?;
                if file_type.is_dir() {
                    pending.push((entry.path(), format!("{key}/")));
                } else if key.starts_with(prefix) {
                    keys.push(key);
                }
            }
        }

        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());

        store
            .put("out", "translations/a.json", Bytes::from_static(b"one"), PutOptions::json())
            .await
            .unwrap();
        store
            .put("out", "translations/a.json", Bytes::from_static(b"two"), PutOptions::json())
            .await
            .unwrap();

        let data = store.get("out", "translations/a.json").await.unwrap();
        assert_eq!(&data[..], b"two");
        assert!(dir.path().join("out/translations/a.json").is_file());
    }

    #[tokio::test]
    async fn test_missing_object() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());
        let err = store.get("in", "nope.json").await.unwrap_err();
        assert!(matches!(err, Error::ObjectNotFound { .. }));
    }

    #[tokio::test]
    async fn test_rejects_escaping_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());
        for key in ["../secret", "/etc/passwd", "./a", ""] {
            let err = store
                .put("in", key, Bytes::from_static(b"x"), PutOptions::text())
                .await
                .unwrap_err();
            assert!(matches!(err, Error::InvalidKey { .. }), "{key}: {err}");
        }
    }

    #[tokio::test]
    async fn test_list_is_recursive_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());
        for key in ["b.json", "uploads/1.txt", "uploads/nested/2.json"] {
            store
                .put("in", key, Bytes::from_static(b"{}"), PutOptions::json())
                .await
                .unwrap();
        }

        let all = store.list("in", "").await.unwrap();
        assert_eq!(all, vec!["b.json", "uploads/1.txt", "uploads/nested/2.json"]);

        let uploads = store.list("in", "uploads/").await.unwrap();
        assert_eq!(uploads.len(), 2);

        assert!(store.list("missing", "").await.unwrap().is_empty());
    }
}
