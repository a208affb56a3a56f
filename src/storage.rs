use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;

/// Object storage seam for uploaded profile images.
#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes) -> anyhow::Result<()>;
    async fn delete_object(&self, key: &str) -> anyhow::Result<()>;
    /// URL under which a stored object is served.
    fn public_url(&self, key: &str) -> String;
}

/// Stores objects as files under a root directory; they are served back by
/// the static `/uploads` route.
#[derive(Clone)]
pub struct DiskStorage {
    root: PathBuf,
    public_prefix: String,
}

impl DiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            public_prefix: "/uploads".to_string(),
        }
    }

    // Keys are generated internally; anything path-like is refused anyway.
    fn checked_path(&self, key: &str) -> anyhow::Result<PathBuf> {
        anyhow::ensure!(
            !key.is_empty() && !key.contains('/') && !key.contains('\\') && !key.contains(".."),
            "invalid object key {key:?}"
        );
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl StorageClient for DiskStorage {
    async fn put_object(&self, key: &str, body: Bytes) -> anyhow::Result<()> {
        let path = self.checked_path(key)?;
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("create upload dir {}", self.root.display()))?;
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        let path = self.checked_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove {}", path.display())),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_prefix, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_writes_the_object_under_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = DiskStorage::new(dir.path());

        storage
            .put_object("1714564800000.png", Bytes::from_static(b"png-bytes"))
            .await
            .expect("put");

        let stored = std::fs::read(dir.path().join("1714564800000.png")).expect("read back");
        assert_eq!(stored, b"png-bytes");
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = DiskStorage::new(dir.path());

        storage
            .put_object("a.jpg", Bytes::from_static(b"x"))
            .await
            .expect("put");
        storage.delete_object("a.jpg").await.expect("first delete");
        storage.delete_object("a.jpg").await.expect("second delete");
        assert!(!dir.path().join("a.jpg").exists());
    }

    #[tokio::test]
    async fn path_like_keys_are_refused() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = DiskStorage::new(dir.path());

        for key in ["../escape.png", "nested/obj.png", ""] {
            assert!(
                storage
                    .put_object(key, Bytes::from_static(b"x"))
                    .await
                    .is_err(),
                "{key:?}"
            );
        }
    }

    #[test]
    fn public_url_is_under_uploads() {
        let storage = DiskStorage::new("uploads");
        assert_eq!(storage.public_url("1.png"), "/uploads/1.png");
    }
}
