//! Object Storage Module
//!
//! 回执、认证材料、横幅图都通过这个边界落盘。上传以本地临时文件为
//! 输入，无论成败都会删除临时文件，避免孤儿文件堆积。

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use crate::utils::{AppError, AppResult};

/// A stored object reference
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// Public URL clients can fetch
    pub url: String,
    /// Storage key, used for later deletion
    pub public_id: String,
}

/// Blob storage boundary
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Move the file at `local_path` into storage under `folder`.
    /// The source file is removed on both success and failure.
    async fn upload(&self, local_path: &Path, folder: &str) -> AppResult<StoredObject>;

    /// Remove a stored object by its public id
    async fn delete(&self, public_id: &str) -> AppResult<()>;
}

/// Filesystem-backed storage serving objects under `/uploads/`
pub struct LocalObjectStorage {
    uploads_root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStorage {
    pub fn new(uploads_root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            uploads_root: uploads_root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Spool request bytes into a temp file for a later `upload` call
    pub async fn spool(&self, bytes: &[u8], original_name: Option<&str>) -> AppResult<PathBuf> {
        let tmp_dir = self.uploads_root.join("tmp");
        tokio::fs::create_dir_all(&tmp_dir)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create temp dir: {e}")))?;

        let mut name = Uuid::new_v4().to_string();
        if let Some(ext) = original_name.and_then(extension_of) {
            name.push('.');
            name.push_str(&ext);
        }
        let path = tmp_dir.join(name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write temp file: {e}")))?;
        Ok(path)
    }

    fn validate_folder(folder: &str) -> AppResult<()> {
        let ok = !folder.is_empty()
            && folder
                .split('/')
                .all(|seg| !seg.is_empty() && seg != "." && seg != "..");
        if ok {
            Ok(())
        } else {
            Err(AppError::Validation(format!("Invalid storage folder: {folder}")))
        }
    }

    async fn store(&self, local_path: &Path, folder: &str) -> AppResult<StoredObject> {
        Self::validate_folder(folder)?;

        let mut key = Uuid::new_v4().to_string();
        if let Some(ext) = local_path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|e| sanitize_ext(e))
        {
            key.push('.');
            key.push_str(&ext);
        }
        let public_id = format!("{folder}/{key}");

        let dest = self.uploads_root.join(&public_id);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to create upload dir: {e}")))?;
        }
        tokio::fs::copy(local_path, &dest)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store object: {e}")))?;

        Ok(StoredObject {
            url: format!("{}/uploads/{public_id}", self.public_base_url),
            public_id,
        })
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn upload(&self, local_path: &Path, folder: &str) -> AppResult<StoredObject> {
        let result = self.store(local_path, folder).await;

        // 临时文件成败都要清掉
        if let Err(e) = tokio::fs::remove_file(local_path).await {
            tracing::warn!("Failed to remove temp file {}: {e}", local_path.display());
        }

        result
    }

    async fn delete(&self, public_id: &str) -> AppResult<()> {
        Self::validate_folder(public_id)?;
        let path = self.uploads_root.join(public_id);
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to delete object: {e}")))
    }
}

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .and_then(sanitize_ext)
}

fn sanitize_ext(ext: &str) -> Option<String> {
    let ext = ext.to_ascii_lowercase();
    if !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(ext)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(root: &Path) -> LocalObjectStorage {
        LocalObjectStorage::new(root, "http://localhost:3000")
    }

    #[tokio::test]
    async fn test_upload_moves_file_and_builds_url() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());

        let temp = storage.spool(b"receipt-bytes", Some("receipt.png")).await.unwrap();
        let stored = storage.upload(&temp, "order-payment/guest").await.unwrap();

        assert!(stored.public_id.starts_with("order-payment/guest/"));
        assert!(stored.public_id.ends_with(".png"));
        assert_eq!(
            stored.url,
            format!("http://localhost:3000/uploads/{}", stored.public_id)
        );
        // temp gone, object present
        assert!(!temp.exists());
        assert!(dir.path().join(&stored.public_id).exists());
    }

    #[tokio::test]
    async fn test_upload_failure_still_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());

        let temp = storage.spool(b"bytes", None).await.unwrap();
        let err = storage.upload(&temp, "../escape").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(!temp.exists());
    }

    #[tokio::test]
    async fn test_delete_removes_object() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());

        let temp = storage.spool(b"banner", Some("hero.jpg")).await.unwrap();
        let stored = storage.upload(&temp, "hero-images").await.unwrap();
        storage.delete(&stored.public_id).await.unwrap();
        assert!(!dir.path().join(&stored.public_id).exists());
    }
}
