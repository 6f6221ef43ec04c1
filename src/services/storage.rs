use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::core::config::Settings;

const MAX_EXTENSION_LEN: usize = 10;

#[derive(Debug, Error)]
pub(crate) enum StorageError {
    #[error("file is empty")]
    Empty,
    #[error("file exceeds the {limit_bytes} byte upload limit")]
    TooLarge { limit_bytes: u64 },
    #[error("invalid stored file name")]
    InvalidName,
    #[error("file not found")]
    NotFound,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StoredFile {
    pub(crate) file_name: String,
    pub(crate) size: i64,
    pub(crate) sha256: String,
}

#[derive(Debug)]
pub(crate) struct DownloadedFile {
    pub(crate) file_name: String,
    pub(crate) bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub(crate) struct FileStorage {
    root: PathBuf,
    max_bytes: u64,
}

impl FileStorage {
    pub(crate) async fn from_settings(settings: &Settings) -> Result<Self, StorageError> {
        Self::new(PathBuf::from(&settings.storage().upload_dir), settings.storage().max_upload_bytes())
            .await
    }

    pub(crate) async fn new(root: PathBuf, max_bytes: u64) -> Result<Self, StorageError> {
        tokio::fs::create_dir_all(&root).await?;
        tracing::info!(root = %root.display(), max_bytes, "File storage ready");
        Ok(Self { root, max_bytes })
    }

    pub(crate) fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub(crate) async fn store(
        &self,
        original_name: Option<&str>,
        bytes: &[u8],
    ) -> Result<StoredFile, StorageError> {
        if bytes.is_empty() {
            return Err(StorageError::Empty);
        }
        if bytes.len() as u64 > self.max_bytes {
            return Err(StorageError::TooLarge { limit_bytes: self.max_bytes });
        }

        let file_name = match original_name.and_then(sanitized_extension) {
            Some(extension) => format!("{}.{extension}", Uuid::new_v4()),
            None => Uuid::new_v4().to_string(),
        };

        tokio::fs::write(self.root.join(&file_name), bytes).await?;

        Ok(StoredFile {
            file_name,
            size: bytes.len() as i64,
            sha256: hex::encode(Sha256::digest(bytes)),
        })
    }

    pub(crate) async fn load(&self, file_name: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(file_name)?;
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
            Err(err) => Err(err.into()),
        }
    }

    pub(crate) async fn delete(&self, file_name: &str) -> Result<(), StorageError> {
        let path = self.resolve(file_name)?;
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    pub(crate) async fn delete_all_best_effort<I>(&self, file_names: I)
    where
        I: IntoIterator<Item = String>,
    {
        for file_name in file_names {
            if let Err(err) = self.delete(&file_name).await {
                tracing::warn!(error = %err, file_name = %file_name, "Failed to delete stored file");
            }
        }
    }

    fn resolve(&self, file_name: &str) -> Result<PathBuf, StorageError> {
        let valid = !file_name.is_empty()
            && file_name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '.')
            && !file_name.starts_with('.')
            && !file_name.contains("..");
        if !valid {
            return Err(StorageError::InvalidName);
        }
        Ok(self.root.join(file_name))
    }
}

pub(crate) fn sanitized_extension(original_name: &str) -> Option<String> {
    let extension = Path::new(original_name).extension()?.to_str()?.to_ascii_lowercase();
    let valid = !extension.is_empty()
        && extension.len() <= MAX_EXTENSION_LEN
        && extension.chars().all(|ch| ch.is_ascii_alphanumeric());
    valid.then_some(extension)
}

pub(crate) fn content_type_for(file_name: &str) -> &'static str {
    match Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain; charset=utf-8",
        Some("md") => "text/markdown; charset=utf-8",
        Some("zip") => "application/zip",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_storage(max_bytes: u64) -> (FileStorage, PathBuf) {
        let root = std::env::temp_dir().join(format!("college-storage-{}", Uuid::new_v4()));
        let storage = FileStorage::new(root.clone(), max_bytes).await.expect("storage");
        (storage, root)
    }

    #[test]
    fn extension_is_sanitized() {
        assert_eq!(sanitized_extension("report.PDF").as_deref(), Some("pdf"));
        assert_eq!(sanitized_extension("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(sanitized_extension("noext"), None);
        assert_eq!(sanitized_extension("evil.p/hp"), None);
        assert_eq!(sanitized_extension("weird.ex e"), None);
    }

    #[test]
    fn content_type_falls_back_to_octet_stream() {
        assert_eq!(content_type_for("a.pdf"), "application/pdf");
        assert_eq!(content_type_for("a.bin"), "application/octet-stream");
        assert_eq!(content_type_for("a"), "application/octet-stream");
    }

    #[tokio::test]
    async fn store_load_delete() {
        let (storage, root) = temp_storage(1024).await;

        let stored = storage.store(Some("answer.txt"), b"my answer").await.expect("store");
        assert!(stored.file_name.ends_with(".txt"));
        assert_eq!(stored.size, 9);
        assert_eq!(
            stored.sha256,
            hex::encode(Sha256::digest(b"my answer"))
        );

        let bytes = storage.load(&stored.file_name).await.expect("load");
        assert_eq!(bytes, b"my answer");

        storage.delete(&stored.file_name).await.expect("delete");
        storage.delete(&stored.file_name).await.expect("delete twice");
        assert!(matches!(storage.load(&stored.file_name).await, Err(StorageError::NotFound)));

        tokio::fs::remove_dir_all(root).await.ok();
    }

    #[tokio::test]
    async fn rejects_empty_and_oversized_files() {
        let (storage, root) = temp_storage(4).await;

        assert!(matches!(storage.store(None, b"").await, Err(StorageError::Empty)));
        assert!(matches!(
            storage.store(None, b"12345").await,
            Err(StorageError::TooLarge { limit_bytes: 4 })
        ));

        tokio::fs::remove_dir_all(root).await.ok();
    }

    #[tokio::test]
    async fn rejects_traversal_names() {
        let (storage, root) = temp_storage(16).await;

        assert!(matches!(storage.load("../secret").await, Err(StorageError::InvalidName)));
        assert!(matches!(storage.delete("a/b").await, Err(StorageError::InvalidName)));
        assert!(matches!(storage.load(".hidden").await, Err(StorageError::InvalidName)));

        tokio::fs::remove_dir_all(root).await.ok();
    }
}
