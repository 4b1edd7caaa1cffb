//! # Storage Area
//!
//! A flat namespace of files keyed by generated names. Adapters and handlers
//! only talk to the [`Storage`] trait, so the local directory backend can be
//! swapped for an object store without touching them.
//!
//! Writes of distinct names need no locking because every name embeds a random
//! token. [`LocalStorage::put`] writes to a hidden sibling and renames it into
//! place, so a concurrent reader sees either nothing or the complete file.

use std::path::{Component, Path, PathBuf};
use std::pin::Pin;

use async_trait::async_trait;
use thiserror::Error;
use tokio::{
    fs,
    io::{AsyncRead, AsyncWriteExt},
};
use tracing::{debug, error, trace};
use uuid::Uuid;

/// Byte stream over a stored file.
pub type FileReader = Pin<Box<dyn AsyncRead + Send>>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid file name: {0:?}")]
    InvalidName(String),

    #[error("file not found: {0}")]
    NotFound(String),

    #[error("storage I/O error")]
    Io(#[from] std::io::Error),
}

/// Backend for the Storage Area.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Stores `data` under `name`, replacing any previous file of that name.
    async fn put(&self, name: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Reads the whole file.
    async fn get(&self, name: &str) -> Result<Vec<u8>, StorageError>;

    /// Opens the file for streaming.
    async fn open(&self, name: &str) -> Result<FileReader, StorageError>;

    /// Removes a single entry.
    async fn delete(&self, name: &str) -> Result<(), StorageError>;

    /// Names of every entry directly inside the Storage Area.
    async fn list(&self) -> Result<Vec<String>, StorageError>;
}

/// Rejects anything that is not a single plain path component.
pub fn validate_name(name: &str) -> Result<(), StorageError> {
    let mut components = Path::new(name).components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );

    if !single_normal || name.contains(&['/', '\\', '\0'][..]) {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Storage Area backed by a single local directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    /// Opens the directory, creating it if necessary.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        trace!(path = %root.display(), "Ensuring directory exists");
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, StorageError> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }
}

fn not_found_or_io(name: &str, e: std::io::Error) -> StorageError {
    if e.kind() == std::io::ErrorKind::NotFound {
        StorageError::NotFound(name.to_string())
    } else {
        StorageError::Io(e)
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put(&self, name: &str, data: &[u8]) -> Result<(), StorageError> {
        let path = self.resolve(name)?;
        let staging = self.root.join(format!(".{name}.{}.part", Uuid::new_v4().simple()));
        debug!(file_path = %path.display(), size = data.len(), "Saving file");

        let written = async {
            let mut file = fs::File::create(&staging).await?;
            file.write_all(data).await?;
            file.sync_all().await?;
            fs::rename(&staging, &path).await
        }
        .await;

        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&staging).await {
                error!(
                    file_path = %staging.display(),
                    error = %cleanup,
                    "Failed to clean up staging file during error recovery"
                );
            }
            return Err(e.into());
        }

        debug!(file_path = %path.display(), "File saved successfully");
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(name)?;
        fs::read(&path).await.map_err(|e| not_found_or_io(name, e))
    }

    async fn open(&self, name: &str) -> Result<FileReader, StorageError> {
        let path = self.resolve(name)?;
        let file = fs::File::open(&path)
            .await
            .map_err(|e| not_found_or_io(name, e))?;
        Ok(Box::pin(file))
    }

    async fn delete(&self, name: &str) -> Result<(), StorageError> {
        let path = self.resolve(name)?;
        let metadata = fs::symlink_metadata(&path)
            .await
            .map_err(|e| not_found_or_io(name, e))?;

        if metadata.is_dir() {
            fs::remove_dir_all(&path).await?;
        } else {
            fs::remove_file(&path).await?;
        }
        trace!(file_path = %path.display(), "Entry deleted");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, StorageError> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => debug!(?raw, "Skipping entry with non UTF-8 name"),
            }
        }
        Ok(names)
    }
}
