//! Local filesystem storage for attachments
//!
//! Files are written under a single root with generated names
//! (`<uuid>.<ext>`); the original file name is kept only for display and
//! downloads.

use std::path::{Path, PathBuf};

use uuid::Uuid;

const MAX_EXTENSION_LEN: usize = 10;
const MAX_DISPLAY_NAME_LEN: usize = 200;

/// Names recorded for a saved upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Sanitised original name, shown to users
    pub file_name: String,
    /// Name on disk, relative to the upload root
    pub stored_name: String,
}

/// Upload error type
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("uploaded file is empty")]
    Empty,

    #[error("uploaded file exceeds {max} bytes")]
    TooLarge { max: usize },

    #[error("invalid stored file name")]
    InvalidName,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Attachment store rooted at a directory
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
    max_bytes: usize,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Write `bytes` under a fresh name.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<StoredFile, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        if bytes.len() > self.max_bytes {
            return Err(UploadError::TooLarge { max: self.max_bytes });
        }

        tokio::fs::create_dir_all(&self.root).await?;

        let file_name = display_name(original_name);
        let stored_name = match extension(&file_name) {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };

        tokio::fs::write(self.root.join(&stored_name), bytes).await?;
        tracing::debug!(stored_name, size = bytes.len(), "upload saved");

        Ok(StoredFile {
            file_name,
            stored_name,
        })
    }

    /// Read a stored file back.
    pub async fn read(&self, stored_name: &str) -> Result<Vec<u8>, UploadError> {
        let path = self.resolve(stored_name)?;
        Ok(tokio::fs::read(path).await?)
    }

    /// Delete a stored file. Failure is logged, never returned: a leftover
    /// file must not fail the request that deleted its row.
    pub async fn remove(&self, stored_name: &str) {
        let path = match self.resolve(stored_name) {
            Ok(path) => path,
            Err(_) => {
                tracing::warn!(stored_name, "refusing to remove invalid upload name");
                return;
            }
        };
        if let Err(err) = tokio::fs::remove_file(&path).await {
            tracing::warn!(path = %path.display(), error = %err, "failed to remove upload");
        }
    }

    pub async fn remove_all<I, S>(&self, stored_names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in stored_names {
            self.remove(name.as_ref()).await;
        }
    }

    fn resolve(&self, stored_name: &str) -> Result<PathBuf, UploadError> {
        let valid = !stored_name.is_empty()
            && !stored_name.contains("..")
            && stored_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
        if !valid {
            return Err(UploadError::InvalidName);
        }
        Ok(self.root.join(stored_name))
    }
}

/// Strip directories (browsers on Windows send full paths) and control
/// characters from a client-supplied file name.
pub fn display_name(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original)
        .trim();

    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control() && *c != '"')
        .take(MAX_DISPLAY_NAME_LEN)
        .collect();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        "upload".to_string()
    } else {
        cleaned
    }
}

fn extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > MAX_EXTENSION_LEN {
        return None;
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
