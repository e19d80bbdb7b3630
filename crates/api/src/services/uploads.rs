//! Media uploads stored on local disk and served under `/uploads`.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Public URL prefix for stored files.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Accepted extensions and the MIME type each one is served as.
const ALLOWED: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("avif", "image/avif"),
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
];

/// Errors raised while storing or removing uploads.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("file type not allowed: {0}")]
    UnsupportedType(String),

    #[error("invalid file name")]
    InvalidName,

    #[error("file is empty")]
    Empty,

    #[error("file not found")]
    NotFound,

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// Metadata returned after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub url: String,
    pub filename: String,
    pub content_type: &'static str,
    pub size: usize,
}

/// Lower-cased extension of `name` and its MIME type, if the type is allowed.
///
/// # Errors
///
/// Returns `UploadError::UnsupportedType` for missing or disallowed extensions.
pub fn classify(name: &str) -> Result<(String, &'static str), UploadError> {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| UploadError::UnsupportedType(name.to_owned()))?;

    ALLOWED
        .iter()
        .find(|(allowed, _)| *allowed == ext)
        .map(|(_, mime)| (ext.clone(), *mime))
        .ok_or(UploadError::UnsupportedType(ext))
}

/// Accept only names this store could have generated: a single path
/// component made of `[A-Za-z0-9._-]`, not starting with a dot.
fn validate_stored_name(name: &str) -> Result<(), UploadError> {
    let well_formed = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if well_formed {
        Ok(())
    } else {
        Err(UploadError::InvalidName)
    }
}

/// Files under a single directory, named `<uuid>.<ext>`.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Directory the files live in.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `bytes` under a generated name derived from `original_name`'s
    /// extension.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::UnsupportedType` or `UploadError::Empty` for
    /// rejected input, `UploadError::Io` if the write fails.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<StoredFile, UploadError> {
        let (ext, content_type) = classify(original_name)?;
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let filename = format!("{}.{ext}", Uuid::new_v4());
        tokio::fs::write(self.dir.join(&filename), bytes).await?;

        tracing::info!(%filename, size = bytes.len(), content_type, "Stored upload");
        Ok(StoredFile {
            url: format!("{PUBLIC_PREFIX}/{filename}"),
            filename,
            content_type,
            size: bytes.len(),
        })
    }

    /// Remove a previously stored file.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::InvalidName` for anything that could escape the
    /// upload directory, `UploadError::NotFound` if the file does not exist.
    pub async fn delete(&self, filename: &str) -> Result<(), UploadError> {
        validate_stored_name(filename)?;

        match tokio::fs::remove_file(self.dir.join(filename)).await {
            Ok(()) => {
                tracing::info!(%filename, "Deleted upload");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(UploadError::NotFound),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_store() -> UploadStore {
        UploadStore::new(std::env::temp_dir().join(format!("atelier-uploads-{}", Uuid::new_v4())))
    }

    #[test]
    fn test_classify_by_extension() {
        assert_eq!(classify("Photo.JPG").unwrap(), ("jpg".to_owned(), "image/jpeg"));
        assert_eq!(classify("clip.webm").unwrap().1, "video/webm");
        assert_eq!(classify("logo.svg").unwrap().1, "image/svg+xml");
    }

    #[test]
    fn test_classify_rejects_other_types() {
        assert!(matches!(classify("run.exe"), Err(UploadError::UnsupportedType(_))));
        assert!(matches!(classify("README"), Err(UploadError::UnsupportedType(_))));
        assert!(matches!(classify("archive.jpg.zip"), Err(UploadError::UnsupportedType(_))));
    }

    #[test]
    fn test_stored_name_validation() {
        assert!(validate_stored_name("0b0e4f7c-2b1e-4e0a-9d1b-5a3c2f1e0d9a.png").is_ok());
        for bad in ["", "../secret.png", "a/b.png", ".env", "..", "x\\y.png"] {
            assert!(
                matches!(validate_stored_name(bad), Err(UploadError::InvalidName)),
                "{bad:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_save_then_delete() {
        let store = temp_store();
        let stored = store.save("salon.png", b"\x89PNG").await.unwrap();
        assert!(stored.url.starts_with("/uploads/"));
        assert!(stored.filename.ends_with(".png"));
        assert_eq!(stored.size, 4);
        assert!(store.dir().join(&stored.filename).exists());

        store.delete(&stored.filename).await.unwrap();
        assert!(matches!(
            store.delete(&stored.filename).await,
            Err(UploadError::NotFound)
        ));
        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[tokio::test]
    async fn test_save_rejects_empty() {
        let store = temp_store();
        assert!(matches!(store.save("a.png", b"").await, Err(UploadError::Empty)));
    }
}
