//! Upload storage
//!
//! Uploaded audio and cover files live flat in a single directory under
//! generated names. The database only stores those names.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Longest extension kept from the client's filename
const MAX_EXTENSION_LEN: usize = 8;

/// Give up after this many name collisions in the same millisecond
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Directory of uploaded media files
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    /// Open the store, creating the directory if needed
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .with_context(|| format!("creating uploads directory {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write an upload and return its generated filename.
    ///
    /// The name is the current Unix time in milliseconds plus the original
    /// extension, with `-N` appended on collision.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String> {
        let stem = unix_millis().to_string();
        let ext = sanitized_extension(original_name);

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = generated_name(&stem, attempt, ext.as_deref());
            let path = self.root.join(&name);

            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(e).with_context(|| format!("creating {}", path.display()));
                }
            };

            if let Err(e) = write_all(&mut file, bytes).await {
                drop(file);
                let _ = fs::remove_file(&path).await;
                return Err(e).with_context(|| format!("writing {}", path.display()));
            }

            debug!(file = %name, size = bytes.len(), "Stored upload");
            return Ok(name);
        }

        anyhow::bail!("no free filename for upload {original_name:?}")
    }

    /// Delete a stored file. Missing files are ignored.
    pub async fn remove(&self, filename: &str) {
        let Some(path) = self.path_of(filename) else {
            warn!(file = %filename, "Refusing to remove file outside uploads directory");
            return;
        };

        match fs::remove_file(&path).await {
            Ok(()) => debug!(file = %filename, "Removed upload"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(file = %filename, error = %e, "Failed to remove upload"),
        }
    }

    /// Resolve a stored filename to its path.
    ///
    /// Returns `None` for names that could escape the directory.
    pub fn path_of(&self, filename: &str) -> Option<PathBuf> {
        if filename.is_empty()
            || filename == "."
            || filename.contains("..")
            || filename.contains(['/', '\\'])
        {
            return None;
        }
        Some(self.root.join(filename))
    }
}

async fn write_all(file: &mut fs::File, bytes: &[u8]) -> std::io::Result<()> {
    file.write_all(bytes).await?;
    file.flush().await
}

fn generated_name(stem: &str, attempt: u32, ext: Option<&str>) -> String {
    let base = if attempt == 0 {
        stem.to_string()
    } else {
        format!("{stem}-{attempt}")
    };
    match ext {
        Some(ext) => format!("{base}.{ext}"),
        None => base,
    }
}

/// Lowercased extension of the client filename, if it is short and alphanumeric
fn sanitized_extension(original_name: &str) -> Option<String> {
    let file_name = original_name.rsplit(['/', '\\']).next()?;
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty()
        || ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}
