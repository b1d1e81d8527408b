use async_trait::async_trait;
use pinhole_core::repository::{LinkStore, Result};
use pinhole_core::{LinkTable, StorageError};
use std::ffi::{OsStr, OsString};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File implementation of the link store contract.
///
/// The whole table lives in one pretty-printed JSON object keyed by short
/// code. Saves write a uniquely named temporary file in the same directory,
/// sync it, and persist it over the target, so a reader sees either the old
/// table or the new one. Concurrent saves never share a temporary file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store backed by the file at `path`.
    ///
    /// The file does not need to exist yet; it is created by the first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LinkStore for JsonFileStore {
    async fn load(&self) -> Result<LinkTable> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "link file not found, starting empty");
                return Ok(LinkTable::new());
            }
            Err(err) => {
                return Err(StorageError::Read(format!(
                    "{}: {err}",
                    self.path.display()
                )));
            }
        };

        if contents.trim().is_empty() {
            info!(path = %self.path.display(), "link file is empty, starting empty");
            return Ok(LinkTable::new());
        }

        let table: LinkTable = serde_json::from_str(&contents).map_err(|err| {
            StorageError::Read(format!("{} is corrupt: {err}", self.path.display()))
        })?;

        info!(path = %self.path.display(), links = table.len(), "loaded link file");
        Ok(table)
    }

    async fn save(&self, table: &LinkTable) -> Result<()> {
        let json = serde_json::to_vec_pretty(table)
            .map_err(|err| StorageError::Write(format!("failed to encode links: {err}")))?;

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || replace_file(&path, &json))
            .await
            .map_err(|err| StorageError::Write(format!("save task failed: {err}")))?
            .map_err(|err| StorageError::Write(format!("{}: {err}", self.path.display())))?;

        debug!(path = %self.path.display(), links = table.len(), "saved link file");
        Ok(())
    }
}

/// Writes `contents` to a fresh temporary file next to `path` and moves it
/// into place. The temporary file is removed if any step before the move fails.
fn replace_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut prefix = OsString::from(".");
    prefix.push(path.file_name().unwrap_or_else(|| OsStr::new("links")));
    prefix.push(".");

    let mut temp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(dir)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| err.error)?;

    // The new table is in place from here on.
    if let Err(err) = sync_dir(dir) {
        warn!(path = %dir.display(), error = %err, "failed to sync link file directory");
    }
    Ok(())
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}
