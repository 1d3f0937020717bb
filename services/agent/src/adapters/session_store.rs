//! services/agent/src/adapters/session_store.rs
//!
//! This module contains the JSON file adapter, the concrete implementation of the
//! `SessionRepository` port. Each student has one pretty-printed document at
//! `<sessions-dir>/<student_id>.json`, replaced atomically on every save.

use async_trait::async_trait;
use rural_ed_core::{
    domain::{validate_student_id, SessionDocument},
    ports::{PortError, PortResult, SessionRepository},
    session::merge_documents,
};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::{debug, info};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A file-backed store that implements the `SessionRepository` port.
///
/// Saves for the same student are serialized within the process; there is no
/// cross-process locking.
pub struct JsonSessionStore {
    base_dir: PathBuf,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl JsonSessionStore {
    /// Creates a new `JsonSessionStore`. The directory is created on first save.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn path_for(&self, student_id: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", student_id))
    }

    async fn lock_for(&self, student_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(student_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn read_document(path: &Path) -> PortResult<Option<SessionDocument>> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(PortError::Unexpected(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };
        serde_json::from_str(&raw).map(Some).map_err(|e| {
            PortError::Unexpected(format!("corrupt session file {}: {}", path.display(), e))
        })
    }
}

/// Writes to a temporary file beside `path`, then renames it over `path`.
fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    write_atomic_with(path, |file| file.write_all(contents))
}

/// Any failure before the rename drops the temporary file and leaves `path` as it was.
fn write_atomic_with<F>(path: &Path, write: F) -> std::io::Result<()>
where
    F: FnOnce(&mut NamedTempFile) -> std::io::Result<()>,
{
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("cannot determine parent directory for {}", path.display()),
        )
    })?;
    let mut temp_file = NamedTempFile::new_in(parent)?;
    write(&mut temp_file)?;
    temp_file.as_file().sync_all()?;
    temp_file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

//=========================================================================================
// `SessionRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl SessionRepository for JsonSessionStore {
    async fn load(&self, student_id: &str) -> PortResult<SessionDocument> {
        validate_student_id(student_id)?;
        let path = self.path_for(student_id);
        Self::read_document(&path)
            .await?
            .ok_or_else(|| PortError::NotFound(format!("no session for student {}", student_id)))
    }

    async fn save(
        &self,
        student_id: &str,
        document: &SessionDocument,
    ) -> PortResult<SessionDocument> {
        validate_student_id(student_id)?;
        let lock = self.lock_for(student_id).await;
        let _guard = lock.lock().await;

        tokio::fs::create_dir_all(&self.base_dir).await.map_err(|e| {
            PortError::Unexpected(format!(
                "failed to create sessions directory {}: {}",
                self.base_dir.display(),
                e
            ))
        })?;

        let path = self.path_for(student_id);
        let existing = Self::read_document(&path).await?;
        let is_new = existing.is_none();

        let mut incoming = document.clone();
        incoming.student_id = student_id.to_string();
        let merged = merge_documents(existing, incoming);

        let contents = serde_json::to_vec_pretty(&merged)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let target = path.clone();
        tokio::task::spawn_blocking(move || write_atomic(&target, &contents))
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .map_err(|e| {
                PortError::Unexpected(format!("failed to write {}: {}", path.display(), e))
            })?;

        if is_new {
            info!("Created session file {}", path.display());
        } else {
            debug!("Merged session file {}", path.display());
        }
        Ok(merged)
    }
}
