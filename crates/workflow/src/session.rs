use crate::document::ScriptDocument;
use crate::store::WorkflowStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session io error: {0}")]
    Io(#[from] io::Error),

    #[error("session encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

pub fn app_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(std::env::temp_dir);
    base.join("envision")
}

fn sessions_dir() -> PathBuf {
    app_data_dir().join("sessions")
}

fn session_path(dir: &Path, key: &str) -> PathBuf {
    let safe: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    dir.join(format!("{safe}.json"))
}

/// The persistable slice of the workflow store. Busy flags are deliberately
/// not part of it: a restored session never resumes an in-flight request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowSnapshot {
    pub main_prompt: String,
    pub scene_count: u32,
    pub document: Option<ScriptDocument>,
    pub saved_at: DateTime<Utc>,
}

impl WorkflowSnapshot {
    pub fn capture(store: &WorkflowStore) -> Self {
        Self {
            main_prompt: store.main_prompt().to_string(),
            scene_count: store.scene_count(),
            document: store.document().cloned(),
            saved_at: Utc::now(),
        }
    }

    /// Writes the snapshot fields straight into the store, bypassing the
    /// setters so the restored document is not invalidated by its own
    /// prompt.
    pub fn restore(self, store: &mut WorkflowStore) {
        store.main_prompt = self.main_prompt;
        store.scene_count = self.scene_count.max(1);
        store.document = self.document;
        store.active = None;
        store.push_activity("Session restored.");
    }
}

pub fn save_session_in(dir: &Path, store: &WorkflowStore, key: &str) -> Result<(), SessionError> {
    fs::create_dir_all(dir)?;
    let snapshot = WorkflowSnapshot::capture(store);
    let json = serde_json::to_string_pretty(&snapshot)?;
    let path = session_path(dir, key);
    fs::write(&path, json)?;
    tracing::info!(target: "workflow", "saved session to {}", path.display());
    Ok(())
}

pub fn load_session_in(dir: &Path, key: &str) -> Result<Option<WorkflowSnapshot>, SessionError> {
    let path = session_path(dir, key);
    let json = match fs::read_to_string(&path) {
        Ok(json) => json,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    Ok(Some(serde_json::from_str(&json)?))
}

pub fn save_session(store: &WorkflowStore, key: &str) -> Result<(), SessionError> {
    save_session_in(&sessions_dir(), store, key)
}

pub fn load_session(key: &str) -> Result<Option<WorkflowSnapshot>, SessionError> {
    load_session_in(&sessions_dir(), key)
}
