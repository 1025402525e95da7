//! File-backed session store.
//!
//! Each record lives in its own `<uuid>.json` file. Identifiers are fresh
//! v4 UUIDs, so concurrent writers never target the same path and no
//! locking is needed.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::{MergeError, Result};

/// One stored payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub payload: JsonValue,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    root: PathBuf,
}

impl SessionStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| MergeError::io(&root, e))?;
        Ok(SessionStore { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist `payload` under a newly generated identifier.
    pub fn save(&self, payload: JsonValue) -> Result<SessionRecord> {
        let record = SessionRecord {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            payload,
        };

        let path = self.record_path(&record.id);
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec(&record)?;
        std::fs::write(&tmp, bytes).map_err(|e| MergeError::io(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| MergeError::io(&path, e))?;

        debug!("stored session {}", record.id);
        Ok(record)
    }

    /// Fetch a record. Identifiers that are not UUIDs are simply unknown.
    pub fn load(&self, id: &str) -> Result<SessionRecord> {
        let not_found = || MergeError::NotFound(format!("session {id}"));
        let uuid = Uuid::parse_str(id).map_err(|_| not_found())?;

        let path = self.record_path(&uuid);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(MergeError::io(&path, e)),
        };
        Ok(serde_json::from_str(&text)?)
    }

    fn record_path(&self, id: &Uuid) -> PathBuf {
        self.root.join(format!("{}.json", id.hyphenated()))
    }
}
