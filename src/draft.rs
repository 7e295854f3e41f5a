//! # Local Draft Store
//!
//! Durable mirror of the in-progress workbook. One JSON document per storage
//! key, kept on the local filesystem, rewritten on every edit.
//!
//! Both operations fail soft:
//! - `load` returns the seeded default document when the file is missing or
//!   unreadable or does not parse; a half-written draft never blocks a
//!   session from starting
//! - `save` logs and drops the error on any IO or serialization failure; a
//!   full disk never crashes the session
//!
//! The storage key is injected, not hard-coded, so two deployments (or two
//! workbooks) can coexist in the same draft directory. No cross-process
//! coordination is attempted: last writer wins, which is acceptable for a
//! single interactive session.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::model::AppData;

pub struct DraftStore {
    path: PathBuf,
}

impl DraftStore {
    pub fn new(dir: &Path, key: &str) -> Self {
        Self {
            path: dir.join(format!("{key}.json")),
        }
    }

    /// Read the draft back, or the default document if there is nothing
    /// usable on disk.
    pub fn load(&self) -> AppData {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return AppData::default(),
        };

        match serde_json::from_str(&raw) {
            Ok(data) => data,
            Err(e) => {
                warn!(path = %self.path.display(), "rascunho ilegível, usando documento padrão: {e}");
                AppData::default()
            }
        }
    }

    /// Mirror the current document to disk. Never fails the caller.
    pub fn save(&self, data: &AppData) {
        let raw = match serde_json::to_string(data) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("falha ao serializar rascunho: {e}");
                return;
            }
        };

        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!(dir = %parent.display(), "falha ao criar diretório de rascunhos: {e}");
                return;
            }
        }

        if let Err(e) = fs::write(&self.path, raw) {
            warn!(path = %self.path.display(), "falha ao gravar rascunho: {e}");
        }
    }

    /// Drop the persisted draft. Used by the explicit session reset.
    pub fn clear(&self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), "falha ao remover rascunho: {e}");
            }
        }
    }
}
