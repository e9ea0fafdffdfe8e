//! Generated-letter store: one file per request, plus a "latest" pointer.
//!
//! The naive implementation of this service writes every letter to one
//! fixed path, so two concurrent uploads corrupt each other's download.
//! Here every letter gets a UUID filename, written atomically (temp file +
//! rename), and a small in-memory pointer remembers the most recent one —
//! `GET /download/` keeps its "most recently generated" meaning without
//! the race.
//!
//! The pointer is process-local on purpose: letters are ephemeral request
//! artefacts, not records. A restart forgets them; the files stay on disk
//! until the directory is cleaned.

use crate::error::DraftError;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use uuid::Uuid;

/// Handle to one generated letter on disk.
#[derive(Debug, Clone)]
pub struct StoredLetter {
    pub id: Uuid,
    pub path: PathBuf,
}

/// Directory-backed store of generated letters.
#[derive(Debug)]
pub struct DraftStore {
    dir: PathBuf,
    latest: RwLock<Option<StoredLetter>>,
}

impl DraftStore {
    /// Open (and create if needed) the store directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, DraftError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| DraftError::OutputWriteFailed {
            path: dir.clone(),
            source: e,
        })?;
        Ok(Self {
            dir,
            latest: RwLock::new(None),
        })
    }

    /// Write letter bytes under a fresh UUID and mark it latest.
    pub async fn save(&self, bytes: &[u8]) -> Result<StoredLetter, DraftError> {
        let id = Uuid::new_v4();
        let path = self.letter_path(id);

        // Atomic write: a reader following the latest pointer must never
        // see a half-written zip.
        let tmp_path = path.with_extension("docx.tmp");
        tokio::fs::write(&tmp_path, bytes)
            .await
            .map_err(|e| DraftError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| DraftError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;

        let stored = StoredLetter { id, path };
        *self
            .latest
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(stored.clone());
        Ok(stored)
    }

    /// The most recently saved letter, if any (last write wins).
    pub fn latest(&self) -> Option<StoredLetter> {
        self.latest
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Look up a letter by id; `None` if it was never written or the file
    /// is gone.
    pub fn find(&self, id: Uuid) -> Option<StoredLetter> {
        let path = self.letter_path(id);
        path.exists().then_some(StoredLetter { id, path })
    }

    /// The store directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn letter_path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("reply-{id}.docx"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_then_latest_and_find() {
        let tmp = tempfile::tempdir().unwrap();
        let store = DraftStore::new(tmp.path()).unwrap();

        assert!(store.latest().is_none());

        let stored = store.save(b"PK fake docx").await.unwrap();
        assert!(stored.path.exists());

        let latest = store.latest().unwrap();
        assert_eq!(latest.id, stored.id);

        let found = store.find(stored.id).unwrap();
        assert_eq!(found.path, stored.path);
    }

    #[tokio::test]
    async fn latest_is_last_write_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let store = DraftStore::new(tmp.path()).unwrap();

        let first = store.save(b"first").await.unwrap();
        let second = store.save(b"second").await.unwrap();
        assert_ne!(first.id, second.id, "every letter gets its own id");

        let latest = store.latest().unwrap();
        assert_eq!(latest.id, second.id);

        // The first letter is still downloadable by id.
        assert!(store.find(first.id).is_some());
    }

    #[tokio::test]
    async fn find_unknown_id_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        let store = DraftStore::new(tmp.path()).unwrap();
        assert!(store.find(Uuid::new_v4()).is_none());
    }

    #[tokio::test]
    async fn no_tmp_file_left_behind() {
        let tmp = tempfile::tempdir().unwrap();
        let store = DraftStore::new(tmp.path()).unwrap();
        store.save(b"bytes").await.unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map(|x| x == "tmp").unwrap_or(false))
            .collect();
        assert!(leftovers.is_empty());
    }
}
