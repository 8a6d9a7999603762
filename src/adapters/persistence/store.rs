//! Session Store - Atomic JSON Per-Owner Persistence
//!
//! Saves one session record per owner address using atomic writes
//! (write to tmp file, then rename). This guarantees crash safety
//! and prevents partial writes from corrupting a session.

use std::path::{Path, PathBuf};

use alloy::primitives::Address;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info, instrument};

use crate::domain::session::Session;
use crate::ports::store::SessionStore;

/// Atomic JSON session store keyed by owner address.
///
/// Each owner gets `session-<address>.json`; writes go to a `.tmp`
/// sibling first, then rename. The file is always either the old or
/// the new version, never a partial write.
pub struct FileSessionStore {
    /// Directory holding session records.
    dir: PathBuf,
}

impl FileSessionStore {
    /// Create a store in the given data directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub async fn new(data_dir: &str) -> Result<Self> {
        let dir = Path::new(data_dir).to_path_buf();
        fs::create_dir_all(&dir)
            .await
            .context("Failed to create session data directory")?;

        Ok(Self { dir })
    }

    fn path_for(&self, owner: Address) -> PathBuf {
        self.dir
            .join(format!("session-{}.json", owner.to_string().to_lowercase()))
    }

    fn tmp_path_for(&self, owner: Address) -> PathBuf {
        self.dir
            .join(format!("session-{}.json.tmp", owner.to_string().to_lowercase()))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    #[instrument(skip(self), fields(owner = %owner))]
    async fn load(&self, owner: Address) -> Result<Option<Session>> {
        let path = self.path_for(owner);
        if !path.exists() {
            debug!("No session record found");
            return Ok(None);
        }

        let json = fs::read_to_string(&path)
            .await
            .context("Failed to read session file")?;

        let session: Session =
            serde_json::from_str(&json).context("Failed to parse session JSON")?;

        debug!(
            schema = session.schema_version,
            complete = session.is_complete(),
            "Session record loaded"
        );

        Ok(Some(session))
    }

    #[instrument(skip(self, session), fields(owner = %session.owner_address))]
    async fn save(&self, session: &Session) -> Result<()> {
        let json = serde_json::to_string_pretty(session)
            .context("Failed to serialize session")?;

        let tmp = self.tmp_path_for(session.owner_address);
        let path = self.path_for(session.owner_address);

        // Write to tmp file, then atomic rename
        fs::write(&tmp, &json)
            .await
            .context("Failed to write tmp session file")?;
        fs::rename(&tmp, &path)
            .await
            .context("Failed to rename session file")?;

        info!(path = %path.display(), "Session persisted");
        Ok(())
    }

    async fn delete(&self, owner: Address) -> Result<()> {
        let path = self.path_for(owner);
        if path.exists() {
            fs::remove_file(&path)
                .await
                .context("Failed to delete session file")?;
            info!(owner = %owner, "Session record deleted");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> String {
        std::env::temp_dir()
            .join(format!("session-store-test-{}", uuid::Uuid::new_v4()))
            .to_string_lossy()
            .into_owned()
    }

    #[tokio::test]
    async fn save_load_delete_roundtrip() {
        let store = FileSessionStore::new(&temp_dir()).await.unwrap();
        let owner = Address::repeat_byte(0x11);

        assert!(store.load(owner).await.unwrap().is_none());

        let session = Session::new(owner, Address::repeat_byte(0x22));
        store.save(&session).await.unwrap();

        let loaded = store.load(owner).await.unwrap().unwrap();
        assert_eq!(loaded.owner_address, owner);
        assert_eq!(loaded.proxy_address, session.proxy_address);

        store.delete(owner).await.unwrap();
        assert!(store.load(owner).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sessions_are_scoped_per_owner() {
        let store = FileSessionStore::new(&temp_dir()).await.unwrap();
        let owner_a = Address::repeat_byte(0xa1);
        let owner_b = Address::repeat_byte(0xb2);

        store
            .save(&Session::new(owner_a, Address::repeat_byte(0x01)))
            .await
            .unwrap();

        // Owner B must never see owner A's record.
        assert!(store.load(owner_b).await.unwrap().is_none());
    }
}
