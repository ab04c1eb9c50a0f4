//! Append-only message log
//!
//! Every accepted submission becomes one JSON line at the end of the log
//! file. Appends are serialised through a process-wide async mutex and each
//! line goes out in a single `write_all`, so concurrent requests never
//! interleave partial lines.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::ContactMessage;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to encode contact message: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to open message log {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("failed to write message log: {0}")]
    Write(#[from] io::Error),
}

/// Single-writer JSON Lines log
#[derive(Debug)]
pub struct MessageStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl MessageStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, creating the file if needed
    pub async fn append(&self, message: &ContactMessage) -> Result<(), StoreError> {
        let line = message.to_json_line()?;

        let _guard = self.write_lock.lock().await;

        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        options.mode(0o644);

        let mut file = options
            .open(&self.path)
            .await
            .map_err(|source| StoreError::Open {
                path: self.path.clone(),
                source,
            })?;

        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use std::sync::Arc;

    fn message(name: &str) -> ContactMessage {
        ContactMessage {
            ts: "2024-05-01T12:30:00Z".to_string(),
            ip: Some("127.0.0.1".to_string()),
            user_agent: Some("test".to_string()),
            name: name.to_string(),
            email: format!("{name}@example.com"),
            message: "Hello".to_string(),
        }
    }

    #[tokio::test]
    async fn test_append_creates_file() {
        let dir = testing::temp_dir("store-create");
        let store = MessageStore::new(dir.join("messages.jsonl"));
        assert!(!store.path().exists());

        store.append(&message("ada")).await.unwrap();

        let lines = testing::read_lines(store.path());
        assert_eq!(lines.len(), 1);
        let stored: ContactMessage = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(stored, message("ada"));
    }

    #[tokio::test]
    async fn test_append_preserves_existing_lines() {
        let dir = testing::temp_dir("store-append");
        let path = dir.join("messages.jsonl");
        std::fs::write(&path, "{\"existing\":true}\n").unwrap();

        let store = MessageStore::new(&path);
        store.append(&message("ada")).await.unwrap();
        store.append(&message("grace")).await.unwrap();

        let lines = testing::read_lines(&path);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "{\"existing\":true}");
        assert!(lines[2].contains("\"name\":\"grace\""));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_do_not_interleave() {
        let dir = testing::temp_dir("store-concurrent");
        let store = Arc::new(MessageStore::new(dir.join("messages.jsonl")));
        let long_body = "x".repeat(64 * 1024);

        let mut handles = Vec::new();
        for i in 0..64 {
            let store = Arc::clone(&store);
            let mut msg = message(&format!("user{i}"));
            msg.message.clone_from(&long_body);
            handles.push(tokio::spawn(async move { store.append(&msg).await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let lines = testing::read_lines(store.path());
        assert_eq!(lines.len(), 64);
        for line in &lines {
            let stored: ContactMessage = serde_json::from_str(line).unwrap();
            assert_eq!(stored.message.len(), long_body.len());
        }
    }

    #[tokio::test]
    async fn test_unwritable_path_is_reported() {
        let dir = testing::temp_dir("store-unwritable");
        // A directory cannot be opened for appending
        let store = MessageStore::new(&dir);
        let err = store.append(&message("ada")).await.unwrap_err();
        assert!(matches!(err, StoreError::Open { .. }));

        let store = MessageStore::new(dir.join("missing").join("messages.jsonl"));
        assert!(store.append(&message("ada")).await.is_err());
    }
}
