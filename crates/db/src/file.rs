//! File-backed event store: a single pretty-printed JSON array.
//!
//! Writes go to a sibling temp file which is fsynced and renamed over the
//! target, so a reader never observes a half-written array. The
//! read-modify-write cycle of [`append`](FileEventStore::append) is
//! serialized by an async mutex owned by the store; two processes sharing
//! one file can still interleave.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cirelay_core::Event;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::{evict_oldest, EventRepository};

/// Event store persisted to one JSON file.
pub struct FileEventStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileEventStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the file. A missing or blank file is an empty log.
    async fn read_events(&self) -> Result<Vec<Event>, StoreError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&raw).map_err(|source| {
            tracing::error!(path = %self.path.display(), error = %source, "Event store is corrupt");
            StoreError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })
    }

    /// Replace the file contents with `events` via temp file + rename.
    async fn write_events(&self, events: &[Event]) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(events).map_err(StoreError::Serialize)?;
        let tmp_path = self.temp_path();

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| io_error(parent, source))?;
        }

        let mut file = tokio::fs::File::create(&tmp_path)
            .await
            .map_err(|source| io_error(&tmp_path, source))?;
        file.write_all(&json)
            .await
            .map_err(|source| io_error(&tmp_path, source))?;
        file.sync_all()
            .await
            .map_err(|source| io_error(&tmp_path, source))?;
        drop(file);

        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|source| io_error(&self.path, source))
    }

    /// `<dir>/.<file name>.tmp`
    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "events.json".to_string());
        self.path.with_file_name(format!(".{name}.tmp"))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[async_trait]
impl EventRepository for FileEventStore {
    async fn append(&self, event: Event) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut events = self.read_events().await?;
        events.push(event);
        evict_oldest(&mut events);
        self.write_events(&events).await?;

        tracing::debug!(
            path = %self.path.display(),
            stored = events.len(),
            "Event appended"
        );
        Ok(())
    }

    async fn load(&self) -> Result<Vec<Event>, StoreError> {
        self.read_events().await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use crate::MAX_STORED_EVENTS;

    fn numbered_event(n: usize) -> Event {
        Event::from_value(
            json!({ "action": format!("E{n}") }),
            Some("push"),
            Utc::now(),
        )
        .unwrap()
    }

    fn actions(events: &[Event]) -> Vec<String> {
        events
            .iter()
            .map(|e| e.action.clone().unwrap_or_default())
            .collect()
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileEventStore::new(dir.path().join("github_events.json"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("github_events.json");
        std::fs::write(&path, "  \n").unwrap();
        let store = FileEventStore::new(path);
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_then_load_reads_own_write() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileEventStore::new(dir.path().join("github_events.json"));

        store.append(numbered_event(1)).await.unwrap();
        let event = numbered_event(2);
        store.append(event.clone()).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.last(), Some(&event));
    }

    #[tokio::test]
    async fn keeps_only_the_newest_hundred() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileEventStore::new(dir.path().join("github_events.json"));

        for n in 1..=105 {
            store.append(numbered_event(n)).await.unwrap();
        }

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), MAX_STORED_EVENTS);
        let expected: Vec<String> = (6..=105).map(|n| format!("E{n}")).collect();
        assert_eq!(actions(&loaded), expected);
    }

    #[tokio::test]
    async fn persisted_file_is_a_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("github_events.json");
        let store = FileEventStore::new(&path);
        store.append(numbered_event(1)).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let array = raw.as_array().expect("store file should hold an array");
        assert_eq!(array.len(), 1);
        assert_eq!(array[0]["event_type"], "push");
        assert_eq!(array[0]["action"], "E1");
        assert!(array[0]["workflow_run"].is_null());

        // The temp file never outlives a write.
        assert!(!dir.path().join(".github_events.json.tmp").exists());
    }

    #[tokio::test]
    async fn creates_missing_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("github_events.json");
        let store = FileEventStore::new(&path);
        store.append(numbered_event(1)).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn corrupt_file_is_reported_not_repaired() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("github_events.json");
        std::fs::write(&path, "[{\"timestamp\": ").unwrap();
        let store = FileEventStore::new(&path);

        assert_matches!(store.load().await, Err(StoreError::Corrupt { .. }));
        assert_matches!(
            store.append(numbered_event(1)).await,
            Err(StoreError::Corrupt { .. })
        );
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "[{\"timestamp\": ",
            "a failed append must leave the corrupt file untouched"
        );
    }

    #[tokio::test]
    async fn concurrent_appends_through_one_store_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileEventStore::new(dir.path().join("github_events.json")));

        let handles: Vec<_> = (1..=20)
            .map(|n| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.append(numbered_event(n)).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.load().await.unwrap().len(), 20);
    }

    #[tokio::test]
    async fn reads_logs_written_without_utc_offset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("github_events.json");
        std::fs::write(
            &path,
            r#"[{
                "timestamp": "2024-01-01T10:00:00.123456",
                "event_type": "workflow_run",
                "action": "completed",
                "workflow_run": {
                    "name": "build",
                    "status": "completed",
                    "conclusion": "success",
                    "run_number": 3,
                    "updated_at": "2024-01-01T09:59:59Z",
                    "html_url": "https://github.com/o/r/actions/runs/3"
                },
                "check_run": null,
                "repository": "o/r",
                "sender": "octocat"
            }]"#,
        )
        .unwrap();

        let loaded = FileEventStore::new(&path).load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].workflow_run.as_ref().unwrap()["run_number"], 3);
        assert_eq!(loaded[0].sender.as_deref(), Some("octocat"));
    }
}
