//! Progress persistence: one small record per session.
//!
//! Storage is opaque key-value persistence. The controller calls `load` at
//! session open and `save` after every state-affecting transition. Saves are
//! fire-and-forget: failures are logged and absorbed, never surfaced. Corrupt
//! or missing data reads as "no prior progress".

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Persisted state layout. Field names match the record the original client
/// kept in local storage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
  #[serde(rename = "completedLessonIds")]
  pub completed_lesson_ids: Vec<u32>,
  pub streak: u32,
  #[serde(rename = "currentLessonId")]
  pub current_lesson_id: u32,
}

impl Default for ProgressRecord {
  fn default() -> Self {
    Self { completed_lesson_ids: Vec::new(), streak: 0, current_lesson_id: 1 }
  }
}

pub trait ProgressStore: Send + Sync {
  /// None means no usable prior progress (absent or unparseable).
  fn load(&self, session_id: &str) -> Option<ProgressRecord>;
  /// Last-write-wins; errors are absorbed.
  fn save(&self, session_id: &str, record: &ProgressRecord);
}

/// Pick a store from the environment: PROGRESS_DIR enables file persistence,
/// otherwise progress lives only for the process lifetime.
pub fn store_from_env() -> Box<dyn ProgressStore> {
  match std::env::var("PROGRESS_DIR") {
    Ok(dir) => {
      let dir = PathBuf::from(dir);
      if let Err(e) = std::fs::create_dir_all(&dir) {
        error!(target: "pylingo_backend", dir = %dir.display(), error = %e,
               "Cannot create progress dir; falling back to in-memory store");
        return Box::new(MemoryProgressStore::new());
      }
      info!(target: "pylingo_backend", dir = %dir.display(), "File progress store enabled");
      Box::new(FileProgressStore { dir })
    }
    Err(_) => {
      info!(target: "pylingo_backend", "PROGRESS_DIR not set; using in-memory progress store");
      Box::new(MemoryProgressStore::new())
    }
  }
}

/// One JSON file per session under a configured directory.
pub struct FileProgressStore {
  dir: PathBuf,
}

impl FileProgressStore {
  pub fn new(dir: PathBuf) -> Self {
    Self { dir }
  }

  fn path_for(&self, session_id: &str) -> PathBuf {
    // Session ids are uuids, but never trust them as path components.
    let safe: String = session_id
      .chars()
      .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
      .collect();
    self.dir.join(format!("{}.json", safe))
  }
}

impl ProgressStore for FileProgressStore {
  fn load(&self, session_id: &str) -> Option<ProgressRecord> {
    let path = self.path_for(session_id);
    let raw = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str::<ProgressRecord>(&raw) {
      Ok(rec) => Some(rec),
      Err(e) => {
        warn!(target: "pylingo_backend", path = %path.display(), error = %e,
              "Corrupt progress record; starting from defaults");
        None
      }
    }
  }

  fn save(&self, session_id: &str, record: &ProgressRecord) {
    let path = self.path_for(session_id);
    let json = match serde_json::to_string(record) {
      Ok(j) => j,
      Err(e) => {
        error!(target: "pylingo_backend", error = %e, "Progress serialization failed");
        return;
      }
    };
    if let Err(e) = std::fs::write(&path, json) {
      error!(target: "pylingo_backend", path = %path.display(), error = %e, "Progress write failed");
    }
  }
}

/// Process-local store used when no directory is configured, and in tests.
pub struct MemoryProgressStore {
  records: RwLock<HashMap<String, ProgressRecord>>,
}

impl MemoryProgressStore {
  pub fn new() -> Self {
    Self { records: RwLock::new(HashMap::new()) }
  }
}

impl ProgressStore for MemoryProgressStore {
  fn load(&self, session_id: &str) -> Option<ProgressRecord> {
    self.records.read().ok()?.get(session_id).cloned()
  }

  fn save(&self, session_id: &str, record: &ProgressRecord) {
    if let Ok(mut map) = self.records.write() {
      map.insert(session_id.to_string(), record.clone());
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample() -> ProgressRecord {
    ProgressRecord { completed_lesson_ids: vec![1, 2, 3], streak: 3, current_lesson_id: 4 }
  }

  #[test]
  fn file_store_round_trips() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileProgressStore::new(dir.path().to_path_buf());
    let rec = sample();
    store.save("abc-123", &rec);
    assert_eq!(store.load("abc-123"), Some(rec));
  }

  #[test]
  fn missing_record_reads_as_none() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileProgressStore::new(dir.path().to_path_buf());
    assert_eq!(store.load("nobody"), None);
  }

  #[test]
  fn corrupt_record_reads_as_none() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("bad.json"), "{not json").expect("write");
    let store = FileProgressStore::new(dir.path().to_path_buf());
    assert_eq!(store.load("bad"), None);
  }

  #[test]
  fn persisted_layout_uses_client_field_names() {
    let json = serde_json::to_string(&sample()).expect("json");
    assert!(json.contains("completedLessonIds"));
    assert!(json.contains("currentLessonId"));
    assert!(json.contains("streak"));
  }

  #[test]
  fn memory_store_round_trips() {
    let store = MemoryProgressStore::new();
    let rec = sample();
    store.save("s", &rec);
    assert_eq!(store.load("s"), Some(rec));
    assert_eq!(store.load("other"), None);
  }
}
