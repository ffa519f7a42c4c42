// crates/client/src/handle.rs
//! Durable client-side job handles, so a restart can resume polling.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use mealweek_core::JobType;
use serde::{Deserialize, Serialize};

/// A persisted reference to an in-flight job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientJobHandle {
    pub job_id: String,
    pub kind: JobType,
}

/// Key-value persistence for job handles, one slot per job kind.
///
/// Injected rather than ambient so tests can swap in an in-memory
/// implementation.
pub trait HandleStore: Send + Sync {
    fn load(&self, kind: JobType) -> Option<ClientJobHandle>;
    fn store(&self, handle: &ClientJobHandle);
    fn clear(&self, kind: JobType);
}

/// File-backed handle store: one small JSON file mapping job kind to id.
pub struct FileHandleStore {
    path: PathBuf,
}

impl FileHandleStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_map(&self) -> HashMap<String, String> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_default(),
            Err(_) => HashMap::new(),
        }
    }

    fn write_map(&self, map: &HashMap<String, String>) {
        if let Some(parent) = self.path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(map) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&self.path, json) {
                    tracing::warn!(path = %self.path.display(), error = %e, "failed to persist job handle");
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to serialize job handles"),
        }
    }
}

impl HandleStore for FileHandleStore {
    fn load(&self, kind: JobType) -> Option<ClientJobHandle> {
        self.read_map().get(kind.as_db_str()).map(|id| ClientJobHandle {
            job_id: id.clone(),
            kind,
        })
    }

    fn store(&self, handle: &ClientJobHandle) {
        let mut map = self.read_map();
        map.insert(handle.kind.as_db_str().to_string(), handle.job_id.clone());
        self.write_map(&map);
    }

    fn clear(&self, kind: JobType) {
        let mut map = self.read_map();
        if map.remove(kind.as_db_str()).is_some() {
            self.write_map(&map);
        }
    }
}

/// In-memory store for tests and single-process embedding.
#[derive(Default)]
pub struct MemoryHandleStore {
    handles: Mutex<HashMap<JobType, String>>,
}

impl MemoryHandleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HandleStore for MemoryHandleStore {
    fn load(&self, kind: JobType) -> Option<ClientJobHandle> {
        self.handles
            .lock()
            .expect("handle map lock")
            .get(&kind)
            .map(|id| ClientJobHandle {
                job_id: id.clone(),
                kind,
            })
    }

    fn store(&self, handle: &ClientJobHandle) {
        self.handles
            .lock()
            .expect("handle map lock")
            .insert(handle.kind, handle.job_id.clone());
    }

    fn clear(&self, kind: JobType) {
        self.handles.lock().expect("handle map lock").remove(&kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(kind: JobType, id: &str) -> ClientJobHandle {
        ClientJobHandle {
            job_id: id.to_string(),
            kind,
        }
    }

    #[test]
    fn test_file_store_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileHandleStore::new(tmp.path().join("handles.json"));

        assert!(store.load(JobType::PlanGeneration).is_none());

        store.store(&handle(JobType::PlanGeneration, "job-1"));
        let loaded = store.load(JobType::PlanGeneration).unwrap();
        assert_eq!(loaded.job_id, "job-1");

        store.clear(JobType::PlanGeneration);
        assert!(store.load(JobType::PlanGeneration).is_none());
    }

    #[test]
    fn test_file_store_kinds_are_independent() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileHandleStore::new(tmp.path().join("handles.json"));

        store.store(&handle(JobType::PlanGeneration, "plan-job"));
        store.store(&handle(JobType::SharePreparation, "share-job"));

        store.clear(JobType::PlanGeneration);
        assert!(store.load(JobType::PlanGeneration).is_none());
        assert_eq!(
            store.load(JobType::SharePreparation).unwrap().job_id,
            "share-job"
        );
    }

    #[test]
    fn test_file_store_survives_reload() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("handles.json");

        FileHandleStore::new(path.clone()).store(&handle(JobType::PlanGeneration, "job-9"));

        // A fresh store over the same file sees the handle.
        let reloaded = FileHandleStore::new(path);
        assert_eq!(
            reloaded.load(JobType::PlanGeneration).unwrap().job_id,
            "job-9"
        );
    }

    #[test]
    fn test_file_store_tolerates_corrupt_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("handles.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileHandleStore::new(path);
        assert!(store.load(JobType::PlanGeneration).is_none());
        store.store(&handle(JobType::PlanGeneration, "job-1"));
        assert!(store.load(JobType::PlanGeneration).is_some());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryHandleStore::new();
        store.store(&handle(JobType::SharePreparation, "s1"));
        assert_eq!(
            store.load(JobType::SharePreparation).unwrap().job_id,
            "s1"
        );
        store.clear(JobType::SharePreparation);
        assert!(store.load(JobType::SharePreparation).is_none());
    }
}
