//! The task definition store: an in-memory keyed registry of [`TaskSpec`]s loaded
//! from a directory of JSON documents (spec §4.1).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::ControllerError;

use super::spec::TaskSpec;

/// Read-only keyed registry of task definitions, populated once at construction.
#[derive(Debug, Clone)]
pub struct TaskStore {
    tasks: HashMap<String, Arc<TaskSpec>>,
}

impl TaskStore {
    /// Enumerate `*.json` entries in `dir`, parse each into a [`TaskSpec`]. A parse
    /// failure or a duplicate `name` aborts the whole load with the offending path
    /// (spec §4.1, §9 — duplicate names are `MalformedSpec`, not a silent overwrite).
    /// Non-`.json` entries are silently skipped. Ordering within the directory is not
    /// part of the contract.
    pub fn load(dir: &Path) -> Result<Self, ControllerError> {
        let entries = std::fs::read_dir(dir)
            .map_err(|_| ControllerError::InvalidDirectory(dir.to_path_buf()))?;

        let mut tasks = HashMap::new();

        for entry in entries {
            let entry = entry.map_err(|_| ControllerError::InvalidDirectory(dir.to_path_buf()))?;
            let path = entry.path();

            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let spec = Self::load_one(&path)?;

            if tasks.contains_key(&spec.name) {
                return Err(ControllerError::MalformedSpec {
                    path,
                    reason: format!("duplicate task name: {}", spec.name),
                });
            }

            debug!("task loaded successfully: {}", spec.name);
            tasks.insert(spec.name.clone(), Arc::new(spec));
        }

        info!("task module loaded {} task(s) from {}", tasks.len(), dir.display());
        Ok(Self { tasks })
    }

    fn load_one(path: &PathBuf) -> Result<TaskSpec, ControllerError> {
        let content = std::fs::read_to_string(path).map_err(|e| ControllerError::MalformedSpec {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let spec: TaskSpec =
            serde_json::from_str(&content).map_err(|e| ControllerError::MalformedSpec {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        if spec.name.is_empty() {
            return Err(ControllerError::MalformedSpec {
                path: path.clone(),
                reason: "task name must not be empty".to_string(),
            });
        }

        Ok(spec)
    }

    /// Builds a store directly from in-memory specs, bypassing disk I/O. Used by
    /// `Controller::from_parts` for tests.
    #[cfg(test)]
    pub fn from_map(specs: HashMap<String, TaskSpec>) -> Self {
        Self {
            tasks: specs.into_iter().map(|(k, v)| (k, Arc::new(v))).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Result<Arc<TaskSpec>, ControllerError> {
        self.tasks
            .get(name)
            .cloned()
            .ok_or_else(|| ControllerError::UnknownTask(name.to_string()))
    }

    pub fn names(&self) -> Vec<String> {
        self.tasks.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_task(dir: &Path, filename: &str, contents: &str) {
        fs::write(dir.join(filename), contents).unwrap();
    }

    #[test]
    fn loads_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = TaskStore::load(dir.path()).unwrap();
        assert!(store.names().is_empty());
    }

    #[test]
    fn loads_tasks_and_skips_non_json() {
        let dir = tempfile::tempdir().unwrap();
        write_task(
            dir.path(),
            "hello.json",
            r#"{"name":"hello","image":"alpine:latest","on_success":["world"]}"#,
        );
        write_task(dir.path(), "world.json", r#"{"name":"world","image":"alpine:latest"}"#);
        write_task(dir.path(), "README.md", "not a task");

        let store = TaskStore::load(dir.path()).unwrap();
        let mut names = store.names();
        names.sort();
        assert_eq!(names, vec!["hello".to_string(), "world".to_string()]);

        let hello = store.get("hello").unwrap();
        assert_eq!(hello.on_success, vec!["world".to_string()]);
    }

    #[test]
    fn malformed_json_aborts_load() {
        let dir = tempfile::tempdir().unwrap();
        write_task(dir.path(), "bad.json", "{not valid json");

        let err = TaskStore::load(dir.path()).unwrap_err();
        assert!(matches!(err, ControllerError::MalformedSpec { .. }));
    }

    #[test]
    fn duplicate_name_aborts_load() {
        let dir = tempfile::tempdir().unwrap();
        write_task(dir.path(), "a.json", r#"{"name":"hello","image":"alpine:latest"}"#);
        write_task(dir.path(), "b.json", r#"{"name":"hello","image":"other:latest"}"#);

        let err = TaskStore::load(dir.path()).unwrap_err();
        match err {
            ControllerError::MalformedSpec { reason, .. } => {
                assert!(reason.contains("duplicate"));
            }
            other => panic!("expected MalformedSpec, got {:?}", other),
        }
    }

    #[test]
    fn unreadable_directory_is_invalid_directory() {
        let err = TaskStore::load(Path::new("/nonexistent/path/for/sure")).unwrap_err();
        assert!(matches!(err, ControllerError::InvalidDirectory(_)));
    }

    #[test]
    fn unknown_task_lookup_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = TaskStore::load(dir.path()).unwrap();
        let err = store.get("ghost").unwrap_err();
        assert!(matches!(err, ControllerError::UnknownTask(name) if name == "ghost"));
    }
}
