use crate::error::StoreError;
use crate::task::Task;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// The whole task collection, kept as one pretty-printed JSON array.
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrites the file with `tasks`. No partial-write protection.
    pub fn save(&self, tasks: &[Task]) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(tasks).map_err(StoreError::Encode)?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .map_err(|source| StoreError::Write { path: self.path.clone(), source })?;
        }
        fs::write(&self.path, content)
            .map_err(|source| StoreError::Write { path: self.path.clone(), source })?;
        Ok(())
    }

    /// Reads the collection. A missing file is initialized to `[]`.
    pub fn load(&self) -> Result<Vec<Task>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("initializing empty task file at {}", self.path.display());
                self.save(&[])?;
                return Ok(Vec::new());
            }
            Err(source) => return Err(StoreError::Read { path: self.path.clone(), source }),
        };
        let tasks = serde_json::from_str(&content)
            .map_err(|source| StoreError::Parse { path: self.path.clone(), source })?;
        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task;

    fn sample() -> Vec<Task> {
        let now = task::now();
        let mut done = Task::new("Pay rent".into(), "before the 5th".into(), now);
        done.completed = true;
        done.updated_at = Some(now);
        vec![Task::new("Buy milk".into(), String::new(), now), done]
    }

    #[test]
    fn missing_file_is_created_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("nested").join("tasks.json"));
        assert!(store.load().unwrap().is_empty());
        let on_disk: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(on_disk, serde_json::json!([]));
    }

    #[test]
    fn save_then_load_returns_same_tasks() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("tasks.json"));
        let tasks = sample();
        store.save(&tasks).unwrap();
        assert_eq!(store.load().unwrap(), tasks);
    }

    #[test]
    fn resaving_loaded_collection_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("tasks.json"));
        store.save(&sample()).unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        let loaded = store.load().unwrap();
        store.save(&loaded).unwrap();

        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
        assert_eq!(store.load().unwrap(), loaded);
    }

    #[test]
    fn legacy_file_resaves_byte_for_byte() {
        let legacy = r#"[
  {
    "id": "3f2504e0-4f89-41d3-9a0c-0305e82c3301",
    "title": "Old",
    "description": "",
    "completed": true,
    "createdAt": "2024-05-01T10:00:00.000Z",
    "updatedAt": "2024-05-02T08:30:15.250Z"
  },
  {
    "id": "9b2e6c1a-7d3f-4e8b-a1c2-5f6d7e8f9a0b",
    "title": "Older",
    "description": "from the first release",
    "completed": false,
    "createdAt": "2024-04-30T23:59:59.999Z"
  }
]"#;
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("tasks.json"));
        fs::write(store.path(), legacy).unwrap();

        let loaded = store.load().unwrap();
        store.save(&loaded).unwrap();

        assert_eq!(fs::read_to_string(store.path()).unwrap(), legacy);
    }

    #[test]
    fn save_pretty_prints_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("tasks.json"));
        store.save(&sample()).unwrap();
        store.save(&sample()[..1]).unwrap();
        let content = fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("\n  {"));
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn unreadable_path_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        assert!(matches!(store.load(), Err(StoreError::Read { .. })));
    }

    #[test]
    fn corrupt_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(Store::new(path).load(), Err(StoreError::Parse { .. })));
    }
}
