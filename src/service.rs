use crate::error::TaskError;
use crate::store::Store;
use crate::task::{now, parse_id, NewTask, Task, TaskPatch};
use std::sync::{Mutex, MutexGuard};

/// CRUD rules over the [`Store`].
///
/// Every operation holds the store lock for its whole load, mutate and save
/// cycle, so concurrent callers in one process are applied one at a time.
pub struct TaskService {
    store: Mutex<Store>,
}

impl TaskService {
    pub fn new(store: Store) -> Self {
        Self { store: Mutex::new(store) }
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        // Store holds no in-memory state; a poisoned lock is safe to reuse.
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// All tasks, newest first. Tasks created in the same millisecond list
    /// the later-stored one first.
    pub fn list_all(&self) -> Result<Vec<Task>, TaskError> {
        let mut tasks = self.store().load()?;
        tasks.reverse();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    pub fn get_by_id(&self, id: &str) -> Result<Task, TaskError> {
        let id = checked_id(id)?;
        self.store()
            .load()?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or(TaskError::NotFound(id))
    }

    pub fn create(&self, input: NewTask) -> Result<Task, TaskError> {
        let input = input.validate().map_err(TaskError::Validation)?;
        let store = self.store();
        let mut tasks = store.load()?;
        let task = Task::new(input.title, input.description, now());
        tasks.push(task.clone());
        store.save(&tasks)?;
        log::info!("created task {} ({:?})", task.id, task.title);
        Ok(task)
    }

    pub fn update(&self, id: &str, patch: TaskPatch) -> Result<Task, TaskError> {
        let id = checked_id(id)?;
        let patch = patch.validate().map_err(TaskError::Validation)?;
        let store = self.store();
        let mut tasks = store.load()?;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| TaskError::NotFound(id.clone()))?;
        task.apply(patch, now());
        let updated = task.clone();
        store.save(&tasks)?;
        log::info!("updated task {}", updated.id);
        Ok(updated)
    }

    pub fn delete(&self, id: &str) -> Result<(), TaskError> {
        let id = checked_id(id)?;
        let store = self.store();
        let mut tasks = store.load()?;
        let index = tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TaskError::NotFound(id.clone()))?;
        tasks.remove(index);
        store.save(&tasks)?;
        log::info!("deleted task {}", id);
        Ok(())
    }
}

fn checked_id(raw: &str) -> Result<String, TaskError> {
    parse_id(raw).ok_or_else(|| TaskError::MalformedId(raw.to_string()))
}
