use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::AppError;
use crate::model::{
    validate_date_range, Hackathon, HackathonDraft, HackathonPatch, Priority, Status, Task,
    TaskDraft, TaskPatch, User,
};

static COUNTER: AtomicUsize = AtomicUsize::new(1);

#[derive(Default, Serialize, Deserialize)]
struct StoreData {
    #[serde(default)]
    tasks: Vec<Task>,
    #[serde(default)]
    hackathons: Vec<Hackathon>,
    #[serde(default)]
    users: Vec<User>,
}

pub struct EntityStore {
    path: Option<PathBuf>,
    tasks: RwLock<HashMap<String, Task>>,
    hackathons: RwLock<HashMap<String, Hackathon>>,
    users: RwLock<HashMap<String, User>>,
}

impl EntityStore {
    pub fn new(path: Option<PathBuf>) -> Self {
        let data = match &path {
            Some(path) if path.exists() => load_from_disk(path).unwrap_or_default(),
            _ => StoreData::default(),
        };
        Self {
            path,
            tasks: RwLock::new(data.tasks.into_iter().map(|t| (t.id.clone(), t)).collect()),
            hackathons: RwLock::new(
                data.hackathons
                    .into_iter()
                    .map(|h| (h.id.clone(), h))
                    .collect(),
            ),
            users: RwLock::new(data.users.into_iter().map(|u| (u.id.clone(), u)).collect()),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(None)
    }

    pub fn list_tasks(&self) -> Result<Vec<Task>, AppError> {
        let map = self
            .tasks
            .read()
            .map_err(|_| AppError::internal("task store lock poisoned"))?;
        let mut items: Vec<Task> = map.values().cloned().collect();
        items.sort_by(|a, b| a.due_date.cmp(&b.due_date));
        Ok(items)
    }

    pub fn get_task(&self, id: &str) -> Result<Option<Task>, AppError> {
        let map = self
            .tasks
            .read()
            .map_err(|_| AppError::internal("task store lock poisoned"))?;
        Ok(map.get(id).cloned())
    }

    pub fn create_task(&self, draft: TaskDraft) -> Result<Task, AppError> {
        draft.validate()?;
        let now = Utc::now();
        let task = Task {
            id: next_id("task"),
            title: draft.title,
            description: draft.description,
            due_date: draft.due_date,
            priority: draft.priority.unwrap_or(Priority::Medium),
            status: draft.status.unwrap_or(Status::Pending),
            category: draft.category.unwrap_or(crate::model::Category::Daily),
            hackathon_id: draft.hackathon_id,
            created_at: now,
            updated_at: now,
        };
        {
            let mut map = self
                .tasks
                .write()
                .map_err(|_| AppError::internal("task store lock poisoned"))?;
            map.insert(task.id.clone(), task.clone());
        }
        self.save_if_needed();
        Ok(task)
    }

    pub fn update_task(&self, id: &str, patch: TaskPatch) -> Result<Task, AppError> {
        patch.validate()?;
        let updated = {
            let mut map = self
                .tasks
                .write()
                .map_err(|_| AppError::internal("task store lock poisoned"))?;
            let task = map.get_mut(id).ok_or_else(|| AppError::not_found("Task"))?;
            if let Some(title) = patch.title {
                task.title = title;
            }
            if let Some(description) = patch.description {
                task.description = description;
            }
            if let Some(due_date) = patch.due_date {
                task.due_date = due_date;
            }
            if let Some(priority) = patch.priority {
                task.priority = priority;
            }
            if let Some(status) = patch.status {
                task.status = status;
            }
            if let Some(category) = patch.category {
                task.category = category;
            }
            if let Some(hackathon_id) = patch.hackathon_id {
                task.hackathon_id = Some(hackathon_id);
            }
            task.updated_at = Utc::now();
            task.clone()
        };
        self.save_if_needed();
        Ok(updated)
    }

    pub fn delete_task(&self, id: &str) -> Result<(), AppError> {
        {
            let mut map = self
                .tasks
                .write()
                .map_err(|_| AppError::internal("task store lock poisoned"))?;
            if map.remove(id).is_none() {
                return Err(AppError::not_found("Task"));
            }
        }
        self.save_if_needed();
        Ok(())
    }

    pub fn list_hackathons(&self) -> Result<Vec<Hackathon>, AppError> {
        let map = self
            .hackathons
            .read()
            .map_err(|_| AppError::internal("hackathon store lock poisoned"))?;
        let mut items: Vec<Hackathon> = map.values().cloned().collect();
        items.sort_by(|a, b| a.start_date.cmp(&b.start_date));
        Ok(items)
    }

    pub fn get_hackathon(&self, id: &str) -> Result<Option<Hackathon>, AppError> {
        let map = self
            .hackathons
            .read()
            .map_err(|_| AppError::internal("hackathon store lock poisoned"))?;
        Ok(map.get(id).cloned())
    }

    pub fn create_hackathon(&self, draft: HackathonDraft) -> Result<Hackathon, AppError> {
        draft.validate()?;
        let hackathon = Hackathon {
            id: next_id("hackathon"),
            name: draft.name,
            description: draft.description,
            start_date: draft.start_date,
            end_date: draft.end_date,
            url: draft.url,
            tasks: draft.tasks,
            created_at: Utc::now(),
        };
        {
            let mut map = self
                .hackathons
                .write()
                .map_err(|_| AppError::internal("hackathon store lock poisoned"))?;
            map.insert(hackathon.id.clone(), hackathon.clone());
        }
        self.save_if_needed();
        Ok(hackathon)
    }

    pub fn update_hackathon(&self, id: &str, patch: HackathonPatch) -> Result<Hackathon, AppError> {
        patch.validate()?;
        let updated = {
            let mut map = self
                .hackathons
                .write()
                .map_err(|_| AppError::internal("hackathon store lock poisoned"))?;
            let hackathon = map
                .get_mut(id)
                .ok_or_else(|| AppError::not_found("Hackathon"))?;
            let start = patch.start_date.unwrap_or(hackathon.start_date);
            let end = patch.end_date.unwrap_or(hackathon.end_date);
            validate_date_range(start, end)?;
            if let Some(name) = patch.name {
                hackathon.name = name;
            }
            if let Some(description) = patch.description {
                hackathon.description = description;
            }
            hackathon.start_date = start;
            hackathon.end_date = end;
            if let Some(url) = patch.url {
                hackathon.url = Some(url);
            }
            if let Some(tasks) = patch.tasks {
                hackathon.tasks = tasks;
            }
            hackathon.clone()
        };
        self.save_if_needed();
        Ok(updated)
    }

    // Removing a hackathon also clears every task reference to it. Both maps
    // are locked for the whole operation so no reader can observe a task
    // pointing at a hackathon that is already gone.
    pub fn delete_hackathon(&self, id: &str) -> Result<(), AppError> {
        {
            let mut hackathons = self
                .hackathons
                .write()
                .map_err(|_| AppError::internal("hackathon store lock poisoned"))?;
            let mut tasks = self
                .tasks
                .write()
                .map_err(|_| AppError::internal("task store lock poisoned"))?;
            if hackathons.remove(id).is_none() {
                return Err(AppError::not_found("Hackathon"));
            }
            for task in tasks.values_mut() {
                if task.hackathon_id.as_deref() == Some(id) {
                    task.hackathon_id = None;
                    task.updated_at = Utc::now();
                }
            }
        }
        self.save_if_needed();
        Ok(())
    }

    pub fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        let email = email.trim();
        if name.trim().is_empty() || email.is_empty() {
            return Err(AppError::AuthFailed("Registration failed".to_string()));
        }
        let user = User {
            id: next_id("user"),
            name: name.trim().to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        {
            let mut map = self
                .users
                .write()
                .map_err(|_| AppError::internal("user store lock poisoned"))?;
            if map.values().any(|u| u.email == email) {
                return Err(AppError::AuthFailed("Email already exists".to_string()));
            }
            map.insert(user.id.clone(), user.clone());
        }
        self.save_if_needed();
        Ok(user)
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let map = self
            .users
            .read()
            .map_err(|_| AppError::internal("user store lock poisoned"))?;
        Ok(map.values().find(|u| u.email == email.trim()).cloned())
    }

    pub fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let map = self
            .users
            .read()
            .map_err(|_| AppError::internal("user store lock poisoned"))?;
        Ok(map.get(id).cloned())
    }

    fn save_if_needed(&self) {
        let path = match &self.path {
            Some(path) => path.clone(),
            None => return,
        };
        let data = StoreData {
            tasks: match self.tasks.read() {
                Ok(map) => map.values().cloned().collect(),
                Err(_) => return,
            },
            hackathons: match self.hackathons.read() {
                Ok(map) => map.values().cloned().collect(),
                Err(_) => return,
            },
            users: match self.users.read() {
                Ok(map) => map.values().cloned().collect(),
                Err(_) => return,
            },
        };
        match serde_json::to_string_pretty(&data) {
            Ok(serialized) => {
                if let Err(err) = fs::write(&path, serialized) {
                    warn!("failed to persist store to {}: {}", path.display(), err);
                }
            }
            Err(err) => warn!("failed to serialize store: {}", err),
        }
    }
}

fn load_from_disk(path: &PathBuf) -> Option<StoreData> {
    let data = fs::read_to_string(path).ok()?;
    serde_json::from_str::<StoreData>(&data).ok()
}

fn next_id(prefix: &str) -> String {
    let count = COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}_{}_{}", prefix, Utc::now().timestamp_millis(), count)
}
