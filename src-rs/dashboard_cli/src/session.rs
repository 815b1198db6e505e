use std::fs;

use chrono::{DateTime, Local, Utc};

use hackathon_hero_rs::model::{
    Hackathon, HackathonDraft, HackathonPatch, PublicUser, Status, Task, TaskDraft, TaskPatch,
};
use hackathon_hero_rs::views;

use crate::client::HTTPClient;
use crate::models::{CLIConfig, ClientState, LoginRequest, RegisterRequest};

pub struct Session {
    pub config: CLIConfig,
    pub client: HTTPClient,
    pub tasks: Vec<Task>,
    pub hackathons: Vec<Hackathon>,
    pub state: ClientState,
}

impl Session {
    pub fn new(config: CLIConfig, client: HTTPClient) -> Self {
        let state = load_state(&config);
        let mut session = Self {
            config,
            client,
            tasks: Vec::new(),
            hackathons: Vec::new(),
            state,
        };
        if session.client.token.is_none() {
            if let Some(token) = session.state.token.clone() {
                session.rebuild_client(Some(token));
            }
        }
        session
    }

    pub fn refresh(&mut self) -> Result<(), String> {
        self.tasks = self.client.list_tasks()?;
        self.hackathons = self.client.list_hackathons()?;
        Ok(())
    }

    pub fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<PublicUser, String> {
        let resp = self.client.register(&RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        })?;
        Ok(self.adopt_auth(resp.token, resp.user))
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<PublicUser, String> {
        let resp = self.client.login(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?;
        Ok(self.adopt_auth(resp.token, resp.user))
    }

    pub fn logout(&mut self) {
        self.state.token = None;
        self.state.user = None;
        self.save_state();
        self.rebuild_client(None);
        self.tasks.clear();
        self.hackathons.clear();
    }

    // The toggle applies locally first and reverts to the exact snapshot when
    // the server rejects the update.
    pub fn toggle_task_status(&mut self, id: &str) -> Result<Status, String> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| format!("no local task with id {}", id))?;
        let snapshot = self.tasks[idx].clone();
        let new_status = snapshot.status.toggled();

        self.tasks[idx].status = new_status;
        self.tasks[idx].updated_at = Utc::now();

        match self.client.update_task(id, &TaskPatch::status(new_status)) {
            Ok(server_task) => {
                self.tasks[idx] = server_task;
                Ok(new_status)
            }
            Err(err) => {
                self.tasks[idx] = snapshot;
                Err(err)
            }
        }
    }

    pub fn create_task(&mut self, draft: TaskDraft) -> Result<Task, String> {
        let task = self.client.create_task(&draft)?;
        self.tasks.insert(0, task.clone());
        Ok(task)
    }

    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> Result<Task, String> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| format!("no local task with id {}", id))?;
        let snapshot = self.tasks[idx].clone();
        apply_task_patch(&mut self.tasks[idx], &patch);

        match self.client.update_task(id, &patch) {
            Ok(server_task) => {
                self.tasks[idx] = server_task.clone();
                Ok(server_task)
            }
            Err(err) => {
                self.tasks[idx] = snapshot;
                Err(err)
            }
        }
    }

    pub fn delete_task(&mut self, id: &str) -> Result<(), String> {
        self.client.delete_task(id)?;
        self.tasks.retain(|t| t.id != id);
        Ok(())
    }

    pub fn create_hackathon(&mut self, draft: HackathonDraft) -> Result<Hackathon, String> {
        let hackathon = self.client.create_hackathon(&draft)?;
        self.hackathons.insert(0, hackathon.clone());
        Ok(hackathon)
    }

    pub fn update_hackathon(
        &mut self,
        id: &str,
        patch: HackathonPatch,
    ) -> Result<Hackathon, String> {
        let idx = self
            .hackathons
            .iter()
            .position(|h| h.id == id)
            .ok_or_else(|| format!("no local hackathon with id {}", id))?;
        let snapshot = self.hackathons[idx].clone();
        apply_hackathon_patch(&mut self.hackathons[idx], &patch);

        match self.client.update_hackathon(id, &patch) {
            Ok(server_hackathon) => {
                self.hackathons[idx] = server_hackathon.clone();
                Ok(server_hackathon)
            }
            Err(err) => {
                self.hackathons[idx] = snapshot;
                Err(err)
            }
        }
    }

    pub fn delete_hackathon(&mut self, id: &str) -> Result<(), String> {
        self.client.delete_hackathon(id)?;
        self.hackathons.retain(|h| h.id != id);
        clear_local_hackathon_refs(&mut self.tasks, id);
        Ok(())
    }

    pub fn toggle_theme(&mut self) -> String {
        self.state.theme = if self.state.theme == "dark" {
            "light".to_string()
        } else {
            "dark".to_string()
        };
        self.save_state();
        self.state.theme.clone()
    }

    // At most one reminder banner per local calendar day.
    pub fn daily_banner(&mut self, now: DateTime<Local>) -> Option<String> {
        let pending = views::pending_today_count(&self.tasks, now);
        if pending == 0 {
            return None;
        }
        let today = now.date_naive().to_string();
        if self.state.last_notification_date.as_deref() == Some(today.as_str()) {
            return None;
        }
        self.state.last_notification_date = Some(today);
        self.save_state();
        Some(format!("You have {} tasks due today!", pending))
    }

    pub fn set_base_url(&mut self, url: &str) {
        self.config.base_url = url.to_string();
        let token = self.state.token.clone();
        self.rebuild_client(token);
    }

    pub fn set_token(&mut self, token: &str) {
        self.state.token = Some(token.to_string());
        self.save_state();
        self.rebuild_client(Some(token.to_string()));
    }

    fn adopt_auth(&mut self, token: String, user: PublicUser) -> PublicUser {
        self.state.token = Some(token.clone());
        self.state.user = Some(user.clone());
        self.save_state();
        self.rebuild_client(Some(token));
        user
    }

    fn rebuild_client(&mut self, token: Option<String>) {
        self.client = HTTPClient::new(&self.config.base_url, token);
    }

    pub fn save_state(&self) {
        if let Ok(serialized) = serde_json::to_string_pretty(&self.state) {
            let _ = fs::write(&self.config.state_file, serialized);
        }
    }
}

fn load_state(config: &CLIConfig) -> ClientState {
    let mut state = fs::read_to_string(&config.state_file)
        .ok()
        .and_then(|data| serde_json::from_str::<ClientState>(&data).ok())
        .unwrap_or_default();
    if let Some(token) = &config.token {
        state.token = Some(token.clone());
    }
    state
}

fn apply_task_patch(task: &mut Task, patch: &TaskPatch) {
    if let Some(title) = &patch.title {
        task.title = title.clone();
    }
    if let Some(description) = &patch.description {
        task.description = description.clone();
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
    if let Some(hackathon_id) = &patch.hackathon_id {
        task.hackathon_id = Some(hackathon_id.clone());
    }
    task.updated_at = Utc::now();
}

fn apply_hackathon_patch(hackathon: &mut Hackathon, patch: &HackathonPatch) {
    if let Some(name) = &patch.name {
        hackathon.name = name.clone();
    }
    if let Some(description) = &patch.description {
        hackathon.description = description.clone();
    }
    if let Some(start_date) = patch.start_date {
        hackathon.start_date = start_date;
    }
    if let Some(end_date) = patch.end_date {
        hackathon.end_date = end_date;
    }
    if let Some(url) = &patch.url {
        hackathon.url = Some(url.clone());
    }
    if let Some(tasks) = &patch.tasks {
        hackathon.tasks = tasks.clone();
    }
}

fn clear_local_hackathon_refs(tasks: &mut [Task], hackathon_id: &str) {
    for task in tasks.iter_mut() {
        if task.hackathon_id.as_deref() == Some(hackathon_id) {
            task.hackathon_id = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hackathon_hero_rs::model::{Category, Priority};
    use std::path::PathBuf;

    fn unreachable_session() -> Session {
        let config = CLIConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            token: None,
            state_file: PathBuf::from(format!(
                "{}/hero-cli-test-{}.json",
                std::env::temp_dir().display(),
                std::process::id()
            )),
        };
        let client = HTTPClient::new(&config.base_url, None);
        Session {
            config,
            client,
            tasks: Vec::new(),
            hackathons: Vec::new(),
            state: ClientState::default(),
        }
    }

    fn sample_task(id: &str) -> Task {
        let now = Utc::now();
        Task {
            id: id.to_string(),
            title: "write submission".to_string(),
            description: String::new(),
            due_date: now,
            priority: Priority::Medium,
            status: Status::Pending,
            category: Category::Hackathon,
            hackathon_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn failed_toggle_restores_the_exact_prior_task() {
        let mut session = unreachable_session();
        let task = sample_task("task_1");
        let before = task.clone();
        session.tasks.push(task);

        let result = session.toggle_task_status("task_1");
        assert!(result.is_err());
        assert_eq!(session.tasks[0].status, before.status);
        assert_eq!(session.tasks[0].updated_at, before.updated_at);
    }

    #[test]
    fn failed_update_restores_the_snapshot() {
        let mut session = unreachable_session();
        session.tasks.push(sample_task("task_1"));

        let patch = TaskPatch {
            title: Some("renamed".to_string()),
            ..TaskPatch::default()
        };
        let result = session.update_task("task_1", patch);
        assert!(result.is_err());
        assert_eq!(session.tasks[0].title, "write submission");
    }

    #[test]
    fn clearing_refs_detaches_every_task_of_the_hackathon() {
        let mut linked_a = sample_task("a");
        linked_a.hackathon_id = Some("hack_1".to_string());
        let mut linked_b = sample_task("b");
        linked_b.hackathon_id = Some("hack_1".to_string());
        let mut other = sample_task("c");
        other.hackathon_id = Some("hack_2".to_string());

        let mut tasks = vec![linked_a, linked_b, other];
        clear_local_hackathon_refs(&mut tasks, "hack_1");
        assert!(tasks[0].hackathon_id.is_none());
        assert!(tasks[1].hackathon_id.is_none());
        assert_eq!(tasks[2].hackathon_id.as_deref(), Some("hack_2"));
    }

    #[test]
    fn patch_application_replaces_only_present_fields() {
        let mut task = sample_task("task_1");
        let patch = TaskPatch {
            priority: Some(Priority::High),
            ..TaskPatch::default()
        };
        apply_task_patch(&mut task, &patch);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.title, "write submission");
        assert_eq!(task.status, Status::Pending);
    }
}
