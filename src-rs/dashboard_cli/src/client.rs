use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;

use hackathon_hero_rs::model::{
    Hackathon, HackathonDraft, HackathonPatch, PublicUser, Task, TaskDraft, TaskPatch,
};

use crate::models::{ApiMessage, AuthResponse, LoginRequest, RegisterRequest};

pub struct HTTPClient {
    pub base_url: String,
    pub token: Option<String>,
    client: Client,
}

impl HTTPClient {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            base_url: base_url.to_string(),
            token,
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("reqwest client"),
        }
    }

    pub fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, String> {
        let resp = self
            .client
            .post(self.url("/api/auth/register"))
            .headers(self.headers())
            .json(req)
            .send()
            .map_err(|err| err.to_string())?;
        parse(resp)
    }

    pub fn login(&self, req: &LoginRequest) -> Result<AuthResponse, String> {
        let resp = self
            .client
            .post(self.url("/api/auth/login"))
            .headers(self.headers())
            .json(req)
            .send()
            .map_err(|err| err.to_string())?;
        parse(resp)
    }

    pub fn me(&self) -> Result<PublicUser, String> {
        let resp = self
            .client
            .get(self.url("/api/auth/me"))
            .headers(self.headers())
            .send()
            .map_err(|err| err.to_string())?;
        parse(resp)
    }

    pub fn list_tasks(&self) -> Result<Vec<Task>, String> {
        let resp = self
            .client
            .get(self.url("/api/tasks"))
            .headers(self.headers())
            .send()
            .map_err(|err| err.to_string())?;
        parse(resp)
    }

    pub fn create_task(&self, draft: &TaskDraft) -> Result<Task, String> {
        let resp = self
            .client
            .post(self.url("/api/tasks"))
            .headers(self.headers())
            .json(draft)
            .send()
            .map_err(|err| err.to_string())?;
        parse(resp)
    }

    pub fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Task, String> {
        let resp = self
            .client
            .put(self.url(&format!("/api/tasks/{}", id)))
            .headers(self.headers())
            .json(patch)
            .send()
            .map_err(|err| err.to_string())?;
        parse(resp)
    }

    pub fn delete_task(&self, id: &str) -> Result<(), String> {
        let resp = self
            .client
            .delete(self.url(&format!("/api/tasks/{}", id)))
            .headers(self.headers())
            .send()
            .map_err(|err| err.to_string())?;
        parse::<ApiMessage>(resp).map(|_| ())
    }

    pub fn list_hackathons(&self) -> Result<Vec<Hackathon>, String> {
        let resp = self
            .client
            .get(self.url("/api/hackathons"))
            .headers(self.headers())
            .send()
            .map_err(|err| err.to_string())?;
        parse(resp)
    }

    pub fn create_hackathon(&self, draft: &HackathonDraft) -> Result<Hackathon, String> {
        let resp = self
            .client
            .post(self.url("/api/hackathons"))
            .headers(self.headers())
            .json(draft)
            .send()
            .map_err(|err| err.to_string())?;
        parse(resp)
    }

    pub fn update_hackathon(&self, id: &str, patch: &HackathonPatch) -> Result<Hackathon, String> {
        let resp = self
            .client
            .put(self.url(&format!("/api/hackathons/{}", id)))
            .headers(self.headers())
            .json(patch)
            .send()
            .map_err(|err| err.to_string())?;
        parse(resp)
    }

    pub fn delete_hackathon(&self, id: &str) -> Result<(), String> {
        let resp = self
            .client
            .delete(self.url(&format!("/api/hackathons/{}", id)))
            .headers(self.headers())
            .send()
            .map_err(|err| err.to_string())?;
        parse::<ApiMessage>(resp).map(|_| ())
    }

    pub fn trigger_test_digest(&self) -> Result<String, String> {
        let resp = self
            .client
            .post(self.url("/api/notifications/test"))
            .headers(self.headers())
            .send()
            .map_err(|err| err.to_string())?;
        parse::<ApiMessage>(resp).map(|m| m.message)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &self.token {
            let value = format!("Bearer {}", token);
            if let Ok(header) = HeaderValue::from_str(&value) {
                headers.insert(AUTHORIZATION, header);
            }
        }
        headers
    }
}

fn parse<T: DeserializeOwned>(resp: Response) -> Result<T, String> {
    if resp.status().is_success() {
        resp.json::<T>().map_err(|err| err.to_string())
    } else {
        let status = resp.status();
        let body = resp.text().unwrap_or_default();
        Err(format!("http {}: {}", status.as_u16(), body))
    }
}
