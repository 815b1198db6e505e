use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use hackathon_hero_rs::model::PublicUser;

#[derive(Clone, Debug)]
pub struct CLIConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub state_file: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiMessage {
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientState {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub last_notification_date: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<PublicUser>,
}

impl Default for ClientState {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            last_notification_date: None,
            token: None,
            user: None,
        }
    }
}

fn default_theme() -> String {
    "light".to_string()
}
