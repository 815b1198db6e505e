use std::env;
use std::path::PathBuf;

use crate::models::CLIConfig;

const DEFAULT_URL: &str = "http://localhost:5000";
const DEFAULT_STATE_FILE: &str = "hero-cli-state.json";

pub fn parse_config() -> CLIConfig {
    let mut cfg = CLIConfig {
        base_url: env_or("HERO_URL", DEFAULT_URL.to_string()),
        token: env_opt("HERO_TOKEN"),
        state_file: PathBuf::from(env_or("HERO_STATE_FILE", DEFAULT_STATE_FILE.to_string())),
    };

    let args: Vec<String> = env::args().collect();
    let mut idx = 1;
    while idx < args.len() {
        match args[idx].as_str() {
            "--base" => {
                if let Some(value) = args.get(idx + 1) {
                    cfg.base_url = value.clone();
                    idx += 1;
                }
            }
            "--token" => {
                if let Some(value) = args.get(idx + 1) {
                    cfg.token = Some(value.clone());
                    idx += 1;
                }
            }
            "--state" => {
                if let Some(value) = args.get(idx + 1) {
                    cfg.state_file = PathBuf::from(value.clone());
                    idx += 1;
                }
            }
            _ => {}
        }
        idx += 1;
    }

    cfg
}

fn env_or(key: &str, fallback: String) -> String {
    env::var(key).unwrap_or(fallback)
}

fn env_opt(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}
