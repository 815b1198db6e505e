use std::env;
use std::path::PathBuf;

use tracing::warn;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_DATA_FILE: &str = "hero-data.json";
const DEFAULT_JWT_SECRET: &str = "your_secret_key";
const DEFAULT_DIGEST_HOUR: u32 = 9;

#[derive(Clone, Debug)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
    pub to: String,
}

impl MailConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_url.is_empty() && !self.api_key.is_empty() && !self.to.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub data_file: PathBuf,
    pub jwt_secret: String,
    pub digest_hour: u32,
    pub mail: MailConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            digest_hour: DEFAULT_DIGEST_HOUR,
            mail: MailConfig {
                api_url: String::new(),
                api_key: String::new(),
                from: String::new(),
                to: String::new(),
            },
        }
    }
}

impl AppConfig {
    pub fn load() -> Self {
        let jwt_secret = env_or("HERO_JWT_SECRET", DEFAULT_JWT_SECRET);
        if jwt_secret == DEFAULT_JWT_SECRET {
            warn!("HERO_JWT_SECRET not set, using the development default");
        }

        let digest_hour = env_parse("HERO_DIGEST_HOUR", DEFAULT_DIGEST_HOUR);
        let digest_hour = if digest_hour > 23 {
            warn!(
                "HERO_DIGEST_HOUR {} out of range, using {}",
                digest_hour, DEFAULT_DIGEST_HOUR
            );
            DEFAULT_DIGEST_HOUR
        } else {
            digest_hour
        };

        let mail_from = env_or("MAIL_FROM", "");
        let mail_to = match env_opt("MAIL_TO") {
            Some(to) => to,
            None => mail_from.clone(),
        };

        Self {
            port: env_parse("HERO_PORT", DEFAULT_PORT),
            data_file: PathBuf::from(env_or("HERO_DATA_FILE", DEFAULT_DATA_FILE)),
            jwt_secret,
            digest_hour,
            mail: MailConfig {
                api_url: env_or("MAIL_API_URL", ""),
                api_key: env_or("MAIL_API_KEY", ""),
                from: mail_from,
                to: mail_to,
            },
        }
    }
}

fn env_or(key: &str, fallback: &str) -> String {
    env::var(key).unwrap_or_else(|_| fallback.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

fn env_parse<T: std::str::FromStr + Copy>(key: &str, fallback: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse::<T>().unwrap_or_else(|_| {
            warn!("invalid {} value: {}, using default", key, raw);
            fallback
        }),
        Err(_) => fallback,
    }
}
