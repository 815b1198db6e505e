use std::fmt;

use reqwest::blocking::Client;
use serde_json::json;

use super::types::Digest;
use crate::config::MailConfig;

#[derive(Clone, Debug)]
pub struct MailError {
    pub code: String,
    pub message: String,
}

impl MailError {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for MailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for MailError {}

pub trait Mailer: Send + Sync {
    fn send(&self, digest: &Digest) -> Result<(), MailError>;
}

pub struct HttpMailer {
    cfg: MailConfig,
    client: Client,
}

impl HttpMailer {
    pub fn from_config(cfg: &MailConfig) -> Option<Self> {
        if !cfg.is_configured() {
            return None;
        }
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("reqwest client");
        Some(Self {
            cfg: cfg.clone(),
            client,
        })
    }
}

impl Mailer for HttpMailer {
    fn send(&self, digest: &Digest) -> Result<(), MailError> {
        let payload = json!({
            "from": format!("\"Hackathon Hero\" <{}>", self.cfg.from),
            "to": self.cfg.to,
            "subject": digest.subject,
            "html": digest.html,
            "text": digest.text,
        });

        let resp = self
            .client
            .post(&self.cfg.api_url)
            .bearer_auth(&self.cfg.api_key)
            .json(&payload)
            .send()
            .map_err(|err| MailError::new("transport_error", &err.to_string()))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            Err(MailError::new(
                "api_error",
                &format!("http {}: {}", status.as_u16(), body),
            ))
        }
    }
}
