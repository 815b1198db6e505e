use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Digest {
    pub subject: String,
    pub html: String,
    pub text: String,
    pub tasks_due: usize,
    pub upcoming_hackathons: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckOutcome {
    AlreadyRunning,
    NothingToReport,
    NotConfigured,
    Sent,
    Failed,
}
