use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};

use hackathon_hero_rs::digest::{
    CheckOutcome, Digest, MailError, Mailer, NotificationTrigger,
};
use hackathon_hero_rs::model::{HackathonDraft, Status, TaskDraft, TaskPatch};
use hackathon_hero_rs::store::EntityStore;

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<Digest>>,
}

impl Mailer for RecordingMailer {
    fn send(&self, digest: &Digest) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(digest.clone());
        Ok(())
    }
}

struct FailingMailer;

impl Mailer for FailingMailer {
    fn send(&self, _digest: &Digest) -> Result<(), MailError> {
        Err(MailError::new("api_error", "http 535: bad credentials"))
    }
}

#[test]
fn forced_check_lists_exactly_the_pending_task_due_today() {
    let store = Arc::new(EntityStore::in_memory());
    store
        .create_task(TaskDraft::new("submit project", Utc::now()))
        .unwrap();
    store
        .create_task(TaskDraft::new("someday", Utc::now() + Duration::days(30)))
        .unwrap();
    let completed = store
        .create_task(TaskDraft::new("already done", Utc::now()))
        .unwrap();
    store
        .update_task(&completed.id, TaskPatch::status(Status::Completed))
        .unwrap();

    let mailer = Arc::new(RecordingMailer::default());
    let trigger = NotificationTrigger::new(store, Some(mailer.clone()));

    assert_eq!(trigger.run_check(true), CheckOutcome::Sent);

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    let digest = &sent[0];
    assert_eq!(digest.tasks_due, 1);
    assert_eq!(digest.subject, "Daily Digest: 1 Tasks Due Today");
    assert!(digest.text.contains("submit project"));
    assert!(!digest.text.contains("someday"));
    assert!(!digest.text.contains("already done"));
}

#[test]
fn quiet_day_produces_no_digest_unless_forced() {
    let store = Arc::new(EntityStore::in_memory());
    let mailer = Arc::new(RecordingMailer::default());
    let trigger = NotificationTrigger::new(store, Some(mailer.clone()));

    assert_eq!(trigger.run_check(false), CheckOutcome::NothingToReport);
    assert!(mailer.sent.lock().unwrap().is_empty());

    assert_eq!(trigger.run_check(true), CheckOutcome::Sent);
    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].tasks_due, 0);
    assert_eq!(sent[0].subject, "Daily Digest: 0 Tasks Due Today");
}

#[test]
fn hackathon_starting_this_week_passes_the_gate() {
    let store = Arc::new(EntityStore::in_memory());
    let start = Utc::now() + Duration::days(3);
    store
        .create_hackathon(HackathonDraft::new("spring jam", start, start + Duration::days(2)))
        .unwrap();

    let mailer = Arc::new(RecordingMailer::default());
    let trigger = NotificationTrigger::new(store, Some(mailer.clone()));

    assert_eq!(trigger.run_check(false), CheckOutcome::Sent);
    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent[0].upcoming_hackathons, 1);
    assert!(sent[0].text.contains("spring jam"));
}

#[test]
fn missing_mail_transport_skips_delivery() {
    let store = Arc::new(EntityStore::in_memory());
    store
        .create_task(TaskDraft::new("due today", Utc::now()))
        .unwrap();
    let trigger = NotificationTrigger::new(store, None);
    assert_eq!(trigger.run_check(false), CheckOutcome::NotConfigured);
}

#[test]
fn delivery_failure_is_contained() {
    let store = Arc::new(EntityStore::in_memory());
    store
        .create_task(TaskDraft::new("due today", Utc::now()))
        .unwrap();
    let trigger = NotificationTrigger::new(store, Some(Arc::new(FailingMailer)));
    assert_eq!(trigger.run_check(false), CheckOutcome::Failed);
    // A later run is not blocked by the failed one.
    assert_eq!(trigger.run_check(true), CheckOutcome::Failed);
}
