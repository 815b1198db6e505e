use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Local, NaiveTime, Utc};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::mailer::Mailer;
use super::types::{CheckOutcome, Digest};
use crate::model::{Hackathon, Status, Task};
use crate::store::EntityStore;
use crate::views;

pub struct NotificationTrigger {
    store: Arc<EntityStore>,
    mailer: Option<Arc<dyn Mailer>>,
    running: AtomicBool,
}

impl NotificationTrigger {
    pub fn new(store: Arc<EntityStore>, mailer: Option<Arc<dyn Mailer>>) -> Self {
        Self {
            store,
            mailer,
            running: AtomicBool::new(false),
        }
    }

    // One check runs at a time; a second trigger that lands while a check is
    // in flight observes the guard and returns immediately.
    pub fn run_check(&self, force: bool) -> CheckOutcome {
        if self.running.swap(true, Ordering::SeqCst) {
            info!("notification check already running, skipping");
            return CheckOutcome::AlreadyRunning;
        }
        let outcome = self.check(force);
        self.running.store(false, Ordering::SeqCst);
        outcome
    }

    fn check(&self, force: bool) -> CheckOutcome {
        info!("running daily notification check");
        let now = Local::now();

        let tasks = match self.store.list_tasks() {
            Ok(tasks) => tasks,
            Err(err) => {
                error!("notification check could not read tasks: {}", err);
                return CheckOutcome::Failed;
            }
        };
        let hackathons = match self.store.list_hackathons() {
            Ok(hackathons) => hackathons,
            Err(err) => {
                error!("notification check could not read hackathons: {}", err);
                return CheckOutcome::Failed;
            }
        };

        let due: Vec<Task> = views::tasks_due_today(&tasks, now)
            .into_iter()
            .filter(|t| t.status == Status::Pending)
            .collect();
        let soon = hackathons_starting_soon(&hackathons, now);
        info!(
            "tasks due today: {}, hackathons starting within 7 days: {}",
            due.len(),
            soon.len()
        );

        if !force && due.is_empty() && soon.is_empty() {
            info!("no notifications to send today");
            return CheckOutcome::NothingToReport;
        }

        let digest = build_digest(&due, &soon, now);
        let mailer = match &self.mailer {
            Some(mailer) => mailer,
            None => {
                info!("mail transport not configured, skipping delivery");
                return CheckOutcome::NotConfigured;
            }
        };

        match mailer.send(&digest) {
            Ok(()) => {
                info!("daily digest delivered: {}", digest.subject);
                CheckOutcome::Sent
            }
            Err(err) => {
                error!("failed to deliver daily digest: {}", err);
                CheckOutcome::Failed
            }
        }
    }
}

// Window per the daily check: start of the local day through seven days out.
pub fn hackathons_starting_soon(hackathons: &[Hackathon], now: DateTime<Local>) -> Vec<Hackathon> {
    let window_start = start_of_local_day(now);
    let window_end = now.with_timezone(&Utc) + Duration::days(7);
    let mut items: Vec<Hackathon> = hackathons
        .iter()
        .filter(|h| h.start_date >= window_start && h.start_date <= window_end)
        .cloned()
        .collect();
    items.sort_by(|a, b| a.start_date.cmp(&b.start_date));
    items
}

pub fn build_digest(due: &[Task], soon: &[Hackathon], now: DateTime<Local>) -> Digest {
    let date_line = now.format("%a %b %e %Y").to_string();
    let subject = format!("Daily Digest: {} Tasks Due Today", due.len());

    let mut html = String::new();
    html.push_str("<h1>Hackathon Hero Daily Digest</h1>");
    html.push_str(&format!(
        "<p>Here's what's on your plate for today, {}:</p>",
        date_line
    ));
    if due.is_empty() {
        html.push_str("<p>No tasks due today!</p>");
    } else {
        html.push_str(&format!("<h2>Tasks Due Today ({})</h2><ul>", due.len()));
        for task in due {
            html.push_str(&format!(
                "<li><strong>{}</strong> <span>({})</span></li>",
                task.title,
                task.priority.label()
            ));
        }
        html.push_str("</ul>");
    }
    if soon.is_empty() {
        html.push_str("<p>No upcoming hackathons in the next 7 days.</p>");
    } else {
        html.push_str("<h2>Upcoming Hackathons</h2><ul>");
        for hackathon in soon {
            html.push_str(&format!(
                "<li><strong>{}</strong><br/>Starts: {}</li>",
                hackathon.name,
                hackathon
                    .start_date
                    .with_timezone(&Local)
                    .format("%a %b %e %Y")
            ));
        }
        html.push_str("</ul>");
    }
    html.push_str("<p>Sent by Hackathon Hero Notification System</p>");

    let mut text = String::new();
    text.push_str(&format!("Hackathon Hero Daily Digest - {}\n", date_line));
    text.push_str(&format!("Tasks due today: {}\n", due.len()));
    for task in due {
        text.push_str(&format!("- {} ({})\n", task.title, task.priority.label()));
    }
    text.push_str(&format!("Hackathons starting within 7 days: {}\n", soon.len()));
    for hackathon in soon {
        text.push_str(&format!(
            "- {} starts {}\n",
            hackathon.name,
            hackathon
                .start_date
                .with_timezone(&Local)
                .format("%a %b %e %Y")
        ));
    }

    Digest {
        subject,
        html,
        text,
        tasks_due: due.len(),
        upcoming_hackathons: soon.len(),
    }
}

pub fn spawn_scheduler(trigger: Arc<NotificationTrigger>, hour: u32) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let delay = match next_run_delay(Local::now(), hour) {
                Some(delay) => delay,
                None => {
                    warn!("could not compute next digest run, retrying in an hour");
                    std::time::Duration::from_secs(60 * 60)
                }
            };
            tokio::time::sleep(delay).await;
            let trigger = trigger.clone();
            let _ = tokio::task::spawn_blocking(move || trigger.run_check(false)).await;
        }
    })
}

fn next_run_delay(now: DateTime<Local>, hour: u32) -> Option<std::time::Duration> {
    let at = NaiveTime::from_hms_opt(hour, 0, 0)?;
    let mut target = now
        .date_naive()
        .and_time(at)
        .and_local_timezone(Local)
        .earliest()?;
    if target <= now {
        target = now
            .date_naive()
            .succ_opt()?
            .and_time(at)
            .and_local_timezone(Local)
            .earliest()?;
    }
    (target - now).to_std().ok()
}

fn start_of_local_day(now: DateTime<Local>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.and_local_timezone(Local).earliest())
        .unwrap_or(now)
        .with_timezone(&Utc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(y, mo, d, h, mi, 0)
            .single()
            .expect("valid local time")
    }

    #[test]
    fn next_run_is_later_the_same_day_when_the_hour_is_ahead() {
        let now = local(2025, 6, 3, 7, 30);
        let delay = next_run_delay(now, 9).expect("delay");
        assert_eq!(delay.as_secs(), 90 * 60);
    }

    #[test]
    fn next_run_rolls_to_tomorrow_when_the_hour_has_passed() {
        let now = local(2025, 6, 3, 9, 0);
        let delay = next_run_delay(now, 9).expect("delay");
        assert_eq!(delay.as_secs(), 24 * 60 * 60);
    }

    #[test]
    fn digest_subject_counts_due_tasks() {
        let now = local(2025, 6, 3, 9, 0);
        let digest = build_digest(&[], &[], now);
        assert_eq!(digest.subject, "Daily Digest: 0 Tasks Due Today");
        assert_eq!(digest.tasks_due, 0);
        assert!(digest.html.contains("No tasks due today!"));
        assert!(digest.html.contains("No upcoming hackathons"));
    }

    #[test]
    fn starting_soon_window_spans_today_through_seven_days() {
        let now = local(2025, 6, 3, 12, 0);
        let now_utc = now.with_timezone(&Utc);
        let mk = |id: &str, start: DateTime<Utc>| Hackathon {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            start_date: start,
            end_date: start + Duration::days(1),
            url: None,
            tasks: Vec::new(),
            created_at: now_utc,
        };
        let hackathons = vec![
            mk("this_morning", now_utc - Duration::hours(6)),
            mk("in_five_days", now_utc + Duration::days(5)),
            mk("in_nine_days", now_utc + Duration::days(9)),
            mk("yesterday", now_utc - Duration::days(1)),
        ];
        let soon = hackathons_starting_soon(&hackathons, now);
        let ids: Vec<&str> = soon.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["this_morning", "in_five_days"]);
    }
}
