use chrono::{DateTime, Local, NaiveDate, Utc, Weekday};
use serde::Serialize;

use crate::model::{Category, Hackathon, Status, Task};

pub const SEARCH_TASK_LIMIT: usize = 5;
pub const SEARCH_HACKATHON_LIMIT: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskSort {
    DueDate,
    Priority,
    CreatedAt,
}

#[derive(Clone, Debug, Serialize)]
pub struct CategoryStat {
    pub category: Category,
    pub completed: usize,
    pub total: usize,
    pub rate: u32,
}

#[derive(Clone, Debug, Default)]
pub struct SearchResults {
    pub tasks: Vec<Task>,
    pub hackathons: Vec<Hackathon>,
}

fn local_day(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&Local).date_naive()
}

pub fn tasks_due_today(tasks: &[Task], now: DateTime<Local>) -> Vec<Task> {
    let today = now.date_naive();
    tasks
        .iter()
        .filter(|t| local_day(t.due_date) == today)
        .cloned()
        .collect()
}

pub fn tasks_due_this_week(tasks: &[Task], now: DateTime<Local>) -> Vec<Task> {
    let week = now.date_naive().week(Weekday::Sun);
    let first = week.first_day();
    let last = week.last_day();
    tasks
        .iter()
        .filter(|t| {
            let day = local_day(t.due_date);
            day >= first && day <= last
        })
        .cloned()
        .collect()
}

pub fn tasks_due_on(tasks: &[Task], day: NaiveDate) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| local_day(t.due_date) == day)
        .cloned()
        .collect()
}

pub fn pending_today_count(tasks: &[Task], now: DateTime<Local>) -> usize {
    tasks_due_today(tasks, now)
        .iter()
        .filter(|t| t.status == Status::Pending)
        .count()
}

pub fn upcoming_hackathons(hackathons: &[Hackathon], now: DateTime<Local>) -> Vec<Hackathon> {
    let now = now.with_timezone(&Utc);
    let mut items: Vec<Hackathon> = hackathons
        .iter()
        .filter(|h| h.start_date > now)
        .cloned()
        .collect();
    items.sort_by(|a, b| a.start_date.cmp(&b.start_date));
    items
}

pub fn active_hackathons(hackathons: &[Hackathon], now: DateTime<Local>) -> Vec<Hackathon> {
    let now = now.with_timezone(&Utc);
    let mut items: Vec<Hackathon> = hackathons
        .iter()
        .filter(|h| h.end_date >= now)
        .cloned()
        .collect();
    items.sort_by(|a, b| a.start_date.cmp(&b.start_date));
    items
}

pub fn past_hackathons(hackathons: &[Hackathon], now: DateTime<Local>) -> Vec<Hackathon> {
    let now = now.with_timezone(&Utc);
    let mut items: Vec<Hackathon> = hackathons
        .iter()
        .filter(|h| h.end_date < now)
        .cloned()
        .collect();
    items.sort_by(|a, b| b.end_date.cmp(&a.end_date));
    items
}

pub fn completion_rate(tasks: &[Task]) -> u32 {
    rate_of(
        tasks.iter().filter(|t| t.status == Status::Completed).count(),
        tasks.len(),
    )
}

pub fn category_breakdown(tasks: &[Task]) -> Vec<CategoryStat> {
    Category::ALL
        .iter()
        .map(|&category| {
            let total = tasks.iter().filter(|t| t.category == category).count();
            let completed = tasks
                .iter()
                .filter(|t| t.category == category && t.status == Status::Completed)
                .count();
            CategoryStat {
                category,
                completed,
                total,
                rate: rate_of(completed, total),
            }
        })
        .collect()
}

pub fn completed_last_week(tasks: &[Task], now: DateTime<Local>) -> usize {
    let now = now.with_timezone(&Utc);
    let week_ago = now - chrono::Duration::days(7);
    tasks
        .iter()
        .filter(|t| {
            t.status == Status::Completed && t.updated_at >= week_ago && t.updated_at <= now
        })
        .count()
}

pub fn search(tasks: &[Task], hackathons: &[Hackathon], query: &str) -> SearchResults {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return SearchResults::default();
    }

    let matched_tasks: Vec<Task> = tasks
        .iter()
        .filter(|t| {
            t.title.to_lowercase().contains(&query)
                || t.description.to_lowercase().contains(&query)
                || t.category.label().contains(&query)
        })
        .take(SEARCH_TASK_LIMIT)
        .cloned()
        .collect();

    let matched_hackathons: Vec<Hackathon> = hackathons
        .iter()
        .filter(|h| {
            h.name.to_lowercase().contains(&query)
                || h.description.to_lowercase().contains(&query)
        })
        .take(SEARCH_HACKATHON_LIMIT)
        .cloned()
        .collect();

    SearchResults {
        tasks: matched_tasks,
        hackathons: matched_hackathons,
    }
}

pub fn filter_tasks(
    tasks: &[Task],
    status: Option<Status>,
    category: Option<Category>,
) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| status.map_or(true, |s| t.status == s))
        .filter(|t| category.map_or(true, |c| t.category == c))
        .cloned()
        .collect()
}

pub fn sorted_tasks(tasks: &[Task], order: TaskSort) -> Vec<Task> {
    let mut items = tasks.to_vec();
    match order {
        TaskSort::DueDate => items.sort_by(|a, b| a.due_date.cmp(&b.due_date)),
        TaskSort::Priority => items.sort_by_key(|t| t.priority.rank()),
        TaskSort::CreatedAt => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
    items
}

pub fn tasks_for_hackathon(tasks: &[Task], hackathon_id: &str) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| t.hackathon_id.as_deref() == Some(hackathon_id))
        .cloned()
        .collect()
}

fn rate_of(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (completed as f64 / total as f64 * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Priority;
    use chrono::{Duration, TimeZone};

    fn task(id: &str, status: Status, due: DateTime<Utc>) -> Task {
        Task {
            id: id.to_string(),
            title: format!("task {}", id),
            description: String::new(),
            due_date: due,
            priority: Priority::Medium,
            status,
            category: Category::Daily,
            hackathon_id: None,
            created_at: due - Duration::days(1),
            updated_at: due - Duration::days(1),
        }
    }

    fn hackathon(id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Hackathon {
        Hackathon {
            id: id.to_string(),
            name: format!("hack {}", id),
            description: String::new(),
            start_date: start,
            end_date: end,
            url: None,
            tasks: Vec::new(),
            created_at: start - Duration::days(30),
        }
    }

    fn fixed_now() -> DateTime<Local> {
        // A Wednesday, mid-morning.
        Local
            .with_ymd_and_hms(2025, 3, 12, 10, 0, 0)
            .single()
            .expect("valid local time")
    }

    #[test]
    fn completion_rate_of_empty_set_is_zero() {
        assert_eq!(completion_rate(&[]), 0);
    }

    #[test]
    fn completion_rate_rounds_to_nearest_percent() {
        let now = Utc::now();
        let tasks = vec![
            task("a", Status::Completed, now),
            task("b", Status::Pending, now),
            task("c", Status::Pending, now),
        ];
        assert_eq!(completion_rate(&tasks), 33);

        let tasks = vec![
            task("a", Status::Completed, now),
            task("b", Status::Completed, now),
            task("c", Status::Pending, now),
        ];
        assert_eq!(completion_rate(&tasks), 67);
    }

    #[test]
    fn today_filter_matches_local_calendar_day_only() {
        let now = fixed_now();
        let tasks = vec![
            task("today", Status::Pending, now.with_timezone(&Utc)),
            task(
                "later_today",
                Status::Pending,
                (now + Duration::hours(9)).with_timezone(&Utc),
            ),
            task(
                "tomorrow",
                Status::Pending,
                (now + Duration::days(1)).with_timezone(&Utc),
            ),
        ];
        let due = tasks_due_today(&tasks, now);
        let ids: Vec<&str> = due.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["today", "later_today"]);
    }

    #[test]
    fn week_filter_runs_sunday_through_saturday() {
        let now = fixed_now();
        let sunday = Local
            .with_ymd_and_hms(2025, 3, 9, 8, 0, 0)
            .single()
            .expect("valid local time");
        let saturday = Local
            .with_ymd_and_hms(2025, 3, 15, 22, 0, 0)
            .single()
            .expect("valid local time");
        let prev_saturday = Local
            .with_ymd_and_hms(2025, 3, 8, 12, 0, 0)
            .single()
            .expect("valid local time");
        let next_sunday = Local
            .with_ymd_and_hms(2025, 3, 16, 0, 30, 0)
            .single()
            .expect("valid local time");

        let tasks = vec![
            task("sun", Status::Pending, sunday.with_timezone(&Utc)),
            task("sat", Status::Pending, saturday.with_timezone(&Utc)),
            task("before", Status::Pending, prev_saturday.with_timezone(&Utc)),
            task("after", Status::Pending, next_sunday.with_timezone(&Utc)),
        ];
        let due = tasks_due_this_week(&tasks, now);
        let ids: Vec<&str> = due.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["sun", "sat"]);
    }

    #[test]
    fn upcoming_excludes_already_started_and_sorts_ascending() {
        let now = fixed_now();
        let now_utc = now.with_timezone(&Utc);
        let hackathons = vec![
            hackathon("far", now_utc + Duration::days(20), now_utc + Duration::days(22)),
            hackathon("soon", now_utc + Duration::days(2), now_utc + Duration::days(3)),
            hackathon("started", now_utc, now_utc + Duration::days(1)),
        ];
        let upcoming = upcoming_hackathons(&hackathons, now);
        let ids: Vec<&str> = upcoming.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["soon", "far"]);
    }

    #[test]
    fn active_and_past_partition_with_boundary_on_active_side() {
        let now = fixed_now();
        let now_utc = now.with_timezone(&Utc);
        let hackathons = vec![
            hackathon("ended", now_utc - Duration::days(10), now_utc - Duration::days(8)),
            hackathon("ends_now", now_utc - Duration::days(2), now_utc),
            hackathon("future", now_utc + Duration::days(5), now_utc + Duration::days(6)),
        ];
        let active = active_hackathons(&hackathons, now);
        let past = past_hackathons(&hackathons, now);

        let active_ids: Vec<&str> = active.iter().map(|h| h.id.as_str()).collect();
        let past_ids: Vec<&str> = past.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(active_ids, vec!["ends_now", "future"]);
        assert_eq!(past_ids, vec!["ended"]);
        assert_eq!(active.len() + past.len(), hackathons.len());
    }

    #[test]
    fn search_with_empty_query_returns_nothing() {
        let now = Utc::now();
        let tasks = vec![task("a", Status::Pending, now)];
        let hackathons = vec![hackathon("h", now, now + Duration::days(1))];
        let results = search(&tasks, &hackathons, "");
        assert!(results.tasks.is_empty());
        assert!(results.hackathons.is_empty());
        let results = search(&tasks, &hackathons, "   ");
        assert!(results.tasks.is_empty());
        assert!(results.hackathons.is_empty());
    }

    #[test]
    fn search_is_case_insensitive_and_matches_substrings() {
        let now = Utc::now();
        let mut t = task("a", Status::Pending, now);
        t.title = "Ship the Demo".to_string();
        let mut h = hackathon("h", now, now + Duration::days(1));
        h.description = "Global AI Weekend".to_string();

        let results = search(&[t.clone()], &[h.clone()], "DEMO");
        assert_eq!(results.tasks.len(), 1);
        assert!(results.hackathons.is_empty());

        let results = search(&[t], &[h], "weekend");
        assert!(results.tasks.is_empty());
        assert_eq!(results.hackathons.len(), 1);
    }

    #[test]
    fn search_matches_task_category_and_caps_results() {
        let now = Utc::now();
        let mut tasks = Vec::new();
        for i in 0..8 {
            let mut t = task(&format!("t{}", i), Status::Pending, now);
            t.category = Category::Learning;
            tasks.push(t);
        }
        let results = search(&tasks, &[], "learning");
        assert_eq!(results.tasks.len(), SEARCH_TASK_LIMIT);

        let now_h = now + Duration::days(1);
        let hackathons: Vec<Hackathon> = (0..5)
            .map(|i| {
                let mut h = hackathon(&format!("h{}", i), now, now_h);
                h.name = format!("spring jam {}", i);
                h
            })
            .collect();
        let results = search(&[], &hackathons, "jam");
        assert_eq!(results.hackathons.len(), SEARCH_HACKATHON_LIMIT);
    }

    #[test]
    fn priority_sort_is_stable_within_equal_ranks() {
        let now = Utc::now();
        let mut first_high = task("first_high", Status::Pending, now);
        first_high.priority = Priority::High;
        let mut low = task("low", Status::Pending, now);
        low.priority = Priority::Low;
        let mut second_high = task("second_high", Status::Pending, now);
        second_high.priority = Priority::High;
        let mut medium = task("medium", Status::Pending, now);
        medium.priority = Priority::Medium;

        let sorted = sorted_tasks(&[first_high, low, second_high, medium], TaskSort::Priority);
        let ids: Vec<&str> = sorted.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["first_high", "second_high", "medium", "low"]);
    }

    #[test]
    fn created_sort_is_newest_first() {
        let now = Utc::now();
        let mut old = task("old", Status::Pending, now);
        old.created_at = now - Duration::days(5);
        let mut new = task("new", Status::Pending, now);
        new.created_at = now - Duration::hours(1);

        let sorted = sorted_tasks(&[old, new], TaskSort::CreatedAt);
        let ids: Vec<&str> = sorted.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[test]
    fn category_breakdown_always_reports_all_four_categories() {
        let now = Utc::now();
        let mut done = task("done", Status::Completed, now);
        done.category = Category::Learning;
        let mut open = task("open", Status::Pending, now);
        open.category = Category::Learning;

        let stats = category_breakdown(&[done, open]);
        assert_eq!(stats.len(), 4);
        let learning = stats
            .iter()
            .find(|s| s.category == Category::Learning)
            .expect("learning stat");
        assert_eq!(learning.total, 2);
        assert_eq!(learning.completed, 1);
        assert_eq!(learning.rate, 50);
        let project = stats
            .iter()
            .find(|s| s.category == Category::Project)
            .expect("project stat");
        assert_eq!(project.total, 0);
        assert_eq!(project.rate, 0);
    }

    #[test]
    fn pending_today_ignores_completed_tasks() {
        let now = fixed_now();
        let due = now.with_timezone(&Utc);
        let tasks = vec![
            task("open", Status::Pending, due),
            task("done", Status::Completed, due),
        ];
        assert_eq!(pending_today_count(&tasks, now), 1);
    }

    #[test]
    fn tasks_for_hackathon_follows_the_weak_reference() {
        let now = Utc::now();
        let mut linked = task("linked", Status::Pending, now);
        linked.hackathon_id = Some("hack_1".to_string());
        let loose = task("loose", Status::Pending, now);

        let related = tasks_for_hackathon(&[linked, loose], "hack_1");
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].id, "linked");
    }

    #[test]
    fn completed_last_week_uses_the_update_timestamp() {
        let now = fixed_now();
        let now_utc = now.with_timezone(&Utc);
        let mut recent = task("recent", Status::Completed, now_utc);
        recent.updated_at = now_utc - Duration::days(2);
        let mut stale = task("stale", Status::Completed, now_utc);
        stale.updated_at = now_utc - Duration::days(9);
        let mut open = task("open", Status::Pending, now_utc);
        open.updated_at = now_utc - Duration::days(1);

        assert_eq!(completed_last_week(&[recent, stale, open], now), 1);
    }
}
