use std::io;

use chrono::{DateTime, Local, NaiveDate, Utc};

use hackathon_hero_rs::model::{Category, HackathonDraft, Status, TaskDraft};
use hackathon_hero_rs::views::{self, TaskSort};

use crate::render;
use crate::session::Session;

pub struct REPL {
    pub session: Session,
}

impl REPL {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn run(&mut self) {
        render::banner(&self.session);
        match self.session.refresh() {
            Ok(()) => {
                render::info(&format!(
                    "loaded {} tasks, {} hackathons",
                    self.session.tasks.len(),
                    self.session.hackathons.len()
                ));
                if let Some(banner) = self.session.daily_banner(Local::now()) {
                    render::info(&banner);
                }
            }
            Err(err) => render::error(&format!("failed to connect to server: {}", err)),
        }

        loop {
            render::prompt();
            let mut line = String::new();
            if io::stdin().read_line(&mut line).is_err() {
                break;
            }
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('/') {
                if self.handle_command(&line) {
                    break;
                }
                continue;
            }
            // Bare input works like the search dialog.
            let results = views::search(&self.session.tasks, &self.session.hackathons, &line);
            render::search_results(&results);
        }
    }

    fn handle_command(&mut self, line: &str) -> bool {
        let mut parts = line.splitn(2, ' ');
        let cmd = parts.next().unwrap_or("").trim_start_matches('/');
        let rest = parts.next().unwrap_or("").trim();
        match cmd {
            "exit" | "quit" => return true,
            "help" => render::help(),
            "register" => {
                let fields: Vec<&str> = rest.split_whitespace().collect();
                if fields.len() != 3 {
                    render::error("usage: /register <name> <email> <password>");
                } else {
                    match self.session.register(fields[0], fields[1], fields[2]) {
                        Ok(user) => {
                            render::info(&format!("registered and signed in as {}", user.email));
                            self.load_data();
                        }
                        Err(err) => render::error(&err),
                    }
                }
            }
            "login" => {
                let fields: Vec<&str> = rest.split_whitespace().collect();
                if fields.len() != 2 {
                    render::error("usage: /login <email> <password>");
                } else {
                    match self.session.login(fields[0], fields[1]) {
                        Ok(user) => {
                            render::info(&format!("signed in as {}", user.email));
                            self.load_data();
                        }
                        Err(err) => render::error(&err),
                    }
                }
            }
            "logout" => {
                self.session.logout();
                render::info("signed out");
            }
            "me" => match self.session.client.me() {
                Ok(user) => render::user(&user),
                Err(err) => render::error(&err),
            },
            "refresh" => self.load_data(),
            "dashboard" => render::dashboard(&self.session, Local::now()),
            "tasks" => {
                let mut status = None;
                let mut category = None;
                let mut sort = TaskSort::DueDate;
                for token in rest.split_whitespace() {
                    match token {
                        "pending" => status = Some(Status::Pending),
                        "completed" => status = Some(Status::Completed),
                        "daily" => category = Some(Category::Daily),
                        "learning" => category = Some(Category::Learning),
                        "hackathon" => category = Some(Category::Hackathon),
                        "project" => category = Some(Category::Project),
                        "due" => sort = TaskSort::DueDate,
                        "priority" => sort = TaskSort::Priority,
                        "created" => sort = TaskSort::CreatedAt,
                        "all" => {}
                        other => {
                            render::error(&format!("unknown filter: {}", other));
                            return false;
                        }
                    }
                }
                let filtered = views::filter_tasks(&self.session.tasks, status, category);
                let sorted = views::sorted_tasks(&filtered, sort);
                render::tasks("Tasks", &sorted);
            }
            "today" => {
                let due = views::tasks_due_today(&self.session.tasks, Local::now());
                render::tasks("Due today", &views::sorted_tasks(&due, TaskSort::DueDate));
            }
            "week" => {
                let due = views::tasks_due_this_week(&self.session.tasks, Local::now());
                render::tasks("Due this week", &views::sorted_tasks(&due, TaskSort::DueDate));
            }
            "day" => match NaiveDate::parse_from_str(rest, "%Y-%m-%d") {
                Ok(day) => {
                    let due = views::tasks_due_on(&self.session.tasks, day);
                    render::tasks(
                        &format!("Due on {}", day),
                        &views::sorted_tasks(&due, TaskSort::DueDate),
                    );
                }
                Err(_) => render::error("usage: /day <YYYY-MM-DD>"),
            },
            "upcoming" => {
                let upcoming =
                    views::upcoming_hackathons(&self.session.hackathons, Local::now());
                render::hackathons("Upcoming hackathons", &upcoming, &self.session.tasks);
            }
            "hackathons" => {
                let now = Local::now();
                let active = views::active_hackathons(&self.session.hackathons, now);
                let past = views::past_hackathons(&self.session.hackathons, now);
                render::hackathons("Active & upcoming", &active, &self.session.tasks);
                render::hackathons("Past", &past, &self.session.tasks);
            }
            "progress" => render::progress(&self.session.tasks, Local::now()),
            "search" => {
                if rest.is_empty() {
                    render::error("usage: /search <query>");
                } else {
                    let results =
                        views::search(&self.session.tasks, &self.session.hackathons, rest);
                    render::search_results(&results);
                }
            }
            "add" => {
                let mut fields = rest.splitn(2, ' ');
                let day = fields.next().unwrap_or("");
                let title = fields.next().unwrap_or("").trim();
                match (parse_day(day), title.is_empty()) {
                    (Ok(due), false) => {
                        match self.session.create_task(TaskDraft::new(title, due)) {
                            Ok(task) => render::info(&format!("task created: {}", task.id)),
                            Err(err) => render::error(&err),
                        }
                    }
                    _ => render::error("usage: /add <YYYY-MM-DD> <title>"),
                }
            }
            "addhack" => {
                let fields: Vec<&str> = rest.splitn(3, ' ').collect();
                if fields.len() != 3 {
                    render::error("usage: /addhack <start YYYY-MM-DD> <end YYYY-MM-DD> <name>");
                } else {
                    match (parse_day(fields[0]), parse_day(fields[1])) {
                        (Ok(start), Ok(end)) => {
                            let draft = HackathonDraft::new(fields[2].trim(), start, end);
                            match self.session.create_hackathon(draft) {
                                Ok(hackathon) => {
                                    render::info(&format!("hackathon created: {}", hackathon.id))
                                }
                                Err(err) => render::error(&err),
                            }
                        }
                        _ => render::error("dates must look like YYYY-MM-DD"),
                    }
                }
            }
            "toggle" => {
                if rest.is_empty() {
                    render::error("usage: /toggle <task id>");
                } else {
                    match self.session.toggle_task_status(rest) {
                        Ok(status) => render::info(&format!("task is now {:?}", status)),
                        Err(err) => {
                            render::error(&format!("failed to update task status: {}", err))
                        }
                    }
                }
            }
            "deltask" => {
                if rest.is_empty() {
                    render::error("usage: /deltask <task id>");
                } else {
                    match self.session.delete_task(rest) {
                        Ok(()) => render::info("task deleted"),
                        Err(err) => render::error(&err),
                    }
                }
            }
            "delhack" => {
                if rest.is_empty() {
                    render::error("usage: /delhack <hackathon id>");
                } else {
                    match self.session.delete_hackathon(rest) {
                        Ok(()) => render::info("hackathon deleted"),
                        Err(err) => render::error(&err),
                    }
                }
            }
            "digest" => match self.session.client.trigger_test_digest() {
                Ok(message) => render::info(&message),
                Err(err) => render::error(&err),
            },
            "theme" => {
                let theme = self.session.toggle_theme();
                render::info(&format!("theme: {}", theme));
            }
            "config" => render::config(&self.session),
            "base" => {
                if rest.is_empty() {
                    render::info(&format!("base: {}", self.session.config.base_url));
                } else {
                    self.session.set_base_url(rest);
                    render::info("base url updated");
                }
            }
            "token" => {
                if rest.is_empty() {
                    render::info(&format!(
                        "token set: {}",
                        self.session.state.token.is_some()
                    ));
                } else {
                    self.session.set_token(rest);
                    render::info("token updated");
                }
            }
            _ => render::info("unknown command, type /help"),
        }
        false
    }

    fn load_data(&mut self) {
        match self.session.refresh() {
            Ok(()) => render::info(&format!(
                "loaded {} tasks, {} hackathons",
                self.session.tasks.len(),
                self.session.hackathons.len()
            )),
            Err(err) => render::error(&err),
        }
    }
}

fn parse_day(value: &str) -> Result<DateTime<Utc>, String> {
    let day = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|err| format!("invalid date {}: {}", value, err))?;
    day.and_hms_opt(12, 0, 0)
        .and_then(|noon| noon.and_local_timezone(Local).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| format!("invalid date {}", value))
}
