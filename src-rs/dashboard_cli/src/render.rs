use std::io::{self, Write};

use chrono::{DateTime, Local};

use hackathon_hero_rs::model::{Hackathon, PublicUser, Status, Task};
use hackathon_hero_rs::views::{self, SearchResults, TaskSort};

use crate::session::Session;

pub fn banner(session: &Session) {
    println!("Hackathon Hero Dashboard");
    println!("API: {}", session.config.base_url);
    if let Some(user) = &session.state.user {
        println!("Signed in as: {} <{}>", user.name, user.email);
    } else {
        println!("Not signed in. Use /login or /register.");
    }
    println!("Theme: {}", session.state.theme);
    println!("Type /help for commands, or just type to search.");
}

pub fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

pub fn help() {
    println!("Commands:");
    println!("  /help                              Show commands");
    println!("  /exit | /quit                      Exit");
    println!("  /register <name> <email> <pass>    Create an account");
    println!("  /login <email> <pass>              Sign in");
    println!("  /logout                            Sign out");
    println!("  /me                                Show the current user");
    println!("  /refresh                           Reload tasks and hackathons");
    println!("  /dashboard                         Overview of today");
    println!("  /tasks [filters] [sort]            List tasks (pending|completed,");
    println!("                                     category, due|priority|created)");
    println!("  /today | /week | /day <date>       Calendar views");
    println!("  /upcoming | /hackathons            Hackathon views");
    println!("  /progress                          Completion stats");
    println!("  /search <query>                    Search tasks and hackathons");
    println!("  /add <YYYY-MM-DD> <title>          Create a task");
    println!("  /addhack <start> <end> <name>      Create a hackathon");
    println!("  /toggle <task id>                  Toggle pending/completed");
    println!("  /deltask <id> | /delhack <id>      Delete");
    println!("  /digest                            Trigger the email digest");
    println!("  /theme                             Toggle light/dark preference");
    println!("  /config                            Show current config");
    println!("  /base <url> | /token <token>       Update connection settings");
}

pub fn tasks(title: &str, items: &[Task]) {
    println!("{} ({})", title, items.len());
    if items.is_empty() {
        println!("  no tasks");
        return;
    }
    for task in items {
        println!("  {}", task_line(task));
    }
}

fn task_line(task: &Task) -> String {
    let marker = match task.status {
        Status::Pending => "[ ]",
        Status::Completed => "[x]",
    };
    format!(
        "{} {}  {}  ({}, {}, due {})",
        marker,
        task.id,
        task.title,
        task.priority.label(),
        task.category.label(),
        task.due_date.with_timezone(&Local).format("%Y-%m-%d")
    )
}

pub fn hackathons(title: &str, items: &[Hackathon], all_tasks: &[Task]) {
    println!("{} ({})", title, items.len());
    if items.is_empty() {
        println!("  no hackathons");
        return;
    }
    for hackathon in items {
        let linked = views::tasks_for_hackathon(all_tasks, &hackathon.id);
        println!(
            "  {}  {}  {} -> {}  ({} tasks)",
            hackathon.id,
            hackathon.name,
            hackathon.start_date.with_timezone(&Local).format("%Y-%m-%d"),
            hackathon.end_date.with_timezone(&Local).format("%Y-%m-%d"),
            linked.len()
        );
        if let Some(url) = &hackathon.url {
            println!("      {}", url);
        }
    }
}

pub fn dashboard(session: &Session, now: DateTime<Local>) {
    let tasks = &session.tasks;
    let completed = tasks.iter().filter(|t| t.status == Status::Completed).count();
    let pending = tasks.len() - completed;
    println!("Dashboard — {}", now.format("%a %b %e %Y"));
    println!(
        "  {} tasks total, {} pending, {} completed ({}% done)",
        tasks.len(),
        pending,
        completed,
        views::completion_rate(tasks)
    );

    let today = views::sorted_tasks(&views::tasks_due_today(tasks, now), TaskSort::DueDate);
    println!("Today's tasks ({})", today.len());
    for task in today.iter().take(5) {
        println!("  {}", task_line(task));
    }
    if today.is_empty() {
        println!("  nothing due today");
    }

    let upcoming = views::upcoming_hackathons(&session.hackathons, now);
    println!("Next hackathons");
    if upcoming.is_empty() {
        println!("  none scheduled");
    }
    for hackathon in upcoming.iter().take(3) {
        println!(
            "  {}  starts {}",
            hackathon.name,
            hackathon.start_date.with_timezone(&Local).format("%Y-%m-%d")
        );
    }
}

pub fn progress(tasks: &[Task], now: DateTime<Local>) {
    println!("Overall completion: {}%", views::completion_rate(tasks));
    println!(
        "Completed in the last 7 days: {}",
        views::completed_last_week(tasks, now)
    );
    println!("By category:");
    for stat in views::category_breakdown(tasks) {
        println!(
            "  {:<10} {}/{} ({}%)",
            stat.category.label(),
            stat.completed,
            stat.total,
            stat.rate
        );
    }
}

pub fn search_results(results: &SearchResults) {
    if results.tasks.is_empty() && results.hackathons.is_empty() {
        println!("no matches");
        return;
    }
    if !results.tasks.is_empty() {
        println!("Tasks");
        for task in &results.tasks {
            println!("  {}", task_line(task));
        }
    }
    if !results.hackathons.is_empty() {
        println!("Hackathons");
        for hackathon in &results.hackathons {
            println!("  {}  {}", hackathon.id, hackathon.name);
        }
    }
}

pub fn user(user: &PublicUser) {
    println!("{} <{}> (id {})", user.name, user.email, user.id);
}

pub fn config(session: &Session) {
    println!("config:");
    println!("  base: {}", session.config.base_url);
    println!("  state file: {}", session.config.state_file.display());
    println!("  theme: {}", session.state.theme);
    println!("  token set: {}", session.state.token.is_some());
    if let Some(user) = &session.state.user {
        println!("  user: {} <{}>", user.name, user.email);
    }
}

pub fn info(msg: &str) {
    println!("{}", msg);
}

pub fn error(msg: &str) {
    eprintln!("error: {}", msg);
}
