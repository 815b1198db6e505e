pub mod types;

pub use types::{
    validate_date_range, Category, Hackathon, HackathonDraft, HackathonPatch, Priority,
    PublicUser, Status, Task, TaskDraft, TaskPatch, User,
};
