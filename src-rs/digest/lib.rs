pub mod mailer;
pub mod trigger;
pub mod types;

pub use mailer::{HttpMailer, MailError, Mailer};
pub use trigger::{
    build_digest, hackathons_starting_soon, spawn_scheduler, NotificationTrigger,
};
pub use types::{CheckOutcome, Digest};
