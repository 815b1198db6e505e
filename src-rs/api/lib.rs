pub use crate::auth::Claims;
pub use crate::config::AppConfig;
pub use crate::digest::{CheckOutcome, NotificationTrigger};
pub use crate::error::AppError;
pub use crate::model::{Hackathon, PublicUser, Task, User};
pub use crate::store::EntityStore;

pub mod handlers;
pub mod server;
