use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;

use crate::api::handlers::{
    handle_create_hackathon, handle_create_task, handle_delete_hackathon, handle_delete_task,
    handle_list_hackathons, handle_list_tasks, handle_login, handle_me, handle_notification_test,
    handle_register, handle_root, handle_update_hackathon, handle_update_task,
};
use crate::config::AppConfig;
use crate::digest::NotificationTrigger;
use crate::store::EntityStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<EntityStore>,
    pub trigger: Arc<NotificationTrigger>,
    pub config: Arc<AppConfig>,
}

pub struct AppServer {
    pub port: u16,
    pub state: AppState,
}

impl AppServer {
    pub fn new(port: u16, state: AppState) -> Self {
        Self { port, state }
    }

    pub async fn start(&self) -> Result<(), String> {
        let app = router(self.state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        axum::Server::bind(&addr)
            .serve(app.into_make_service())
            .await
            .map_err(|err| err.to_string())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/api/auth/register", post(handle_register))
        .route("/api/auth/login", post(handle_login))
        .route("/api/auth/me", get(handle_me))
        .route("/api/tasks", get(handle_list_tasks).post(handle_create_task))
        .route(
            "/api/tasks/:id",
            put(handle_update_task).delete(handle_delete_task),
        )
        .route(
            "/api/hackathons",
            get(handle_list_hackathons).post(handle_create_hackathon),
        )
        .route(
            "/api/hackathons/:id",
            put(handle_update_hackathon).delete(handle_delete_hackathon),
        )
        .route("/api/notifications/test", post(handle_notification_test))
        .with_state(state)
}
