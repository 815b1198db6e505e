use axum::extract::{FromRequestParts, Path, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::server::AppState;
use crate::auth;
use crate::digest::CheckOutcome;
use crate::error::AppError;
use crate::model::{
    Hackathon, HackathonDraft, HackathonPatch, PublicUser, Task, TaskDraft, TaskPatch,
};

pub struct AuthUser(pub String);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::Unauthorized)?;
        let token = header.strip_prefix("Bearer ").ok_or(AppError::Unauthorized)?;
        let claims = auth::verify_token(token.trim(), &state.config.jwt_secret)?;
        Ok(AuthUser(claims.sub))
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub token: String,
}

pub async fn handle_root() -> &'static str {
    "Hackathon Hero backend is running"
}

pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let password_hash = auth::hash_password(&req.password)?;
    let user = state.store.create_user(&req.name, &req.email, &password_hash)?;
    let token = auth::issue_token(&user.id, &state.config.jwt_secret)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user.public(),
            token,
        }),
    ))
}

pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = state
        .store
        .find_user_by_email(&req.email)?
        .ok_or_else(|| AppError::AuthFailed("Invalid login credentials".to_string()))?;
    if !auth::verify_password(&req.password, &user.password_hash) {
        return Err(AppError::AuthFailed("Invalid login credentials".to_string()));
    }
    let token = auth::issue_token(&user.id, &state.config.jwt_secret)?;
    Ok(Json(AuthResponse {
        user: user.public(),
        token,
    }))
}

pub async fn handle_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    let user = state
        .store
        .get_user(&user.0)?
        .ok_or_else(|| AppError::not_found("User"))?;
    Ok(Json(user.public()))
}

pub async fn handle_list_tasks(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<Task>>, AppError> {
    Ok(Json(state.store.list_tasks()?))
}

pub async fn handle_create_task(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(draft): Json<TaskDraft>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    let task = state.store.create_task(draft)?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn handle_update_task(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>, AppError> {
    Ok(Json(state.store.update_task(&id, patch)?))
}

pub async fn handle_delete_task(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    state.store.delete_task(&id)?;
    Ok(Json(json!({ "message": "Task deleted" })))
}

pub async fn handle_list_hackathons(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<Hackathon>>, AppError> {
    Ok(Json(state.store.list_hackathons()?))
}

pub async fn handle_create_hackathon(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(draft): Json<HackathonDraft>,
) -> Result<(StatusCode, Json<Hackathon>), AppError> {
    let hackathon = state.store.create_hackathon(draft)?;
    Ok((StatusCode::CREATED, Json(hackathon)))
}

pub async fn handle_update_hackathon(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
    Json(patch): Json<HackathonPatch>,
) -> Result<Json<Hackathon>, AppError> {
    Ok(Json(state.store.update_hackathon(&id, patch)?))
}

pub async fn handle_delete_hackathon(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    state.store.delete_hackathon(&id)?;
    Ok(Json(json!({ "message": "Hackathon deleted" })))
}

pub async fn handle_notification_test(
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let trigger = state.trigger.clone();
    let outcome = tokio::task::spawn_blocking(move || trigger.run_check(true))
        .await
        .map_err(|err| AppError::internal(format!("notification task failed: {}", err)))?;
    if outcome == CheckOutcome::Failed {
        return Err(AppError::internal("Failed to trigger notifications"));
    }
    Ok(Json(json!({ "message": "Notification check triggered successfully" })))
}
