pub mod admin;
pub mod extract;
pub mod permissions;
pub mod reports;

use axum::Json;
use axum::routing::{post, put};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use tracing::info;

use crate::error::AppError;
use crate::models::{Role, User};
use crate::services::{Dashboard, Layout, dashboard, roster};
use crate::state::AppState;

use self::extract::CurrentUser;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/me", get(me))
        .route("/auth/logout", post(logout))
        .route("/navigation", get(navigation))
        .route("/dashboard", get(show_dashboard))
        .route(
            "/permissions",
            get(permissions::list_all).post(permissions::submit),
        )
        .route("/permissions/mine", get(permissions::list_mine))
        .route("/permissions/pending", get(permissions::list_pending))
        .route("/permissions/{id}/approve", post(permissions::approve))
        .route("/permissions/{id}/reject", post(permissions::reject))
        .route("/my-students", get(my_students))
        .route(
            "/students",
            get(admin::list_students).post(admin::create_student),
        )
        .route(
            "/students/{id}",
            put(admin::update_student).delete(admin::delete_student),
        )
        .route("/classes", get(admin::list_classes).post(admin::create_class))
        .route(
            "/classes/{id}",
            put(admin::update_class).delete(admin::delete_class),
        )
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route("/users/{id}/sessions", post(admin::issue_session))
        .route("/reports", get(reports::preview))
        .route("/reports/export", get(reports::export))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn me(current: CurrentUser) -> Json<User> {
    Json(current.user)
}

async fn logout(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<StatusCode, AppError> {
    state.store.logout(&current.token).await?;
    info!("{} signed out", current.user.email);
    Ok(StatusCode::NO_CONTENT)
}

async fn navigation(current: CurrentUser) -> Json<Layout> {
    Json(Layout::for_user(current.user))
}

async fn show_dashboard(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Dashboard>, AppError> {
    let dashboard = dashboard::load(state.store.as_ref(), &current.user).await?;
    Ok(Json(dashboard))
}

async fn my_students(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<roster::ClassRoster>, AppError> {
    let teacher = current.require(Role::Teacher)?;
    let view = roster::load_for_teacher(state.store.as_ref(), teacher).await?;
    Ok(Json(view))
}
