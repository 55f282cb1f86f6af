use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use super::extract::CurrentUser;
use crate::error::AppError;
use crate::models::{Permission, PermissionForm, RejectRequest, Role};
use crate::services::filters::parse_status_filter;
use crate::services::{HistoryView, PendingView, PermissionService};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
    #[serde(default)]
    pub q: String,
}

pub async fn submit(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(form): Json<PermissionForm>,
) -> Result<(StatusCode, Json<Permission>), AppError> {
    let user = current.require(Role::Student)?;
    let permission = PermissionService::new(state.store.clone())
        .submit(user, form)
        .await?;
    Ok((StatusCode::CREATED, Json(permission)))
}

pub async fn list_mine(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(params): Query<ListParams>,
) -> Result<Json<HistoryView>, AppError> {
    let user = current.require(Role::Student)?;
    let status = parse_status_filter(params.status.as_deref())?;
    let view = PermissionService::new(state.store.clone())
        .history(user, status)
        .await?;
    Ok(Json(view))
}

pub async fn list_all(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Permission>>, AppError> {
    current.require(Role::Admin)?;
    let status = parse_status_filter(params.status.as_deref())?;
    let permissions = PermissionService::new(state.store.clone())
        .list_all(status, &params.q)
        .await?;
    Ok(Json(permissions))
}

pub async fn list_pending(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<PendingView>, AppError> {
    let teacher = current.require(Role::Teacher)?;
    let view = PermissionService::new(state.store.clone())
        .pending_for(teacher)
        .await?;
    Ok(Json(view))
}

pub async fn approve(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Permission>, AppError> {
    let teacher = current.require(Role::Teacher)?;
    let permission = PermissionService::new(state.store.clone())
        .approve(teacher, &id)
        .await?;
    Ok(Json(permission))
}

pub async fn reject(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
    body: Option<Json<RejectRequest>>,
) -> Result<Json<Permission>, AppError> {
    let teacher = current.require(Role::Teacher)?;
    // No body reads as a blank reason.
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let permission = PermissionService::new(state.store.clone())
        .reject(teacher, &id, &req.rejection_reason)
        .await?;
    Ok(Json(permission))
}
