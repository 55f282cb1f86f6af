use axum::Json;
use axum::extract::{Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::IntoResponse;
use chrono::Utc;
use tracing::info;

use super::extract::CurrentUser;
use crate::error::AppError;
use crate::models::Role;
use crate::services::reports::{self, Report, ReportQuery};
use crate::state::AppState;

pub async fn preview(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Report>, AppError> {
    current.require(Role::Admin)?;
    let report = reports::build(state.store.as_ref(), query.parse()?).await?;
    Ok(Json(report))
}

pub async fn export(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Role::Admin)?;
    let report = reports::build(state.store.as_ref(), query.parse()?).await?;

    let filename = reports::export_filename(Utc::now().date_naive());
    info!("{} exported {} rows to {}", current.user.email, report.rows.len(), filename);

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        reports::to_csv(&report.rows),
    ))
}
