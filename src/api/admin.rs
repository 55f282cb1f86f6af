use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use super::extract::CurrentUser;
use crate::error::AppError;
use crate::models::{
    Class, ClassForm, ClassWithCount, NewUserRequest, Role, SessionToken, Student, StudentForm,
    User,
};
use crate::services::admin;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserParams {
    pub role: Option<Role>,
}

pub async fn list_students(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Student>>, AppError> {
    current.require(Role::Admin)?;
    let students = admin::list_students(state.store.as_ref(), &params.q).await?;
    Ok(Json(students))
}

pub async fn create_student(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(form): Json<StudentForm>,
) -> Result<(StatusCode, Json<Student>), AppError> {
    current.require(Role::Admin)?;
    let student = admin::create_student(state.store.as_ref(), form).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn update_student(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
    Json(form): Json<StudentForm>,
) -> Result<Json<Student>, AppError> {
    current.require(Role::Admin)?;
    let student = admin::update_student(state.store.as_ref(), &id, form).await?;
    Ok(Json(student))
}

pub async fn delete_student(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    current.require(Role::Admin)?;
    admin::delete_student(state.store.as_ref(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_classes(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<ClassWithCount>>, AppError> {
    current.require(Role::Admin)?;
    let classes = admin::list_classes(state.store.as_ref()).await?;
    Ok(Json(classes))
}

pub async fn create_class(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(form): Json<ClassForm>,
) -> Result<(StatusCode, Json<Class>), AppError> {
    current.require(Role::Admin)?;
    let class = admin::create_class(state.store.as_ref(), form).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

pub async fn update_class(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
    Json(form): Json<ClassForm>,
) -> Result<Json<Class>, AppError> {
    current.require(Role::Admin)?;
    let class = admin::update_class(state.store.as_ref(), &id, form).await?;
    Ok(Json(class))
}

pub async fn delete_class(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    current.require(Role::Admin)?;
    admin::delete_class(state.store.as_ref(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_users(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(params): Query<UserParams>,
) -> Result<Json<Vec<User>>, AppError> {
    current.require(Role::Admin)?;
    let users = admin::list_users(state.store.as_ref(), params.role).await?;
    Ok(Json(users))
}

pub async fn create_user(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(req): Json<NewUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    current.require(Role::Admin)?;
    let user = admin::create_user(state.store.as_ref(), req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn issue_session(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<SessionToken>), AppError> {
    current.require(Role::Admin)?;
    let token = admin::issue_token(state.store.as_ref(), &id).await?;
    Ok((StatusCode::CREATED, Json(token)))
}
