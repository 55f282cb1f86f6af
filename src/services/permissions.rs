use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{AppError, MSG_ALREADY_REVIEWED};
use crate::models::{
    Class, NewPermission, Permission, PermissionForm, PermissionStatus, Reason, Review, Role,
    SortOrder, Student, User,
};
use crate::services::{filters, roster};
use crate::store::{EntityStore, StudentFilter};

pub const MSG_REJECTION_REASON_REQUIRED: &str = "Alasan penolakan wajib diisi";
pub const MSG_INVALID_DATE: &str = "Format tanggal tidak valid";
pub const MSG_INVALID_REASON: &str = "Alasan izin tidak valid";

/// Pending requests for a teacher's homeroom class.
#[derive(Debug, Clone, Serialize)]
pub struct PendingView {
    pub class: Option<Class>,
    pub permissions: Vec<Permission>,
}

/// A student's own request history.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryView {
    pub student: Student,
    pub permissions: Vec<Permission>,
}

/// Validated submission, before the student fields are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub permission_date: NaiveDate,
    pub reason: Reason,
    pub description: String,
}

impl Submission {
    pub fn parse(form: &PermissionForm) -> Result<Self, AppError> {
        let raw_date = form.permission_date.trim();
        let raw_reason = form.reason.trim();
        if raw_date.is_empty() || raw_reason.is_empty() {
            return Err(AppError::required_fields());
        }

        let permission_date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
            .map_err(|_| AppError::BadRequest(MSG_INVALID_DATE.to_string()))?;
        let reason = raw_reason
            .parse::<Reason>()
            .map_err(|_| AppError::BadRequest(MSG_INVALID_REASON.to_string()))?;

        Ok(Self {
            permission_date,
            reason,
            description: form.description.clone(),
        })
    }

    pub fn for_student(self, student: &Student) -> NewPermission {
        NewPermission {
            student_id: student.id.clone(),
            student_name: student.name.clone(),
            student_nis: student.nis.clone(),
            class_name: student.class_name.clone(),
            permission_date: self.permission_date,
            reason: self.reason,
            description: self.description,
        }
    }
}

/// A rejection needs a reason that is not blank.
pub fn validate_rejection_reason(reason: &str) -> Result<String, AppError> {
    if reason.trim().is_empty() {
        return Err(AppError::BadRequest(MSG_REJECTION_REASON_REQUIRED.to_string()));
    }
    Ok(reason.to_string())
}

pub struct PermissionService {
    store: Arc<dyn EntityStore>,
}

impl PermissionService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    async fn student_for(&self, user: &User) -> Result<Student, AppError> {
        self.store
            .filter_students(StudentFilter::UserId(&user.id))
            .await?
            .into_iter()
            .next()
            .ok_or(AppError::StudentNotFound)
    }

    pub async fn submit(&self, user: &User, form: PermissionForm) -> Result<Permission, AppError> {
        let student = self.student_for(user).await?;
        let submission = Submission::parse(&form).inspect_err(|e| {
            warn!("rejected submission from {}: {}", user.email, e);
        })?;

        let permission = self
            .store
            .create_permission(submission.for_student(&student))
            .await?;
        info!(
            "permission {} submitted by {} for {}",
            permission.id, student.nis, permission.permission_date
        );
        Ok(permission)
    }

    pub async fn history(
        &self,
        user: &User,
        status: Option<PermissionStatus>,
    ) -> Result<HistoryView, AppError> {
        let student = self.student_for(user).await?;
        let mine = self.store.filter_permissions(&student.id).await?;
        Ok(HistoryView {
            student,
            permissions: filters::by_status(mine, status),
        })
    }

    pub async fn list_all(
        &self,
        status: Option<PermissionStatus>,
        query: &str,
    ) -> Result<Vec<Permission>, AppError> {
        let all = self.store.list_permissions(SortOrder::NewestFirst).await?;
        Ok(filters::search_permissions(filters::by_status(all, status), query))
    }

    pub async fn pending_for(&self, teacher: &User) -> Result<PendingView, AppError> {
        let classes = self.store.list_classes().await?;
        let class = roster::teacher_class(&classes, &teacher.id).cloned();
        let students = match &class {
            Some(class) => {
                self.store
                    .filter_students(StudentFilter::ClassId(&class.id))
                    .await?
            }
            None => Vec::new(),
        };
        let permissions = self.store.list_permissions(SortOrder::NewestFirst).await?;
        let pending = roster::class_permissions(&permissions, &students)
            .into_iter()
            .filter(|p| p.status == PermissionStatus::Pending)
            .collect();

        Ok(PendingView {
            class,
            permissions: pending,
        })
    }

    pub async fn approve(&self, teacher: &User, id: &str) -> Result<Permission, AppError> {
        self.decide(teacher, id, PermissionStatus::Approved, None).await
    }

    pub async fn reject(
        &self,
        teacher: &User,
        id: &str,
        rejection_reason: &str,
    ) -> Result<Permission, AppError> {
        let reason = validate_rejection_reason(rejection_reason).inspect_err(|_| {
            warn!("rejection of {} by {} without a reason", id, teacher.email);
        })?;
        self.decide(teacher, id, PermissionStatus::Rejected, Some(reason))
            .await
    }

    async fn decide(
        &self,
        teacher: &User,
        id: &str,
        next: PermissionStatus,
        rejection_reason: Option<String>,
    ) -> Result<Permission, AppError> {
        if teacher.role != Role::Teacher {
            return Err(AppError::Forbidden);
        }

        let permission = self.store.get_permission(id).await?.ok_or(AppError::NotFound)?;
        if !permission.status.can_transition_to(next) {
            return Err(AppError::Conflict(MSG_ALREADY_REVIEWED.to_string()));
        }

        let classes = self.store.list_classes().await?;
        let class = roster::teacher_class(&classes, &teacher.id).ok_or(AppError::Forbidden)?;
        let members = self
            .store
            .filter_students(StudentFilter::ClassId(&class.id))
            .await?;
        if !members.iter().any(|s| s.id == permission.student_id) {
            return Err(AppError::NotInClass);
        }

        let review = Review {
            status: next,
            reviewed_by: teacher.email.clone(),
            reviewed_by_name: teacher.full_name.clone(),
            reviewed_date: Utc::now(),
            rejection_reason,
        };
        let updated = self.store.review_permission(id, review).await?;
        info!("permission {} {} by {}", updated.id, updated.status, teacher.email);
        Ok(updated)
    }
}
