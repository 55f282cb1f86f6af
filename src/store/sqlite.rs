use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{EntityStore, StudentFilter};
use crate::db::repository;
use crate::error::{AppError, MSG_ALREADY_REVIEWED, MSG_DUPLICATE_EMAIL, MSG_DUPLICATE_NIS};
use crate::models::{
    Class, NewClass, NewPermission, NewStudent, NewUserRequest, Permission, Review, Role,
    SortOrder, Student, User,
};

pub struct SqliteStore {
    db: SqlitePool,
}

impl SqliteStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

fn unique_violation(err: sqlx::Error, message: &str) -> AppError {
    match err.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => AppError::Conflict(message.to_string()),
        _ => AppError::Database(err),
    }
}

#[async_trait]
impl EntityStore for SqliteStore {
    async fn me(&self, token: &str) -> Result<User, AppError> {
        repository::find_user_by_session(&self.db, token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    async fn logout(&self, token: &str) -> Result<(), AppError> {
        repository::delete_session(&self.db, token).await?;
        Ok(())
    }

    async fn issue_session(&self, user_id: &str) -> Result<String, AppError> {
        let token = Uuid::new_v4().simple().to_string();
        repository::insert_session(&self.db, &token, user_id).await?;
        Ok(token)
    }

    async fn attach_session(&self, user_id: &str, token: &str) -> Result<(), AppError> {
        if let Some(owner) = repository::find_user_by_session(&self.db, token).await? {
            if owner.id == user_id {
                return Ok(());
            }
            return Err(AppError::Conflict("token already in use".to_string()));
        }
        repository::insert_session(&self.db, token, user_id).await?;
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        Ok(repository::fetch_users(&self.db).await?)
    }

    async fn filter_users(&self, role: Role) -> Result<Vec<User>, AppError> {
        Ok(repository::fetch_users_by_role(&self.db, role).await?)
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        Ok(repository::find_user_by_id(&self.db, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(repository::find_user_by_email(&self.db, email).await?)
    }

    async fn create_user(&self, req: NewUserRequest) -> Result<User, AppError> {
        repository::insert_user(&self.db, req)
            .await
            .map_err(|e| unique_violation(e, MSG_DUPLICATE_EMAIL))
    }

    async fn list_classes(&self) -> Result<Vec<Class>, AppError> {
        Ok(repository::fetch_classes(&self.db).await?)
    }

    async fn get_class(&self, id: &str) -> Result<Option<Class>, AppError> {
        Ok(repository::find_class_by_id(&self.db, id).await?)
    }

    async fn create_class(&self, new: NewClass) -> Result<Class, AppError> {
        Ok(repository::insert_class(&self.db, new).await?)
    }

    async fn update_class(&self, id: &str, new: NewClass) -> Result<Class, AppError> {
        repository::update_class(&self.db, id, new)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn delete_class(&self, id: &str) -> Result<(), AppError> {
        if repository::delete_class(&self.db, id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    }

    async fn list_students(&self) -> Result<Vec<Student>, AppError> {
        Ok(repository::fetch_students(&self.db).await?)
    }

    async fn filter_students(&self, filter: StudentFilter<'_>) -> Result<Vec<Student>, AppError> {
        let students = match filter {
            StudentFilter::UserId(user_id) => {
                repository::fetch_students_by_user(&self.db, user_id).await?
            }
            StudentFilter::ClassId(class_id) => {
                repository::fetch_students_by_class(&self.db, class_id).await?
            }
        };
        Ok(students)
    }

    async fn get_student(&self, id: &str) -> Result<Option<Student>, AppError> {
        Ok(repository::find_student_by_id(&self.db, id).await?)
    }

    async fn create_student(&self, new: NewStudent) -> Result<Student, AppError> {
        repository::insert_student(&self.db, new)
            .await
            .map_err(|e| unique_violation(e, MSG_DUPLICATE_NIS))
    }

    async fn update_student(&self, id: &str, new: NewStudent) -> Result<Student, AppError> {
        repository::update_student(&self.db, id, new)
            .await
            .map_err(|e| unique_violation(e, MSG_DUPLICATE_NIS))?
            .ok_or(AppError::NotFound)
    }

    async fn delete_student(&self, id: &str) -> Result<(), AppError> {
        if repository::delete_student(&self.db, id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    }

    async fn list_permissions(&self, order: SortOrder) -> Result<Vec<Permission>, AppError> {
        Ok(repository::fetch_permissions(&self.db, order).await?)
    }

    async fn filter_permissions(&self, student_id: &str) -> Result<Vec<Permission>, AppError> {
        Ok(repository::fetch_permissions_by_student(&self.db, student_id).await?)
    }

    async fn get_permission(&self, id: &str) -> Result<Option<Permission>, AppError> {
        Ok(repository::find_permission_by_id(&self.db, id).await?)
    }

    async fn create_permission(&self, new: NewPermission) -> Result<Permission, AppError> {
        Ok(repository::insert_permission(&self.db, new).await?)
    }

    async fn review_permission(&self, id: &str, review: Review) -> Result<Permission, AppError> {
        if !repository::review_permission(&self.db, id, &review).await? {
            return match repository::find_permission_by_id(&self.db, id).await? {
                Some(_) => Err(AppError::Conflict(MSG_ALREADY_REVIEWED.to_string())),
                None => Err(AppError::NotFound),
            };
        }

        repository::find_permission_by_id(&self.db, id)
            .await?
            .ok_or(AppError::NotFound)
    }
}
