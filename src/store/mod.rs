pub mod sqlite;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{
    Class, NewClass, NewPermission, NewStudent, NewUserRequest, Permission, Review, Role,
    SortOrder, Student, User,
};

pub use sqlite::SqliteStore;

/// Equality predicates supported by the student collection.
#[derive(Debug, Clone, Copy)]
pub enum StudentFilter<'a> {
    UserId(&'a str),
    ClassId(&'a str),
}

/// Client for the entity and identity backend. Views fetch whole collections
/// through it and do their own filtering.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Resolves a session token to its user. `Unauthorized` when unknown.
    async fn me(&self, token: &str) -> Result<User, AppError>;
    async fn logout(&self, token: &str) -> Result<(), AppError>;
    async fn issue_session(&self, user_id: &str) -> Result<String, AppError>;
    async fn attach_session(&self, user_id: &str, token: &str) -> Result<(), AppError>;

    async fn list_users(&self) -> Result<Vec<User>, AppError>;
    async fn filter_users(&self, role: Role) -> Result<Vec<User>, AppError>;
    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn create_user(&self, req: NewUserRequest) -> Result<User, AppError>;

    async fn list_classes(&self) -> Result<Vec<Class>, AppError>;
    async fn get_class(&self, id: &str) -> Result<Option<Class>, AppError>;
    async fn create_class(&self, new: NewClass) -> Result<Class, AppError>;
    async fn update_class(&self, id: &str, new: NewClass) -> Result<Class, AppError>;
    async fn delete_class(&self, id: &str) -> Result<(), AppError>;

    async fn list_students(&self) -> Result<Vec<Student>, AppError>;
    async fn filter_students(&self, filter: StudentFilter<'_>) -> Result<Vec<Student>, AppError>;
    async fn get_student(&self, id: &str) -> Result<Option<Student>, AppError>;
    async fn create_student(&self, new: NewStudent) -> Result<Student, AppError>;
    async fn update_student(&self, id: &str, new: NewStudent) -> Result<Student, AppError>;
    async fn delete_student(&self, id: &str) -> Result<(), AppError>;

    async fn list_permissions(&self, order: SortOrder) -> Result<Vec<Permission>, AppError>;
    async fn filter_permissions(&self, student_id: &str) -> Result<Vec<Permission>, AppError>;
    async fn get_permission(&self, id: &str) -> Result<Option<Permission>, AppError>;
    async fn create_permission(&self, new: NewPermission) -> Result<Permission, AppError>;
    /// Applies a review to a pending request. `Conflict` if it was already
    /// reviewed, `NotFound` if it does not exist.
    async fn review_permission(&self, id: &str, review: Review) -> Result<Permission, AppError>;
}
