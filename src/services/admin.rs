//! Admin forms for the student, class and user collections.

use tracing::{info, warn};

use crate::config::BootstrapAdmin;
use crate::error::{AppError, MSG_BOOTSTRAP_NOT_ADMIN};
use crate::models::{
    Class, ClassForm, ClassWithCount, GradeLevel, NewClass, NewStudent, NewUserRequest, Role,
    SessionToken, Student, StudentForm, User,
};
use crate::services::{filters, roster};
use crate::store::EntityStore;

pub const MSG_CLASS_NOT_FOUND: &str = "Kelas tidak ditemukan";
pub const MSG_TEACHER_NOT_FOUND: &str = "Wali kelas tidak ditemukan";
pub const MSG_INVALID_GRADE: &str = "Tingkat kelas tidak valid";

fn required(value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(AppError::required_fields())
    } else {
        Ok(trimmed.to_string())
    }
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// ---- students ----

/// Turns the form into a storable record, copying the class name in. A form
/// without `user_id` keeps the account link of `existing`, or uses the NIS
/// for a new student.
pub async fn student_record(
    store: &dyn EntityStore,
    form: &StudentForm,
    existing: Option<&Student>,
) -> Result<NewStudent, AppError> {
    let nis = required(&form.nis)?;
    let name = required(&form.name)?;
    let class_id = required(&form.class_id)?;

    let class = store
        .get_class(&class_id)
        .await?
        .ok_or_else(|| AppError::BadRequest(MSG_CLASS_NOT_FOUND.to_string()))?;

    let user_id = optional(form.user_id.as_deref())
        .or_else(|| existing.map(|s| s.user_id.clone()))
        .unwrap_or_else(|| nis.clone());

    Ok(NewStudent {
        nis,
        name,
        class_id,
        class_name: class.name,
        parent_phone: optional(form.parent_phone.as_deref()),
        user_id,
    })
}

pub async fn list_students(store: &dyn EntityStore, query: &str) -> Result<Vec<Student>, AppError> {
    let students = store.list_students().await?;
    Ok(filters::search_students(students, query))
}

pub async fn create_student(
    store: &dyn EntityStore,
    form: StudentForm,
) -> Result<Student, AppError> {
    let record = student_record(store, &form, None).await?;
    let student = store.create_student(record).await?;
    info!("student {} ({}) added to {}", student.nis, student.id, student.class_name);
    Ok(student)
}

pub async fn update_student(
    store: &dyn EntityStore,
    id: &str,
    form: StudentForm,
) -> Result<Student, AppError> {
    let existing = store.get_student(id).await?.ok_or(AppError::NotFound)?;
    let record = student_record(store, &form, Some(&existing)).await?;
    let student = store.update_student(id, record).await?;
    info!("student {} updated", student.id);
    Ok(student)
}

pub async fn delete_student(store: &dyn EntityStore, id: &str) -> Result<(), AppError> {
    store.delete_student(id).await?;
    info!("student {} deleted", id);
    Ok(())
}

// ---- classes ----

/// Turns the form into a storable record, copying the teacher's name in.
pub async fn class_record(store: &dyn EntityStore, form: &ClassForm) -> Result<NewClass, AppError> {
    let name = required(&form.name)?;
    let grade_level = required(&form.grade_level)?
        .parse::<GradeLevel>()
        .map_err(|_| AppError::BadRequest(MSG_INVALID_GRADE.to_string()))?;
    let teacher_id = required(&form.teacher_id)?;

    let teacher = store
        .get_user(&teacher_id)
        .await?
        .filter(|u| u.role == Role::Teacher)
        .ok_or_else(|| AppError::BadRequest(MSG_TEACHER_NOT_FOUND.to_string()))?;

    Ok(NewClass {
        name,
        grade_level,
        teacher_id,
        teacher_name: teacher.full_name,
    })
}

pub async fn list_classes(store: &dyn EntityStore) -> Result<Vec<ClassWithCount>, AppError> {
    let classes = store.list_classes().await?;
    let students = store.list_students().await?;
    Ok(roster::classes_with_counts(classes, &students))
}

pub async fn create_class(store: &dyn EntityStore, form: ClassForm) -> Result<Class, AppError> {
    let record = class_record(store, &form).await?;
    let class = store.create_class(record).await?;
    info!("class {} ({}) created", class.name, class.id);
    Ok(class)
}

pub async fn update_class(
    store: &dyn EntityStore,
    id: &str,
    form: ClassForm,
) -> Result<Class, AppError> {
    let record = class_record(store, &form).await?;
    let class = store.update_class(id, record).await?;
    info!("class {} updated", class.id);
    Ok(class)
}

pub async fn delete_class(store: &dyn EntityStore, id: &str) -> Result<(), AppError> {
    store.delete_class(id).await?;
    info!("class {} deleted", id);
    Ok(())
}

// ---- users ----

pub async fn list_users(store: &dyn EntityStore, role: Option<Role>) -> Result<Vec<User>, AppError> {
    match role {
        Some(role) => store.filter_users(role).await,
        None => store.list_users().await,
    }
}

pub async fn create_user(store: &dyn EntityStore, req: NewUserRequest) -> Result<User, AppError> {
    let req = NewUserRequest {
        email: required(&req.email)?,
        full_name: required(&req.full_name)?,
        role: req.role,
    };
    let user = store.create_user(req).await?;
    info!("user {} created with role {}", user.email, user.role);
    Ok(user)
}

pub async fn issue_token(store: &dyn EntityStore, user_id: &str) -> Result<SessionToken, AppError> {
    let user = store.get_user(user_id).await?.ok_or(AppError::NotFound)?;
    let token = store.issue_session(&user.id).await?;
    info!("session issued for {}", user.email);
    Ok(SessionToken {
        token,
        user_id: user.id,
    })
}

/// Makes sure the configured admin exists and that its token is valid. An
/// email that already belongs to a teacher or student is refused.
pub async fn ensure_bootstrap_admin(
    store: &dyn EntityStore,
    admin: &BootstrapAdmin,
) -> Result<User, AppError> {
    let user = match store.find_user_by_email(&admin.email).await? {
        Some(existing) => existing,
        None => {
            let created = store
                .create_user(NewUserRequest {
                    email: admin.email.clone(),
                    full_name: admin.full_name.clone(),
                    role: Role::Admin,
                })
                .await?;
            info!("bootstrap admin {} created", created.email);
            created
        }
    };

    if user.role != Role::Admin {
        warn!("bootstrap account {} is a {}, not an admin", user.email, user.role);
        return Err(AppError::Conflict(MSG_BOOTSTRAP_NOT_ADMIN.to_string()));
    }
    store.attach_session(&user.id, &admin.token).await?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::store::SqliteStore;

    fn bootstrap(email: &str) -> BootstrapAdmin {
        BootstrapAdmin {
            email: email.to_string(),
            full_name: "Admin Sekolah".to_string(),
            token: "boot".to_string(),
        }
    }

    async fn user(store: &SqliteStore, email: &str, role: Role) -> User {
        store
            .create_user(NewUserRequest {
                email: email.to_string(),
                full_name: "Bu Sari".to_string(),
                role,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_bootstrap_admin_is_created_once() {
        let store = SqliteStore::new(test_pool().await);
        let admin = bootstrap("admin@sekolah.id");

        let first = ensure_bootstrap_admin(&store, &admin).await.unwrap();
        let second = ensure_bootstrap_admin(&store, &admin).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.role, Role::Admin);
        assert_eq!(store.me("boot").await.unwrap().id, first.id);
    }

    #[tokio::test]
    async fn test_bootstrap_refuses_a_teacher_account() {
        let store = SqliteStore::new(test_pool().await);
        user(&store, "sari@sekolah.id", Role::Teacher).await;

        let result = ensure_bootstrap_admin(&store, &bootstrap("sari@sekolah.id")).await;

        assert!(matches!(result, Err(AppError::Conflict(msg)) if msg == MSG_BOOTSTRAP_NOT_ADMIN));
        assert!(matches!(store.me("boot").await, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_edit_without_user_id_keeps_account_link() {
        let store = SqliteStore::new(test_pool().await);
        let teacher = user(&store, "sari@sekolah.id", Role::Teacher).await;
        let class = create_class(
            &store,
            ClassForm {
                name: "X IPA 1".to_string(),
                grade_level: "X".to_string(),
                teacher_id: teacher.id.clone(),
            },
        )
        .await
        .unwrap();

        let created = create_student(
            &store,
            StudentForm {
                nis: "1001".to_string(),
                name: "Budi".to_string(),
                class_id: class.id.clone(),
                parent_phone: None,
                user_id: Some("account-budi".to_string()),
            },
        )
        .await
        .unwrap();

        let edited = update_student(
            &store,
            &created.id,
            StudentForm {
                nis: "1001".to_string(),
                name: "Budi Santoso".to_string(),
                class_id: class.id.clone(),
                parent_phone: None,
                user_id: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(edited.name, "Budi Santoso");
        assert_eq!(edited.user_id, "account-budi");
    }

    #[tokio::test]
    async fn test_new_student_without_user_id_uses_nis() {
        let store = SqliteStore::new(test_pool().await);
        let teacher = user(&store, "sari@sekolah.id", Role::Teacher).await;
        let class = create_class(
            &store,
            ClassForm {
                name: "X IPA 1".to_string(),
                grade_level: "X".to_string(),
                teacher_id: teacher.id,
            },
        )
        .await
        .unwrap();

        let student = create_student(
            &store,
            StudentForm {
                nis: "1002".to_string(),
                name: "Siti".to_string(),
                class_id: class.id,
                parent_phone: Some("  ".to_string()),
                user_id: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(student.user_id, "1002");
        assert_eq!(student.parent_phone, None);
    }

    #[test]
    fn test_required_trims_and_rejects_blank() {
        assert_eq!(required("  1001 ").unwrap(), "1001");
        assert!(required("   ").is_err());
    }

    #[test]
    fn test_optional_drops_blank_values() {
        assert_eq!(optional(Some(" 0812 ")), Some("0812".to_string()));
        assert_eq!(optional(Some("")), None);
        assert_eq!(optional(None), None);
    }
}
