use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{
    Class, NewClass, NewPermission, NewStudent, NewUserRequest, Permission, PermissionStatus,
    Review, Role, SortOrder, Student, User,
};

const USER_COLUMNS: &str = "id, email, full_name, role, created_date";
const CLASS_COLUMNS: &str = "id, name, grade_level, teacher_id, teacher_name, created_date";
const STUDENT_COLUMNS: &str =
    "id, nis, name, class_id, class_name, parent_phone, user_id, created_date";
const PERMISSION_COLUMNS: &str = "id, student_id, student_name, student_nis, class_name, \
     permission_date, reason, description, status, reviewed_by, reviewed_by_name, \
     reviewed_date, rejection_reason, created_date";

// ---- users & sessions ----

pub async fn fetch_users(db: &SqlitePool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY full_name"
    ))
    .fetch_all(db)
    .await
}

pub async fn fetch_users_by_role(db: &SqlitePool, role: Role) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE role = ? ORDER BY full_name"
    ))
    .bind(role)
    .fetch_all(db)
    .await
}

pub async fn find_user_by_id(db: &SqlitePool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_user_by_email(db: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
        .bind(email)
        .fetch_optional(db)
        .await
}

pub async fn insert_user(db: &SqlitePool, req: NewUserRequest) -> Result<User, sqlx::Error> {
    let user = User {
        id: Uuid::new_v4().to_string(),
        email: req.email,
        full_name: req.full_name,
        role: req.role,
        created_date: Utc::now(),
    };

    sqlx::query(
        "INSERT INTO users (id, email, full_name, role, created_date) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&user.id)
    .bind(&user.email)
    .bind(&user.full_name)
    .bind(user.role)
    .bind(user.created_date)
    .execute(db)
    .await?;

    Ok(user)
}

pub async fn insert_session(
    db: &SqlitePool,
    token: &str,
    user_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO sessions (token, user_id, created_date) VALUES (?, ?, ?)")
        .bind(token)
        .bind(user_id)
        .bind(Utc::now())
        .execute(db)
        .await?;
    Ok(())
}

pub async fn find_user_by_session(
    db: &SqlitePool,
    token: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT u.id, u.email, u.full_name, u.role, u.created_date
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token = ?
        "#,
    )
    .bind(token)
    .fetch_optional(db)
    .await
}

pub async fn delete_session(db: &SqlitePool, token: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(db)
        .await?
        .rows_affected();
    Ok(result > 0)
}

// ---- classes ----

pub async fn fetch_classes(db: &SqlitePool) -> Result<Vec<Class>, sqlx::Error> {
    sqlx::query_as::<_, Class>(&format!(
        "SELECT {CLASS_COLUMNS} FROM classes ORDER BY grade_level, name"
    ))
    .fetch_all(db)
    .await
}

pub async fn find_class_by_id(db: &SqlitePool, id: &str) -> Result<Option<Class>, sqlx::Error> {
    sqlx::query_as::<_, Class>(&format!("SELECT {CLASS_COLUMNS} FROM classes WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_class(db: &SqlitePool, new: NewClass) -> Result<Class, sqlx::Error> {
    let class = Class {
        id: Uuid::new_v4().to_string(),
        name: new.name,
        grade_level: new.grade_level,
        teacher_id: new.teacher_id,
        teacher_name: new.teacher_name,
        created_date: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO classes (id, name, grade_level, teacher_id, teacher_name, created_date)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&class.id)
    .bind(&class.name)
    .bind(class.grade_level)
    .bind(&class.teacher_id)
    .bind(&class.teacher_name)
    .bind(class.created_date)
    .execute(db)
    .await?;

    Ok(class)
}

pub async fn update_class(
    db: &SqlitePool,
    id: &str,
    new: NewClass,
) -> Result<Option<Class>, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE classes
        SET name = ?, grade_level = ?, teacher_id = ?, teacher_name = ?
        WHERE id = ?
        "#,
    )
    .bind(&new.name)
    .bind(new.grade_level)
    .bind(&new.teacher_id)
    .bind(&new.teacher_name)
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    if result == 0 {
        return Ok(None);
    }
    find_class_by_id(db, id).await
}

pub async fn delete_class(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM classes WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();
    Ok(result > 0)
}

// ---- students ----

pub async fn fetch_students(db: &SqlitePool) -> Result<Vec<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "SELECT {STUDENT_COLUMNS} FROM students ORDER BY name"
    ))
    .fetch_all(db)
    .await
}

pub async fn fetch_students_by_user(
    db: &SqlitePool,
    user_id: &str,
) -> Result<Vec<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "SELECT {STUDENT_COLUMNS} FROM students WHERE user_id = ? ORDER BY created_date"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn fetch_students_by_class(
    db: &SqlitePool,
    class_id: &str,
) -> Result<Vec<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "SELECT {STUDENT_COLUMNS} FROM students WHERE class_id = ? ORDER BY name"
    ))
    .bind(class_id)
    .fetch_all(db)
    .await
}

pub async fn find_student_by_id(db: &SqlitePool, id: &str) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "SELECT {STUDENT_COLUMNS} FROM students WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_student(db: &SqlitePool, new: NewStudent) -> Result<Student, sqlx::Error> {
    let student = Student {
        id: Uuid::new_v4().to_string(),
        nis: new.nis,
        name: new.name,
        class_id: new.class_id,
        class_name: new.class_name,
        parent_phone: new.parent_phone,
        user_id: new.user_id,
        created_date: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO students
            (id, nis, name, class_id, class_name, parent_phone, user_id, created_date)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&student.id)
    .bind(&student.nis)
    .bind(&student.name)
    .bind(&student.class_id)
    .bind(&student.class_name)
    .bind(&student.parent_phone)
    .bind(&student.user_id)
    .bind(student.created_date)
    .execute(db)
    .await?;

    Ok(student)
}

pub async fn update_student(
    db: &SqlitePool,
    id: &str,
    new: NewStudent,
) -> Result<Option<Student>, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE students
        SET nis = ?, name = ?, class_id = ?, class_name = ?, parent_phone = ?, user_id = ?
        WHERE id = ?
        "#,
    )
    .bind(&new.nis)
    .bind(&new.name)
    .bind(&new.class_id)
    .bind(&new.class_name)
    .bind(&new.parent_phone)
    .bind(&new.user_id)
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    if result == 0 {
        return Ok(None);
    }
    find_student_by_id(db, id).await
}

pub async fn delete_student(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM students WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();
    Ok(result > 0)
}

// ---- permissions ----

pub async fn fetch_permissions(
    db: &SqlitePool,
    order: SortOrder,
) -> Result<Vec<Permission>, sqlx::Error> {
    let order_by = match order {
        SortOrder::NewestFirst => "created_date DESC, rowid DESC",
        SortOrder::OldestFirst => "created_date ASC, rowid ASC",
    };
    sqlx::query_as::<_, Permission>(&format!(
        "SELECT {PERMISSION_COLUMNS} FROM permissions ORDER BY {order_by}"
    ))
    .fetch_all(db)
    .await
}

pub async fn fetch_permissions_by_student(
    db: &SqlitePool,
    student_id: &str,
) -> Result<Vec<Permission>, sqlx::Error> {
    sqlx::query_as::<_, Permission>(&format!(
        "SELECT {PERMISSION_COLUMNS} FROM permissions WHERE student_id = ? \
         ORDER BY created_date DESC, rowid DESC"
    ))
    .bind(student_id)
    .fetch_all(db)
    .await
}

pub async fn find_permission_by_id(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<Permission>, sqlx::Error> {
    sqlx::query_as::<_, Permission>(&format!(
        "SELECT {PERMISSION_COLUMNS} FROM permissions WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_permission(
    db: &SqlitePool,
    new: NewPermission,
) -> Result<Permission, sqlx::Error> {
    let permission = Permission {
        id: Uuid::new_v4().to_string(),
        student_id: new.student_id,
        student_name: new.student_name,
        student_nis: new.student_nis,
        class_name: new.class_name,
        permission_date: new.permission_date,
        reason: new.reason,
        description: new.description,
        status: PermissionStatus::Pending,
        reviewed_by: None,
        reviewed_by_name: None,
        reviewed_date: None,
        rejection_reason: None,
        created_date: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO permissions
            (id, student_id, student_name, student_nis, class_name, permission_date,
            reason, description, status, created_date)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&permission.id)
    .bind(&permission.student_id)
    .bind(&permission.student_name)
    .bind(&permission.student_nis)
    .bind(&permission.class_name)
    .bind(permission.permission_date)
    .bind(permission.reason)
    .bind(&permission.description)
    .bind(permission.status)
    .bind(permission.created_date)
    .execute(db)
    .await?;

    Ok(permission)
}

/// Writes a review onto a pending request. Returns `false` when the record
/// is missing or has already left the pending state.
pub async fn review_permission(
    db: &SqlitePool,
    id: &str,
    review: &Review,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE permissions
        SET status = ?,
            reviewed_by = ?,
            reviewed_by_name = ?,
            reviewed_date = ?,
            rejection_reason = ?
        WHERE id = ? AND status = 'pending'
        "#,
    )
    .bind(review.status)
    .bind(&review.reviewed_by)
    .bind(&review.reviewed_by_name)
    .bind(review.reviewed_date)
    .bind(&review.rejection_reason)
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}
