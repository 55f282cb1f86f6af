use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: String,
    pub nis: String,
    pub name: String,
    pub class_id: String,
    pub class_name: String,
    pub parent_phone: Option<String>,
    pub user_id: String,
    pub created_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewStudent {
    pub nis: String,
    pub name: String,
    pub class_id: String,
    pub class_name: String,
    pub parent_phone: Option<String>,
    pub user_id: String,
}

/// Admin form for creating or editing a student.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentForm {
    #[serde(default)]
    pub nis: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub class_id: String,
    pub parent_phone: Option<String>,
    /// Account linked to this student. When omitted, an edit keeps the
    /// stored link and a new record uses the NIS.
    pub user_id: Option<String>,
}

/// Roster entry on a teacher's class page.
#[derive(Debug, Clone, Serialize)]
pub struct RosterEntry {
    #[serde(flatten)]
    pub student: Student,
    pub permission_count: usize,
}
