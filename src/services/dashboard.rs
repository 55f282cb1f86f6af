use serde::Serialize;

use crate::error::AppError;
use crate::models::{Class, Permission, Role, SortOrder, StatusCounts, Student, User};
use crate::services::roster;
use crate::store::{EntityStore, StudentFilter};

const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    /// Absent on the student dashboard.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_students: Option<usize>,
    pub total_permissions: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl DashboardStats {
    fn new(total_students: Option<usize>, counts: StatusCounts) -> Self {
        Self {
            total_students,
            total_permissions: counts.total,
            pending: counts.pending,
            approved: counts.approved,
            rejected: counts.rejected,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub greeting: String,
    pub title: &'static str,
    pub role: Role,
    pub stats: DashboardStats,
    pub recent: Vec<Permission>,
}

pub fn title_for(role: Role) -> &'static str {
    match role {
        Role::Admin => "Dashboard Administrator",
        Role::Teacher => "Dashboard Wali Kelas",
        Role::Student => "Dashboard Siswa",
    }
}

/// Builds the per-role dashboard from whole collections. `permissions` must
/// already be ordered newest first.
pub fn build(
    user: &User,
    student: Option<&Student>,
    students: &[Student],
    classes: &[Class],
    permissions: &[Permission],
) -> Dashboard {
    let (total_students, scoped) = match user.role {
        Role::Admin => (Some(students.len()), permissions.to_vec()),
        Role::Teacher => {
            let class = roster::teacher_class(classes, &user.id);
            let class_students = roster::class_students(students, class);
            let scoped = roster::class_permissions(permissions, &class_students);
            (Some(class_students.len()), scoped)
        }
        Role::Student => {
            let scoped = match student {
                Some(student) => permissions
                    .iter()
                    .filter(|p| p.student_id == student.id)
                    .cloned()
                    .collect(),
                None => Vec::new(),
            };
            (None, scoped)
        }
    };

    let stats = DashboardStats::new(total_students, StatusCounts::tally(&scoped));
    let recent = scoped.into_iter().take(RECENT_LIMIT).collect();

    Dashboard {
        greeting: format!("Selamat Datang, {}", user.full_name),
        title: title_for(user.role),
        role: user.role,
        stats,
        recent,
    }
}

pub async fn load(store: &dyn EntityStore, user: &User) -> Result<Dashboard, AppError> {
    let permissions = store.list_permissions(SortOrder::NewestFirst).await?;
    let students = store.list_students().await?;
    let classes = store.list_classes().await?;

    let student = if user.role == Role::Student {
        store
            .filter_students(StudentFilter::UserId(&user.id))
            .await?
            .into_iter()
            .next()
    } else {
        None
    };

    Ok(build(user, student.as_ref(), &students, &classes, &permissions))
}
