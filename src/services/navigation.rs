use serde::Serialize;

use crate::models::{Role, User};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub title: &'static str,
    pub page: &'static str,
    pub path: &'static str,
}

const fn item(title: &'static str, page: &'static str, path: &'static str) -> NavItem {
    NavItem { title, page, path }
}

const DASHBOARD: NavItem = item("Dashboard", "Dashboard", "/dashboard");

const STUDENT_NAV: [NavItem; 2] = [
    item("Ajukan Izin", "SubmitPermission", "/permissions"),
    item("Riwayat Izin", "MyPermissions", "/permissions/mine"),
];

const TEACHER_NAV: [NavItem; 2] = [
    item("Persetujuan Izin", "ApprovePermissions", "/permissions/pending"),
    item("Siswa Kelas", "MyStudents", "/my-students"),
];

const ADMIN_NAV: [NavItem; 4] = [
    item("Semua Izin", "AllPermissions", "/permissions"),
    item("Data Siswa", "Students", "/students"),
    item("Data Kelas", "Classes", "/classes"),
    item("Laporan", "Reports", "/reports"),
];

pub fn for_role(role: Role) -> Vec<NavItem> {
    let specific: &[NavItem] = match role {
        Role::Student => &STUDENT_NAV,
        Role::Teacher => &TEACHER_NAV,
        Role::Admin => &ADMIN_NAV,
    };
    std::iter::once(DASHBOARD)
        .chain(specific.iter().cloned())
        .collect()
}

/// Sidebar contents: who is signed in and where they may go.
#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub app_name: &'static str,
    pub tagline: &'static str,
    pub user: User,
    pub initial: String,
    pub navigation: Vec<NavItem>,
}

impl Layout {
    pub fn for_user(user: User) -> Self {
        Self {
            app_name: "SIKMS",
            tagline: "Sistem Izin Keluar Masuk",
            initial: user.initial(),
            navigation: for_role(user.role),
            user,
        }
    }
}
