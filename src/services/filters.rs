use crate::error::AppError;
use crate::models::{Permission, PermissionStatus, Student};

/// Parses a status tab value. `all`, empty and absent mean no filter.
pub fn parse_status_filter(raw: Option<&str>) -> Result<Option<PermissionStatus>, AppError> {
    match raw.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(value) => value
            .parse::<PermissionStatus>()
            .map(Some)
            .map_err(|_| AppError::BadRequest("Status tidak valid".to_string())),
    }
}

/// Case-insensitive substring match against any of the fields.
pub fn matches_query(query: &str, fields: &[&str]) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    fields.iter().any(|field| field.to_lowercase().contains(&needle))
}

pub fn by_status(permissions: Vec<Permission>, status: Option<PermissionStatus>) -> Vec<Permission> {
    match status {
        Some(status) => permissions.into_iter().filter(|p| p.status == status).collect(),
        None => permissions,
    }
}

pub fn search_permissions(permissions: Vec<Permission>, query: &str) -> Vec<Permission> {
    permissions
        .into_iter()
        .filter(|p| matches_query(query, &[&p.student_name, &p.student_nis, &p.class_name]))
        .collect()
}

pub fn search_students(students: Vec<Student>, query: &str) -> Vec<Student> {
    students
        .into_iter()
        .filter(|s| matches_query(query, &[&s.name, &s.nis, &s.class_name]))
        .collect()
}
