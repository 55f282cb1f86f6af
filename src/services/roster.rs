//! Class scoping: which class a teacher owns, who is in it and what they
//! have submitted.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::AppError;
use crate::models::{Class, ClassWithCount, Permission, RosterEntry, SortOrder, Student, User};
use crate::store::EntityStore;

#[derive(Debug, Clone, Serialize)]
pub struct ClassRoster {
    pub class: Option<Class>,
    pub students: Vec<RosterEntry>,
}

/// The homeroom class of a teacher, the first class naming them.
pub fn teacher_class<'a>(classes: &'a [Class], teacher_id: &str) -> Option<&'a Class> {
    classes.iter().find(|c| c.teacher_id == teacher_id)
}

/// Students of `class`; empty when the teacher has no class.
pub fn class_students(students: &[Student], class: Option<&Class>) -> Vec<Student> {
    match class {
        Some(class) => students
            .iter()
            .filter(|s| s.class_id == class.id)
            .cloned()
            .collect(),
        None => Vec::new(),
    }
}

/// Permissions submitted by any of the given students.
pub fn class_permissions(permissions: &[Permission], students: &[Student]) -> Vec<Permission> {
    let ids: HashSet<&str> = students.iter().map(|s| s.id.as_str()).collect();
    permissions
        .iter()
        .filter(|p| ids.contains(p.student_id.as_str()))
        .cloned()
        .collect()
}

pub fn roster(students: Vec<Student>, permissions: &[Permission]) -> Vec<RosterEntry> {
    students
        .into_iter()
        .map(|student| {
            let permission_count = permissions
                .iter()
                .filter(|p| p.student_id == student.id)
                .count();
            RosterEntry {
                student,
                permission_count,
            }
        })
        .collect()
}

pub fn classes_with_counts(classes: Vec<Class>, students: &[Student]) -> Vec<ClassWithCount> {
    classes
        .into_iter()
        .map(|class| {
            let student_count = students.iter().filter(|s| s.class_id == class.id).count();
            ClassWithCount {
                class,
                student_count,
            }
        })
        .collect()
}

pub async fn load_for_teacher(
    store: &dyn EntityStore,
    teacher: &User,
) -> Result<ClassRoster, AppError> {
    let students = store.list_students().await?;
    let classes = store.list_classes().await?;
    let permissions = store.list_permissions(SortOrder::NewestFirst).await?;

    let class = teacher_class(&classes, &teacher.id).cloned();
    let members = class_students(&students, class.as_ref());
    Ok(ClassRoster {
        students: roster(members, &permissions),
        class,
    })
}
