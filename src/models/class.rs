use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum GradeLevel {
    X,
    XI,
    XII,
}

impl FromStr for GradeLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "X" => Ok(GradeLevel::X),
            "XI" => Ok(GradeLevel::XI),
            "XII" => Ok(GradeLevel::XII),
            other => Err(format!("unknown grade level: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Class {
    pub id: String,
    pub name: String,
    pub grade_level: GradeLevel,
    pub teacher_id: String,
    pub teacher_name: String,
    pub created_date: DateTime<Utc>,
}

/// Class record as written to the store, with the teacher's name copied in.
#[derive(Debug, Clone)]
pub struct NewClass {
    pub name: String,
    pub grade_level: GradeLevel,
    pub teacher_id: String,
    pub teacher_name: String,
}

/// Admin form for creating or editing a class.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub grade_level: String,
    #[serde(default)]
    pub teacher_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassWithCount {
    #[serde(flatten)]
    pub class: Class,
    pub student_count: usize,
}
