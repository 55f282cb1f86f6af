use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Reason {
    Sick,
    FamilyEmergency,
    SchoolActivity,
    Other,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::Sick => "sick",
            Reason::FamilyEmergency => "family_emergency",
            Reason::SchoolActivity => "school_activity",
            Reason::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Reason::Sick => "Sakit",
            Reason::FamilyEmergency => "Urusan Keluarga",
            Reason::SchoolActivity => "Kegiatan Sekolah",
            Reason::Other => "Lainnya",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Reason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sick" => Ok(Reason::Sick),
            "family_emergency" => Ok(Reason::FamilyEmergency),
            "school_activity" => Ok(Reason::SchoolActivity),
            "other" => Ok(Reason::Other),
            other => Err(format!("unknown reason: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum PermissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl PermissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionStatus::Pending => "pending",
            PermissionStatus::Approved => "approved",
            PermissionStatus::Rejected => "rejected",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PermissionStatus::Pending => "Menunggu",
            PermissionStatus::Approved => "Disetujui",
            PermissionStatus::Rejected => "Ditolak",
        }
    }

    /// Only a pending request may be reviewed, and only into a final state.
    pub fn can_transition_to(&self, next: PermissionStatus) -> bool {
        matches!(
            (self, next),
            (PermissionStatus::Pending, PermissionStatus::Approved)
                | (PermissionStatus::Pending, PermissionStatus::Rejected)
        )
    }
}

impl fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PermissionStatus::Pending),
            "approved" => Ok(PermissionStatus::Approved),
            "rejected" => Ok(PermissionStatus::Rejected),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Permission {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub student_nis: String,
    pub class_name: String,
    pub permission_date: NaiveDate,
    pub reason: Reason,
    pub description: String,
    pub status: PermissionStatus,
    pub reviewed_by: Option<String>,
    pub reviewed_by_name: Option<String>,
    pub reviewed_date: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_date: DateTime<Utc>,
}

/// Leave request as written to the store. Student fields are copied at
/// creation time and never refreshed.
#[derive(Debug, Clone)]
pub struct NewPermission {
    pub student_id: String,
    pub student_name: String,
    pub student_nis: String,
    pub class_name: String,
    pub permission_date: NaiveDate,
    pub reason: Reason,
    pub description: String,
}

/// The fields a reviewer writes when deciding a request.
#[derive(Debug, Clone)]
pub struct Review {
    pub status: PermissionStatus,
    pub reviewed_by: String,
    pub reviewed_by_name: String,
    pub reviewed_date: DateTime<Utc>,
    pub rejection_reason: Option<String>,
}

/// Student's submission form. Fields are kept raw so validation can answer
/// with a localized message instead of a deserialization error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionForm {
    #[serde(default)]
    pub permission_date: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RejectRequest {
    #[serde(default)]
    pub rejection_reason: String,
}

/// Status tally shown on dashboards and report headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl StatusCounts {
    pub fn tally<'a>(permissions: impl IntoIterator<Item = &'a Permission>) -> Self {
        permissions
            .into_iter()
            .fold(StatusCounts::default(), |mut counts, p| {
                counts.total += 1;
                match p.status {
                    PermissionStatus::Pending => counts.pending += 1,
                    PermissionStatus::Approved => counts.approved += 1,
                    PermissionStatus::Rejected => counts.rejected += 1,
                }
                counts
            })
    }
}

/// Sort spec accepted by the permission list, `-created_date` or `created_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "-created_date" => Ok(SortOrder::NewestFirst),
            "created_date" => Ok(SortOrder::OldestFirst),
            other => Err(format!("unsupported sort: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_only_moves_forward_from_pending() {
        use PermissionStatus::*;

        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Pending.can_transition_to(Pending));
        assert!(!Approved.can_transition_to(Pending));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Pending));
        assert!(!Rejected.can_transition_to(Approved));
    }

    #[test]
    fn test_reason_codes_and_labels() {
        let reason: Reason = "family_emergency".parse().unwrap();
        assert_eq!(reason, Reason::FamilyEmergency);
        assert_eq!(reason.label(), "Urusan Keluarga");
        assert!("holiday".parse::<Reason>().is_err());
    }

    #[test]
    fn test_sort_spec_parsing() {
        assert_eq!("-created_date".parse::<SortOrder>(), Ok(SortOrder::NewestFirst));
        assert_eq!("created_date".parse::<SortOrder>(), Ok(SortOrder::OldestFirst));
        assert!("name".parse::<SortOrder>().is_err());
    }
}
