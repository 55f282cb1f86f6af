//! Report preview and CSV export over the permission list.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{Permission, PermissionStatus, SortOrder, StatusCounts};
use crate::services::filters;
use crate::store::EntityStore;

pub const CSV_HEADER: &str = "NIS,Nama,Kelas,Tanggal Izin,Alasan,Status,Ditinjau Oleh";

/// Raw filter values as they arrive from the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub class_name: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportCriteria {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub class_name: Option<String>,
    pub status: Option<PermissionStatus>,
}

fn parse_date(raw: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| AppError::BadRequest("Format tanggal tidak valid".to_string())),
    }
}

impl ReportQuery {
    pub fn parse(&self) -> Result<ReportCriteria, AppError> {
        let class_name = match self.class_name.as_deref().map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(name) => Some(name.to_string()),
        };

        Ok(ReportCriteria {
            start_date: parse_date(self.start_date.as_deref())?,
            end_date: parse_date(self.end_date.as_deref())?,
            class_name,
            status: filters::parse_status_filter(self.status.as_deref())?,
        })
    }
}

impl ReportCriteria {
    /// Date bounds are inclusive; class name is an exact match.
    pub fn matches(&self, p: &Permission) -> bool {
        if self.start_date.is_some_and(|start| p.permission_date < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| p.permission_date > end) {
            return false;
        }
        if self.class_name.as_ref().is_some_and(|name| &p.class_name != name) {
            return false;
        }
        if self.status.is_some_and(|status| p.status != status) {
            return false;
        }
        true
    }

    pub fn apply(&self, permissions: Vec<Permission>) -> Vec<Permission> {
        permissions.into_iter().filter(|p| self.matches(p)).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub criteria: ReportCriteria,
    pub stats: StatusCounts,
    /// Class names offered by the class picker.
    pub class_names: Vec<String>,
    pub rows: Vec<Permission>,
}

pub async fn build(store: &dyn EntityStore, criteria: ReportCriteria) -> Result<Report, AppError> {
    let permissions = store.list_permissions(SortOrder::NewestFirst).await?;
    let class_names: BTreeSet<String> = store
        .list_classes()
        .await?
        .into_iter()
        .map(|c| c.name)
        .collect();

    let rows = criteria.apply(permissions);
    Ok(Report {
        stats: StatusCounts::tally(&rows),
        class_names: class_names.into_iter().collect(),
        criteria,
        rows,
    })
}

/// Joins each field with a bare comma. Fields are not quoted, so a comma
/// inside a name or class shifts the columns of that row.
pub fn to_csv(permissions: &[Permission]) -> String {
    let mut lines = Vec::with_capacity(permissions.len() + 1);
    lines.push(CSV_HEADER.to_string());
    for p in permissions {
        lines.push(
            [
                p.student_nis.as_str(),
                p.student_name.as_str(),
                p.class_name.as_str(),
                &p.permission_date.format("%d/%m/%Y").to_string(),
                p.reason.as_str(),
                p.status.as_str(),
                p.reviewed_by_name.as_deref().unwrap_or("-"),
            ]
            .join(","),
        );
    }
    lines.join("\n")
}

pub fn export_filename(today: NaiveDate) -> String {
    format!("laporan-izin-{}.csv", today.format("%Y-%m-%d"))
}
