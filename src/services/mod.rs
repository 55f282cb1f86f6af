pub mod admin;
pub mod dashboard;
pub mod filters;
pub mod navigation;
pub mod permissions;
pub mod reports;
pub mod roster;

pub use dashboard::Dashboard;
pub use navigation::Layout;
pub use permissions::{HistoryView, PendingView, PermissionService};
pub use reports::{Report, ReportQuery};
