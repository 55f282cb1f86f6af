pub mod class;
pub mod permission;
pub mod student;
pub mod user;

pub use class::{Class, ClassForm, ClassWithCount, GradeLevel, NewClass};
pub use permission::{
    NewPermission, Permission, PermissionForm, PermissionStatus, Reason, RejectRequest, Review,
    SortOrder, StatusCounts,
};
pub use student::{NewStudent, RosterEntry, Student, StudentForm};
pub use user::{NewUserRequest, Role, SessionToken, User};
