//! Student roster built on the reversible action log.

pub mod models;
pub mod reports;
pub mod seed;
pub mod service;

pub use models::{NewStudent, Student, StudentPatch, StudentStatus};
pub use reports::{DepartmentAverage, DepartmentCount, MarksBin, RosterReport};
pub use seed::seed_students;
pub use service::RosterService;
