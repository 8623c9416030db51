pub mod attendance;
pub mod dashboard;
pub mod payroll;
pub mod tasks;
