pub mod attendance;
pub mod identity;
pub mod payroll;
pub mod role;
pub mod task;
pub mod user;
