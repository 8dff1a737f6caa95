pub mod approval;
pub mod attendance;
pub mod employee;
pub mod leave_request;
pub mod pams;
pub mod payroll;
pub mod policy_document;
pub mod profile_update;
pub mod promotion;
pub mod provident_fund;
pub mod resignation;
pub mod role;
pub mod user;
