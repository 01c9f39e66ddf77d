pub mod assignment;
pub mod content;
pub mod dashboard;
pub mod lookup;
pub mod mentor;
pub mod mentor_request;
pub mod notify;
pub mod privilege;
pub mod program;
pub mod rate_limit;
pub mod registration;
pub mod student;
