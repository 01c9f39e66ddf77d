//! sea-orm entities for the mentorship service.

pub mod academic_records;
pub mod accounts;
pub mod mentor_assignments;
pub mod mentor_requests;
pub mod mentors;
pub mod page_contents;
pub mod programs;
pub mod registration_logs;
pub mod students;
pub mod verification_tokens;
