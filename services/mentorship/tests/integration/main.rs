mod helpers;

mod assignment_test;
mod mentor_request_test;
mod privilege_test;
mod program_test;
mod rate_limit_test;
mod registration_test;
