pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_accounts;
mod m20261001_000002_create_mentors;
mod m20261001_000003_create_students;
mod m20261001_000004_create_academic_records;
mod m20261001_000005_create_mentor_requests;
mod m20261001_000006_create_mentor_assignments;
mod m20261001_000007_create_verification_tokens;
mod m20261001_000008_create_registration_logs;
mod m20261001_000009_create_page_contents;
mod m20261001_000010_create_programs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_accounts::Migration),
            Box::new(m20261001_000002_create_mentors::Migration),
            Box::new(m20261001_000003_create_students::Migration),
            Box::new(m20261001_000004_create_academic_records::Migration),
            Box::new(m20261001_000005_create_mentor_requests::Migration),
            Box::new(m20261001_000006_create_mentor_assignments::Migration),
            Box::new(m20261001_000007_create_verification_tokens::Migration),
            Box::new(m20261001_000008_create_registration_logs::Migration),
            Box::new(m20261001_000009_create_page_contents::Migration),
            Box::new(m20261001_000010_create_programs::Migration),
        ]
    }
}
