use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(portal_mentorship_migration::Migrator).await;
}
