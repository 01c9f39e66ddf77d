use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MentorRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MentorRequests::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MentorRequests::StudentId).uuid().not_null())
                    .col(
                        ColumnDef::new(MentorRequests::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(MentorRequests::Message)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(MentorRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(MentorRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(MentorRequests::Table, MentorRequests::StudentId)
                            .to(Students::Table, Students::AccountId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // sea-query's index builder has no WHERE clause for Postgres partial
        // indexes.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS ux_mentor_requests_pending \
                 ON mentor_requests (student_id) WHERE status = 'pending'",
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(MentorRequests::Table)
                    .col(MentorRequests::Status)
                    .col(MentorRequests::CreatedAt)
                    .name("idx_mentor_requests_status_created_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MentorRequests::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MentorRequests {
    Table,
    Id,
    StudentId,
    Status,
    Message,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Students {
    Table,
    AccountId,
}
