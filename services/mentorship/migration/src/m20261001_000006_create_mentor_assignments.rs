use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // No foreign key on mentor_id: audit rows outlive their mentor.
        manager
            .create_table(
                Table::create()
                    .table(MentorAssignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MentorAssignments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MentorAssignments::StudentId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MentorAssignments::MentorId).uuid().not_null())
                    .col(
                        ColumnDef::new(MentorAssignments::MentorName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MentorAssignments::AssignedBy)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MentorAssignments::AssignedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(MentorAssignments::Table, MentorAssignments::StudentId)
                            .to(Students::Table, Students::AccountId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(MentorAssignments::Table)
                    .col(MentorAssignments::StudentId)
                    .col(MentorAssignments::AssignedAt)
                    .name("idx_mentor_assignments_student_assigned_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MentorAssignments::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MentorAssignments {
    Table,
    Id,
    StudentId,
    MentorId,
    MentorName,
    AssignedBy,
    AssignedAt,
}

#[derive(Iden)]
enum Students {
    Table,
    AccountId,
}
