use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Students::AccountId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Students::FullName).string().not_null())
                    .col(ColumnDef::new(Students::Phone).string_len(20).not_null())
                    .col(ColumnDef::new(Students::City).string().not_null())
                    .col(ColumnDef::new(Students::Pincode).string_len(6).not_null())
                    .col(ColumnDef::new(Students::Dob).date().null())
                    .col(ColumnDef::new(Students::FatherName).string().not_null())
                    .col(ColumnDef::new(Students::MotherName).string().not_null())
                    .col(
                        ColumnDef::new(Students::CetTaken)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Students::Verified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Students::MentorId).uuid().null())
                    .col(
                        ColumnDef::new(Students::RegistrationSource)
                            .string()
                            .not_null()
                            .default("portal"),
                    )
                    .col(
                        ColumnDef::new(Students::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Students::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Students::Table, Students::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Students::Table, Students::MentorId)
                            .to(Mentors::Table, Mentors::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Students::Table)
                    .col(Students::MentorId)
                    .name("idx_students_mentor_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Students {
    Table,
    AccountId,
    FullName,
    Phone,
    City,
    Pincode,
    Dob,
    FatherName,
    MotherName,
    CetTaken,
    Verified,
    MentorId,
    RegistrationSource,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
}

#[derive(Iden)]
enum Mentors {
    Table,
    Id,
}
