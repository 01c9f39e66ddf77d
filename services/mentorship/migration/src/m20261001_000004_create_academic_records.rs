use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AcademicRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AcademicRecords::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AcademicRecords::AccountId).uuid().not_null())
                    .col(
                        ColumnDef::new(AcademicRecords::Level)
                            .string_len(2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(AcademicRecords::Degree).string().not_null())
                    .col(
                        ColumnDef::new(AcademicRecords::Institution)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AcademicRecords::Year).integer().not_null())
                    .col(ColumnDef::new(AcademicRecords::Percentage).double().not_null())
                    .col(
                        ColumnDef::new(AcademicRecords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AcademicRecords::Table, AcademicRecords::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(AcademicRecords::Table)
                    .col(AcademicRecords::AccountId)
                    .name("idx_academic_records_account_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AcademicRecords::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AcademicRecords {
    Table,
    Id,
    AccountId,
    Level,
    Degree,
    Institution,
    Year,
    Percentage,
    CreatedAt,
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
}
