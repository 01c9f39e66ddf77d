use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RegistrationLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RegistrationLogs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RegistrationLogs::AccountId).uuid().null())
                    .col(ColumnDef::new(RegistrationLogs::Ip).string_len(45).null())
                    .col(
                        ColumnDef::new(RegistrationLogs::Status)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RegistrationLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RegistrationLogs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum RegistrationLogs {
    Table,
    Id,
    AccountId,
    Ip,
    Status,
    CreatedAt,
}
