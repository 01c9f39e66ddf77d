use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Programs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Programs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Programs::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Programs::Description).text().not_null())
                    .col(ColumnDef::new(Programs::VideoUrl).string().null())
                    .col(ColumnDef::new(Programs::ImageUrl).string().null())
                    .col(ColumnDef::new(Programs::BrochureUrl).string().null())
                    .col(
                        ColumnDef::new(Programs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Programs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_programs_created_at")
                    .table(Programs::Table)
                    .col(Programs::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Programs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Programs {
    Table,
    Id,
    Name,
    Description,
    VideoUrl,
    ImageUrl,
    BrochureUrl,
    CreatedAt,
    UpdatedAt,
}
