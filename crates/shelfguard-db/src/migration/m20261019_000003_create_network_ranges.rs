//! create network_ranges table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(NetworkRanges::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NetworkRanges::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(NetworkRanges::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(NetworkRanges::SubnetMask).string().not_null())
                    .col(ColumnDef::new(NetworkRanges::Description).text())
                    .col(
                        ColumnDef::new(NetworkRanges::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NetworkRanges::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum NetworkRanges {
    #[sea_orm(iden = "network_ranges")]
    Table,
    Id,
    Name,
    SubnetMask,
    Description,
    CreatedAt,
}
