//! create licenses table migration.

use sea_orm_migration::prelude::*;

use super::m20261019_000001_create_license_types::LicenseTypes;
use super::m20261019_000002_create_users::Users;
use super::m20261019_000003_create_network_ranges::NetworkRanges;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Licenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Licenses::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Licenses::LicenseTypeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Licenses::UserId).big_integer())
                    .col(ColumnDef::new(Licenses::NetworkRangeId).big_integer())
                    .col(ColumnDef::new(Licenses::Privileges).text())
                    .col(ColumnDef::new(Licenses::Conditions).text())
                    .col(ColumnDef::new(Licenses::ValidFrom).timestamp_with_time_zone())
                    .col(ColumnDef::new(Licenses::ValidUntil).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Licenses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_licenses_license_type")
                            .from(Licenses::Table, Licenses::LicenseTypeId)
                            .to(LicenseTypes::Table, LicenseTypes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_licenses_user")
                            .from(Licenses::Table, Licenses::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_licenses_network_range")
                            .from(Licenses::Table, Licenses::NetworkRangeId)
                            .to(NetworkRanges::Table, NetworkRanges::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_licenses_user_id")
                    .table(Licenses::Table)
                    .col(Licenses::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_licenses_network_range_id")
                    .table(Licenses::Table)
                    .col(Licenses::NetworkRangeId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Licenses::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Licenses {
    Table,
    Id,
    LicenseTypeId,
    UserId,
    NetworkRangeId,
    Privileges,
    Conditions,
    ValidFrom,
    ValidUntil,
    CreatedAt,
}
