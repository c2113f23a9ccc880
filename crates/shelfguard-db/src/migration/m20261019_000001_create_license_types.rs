//! create license_types table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LicenseTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LicenseTypes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LicenseTypes::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(LicenseTypes::Description).text())
                    .col(ColumnDef::new(LicenseTypes::Privileges).text())
                    .col(
                        ColumnDef::new(LicenseTypes::OpenAccess)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(LicenseTypes::Conditions).text())
                    .col(ColumnDef::new(LicenseTypes::Overrides).text())
                    .col(
                        ColumnDef::new(LicenseTypes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LicenseTypes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LicenseTypes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum LicenseTypes {
    #[sea_orm(iden = "license_types")]
    Table,
    Id,
    Name,
    Description,
    Privileges,
    OpenAccess,
    Conditions,
    Overrides,
    CreatedAt,
    UpdatedAt,
}
