//! Create couriers table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Couriers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Couriers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Couriers::Name).string_len(120).not_null())
                    .col(
                        ColumnDef::new(Couriers::Cnpj)
                            .string_len(14)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Couriers::BirthDate).date().not_null())
                    .col(
                        ColumnDef::new(Couriers::CnhNumber)
                            .string_len(11)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Couriers::CnhType).string_len(2).not_null())
                    .col(ColumnDef::new(Couriers::CnhImagePath).string())
                    .col(
                        ColumnDef::new(Couriers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Couriers::UpdatedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Couriers::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Couriers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Couriers {
    Table,
    Id,
    Name,
    Cnpj,
    BirthDate,
    CnhNumber,
    CnhType,
    CnhImagePath,
    CreatedAt,
    UpdatedAt,
    IsDeleted,
}
