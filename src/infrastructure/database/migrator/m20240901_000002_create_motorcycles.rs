//! Create motorcycles table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Motorcycles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Motorcycles::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Motorcycles::Year).integer().not_null())
                    .col(ColumnDef::new(Motorcycles::Model).string_len(60).not_null())
                    .col(
                        ColumnDef::new(Motorcycles::Plate)
                            .string_len(7)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Motorcycles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Motorcycles::UpdatedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Motorcycles::IsDeleted)
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
            .drop_table(Table::drop().table(Motorcycles::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Motorcycles {
    Table,
    Id,
    Year,
    Model,
    Plate,
    CreatedAt,
    UpdatedAt,
    IsDeleted,
}
