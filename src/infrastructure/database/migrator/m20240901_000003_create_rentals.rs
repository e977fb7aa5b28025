//! Create rentals table

use sea_orm_migration::prelude::*;

use super::m20240901_000001_create_couriers::Couriers;
use super::m20240901_000002_create_motorcycles::Motorcycles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Rentals::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Rentals::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Rentals::CourierId).uuid().not_null())
                    .col(ColumnDef::new(Rentals::MotorcycleId).uuid().not_null())
                    .col(
                        ColumnDef::new(Rentals::StartDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Rentals::EndDate).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Rentals::ExpectedEndDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Rentals::DailyRate)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Rentals::PlanDays).integer().not_null())
                    .col(
                        ColumnDef::new(Rentals::TotalCost)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Rentals::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Rentals::UpdatedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Rentals::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rentals_courier")
                            .from(Rentals::Table, Rentals::CourierId)
                            .to(Couriers::Table, Couriers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rentals_motorcycle")
                            .from(Rentals::Table, Rentals::MotorcycleId)
                            .to(Motorcycles::Table, Motorcycles::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Index for querying a motorcycle's rentals
        manager
            .create_index(
                Index::create()
                    .name("idx_rentals_motorcycle")
                    .table(Rentals::Table)
                    .col(Rentals::MotorcycleId)
                    .to_owned(),
            )
            .await?;

        // Index for querying a courier's rentals
        manager
            .create_index(
                Index::create()
                    .name("idx_rentals_courier")
                    .table(Rentals::Table)
                    .col(Rentals::CourierId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Rentals::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Rentals {
    Table,
    Id,
    CourierId,
    MotorcycleId,
    StartDate,
    EndDate,
    ExpectedEndDate,
    DailyRate,
    PlanDays,
    TotalCost,
    CreatedAt,
    UpdatedAt,
    IsDeleted,
}
