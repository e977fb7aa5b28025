//! Rental repository bound to a unit of work

use chrono::{DateTime, Utc};
use log::debug;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::domain::rental::{Rental, RentalPlan};
use crate::infrastructure::database::entities::rental;
use crate::infrastructure::database::unit_of_work::{
    with_conn, StagedWrite, UnitOfWork, WriteKind,
};
use crate::shared::errors::InfraError;

pub struct RentalRepository<'u> {
    uow: &'u UnitOfWork,
}

impl<'u> RentalRepository<'u> {
    pub(crate) fn new(uow: &'u UnitOfWork) -> Self {
        Self { uow }
    }

    // ── Queries ────────────────────────────────────────────────

    /// Fetches by id, soft-deleted rows included.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Rental>, InfraError> {
        let model = with_conn!(self.uow, c => rental::Entity::find_by_id(id).one(c).await)?;
        Ok(model.map(model_to_domain))
    }

    pub async fn find_all(&self) -> Result<Vec<Rental>, InfraError> {
        let models = with_conn!(self.uow, c => {
            rental::Entity::find()
                .order_by_desc(rental::Column::StartDate)
                .all(c)
                .await
        })?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    pub async fn find_by_courier(&self, courier_id: Uuid) -> Result<Vec<Rental>, InfraError> {
        let models = with_conn!(self.uow, c => {
            rental::Entity::find()
                .filter(rental::Column::CourierId.eq(courier_id))
                .order_by_desc(rental::Column::StartDate)
                .all(c)
                .await
        })?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    pub async fn find_by_motorcycle(&self, motorcycle_id: Uuid) -> Result<Vec<Rental>, InfraError> {
        let models = with_conn!(self.uow, c => {
            rental::Entity::find()
                .filter(rental::Column::MotorcycleId.eq(motorcycle_id))
                .order_by_desc(rental::Column::StartDate)
                .all(c)
                .await
        })?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    /// The rental currently holding the motorcycle, if any.
    pub async fn find_open_by_motorcycle(
        &self,
        motorcycle_id: Uuid,
    ) -> Result<Option<Rental>, InfraError> {
        let model = with_conn!(self.uow, c => {
            rental::Entity::find()
                .filter(rental::Column::MotorcycleId.eq(motorcycle_id))
                .filter(rental::Column::EndDate.is_null())
                .filter(rental::Column::IsDeleted.eq(false))
                .one(c)
                .await
        })?;
        Ok(model.map(model_to_domain))
    }

    pub async fn find_started_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Rental>, InfraError> {
        let models = with_conn!(self.uow, c => {
            rental::Entity::find()
                .filter(rental::Column::StartDate.between(from, to))
                .order_by_asc(rental::Column::StartDate)
                .all(c)
                .await
        })?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    pub async fn find_with_total_between(
        &self,
        min: Decimal,
        max: Decimal,
    ) -> Result<Vec<Rental>, InfraError> {
        let models = with_conn!(self.uow, c => {
            rental::Entity::find()
                .filter(rental::Column::TotalCost.between(min, max))
                .order_by_asc(rental::Column::TotalCost)
                .all(c)
                .await
        })?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    // ── Staged mutations ───────────────────────────────────────

    pub fn add(&self, rental: &Rental) {
        debug!("Staging rental insert: {}", rental.id);
        self.uow.stage(StagedWrite::Rental(
            WriteKind::Insert,
            to_active_model(rental),
        ));
    }

    pub fn update(&self, rental: &Rental) {
        debug!("Staging rental update: {}", rental.id);
        self.uow.stage(StagedWrite::Rental(
            WriteKind::Update,
            to_active_model(rental),
        ));
    }

    /// Removal is the soft-delete toggle on the aggregate, staged as an
    /// update; rows are never physically deleted.
    pub fn delete(&self, rental: &Rental) {
        debug!("Staging rental removal: {}", rental.id);
        self.uow.stage(StagedWrite::Rental(
            WriteKind::Update,
            to_active_model(rental),
        ));
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: rental::Model) -> Rental {
    Rental {
        id: m.id,
        courier_id: m.courier_id,
        motorcycle_id: m.motorcycle_id,
        start_date: m.start_date,
        end_date: m.end_date,
        expected_end_date: m.expected_end_date,
        daily_rate: m.daily_rate,
        plan: RentalPlan::from_days(m.plan_days).unwrap_or(RentalPlan::Days7),
        total_cost: m.total_cost,
        created_at: m.created_at,
        updated_at: m.updated_at,
        is_deleted: m.is_deleted,
    }
}

fn to_active_model(r: &Rental) -> rental::ActiveModel {
    rental::ActiveModel {
        id: Set(r.id),
        courier_id: Set(r.courier_id),
        motorcycle_id: Set(r.motorcycle_id),
        start_date: Set(r.start_date),
        end_date: Set(r.end_date),
        expected_end_date: Set(r.expected_end_date),
        daily_rate: Set(r.daily_rate),
        plan_days: Set(r.plan.days() as i32),
        total_cost: Set(r.total_cost),
        created_at: Set(r.created_at),
        updated_at: Set(r.updated_at),
        is_deleted: Set(r.is_deleted),
    }
}
