//! Motorcycle repository bound to a unit of work

use log::debug;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::domain::motorcycle::Motorcycle;
use crate::infrastructure::database::entities::motorcycle;
use crate::infrastructure::database::unit_of_work::{
    with_conn, StagedWrite, UnitOfWork, WriteKind,
};
use crate::shared::errors::InfraError;

pub struct MotorcycleRepository<'u> {
    uow: &'u UnitOfWork,
}

impl<'u> MotorcycleRepository<'u> {
    pub(crate) fn new(uow: &'u UnitOfWork) -> Self {
        Self { uow }
    }

    // ── Queries ────────────────────────────────────────────────

    /// Fetches by id, soft-deleted rows included.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Motorcycle>, InfraError> {
        let model = with_conn!(self.uow, c => motorcycle::Entity::find_by_id(id).one(c).await)?;
        Ok(model.map(model_to_domain))
    }

    /// Lookup by canonical plate among active motorcycles.
    pub async fn find_by_plate(&self, plate: &str) -> Result<Option<Motorcycle>, InfraError> {
        let model = with_conn!(self.uow, c => {
            motorcycle::Entity::find()
                .filter(motorcycle::Column::Plate.eq(plate))
                .filter(motorcycle::Column::IsDeleted.eq(false))
                .one(c)
                .await
        })?;
        Ok(model.map(model_to_domain))
    }

    pub async fn find_all(&self) -> Result<Vec<Motorcycle>, InfraError> {
        let models = with_conn!(self.uow, c => {
            motorcycle::Entity::find()
                .order_by_asc(motorcycle::Column::Plate)
                .all(c)
                .await
        })?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    // ── Staged mutations ───────────────────────────────────────

    pub fn add(&self, motorcycle: &Motorcycle) {
        debug!("Staging motorcycle insert: {}", motorcycle.id);
        self.uow.stage(StagedWrite::Motorcycle(
            WriteKind::Insert,
            to_active_model(motorcycle),
        ));
    }

    pub fn update(&self, motorcycle: &Motorcycle) {
        debug!("Staging motorcycle update: {}", motorcycle.id);
        self.uow.stage(StagedWrite::Motorcycle(
            WriteKind::Update,
            to_active_model(motorcycle),
        ));
    }

    /// Removal is the soft-delete toggle on the aggregate, staged as an
    /// update; rows are never physically deleted.
    pub fn delete(&self, motorcycle: &Motorcycle) {
        debug!("Staging motorcycle removal: {}", motorcycle.id);
        self.uow.stage(StagedWrite::Motorcycle(
            WriteKind::Update,
            to_active_model(motorcycle),
        ));
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: motorcycle::Model) -> Motorcycle {
    Motorcycle {
        id: m.id,
        year: m.year,
        model: m.model,
        plate: m.plate,
        created_at: m.created_at,
        updated_at: m.updated_at,
        is_deleted: m.is_deleted,
    }
}

fn to_active_model(m: &Motorcycle) -> motorcycle::ActiveModel {
    motorcycle::ActiveModel {
        id: Set(m.id),
        year: Set(m.year),
        model: Set(m.model.clone()),
        plate: Set(m.plate.clone()),
        created_at: Set(m.created_at),
        updated_at: Set(m.updated_at),
        is_deleted: Set(m.is_deleted),
    }
}
