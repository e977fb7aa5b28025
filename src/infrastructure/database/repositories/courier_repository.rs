//! Courier repository bound to a unit of work

use log::debug;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::domain::courier::{CnhType, Courier};
use crate::infrastructure::database::entities::courier;
use crate::infrastructure::database::unit_of_work::{
    with_conn, StagedWrite, UnitOfWork, WriteKind,
};
use crate::shared::errors::InfraError;

pub struct CourierRepository<'u> {
    uow: &'u UnitOfWork,
}

impl<'u> CourierRepository<'u> {
    pub(crate) fn new(uow: &'u UnitOfWork) -> Self {
        Self { uow }
    }

    // ── Queries ────────────────────────────────────────────────

    /// Fetches by id, soft-deleted rows included.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Courier>, InfraError> {
        let model = with_conn!(self.uow, c => courier::Entity::find_by_id(id).one(c).await)?;
        Ok(model.map(model_to_domain))
    }

    /// Lookup by tax id among active couriers.
    pub async fn find_by_cnpj(&self, cnpj: &str) -> Result<Option<Courier>, InfraError> {
        let model = with_conn!(self.uow, c => {
            courier::Entity::find()
                .filter(courier::Column::Cnpj.eq(cnpj))
                .filter(courier::Column::IsDeleted.eq(false))
                .one(c)
                .await
        })?;
        Ok(model.map(model_to_domain))
    }

    /// Lookup by license number among active couriers.
    pub async fn find_by_cnh_number(&self, cnh_number: &str) -> Result<Option<Courier>, InfraError> {
        let model = with_conn!(self.uow, c => {
            courier::Entity::find()
                .filter(courier::Column::CnhNumber.eq(cnh_number))
                .filter(courier::Column::IsDeleted.eq(false))
                .one(c)
                .await
        })?;
        Ok(model.map(model_to_domain))
    }

    pub async fn find_all(&self) -> Result<Vec<Courier>, InfraError> {
        let models = with_conn!(self.uow, c => {
            courier::Entity::find()
                .order_by_asc(courier::Column::Name)
                .all(c)
                .await
        })?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    // ── Staged mutations ───────────────────────────────────────

    pub fn add(&self, courier: &Courier) {
        debug!("Staging courier insert: {}", courier.id);
        self.uow.stage(StagedWrite::Courier(
            WriteKind::Insert,
            to_active_model(courier),
        ));
    }

    pub fn update(&self, courier: &Courier) {
        debug!("Staging courier update: {}", courier.id);
        self.uow.stage(StagedWrite::Courier(
            WriteKind::Update,
            to_active_model(courier),
        ));
    }

    /// Removal is the soft-delete toggle on the aggregate, staged as an
    /// update; rows are never physically deleted.
    pub fn delete(&self, courier: &Courier) {
        debug!("Staging courier removal: {}", courier.id);
        self.uow.stage(StagedWrite::Courier(
            WriteKind::Update,
            to_active_model(courier),
        ));
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: courier::Model) -> Courier {
    Courier {
        id: m.id,
        name: m.name,
        cnpj: m.cnpj,
        birth_date: m.birth_date,
        cnh_number: m.cnh_number,
        cnh_type: CnhType::from_str(&m.cnh_type).unwrap_or(CnhType::B),
        cnh_image_path: m.cnh_image_path,
        created_at: m.created_at,
        updated_at: m.updated_at,
        is_deleted: m.is_deleted,
    }
}

fn to_active_model(c: &Courier) -> courier::ActiveModel {
    courier::ActiveModel {
        id: Set(c.id),
        name: Set(c.name.clone()),
        cnpj: Set(c.cnpj.clone()),
        birth_date: Set(c.birth_date),
        cnh_number: Set(c.cnh_number.clone()),
        cnh_type: Set(c.cnh_type.as_str().to_string()),
        cnh_image_path: Set(c.cnh_image_path.clone()),
        created_at: Set(c.created_at),
        updated_at: Set(c.updated_at),
        is_deleted: Set(c.is_deleted),
    }
}
