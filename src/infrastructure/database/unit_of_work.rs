//! Unit of work over one SeaORM session.
//!
//! A `UnitOfWork` is created per logical operation and owns that operation's
//! transaction lifecycle: `NotStarted -> Open -> {Committed | RolledBack}`,
//! the two final states being terminal. Mutations requested through the
//! repository accessors are staged in memory and only executed by `save()`,
//! inside the open transaction, so nothing becomes visible before
//! `commit_transaction()`. Dropping the unit of work with a transaction
//! still open rolls it back.

use std::sync::Mutex;

use log::debug;
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, QueryFilter,
    TransactionTrait,
};

use super::entities::{courier, motorcycle, rental};
use super::repositories::{CourierRepository, MotorcycleRepository, RentalRepository};
use crate::shared::errors::InfraError;

/// Transaction lifecycle of one unit of work
enum TxnState {
    NotStarted,
    Open(DatabaseTransaction),
    Committed,
    RolledBack,
}

/// Connection a repository call should run on
pub(crate) enum UowConn<'a> {
    Pool(&'a DatabaseConnection),
    Txn(&'a DatabaseTransaction),
}

/// Runs a query expression against whichever connection the unit of work
/// currently exposes.
macro_rules! with_conn {
    ($uow:expr, $conn:ident => $query:expr) => {
        match $uow.conn() {
            $crate::infrastructure::database::unit_of_work::UowConn::Pool($conn) => $query,
            $crate::infrastructure::database::unit_of_work::UowConn::Txn($conn) => $query,
        }
    };
}
pub(crate) use with_conn;

/// Kind of a staged mutation
pub(crate) enum WriteKind {
    Insert,
    Update,
}

/// A mutation buffered until `save()`
pub(crate) enum StagedWrite {
    Courier(WriteKind, courier::ActiveModel),
    Motorcycle(WriteKind, motorcycle::ActiveModel),
    Rental(WriteKind, rental::ActiveModel),
}

/// Coordinates repositories and the transaction of one logical operation.
pub struct UnitOfWork {
    db: DatabaseConnection,
    state: TxnState,
    staged: Mutex<Vec<StagedWrite>>,
}

impl UnitOfWork {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            state: TxnState::NotStarted,
            staged: Mutex::new(Vec::new()),
        }
    }

    // ── Repositories ───────────────────────────────────────────

    pub fn couriers(&self) -> CourierRepository<'_> {
        CourierRepository::new(self)
    }

    pub fn motorcycles(&self) -> MotorcycleRepository<'_> {
        MotorcycleRepository::new(self)
    }

    pub fn rentals(&self) -> RentalRepository<'_> {
        RentalRepository::new(self)
    }

    // ── Transaction lifecycle ──────────────────────────────────

    /// Opens the transaction; calling again while open is a no-op.
    pub async fn begin_transaction(&mut self) -> Result<(), InfraError> {
        match &self.state {
            TxnState::Open(_) => return Ok(()),
            TxnState::Committed | TxnState::RolledBack => {
                return Err(InfraError::TransactionClosed)
            }
            TxnState::NotStarted => {}
        }
        let txn = self.db.begin().await?;
        self.state = TxnState::Open(txn);
        debug!("Transaction opened");
        Ok(())
    }

    /// Executes every staged write inside the open transaction and reports
    /// the total number of affected rows. Zero means nothing changed, which
    /// the services treat as a failure.
    pub async fn save(&mut self) -> Result<u64, InfraError> {
        let txn = match &self.state {
            TxnState::Open(txn) => txn,
            _ => return Err(InfraError::NoTransaction),
        };

        let staged: Vec<StagedWrite> = self.lock_staged().drain(..).collect();
        let mut affected = 0u64;
        for write in staged {
            affected += match write {
                StagedWrite::Courier(WriteKind::Insert, model) => {
                    courier::Entity::insert(model).exec(txn).await?;
                    1
                }
                StagedWrite::Courier(WriteKind::Update, model) => {
                    update_courier(txn, model).await?
                }
                StagedWrite::Motorcycle(WriteKind::Insert, model) => {
                    motorcycle::Entity::insert(model).exec(txn).await?;
                    1
                }
                StagedWrite::Motorcycle(WriteKind::Update, model) => {
                    update_motorcycle(txn, model).await?
                }
                StagedWrite::Rental(WriteKind::Insert, model) => {
                    rental::Entity::insert(model).exec(txn).await?;
                    1
                }
                StagedWrite::Rental(WriteKind::Update, model) => update_rental(txn, model).await?,
            };
        }
        debug!("Unit of work saved, {} rows affected", affected);
        Ok(affected)
    }

    /// Commits the open transaction.
    ///
    /// A failed commit drops the underlying connection, which rolls the
    /// transaction back; the error is propagated because the transactional
    /// guarantee is gone.
    pub async fn commit_transaction(&mut self) -> Result<(), InfraError> {
        let txn = match std::mem::replace(&mut self.state, TxnState::Committed) {
            TxnState::Open(txn) => txn,
            other => {
                self.state = other;
                return Err(InfraError::NoTransaction);
            }
        };
        match txn.commit().await {
            Ok(()) => {
                debug!("Transaction committed");
                Ok(())
            }
            Err(err) => {
                self.state = TxnState::RolledBack;
                Err(err.into())
            }
        }
    }

    /// Rolls back and discards staged writes; a no-op when nothing is open.
    pub async fn rollback_transaction(&mut self) -> Result<(), InfraError> {
        self.lock_staged().clear();
        let txn = match std::mem::replace(&mut self.state, TxnState::RolledBack) {
            TxnState::Open(txn) => txn,
            other => {
                self.state = other;
                return Ok(());
            }
        };
        txn.rollback().await?;
        debug!("Transaction rolled back");
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, TxnState::Open(_))
    }

    pub fn is_committed(&self) -> bool {
        matches!(self.state, TxnState::Committed)
    }

    // ── Internals shared with the repositories ─────────────────

    pub(crate) fn conn(&self) -> UowConn<'_> {
        match &self.state {
            TxnState::Open(txn) => UowConn::Txn(txn),
            _ => UowConn::Pool(&self.db),
        }
    }

    pub(crate) fn stage(&self, write: StagedWrite) {
        self.lock_staged().push(write);
    }

    fn lock_staged(&self) -> std::sync::MutexGuard<'_, Vec<StagedWrite>> {
        self.staged.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ── Staged update execution ─────────────────────────────────────
//
// Updates filter by id instead of using `ActiveModelTrait::update` so a
// missing row reports zero affected rows rather than erroring.

async fn update_courier(
    txn: &DatabaseTransaction,
    model: courier::ActiveModel,
) -> Result<u64, InfraError> {
    let id = match &model.id {
        ActiveValue::Set(id) | ActiveValue::Unchanged(id) => *id,
        ActiveValue::NotSet => return Ok(0),
    };
    let result = courier::Entity::update_many()
        .set(model)
        .filter(courier::Column::Id.eq(id))
        .exec(txn)
        .await?;
    Ok(result.rows_affected)
}

async fn update_motorcycle(
    txn: &DatabaseTransaction,
    model: motorcycle::ActiveModel,
) -> Result<u64, InfraError> {
    let id = match &model.id {
        ActiveValue::Set(id) | ActiveValue::Unchanged(id) => *id,
        ActiveValue::NotSet => return Ok(0),
    };
    let result = motorcycle::Entity::update_many()
        .set(model)
        .filter(motorcycle::Column::Id.eq(id))
        .exec(txn)
        .await?;
    Ok(result.rows_affected)
}

async fn update_rental(
    txn: &DatabaseTransaction,
    model: rental::ActiveModel,
) -> Result<u64, InfraError> {
    let id = match &model.id {
        ActiveValue::Set(id) | ActiveValue::Unchanged(id) => *id,
        ActiveValue::NotSet => return Ok(0),
    };
    let result = rental::Entity::update_many()
        .set(model)
        .filter(rental::Column::Id.eq(id))
        .exec(txn)
        .await?;
    Ok(result.rows_affected)
}

// ── Tests ──────────────────────────────────────────────────────
