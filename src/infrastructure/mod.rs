pub mod database;
pub mod storage;

pub use database::{init_database, DatabaseConfig, UnitOfWork};
pub use storage::{CnhImageStore, InMemoryImageStore};
