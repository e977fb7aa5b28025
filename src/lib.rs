//! # Moto Rental Core
//!
//! Transactional core of a motorcycle rental operation for delivery
//! couriers: couriers, motorcycles and rentals are managed through
//! per-operation units of work, business outcomes are reported as
//! notifications instead of errors, and rental pricing handles early and
//! late returns.
//!
//! ## Architecture
//!
//! - **domain**: aggregates, the pricing engine and domain events
//! - **application**: domain services, notification aggregator, input
//!   payloads and the outbound event port
//! - **infrastructure**: SeaORM persistence, migrations, the unit of work
//!   and the image-store port
//! - **shared**: error types and field validators
//!
//! The HTTP surface, broker client and cache are external collaborators;
//! this crate exposes the services they sit on top of.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export the per-operation collaborators
pub use application::notification::{Notification, NotificationKind, Notifier};
pub use infrastructure::database::UnitOfWork;

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig};

// Re-export the services and the event port
pub use application::events::{create_event_bus, EventBus, MessagePublisher, SharedPublisher};
pub use application::services::{CourierService, MotorcycleService, RentalService};
