pub mod types;

pub use types::{
    CourierRegisteredEvent, DomainEvent, MotorcycleRegisteredEvent, RentalClosedEvent,
    RentalOpenedEvent,
};
