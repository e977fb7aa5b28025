pub mod courier;
pub mod events;
pub mod motorcycle;
pub mod rental;

// Re-export commonly used types
pub use courier::{CnhType, Courier};
pub use events::DomainEvent;
pub use motorcycle::Motorcycle;
pub use rental::{Rental, RentalPlan};
