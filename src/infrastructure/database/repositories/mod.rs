pub mod courier_repository;
pub mod motorcycle_repository;
pub mod rental_repository;

pub use courier_repository::CourierRepository;
pub use motorcycle_repository::MotorcycleRepository;
pub use rental_repository::RentalRepository;
