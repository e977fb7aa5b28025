pub mod model;

pub use model::Motorcycle;
