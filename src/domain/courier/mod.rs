pub mod model;

pub use model::{CnhType, Courier};
