pub mod courier;
pub mod motorcycle;
pub mod rental;
