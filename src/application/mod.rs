pub mod dto;
pub mod events;
pub mod notification;
pub mod services;
