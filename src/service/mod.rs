pub mod error;
pub mod ticket_service;
