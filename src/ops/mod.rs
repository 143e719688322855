pub mod rank;
pub mod store_service;
pub mod ticket_store;
