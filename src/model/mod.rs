pub mod config;
pub mod ticket;

pub use config::*;
pub use ticket::*;
