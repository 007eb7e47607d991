pub mod core;
pub mod copies;
pub mod gateway;
pub mod loans;
pub mod members;
pub mod notifications;
pub mod policies;
pub mod returns;
pub mod utils;
