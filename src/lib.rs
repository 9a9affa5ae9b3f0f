pub mod auth;
pub mod collectors;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod models;
pub mod store;

pub use error::{HarvestError, Result};
