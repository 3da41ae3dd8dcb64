pub mod config;
pub mod datasources;
pub mod error;
pub mod logic;
pub mod models;
pub mod report;

pub use error::{Result, YieldcastError};
pub use logic::{calculate_yield_forecast, YieldForecaster};
