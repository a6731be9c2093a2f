pub mod app;
pub mod balance;
pub mod clock;
pub mod config;
pub mod duration;
pub mod error;
pub mod format;
pub mod models;
pub mod price;
pub mod registry;
pub mod single_flight;
pub mod valuation;
pub mod wallet;
