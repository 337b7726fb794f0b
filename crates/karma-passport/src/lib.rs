pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod karma;
pub mod loans;
pub mod session;
pub mod tasks;
pub mod telemetry;
