//! Shared building blocks for the Courier services: configuration, database
//! pool construction, the common error type and the message task data model.

pub mod config;
pub mod db;
pub mod error;
pub mod types;
