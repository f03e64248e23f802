// Infrastructure layer module
// Contains database adapters and external service integrations
// Follows Hexagonal Architecture

pub mod database;
pub mod repositories;

pub use database::DatabaseConfig;
