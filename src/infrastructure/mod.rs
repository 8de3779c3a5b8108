// Infrastructure layer module
// Database adapters, the in-memory store and the query cache
// Follows Hexagonal Architecture

pub mod cache;
pub mod database;
pub mod repositories;
