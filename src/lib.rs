pub mod config;
pub mod constants;
pub mod coordinator;
pub mod database;
pub mod error;
pub mod expenses;
pub mod live;
pub mod models;
pub mod preferences;
pub mod repository;
pub mod scheduler;
pub mod shell;
pub mod utils;
