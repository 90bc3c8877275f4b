pub mod api_types;
pub mod audit;
pub mod auth;
pub mod config;
pub mod db;
pub mod engine;
pub mod errors;
pub mod handlers;
pub mod models;
