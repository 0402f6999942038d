pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod errors;
pub mod geocoding;
pub mod handlers;
pub mod models;
pub mod search;
pub mod validation;

pub use db::create_pool;
