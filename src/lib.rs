pub mod api;
pub mod broadcast;
pub mod clients;
pub mod config;
pub mod error;
pub mod membership;
pub mod models;
pub mod utils;
