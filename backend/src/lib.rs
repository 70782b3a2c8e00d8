pub mod api_client;
pub mod classifier;
pub mod config;
pub mod error;
pub mod indicators;
pub mod indices;
pub mod models;
pub mod routes;
pub mod series;
pub mod services;
pub mod state;
