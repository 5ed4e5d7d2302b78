// Library exports for Agora
// This allows integration tests and the binary to share modules

pub mod accounts;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod posts;
pub mod routes;
pub mod state;
