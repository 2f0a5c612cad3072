// src/lib.rs
// DOCUMENTATION: Library root
// PURPOSE: Expose the modules to the server, the management CLI and the integration tests

pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
