// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod annotation;
pub mod auth_service;
pub mod comment_service;
pub mod photo_service;
pub mod seed;
pub mod storage;
pub mod user_service;
pub mod vision_client;

pub use annotation::*;
pub use auth_service::AuthService;
pub use comment_service::*;
pub use photo_service::*;
pub use seed::*;
pub use storage::*;
pub use user_service::*;
pub use vision_client::*;
