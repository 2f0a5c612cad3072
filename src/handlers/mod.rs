// src/handlers/mod.rs
// DOCUMENTATION: Handlers module organization
// PURPOSE: Re-export handler components

pub mod auth;
pub mod comments;
pub mod health;
pub mod photos;
pub mod tags;
pub mod users;

pub use auth::config as auth_config;
pub use comments::config as comments_config;
pub use health::config as health_config;
pub use photos::config as photos_config;
pub use tags::config as tags_config;
pub use users::config as users_config;

use crate::errors::PhotoError;
use actix_web::web;

/// Every route of the service; shared by the server and the integration tests
/// Malformed JSON bodies and query strings answer with the usual error body
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| PhotoError::ValidationError(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| PhotoError::ValidationError(err.to_string()).into()),
    );

    health_config(cfg);
    auth_config(cfg);
    users_config(cfg);
    photos_config(cfg);
    comments_config(cfg);
    tags_config(cfg);
}
