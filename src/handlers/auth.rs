// src/handlers/auth.rs
// DOCUMENTATION: Account handlers
// PURPOSE: Register, login and logout; bearer-token lookup for protected routes

use crate::config::Config;
use crate::errors::PhotoError;
use crate::models::{LoginRequest, RegisterRequest, User};
use crate::services::AuthService;
use actix_web::{http::header, web, HttpRequest, HttpResponse, Responder};
use sqlx::SqlitePool;
use validator::Validate;

/// Resolve the caller from the `Authorization: Bearer` header
/// Missing or unknown tokens are rejected with 401
pub async fn authenticated_user(req: &HttpRequest, pool: &SqlitePool) -> Result<User, PhotoError> {
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    AuthService::authenticate(pool, authorization).await
}

/// POST /auth/register
pub async fn register(
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    req: web::Json<RegisterRequest>,
) -> Result<impl Responder, PhotoError> {
    if let Err(e) = req.validate() {
        return Err(PhotoError::ValidationError(e.to_string()));
    }

    let user = AuthService::register(pool.get_ref(), config.bcrypt_cost, req.into_inner()).await?;
    log::info!("Registered user {}", user.username);
    Ok(HttpResponse::Created().json(user))
}

/// POST /auth/login
/// Issues a new bearer token, replacing the previous one
pub async fn login(
    pool: web::Data<SqlitePool>,
    req: web::Json<LoginRequest>,
) -> Result<impl Responder, PhotoError> {
    if let Err(e) = req.validate() {
        return Err(PhotoError::ValidationError(e.to_string()));
    }

    let login = AuthService::login(pool.get_ref(), req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(login))
}

/// POST /auth/logout
pub async fn logout(
    pool: web::Data<SqlitePool>,
    req: HttpRequest,
) -> Result<impl Responder, PhotoError> {
    let user = authenticated_user(&req, pool.get_ref()).await?;
    AuthService::logout(pool.get_ref(), &user).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout)),
    );
}
