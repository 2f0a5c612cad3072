// src/services/auth_service.rs
// DOCUMENTATION: Account registration, login and bearer-token checks
// PURPOSE: Keep password hashing and token handling out of the handlers

use crate::db::UserRepository;
use crate::errors::PhotoError;
use crate::models::{LoginRequest, LoginResponse, RegisterRequest, User, UserResponse};
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

/// New random bearer token (256 bits, hex)
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Usernames are unique and matched without regard to case
pub fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Only the SHA-256 of a token is stored
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Extract the token from an `Authorization: Bearer <token>` value
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

pub(crate) async fn hash_password(password: String, cost: u32) -> Result<String, PhotoError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| {
            log::error!("Password hashing task failed: {}", e);
            PhotoError::InternalError
        })?
        .map_err(|e| {
            log::error!("Password hashing failed: {}", e);
            PhotoError::InternalError
        })
}

async fn verify_password(password: String, hash: String) -> Result<bool, PhotoError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| {
            log::error!("Password verify task failed: {}", e);
            PhotoError::InternalError
        })?
        .or_else(|e| {
            // A malformed stored hash can never match
            log::warn!("Password verify error: {}", e);
            Ok(false)
        })
}

pub struct AuthService;

impl AuthService {
    /// Create an account; username and email must be unused
    pub async fn register(
        pool: &SqlitePool,
        bcrypt_cost: u32,
        req: RegisterRequest,
    ) -> Result<UserResponse, PhotoError> {
        let username = normalize_username(&req.username);
        let email = req.email.trim().to_lowercase();

        if UserRepository::exists(pool, &username, &email).await? {
            return Err(PhotoError::AlreadyExists(format!(
                "username or email already registered: {}",
                username
            )));
        }

        let password_hash = hash_password(req.password, bcrypt_cost).await?;
        let user = UserRepository::create_user(pool, &username, &email, &password_hash).await?;
        Ok(user.to_response())
    }

    /// Check credentials and issue a fresh token, replacing any previous one
    pub async fn login(pool: &SqlitePool, req: LoginRequest) -> Result<LoginResponse, PhotoError> {
        let username = normalize_username(&req.username);
        let user = match UserRepository::find_by_username(pool, &username).await? {
            Some(user) => user,
            None => {
                log::warn!("Login for unknown user {}", req.username);
                return Err(PhotoError::Unauthorized);
            }
        };

        if !verify_password(req.password, user.password_hash.clone()).await? {
            log::warn!("Login with wrong password for {}", user.username);
            return Err(PhotoError::Unauthorized);
        }

        let token = generate_token();
        UserRepository::set_token_hash(pool, user.id, Some(&hash_token(&token))).await?;

        log::info!("User {} logged in", user.username);
        Ok(LoginResponse {
            token,
            user: user.to_response(),
        })
    }

    pub async fn logout(pool: &SqlitePool, user: &User) -> Result<(), PhotoError> {
        UserRepository::set_token_hash(pool, user.id, None).await?;
        log::info!("User {} logged out", user.username);
        Ok(())
    }

    /// Resolve the Authorization header to a user
    pub async fn authenticate(
        pool: &SqlitePool,
        authorization: Option<&str>,
    ) -> Result<User, PhotoError> {
        let token = authorization.and_then(bearer_token).ok_or_else(|| {
            log::debug!("Request without bearer token");
            PhotoError::Unauthorized
        })?;

        UserRepository::find_by_token_hash(pool, &hash_token(token))
            .await?
            .ok_or_else(|| {
                log::warn!("Request with unknown token");
                PhotoError::Unauthorized
            })
    }
}
