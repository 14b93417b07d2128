//! User registration and credential-based login.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use shiptrack_auth::jwt::JwtEncoder;
use shiptrack_auth::password::PasswordHasher;
use shiptrack_core::error::AppError;
use shiptrack_core::result::AppResult;
use shiptrack_database::repositories::user::UserRepository;
use shiptrack_entity::user::model::CreateUser;
use shiptrack_entity::User;

/// Result of a successful login or registration.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Handles registration and login.
#[derive(Debug, Clone)]
pub struct AccountService {
    user_repo: Arc<UserRepository>,
    hasher: Arc<PasswordHasher>,
    encoder: Arc<JwtEncoder>,
}

impl AccountService {
    pub fn new(
        user_repo: Arc<UserRepository>,
        hasher: Arc<PasswordHasher>,
        encoder: Arc<JwtEncoder>,
    ) -> Self {
        Self {
            user_repo,
            hasher,
            encoder,
        }
    }

    /// Registers a new user and issues an access token.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        company_name: Option<String>,
    ) -> AppResult<AuthenticatedUser> {
        if self.user_repo.find_by_username(username).await?.is_some() {
            return Err(AppError::conflict("Username is already taken"));
        }
        if self.user_repo.find_by_email(email).await?.is_some() {
            return Err(AppError::conflict("Email is already registered"));
        }

        let password_hash = self.hasher.hash_password(password)?;
        let user = self
            .user_repo
            .create(&CreateUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
                company_name,
            })
            .await?;

        let (token, expires_at) = self.encoder.generate_access_token(user.id, &user.username)?;

        info!(user_id = %user.id, username, "User registered");

        Ok(AuthenticatedUser {
            user,
            token,
            expires_at,
        })
    }

    /// Verifies credentials and issues an access token.
    ///
    /// Unknown username and wrong password return the same error so the
    /// response does not reveal which accounts exist.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<AuthenticatedUser> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::authentication("Invalid username or password"))?;

        let valid = self.hasher.verify_password(password, &user.password_hash)?;
        if !valid {
            return Err(AppError::authentication("Invalid username or password"));
        }

        let (token, expires_at) = self.encoder.generate_access_token(user.id, &user.username)?;

        info!(user_id = %user.id, "User logged in");

        Ok(AuthenticatedUser {
            user,
            token,
            expires_at,
        })
    }
}
