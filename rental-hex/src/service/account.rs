//! Registration, login sessions and caller resolution.

use std::sync::Arc;

use rental_repo::security::{generate_token, hash_password, hash_token, verify_password};
use rental_types::{
    AppError, Caller, DomainError, LoginRequest, LoginResponse, NewUser, RegisterUserRequest,
    User, UserRepository, normalize_username,
};

use super::reject;

/// Application service for user accounts.
pub struct AccountService<R: UserRepository> {
    repo: Arc<R>,
}

impl<R: UserRepository> AccountService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    #[tracing::instrument(skip(self, req), fields(username = %req.username))]
    pub async fn register(&self, req: RegisterUserRequest) -> Result<User, AppError> {
        req.validate()?;

        let password_hash = hash_password(&req.password).map_err(|e| {
            tracing::error!("Password hashing failed: {}", e);
            AppError::Internal(e.to_string())
        })?;

        let user = self
            .repo
            .create_user(NewUser {
                username: normalize_username(&req.username).to_string(),
                email: req.email,
                password_hash,
                phone: req.phone,
            })
            .await
            .map_err(|e| reject("register", e))?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Checks the password and opens a session. The raw token is returned
    /// once; only its hash is stored.
    #[tracing::instrument(skip(self, req), fields(username = %req.username))]
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AppError> {
        let user = self
            .repo
            .find_user_by_username(normalize_username(&req.username))
            .await
            .map_err(|e| reject("login", e))?;

        let user = match user {
            Some(user) if verify_password(&req.password, &user.password_hash) => user,
            _ => {
                tracing::warn!("Login rejected");
                return Err(DomainError::InvalidCredentials.into());
            }
        };

        let token = generate_token();
        self.repo
            .create_session(user.id, &hash_token(&token))
            .await
            .map_err(|e| reject("login", e))?;

        tracing::info!(user_id = %user.id, "Session opened");
        Ok(LoginResponse {
            token,
            user_id: user.id,
        })
    }

    #[tracing::instrument(skip_all)]
    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        let deleted = self
            .repo
            .delete_session(&hash_token(token))
            .await
            .map_err(|e| reject("logout", e))?;

        if !deleted {
            return Err(AppError::Unauthorized("Session not found".into()));
        }
        Ok(())
    }

    /// Resolves a bearer token to the caller it belongs to.
    pub async fn authenticate(&self, token: &str) -> Result<Caller, AppError> {
        let user = self
            .repo
            .find_session_user(&hash_token(token))
            .await
            .map_err(|e| reject("authenticate", e))?;

        user.map(|u| Caller::from(&u))
            .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".into()))
    }

    #[tracing::instrument(skip(self, caller), fields(user_id = %caller.user_id))]
    pub async fn profile(&self, caller: &Caller) -> Result<User, AppError> {
        self.repo
            .get_user(caller.user_id)
            .await
            .map_err(|e| reject("profile", e))?
            .ok_or_else(|| AppError::NotFound(format!("User {}", caller.user_id)))
    }
}
