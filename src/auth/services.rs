use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::auth::{
    dto::LoginResult,
    password::Argon2Hasher,
    repo::UserStore,
    repo_types::{NewUser, User, UserUpdate},
    token::basic_token,
};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("identifier already registered")]
    Conflict,

    #[error("user not found")]
    NotFound,

    #[error("invalid credentials")]
    Unauthorized,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            AuthError::Conflict | AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::NotFound => StatusCode::NOT_FOUND,
            AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::Internal(e) => {
                error!(error = %format!("{e:#}"), "internal error");
                return (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
                    .into_response();
            }
        };
        (status, self.to_string()).into_response()
    }
}

/// Registration, profile updates and credential checks over a [`UserStore`].
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    hasher: Argon2Hasher,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, hasher: Argon2Hasher) -> Self {
        Self { store, hasher }
    }

    #[instrument(skip(self, candidate), fields(identifier = %candidate.identifier))]
    pub async fn register(&self, candidate: NewUser) -> Result<User, AuthError> {
        if candidate.identifier.is_empty() {
            return Err(AuthError::Validation("identifier must not be empty".into()));
        }
        if self
            .store
            .find_by_identifier(&candidate.identifier)
            .await?
            .is_some()
        {
            warn!("identifier already registered");
            return Err(AuthError::Conflict);
        }

        let password_hash = self.hasher.hash_blocking(candidate.password).await?;
        let user = self
            .store
            .save(User {
                id: 0,
                name: candidate.name,
                identifier: candidate.identifier,
                password_hash,
                avatar: candidate.avatar,
            })
            .await?;

        info!(user_id = user.id, "user registered");
        Ok(user)
    }

    /// Replaces every field of an existing user.
    ///
    /// The password is hashed again unconditionally, so callers must send the
    /// plaintext; sending back a stored hash makes it the new password.
    #[instrument(
        skip(self, candidate),
        fields(user_id = candidate.id, identifier = %candidate.identifier)
    )]
    pub async fn update(&self, candidate: UserUpdate) -> Result<User, AuthError> {
        if self.store.find_by_id(candidate.id).await?.is_none() {
            warn!("update of unknown user");
            return Err(AuthError::NotFound);
        }
        if let Some(holder) = self.store.find_by_identifier(&candidate.identifier).await? {
            if holder.id != candidate.id {
                warn!(holder_id = holder.id, "identifier belongs to another user");
                return Err(AuthError::Conflict);
            }
        }

        let password_hash = self.hasher.hash_blocking(candidate.password).await?;
        let user = self
            .store
            .save(User {
                id: candidate.id,
                name: candidate.name,
                identifier: candidate.identifier,
                password_hash,
                avatar: candidate.avatar,
            })
            .await?;

        info!("user updated");
        Ok(user)
    }

    /// Looks the user up and checks the password against the stored hash.
    ///
    /// An unknown identifier still pays for one Argon2 verification, so it
    /// answers with the same error and in about the same time as a wrong password.
    pub async fn verify_credentials(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let Some(user) = self.store.find_by_identifier(identifier).await? else {
            self.hasher.verify_dummy_blocking(password.to_owned()).await?;
            return Err(AuthError::Unauthorized);
        };
        let ok = self
            .hasher
            .verify_blocking(password.to_owned(), user.password_hash.clone())
            .await?;
        if !ok {
            return Err(AuthError::Unauthorized);
        }
        Ok(user)
    }

    #[instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<LoginResult, AuthError> {
        let user = match self.verify_credentials(identifier, password).await {
            Ok(u) => u,
            Err(e) => {
                if matches!(e, AuthError::Unauthorized) {
                    warn!("login rejected");
                }
                return Err(e);
            }
        };

        info!(user_id = user.id, "user logged in");
        Ok(LoginResult {
            id: user.id,
            name: user.name,
            token: basic_token(identifier, password),
            identifier: user.identifier,
            avatar: user.avatar,
        })
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        Ok(self.store.find_all().await?)
    }

    pub async fn find_user(&self, id: i64) -> Result<User, AuthError> {
        self.store.find_by_id(id).await?.ok_or(AuthError::NotFound)
    }

    pub async fn search_users(&self, name_fragment: &str) -> Result<Vec<User>, AuthError> {
        Ok(self.store.find_all_by_name_containing(name_fragment).await?)
    }
}
