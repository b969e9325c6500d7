use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,                      // 0 until the store assigns one
    pub name: String,
    pub identifier: String,           // login handle, unique and case-sensitive
    #[serde(skip_serializing)]
    pub password_hash: String,        // Argon2 PHC string, not exposed in JSON
    pub avatar: Option<String>,
}

/// Registration input; the password is still plaintext here.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub identifier: String,
    pub password: String,
    pub avatar: Option<String>,
}

/// Full replacement of an existing user; the password is plaintext and is always re-hashed.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub id: i64,
    pub name: String,
    pub identifier: String,
    pub password: String,
    pub avatar: Option<String>,
}
