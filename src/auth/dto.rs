use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::auth::{
    repo_types::{NewUser, User, UserUpdate},
    services::AuthError,
};

const MAX_NAME_LEN: usize = 255;
const MAX_AVATAR_LEN: usize = 5000;
const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn validate_profile(
    name: &str,
    identifier: &str,
    password: &str,
    avatar: Option<&str>,
) -> Result<(), AuthError> {
    if name.trim().is_empty() {
        return Err(AuthError::Validation("name must not be blank".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AuthError::Validation(format!(
            "name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    if !is_valid_email(identifier) {
        return Err(AuthError::Validation("identifier must be a valid e-mail".into()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if avatar.is_some_and(|a| a.chars().count() > MAX_AVATAR_LEN) {
        return Err(AuthError::Validation(format!(
            "avatar must be at most {MAX_AVATAR_LEN} characters"
        )));
    }
    Ok(())
}

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub identifier: String,
    pub password: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), AuthError> {
        validate_profile(&self.name, &self.identifier, &self.password, self.avatar.as_deref())
    }
}

impl From<RegisterRequest> for NewUser {
    fn from(r: RegisterRequest) -> Self {
        Self {
            name: r.name,
            identifier: r.identifier,
            password: r.password,
            avatar: r.avatar,
        }
    }
}

/// Request body for a profile update. `password` must be plaintext: it is
/// hashed again on every update.
#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub id: i64,
    pub name: String,
    pub identifier: String,
    pub password: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl UpdateRequest {
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.id <= 0 {
            return Err(AuthError::Validation("id must be positive".into()));
        }
        validate_profile(&self.name, &self.identifier, &self.password, self.avatar.as_deref())
    }
}

impl From<UpdateRequest> for UserUpdate {
    fn from(r: UpdateRequest) -> Self {
        Self {
            id: r.id,
            name: r.name,
            identifier: r.identifier,
            password: r.password,
            avatar: r.avatar,
        }
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.identifier.is_empty() || self.password.is_empty() {
            return Err(AuthError::Validation(
                "identifier and password are required".into(),
            ));
        }
        Ok(())
    }
}

/// Response returned after a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResult {
    pub id: i64,
    pub name: String,
    pub identifier: String,
    pub avatar: Option<String>,
    pub token: String,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: i64,
    pub name: String,
    pub identifier: String,
    pub avatar: Option<String>,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            identifier: u.identifier,
            avatar: u.avatar,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(name: &str, identifier: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.into(),
            identifier: identifier.into(),
            password: password.into(),
            avatar: None,
        }
    }

    #[test]
    fn accepts_well_formed_registration() {
        assert!(register("Root", "root@root.com", "rootroot").validate().is_ok());
    }

    #[test]
    fn rejects_bad_registration_fields() {
        for req in [
            register("  ", "root@root.com", "rootroot"),
            register("Root", "root", "rootroot"),
            register("Root", "", "rootroot"),
            register("Root", "root@root.com", "short"),
            register(&"x".repeat(MAX_NAME_LEN + 1), "root@root.com", "rootroot"),
        ] {
            assert!(
                matches!(req.validate(), Err(AuthError::Validation(_))),
                "expected rejection for {req:?}"
            );
        }
    }

    #[test]
    fn identifier_case_is_preserved() {
        let req = register("Root", "Root@Root.com", "rootroot");
        assert!(req.validate().is_ok());
        assert_eq!(NewUser::from(req).identifier, "Root@Root.com");
    }

    #[test]
    fn update_requires_positive_id() {
        let req = UpdateRequest {
            id: 0,
            name: "Root".into(),
            identifier: "root@root.com".into(),
            password: "rootroot".into(),
            avatar: None,
        };
        assert!(matches!(req.validate(), Err(AuthError::Validation(_))));
    }

    #[test]
    fn public_user_never_carries_the_hash() {
        let user = User {
            id: 7,
            name: "Root".into(),
            identifier: "root@root.com".into(),
            password_hash: "$argon2id$secret".into(),
            avatar: Some("https://i.imgur.com/FETvs20.jpg".into()),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        let json = serde_json::to_string(&PublicUser::from(user)).unwrap();
        assert!(json.contains("root@root.com"));
        assert!(!json.contains("password"));
    }

    #[test]
    fn register_body_avatar_is_optional() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"name":"Root","identifier":"root@root.com","password":"rootroot"}"#,
        )
        .unwrap();
        assert!(req.avatar.is_none());
    }
}
