use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::auth::repo_types::User;

/// Lookup and persistence of user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_identifier(&self, identifier: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>>;
    /// Inserts when `user.id == 0`, otherwise updates the row in place.
    async fn save(&self, user: User) -> anyhow::Result<User>;
    async fn find_all(&self) -> anyhow::Result<Vec<User>>;
    /// Case-insensitive substring match on the display name.
    async fn find_all_by_name_containing(&self, fragment: &str) -> anyhow::Result<Vec<User>>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_identifier(&self, identifier: &str) -> anyhow::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, identifier, password_hash, avatar
              FROM users
             WHERE identifier = $1
            "#,
        )
        .bind(identifier)
        .fetch_optional(&self.db)
        .await
        .context("find user by identifier")
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, identifier, password_hash, avatar
              FROM users
             WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")
    }

    async fn save(&self, user: User) -> anyhow::Result<User> {
        if user.id == 0 {
            return sqlx::query_as::<_, User>(
                r#"
                INSERT INTO users (name, identifier, password_hash, avatar)
                VALUES ($1, $2, $3, $4)
                RETURNING id, name, identifier, password_hash, avatar
                "#,
            )
            .bind(&user.name)
            .bind(&user.identifier)
            .bind(&user.password_hash)
            .bind(&user.avatar)
            .fetch_one(&self.db)
            .await
            .context("insert user");
        }

        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET name = $2, identifier = $3, password_hash = $4, avatar = $5
             WHERE id = $1
            RETURNING id, name, identifier, password_hash, avatar
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.identifier)
        .bind(&user.password_hash)
        .bind(&user.avatar)
        .fetch_one(&self.db)
        .await
        .with_context(|| format!("update user {}", user.id))
    }

    async fn find_all(&self) -> anyhow::Result<Vec<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, identifier, password_hash, avatar
              FROM users
             ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list users")
    }

    async fn find_all_by_name_containing(&self, fragment: &str) -> anyhow::Result<Vec<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, identifier, password_hash, avatar
              FROM users
             WHERE name ILIKE $1 ESCAPE '\'
             ORDER BY id ASC
            "#,
        )
        .bind(contains_pattern(fragment))
        .fetch_all(&self.db)
        .await
        .context("search users by name")
    }
}

/// Builds a `%fragment%` LIKE pattern with wildcards in the fragment taken literally.
fn contains_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
