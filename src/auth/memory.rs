use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::auth::{repo::UserStore, repo_types::User};

/// `UserStore` backed by a vector, with the same unique-identifier rule as the table.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    next_id: i64,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count_by_identifier(&self, identifier: &str) -> usize {
        self.inner
            .read()
            .await
            .users
            .iter()
            .filter(|u| u.identifier == identifier)
            .count()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_identifier(&self, identifier: &str) -> anyhow::Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.identifier == identifier).cloned())
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn save(&self, mut user: User) -> anyhow::Result<User> {
        let mut inner = self.inner.write().await;
        if inner
            .users
            .iter()
            .any(|u| u.identifier == user.identifier && u.id != user.id)
        {
            anyhow::bail!("duplicate key value violates unique constraint on identifier");
        }

        if user.id == 0 {
            inner.next_id += 1;
            user.id = inner.next_id;
            inner.users.push(user.clone());
            return Ok(user);
        }

        let slot = inner
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| anyhow::anyhow!("update user {}: no rows returned", user.id))?;
        *slot = user.clone();
        Ok(user)
    }

    async fn find_all(&self) -> anyhow::Result<Vec<User>> {
        Ok(self.inner.read().await.users.clone())
    }

    async fn find_all_by_name_containing(&self, fragment: &str) -> anyhow::Result<Vec<User>> {
        let needle = fragment.to_lowercase();
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .iter()
            .filter(|u| u.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, identifier: &str) -> User {
        User {
            id: 0,
            name: name.into(),
            identifier: identifier.into(),
            password_hash: "hash".into(),
            avatar: None,
        }
    }

    #[tokio::test]
    async fn save_assigns_ids_and_rejects_duplicates() {
        let store = MemoryUserStore::new();
        let a = store.save(user("João da Silva", "joao@email.com.br")).await.unwrap();
        let b = store.save(user("Paulo Antunes", "paulo@email.com.br")).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));

        assert!(store.save(user("Other", "joao@email.com.br")).await.is_err());
        assert_eq!(store.count_by_identifier("joao@email.com.br").await, 1);
    }

    #[tokio::test]
    async fn name_search_is_case_insensitive() {
        let store = MemoryUserStore::new();
        for (name, id) in [
            ("João da Silva", "joao@email.com.br"),
            ("Manuela da Silva", "manuela@email.com.br"),
            ("Adriana da Silva", "adriana@email.com.br"),
            ("Paulo Antunes", "paulo@email.com.br"),
        ] {
            store.save(user(name, id)).await.unwrap();
        }

        let found = store.find_all_by_name_containing("silva").await.unwrap();
        let names: Vec<_> = found.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["João da Silva", "Manuela da Silva", "Adriana da Silva"]);
    }
}
