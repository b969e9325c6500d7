use std::sync::Arc;
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Context;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::config::HashConfig;

/// Argon2id hasher with a configurable cost.
///
/// Verification takes its parameters from the stored PHC string, so hashes
/// made under an older cost keep verifying after the cost is raised.
#[derive(Clone)]
pub struct Argon2Hasher {
    params: Params,
    // Stand-in compared against when the identifier is unknown, at the current cost.
    dummy_hash: Arc<str>,
    #[cfg(test)]
    verify_calls: Arc<AtomicUsize>,
}

impl Argon2Hasher {
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> anyhow::Result<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| anyhow::anyhow!("invalid argon2 parameters: {e}"))?;
        let mut hasher = Self {
            params,
            dummy_hash: Arc::from(""),
            #[cfg(test)]
            verify_calls: Arc::default(),
        };
        hasher.dummy_hash = hasher.hash("unknown-user-placeholder")?.into();
        Ok(hasher)
    }

    pub fn from_config(cfg: &HashConfig) -> anyhow::Result<Self> {
        Self::new(cfg.memory_kib, cfg.iterations, cfg.parallelism)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn hash(&self, plain: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                anyhow::anyhow!(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    pub fn verify(&self, plain: &str, hash: &str) -> anyhow::Result<bool> {
        #[cfg(test)]
        self.verify_calls.fetch_add(1, Ordering::Relaxed);
        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            anyhow::anyhow!(e.to_string())
        })?;
        Ok(self
            .argon2()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok())
    }

    /// [`Self::hash`] on the blocking pool.
    pub async fn hash_blocking(&self, plain: String) -> anyhow::Result<String> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plain))
            .await
            .context("password hashing task failed")?
    }

    /// [`Self::verify`] on the blocking pool.
    pub async fn verify_blocking(&self, plain: String, hash: String) -> anyhow::Result<bool> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&plain, &hash))
            .await
            .context("password verification task failed")?
    }

    /// Spends the same work as a real verification and discards the result.
    pub async fn verify_dummy_blocking(&self, plain: String) -> anyhow::Result<()> {
        self.verify_blocking(plain, self.dummy_hash.to_string())
            .await
            .map(|_| ())
    }

    #[cfg(test)]
    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::Relaxed)
    }
}
