use anyhow::Context;
use votelens_common::{Result, VotelensError};

/// bcrypt with a fixed cost. Work runs on `spawn_blocking`.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl PasswordHasher {
    /// `cost` is clamped to bcrypt's valid range (4..=31).
    pub fn new(cost: u32) -> Self {
        Self {
            cost: cost.clamp(4, 31),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub async fn hash(&self, password: &str) -> Result<String> {
        let password = password.to_owned();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .context("password hashing task failed")?
            .map_err(|e| VotelensError::Internal(anyhow::anyhow!("bcrypt hash: {e}")))
    }

    /// `false` for a wrong password and for a malformed stored hash.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        let ok = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .context("password verification task failed")?;
        match ok {
            Ok(matched) => Ok(matched),
            Err(e) => {
                tracing::warn!(error = %e, "auth.password.bad_hash");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        let hasher = PasswordHasher::new(4);
        let hash = hasher.hash("s3cret!").await.unwrap();
        assert!(hash.starts_with("$2"));
        assert!(hasher.verify("s3cret!", &hash).await.unwrap());
        assert!(!hasher.verify("wrong", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn malformed_hash_never_matches() {
        let hasher = PasswordHasher::new(4);
        assert!(!hasher.verify("x", "not-a-hash").await.unwrap());
    }

    #[test]
    fn cost_is_clamped() {
        assert_eq!(PasswordHasher::new(1).cost(), 4);
        assert_eq!(PasswordHasher::new(40).cost(), 31);
    }
}
