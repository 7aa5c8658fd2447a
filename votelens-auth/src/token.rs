use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;
use votelens_common::{Result, VotelensError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| VotelensError::Unauthorized("malformed token subject".into()))
    }
}

/// Issues and checks HS256 session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Result<Self> {
        if secret.trim().is_empty() {
            return Err(VotelensError::Config("JWT_SECRET is not set".into()));
        }
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, user_id: Uuid, email: &str) -> Result<String> {
        self.issue_at(user_id, email, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, user_id: Uuid, email: &str, now: DateTime<Utc>) -> Result<String> {
        let iat = now.timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat,
            exp: iat + self.ttl.as_secs() as i64,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| VotelensError::Internal(anyhow::anyhow!("token encode: {e}")))
    }

    /// Signature and expiry check.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "auth.token.rejected");
                VotelensError::Unauthorized("invalid or expired token".into())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: Duration = Duration::from_secs(24 * 3600);

    #[test]
    fn issued_tokens_verify() {
        let svc = TokenService::new("test-secret", DAY).unwrap();
        let id = Uuid::new_v4();
        let token = svc.issue(id, "a@b.in").unwrap();
        let claims = svc.verify(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), id);
        assert_eq!(claims.email, "a@b.in");
        assert_eq!(claims.exp - claims.iat, DAY.as_secs() as i64);
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let svc = TokenService::new("test-secret", DAY).unwrap();
        let issued = Utc::now() - chrono::Duration::days(2);
        let token = svc.issue_at(Uuid::new_v4(), "a@b.in", issued).unwrap();
        assert!(matches!(svc.verify(&token), Err(VotelensError::Unauthorized(_))));
    }

    #[test]
    fn foreign_signatures_are_rejected() {
        let ours = TokenService::new("ours", DAY).unwrap();
        let theirs = TokenService::new("theirs", DAY).unwrap();
        let token = theirs.issue(Uuid::new_v4(), "x@y.z").unwrap();
        assert!(ours.verify(&token).is_err());
        assert!(ours.verify("garbage").is_err());
    }

    #[test]
    fn empty_secret_is_a_config_error() {
        assert!(matches!(
            TokenService::new("  ", DAY),
            Err(VotelensError::Config(_))
        ));
    }
}
