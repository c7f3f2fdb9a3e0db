use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{encode, Header, decode, Validation, TokenData, Algorithm};
use chrono::{Utc, Duration};

use crate::auth::revocation::TokenRevocationStore;
use crate::entities::token::Claims;
use crate::entities::user::User;
use crate::repositories::token::TokenServiceRepository;
use crate::settings::{AppConfig, JwtKeys};
use crate::errors::AuthError;

const JWT_ALGORITHM: Algorithm = Algorithm::HS512;

#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    access_expiration: Duration,
    revocations: Arc<dyn TokenRevocationStore>,
}

impl JwtService {
    pub fn new(config: &AppConfig, revocations: Arc<dyn TokenRevocationStore>) -> Self {
        JwtService {
            keys: JwtKeys::from(config),
            access_expiration: Duration::minutes(config.jwt_expiration_minutes),
            revocations,
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;
        validation
    }
}

#[async_trait]
impl TokenServiceRepository for JwtService {
    fn create_jwt(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = (now + self.access_expiration).timestamp() as usize;

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            provider: user.provider.clone(),
            exp,
            iat: now.timestamp() as usize,
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.keys.encoding).map_err(|e| {
            tracing::warn!("Failed to create JWT: {}", e);
            AuthError::TokenCreation
        })
    }

    fn access_ttl_secs(&self) -> i64 {
        self.access_expiration.num_seconds()
    }

    fn decode_jwt(&self, token: &str) -> Result<TokenData<Claims>, AuthError> {
        decode::<Claims>(token, &self.keys.decoding, &Self::validation())
            .map_err(AuthError::from)
    }

    async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        let claims = self.decode_jwt(token)?.claims;
        let now = Utc::now().timestamp() as usize;

        if claims.exp <= now {
            return Err(AuthError::TokenExpired);
        }

        let ttl_seconds = (claims.exp - now) as u64;
        self.revocations.revoke(token, ttl_seconds).await
    }

    async fn is_revoked(&self, token: &str) -> Result<bool, AuthError> {
        self.revocations.is_revoked(token).await
    }
}
