use async_trait::async_trait;
use jsonwebtoken::TokenData;
use crate::{entities::{token::Claims, user::User}, errors::AuthError};

#[async_trait]
pub trait TokenServiceRepository: Send + Sync {
    /// Creates a new access JWT for the user
    fn create_jwt(&self, user: &User) -> Result<String, AuthError>;

    /// Lifetime of issued access tokens, in seconds
    fn access_ttl_secs(&self) -> i64;

    /// Decodes a JWT and returns the claims
    fn decode_jwt(&self, token: &str) -> Result<TokenData<Claims>, AuthError>;

    /// Revokes a token until it would have expired
    async fn revoke(&self, token: &str) -> Result<(), AuthError>;

    /// Checks if a JWT is revoked
    async fn is_revoked(&self, token: &str) -> Result<bool, AuthError>;
}
