use std::sync::Arc;

use validator::Validate;

use crate::auth::federated::FederatedIdentityProvider;
use crate::auth::password::{hash_password, verify_password};
use crate::entities::token::AuthResponse;
use crate::entities::user::{FederatedLogin, LoginUser, User, UserInsert};
use crate::errors::{AppError, AuthError};
use crate::repositories::token::TokenServiceRepository;
use crate::repositories::user::UserRepository;

pub struct AuthHandler<R, T>
where
    R: UserRepository,
    T: TokenServiceRepository,
{
    pub user_repo: R,
    pub token_service: T,
    pub federated: Arc<dyn FederatedIdentityProvider>,
}

impl<R, T> AuthHandler<R, T>
where
    R: UserRepository,
    T: TokenServiceRepository,
{
    pub fn new(user_repo: R, token_service: T, federated: Arc<dyn FederatedIdentityProvider>) -> Self {
        AuthHandler {
            user_repo,
            token_service,
            federated,
        }
    }

    /// Signs in with email and password
    pub async fn sign_in_with_email(&self, request: LoginUser) -> Result<AuthResponse, AuthError> {
        request.validate()?;

        let user = self.user_repo.get_user_by_email(&request.email)
            .await?
            .ok_or(AuthError::WrongCredentials)?;

        // Federated-only accounts have no password to check.
        let hash = user.password_hash.as_deref().ok_or(AuthError::WrongCredentials)?;

        if !verify_password(&request.password, hash)? {
            return Err(AuthError::WrongCredentials);
        }

        let response = self.create_auth_response(&user)?;

        tracing::info!(user_id = %user.id, "User signed in with email");
        Ok(response)
    }

    /// Signs in with an identity token from the configured provider,
    /// creating the account on first use
    pub async fn sign_in_with_provider(&self, request: FederatedLogin) -> Result<AuthResponse, AuthError> {
        request.validate()?;

        let identity = self.federated.verify(&request.id_token).await?;

        let user = match self.user_repo.get_user_by_email(&identity.email).await? {
            Some(user) => user,
            None => {
                let insert = UserInsert::federated(&identity.email, identity.display_name.clone(), identity.provider);
                let id = match self.user_repo.create_user(&insert).await {
                    Ok(id) => Some(id),
                    // Lost a race against a concurrent first sign-in.
                    Err(AppError::Conflict(_)) => None,
                    Err(e) => return Err(e.into()),
                };

                let user = match id {
                    Some(id) => self.user_repo.get_user_by_id(&id).await?,
                    None => self.user_repo.get_user_by_email(&identity.email).await?,
                };
                let user = user.ok_or(AuthError::AuthenticationFailed)?;
                tracing::info!(user_id = %user.id, provider = identity.provider.as_str(), "Created federated user");
                user
            }
        };

        let response = self.create_auth_response(&user)?;

        tracing::info!(user_id = %user.id, provider = identity.provider.as_str(), "User signed in with provider");
        Ok(response)
    }

    /// Revokes the access token for the rest of its lifetime
    pub async fn sign_out(&self, token: &str) -> Result<(), AuthError> {
        let claims = self.token_service.decode_jwt(token)?.claims;
        self.token_service.revoke(token).await?;

        tracing::info!(user_id = %claims.sub, "User signed out");
        Ok(())
    }

    /// Creates the password account if no user holds `email` yet
    pub async fn ensure_password_user(&self, email: &str, password: &str) -> Result<bool, AppError> {
        if self.user_repo.get_user_by_email(email).await?.is_some() {
            tracing::debug!("Bootstrap user already present");
            return Ok(false);
        }

        let hash = hash_password(password)?;
        match self.user_repo.create_user(&UserInsert::with_password(email, hash)).await {
            Ok(id) => {
                tracing::info!(user_id = %id, "Created bootstrap user");
                Ok(true)
            }
            Err(AppError::Conflict(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn create_auth_response(&self, user: &User) -> Result<AuthResponse, AuthError> {
        let access_token = self.token_service.create_jwt(user)?;
        Ok(AuthResponse::new(access_token, self.token_service.access_ttl_secs()))
    }
}
