use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    entities::user::{FederatedIdentity, SignInProvider},
    errors::AuthError,
    settings::AppConfig,
};

/// Verifies an identity token issued by an external provider.
#[async_trait]
pub trait FederatedIdentityProvider: Send + Sync {
    async fn verify(&self, id_token: &str) -> Result<FederatedIdentity, AuthError>;
}

/// Used when no provider client id is configured.
pub struct DisabledProvider;

#[async_trait]
impl FederatedIdentityProvider for DisabledProvider {
    async fn verify(&self, _id_token: &str) -> Result<FederatedIdentity, AuthError> {
        Err(AuthError::ProviderNotConfigured)
    }
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    sub: String,
    aud: String,
    email: Option<String>,
    /// Google encodes this as the string `"true"` / `"false"`.
    email_verified: Option<String>,
    name: Option<String>,
}

/// Google sign-in, checked against the tokeninfo endpoint.
pub struct GoogleIdentityProvider {
    client: reqwest::Client,
    client_id: String,
    tokeninfo_url: String,
}

impl GoogleIdentityProvider {
    pub fn new(client_id: impl Into<String>, tokeninfo_url: impl Into<String>) -> Self {
        GoogleIdentityProvider {
            client: reqwest::Client::new(),
            client_id: client_id.into(),
            tokeninfo_url: tokeninfo_url.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Arc<dyn FederatedIdentityProvider> {
        match &config.google_client_id {
            Some(client_id) if !client_id.trim().is_empty() => {
                Arc::new(Self::new(client_id.trim(), config.google_tokeninfo_url.clone()))
            }
            _ => {
                tracing::info!("Google client id not configured, federated sign-in disabled");
                Arc::new(DisabledProvider)
            }
        }
    }

    fn check(&self, info: TokenInfo) -> Result<FederatedIdentity, AuthError> {
        if info.aud != self.client_id {
            return Err(AuthError::ProviderRejected("token audience mismatch".into()));
        }
        if info.email_verified.as_deref() != Some("true") {
            return Err(AuthError::ProviderRejected("email not verified".into()));
        }
        let email = info.email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| AuthError::ProviderRejected("token carries no email".into()))?;

        Ok(FederatedIdentity {
            subject: info.sub,
            email,
            display_name: info.name,
            provider: SignInProvider::Google,
        })
    }
}

#[async_trait]
impl FederatedIdentityProvider for GoogleIdentityProvider {
    async fn verify(&self, id_token: &str) -> Result<FederatedIdentity, AuthError> {
        let response = self.client
            .get(&self.tokeninfo_url)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))?;

        if response.status().is_client_error() {
            return Err(AuthError::ProviderRejected("token rejected by provider".into()));
        }
        if !response.status().is_success() {
            return Err(AuthError::ProviderUnavailable(format!("status {}", response.status())));
        }

        let info: TokenInfo = response
            .json()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))?;

        self.check(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(aud: &str, verified: &str) -> TokenInfo {
        TokenInfo {
            sub: "1234".into(),
            aud: aud.into(),
            email: Some("ana@example.com".into()),
            email_verified: Some(verified.into()),
            name: Some("Ana".into()),
        }
    }

    #[test]
    fn accepts_matching_audience() {
        let provider = GoogleIdentityProvider::new("client-1", "http://unused");

        let identity = provider.check(info("client-1", "true")).unwrap();

        assert_eq!(identity.email, "ana@example.com");
        assert_eq!(identity.provider, SignInProvider::Google);
    }

    #[test]
    fn rejects_foreign_audience_and_unverified_email() {
        let provider = GoogleIdentityProvider::new("client-1", "http://unused");

        assert!(matches!(provider.check(info("other", "true")), Err(AuthError::ProviderRejected(_))));
        assert!(matches!(provider.check(info("client-1", "false")), Err(AuthError::ProviderRejected(_))));
    }
}
