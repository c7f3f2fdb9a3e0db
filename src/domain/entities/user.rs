use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};
use validator::Validate;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignInProvider {
    Password,
    Google,
}

impl SignInProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignInProvider::Password => "password",
            SignInProvider::Google => "google",
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    /// Absent for accounts that only sign in through an identity provider.
    pub password_hash: Option<String>,
    pub provider: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UserInsert {
    pub email: String,
    pub display_name: Option<String>,
    pub password_hash: Option<String>,
    pub provider: SignInProvider,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserInsert {
    pub fn with_password(email: &str, password_hash: String) -> Self {
        let now = Utc::now();
        UserInsert {
            email: email.trim().to_lowercase(),
            display_name: None,
            password_hash: Some(password_hash),
            provider: SignInProvider::Password,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn federated(email: &str, display_name: Option<String>, provider: SignInProvider) -> Self {
        let now = Utc::now();
        UserInsert {
            email: email.trim().to_lowercase(),
            display_name,
            password_hash: None,
            provider,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LoginUser {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct FederatedLogin {
    #[validate(length(min = 1, message = "ID token cannot be empty"))]
    pub id_token: String,
}

/// Identity asserted by an external provider after token verification.
#[derive(Debug, Clone, PartialEq)]
pub struct FederatedIdentity {
    pub subject: String,
    pub email: String,
    pub display_name: Option<String>,
    pub provider: SignInProvider,
}

