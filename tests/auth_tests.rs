mod test_utils;

use std::sync::Arc;

use async_trait::async_trait;
use kittycode_backend::{
    auth::{federated::FederatedIdentityProvider, jwt::JwtService, revocation::InMemoryRevocations},
    entities::{
        token::AuthResponse,
        user::{FederatedIdentity, FederatedLogin, LoginUser, SignInProvider},
    },
    errors::AuthError,
    repositories::{memory::InMemoryUserRepo, token::TokenServiceRepository, user::UserRepository},
    use_cases::auth::AuthHandler,
};
use reqwest::StatusCode;
use serde_json::{json, Value};
use test_utils::*;

struct FixedProvider;

#[async_trait]
impl FederatedIdentityProvider for FixedProvider {
    async fn verify(&self, id_token: &str) -> Result<FederatedIdentity, AuthError> {
        if id_token != "good-token" {
            return Err(AuthError::ProviderRejected("unknown token".into()));
        }
        Ok(FederatedIdentity {
            subject: "google-123".into(),
            email: "Luis@Example.com".into(),
            display_name: Some("Luis".into()),
            provider: SignInProvider::Google,
        })
    }
}

fn handler() -> AuthHandler<InMemoryUserRepo, JwtService> {
    let jwt = JwtService::new(&test_config(), Arc::new(InMemoryRevocations::new()));
    AuthHandler::new(InMemoryUserRepo::new(), jwt, Arc::new(FixedProvider))
}

#[actix_rt::test]
async fn email_sign_in_issues_bearer_token() {
    let handler = handler();
    assert!(handler.ensure_password_user("ana@example.com", "Secret123!").await.unwrap());
    assert!(!handler.ensure_password_user("ana@example.com", "Secret123!").await.unwrap());

    let auth = handler
        .sign_in_with_email(LoginUser { email: "ana@example.com".into(), password: "Secret123!".into() })
        .await
        .unwrap();

    assert_eq!(auth.token_type, "Bearer");
    assert_eq!(auth.expires_in, 5 * 60);
    let claims = handler.token_service.decode_jwt(&auth.access_token).unwrap().claims;
    assert_eq!(claims.email, "ana@example.com");
    assert_eq!(claims.provider, "password");
}

#[actix_rt::test]
async fn wrong_password_is_rejected() {
    let handler = handler();
    handler.ensure_password_user("ana@example.com", "Secret123!").await.unwrap();

    let result = handler
        .sign_in_with_email(LoginUser { email: "ana@example.com".into(), password: "nope".into() })
        .await;

    assert!(matches!(result, Err(AuthError::WrongCredentials)));
}

#[actix_rt::test]
async fn federated_sign_in_creates_user_once() {
    let handler = handler();

    let first = handler
        .sign_in_with_provider(FederatedLogin { id_token: "good-token".into() })
        .await
        .unwrap();
    let second = handler
        .sign_in_with_provider(FederatedLogin { id_token: "good-token".into() })
        .await
        .unwrap();

    let first = handler.token_service.decode_jwt(&first.access_token).unwrap().claims;
    let second = handler.token_service.decode_jwt(&second.access_token).unwrap().claims;
    assert_eq!(first.sub, second.sub);
    assert_eq!(first.provider, "google");

    let user = handler.user_repo.get_user_by_email("luis@example.com").await.unwrap().unwrap();
    assert!(user.password_hash.is_none());

    // Federated-only accounts cannot use a password.
    let result = handler
        .sign_in_with_email(LoginUser { email: "luis@example.com".into(), password: "anything".into() })
        .await;
    assert!(matches!(result, Err(AuthError::WrongCredentials)));
}

#[actix_rt::test]
async fn rejected_provider_token_fails() {
    let handler = handler();

    let result = handler
        .sign_in_with_provider(FederatedLogin { id_token: "forged".into() })
        .await;

    assert!(matches!(result, Err(AuthError::ProviderRejected(_))));
}

#[actix_rt::test]
async fn sign_out_revokes_the_token() {
    let handler = handler();
    handler.ensure_password_user("ana@example.com", "Secret123!").await.unwrap();
    let auth = handler
        .sign_in_with_email(LoginUser { email: "ana@example.com".into(), password: "Secret123!".into() })
        .await
        .unwrap();

    assert!(!handler.token_service.is_revoked(&auth.access_token).await.unwrap());
    handler.sign_out(&auth.access_token).await.unwrap();
    assert!(handler.token_service.is_revoked(&auth.access_token).await.unwrap());
}

#[actix_rt::test]
async fn login_endpoint_returns_token_and_me_reads_it() {
    let app = TestApp::spawn().await;

    let response = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
    let auth: AuthResponse = response.json().await.unwrap();

    let me: Value = app.client
        .get(app.url("/api/v1/auth/me"))
        .bearer_auth(&auth.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["email"], ADMIN_EMAIL);
}

#[actix_rt::test]
async fn login_endpoint_rejects_bad_credentials() {
    let app = TestApp::spawn().await;

    let response = app.login(ADMIN_EMAIL, "wrong-password").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn logout_blocks_further_use_of_the_token() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let response = app.client
        .post(app.url("/api/v1/auth/logout"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.client
        .get(app.url("/api/v1/skills"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Token revoked");
}

#[actix_rt::test]
async fn federated_endpoint_reports_missing_configuration() {
    let app = TestApp::spawn().await;

    let response = app.client
        .post(app.url("/api/v1/auth/federated"))
        .json(&json!({ "id_token": "anything" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
}

#[actix_rt::test]
async fn health_report_requires_a_token() {
    let app = TestApp::spawn().await;

    let response = app.client
        .get(app.url("/api/v1/admin/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let token = app.admin_token().await;
    let health: Value = app.client
        .get(app.url("/api/v1/admin/health"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["store"], "memory");
}
