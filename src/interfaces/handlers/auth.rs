use actix_web::{get, post, web, HttpResponse, Responder};

use crate::entities::user::{FederatedLogin, LoginUser};
use crate::use_cases::extractors::{AuthClaims, BearerToken};
use crate::AppState;

#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    user: web::Json<LoginUser>
) -> Result<impl Responder, actix_web::Error> {
    let auth_response = state.auth_handler.sign_in_with_email(user.into_inner()).await?;
    Ok(HttpResponse::Ok().json(auth_response))
}

#[post("/federated")]
pub async fn federated_login(
    state: web::Data<AppState>,
    body: web::Json<FederatedLogin>
) -> Result<impl Responder, actix_web::Error> {
    let auth_response = state.auth_handler.sign_in_with_provider(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(auth_response))
}

#[post("/logout")]
pub async fn logout(
    state: web::Data<AppState>,
    token: BearerToken,
) -> Result<impl Responder, actix_web::Error> {
    state.auth_handler.sign_out(&token.0).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({"message": "Logged out successfully"})))
}

#[get("/me")]
pub async fn me(claims: AuthClaims) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "id": claims.0.sub,
        "email": claims.0.email,
        "provider": claims.0.provider,
    }))
}
