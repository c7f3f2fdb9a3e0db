use actix_web::{
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::Method,
    web, Error, HttpMessage, ResponseError,
};
use futures_util::future::{ok, Ready, LocalBoxFuture};
use std::{rc::Rc, task::{Context, Poll}};

use crate::{entities::token::Claims, errors::AuthError, repositories::token::TokenServiceRepository, AppState};

pub struct AuthMiddleware;

impl<S> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Rc::new(service),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            if is_public_route(req.path(), req.method()) {
                return service.call(req).await;
            }

            match authenticate(&req).await {
                Ok(claims) => {
                    req.extensions_mut().insert(claims);
                    service.call(req).await
                }
                Err(e) => {
                    tracing::warn!(path = req.path(), "Rejected request: {}", e);
                    Ok(req.into_response(e.error_response()))
                }
            }
        })
    }
}

async fn authenticate(req: &ServiceRequest) -> Result<Claims, AuthError> {
    let state = req.app_data::<web::Data<AppState>>()
        .ok_or_else(|| {
            tracing::error!("AppState missing in middleware");
            AuthError::MissingJwtService
        })?;

    let token = extract_token(req).ok_or(AuthError::InvalidToken)?;
    let claims = state.auth_handler.token_service.decode_jwt(&token)?.claims;

    if state.auth_handler.token_service.is_revoked(&token).await? {
        return Err(AuthError::TokenRevoked);
    }

    Ok(claims)
}

pub fn is_public_route(path: &str, method: &Method) -> bool {
    if *method == Method::OPTIONS {
        return true;
    }

    matches!(
        (path, method.as_str()),
        ("/", "GET") |
        ("/api/v1/contact", "POST") |
        ("/api/v1/auth/login", "POST") |
        ("/api/v1/auth/federated", "POST")
    )
}

fn extract_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| {
            let parts: Vec<&str> = header.split_whitespace().collect();
            if parts.len() == 2 && parts[0].eq_ignore_ascii_case("bearer") {
                Some(parts[1].to_string())
            } else {
                None
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_sign_in_contact_and_banner_are_public() {
        assert!(is_public_route("/", &Method::GET));
        assert!(is_public_route("/api/v1/contact", &Method::POST));
        assert!(is_public_route("/api/v1/auth/login", &Method::POST));
        assert!(is_public_route("/api/v1/skills", &Method::OPTIONS));

        assert!(!is_public_route("/api/v1/skills", &Method::GET));
        assert!(!is_public_route("/api/v1/auth/logout", &Method::POST));
        assert!(!is_public_route("/api/v1/admin/health", &Method::GET));
    }
}
