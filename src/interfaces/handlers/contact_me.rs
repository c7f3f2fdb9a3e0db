use actix_web::{web, Error, HttpRequest, HttpResponse};

use crate::{
    entities::contact_me::NewContactMeForm,
    handlers::json_error::too_many_requests,
    limiter::rate_limiter::{client_key, RateDecision},
    AppState,
};

pub async fn create_contact_me(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: web::Json<NewContactMeForm>,
) -> Result<HttpResponse, Error> {
    let client = client_key(&req, state.trust_x_forwarded_for);

    if let RateDecision::Limited { retry_after_secs } = state.contact_limiter.check(&client) {
        tracing::warn!(client = %client, retry_after_secs, "Contact form rate limit hit");
        return Ok(too_many_requests(retry_after_secs));
    }

    let response = state.contact_handler
        .create_contact_message(form.into_inner()).await?;

    Ok(HttpResponse::Created().json(response))
}
