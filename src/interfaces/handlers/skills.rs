use std::sync::Arc;

use actix_web::{http::header, web, Error, HttpResponse, Responder};
use futures_util::stream;
use serde::Deserialize;

use crate::{
    entities::{category::CategorySelection, skill::SkillForm},
    handlers::json_error::confirmation_required,
    use_cases::skill_catalog::{DeleteOutcome, SkillSaved},
    utils::valid_uuid::valid_uuid,
    AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirm: bool,
}

pub async fn get_catalog(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.catalog.view())
}

/// Server-sent events: one `catalog` event with the current view, then one
/// per change.
pub async fn stream_catalog(state: web::Data<AppState>) -> HttpResponse {
    let catalog = Arc::clone(&state.catalog);
    let changes = catalog.changes();

    let events = stream::unfold((catalog, changes, true), |(catalog, mut changes, first)| async move {
        if first {
            changes.borrow_and_update();
        } else if changes.changed().await.is_err() {
            return None;
        }

        let frame = serde_json::to_string(&catalog.view())
            .map(|payload| web::Bytes::from(format!("event: catalog\ndata: {}\n\n", payload)))
            .map_err(actix_web::error::ErrorInternalServerError);

        Some((frame, (catalog, changes, false)))
    });

    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/event-stream"))
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(events)
}

pub async fn select_category(
    state: web::Data<AppState>,
    body: web::Json<CategorySelection>,
) -> Result<HttpResponse, Error> {
    state.catalog.select_category(&body.categoria)?;
    Ok(HttpResponse::Ok().json(state.catalog.view()))
}

pub async fn open_form(state: web::Data<AppState>) -> Result<HttpResponse, Error> {
    state.catalog.open_form()?;
    Ok(HttpResponse::Ok().json(state.catalog.form()))
}

pub async fn cancel_form(state: web::Data<AppState>) -> impl Responder {
    state.catalog.cancel_form();
    HttpResponse::Ok().json(state.catalog.form())
}

pub async fn begin_edit(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let id = valid_uuid(&path.into_inner())?;
    state.catalog.begin_edit(id)?;
    Ok(HttpResponse::Ok().json(state.catalog.form()))
}

pub async fn submit_skill(
    state: web::Data<AppState>,
    form: web::Json<SkillForm>,
) -> Result<HttpResponse, Error> {
    let saved = state.catalog.submit_skill(form.into_inner()).await?;

    Ok(match saved {
        SkillSaved::Created { .. } => HttpResponse::Created().json(saved),
        SkillSaved::Updated { .. } => HttpResponse::Ok().json(saved),
    })
}

pub async fn delete_skill(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ConfirmQuery>,
) -> Result<HttpResponse, Error> {
    let id = valid_uuid(&path.into_inner())?;

    match state.catalog.delete_skill(id, &query.confirm).await? {
        DeleteOutcome::Declined { prompt } => Ok(confirmation_required(&prompt)),
        outcome => Ok(HttpResponse::Ok().json(outcome)),
    }
}
