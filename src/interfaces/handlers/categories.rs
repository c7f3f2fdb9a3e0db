use actix_web::{web, Error, HttpResponse};

use crate::{
    entities::category::NewCategoryForm,
    handlers::{json_error::confirmation_required, skills::ConfirmQuery},
    use_cases::skill_catalog::DeleteOutcome,
    AppState,
};

pub async fn add_category(
    state: web::Data<AppState>,
    body: web::Json<NewCategoryForm>,
) -> Result<HttpResponse, Error> {
    state.catalog.add_category(&body.nombre)?;
    Ok(HttpResponse::Created().json(state.catalog.view()))
}

pub async fn delete_category(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ConfirmQuery>,
) -> Result<HttpResponse, Error> {
    let name = path.into_inner();

    match state.catalog.delete_category(&name, &query.confirm).await? {
        DeleteOutcome::Declined { prompt } => Ok(confirmation_required(&prompt)),
        outcome => Ok(HttpResponse::Ok().json(outcome)),
    }
}
