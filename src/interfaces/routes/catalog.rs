use actix_web::web;

use crate::handlers::{categories, skills};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/skills")
            .service(
                web::resource("")
                    .route(web::get().to(skills::get_catalog))
                    .route(web::post().to(skills::submit_skill))
            )
            .service(
                web::resource("/stream")
                    .route(web::get().to(skills::stream_catalog))
            )
            .service(
                web::resource("/selection")
                    .route(web::put().to(skills::select_category))
            )
            .service(
                web::resource("/form")
                    .route(web::post().to(skills::open_form))
                    .route(web::delete().to(skills::cancel_form))
            )
            .service(
                web::resource("/{skill_id}/edit")
                    .route(web::post().to(skills::begin_edit))
            )
            .service(
                web::resource("/{skill_id}")
                    .route(web::delete().to(skills::delete_skill))
            )
    );

    cfg.service(
        web::scope("/categories")
            .service(
                web::resource("")
                    .route(web::post().to(categories::add_category))
            )
            .service(
                web::resource("/{name}")
                    .route(web::delete().to(categories::delete_category))
            )
    );
}
