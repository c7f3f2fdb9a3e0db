use actix_web::{get, HttpResponse, Responder};

#[get("/")]
pub async fn home() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Welcome to the KittyCode API!",
        "status": "Ok",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "skills": "/api/v1/skills",
            "contact": "/api/v1/contact",
            "auth": "/api/v1/auth/login"
        }
    }))
}
