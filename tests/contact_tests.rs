mod test_utils;

use kittycode_backend::{
    entities::contact_me::{ContactMeResponse, NewContactMeForm},
    errors::AppError,
    repositories::memory::InMemoryContactMeRepo,
    use_cases::contact::ContactMeHandler,
};
use reqwest::StatusCode;
use serde_json::{json, Value};
use test_utils::*;

fn valid_form() -> NewContactMeForm {
    NewContactMeForm {
        name: "Ana Torres".into(),
        email: "ana@example.com".into(),
        project_type: "web".into(),
        message: "I need a landing page.".into(),
    }
}

#[actix_rt::test]
async fn handler_stores_trimmed_message() {
    let repo = InMemoryContactMeRepo::new();
    let handler = ContactMeHandler::new(repo.clone());

    let mut form = valid_form();
    form.name = "  Ana Torres ".into();
    let response = handler.create_contact_message(form).await.unwrap();

    let stored = repo.messages();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, response.id);
    assert_eq!(stored[0].name, "Ana Torres");
    assert_eq!(stored[0].project_type, "web");
}

#[actix_rt::test]
async fn handler_reports_every_invalid_field() {
    let handler = ContactMeHandler::new(InMemoryContactMeRepo::new());

    let form = NewContactMeForm {
        name: " ".into(),
        email: "not-an-email".into(),
        project_type: "game".into(),
        message: String::new(),
    };

    match handler.create_contact_message(form).await {
        Err(AppError::ValidationError(errors)) => {
            let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
            assert_eq!(fields.len(), 4);
            assert_eq!(&fields[..3], &["email", "message", "name"]);
        }
        other => panic!("expected validation errors, got {:?}", other.map(|r| r.id)),
    }
}

#[actix_rt::test]
async fn contact_endpoint_is_public() {
    let app = TestApp::spawn().await;

    let response = app.client
        .post(app.url("/api/v1/contact"))
        .json(&json!({
            "name": "Ana Torres",
            "email": "ana@example.com",
            "projectType": "design",
            "message": "Logo refresh"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: ContactMeResponse = response.json().await.unwrap();
    assert_eq!(app.contacts.messages()[0].id, body.id);
}

#[actix_rt::test]
async fn contact_endpoint_rejects_invalid_form() {
    let app = TestApp::spawn().await;

    let response = app.client
        .post(app.url("/api/v1/contact"))
        .json(&json!({ "name": "Ana", "email": "ana@", "projectType": "web", "message": "Hi" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["details"][0]["field"], "email");
    assert!(app.contacts.messages().is_empty());
}

#[actix_rt::test]
async fn contact_endpoint_is_rate_limited_per_client() {
    let app = TestApp::spawn().await;
    let limit = app.config.contact_rate_limit;

    for _ in 0..limit {
        let response = app.client
            .post(app.url("/api/v1/contact"))
            .json(&valid_form())
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app.client
        .post(app.url("/api/v1/contact"))
        .json(&valid_form())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("retry-after"));
    assert_eq!(app.contacts.messages().len() as u64, limit);
}
