mod test_utils;

use reqwest::StatusCode;
use serde_json::{json, Value};
use test_utils::*;

#[actix_rt::test]
async fn skills_routes_require_authentication() {
    let app = TestApp::spawn().await;

    let response = app.client
        .get(app.url("/api/v1/skills"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn catalog_view_lists_default_categories() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let response = app.client
        .get(app.url("/api/v1/skills"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let view: Value = response.json().await.unwrap();
    let names: Vec<&str> = view["categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Frontend", "Backend", "Habilidades Blandas"]);
    assert_eq!(view["selected_category"], "Frontend");
}

#[actix_rt::test]
async fn create_and_edit_skill_over_http() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let response = app.client
        .put(app.url("/api/v1/skills/selection"))
        .bearer_auth(&token)
        .json(&json!({ "categoria": "Backend" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.client
        .post(app.url("/api/v1/skills"))
        .bearer_auth(&token)
        .json(&json!({ "nombre": "Testing", "descripcion": "Integration", "nivel": "40" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["outcome"], "created");
    let id = created["id"].as_str().unwrap().to_string();

    let catalog = app.state.catalog.clone();
    eventually(|| catalog.view().skills.len() == 1).await;

    let view: Value = app.client
        .get(app.url("/api/v1/skills"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["skills"][0]["nombre"], "Testing");
    assert_eq!(view["skills"][0]["progress"], "40%");

    let response = app.client
        .post(app.url(&format!("/api/v1/skills/{}/edit", id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let form: Value = response.json().await.unwrap();
    assert_eq!(form["editing_id"], id.as_str());

    let response = app.client
        .post(app.url("/api/v1/skills"))
        .bearer_auth(&token)
        .json(&json!({ "nombre": "Testing", "descripcion": "Integration", "nivel": 200 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    eventually(|| catalog.records().first().map(|r| r.level) == Some(100)).await;
    assert_eq!(app.skills.records()[0].level, 100);
}

#[actix_rt::test]
async fn blank_name_is_a_bad_request() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let response = app.client
        .post(app.url("/api/v1/skills"))
        .bearer_auth(&token)
        .json(&json!({ "nombre": "   ", "nivel": 10 }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
    assert!(app.skills.records().is_empty());
}

#[actix_rt::test]
async fn delete_without_confirmation_asks_first() {
    let app = TestApp::spawn_with(test_config(), vec![
        skill("Actix", 70, "Backend"),
        skill("Postgres", 60, "Backend"),
        skill("React", 80, "Frontend"),
    ]).await;
    let token = app.admin_token().await;

    let response = app.client
        .delete(app.url("/api/v1/categories/Backend"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PRECONDITION_REQUIRED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "confirmation_required");
    assert_eq!(app.skills.records().len(), 3);

    let response = app.client
        .delete(app.url("/api/v1/categories/Backend?confirm=true"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["outcome"], "deleted");
    assert_eq!(body["removed"], 2);
    assert_eq!(app.skills.records().len(), 1);
}

#[actix_rt::test]
async fn delete_single_skill_with_confirmation() {
    let record = skill("Figma", 50, "Design");
    let id = record.id;
    let app = TestApp::spawn_with(test_config(), vec![record]).await;
    let token = app.admin_token().await;

    let response = app.client
        .delete(app.url(&format!("/api/v1/skills/{}?confirm=true", id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.skills.records().is_empty());

    let response = app.client
        .delete(app.url(&format!("/api/v1/skills/{}?confirm=true", id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn malformed_skill_id_is_rejected() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let response = app.client
        .delete(app.url("/api/v1/skills/not-a-uuid?confirm=true"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn add_category_rejects_duplicates() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let response = app.client
        .post(app.url("/api/v1/categories"))
        .bearer_auth(&token)
        .json(&json!({ "nombre": "DevOps" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let view: Value = response.json().await.unwrap();
    assert_eq!(view["selected_category"], "DevOps");

    let response = app.client
        .post(app.url("/api/v1/categories"))
        .bearer_auth(&token)
        .json(&json!({ "nombre": "Frontend" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.state.catalog.selected_category().as_deref(), Some("DevOps"));
}

#[actix_rt::test]
async fn stream_starts_with_current_view() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let mut response = app.client
        .get(app.url("/api/v1/skills/stream"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/event-stream");

    let chunk = response.chunk().await.unwrap().unwrap();
    let frame = String::from_utf8(chunk.to_vec()).unwrap();
    assert!(frame.starts_with("event: catalog\ndata: "));
    assert!(frame.contains("\"selected_category\":\"Frontend\""));
}
