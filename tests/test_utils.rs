#![allow(dead_code)]

use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use chrono::Utc;
use kittycode_backend::{
    entities::{skill::Skill, token::AuthResponse, user::LoginUser},
    middlewares::auth::AuthMiddleware,
    repositories::memory::{InMemoryContactMeRepo, InMemorySkillRepo, InMemoryUserRepo},
    routes::configure_routes,
    settings::{AppConfig, AppEnvironment},
    use_cases::skill_catalog::SnapshotSubscription,
    AppState, Stores,
};
use reqwest::Client;
use std::{net::TcpListener, sync::Arc, time::Duration};
use uuid::Uuid;

pub const ADMIN_EMAIL: &str = "admin@kittycode.dev";
pub const ADMIN_PASSWORD: &str = "AdminPass123!";

pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub state: web::Data<AppState>,
    pub skills: InMemorySkillRepo,
    pub contacts: InMemoryContactMeRepo,
    pub config: AppConfig,
    _subscription: SnapshotSubscription,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(test_config(), Vec::new()).await
    }

    pub async fn spawn_with(config: AppConfig, records: Vec<Skill>) -> Self {
        let skills = InMemorySkillRepo::with_records(records);
        let contacts = InMemoryContactMeRepo::new();

        let stores = Stores {
            skills: Arc::new(skills.clone()),
            contacts: Arc::new(contacts.clone()),
            users: Arc::new(InMemoryUserRepo::new()),
        };

        let state = AppState::with_stores(&config, stores, None);
        state.bootstrap_admin(&config).await.expect("Failed to create admin user");
        let subscription = state.catalog.activate();
        let state = web::Data::new(state);

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let server_state = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(server_state.clone())
                .wrap(AuthMiddleware)
                .wrap(NormalizePath::trim())
                .configure(configure_routes)
        })
        .listen(listener)
        .expect("Failed to bind server")
        .workers(1)
        .run();

        tokio::spawn(server);

        let client = Client::new();
        while client.get(&address).send().await.is_err() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        Self {
            address,
            client,
            state,
            skills,
            contacts,
            config,
            _subscription: subscription,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/v1/auth/login"))
            .json(&LoginUser { email: email.into(), password: password.into() })
            .send()
            .await
            .expect("Failed to send login request")
    }

    pub async fn admin_token(&self) -> String {
        let response = self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            panic!("Login failed: ({}): {}", status, body);
        }

        let auth: AuthResponse = response.json().await.expect("Failed to parse login response");
        auth.access_token
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        env: AppEnvironment::Testing,
        name: "KittyCode-API Test".to_string(),
        port: 0,
        host: "127.0.0.1".to_string(),
        worker_count: 1,
        database_url: String::new(),
        redis_url: None,
        cors_allowed_origins: vec!["*".to_string()],
        jwt_secret: "test_jwt_secret_that_is_long_enough_for_hs512_1234567890".into(),
        jwt_expiration_minutes: 5,
        default_categories: vec!["Frontend".into(), "Backend".into(), "Habilidades Blandas".into()],
        google_client_id: None,
        google_tokeninfo_url: "http://127.0.0.1:9/tokeninfo".into(),
        admin_email: Some(ADMIN_EMAIL.into()),
        admin_password: Some(ADMIN_PASSWORD.into()),
        contact_rate_limit: 3,
        contact_rate_window_secs: 3600,
        trust_x_forwarded_for: false,
    }
}

pub fn baseline() -> Vec<String> {
    test_config().default_categories
}

pub fn skill(name: &str, level: i16, category: &str) -> Skill {
    let now = Utc::now();
    Skill {
        id: Uuid::new_v4(),
        name: name.into(),
        description: format!("{} description", name),
        level,
        category: category.into(),
        created_at: now,
        updated_at: now,
    }
}

/// Polls `check` until it holds; snapshots are applied on a spawned task.
pub async fn eventually(mut check: impl FnMut() -> bool) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition was not reached in time");
}
