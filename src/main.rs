use actix_cors::Cors;
use actix_web::{http::header, middleware::NormalizePath, web, App, HttpServer};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, EnvFilter};

use kittycode_backend::{
    background_task::start_housekeeping_task,
    graceful_shutdown::shutdown_signal,
    middlewares::auth::AuthMiddleware,
    routes::configure_routes,
    settings::AppConfig,
    AppState,
};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_target(true);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn cors_for(origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600);

    if origins.iter().any(|o| o == "*") {
        return cors.allow_any_origin();
    }
    origins.iter().fold(cors, |cors, origin| cors.allowed_origin(origin))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = match AppConfig::new() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(config.is_production());
    tracing::info!("Loaded configuration: {:?}", config);

    let (state, change_feed) = match AppState::build(&config).await {
        Ok(built) => built,
        Err(e) => {
            tracing::error!("Startup failed: {:#}", e);
            std::process::exit(1);
        }
    };

    let subscription = state.catalog.activate();
    let housekeeping = tokio::spawn(start_housekeeping_task(
        state.local_revocations.clone(),
        state.contact_limiter.clone(),
    ));

    let app_state = web::Data::new(state);
    let origins = config.cors_origins();
    let server_addr = format!("{}:{}", config.host, config.port);

    tracing::info!(
        "🚀 Starting {} v{} on {}",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(AuthMiddleware)
            .wrap(NormalizePath::trim())
            .wrap(cors_for(&origins))
            .wrap(TracingLogger::default())
            .configure(configure_routes)
    })
    .workers(config.worker_count.max(1))
    .bind(server_addr)?
    .run();

    let result = tokio::select! {
        res = server => res,
        _ = shutdown_signal() => Ok(()),
    };

    subscription.close();
    housekeeping.abort();
    if let Some(feed) = change_feed {
        feed.abort();
    }
    tracing::info!("Server stopped");

    result
}
