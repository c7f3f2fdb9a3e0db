use actix_web::{get, web, HttpResponse, Responder};
use redis::{AsyncCommands, RedisResult};
use humantime::format_duration;
use once_cell::sync::Lazy;
use chrono::Utc;
use parking_lot::RwLock;
use std::{
    time::Duration,
    sync::atomic::{AtomicI64, Ordering},
};
use sysinfo::System;
use serde::Serialize;
use crate::{constants::START_TIME, repositories::skill::SkillRepository, AppState};

const CACHE_SECS: i64 = 5;

#[derive(Serialize, Clone, Default)]
struct SystemInfo {
    os: String,
    kernel: String,
    hostname: String,
    cpu_count: usize,
    memory_total: String,
}

#[derive(Serialize, Clone, Default)]
struct HealthCheckResponse {
    status: String,
    uptime: String,
    timestamp: String,
    start_at: String,
    version: String,
    store: String,
    store_status: String,
    skill_count: usize,
    category_count: usize,
    redis_status: String,
    memory_usage: String,
    system: SystemInfo,
}

static LAST_CHECK: AtomicI64 = AtomicI64::new(0);
static CACHED_STATUS: Lazy<RwLock<HealthCheckResponse>> = Lazy::new(||
    RwLock::new(HealthCheckResponse::default())
);

async fn redis_status(state: &AppState) -> &'static str {
    let Some(pool) = &state.redis_pool else {
        return "Not configured";
    };

    match pool.get().await {
        Ok(mut conn) => {
            let result: RedisResult<String> = conn.ping().await;
            match result {
                Ok(pong) if pong == "PONG" => "OK",
                _ => "Unavailable",
            }
        }
        Err(_) => "Unavailable",
    }
}

async fn build_health_response(state: &AppState) -> HealthCheckResponse {
    let now_utc = Utc::now();
    let uptime_duration = now_utc.signed_duration_since(*START_TIME);
    let human_uptime = format_duration(Duration::from_secs(uptime_duration.num_seconds().max(0) as u64));

    let mut sys = System::new_all();
    sys.refresh_all();

    let system_info = SystemInfo {
        os: System::name().unwrap_or_else(|| "Unknown".to_string()),
        kernel: System::kernel_version().unwrap_or_else(|| "Unknown".to_string()),
        hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        cpu_count: sys.cpus().len(),
        memory_total: format!("{:.2} GB", sys.total_memory() as f64 / 1024.0 / 1024.0 / 1024.0),
    };

    let store_status = match state.catalog.repository().check_connection().await {
        Ok(_) => "OK",
        Err(e) => {
            tracing::warn!("Skill store health check failed: {}", e);
            "Unavailable"
        }
    };

    let process = sysinfo::get_current_pid().ok().and_then(|pid| sys.process(pid));
    let memory_usage = process.map_or("Unknown".to_string(), |p|
        format!("{:.2} MB", p.memory() as f64 / 1024.0 / 1024.0)
    );

    let status = if store_status == "OK" { "healthy" } else { "degraded" };

    HealthCheckResponse {
        status: status.to_string(),
        uptime: human_uptime.to_string(),
        timestamp: now_utc.to_rfc3339(),
        start_at: START_TIME.to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: if state.uses_database { "postgres" } else { "memory" }.to_string(),
        store_status: store_status.to_string(),
        skill_count: state.catalog.records().len(),
        category_count: state.catalog.categories().len(),
        redis_status: redis_status(state).await.to_string(),
        memory_usage,
        system: system_info,
    }
}

#[get("/health")]
pub async fn admin_health_check(state: web::Data<AppState>) -> impl Responder {
    let now = Utc::now().timestamp();
    let last = LAST_CHECK.load(Ordering::Relaxed);

    if now - last > CACHE_SECS {
        let response = build_health_response(&state).await;
        *CACHED_STATUS.write() = response.clone();
        LAST_CHECK.store(now, Ordering::Relaxed);
        return HttpResponse::Ok().json(response);
    }

    let cached = CACHED_STATUS.read().clone();
    HttpResponse::Ok().json(cached)
}
