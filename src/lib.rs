use std::{sync::Arc, time::Duration};

use deadpool_redis::{Config as RedisConfig, Pool as RedisPool, Runtime};
use tokio::task::JoinHandle;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, repositories, middlewares, routes};
pub use infrastructure::{auth, db, limiter, utils};

use auth::{
    federated::GoogleIdentityProvider,
    jwt::JwtService,
    revocation::{InMemoryRevocations, RedisRevocations, TokenRevocationStore},
};
use limiter::rate_limiter::SlidingWindowLimiter;
use repositories::{
    contact_me::ContactMeRepository,
    memory::{InMemoryContactMeRepo, InMemorySkillRepo, InMemoryUserRepo},
    skill::SkillRepository,
    sqlx_repo::{SqlxContactMeRepo, SqlxSkillRepo, SqlxUserRepo},
    user::UserRepository,
};
use settings::AppConfig;
use use_cases::{auth::AuthHandler, contact::ContactMeHandler, skill_catalog::SkillCatalog};

pub type AppSkillCatalog = SkillCatalog<Arc<dyn SkillRepository>>;
pub type AppContactHandler = ContactMeHandler<Arc<dyn ContactMeRepository>>;
pub type AppAuthHandler = AuthHandler<Arc<dyn UserRepository>, JwtService>;

/// The stores one `AppState` is wired to.
pub struct Stores {
    pub skills: Arc<dyn SkillRepository>,
    pub contacts: Arc<dyn ContactMeRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Stores {
            skills: Arc::new(InMemorySkillRepo::new()),
            contacts: Arc::new(InMemoryContactMeRepo::new()),
            users: Arc::new(InMemoryUserRepo::new()),
        }
    }
}

pub struct AppState {
    pub catalog: Arc<AppSkillCatalog>,
    pub contact_handler: AppContactHandler,
    pub auth_handler: AppAuthHandler,
    pub contact_limiter: SlidingWindowLimiter,
    /// Set when sign-outs are kept in process memory rather than Redis.
    pub local_revocations: Option<InMemoryRevocations>,
    pub redis_pool: Option<RedisPool>,
    pub trust_x_forwarded_for: bool,
    pub uses_database: bool,
}

impl AppState {
    /// Wires the state against Postgres when a database URL is configured,
    /// otherwise against the in-process stores. The returned handle, if
    /// any, drives the Postgres change feed.
    pub async fn build(config: &AppConfig) -> anyhow::Result<(Self, Option<JoinHandle<()>>)> {
        let (stores, change_feed) = if config.uses_database() {
            let pool = db::postgres::create_pool(&config.database_url).await?;
            db::postgres::run_migrations(&pool).await?;

            let skills = SqlxSkillRepo::new(pool.clone());
            let feed = db::change_feed::start_skill_change_feed(skills.clone()).await?;

            let stores = Stores {
                skills: Arc::new(skills),
                contacts: Arc::new(SqlxContactMeRepo::new(pool.clone())),
                users: Arc::new(SqlxUserRepo::new(pool)),
            };
            (stores, Some(feed))
        } else {
            tracing::warn!("No DATABASE_URL configured, using in-process stores");
            (Stores::in_memory(), None)
        };

        let redis_pool = config.redis_url.as_ref().and_then(|url| {
            RedisConfig::from_url(url.as_str())
                .create_pool(Some(Runtime::Tokio1))
                .map_err(|e| tracing::error!("Redis pool error: {}", e))
                .ok()
        });

        let state = Self::with_stores(config, stores, redis_pool);
        state.bootstrap_admin(config).await?;

        Ok((state, change_feed))
    }

    pub fn with_stores(config: &AppConfig, stores: Stores, redis_pool: Option<RedisPool>) -> Self {
        let local_revocations = redis_pool.is_none().then(InMemoryRevocations::new);
        let revocations: Arc<dyn TokenRevocationStore> = match (&redis_pool, &local_revocations) {
            (Some(pool), _) => Arc::new(RedisRevocations::new(pool.clone())),
            (None, local) => Arc::new(local.clone().unwrap_or_default()),
        };

        let jwt_service = JwtService::new(config, revocations);
        let auth_handler = AuthHandler::new(
            stores.users,
            jwt_service,
            GoogleIdentityProvider::from_config(config),
        );

        AppState {
            catalog: Arc::new(SkillCatalog::new(stores.skills, config.baseline_categories())),
            contact_handler: ContactMeHandler::new(stores.contacts),
            auth_handler,
            contact_limiter: SlidingWindowLimiter::new(
                config.contact_rate_limit,
                Duration::from_secs(config.contact_rate_window_secs),
            ),
            local_revocations,
            redis_pool,
            trust_x_forwarded_for: config.trust_x_forwarded_for,
            uses_database: config.uses_database(),
        }
    }

    /// Creates the configured administrator account on first start.
    pub async fn bootstrap_admin(&self, config: &AppConfig) -> Result<(), errors::AppError> {
        if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
            self.auth_handler.ensure_password_user(email, password).await?;
        }
        Ok(())
    }
}
