use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::watch;

use crate::entities::skill::Skill;

#[derive(Clone)]
pub struct SqlxUserRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxContactMeRepo {
    pub pool: PgPool,
}

/// Postgres-backed skill collection. Snapshots are published on `snapshots`
/// by the change feed whenever the `skills` table changes.
#[derive(Clone)]
pub struct SqlxSkillRepo {
    pub pool: PgPool,
    pub snapshots: Arc<watch::Sender<Vec<Skill>>>,
}
