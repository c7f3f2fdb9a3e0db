use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use uuid::Uuid;

use crate::{
    entities::skill::{Skill, SkillInsert},
    errors::AppError,
    repositories::sqlx_repo::SqlxSkillRepo,
};

const SKILL_COLUMNS: &str = "id, name, description, level, category, created_at, updated_at";

/// The remote skill collection.
#[async_trait]
pub trait SkillRepository: Send + Sync {
    async fn check_connection(&self) -> Result<(), AppError>;

    /// Adds a record; the store assigns its id.
    async fn create_skill(&self, skill: &SkillInsert) -> Result<Uuid, AppError>;

    /// Replaces every field of an existing record.
    async fn update_skill(&self, id: &Uuid, skill: &SkillInsert) -> Result<(), AppError>;

    async fn delete_skill(&self, id: &Uuid) -> Result<(), AppError>;

    async fn list_skill_ids_by_category(&self, category: &str) -> Result<Vec<Uuid>, AppError>;

    /// Deletes every listed record in one atomic batch and returns how many
    /// were removed. Either all deletions apply or none do.
    async fn delete_skills_batch(&self, ids: &[Uuid]) -> Result<u64, AppError>;

    /// Live subscription: the receiver always holds the full current snapshot.
    fn subscribe(&self) -> watch::Receiver<Vec<Skill>>;
}

#[async_trait]
impl<T: SkillRepository + ?Sized> SkillRepository for Arc<T> {
    async fn check_connection(&self) -> Result<(), AppError> {
        (**self).check_connection().await
    }

    async fn create_skill(&self, skill: &SkillInsert) -> Result<Uuid, AppError> {
        (**self).create_skill(skill).await
    }

    async fn update_skill(&self, id: &Uuid, skill: &SkillInsert) -> Result<(), AppError> {
        (**self).update_skill(id, skill).await
    }

    async fn delete_skill(&self, id: &Uuid) -> Result<(), AppError> {
        (**self).delete_skill(id).await
    }

    async fn list_skill_ids_by_category(&self, category: &str) -> Result<Vec<Uuid>, AppError> {
        (**self).list_skill_ids_by_category(category).await
    }

    async fn delete_skills_batch(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        (**self).delete_skills_batch(ids).await
    }

    fn subscribe(&self) -> watch::Receiver<Vec<Skill>> {
        (**self).subscribe()
    }
}

impl SqlxSkillRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        let (tx, _) = watch::channel(Vec::new());
        SqlxSkillRepo {
            pool,
            snapshots: Arc::new(tx),
        }
    }

    /// Reads the whole collection in creation order.
    pub async fn load_snapshot(&self) -> Result<Vec<Skill>, AppError> {
        let query = format!("SELECT {SKILL_COLUMNS} FROM skills ORDER BY created_at, id");
        sqlx::query_as::<_, Skill>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from)
    }

    /// Re-reads the collection and publishes it to every subscriber.
    pub async fn publish_snapshot(&self) -> Result<usize, AppError> {
        let records = self.load_snapshot().await?;
        let count = records.len();
        self.snapshots.send_replace(records);
        Ok(count)
    }
}

#[async_trait]
impl SkillRepository for SqlxSkillRepo {
    async fn check_connection(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(AppError::from)
    }

    async fn create_skill(&self, skill: &SkillInsert) -> Result<Uuid, AppError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO skills (name, description, level, category)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&skill.name)
        .bind(&skill.description)
        .bind(skill.level)
        .bind(&skill.category)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update_skill(&self, id: &Uuid, skill: &SkillInsert) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE skills
            SET name = $2, description = $3, level = $4, category = $5, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&skill.name)
        .bind(&skill.description)
        .bind(skill.level)
        .bind(&skill.category)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Skill not found".into()));
        }
        Ok(())
    }

    async fn delete_skill(&self, id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM skills WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Skill not found".into()));
        }
        Ok(())
    }

    async fn list_skill_ids_by_category(&self, category: &str) -> Result<Vec<Uuid>, AppError> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT id FROM skills WHERE category = $1 ORDER BY created_at, id"
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn delete_skills_batch(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        if ids.is_empty() {
            return Ok(0);
        }

        // One statement, so the trigger sends a single notification.
        let result = sqlx::query("DELETE FROM skills WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    fn subscribe(&self) -> watch::Receiver<Vec<Skill>> {
        self.snapshots.subscribe()
    }
}
