use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{entities::contact_me::ContactMeInsert, errors::AppError, repositories::sqlx_repo::SqlxContactMeRepo};

/// Contact submissions are append-only; the store stamps `created_at`.
#[async_trait]
pub trait ContactMeRepository: Send + Sync {
    async fn create_contact_message(&self, msg: &ContactMeInsert) -> Result<Uuid, AppError>;
}

#[async_trait]
impl<T: ContactMeRepository + ?Sized> ContactMeRepository for Arc<T> {
    async fn create_contact_message(&self, msg: &ContactMeInsert) -> Result<Uuid, AppError> {
        (**self).create_contact_message(msg).await
    }
}

impl SqlxContactMeRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxContactMeRepo { pool }
    }
}

#[async_trait]
impl ContactMeRepository for SqlxContactMeRepo {
    async fn create_contact_message(&self, msg: &ContactMeInsert) -> Result<Uuid, AppError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO contact_messages (name, email, project_type, message)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&msg.name)
        .bind(&msg.email)
        .bind(msg.project_type.as_str())
        .bind(&msg.message)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }
}
