use std::time::Duration;

use sqlx::postgres::PgListener;
use tokio::task::JoinHandle;

use crate::{constants::SKILLS_CHANGED_CHANNEL, errors::AppError, repositories::sqlx_repo::SqlxSkillRepo};

const RELISTEN_DELAY: Duration = Duration::from_secs(1);

/// Publishes a fresh snapshot of `skills` on every `skills_changed`
/// notification. The initial snapshot is published before this returns.
pub async fn start_skill_change_feed(repo: SqlxSkillRepo) -> Result<JoinHandle<()>, AppError> {
    let mut listener = PgListener::connect_with(&repo.pool).await?;
    listener.listen(SKILLS_CHANGED_CHANNEL).await?;

    let count = repo.publish_snapshot().await?;
    tracing::info!(records = count, "Skill change feed started");

    let handle = tokio::spawn(async move {
        loop {
            match listener.recv().await {
                Ok(_) => match repo.publish_snapshot().await {
                    Ok(count) => tracing::debug!(records = count, "Published skill snapshot"),
                    Err(e) => tracing::error!("Failed to reload skills after change: {}", e),
                },
                Err(e) => {
                    // PgListener reconnects on the next recv; re-read to cover the gap.
                    tracing::warn!("Skill change feed interrupted: {}", e);
                    tokio::time::sleep(RELISTEN_DELAY).await;
                    if let Err(e) = repo.publish_snapshot().await {
                        tracing::error!("Failed to reload skills after reconnect: {}", e);
                    }
                }
            }
        }
    });

    Ok(handle)
}
