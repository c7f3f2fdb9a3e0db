//! In-process stores, used when no database is configured and by the tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tokio::sync::watch;
use uuid::Uuid;

use crate::{
    entities::{
        contact_me::{ContactMeInsert, ContactMeMessage},
        skill::{Skill, SkillInsert},
        user::{User, UserInsert},
    },
    errors::AppError,
    repositories::{contact_me::ContactMeRepository, skill::SkillRepository, user::UserRepository},
};

/// Skill collection kept in insertion order. Every mutation publishes the
/// full snapshot while the write lock is held, so subscribers observe
/// mutations in the order they were applied.
#[derive(Clone)]
pub struct InMemorySkillRepo {
    records: Arc<RwLock<Vec<Skill>>>,
    snapshots: Arc<watch::Sender<Vec<Skill>>>,
}

impl Default for InMemorySkillRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySkillRepo {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    pub fn with_records(records: Vec<Skill>) -> Self {
        let (tx, _) = watch::channel(records.clone());
        InMemorySkillRepo {
            records: Arc::new(RwLock::new(records)),
            snapshots: Arc::new(tx),
        }
    }

    pub fn records(&self) -> Vec<Skill> {
        self.records.read().clone()
    }

    fn publish(&self, records: &[Skill]) {
        self.snapshots.send_replace(records.to_vec());
    }
}

#[async_trait]
impl SkillRepository for InMemorySkillRepo {
    async fn check_connection(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn create_skill(&self, skill: &SkillInsert) -> Result<Uuid, AppError> {
        let now = Utc::now();
        let record = Skill {
            id: Uuid::new_v4(),
            name: skill.name.clone(),
            description: skill.description.clone(),
            level: skill.level,
            category: skill.category.clone(),
            created_at: now,
            updated_at: now,
        };
        let id = record.id;

        let mut records = self.records.write();
        records.push(record);
        self.publish(&records);

        Ok(id)
    }

    async fn update_skill(&self, id: &Uuid, skill: &SkillInsert) -> Result<(), AppError> {
        let mut records = self.records.write();
        let record = records
            .iter_mut()
            .find(|r| r.id == *id)
            .ok_or_else(|| AppError::NotFound("Skill not found".into()))?;

        record.name = skill.name.clone();
        record.description = skill.description.clone();
        record.level = skill.level;
        record.category = skill.category.clone();
        record.updated_at = Utc::now();

        self.publish(&records);
        Ok(())
    }

    async fn delete_skill(&self, id: &Uuid) -> Result<(), AppError> {
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|r| r.id != *id);

        if records.len() == before {
            return Err(AppError::NotFound("Skill not found".into()));
        }

        self.publish(&records);
        Ok(())
    }

    async fn list_skill_ids_by_category(&self, category: &str) -> Result<Vec<Uuid>, AppError> {
        Ok(self
            .records
            .read()
            .iter()
            .filter(|r| r.category == category)
            .map(|r| r.id)
            .collect())
    }

    async fn delete_skills_batch(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut records = self.records.write();
        let before = records.len();
        records.retain(|r| !ids.contains(&r.id));
        let removed = (before - records.len()) as u64;

        if removed > 0 {
            self.publish(&records);
        }
        Ok(removed)
    }

    fn subscribe(&self) -> watch::Receiver<Vec<Skill>> {
        self.snapshots.subscribe()
    }
}

#[derive(Clone, Default)]
pub struct InMemoryContactMeRepo {
    messages: Arc<RwLock<Vec<ContactMeMessage>>>,
}

impl InMemoryContactMeRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<ContactMeMessage> {
        self.messages.read().clone()
    }
}

#[async_trait]
impl ContactMeRepository for InMemoryContactMeRepo {
    async fn create_contact_message(&self, msg: &ContactMeInsert) -> Result<Uuid, AppError> {
        let message = ContactMeMessage {
            id: Uuid::new_v4(),
            name: msg.name.clone(),
            email: msg.email.clone(),
            project_type: msg.project_type.as_str().to_string(),
            message: msg.message.clone(),
            created_at: Utc::now(),
        };
        let id = message.id;

        self.messages.write().push(message);
        Ok(id)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryUserRepo {
    users: Arc<RwLock<Vec<User>>>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepo {
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = email.trim().to_lowercase();
        Ok(self.users.read().iter().find(|u| u.email == email).cloned())
    }

    async fn get_user_by_id(&self, id: &Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.read().iter().find(|u| u.id == *id).cloned())
    }

    async fn create_user(&self, user: &UserInsert) -> Result<Uuid, AppError> {
        let mut users = self.users.write();
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("User with this email already exists".to_string()));
        }

        let record = User {
            id: Uuid::new_v4(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            password_hash: user.password_hash.clone(),
            provider: user.provider.as_str().to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        };
        let id = record.id;
        users.push(record);

        Ok(id)
    }
}
