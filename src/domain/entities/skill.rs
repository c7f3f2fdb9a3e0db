use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::errors::CatalogError;

pub const MIN_LEVEL: i16 = 0;
pub const MAX_LEVEL: i16 = 100;

/// A skill record as held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Skill {
    pub id: Uuid,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "nivel")]
    pub level: i16,
    #[serde(rename = "categoria")]
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Normalized field set written on create and on full-field update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillInsert {
    pub name: String,
    pub description: String,
    pub level: i16,
    pub category: String,
}

/// Level as typed into the form: either a JSON number or numeric text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LevelInput {
    Number(f64),
    Text(String),
}

impl LevelInput {
    /// Coerces the input to a number. Blank text counts as zero.
    pub fn coerce(&self) -> Result<f64, CatalogError> {
        match self {
            LevelInput::Number(value) => Ok(*value),
            LevelInput::Text(text) if text.trim().is_empty() => Ok(0.0),
            LevelInput::Text(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| CatalogError::Validation(format!("Level must be a number, got \"{}\"", text))),
        }
    }
}

impl From<i16> for LevelInput {
    fn from(value: i16) -> Self {
        LevelInput::Number(value as f64)
    }
}

impl From<i32> for LevelInput {
    fn from(value: i32) -> Self {
        LevelInput::Number(value as f64)
    }
}

impl From<f64> for LevelInput {
    fn from(value: f64) -> Self {
        LevelInput::Number(value)
    }
}

impl From<&str> for LevelInput {
    fn from(value: &str) -> Self {
        LevelInput::Text(value.to_string())
    }
}

/// Rounds and clamps a level into `[MIN_LEVEL, MAX_LEVEL]`.
pub fn clamp_level(value: f64) -> i16 {
    if value.is_nan() {
        return MIN_LEVEL;
    }
    value.round().clamp(MIN_LEVEL as f64, MAX_LEVEL as f64) as i16
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// The add/edit form as submitted by the panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct SkillForm {
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank", message = "Name is required"))]
    pub nombre: String,

    #[serde(default)]
    pub descripcion: Option<String>,

    #[serde(default)]
    pub nivel: Option<LevelInput>,
}

impl SkillForm {
    pub fn new(nombre: impl Into<String>, descripcion: impl Into<String>, nivel: impl Into<LevelInput>) -> Self {
        SkillForm {
            nombre: nombre.into(),
            descripcion: Some(descripcion.into()),
            nivel: Some(nivel.into()),
        }
    }

    /// Validates the form and produces the record to write under `category`.
    pub fn normalize(&self, category: &str) -> Result<SkillInsert, CatalogError> {
        self.validate()?;

        let level = match &self.nivel {
            Some(input) => clamp_level(input.coerce()?),
            None => MIN_LEVEL,
        };

        Ok(SkillInsert {
            name: self.nombre.trim().to_string(),
            description: self.descripcion.clone().unwrap_or_default(),
            level,
            category: category.to_string(),
        })
    }
}

impl From<&Skill> for SkillForm {
    fn from(skill: &Skill) -> Self {
        SkillForm {
            nombre: skill.name.clone(),
            descripcion: Some(skill.description.clone()),
            nivel: Some(LevelInput::from(skill.level)),
        }
    }
}

/// A skill as rendered in the panel's list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillView {
    pub id: Uuid,
    pub nombre: String,
    pub descripcion: String,
    pub nivel: i16,
    /// Width of the level bar, e.g. `"40%"`.
    pub progress: String,
}

impl From<&Skill> for SkillView {
    fn from(skill: &Skill) -> Self {
        SkillView {
            id: skill.id,
            nombre: skill.name.clone(),
            descripcion: skill.description.clone(),
            nivel: skill.level,
            progress: format!("{}%", skill.level),
        }
    }
}
