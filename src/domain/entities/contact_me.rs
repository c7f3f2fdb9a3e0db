use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::errors::AppError;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern compiles")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Web,
    App,
    Design,
    Other,
}

impl ProjectType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "web" => Some(ProjectType::Web),
            "app" => Some(ProjectType::App),
            "design" => Some(ProjectType::Design),
            "other" => Some(ProjectType::Other),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::Web => "web",
            ProjectType::App => "app",
            ProjectType::Design => "design",
            ProjectType::Other => "other",
        }
    }
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn validate_email_format(value: &str) -> Result<(), ValidationError> {
    if !EMAIL_RE.is_match(value) {
        return Err(ValidationError::new("email"));
    }
    Ok(())
}

fn validate_project_type(value: &str) -> Result<(), ValidationError> {
    ProjectType::parse(value)
        .map(|_| ())
        .ok_or_else(|| ValidationError::new("project_type"))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewContactMeForm {
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank", message = "Name is required"))]
    pub name: String,

    #[serde(default)]
    #[validate(custom(function = "validate_email_format", message = "Email is not valid"))]
    pub email: String,

    #[serde(default, rename = "projectType")]
    #[validate(custom(function = "validate_project_type", message = "Select a project type"))]
    pub project_type: String,

    #[serde(default)]
    #[validate(custom(function = "validate_not_blank", message = "Message is required"))]
    pub message: String,
}

/// Validated contact submission ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactMeInsert {
    pub name: String,
    pub email: String,
    pub project_type: ProjectType,
    pub message: String,
}

impl TryFrom<NewContactMeForm> for ContactMeInsert {
    type Error = AppError;

    fn try_from(form: NewContactMeForm) -> Result<Self, Self::Error> {
        let project_type = ProjectType::parse(&form.project_type)
            .ok_or_else(|| AppError::InvalidInput("Unknown project type".into()))?;

        Ok(ContactMeInsert {
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            project_type,
            message: form.message.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ContactMeMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(rename = "projectType")]
    pub project_type: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContactMeResponse {
    pub message: String,
    pub id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(email: &str, project_type: &str) -> NewContactMeForm {
        NewContactMeForm {
            name: " Ana ".into(),
            email: email.into(),
            project_type: project_type.into(),
            message: "Need a landing page".into(),
        }
    }

    #[test]
    fn accepts_known_project_types_only() {
        assert!(form("ana@example.com", "design").validate().is_ok());
        assert!(form("ana@example.com", "Design").validate().is_err());
        assert!(form("ana@example.com", "").validate().is_err());
    }

    #[test]
    fn email_needs_domain_and_tld() {
        assert!(form("ana@example", "web").validate().is_err());
        assert!(form("ana.example.com", "web").validate().is_err());
        assert!(form("ana@example.com", "web").validate().is_ok());
    }

    #[test]
    fn email_with_surrounding_whitespace_is_rejected() {
        assert!(form(" ana@example.com", "web").validate().is_err());
        assert!(form("ana@example.com ", "web").validate().is_err());
    }

    #[test]
    fn insert_trims_fields() {
        let insert = ContactMeInsert::try_from(form("ana@example.com", "app")).unwrap();
        assert_eq!(insert.name, "Ana");
        assert_eq!(insert.email, "ana@example.com");
        assert_eq!(insert.project_type, ProjectType::App);
    }
}
