use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Baseline categories of a fresh catalog.
pub const DEFAULT_CATEGORIES: [&str; 3] = ["Frontend", "Backend", "Habilidades Blandas"];

/// Postgres channel the `skills` trigger notifies on every change.
pub const SKILLS_CHANGED_CHANNEL: &str = "skills_changed";

pub const ACCESS_DENY_PREFIX: &str = "access_deny";
