use serde::{Deserialize, Serialize};

use crate::entities::skill::Skill;

/// Computes the ordered set of category names: the baseline first, in its
/// own order, then every record category not already listed, first-seen.
pub fn derive_categories(baseline: &[String], records: &[Skill]) -> Vec<String> {
    let mut categories: Vec<String> = Vec::with_capacity(baseline.len());

    let names = baseline
        .iter()
        .map(String::as_str)
        .chain(records.iter().map(|r| r.category.as_str()));

    for name in names {
        if !categories.iter().any(|c| c == name) {
            categories.push(name.to_string());
        }
    }

    categories
}

/// Number of records filed under `category`.
pub fn count_in_category(records: &[Skill], category: &str) -> usize {
    records.iter().filter(|r| r.category == category).count()
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCategoryForm {
    #[serde(default)]
    pub nombre: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategorySelection {
    pub categoria: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub name: String,
    pub skill_count: usize,
    /// Baseline categories are protected while they still hold skills.
    pub deletable: bool,
    pub selected: bool,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn skill(category: &str) -> Skill {
        let now = Utc::now();
        Skill {
            id: Uuid::new_v4(),
            name: "x".into(),
            description: String::new(),
            level: 0,
            category: category.into(),
            created_at: now,
            updated_at: now,
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn baseline_comes_first_then_first_seen() {
        let baseline = names(&["Frontend", "Backend"]);
        let records = vec![skill("DevOps"), skill("Backend"), skill("Design"), skill("DevOps")];

        assert_eq!(
            derive_categories(&baseline, &records),
            names(&["Frontend", "Backend", "DevOps", "Design"])
        );
    }

    #[test]
    fn empty_inputs_yield_empty_set() {
        assert!(derive_categories(&[], &[]).is_empty());
    }

    #[test]
    fn duplicate_baseline_entries_collapse() {
        let baseline = names(&["Frontend", "Frontend"]);

        assert_eq!(derive_categories(&baseline, &[]), names(&["Frontend"]));
    }
}
