use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::{sync::watch, task::JoinHandle};
use uuid::Uuid;

use crate::{
    entities::{
        category::{count_in_category, derive_categories, CategorySummary},
        skill::{Skill, SkillForm, SkillView},
    },
    errors::{AppError, CatalogError},
    repositories::skill::SkillRepository,
    use_cases::in_flight::{CommandKey, InFlight, InFlightGuard},
};

/// Answers the confirmation prompt of a destructive command.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// A decision taken before the prompt was shown, e.g. `?confirm=true`.
impl Confirm for bool {
    fn confirm(&self, _prompt: &str) -> bool {
        *self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormState {
    pub visible: bool,
    pub editing_id: Option<Uuid>,
    pub draft: SkillForm,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogView {
    pub categories: Vec<CategorySummary>,
    pub selected_category: Option<String>,
    pub skills: Vec<SkillView>,
    pub total_skills: usize,
    pub form: FormState,
    pub empty_hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SkillSaved {
    Created { id: Uuid },
    Updated { id: Uuid },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeleteOutcome {
    Deleted { removed: u64 },
    Declined { prompt: String },
}

struct CatalogState {
    baseline: Vec<String>,
    records: Vec<Skill>,
    categories: Vec<String>,
    selected: Option<String>,
    form: FormState,
}

impl CatalogState {
    fn new(baseline: Vec<String>) -> Self {
        let categories = derive_categories(&baseline, &[]);
        let selected = categories.first().cloned();
        CatalogState {
            baseline,
            records: Vec::new(),
            categories,
            selected,
            form: FormState::default(),
        }
    }

    fn recompute(&mut self) {
        self.categories = derive_categories(&self.baseline, &self.records);
    }

    fn reconcile_selection(&mut self) {
        let keep = match &self.selected {
            Some(selected) => self.categories.contains(selected),
            None => false,
        };
        if !keep {
            self.selected = self.categories.first().cloned();
        }
    }

    fn reset_form(&mut self) {
        self.form = FormState::default();
    }
}

/// Releases the live snapshot subscription when dropped.
pub struct SnapshotSubscription {
    task: JoinHandle<()>,
}

impl SnapshotSubscription {
    pub fn close(self) {}

    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for SnapshotSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn store_failure(operation: &'static str) -> impl FnOnce(AppError) -> CatalogError {
    move |err| {
        tracing::error!(operation, error = %err, "Skill store operation failed");
        CatalogError::from(err)
    }
}

/// Categorized view over the remote skill collection.
///
/// The local record list always mirrors the latest snapshot pushed by the
/// store; writes go straight to the store and become visible through the
/// next snapshot. View-state sits behind one lock that is never held across
/// an `.await`.
pub struct SkillCatalog<R: SkillRepository> {
    repo: R,
    state: Mutex<CatalogState>,
    in_flight: InFlight,
    version: watch::Sender<u64>,
}

impl<R: SkillRepository> SkillCatalog<R> {
    pub fn new(repo: R, baseline: Vec<String>) -> Self {
        let (version, _) = watch::channel(0);
        SkillCatalog {
            repo,
            state: Mutex::new(CatalogState::new(baseline)),
            in_flight: InFlight::new(),
            version,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Subscribes to the store and applies every snapshot it pushes,
    /// starting with the current one.
    pub fn activate(self: &Arc<Self>) -> SnapshotSubscription
    where
        R: 'static,
    {
        let mut snapshots = self.repo.subscribe();
        let initial = snapshots.borrow_and_update().clone();
        self.apply_snapshot(initial);

        let catalog = Arc::clone(self);
        let task = tokio::spawn(async move {
            while snapshots.changed().await.is_ok() {
                let records = snapshots.borrow_and_update().clone();
                catalog.apply_snapshot(records);
            }
            tracing::debug!("Skill snapshot channel closed");
        });

        tracing::info!("Skill catalog subscribed to snapshots");
        SnapshotSubscription { task }
    }

    /// Replaces the local records with `records` and reconciles categories
    /// and selection against them.
    pub fn apply_snapshot(&self, records: Vec<Skill>) {
        let (count, selected) = {
            let mut state = self.state.lock();
            state.records = records;
            state.recompute();
            state.reconcile_selection();
            (state.records.len(), state.selected.clone())
        };

        tracing::debug!(records = count, selected = ?selected, "Applied skill snapshot");
        self.bump();
    }

    /// Version counter bumped on every view change.
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    fn bump(&self) {
        self.version.send_modify(|v| *v = v.wrapping_add(1));
    }

    pub fn categories(&self) -> Vec<String> {
        self.state.lock().categories.clone()
    }

    pub fn baseline(&self) -> Vec<String> {
        self.state.lock().baseline.clone()
    }

    pub fn selected_category(&self) -> Option<String> {
        self.state.lock().selected.clone()
    }

    pub fn records(&self) -> Vec<Skill> {
        self.state.lock().records.clone()
    }

    pub fn form(&self) -> FormState {
        self.state.lock().form.clone()
    }

    pub fn view(&self) -> CatalogView {
        let state = self.state.lock();

        let categories = state
            .categories
            .iter()
            .map(|name| {
                let skill_count = count_in_category(&state.records, name);
                CategorySummary {
                    name: name.clone(),
                    skill_count,
                    deletable: !(state.baseline.contains(name) && skill_count > 0),
                    selected: state.selected.as_deref() == Some(name.as_str()),
                }
            })
            .collect();

        let skills: Vec<SkillView> = match &state.selected {
            Some(selected) => state
                .records
                .iter()
                .filter(|r| &r.category == selected)
                .map(SkillView::from)
                .collect(),
            None => Vec::new(),
        };

        let empty_hint = match &state.selected {
            Some(selected) if skills.is_empty() => {
                Some(format!("No skills in \"{}\" yet. Add one!", selected))
            }
            None => Some("Select or create a category first.".to_string()),
            _ => None,
        };

        CatalogView {
            categories,
            selected_category: state.selected.clone(),
            skills,
            total_skills: state.records.len(),
            form: state.form.clone(),
            empty_hint,
        }
    }

    pub fn select_category(&self, name: &str) -> Result<(), CatalogError> {
        {
            let mut state = self.state.lock();
            if !state.categories.iter().any(|c| c == name) {
                return Err(CatalogError::Validation(format!("Unknown category \"{}\"", name)));
            }
            state.selected = Some(name.to_string());
            state.form.visible = false;
            state.form.editing_id = None;
        }
        self.bump();
        Ok(())
    }

    /// Shows an empty form for a new skill in the selected category.
    pub fn open_form(&self) -> Result<(), CatalogError> {
        {
            let mut state = self.state.lock();
            if state.selected.is_none() {
                return Err(CatalogError::Validation("Select or create a category first".into()));
            }
            state.form = FormState {
                visible: true,
                ..FormState::default()
            };
        }
        self.bump();
        Ok(())
    }

    /// Loads a record into the form and selects its category.
    pub fn begin_edit(&self, id: Uuid) -> Result<SkillForm, CatalogError> {
        let draft = {
            let mut state = self.state.lock();
            let record = state
                .records
                .iter()
                .find(|r| r.id == id)
                .cloned()
                .ok_or_else(|| CatalogError::NotFound(format!("Skill {} is not in the catalog", id)))?;

            let draft = SkillForm::from(&record);
            state.selected = Some(record.category);
            state.form = FormState {
                visible: true,
                editing_id: Some(id),
                draft: draft.clone(),
            };
            draft
        };
        self.bump();
        Ok(draft)
    }

    pub fn cancel_form(&self) {
        self.state.lock().reset_form();
        self.bump();
    }

    fn acquire(&self, key: CommandKey) -> Result<InFlightGuard, CatalogError> {
        self.in_flight.try_acquire(key.clone()).ok_or_else(|| {
            tracing::warn!(command = %key, "Rejected duplicate command while one is in flight");
            CatalogError::CommandInFlight(key.to_string())
        })
    }

    /// Creates a skill in the selected category, or replaces the record
    /// being edited. The form is kept on failure so it can be resubmitted.
    pub async fn submit_skill(&self, form: SkillForm) -> Result<SkillSaved, CatalogError> {
        let editing_id = self.state.lock().form.editing_id;
        let key = editing_id.map(CommandKey::Skill).unwrap_or(CommandKey::NewSkill);
        // A rejected duplicate must not touch the draft of the pending submit.
        let _guard = self.acquire(key)?;

        let category = {
            let mut state = self.state.lock();
            state.form.visible = true;
            state.form.draft = form.clone();
            state.selected.clone()
        };
        self.bump();

        let category = category
            .ok_or_else(|| CatalogError::Validation("Select or create a category first".into()))?;
        let insert = form.normalize(&category)?;

        let saved = match editing_id {
            Some(id) => {
                self.repo
                    .update_skill(&id, &insert)
                    .await
                    .map_err(store_failure("update_skill"))?;
                SkillSaved::Updated { id }
            }
            None => {
                let id = self.repo
                    .create_skill(&insert)
                    .await
                    .map_err(store_failure("create_skill"))?;
                SkillSaved::Created { id }
            }
        };

        tracing::info!(outcome = ?saved, category = %insert.category, level = insert.level, "Saved skill");
        self.cancel_form();
        Ok(saved)
    }

    pub fn delete_skill_prompt(&self, id: &Uuid) -> String {
        let state = self.state.lock();
        match state.records.iter().find(|r| r.id == *id) {
            Some(record) => format!("Delete the skill \"{}\"? This cannot be undone.", record.name),
            None => "Delete this skill? This cannot be undone.".to_string(),
        }
    }

    /// Deletes one record. The local list is left alone; the next snapshot
    /// removes it.
    pub async fn delete_skill(&self, id: Uuid, confirm: &dyn Confirm) -> Result<DeleteOutcome, CatalogError> {
        let prompt = self.delete_skill_prompt(&id);
        if !confirm.confirm(&prompt) {
            tracing::debug!(skill = %id, "Skill deletion declined");
            return Ok(DeleteOutcome::Declined { prompt });
        }

        let _guard = self.acquire(CommandKey::Skill(id))?;

        self.repo
            .delete_skill(&id)
            .await
            .map_err(store_failure("delete_skill"))?;

        tracing::info!(skill = %id, "Deleted skill");
        Ok(DeleteOutcome::Deleted { removed: 1 })
    }

    pub fn delete_category_prompt(name: &str) -> String {
        format!("Delete the category \"{}\" and all of its skills?", name)
    }

    /// Removes every skill filed under `name` in one atomic batch. A
    /// category without skills matches nothing, so no store write happens.
    pub async fn delete_category(&self, name: &str, confirm: &dyn Confirm) -> Result<DeleteOutcome, CatalogError> {
        let prompt = Self::delete_category_prompt(name);
        if !confirm.confirm(&prompt) {
            tracing::debug!(category = name, "Category deletion declined");
            return Ok(DeleteOutcome::Declined { prompt });
        }

        let _guard = self.acquire(CommandKey::Category(name.to_string()))?;

        let ids = self.repo
            .list_skill_ids_by_category(name)
            .await
            .map_err(store_failure("list_skill_ids_by_category"))?;

        let removed = if ids.is_empty() {
            0
        } else {
            self.repo
                .delete_skills_batch(&ids)
                .await
                .map_err(store_failure("delete_skills_batch"))?
        };

        {
            let mut state = self.state.lock();
            if state.selected.as_deref() == Some(name) {
                state.selected = state.categories.iter().find(|c| *c != name).cloned();
            }
        }
        self.bump();

        tracing::info!(category = name, removed, "Deleted category");
        Ok(DeleteOutcome::Deleted { removed })
    }

    /// Declares a category for the lifetime of this catalog and selects it.
    pub fn add_category(&self, name: &str) -> Result<(), CatalogError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CatalogError::Validation("Category name is required".into()));
        }

        {
            let mut state = self.state.lock();
            if state.categories.iter().any(|c| c == name) {
                return Err(CatalogError::Validation(format!("Category \"{}\" already exists", name)));
            }
            state.baseline.push(name.to_string());
            state.recompute();
            state.selected = Some(name.to_string());
        }

        tracing::info!(category = name, "Declared category");
        self.bump();
        Ok(())
    }
}
