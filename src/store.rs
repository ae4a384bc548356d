//! Scenario persistence seam.
//!
//! [`ScenarioStore`] is the contract any storage backend must honor: create
//! from a raw draft, fetch, patch one field at a time, delete. Each inline
//! edit is an independent partial update that revalidates the whole record,
//! so a stored scenario is always valid. [`MemoryStore`] is the bundled
//! backend; anything durable lives behind the same trait.

use std::collections::BTreeMap;

use tracing::{debug, info};
use uuid::Uuid;

use crate::scenario::{DraftError, Scenario, ScenarioDraft, ValidationErrors, validate};

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("scenario {0} not found")]
    NotFound(Uuid),

    /// The draft (or the record after an edit) violates the model invariants.
    #[error("validation failed: {0}")]
    Invalid(#[from] ValidationErrors),

    /// Bad field name or mistyped value in a partial update.
    #[error(transparent)]
    Field(#[from] DraftError),
}

/// Storage contract for scenarios.
pub trait ScenarioStore {
    /// Validate and persist a new scenario from a raw draft. A draft without
    /// an id gets a fresh one.
    fn create(&mut self, draft: ScenarioDraft) -> Result<Scenario, StoreError>;

    fn get(&self, id: Uuid) -> Result<Scenario, StoreError>;

    /// All scenarios, ordered by id.
    fn list(&self) -> Vec<Scenario>;

    /// Apply a single-field edit, revalidate, and persist. The stored record
    /// is unchanged when the edit fails.
    fn update_field(
        &mut self,
        id: Uuid,
        field: &str,
        value: serde_json::Value,
    ) -> Result<Scenario, StoreError>;

    fn delete(&mut self, id: Uuid) -> Result<(), StoreError>;
}

/// In-memory scenario store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    scenarios: BTreeMap<Uuid, Scenario>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

impl ScenarioStore for MemoryStore {
    fn create(&mut self, draft: ScenarioDraft) -> Result<Scenario, StoreError> {
        let scenario = validate(&draft)?;
        info!(id = %scenario.id, project = %scenario.project_name, "scenario created");
        self.scenarios.insert(scenario.id, scenario.clone());
        Ok(scenario)
    }

    fn get(&self, id: Uuid) -> Result<Scenario, StoreError> {
        self.scenarios
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    fn list(&self) -> Vec<Scenario> {
        self.scenarios.values().cloned().collect()
    }

    fn update_field(
        &mut self,
        id: Uuid,
        field: &str,
        value: serde_json::Value,
    ) -> Result<Scenario, StoreError> {
        let current = self.scenarios.get(&id).ok_or(StoreError::NotFound(id))?;

        let mut draft = current.to_draft();
        draft.set_field(field, value)?;
        let updated = validate(&draft)?;

        debug!(id = %id, field, "scenario field updated");
        self.scenarios.insert(id, updated.clone());
        Ok(updated)
    }

    fn delete(&mut self, id: Uuid) -> Result<(), StoreError> {
        match self.scenarios.remove(&id) {
            Some(_) => {
                info!(id = %id, "scenario deleted");
                Ok(())
            }
            None => Err(StoreError::NotFound(id)),
        }
    }
}
