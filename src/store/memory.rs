//! In-process [`PlanStore`] for tests and dry runs.
//!
//! Mirrors the remote store's observable behavior: monotonically increasing
//! opaque ids, find-or-create suite matching by normalized name, and one root
//! suite per plan. Failure injection toggles let tests exercise the
//! per-feature and per-scenario error paths.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::import::suites::normalize_suite_name;
use crate::models::{PlanHandle, PlanSummary};
use crate::store::{PlanStore, StoreError};

#[derive(Debug, Clone)]
pub struct StoredSuite {
    pub id: i64,
    pub plan_id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct StoredCase {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub steps_xml: Option<String>,
    pub params_xml: Option<String>,
}

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    plans: Vec<(PlanSummary, i64)>,
    suites: Vec<StoredSuite>,
    cases: Vec<StoredCase>,
    /// (suite_id, case_id) memberships.
    memberships: Vec<(i64, i64)>,
    refuse_suites: bool,
    failing_case_titles: HashSet<String>,
}

impl State {
    fn mint_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent suite creation fail, on all names.
    pub fn refuse_suites(&self, refuse: bool) {
        self.state.lock().expect("store lock poisoned").refuse_suites = refuse;
    }

    /// Make case creation fail for a specific title.
    pub fn fail_case_title(&self, title: &str) {
        self.state
            .lock()
            .expect("store lock poisoned")
            .failing_case_titles
            .insert(title.to_string());
    }

    // ============================================================
    // Inspection helpers
    // ============================================================

    pub fn plans(&self) -> Vec<PlanSummary> {
        let state = self.state.lock().expect("store lock poisoned");
        state.plans.iter().map(|(p, _)| p.clone()).collect()
    }

    pub fn suites(&self) -> Vec<StoredSuite> {
        self.state.lock().expect("store lock poisoned").suites.clone()
    }

    pub fn cases(&self) -> Vec<StoredCase> {
        self.state.lock().expect("store lock poisoned").cases.clone()
    }

    pub fn case(&self, case_id: i64) -> Option<StoredCase> {
        let state = self.state.lock().expect("store lock poisoned");
        state.cases.iter().find(|c| c.id == case_id).cloned()
    }

    pub fn cases_in_suite(&self, suite_id: i64) -> Vec<i64> {
        let state = self.state.lock().expect("store lock poisoned");
        state
            .memberships
            .iter()
            .filter(|(s, _)| *s == suite_id)
            .map(|(_, c)| *c)
            .collect()
    }

    /// Seed an existing plan, as if a previous import had created it.
    pub fn seed_plan(&self, name: &str) -> PlanHandle {
        let mut state = self.state.lock().expect("store lock poisoned");
        let plan_id = state.mint_id();
        let root_suite_id = state.mint_id();
        state.plans.push((
            PlanSummary {
                id: plan_id,
                name: name.to_string(),
            },
            root_suite_id,
        ));
        state.suites.push(StoredSuite {
            id: root_suite_id,
            plan_id,
            parent_id: None,
            name: format!("{} root", name),
        });
        PlanHandle {
            id: plan_id,
            root_suite_id,
        }
    }
}

#[async_trait]
impl PlanStore for MemoryStore {
    async fn list_plans(&self, _project: &str) -> Result<Vec<PlanSummary>, StoreError> {
        Ok(self.plans())
    }

    async fn create_plan(&self, _project: &str, name: &str) -> Result<PlanHandle, StoreError> {
        Ok(self.seed_plan(name))
    }

    async fn delete_plan(&self, _project: &str, plan_id: i64) -> Result<bool, StoreError> {
        let mut state = self.state.lock().expect("store lock poisoned");
        let before = state.plans.len();
        state.plans.retain(|(p, _)| p.id != plan_id);
        state.suites.retain(|s| s.plan_id != plan_id);
        Ok(state.plans.len() < before)
    }

    async fn find_or_create_suite(
        &self,
        _project: &str,
        plan_id: i64,
        parent_suite_id: i64,
        name: &str,
    ) -> Result<i64, StoreError> {
        let mut state = self.state.lock().expect("store lock poisoned");

        if state.refuse_suites {
            return Err(StoreError::RequestFailed {
                status: 400,
                detail: format!("suite creation refused for '{}'", name),
            });
        }

        let wanted = normalize_suite_name(name);
        if let Some(existing) = state.suites.iter().find(|s| {
            s.plan_id == plan_id
                && s.parent_id == Some(parent_suite_id)
                && normalize_suite_name(&s.name) == wanted
        }) {
            return Ok(existing.id);
        }

        let id = state.mint_id();
        state.suites.push(StoredSuite {
            id,
            plan_id,
            parent_id: Some(parent_suite_id),
            name: name.to_string(),
        });
        Ok(id)
    }

    async fn create_case(
        &self,
        _project: &str,
        title: &str,
        description: &str,
    ) -> Result<i64, StoreError> {
        let mut state = self.state.lock().expect("store lock poisoned");

        if state.failing_case_titles.contains(title) {
            return Err(StoreError::RequestFailed {
                status: 400,
                detail: format!("case creation refused for '{}'", title),
            });
        }

        let id = state.mint_id();
        state.cases.push(StoredCase {
            id,
            title: title.to_string(),
            description: description.to_string(),
            steps_xml: None,
            params_xml: None,
        });
        Ok(id)
    }

    async fn update_case(
        &self,
        _project: &str,
        case_id: i64,
        description: &str,
        steps_xml: &str,
        params_xml: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().expect("store lock poisoned");
        let case = state
            .cases
            .iter_mut()
            .find(|c| c.id == case_id)
            .ok_or_else(|| StoreError::RequestFailed {
                status: 404,
                detail: format!("no such case {}", case_id),
            })?;

        case.description = description.to_string();
        case.steps_xml = Some(steps_xml.to_string());
        case.params_xml = params_xml.map(str::to_string);
        Ok(())
    }

    async fn add_case_to_suite(
        &self,
        _project: &str,
        _plan_id: i64,
        suite_id: i64,
        case_id: i64,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().expect("store lock poisoned");
        if !state.suites.iter().any(|s| s.id == suite_id) {
            return Err(StoreError::RequestFailed {
                status: 404,
                detail: format!("no such suite {}", suite_id),
            });
        }
        state.memberships.push((suite_id, case_id));
        Ok(())
    }
}
