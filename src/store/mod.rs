//! Remote test-plan store collaborators.
//!
//! The import core only talks to [`PlanStore`]. The production implementation
//! is [`AzureStore`] (Azure DevOps REST); [`MemoryStore`] backs tests and dry
//! runs. Plan versions are inferred from plan name strings (the store has no
//! authoritative version field), so everything version-related stays behind
//! this interface.

mod azure;
mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{PlanHandle, PlanSummary};

pub use azure::AzureStore;
pub use memory::MemoryStore;

/// Errors raised by a store implementation.
///
/// Connect/read timeouts are the store's job; the core never waits on a
/// hung request.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("remote store unavailable: {0}")]
    Unavailable(String),

    #[error("remote store request failed ({status}): {detail}")]
    RequestFailed { status: u16, detail: String },

    #[error("unexpected response from remote store: {0}")]
    UnexpectedResponse(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            StoreError::Unavailable(e.to_string())
        } else {
            match e.status() {
                Some(status) => StoreError::RequestFailed {
                    status: status.as_u16(),
                    detail: e.to_string(),
                },
                None => StoreError::Unavailable(e.to_string()),
            }
        }
    }
}

/// The remote test-plan store, as the import core sees it.
///
/// Entity identifiers (plan, suite, case) are opaque integers minted by the
/// store; the core only records and relays them.
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// List every test plan of a project.
    async fn list_plans(&self, project: &str) -> Result<Vec<PlanSummary>, StoreError>;

    /// Create a plan and return it together with its root suite.
    async fn create_plan(&self, project: &str, name: &str) -> Result<PlanHandle, StoreError>;

    /// Delete a plan. Returns `false` when the deletion did not go through;
    /// callers treat that as a warning, not a failure.
    async fn delete_plan(&self, project: &str, plan_id: i64) -> Result<bool, StoreError>;

    /// Find a child suite by (normalized) name under `parent_suite_id`, or
    /// create it. Never falls back to the parent suite.
    async fn find_or_create_suite(
        &self,
        project: &str,
        plan_id: i64,
        parent_suite_id: i64,
        name: &str,
    ) -> Result<i64, StoreError>;

    /// Create a bare test case and return its id.
    async fn create_case(
        &self,
        project: &str,
        title: &str,
        description: &str,
    ) -> Result<i64, StoreError>;

    /// Fill in a case's description, steps XML, and optional local
    /// parameters XML.
    async fn update_case(
        &self,
        project: &str,
        case_id: i64,
        description: &str,
        steps_xml: &str,
        params_xml: Option<&str>,
    ) -> Result<(), StoreError>;

    /// Attach a case to a suite. Each case is attached to exactly one suite.
    async fn add_case_to_suite(
        &self,
        project: &str,
        plan_id: i64,
        suite_id: i64,
        case_id: i64,
    ) -> Result<(), StoreError>;
}