use serde::{Deserialize, Serialize};

/// Outcome of an import run.
///
/// `Success` means zero recorded errors; `PartialSuccess` means the run
/// finished but some features or scenarios were skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    Success,
    PartialSuccess,
}

/// One recorded failure, keyed by the item it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// `"Feature: {name}"` for suite failures, `"{feature} - {scenario}"`
    /// for scenario failures.
    pub scenario_title: String,
    pub error_message: String,
    pub error_kind: String,
}

/// Final structured result of an import run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub status: ImportStatus,
    /// Confirmed persisted cases, one per scenario (outlines included).
    pub created: usize,
    pub errors: Vec<ErrorDetail>,
    pub plan_id: i64,
    /// First suite placed, or the plan's root suite if nothing was placed.
    pub primary_suite_id: i64,
    /// Every distinct suite id touched, in placement order. Never contains
    /// the root suite on behalf of a failed feature.
    pub all_suite_ids: Vec<i64>,
}
