//! Typed errors of the import core.
//!
//! Propagation policy: validation and reconciliation-phase errors abort the
//! whole run; feature- and scenario-phase errors are caught at their loop
//! boundary, recorded in the report, and processing continues.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid version format: '{0}', expected X.Y.Z")]
    InvalidVersionFormat(String),

    #[error("invalid content structure: {0}")]
    InvalidContentStructure(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("could not create suite for feature '{feature}': {reason}")]
    SuiteCreationFailed { feature: String, reason: String },

    #[error("failed to create test case '{title}': {source}")]
    CaseCreationFailed {
        title: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to update test case {case_id}: {source}")]
    CaseUpdateFailed {
        case_id: i64,
        #[source]
        source: StoreError,
    },
}

impl ImportError {
    /// Stable kind string recorded in report error entries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidVersionFormat(_) => "InvalidVersionFormat",
            Self::InvalidContentStructure(_) => "InvalidContentStructure",
            Self::Store(StoreError::Unavailable(_)) => "RemoteStoreUnavailable",
            Self::Store(_) => "RemoteStoreRequestFailed",
            Self::SuiteCreationFailed { .. } => "SuiteCreationFailed",
            Self::CaseCreationFailed { .. } => "CaseCreationFailed",
            Self::CaseUpdateFailed { .. } => "CaseUpdateFailed",
        }
    }

    /// True for errors that invalidate the whole request before any remote
    /// work starts.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidVersionFormat(_) | Self::InvalidContentStructure(_)
        )
    }
}
