//! The import core: validate, reconcile, place, project, persist, report.
//!
//! One run is single-threaded and synchronous with respect to the store;
//! every remote call gates the next step and features/scenarios are
//! processed strictly in input order. Reconciliation failure is fatal.
//! Feature and scenario failures are recorded in the report and the run
//! continues. Concurrent runs against the same project can race on plan
//! names; callers should serialize runs per project.

pub mod cases;
pub mod reconcile;
pub mod suites;
pub mod tasks;

use std::str::FromStr;
use std::sync::Arc;

use crate::error::ImportError;
use crate::models::{
    ErrorDetail, Feature, ImportReport, ImportRequest, ImportStatus, PlanHandle, SemanticVersion,
};
use crate::store::PlanStore;

#[derive(Clone)]
pub struct ImportService {
    store: Arc<dyn PlanStore>,
}

impl ImportService {
    pub fn new(store: Arc<dyn PlanStore>) -> Self {
        Self { store }
    }

    /// Run one import.
    ///
    /// Returns `Err` only for pre-flight validation failures and
    /// reconciliation-phase store failures; once a plan exists the run
    /// always produces a report.
    pub async fn run(&self, request: &ImportRequest) -> Result<ImportReport, ImportError> {
        request.validate_project_name()?;
        let version = SemanticVersion::from_str(&request.version)?;
        request.content.validate()?;

        let project = request.project_name.trim();
        let plan = reconcile::reconcile(&self.store, project, version).await?;

        let mut report = RunReport::new(plan);
        tracing::info!(
            "Importing {} features into plan {}",
            request.content.features.len(),
            plan.id
        );

        for feature in &request.content.features {
            self.import_feature(project, plan, feature, version, &mut report)
                .await;
        }

        Ok(report.finish())
    }

    /// Place the feature's suite, then persist its scenarios. A suite
    /// placement failure skips every scenario of the feature; the scenarios
    /// must never land in the root suite.
    async fn import_feature(
        &self,
        project: &str,
        plan: PlanHandle,
        feature: &Feature,
        version: SemanticVersion,
        report: &mut RunReport,
    ) {
        let suite_id = match suites::place_feature(
            &self.store,
            project,
            plan.id,
            plan.root_suite_id,
            &feature.name,
            version,
        )
        .await
        {
            Ok(id) => id,
            Err(e) => {
                tracing::error!("Skipping feature '{}': {}", feature.name, e);
                report.record_error(format!("Feature: {}", feature.name), &e);
                return;
            }
        };
        report.record_suite(suite_id);

        for scenario in &feature.scenarios {
            let draft = cases::project_scenario(scenario, feature.background.as_ref(), version);

            match self.persist_case(project, plan.id, suite_id, &draft).await {
                Ok(case_id) => {
                    tracing::info!(
                        "Created test case {} for scenario '{}'",
                        case_id,
                        scenario.name
                    );
                    report.created += 1;
                }
                Err(e) => {
                    tracing::error!("Error processing scenario '{}': {}", scenario.name, e);
                    report.record_error(format!("{} - {}", feature.name, scenario.name), &e);
                }
            }
        }
    }

    /// Create, fill in, and attach one case. The case is attached to exactly
    /// one suite.
    async fn persist_case(
        &self,
        project: &str,
        plan_id: i64,
        suite_id: i64,
        draft: &cases::CaseDraft,
    ) -> Result<i64, ImportError> {
        let case_id = self
            .store
            .create_case(project, &draft.title, &draft.description)
            .await
            .map_err(|source| ImportError::CaseCreationFailed {
                title: draft.title.clone(),
                source,
            })?;

        self.store
            .update_case(
                project,
                case_id,
                &draft.description,
                &draft.steps_xml,
                draft.parameters_xml.as_deref(),
            )
            .await
            .map_err(|source| ImportError::CaseUpdateFailed { case_id, source })?;

        self.store
            .add_case_to_suite(project, plan_id, suite_id, case_id)
            .await
            .map_err(|source| ImportError::CaseUpdateFailed { case_id, source })?;

        Ok(case_id)
    }
}

/// Accumulator for one run.
struct RunReport {
    plan: PlanHandle,
    created: usize,
    errors: Vec<ErrorDetail>,
    suite_ids: Vec<i64>,
}

impl RunReport {
    fn new(plan: PlanHandle) -> Self {
        Self {
            plan,
            created: 0,
            errors: Vec::new(),
            suite_ids: Vec::new(),
        }
    }

    fn record_suite(&mut self, suite_id: i64) {
        if !self.suite_ids.contains(&suite_id) {
            self.suite_ids.push(suite_id);
        }
    }

    fn record_error(&mut self, title: String, error: &ImportError) {
        self.errors.push(ErrorDetail {
            scenario_title: title,
            error_message: error.to_string(),
            error_kind: error.kind().to_string(),
        });
    }

    fn finish(self) -> ImportReport {
        if self.suite_ids.len() == 1 && self.created > 1 {
            // A lone suite across a multi-case run suggests placement
            // silently collapsed somewhere upstream.
            tracing::warn!("All test cases went to the same suite");
        }

        let status = if self.errors.is_empty() {
            ImportStatus::Success
        } else {
            ImportStatus::PartialSuccess
        };

        ImportReport {
            status,
            created: self.created,
            errors: self.errors,
            plan_id: self.plan.id,
            primary_suite_id: self
                .suite_ids
                .first()
                .copied()
                .unwrap_or(self.plan.root_suite_id),
            all_suite_ids: self.suite_ids,
        }
    }
}
