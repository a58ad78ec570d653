//! Version reconciliation: decide how an incoming version maps onto the
//! project's existing remote plans, then carry the decision out.
//!
//! Major and minor bumps always get a fresh, clearly named plan (append-only
//! history). Patch and same bumps replace in place to avoid plan
//! proliferation from routine re-imports: the superseded plan is deleted
//! best-effort, then a fresh plan is created either way.

use std::sync::Arc;

use crate::error::ImportError;
use crate::models::{classify, PlanHandle, PlanSummary, SemanticVersion, VersionChange};
use crate::store::PlanStore;

/// Canonical plan name for a project/version pair.
pub fn plan_name(project: &str, version: SemanticVersion) -> String {
    format!("{} Test Plan v{}", project, version)
}

/// The lifecycle decision for one import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub kind: VersionChange,
    pub baseline: SemanticVersion,
    /// Plan to delete before creating the fresh one, when replacing.
    pub delete_candidate: Option<PlanSummary>,
    pub plan_name: String,
}

/// Pure reconciliation: classify `target` against the remote plan list and
/// pick the plan to replace, if any.
///
/// The baseline is the highest version parsed out of plan names carrying the
/// `"{project} Test Plan v"` prefix, excluding the target itself: a plan
/// already named for the target must not make the run look like a `same`
/// re-import of itself. Unparsable suffixes are ignored.
pub fn decide(project: &str, target: SemanticVersion, plans: &[PlanSummary]) -> Decision {
    let prefix = format!("{} Test Plan v", project);

    let versioned: Vec<(&PlanSummary, SemanticVersion)> = plans
        .iter()
        .filter_map(|plan| {
            let suffix = plan.name.strip_prefix(&prefix)?;
            let version: SemanticVersion = suffix.parse().ok()?;
            Some((plan, version))
        })
        .collect();

    let baseline = versioned
        .iter()
        .map(|(_, v)| *v)
        .filter(|v| *v != target)
        .max()
        .unwrap_or(SemanticVersion::ZERO);

    let kind = classify(baseline, target);

    let delete_candidate = match kind {
        VersionChange::Major | VersionChange::Minor => None,
        // Replace the highest-patch sibling in the target's major.minor line,
        // searched across all plans, not just the baseline one.
        VersionChange::Patch => versioned
            .iter()
            .filter(|(_, v)| v.same_minor_line(&target))
            .max_by_key(|(_, v)| v.patch)
            .map(|(plan, _)| (*plan).clone()),
        VersionChange::Same => versioned
            .iter()
            .find(|(_, v)| *v == target)
            .map(|(plan, _)| (*plan).clone()),
    };

    Decision {
        kind,
        baseline,
        delete_candidate,
        plan_name: plan_name(project, target),
    }
}

/// Execute reconciliation against the store.
///
/// Deletion of a superseded plan is best-effort: a failed delete is logged
/// as a warning and never aborts creation of the new plan. List and create
/// failures are fatal to the run.
pub async fn reconcile(
    store: &Arc<dyn PlanStore>,
    project: &str,
    target: SemanticVersion,
) -> Result<PlanHandle, ImportError> {
    let plans = store.list_plans(project).await?;
    let decision = decide(project, target, &plans);

    tracing::info!(
        "Version comparison: {} -> {} = {}",
        decision.baseline,
        target,
        decision.kind.as_str()
    );

    if let Some(old) = &decision.delete_candidate {
        tracing::info!(
            "Replacing plan '{}' (id {}) for {} import",
            old.name,
            old.id,
            decision.kind.as_str()
        );
        match store.delete_plan(project, old.id).await {
            Ok(true) => tracing::info!("Deleted superseded plan {}", old.id),
            Ok(false) => tracing::warn!("Could not delete plan {}, continuing", old.id),
            Err(e) => tracing::warn!("Error deleting plan {}: {}, continuing", old.id, e),
        }
    }

    let handle = store.create_plan(project, &decision.plan_name).await?;
    tracing::info!(
        "Using plan {} ('{}') with root suite {}",
        handle.id,
        decision.plan_name,
        handle.root_suite_id
    );
    Ok(handle)
}
