use serde::{Deserialize, Serialize};

use crate::error::ImportError;

/// Characters the remote store refuses inside plan, suite, and project names.
pub const FORBIDDEN_NAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// A normalized content bundle, as produced by an external Gherkin/JSON parser.
///
/// The import core reads this tree and never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentTree {
    pub name: String,
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Background steps shared by the feature's scenarios, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<StepBlock>,
    pub scenarios: Vec<Scenario>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepBlock {
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: ScenarioKind,
    pub steps: Vec<Step>,
    /// Present on scenario outlines only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<ExamplesTable>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioKind {
    #[default]
    Scenario,
    ScenarioOutline,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub keyword: String,
    pub text: String,
}

/// Row-major examples table of a scenario outline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamplesTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A test plan as listed by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub id: i64,
    pub name: String,
}

/// A created plan with its root suite, the anchor for one import run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlanHandle {
    pub id: i64,
    pub root_suite_id: i64,
}

/// Input contract of the import core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRequest {
    pub project_name: String,
    pub version: String,
    pub content: ContentTree,
}

impl ImportRequest {
    /// Validate the project name against the remote store's restrictions.
    ///
    /// The version string and content tree have their own checks; all three
    /// run before any remote call.
    pub fn validate_project_name(&self) -> Result<(), ImportError> {
        let name = self.project_name.trim();
        if name.is_empty() {
            return Err(ImportError::InvalidContentStructure(
                "project name cannot be empty".to_string(),
            ));
        }
        if name.chars().count() > 100 {
            return Err(ImportError::InvalidContentStructure(
                "project name must be at most 100 characters".to_string(),
            ));
        }
        if let Some(c) = name.chars().find(|c| FORBIDDEN_NAME_CHARS.contains(c)) {
            return Err(ImportError::InvalidContentStructure(format!(
                "project name cannot contain character '{}'",
                c
            )));
        }
        Ok(())
    }
}

impl ContentTree {
    /// Structural validation of the tree, per the input contract.
    ///
    /// Every feature needs a name and at least one scenario, every scenario a
    /// name and at least one step, every step a keyword and text. Violations
    /// fail the whole run before any remote call.
    pub fn validate(&self) -> Result<(), ImportError> {
        let fail = |msg: String| Err(ImportError::InvalidContentStructure(msg));

        if self.name.trim().is_empty() {
            return fail("content must have a name".to_string());
        }
        if self.features.is_empty() {
            return fail("content must contain at least one feature".to_string());
        }

        for (i, feature) in self.features.iter().enumerate() {
            if feature.name.trim().is_empty() {
                return fail(format!("feature {} must have a name", i));
            }
            if feature.scenarios.is_empty() {
                return fail(format!(
                    "feature '{}' must contain at least one scenario",
                    feature.name
                ));
            }
            for (j, scenario) in feature.scenarios.iter().enumerate() {
                if scenario.name.trim().is_empty() {
                    return fail(format!(
                        "scenario {} in feature '{}' must have a name",
                        j, feature.name
                    ));
                }
                if scenario.steps.is_empty() {
                    return fail(format!(
                        "scenario '{}' in feature '{}' must contain at least one step",
                        scenario.name, feature.name
                    ));
                }
                for (k, step) in scenario.steps.iter().enumerate() {
                    if step.keyword.trim().is_empty() || step.text.trim().is_empty() {
                        return fail(format!(
                            "step {} in scenario '{}' of feature '{}' must have a keyword and text",
                            k, scenario.name, feature.name
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}
