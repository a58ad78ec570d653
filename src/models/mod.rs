//! Domain models for planbridge.
//!
//! # Core Concepts
//!
//! ## Content side (caller-owned)
//!
//! - [`ContentTree`]: A normalized bundle of Gherkin-derived features, produced
//!   by an external parser and passed read-only into the import core.
//! - [`Feature`] / [`Scenario`] / [`Step`]: The tree nodes. Scenario outlines
//!   carry an [`ExamplesTable`] whose `<name>` placeholders stay parametric.
//!
//! ## Remote side (store-owned)
//!
//! - [`PlanSummary`]: A test plan as listed by the remote store. Plan names are
//!   expected (not guaranteed) to follow `"{project} Test Plan v{X.Y.Z}"`.
//! - [`PlanHandle`]: A freshly created plan with its root suite, the anchor for
//!   one import run.
//!
//! ## Results
//!
//! - [`ImportReport`]: The single structured result of a run: created count,
//!   per-item errors, and every suite id touched.

mod content;
mod report;
mod version;

pub use content::*;
pub use report::*;
pub use version::*;
