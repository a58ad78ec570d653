//! planbridge imports versioned, Gherkin-derived test content into a remote
//! test-management store, mapping a content bundle onto test plans, suites,
//! and test cases.
//!
//! The interesting part lives in [`import`]: the version-reconciliation
//! engine decides whether an incoming `X.Y.Z` replaces or sits beside the
//! project's existing plans, and the suite-placement resolver assigns every
//! feature a suite without ever collapsing into the plan's root. The HTTP
//! layer in [`api`] is a thin shell around [`import::ImportService`].

pub mod api;
pub mod error;
pub mod import;
pub mod models;
pub mod store;
