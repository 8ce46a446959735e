//! Test Module
//!
//! Cross-module test suite for the routing and workflow core.
//!
//! ## Test Categories
//! - `router_tests`: Classification properties, totality, strategy post-processing
//! - `workflow_tests`: Stage fallbacks, fatal paths, report contents
//! - `concurrency_tests`: Concurrent runs, state store bound, workflow actor
//! - `mocks`: Collaborator doubles shared by the suites above
