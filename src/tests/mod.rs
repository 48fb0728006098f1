//! Workflow tests for the show creation wizard.
//!
//! ## Test Organization
//!
//! - `common`: Shared drafts, gateway and wizard builders
//! - `scenarios`: End-to-end happy and failure paths
//! - `preconditions`: Ordering rules between steps
//! - `navigation`: Step pointer behaviour through a live wizard
//! - `abandon`: Reset and compensating deletes
//! - `dedupe`: Duplicate submission handling
//! - `session`: Shared handles and dropped operations
//!
//! All tests run against [`crate::InMemoryGateway`], scripted with
//! `fail_next` where a remote failure is needed.

mod common;

mod scenarios;
