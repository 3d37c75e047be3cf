//! depbump - dependency update decision engine
//!
//! Given a project's already-parsed dependency declarations, a security
//! advisory feed, and per-package ignore ranges, this library decides:
//! - the best target version per dependency (latest, or the lowest
//!   security fix when vulnerable)
//! - whether moving it requires moving peers that share a version
//!   property, and whether that whole group can move
//! - the rewritten requirement strings, preserving each declaration's
//!   operator and range style
//!
//! Fetching manifests, parsing them, and writing files back are the
//! caller's collaborators; this crate is the decision layer in between.

pub mod catalog;
pub mod cli;
pub mod domain;
pub mod error;
pub mod input;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod registry;
pub mod update;
