//! Git operations module
//!
//! Provides the changed-file list (modified + added) for a changeset.

pub mod diff;

pub use diff::GitDiff;
