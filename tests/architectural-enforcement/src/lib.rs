//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - No sleep() calls in production code (typing runs on deadlines)
//! - The conversation core stays headless (no terminal crates)
//!
//! These tests are designed to catch violations early in the development cycle.

use std::path::PathBuf;

/// Workspace root, resolved from this package's manifest directory
pub fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}
