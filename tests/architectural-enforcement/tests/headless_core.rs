//! Integration Test: Headless Conductor
//!
//! **Policy**: `conductor/core` holds all conversation logic and knows nothing
//! about terminals. Surfaces depend on it, never the other way around.

use std::fs;

use architectural_enforcement::workspace_root;

/// Crates only a surface may depend on
const SURFACE_CRATES: [&str; 3] = ["ratatui", "crossterm", "inexai-tui"];

#[test]
fn test_core_manifest_has_no_surface_dependencies() {
    let manifest = fs::read_to_string(workspace_root().join("conductor/core/Cargo.toml"))
        .expect("read conductor/core/Cargo.toml");

    let violations: Vec<&str> = manifest
        .lines()
        .map(|line| line.split('#').next().unwrap_or(line).trim())
        .filter(|line| {
            SURFACE_CRATES.iter().any(|krate| {
                line.strip_prefix(krate)
                    .is_some_and(|rest| rest.trim_start().starts_with('='))
            })
        })
        .collect();

    assert!(
        violations.is_empty(),
        "conductor/core depends on surface crates: {violations:?}"
    );
}

#[test]
fn test_core_sources_do_not_touch_the_terminal() {
    let src = workspace_root().join("conductor/core/src");
    let mut violations = Vec::new();

    for entry in walkdir::WalkDir::new(&src)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
    {
        let content = fs::read_to_string(entry.path()).unwrap_or_default();
        for (idx, line) in content.lines().enumerate() {
            let code_part = line.split("//").next().unwrap_or(line);
            if code_part.contains("ratatui::") || code_part.contains("crossterm::") {
                violations.push(format!("{}:{}", entry.path().display(), idx + 1));
            }
        }
    }

    assert!(violations.is_empty(), "terminal code in core: {violations:?}");
}
