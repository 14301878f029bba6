//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code in the TUI and Conductor MUST NOT call sleep methods.
//! The typing animation advances on wall-clock deadlines checked from `poll()`.
//! **Exceptions**: Frame rate limiting (TUI app loop only), test code

use std::fs;
use std::path::Path;

use architectural_enforcement::workspace_root;

/// Test that production code does not contain sleep() calls
#[test]
fn test_no_sleep_in_production_code() {
    let violations = find_sleep_violations();

    if !violations.is_empty() {
        eprintln!("\nSleep calls found in production code!\n");

        for violation in &violations {
            eprintln!("  {}", violation);
        }

        eprintln!("\nACCEPTABLE sleep uses:");
        eprintln!("  - Frame rate limiting in the TUI event loop");
        eprintln!("  - Test code (#[test] or #[tokio::test] functions)");
        eprintln!("\nFORBIDDEN:");
        eprintln!("  - Sleep between typing ticks (use deadlines)");
        eprintln!("  - Sleep as poor man's synchronization");

        panic!(
            "\nFound {} sleep violation(s) in production code.",
            violations.len()
        );
    }
}

/// Find all sleep() calls in production code
fn find_sleep_violations() -> Vec<String> {
    let root = workspace_root();
    let mut violations = Vec::new();

    // Check TUI production code
    check_directory(
        &root.join("tui/src"),
        &mut violations,
        &SleepPolicy {
            allow_frame_limiting: true,
            allow_tests: false,
        },
    );

    // Check Conductor production code
    check_directory(
        &root.join("conductor/core/src"),
        &mut violations,
        &SleepPolicy {
            allow_frame_limiting: false,
            allow_tests: true,
        },
    );

    violations
}

struct SleepPolicy {
    allow_frame_limiting: bool,
    allow_tests: bool,
}

fn check_directory(path: &Path, violations: &mut Vec<String>, policy: &SleepPolicy) {
    assert!(path.exists(), "missing source directory {}", path.display());

    for entry in walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.path().extension().and_then(|s| s.to_str()) == Some("rs") {
            check_file(entry.path(), violations, policy);
        }
    }
}

fn check_file(path: &Path, violations: &mut Vec<String>, policy: &SleepPolicy) {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return,
    };

    let lines: Vec<&str> = content.lines().collect();

    for (idx, line) in lines.iter().enumerate() {
        // Skip comments
        let code_part = line.split("//").next().unwrap_or(line);

        if code_part.contains("::sleep(") || code_part.contains(".sleep(") {
            if policy.allow_tests && is_in_test_function(&lines, idx) {
                continue;
            }

            // Frame limiting is only allowed in the TUI event loop
            if policy.allow_frame_limiting
                && path.ends_with("tui/src/app.rs")
                && is_frame_limiting_context(&lines, idx)
            {
                continue;
            }

            violations.push(format!(
                "{}:{} - {}",
                path.display(),
                idx + 1,
                line.trim()
            ));
        }
    }
}

/// Check if line is inside a test function
fn is_in_test_function(lines: &[&str], current_idx: usize) -> bool {
    // Scan backwards for #[test] or #[tokio::test]
    for i in (0..current_idx).rev() {
        let line = lines[i].trim();

        if line.starts_with("fn ") && !line.contains("test") {
            return false;
        }

        if line.starts_with("#[test]") || line.starts_with("#[tokio::test") {
            return true;
        }

        // Stop at module boundaries
        if line.starts_with("mod ") || line.starts_with("impl ") {
            return false;
        }
    }
    false
}

/// Check if sleep is used for frame rate limiting
fn is_frame_limiting_context(lines: &[&str], current_idx: usize) -> bool {
    let context_range = current_idx.saturating_sub(10)..std::cmp::min(current_idx + 5, lines.len());

    lines[context_range].iter().any(|line| {
        let line = line.to_lowercase();
        line.contains("frame") || line.contains("fps") || line.contains("tick_rate")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_function_is_not_test() {
        let code = vec![
            "fn reveal_next() {",
            "    std::thread::sleep(Duration::from_millis(3));",
            "}",
        ];
        assert!(!is_in_test_function(&code, 1));
    }

    #[test]
    fn test_test_function_detected() {
        let code = vec![
            "#[test]",
            "fn test_cancel_is_bounded() {",
            "    let ticker = std::thread::spawn(move || loop {",
            "        std::thread::sleep(interval);",
            "    });",
            "}",
        ];
        assert!(is_in_test_function(&code, 3));
    }

    #[test]
    fn test_frame_limiting_detection() {
        let code = vec![
            "tokio::select! {",
            "    // Frame tick",
            "    () = tokio::time::sleep(FRAME_INTERVAL) => {}",
            "}",
        ];
        assert!(is_frame_limiting_context(&code, 2));
    }
}
