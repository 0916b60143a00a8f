//! # Source Prechecks
//!
//! Fast textual checks that run before the compiler subprocess is
//! spawned. Each catches a whole class of guaranteed-to-fail input
//! without spending compile time: a missing or incompatible version
//! pragma, a source with no template, and a source that never
//! instantiates a main component (which the compiler accepts and then
//! silently produces nothing for).

use regex::Regex;
use std::sync::LazyLock;

use crate::error::CompileError;

/// Compiler major version this pipeline drives.
const SUPPORTED_MAJOR: u64 = 2;

static PRAGMA_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"pragma\s+circom\s+(\d+)\.(\d+)\.(\d+)\s*;").expect("static regex")
});

static TEMPLATE_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\btemplate\s+[A-Za-z_][A-Za-z0-9_]*").expect("static regex"));

static MAIN_COMPONENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bcomponent\s+main\b").expect("static regex"));

/// Run all prechecks, short-circuiting on the first failure.
pub fn run(source: &str) -> Result<(), CompileError> {
    let Some(caps) = PRAGMA_VERSION.captures(source) else {
        return Err(CompileError::Precheck(
            "missing version pragma; expected `pragma circom 2.x.y;`".to_string(),
        ));
    };
    // Guaranteed to parse: the capture groups only match digits.
    let major: u64 = caps[1].parse().unwrap_or(0);
    if major != SUPPORTED_MAJOR {
        return Err(CompileError::Precheck(format!(
            "unsupported compiler version {}.{}.{}: this pipeline requires {SUPPORTED_MAJOR}.x",
            &caps[1], &caps[2], &caps[3]
        )));
    }

    if !TEMPLATE_DECL.is_match(source) {
        return Err(CompileError::Precheck(
            "no template declaration found".to_string(),
        ));
    }

    if !MAIN_COMPONENT.is_match(source) {
        return Err(CompileError::Precheck(
            "no `component main` declaration found".to_string(),
        ));
    }

    Ok(())
}
