static COMMIT: &str = include_str!(concat!(env!("OUT_DIR"), "/git-commit"));
static COMPILE_DATE: &str = include_str!(concat!(env!("OUT_DIR"), "/compile-date"));

/// eg. `0.1.0-dev (1a2b3c4 2026-10-18)`
pub fn version_string() -> String {
    format!("{} ({} {})", env!("CARGO_PKG_VERSION"), COMMIT, COMPILE_DATE)
}
