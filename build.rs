extern crate time;

use std::env;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::process::Command;

fn main() {
    write_git_rev();
    write_compile_date();
}

/// Write the current git hash to ${OUT_DIR}/git-commit
/// so it's available to version.rs
fn write_git_rev() {
    let out_dir = env::var("OUT_DIR").unwrap();
    let dst_path = Path::new(&out_dir).join("git-commit");
    let mut f = File::create(&dst_path).unwrap();

    let git = |args: &[&str]| {
        Command::new("git").args(args).output().ok()
            .filter(|out| out.status.success())
            .map(|out| out.stdout)
    };

    // No git, or not building from a checkout
    let (hash, status) = match (git(&["rev-parse", "--short", "HEAD"]), git(&["status", "--porcelain"])) {
        (Some(hash), Some(status)) => (hash, status),
        _ => {
            f.write_all(b"unknown commit").unwrap();
            return;
        }
    };

    if !status.is_empty() {
        f.write_all(b"WIP ").unwrap();
    }
    // Drop the trailing newline
    f.write_all(String::from_utf8_lossy(&hash).trim().as_bytes()).unwrap();
}

fn write_compile_date() {
    let out_dir = env::var("OUT_DIR").unwrap();
    let dst_path = Path::new(&out_dir).join("compile-date");
    let mut f = File::create(&dst_path).unwrap();

    let now = time::now_utc();
    let date = time::strftime("%Y-%m-%d", &now).unwrap();

    f.write_all(date.as_bytes()).unwrap();
}
