//! Embeds build identification for `/health` and the startup banner
//!
//! `CDL_GIT_HASH` overrides the commit lookup for builds without a `.git`
//! directory (container images).

use std::env;
use std::process::Command;

const UNKNOWN: &str = "unknown";

fn main() {
    println!("cargo:rerun-if-env-changed=CDL_GIT_HASH");
    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-changed=build.rs");

    let commit = env::var("CDL_GIT_HASH")
        .ok()
        .filter(|hash| !hash.trim().is_empty())
        .or_else(short_commit)
        .unwrap_or_else(|| UNKNOWN.to_string());

    let built_at = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let profile = env::var("PROFILE").unwrap_or_else(|_| UNKNOWN.to_string());

    for (name, value) in [
        ("GIT_HASH", commit.trim()),
        ("BUILD_TIMESTAMP", built_at.as_str()),
        ("BUILD_PROFILE", profile.as_str()),
    ] {
        println!("cargo:rustc-env={}={}", name, value);
    }
}

fn short_commit() -> Option<String> {
    let output = Command::new("git").args(["rev-parse", "--short=8", "HEAD"]).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    Some(hash.trim().to_string())
}
