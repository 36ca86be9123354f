use std::process::{Command, Output};

fn git(args: &[&str]) -> Option<Output> {
    Command::new("git").args(args).output().ok()
}

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");
    println!("cargo:rerun-if-changed=.git/refs/tags/");

    let hash = git(&["rev-parse", "--short", "HEAD"])
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string());

    // Release builds sit exactly on a tag
    let on_tag =
        git(&["describe", "--exact-match", "--tags", "HEAD"]).is_some_and(|out| out.status.success());

    let dirty = git(&["status", "--porcelain"])
        .is_some_and(|out| out.status.success() && !out.stdout.is_empty());
    let suffix = if dirty { "-dirty" } else { "" };

    println!("cargo:rustc-env=HISTKEEP_GIT_HASH={hash}{suffix}");
    println!("cargo:rustc-env=HISTKEEP_IS_RELEASE={on_tag}");
}
