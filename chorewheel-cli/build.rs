use std::path::{Path, PathBuf};
use std::process::Command;

/// `git describe` of the workspace checkout, e.g. `v0.1.0-3-g1a2b3c4d-dirty`.
/// Falls back to a bare commit hash when there are no tags.
fn git_describe(repo_root: &Path) -> Option<String> {
    let out = Command::new("git")
        .arg("-C")
        .arg(repo_root)
        .args(["describe", "--always", "--dirty", "--abbrev=8"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let text = String::from_utf8(out.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_owned())
}

fn main() {
    let crate_dir = PathBuf::from(std::env::var_os("CARGO_MANIFEST_DIR").unwrap_or_default());
    let repo_root = crate_dir.parent().unwrap_or(&crate_dir).to_path_buf();

    // HEAD moves on checkout, the index on commit and staging.
    for tracked in [".git/HEAD", ".git/index"] {
        let p = repo_root.join(tracked);
        if p.exists() {
            println!("cargo:rerun-if-changed={}", p.display());
        }
    }

    let describe = git_describe(&repo_root).unwrap_or_else(|| String::from("unknown"));
    println!("cargo:rustc-env=CHOREWHEEL_GIT_DESCRIBE={describe}");
}
