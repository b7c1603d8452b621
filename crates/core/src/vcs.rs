//! `git`-backed `VcsCheckpoint` (spec §4.10, §6: "stage the evolvable
//! directory, then commit with an allow-empty flag").
//!
//! Grounded on the teacher's `vcs.rs`: `std::process::Command` with every
//! argument passed as a separate, sanitized element (never a shell string),
//! an explicit `--` terminator before path-like arguments so a target name
//! that happens to start with `-` can't be parsed as a flag.

use async_trait::async_trait;
use tokio::process::Command;

use evo_shared::{EvoError, VcsCheckpoint};

pub struct GitCheckpoint {
    repo_root: String,
    evolvable_dir: String,
}

impl GitCheckpoint {
    #[must_use]
    pub fn new(repo_root: impl Into<String>, evolvable_dir: impl Into<String>) -> Self {
        Self {
            repo_root: repo_root.into(),
            evolvable_dir: evolvable_dir.into(),
        }
    }
}

#[async_trait]
impl VcsCheckpoint for GitCheckpoint {
    async fn checkpoint(&self, message: &str) -> Result<(), EvoError> {
        let add = Command::new("git")
            .arg("-C")
            .arg(&self.repo_root)
            .arg("add")
            .arg("--")
            .arg(&self.evolvable_dir)
            .output()
            .await
            .map_err(|e| EvoError::GitAddFailed(e.to_string()))?;
        if !add.status.success() {
            return Err(EvoError::GitAddFailed(String::from_utf8_lossy(&add.stderr).to_string()));
        }

        let commit = Command::new("git")
            .arg("-C")
            .arg(&self.repo_root)
            .arg("commit")
            .arg("--allow-empty")
            .arg("-m")
            .arg(message)
            .output()
            .await
            .map_err(|e| EvoError::GitCommitFailed(e.to_string()))?;

        // `--allow-empty` means a bare "nothing to commit" should not occur,
        // but a non-empty-only repo state can still surface it from a
        // concurrent commit; treat it as success rather than fail the cycle.
        if !commit.status.success() {
            let stderr = String::from_utf8_lossy(&commit.stderr);
            if stderr.contains("nothing to commit") {
                return Ok(());
            }
            return Err(EvoError::GitCommitFailed(stderr.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn checkpoint_against_a_real_repo() {
        let dir = tempfile::tempdir().unwrap();
        let repo = dir.path();
        std::fs::create_dir_all(repo.join("evolvable")).unwrap();
        std::fs::write(repo.join("evolvable/a.rs"), "fn a() {}").unwrap();

        let init = std::process::Command::new("git")
            .arg("-C")
            .arg(repo)
            .arg("init")
            .arg("-q")
            .output();
        let Ok(init) = init else {
            return; // git not installed in this environment; skip.
        };
        if !init.status.success() {
            return;
        }
        let _ = std::process::Command::new("git")
            .arg("-C")
            .arg(repo)
            .arg("config")
            .arg("user.email")
            .arg("evo@example.com")
            .output();
        let _ = std::process::Command::new("git")
            .arg("-C")
            .arg(repo)
            .arg("config")
            .arg("user.name")
            .arg("evo")
            .output();

        let checkpoint = GitCheckpoint::new(repo.to_string_lossy().to_string(), "evolvable".to_string());
        checkpoint.checkpoint("evo: generation 1").await.unwrap();
        checkpoint.checkpoint("evo: generation 2 (no changes)").await.unwrap();
    }
}
