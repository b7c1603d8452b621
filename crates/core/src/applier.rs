//! Applier (spec §4.9).
//!
//! Writes an accepted candidate to disk and can roll it back. The writable
//! path for each target comes from a hardcoded table owned by the Applier
//! itself, anchored on `evolvable_root` — never from the Registry's
//! `source_path` and never from anything the caller passes in. A proposal
//! only ever carries a `target_name`; the Applier is the sole authority for
//! turning that name into a path, so a compromised Proposer or a bug in the
//! Registry's path derivation cannot redirect a write (spec §4.9: "This
//! table is the sole authority for writes"). Grounded on the teacher's
//! `vcs.rs` path-safety checks before shelling out to `git`.

use evo_shared::EvoError;

/// Target name -> path relative to `evolvable_root`. Independent of
/// whatever the Registry currently enumerates (spec §4.9: "an independent
/// hardcoded table — never derived from the target at write time").
const WRITABLE_PATHS: &[(&str, &str)] = &[
    ("prompt_builder", "src/prompt_builder.rs"),
    ("fitness", "src/fitness.rs"),
    ("benchmark", "src/benchmark.rs"),
    ("registry", "src/registry.rs"),
];

/// Substring every writable path must contain (spec §4.9: "the resolved
/// absolute path must contain the evolvable namespace marker").
const SANDBOX_MARKER: &str = "evolvable";

#[derive(Debug, Clone)]
pub struct Applier {
    evolvable_root: String,
}

impl Default for Applier {
    fn default() -> Self {
        Self::new("evolvable")
    }
}

impl Applier {
    #[must_use]
    pub fn new(evolvable_root: impl Into<String>) -> Self {
        Self {
            evolvable_root: evolvable_root.into(),
        }
    }

    /// Write `new_source` on behalf of `target_name`, after looking up the
    /// whitelisted path and resolving/validating it. The path is never
    /// taken from the caller — only `target_name` is.
    pub fn apply(&self, target_name: &str, new_source: &str) -> Result<(), EvoError> {
        let resolved = self.check_writable(target_name)?;
        std::fs::write(&resolved, new_source).map_err(|e| EvoError::WriteFailed {
            path: resolved.to_string_lossy().to_string(),
            why: e.to_string(),
        })
    }

    /// Restore `old_source` after a rejected or regressed candidate (spec
    /// §4.9, §4.11: rollback on regression).
    pub fn rollback(&self, target_name: &str, old_source: &str) -> Result<(), EvoError> {
        self.apply(target_name, old_source)
    }

    fn check_writable(&self, target_name: &str) -> Result<std::path::PathBuf, EvoError> {
        let relative = WRITABLE_PATHS
            .iter()
            .find(|(name, _)| *name == target_name)
            .map(|(_, path)| *path)
            .ok_or_else(|| EvoError::ModuleNotInWhitelist(target_name.to_string()))?;

        let path = std::path::Path::new(&self.evolvable_root).join(relative);

        let resolved = path
            .canonicalize()
            .or_else(|_| std::path::absolute(&path))
            .map_err(|_| EvoError::PathTraversalBlocked(path.to_string_lossy().to_string()))?;

        let resolved_str = resolved.to_string_lossy();
        if !resolved_str.contains(SANDBOX_MARKER) {
            return Err(EvoError::PathTraversalBlocked(resolved_str.to_string()));
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sets up `<dir>/evolvable/src/<name>.rs` and returns an `Applier`
    /// rooted at that `evolvable` dir, so `WRITABLE_PATHS` resolves inside
    /// the temp dir rather than the real workspace.
    fn applier_with_seed(dir: &tempfile::TempDir, name: &str) -> Applier {
        let root = dir.path().join("evolvable");
        std::fs::create_dir_all(root.join("src")).unwrap();
        std::fs::write(root.join("src").join(format!("{name}.rs")), "fn old() {}").unwrap();
        Applier::new(root.to_string_lossy().to_string())
    }

    #[test]
    fn rejects_target_not_in_whitelist() {
        let dir = tempfile::tempdir().unwrap();
        let applier = applier_with_seed(&dir, "prompt_builder");
        let err = applier.apply("not_a_target", "fn new() {}").unwrap_err();
        assert!(matches!(err, EvoError::ModuleNotInWhitelist(_)));
    }

    #[test]
    fn rejects_root_outside_sandbox_marker() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("not_the_sandbox_dir");
        std::fs::create_dir_all(root.join("src")).unwrap();
        std::fs::write(root.join("src/prompt_builder.rs"), "fn old() {}").unwrap();
        let applier = Applier::new(root.to_string_lossy().to_string());
        let err = applier.apply("prompt_builder", "fn new() {}").unwrap_err();
        assert!(matches!(err, EvoError::PathTraversalBlocked(_)));
    }

    #[test]
    fn apply_and_rollback_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let applier = applier_with_seed(&dir, "fitness");
        let path = dir.path().join("evolvable/src/fitness.rs");

        applier.apply("fitness", "fn new() {}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fn new() {}");

        applier.rollback("fitness", "fn old() {}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fn old() {}");
    }

    #[test]
    fn each_target_resolves_to_its_own_table_entry() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("evolvable/src")).unwrap();
        for name in ["prompt_builder", "fitness", "benchmark", "registry"] {
            std::fs::write(dir.path().join("evolvable/src").join(format!("{name}.rs")), "fn old() {}").unwrap();
        }
        let applier = Applier::new(dir.path().join("evolvable").to_string_lossy().to_string());

        applier.apply("fitness", "fn fitness_new() {}").unwrap();
        applier.apply("registry", "fn registry_new() {}").unwrap();

        assert_eq!(
            std::fs::read_to_string(dir.path().join("evolvable/src/fitness.rs")).unwrap(),
            "fn fitness_new() {}"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("evolvable/src/registry.rs")).unwrap(),
            "fn registry_new() {}"
        );
        // Untouched targets stay as seeded.
        assert_eq!(
            std::fs::read_to_string(dir.path().join("evolvable/src/prompt_builder.rs")).unwrap(),
            "fn old() {}"
        );
    }
}
