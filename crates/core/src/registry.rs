//! Evolvable Registry (spec §4.1).
//!
//! Enumerates the fixed list of targets in a stable order and maps each to
//! its on-disk source/test paths. Grounded on the teacher's
//! `managers/registry.rs` (fixed-enumeration + id→metadata lookup) and
//! `exiv_shared::PluginManifest` (plain-data, stable-id style).
//!
//! The `source_path` returned here is trusted for *reads only*. The
//! writable path an accepted proposal is persisted to is an independent
//! hardcoded table in `applier.rs`, never derived from this registry at
//! write time (spec §4.1, §4.9).

use evo_shared::Target;

/// One entry per evolvable target, in the fixed, stable order `select`
/// round-robins over.
const TARGET_NAMES: &[&str] = &["prompt_builder", "fitness", "benchmark", "registry"];

#[derive(Debug, Clone, Default)]
pub struct EvolvableRegistry {
    root: String,
}

impl EvolvableRegistry {
    #[must_use]
    pub fn new(evolvable_root: impl Into<String>) -> Self {
        Self {
            root: evolvable_root.into(),
        }
    }

    /// All targets, in stable order.
    #[must_use]
    pub fn all(&self) -> Vec<Target> {
        TARGET_NAMES
            .iter()
            .map(|name| Target {
                name: (*name).to_string(),
                source_path: self.source_path(name),
                test_path: self.test_path(name),
            })
            .collect()
    }

    /// `all()[generation mod len(all())]` (spec §4.1, invariant 1 of §8).
    #[must_use]
    pub fn select(&self, generation: u64) -> Target {
        let all = self.all();
        let idx = (generation as usize) % all.len();
        all[idx].clone()
    }

    /// Deterministic, read-only path derived from the target's short name.
    #[must_use]
    pub fn source_path(&self, name: &str) -> String {
        format!("{}/src/{}.rs", self.root, name)
    }

    /// Deterministic, read-only path derived from the target's short name.
    #[must_use]
    pub fn test_path(&self, name: &str) -> String {
        format!("{}/tests/{}_test.rs", self.root, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_wraps_round_robin() {
        let reg = EvolvableRegistry::new("evolvable");
        let n = reg.all().len() as u64;
        for g in 0..(n * 3) {
            assert_eq!(reg.select(g), reg.select(g + n));
        }
    }

    #[test]
    fn select_matches_index() {
        let reg = EvolvableRegistry::new("evolvable");
        let all = reg.all();
        for (i, t) in all.iter().enumerate() {
            assert_eq!(reg.select(i as u64), *t);
        }
    }

    #[test]
    fn paths_are_derived_and_distinct() {
        let reg = EvolvableRegistry::new("evolvable");
        for t in reg.all() {
            assert!(t.source_path.contains(&t.name));
            assert!(t.test_path.contains(&t.name));
            assert_ne!(t.source_path, t.test_path);
        }
    }
}
