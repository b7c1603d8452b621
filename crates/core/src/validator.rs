//! Validator: the five-gate safety pipeline.
//!
//! Gates run in order and short-circuit on first failure. Gates 1-3 are
//! static analysis over the candidate source; gates 4-5 shell out to the
//! installed toolchain as an external process, the same way `vcs.rs` shells
//! out to `git`. The AST walk in gates 2-3 parses a full `syn::File` and
//! walks it with `syn::visit::Visit`.

use syn::visit::{self, Visit};
use syn::{Item, Path};

use evo_shared::EvoError;

use crate::toolchain;

/// Function and macro names that reach outside the evolvable sandbox:
/// process control, dynamic code loading, raw concurrency primitives, and
/// reflective calls.
const BANNED_CALL_NAMES: &[&str] = &[
    "spawn",
    "spawn_link",
    "spawn_monitor",
    "exit",
    "abort",
    "exec",
    "system",
];

/// Namespaces a qualified call (`M::f(...)`) is allowed to reference (spec
/// §4.8 Gate 2: "an allowlist for qualified calls"): core value/collection/
/// string utilities, the evolvable namespace itself (`self`/`crate`/
/// `super`), and the concurrency primitives explicitly allowed
/// (`std::sync`'s `Mutex`/`Arc`/atomics — never `std::process`/`std::thread`,
/// whose spawn-style calls are caught by `BANNED_CALL_NAMES` regardless).
/// Anything whose module prefix isn't covered here is rejected as
/// `disallowed_module(M)`, including raw process, filesystem, network, and
/// environment access.
const ALLOWED_MODULE_PREFIXES: &[&str] = &[
    "self",
    "crate",
    "super",
    "std::collections",
    "std::string",
    "std::str",
    "std::vec",
    "std::slice",
    "std::cmp",
    "std::iter",
    "std::convert",
    "std::fmt",
    "std::option",
    "std::result",
    "std::num",
    "std::time",
    "std::sync",
    "String",
    "Vec",
    "HashMap",
    "HashSet",
    "BTreeMap",
    "BTreeSet",
    "Option",
    "Result",
];

/// Minimum and maximum allowed change-size cap (spec §4.8 Gate 1: "cap is
/// `clamp(round(0.6 * lines(old)), 20, 80)`").
const CAP_MIN: usize = 20;
const CAP_MAX: usize = 80;

#[derive(Debug, Clone, Default)]
pub struct Validator;

impl Validator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Run all five gates against a proposed rewrite. `test_path` is the
    /// path to the target's test file, compiled and run alongside the new
    /// source at Gate 5.
    pub fn validate(&self, old_source: &str, new_source: &str, test_path: &str) -> Result<(), EvoError> {
        gate_1_size_limit(old_source, new_source)?;
        let file = gate_2_ast_allowlist(new_source)?;
        gate_3_module_shape(&file)?;
        gate_4_compiles(new_source)?;
        gate_5_tests_pass(new_source, test_path)?;
        Ok(())
    }
}

/// Gate 1: bound the size of the diff so a single generation cannot rewrite
/// the target wholesale.
fn gate_1_size_limit(old_source: &str, new_source: &str) -> Result<(), EvoError> {
    let changed = changed_line_count(old_source, new_source);
    let cap = change_cap(old_source);
    if changed > cap {
        return Err(EvoError::TooManyChanges { changed, cap });
    }
    Ok(())
}

fn changed_line_count(old_source: &str, new_source: &str) -> usize {
    let old_lines: Vec<&str> = old_source.lines().collect();
    let new_lines: Vec<&str> = new_source.lines().collect();
    let common = old_lines.len().min(new_lines.len());
    let mut changed = old_lines.len().abs_diff(new_lines.len());
    for i in 0..common {
        if old_lines[i] != new_lines[i] {
            changed += 1;
        }
    }
    changed
}

fn change_cap(old_source: &str) -> usize {
    let lines = old_source.lines().count();
    let raw = (0.6 * lines as f64).round() as usize;
    raw.clamp(CAP_MIN, CAP_MAX)
}

/// Gate 2: parse the candidate and walk every call expression and path for
/// banned primitives. Returns the parsed `syn::File` so Gate 3 can reuse it
/// without re-parsing.
fn gate_2_ast_allowlist(new_source: &str) -> Result<syn::File, EvoError> {
    let file = syn::parse_file(new_source).map_err(|_| EvoError::AstParseFailed)?;

    let mut visitor = BanVisitor::default();
    visitor.visit_file(&file);
    if !visitor.violations.is_empty() {
        return Err(EvoError::UnsafeCode(visitor.violations));
    }
    Ok(file)
}

#[derive(Default)]
struct BanVisitor {
    violations: Vec<String>,
}

impl<'ast> Visit<'ast> for BanVisitor {
    fn visit_expr_call(&mut self, node: &'ast syn::ExprCall) {
        if let syn::Expr::Path(p) = node.func.as_ref() {
            self.check_path(&p.path);
        }
        visit::visit_expr_call(self, node);
    }

    fn visit_expr_method_call(&mut self, node: &'ast syn::ExprMethodCall) {
        let name = node.method.to_string();
        if BANNED_CALL_NAMES.contains(&name.as_str()) {
            self.violations.push(name);
        }
        visit::visit_expr_method_call(self, node);
    }

    fn visit_expr_macro(&mut self, node: &'ast syn::ExprMacro) {
        self.check_path(&node.mac.path);
        visit::visit_expr_macro(self, node);
    }

    fn visit_item_macro(&mut self, node: &'ast syn::ItemMacro) {
        self.check_path(&node.mac.path);
        visit::visit_item_macro(self, node);
    }

    fn visit_expr_unsafe(&mut self, node: &'ast syn::ExprUnsafe) {
        self.violations.push("unsafe block".to_string());
        visit::visit_expr_unsafe(self, node);
    }
}

impl BanVisitor {
    /// `path` is either a bare call (`f(...)`, one segment) or a qualified
    /// call (`M::f(...)`, more than one). Bare calls are only checked
    /// against the banned-function denylist; qualified calls are checked
    /// against the banned-function denylist *and* the module allowlist
    /// (spec §4.8 Gate 2: denylist for primitive names, allowlist for
    /// qualified-call namespaces).
    fn check_path(&mut self, path: &Path) {
        let joined = path
            .segments
            .iter()
            .map(|s| s.ident.to_string())
            .collect::<Vec<_>>()
            .join("::");

        if let Some(last) = path.segments.last() {
            let name = last.ident.to_string();
            if BANNED_CALL_NAMES.contains(&name.as_str()) {
                self.violations.push(name);
                return;
            }
        }

        if path.segments.len() > 1 {
            let module = path
                .segments
                .iter()
                .take(path.segments.len() - 1)
                .map(|s| s.ident.to_string())
                .collect::<Vec<_>>()
                .join("::");
            if !ALLOWED_MODULE_PREFIXES.iter().any(|m| module == *m || module.starts_with(&format!("{m}::"))) {
                self.violations.push(format!("disallowed_module({module})"));
            }
        }
    }
}

/// Gate 3: the candidate's top level must be a flat sequence of declarative
/// items (spec §4.8 Gate 3: "module-level side effects are rejected — the
/// top-level shape must contain only declarative forms"). Item-level macro
/// invocations are rejected here too since they can expand to arbitrary
/// executable code at load time (e.g. ctor-style registration).
fn gate_3_module_shape(file: &syn::File) -> Result<(), EvoError> {
    let offending = file
        .items
        .iter()
        .filter(|item| {
            !matches!(
                item,
                Item::Fn(_)
                    | Item::Struct(_)
                    | Item::Enum(_)
                    | Item::Impl(_)
                    | Item::Use(_)
                    | Item::Const(_)
                    | Item::Static(_)
                    | Item::Mod(_)
                    | Item::Type(_)
                    | Item::Trait(_)
            )
        })
        .count();

    if offending > 0 {
        return Err(EvoError::ModuleLevelSideEffects(offending));
    }
    if file.items.is_empty() {
        return Err(EvoError::NotAModule);
    }
    Ok(())
}

/// Gate 4: the candidate must compile as a library crate. Shells out to
/// `rustc` with the source piped over stdin and all output discarded — Rust
/// has no stable embeddable compiler, so a subprocess stands in for the
/// in-memory compile a dynamic-runtime original would perform.
fn gate_4_compiles(new_source: &str) -> Result<(), EvoError> {
    let output = toolchain::compile_lib(new_source)?;
    if !output.status.success() {
        return Err(EvoError::CompilationFailed(
            String::from_utf8_lossy(&output.stderr).to_string(),
        ));
    }
    Ok(())
}

/// Gate 5: compile the candidate together with the target's existing test
/// module and run the resulting test binary. A clean exit code is success;
/// any failing assertion or nonzero exit rejects the candidate.
fn gate_5_tests_pass(new_source: &str, test_path: &str) -> Result<(), EvoError> {
    let tests = std::fs::read_to_string(test_path).map_err(|e| EvoError::ReadFailed {
        path: test_path.to_string(),
        why: e.to_string(),
    })?;

    let combined = format!("{new_source}\n{tests}\n");
    let (_build, run) = toolchain::compile_and_run_bin(&combined, true)?;

    if !run.status.success() {
        return Err(EvoError::TestsFailed(
            String::from_utf8_lossy(&run.stdout).to_string(),
        ));
    }
    Ok(())
}
