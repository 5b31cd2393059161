//! The lowering context threaded through every recursive call.
//!
//! `EmitterContext` is a value: every "mutation" returns a derived context
//! and leaves the receiver untouched. Maps are `Arc`-shared and copied on
//! write, so cloning a context is cheap and two derived contexts never
//! observe each other's changes.
//!
//! Two restore rules apply when a construct ends:
//! - names (`local_name_map`, `int_loop_vars`) revert to the enclosing scope
//!   on every block exit;
//! - narrowing (`narrowed_bindings`) reverts per branch, except where the
//!   `if` lowering propagates a binding past an early exit.
//!
//! `temp_var_id` never reverts, and target names consumed in a nested scope
//! stay consumed in the enclosing one: the target language rejects a local
//! that reuses a name declared in a nested block of the same scope.

use crate::bindings::NarrowedBinding;
use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use std::sync::Arc;
use tscs_ir::IrType;

/// Ordered table of active narrowings, keyed by identifier or dotted path.
pub type NarrowedBindings = IndexMap<String, NarrowedBinding, FxBuildHasher>;

#[derive(Debug, Clone, Default)]
pub struct EmitterContext {
    narrowed_bindings: Arc<NarrowedBindings>,
    local_name_map: Arc<FxHashMap<String, String>>,
    used_local_names: Arc<FxHashSet<String>>,
    temp_var_id: u64,
    int_loop_vars: Arc<FxHashSet<String>>,
    is_async: bool,
    is_static: bool,
    return_type: Option<IrType>,
}

impl EmitterContext {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Narrowed bindings
    // =========================================================================

    pub fn narrowed_binding(&self, key: &str) -> Option<&NarrowedBinding> {
        self.narrowed_bindings.get(key)
    }

    pub fn narrowed_bindings(&self) -> &NarrowedBindings {
        &self.narrowed_bindings
    }

    /// Install `binding` for `key`, shadowing any existing binding.
    pub fn with_binding(&self, key: impl Into<String>, binding: NarrowedBinding) -> Self {
        let mut next = self.clone();
        Arc::make_mut(&mut next.narrowed_bindings).insert(key.into(), binding);
        next
    }

    /// Drop the binding for `key` and for every dotted path below it.
    pub fn without_binding(&self, key: &str) -> Self {
        self.without_bindings([key])
    }

    pub fn without_bindings<'k>(&self, keys: impl IntoIterator<Item = &'k str>) -> Self {
        let keys: Vec<&str> = keys.into_iter().collect();
        let affected = |existing: &str| keys.iter().any(|key| path_starts_with(existing, key));
        if !self.narrowed_bindings.keys().any(|k| affected(k.as_str())) {
            return self.clone();
        }
        let mut next = self.clone();
        Arc::make_mut(&mut next.narrowed_bindings).retain(|k, _| !affected(k.as_str()));
        next
    }

    /// This context with `other`'s narrowing table in place of its own.
    pub fn with_narrowing_of(&self, other: &Self) -> Self {
        let mut next = self.clone();
        next.narrowed_bindings = Arc::clone(&other.narrowed_bindings);
        next
    }

    pub fn without_all_bindings(&self) -> Self {
        if self.narrowed_bindings.is_empty() {
            return self.clone();
        }
        let mut next = self.clone();
        next.narrowed_bindings = Arc::default();
        next
    }

    // =========================================================================
    // Local names
    // =========================================================================

    /// Target name a source identifier was declared as in this scope.
    pub fn local_name(&self, source: &str) -> Option<&str> {
        self.local_name_map.get(source).map(String::as_str)
    }

    pub fn local_name_map(&self) -> &FxHashMap<String, String> {
        &self.local_name_map
    }

    pub fn is_name_used(&self, emitted: &str) -> bool {
        self.used_local_names.contains(emitted)
    }

    pub fn used_local_names(&self) -> &FxHashSet<String> {
        &self.used_local_names
    }

    /// Record `source -> emitted` and mark `emitted` as consumed.
    pub(crate) fn with_local_name(&self, source: &str, emitted: &str) -> Self {
        let mut next = self.clone();
        Arc::make_mut(&mut next.local_name_map).insert(source.to_string(), emitted.to_string());
        if !next.used_local_names.contains(emitted) {
            Arc::make_mut(&mut next.used_local_names).insert(emitted.to_string());
        }
        next
    }

    /// Mark a synthesized name as consumed without mapping a source name to it.
    pub(crate) fn with_used_name(&self, emitted: &str) -> Self {
        if self.used_local_names.contains(emitted) {
            return self.clone();
        }
        let mut next = self.clone();
        Arc::make_mut(&mut next.used_local_names).insert(emitted.to_string());
        next
    }

    // =========================================================================
    // Temporaries
    // =========================================================================

    pub const fn temp_var_id(&self) -> u64 {
        self.temp_var_id
    }

    /// Take a fresh temporary id; the returned context has the counter advanced.
    pub fn next_temp_var_id(&self) -> (u64, Self) {
        let id = self.temp_var_id;
        let mut next = self.clone();
        next.temp_var_id = id + 1;
        (id, next)
    }

    // =========================================================================
    // Ambient parameters
    // =========================================================================

    pub fn is_int_loop_var(&self, name: &str) -> bool {
        self.int_loop_vars.contains(name)
    }

    pub fn with_int_loop_var(&self, name: &str) -> Self {
        let mut next = self.clone();
        Arc::make_mut(&mut next.int_loop_vars).insert(name.to_string());
        next
    }

    pub const fn is_async(&self) -> bool {
        self.is_async
    }

    pub const fn is_static(&self) -> bool {
        self.is_static
    }

    pub const fn return_type(&self) -> Option<&IrType> {
        self.return_type.as_ref()
    }

    // =========================================================================
    // Scopes
    // =========================================================================

    /// Context for the body of a top-level function: fresh names and no
    /// narrowing, but the unit-wide temporary counter carries on.
    pub fn for_function(&self, is_async: bool, is_static: bool, return_type: Option<IrType>) -> Self {
        Self {
            temp_var_id: self.temp_var_id,
            is_async,
            is_static,
            return_type,
            ..Self::default()
        }
    }

    /// Context for the body of a nested function. Enclosing names stay
    /// visible; narrowing does not survive into a closure body.
    pub fn for_local_function(&self, is_async: bool, return_type: Option<IrType>) -> Self {
        let mut next = self.without_all_bindings();
        next.is_async = is_async;
        next.return_type = return_type;
        next
    }

    /// Child scope for a block-like construct.
    pub fn enter_scope(&self) -> Self {
        self.clone()
    }

    /// Return to this context after lowering a nested construct under `inner`.
    ///
    /// Keeps this context's names, narrowing and ambient parameters, and
    /// takes the temporary counter and consumed names from `inner`.
    pub fn exit_scope(&self, inner: &Self) -> Self {
        let mut next = self.clone();
        next.temp_var_id = self.temp_var_id.max(inner.temp_var_id);
        let grew = !Arc::ptr_eq(&self.used_local_names, &inner.used_local_names)
            && inner
                .used_local_names
                .iter()
                .any(|name| !self.used_local_names.contains(name));
        if grew {
            let used = Arc::make_mut(&mut next.used_local_names);
            used.extend(inner.used_local_names.iter().cloned());
        }
        next
    }

    /// Continue after `inner` with the temporary counter it reached.
    pub fn with_temp_var_id_from(&self, inner: &Self) -> Self {
        let mut next = self.clone();
        next.temp_var_id = self.temp_var_id.max(inner.temp_var_id);
        next
    }
}

/// `a.b.c` starts with `a` and `a.b`, but not with `a.bc`.
fn path_starts_with(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('.'))
}

#[cfg(test)]
#[path = "../tests/context.rs"]
mod tests;
