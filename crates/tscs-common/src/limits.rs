//! Centralized limits and thresholds for the tscs compiler.
//!
//! # Categories
//!
//! - **Union Arity**: the closed range of tagged-union sizes the runtime provides
//! - **Recursion Depths**: limits to prevent stack overflow in the lowering walk

// =============================================================================
// Union Arity
// =============================================================================

/// Smallest union the tagged-union runtime represents.
///
/// A "union" of one member is just that member; the IR never hands us one,
/// and guard analysis declines anything below this bound.
pub const MIN_UNION_ARITY: usize = 2;

/// Largest union the tagged-union runtime represents.
///
/// The runtime ships `Union<T1, T2>` through `Union<T1, ..., T8>`. Upstream
/// validation rejects wider unions, but guard analysis still declines them
/// rather than trusting that.
///
/// # Source example
///
/// ```typescript
/// type Token = A | B | C | D | E | F | G | H;      // arity 8: supported
/// type Wide  = A | B | C | D | E | F | G | H | I;  // arity 9: rejected upstream
/// ```
pub const MAX_UNION_ARITY: usize = 8;

/// Returns true when `arity` is representable by the tagged-union runtime.
#[inline]
pub const fn is_supported_union_arity(arity: usize) -> bool {
    arity >= MIN_UNION_ARITY && arity <= MAX_UNION_ARITY
}

// =============================================================================
// Recursion Depth Limits (Lowering)
// =============================================================================

/// Maximum nesting depth of statements and expressions during lowering.
///
/// Lowering is structurally recursive, so the walk always terminates; this
/// only protects the native stack against pathological inputs.
///
/// # Source example
///
/// ```typescript
/// // Deeply nested blocks or conditionals:
/// if (a) { if (b) { if (c) { /* ... 500 levels ... */ } } }
///
/// // Deeply nested binary expressions:
/// const x = (((((1 + 2) + 3) + 4) /* ... */));
/// ```
pub const MAX_LOWERING_DEPTH: u32 = 500;

/// Maximum length of a dotted member path used as a nullable narrowing key.
///
/// `a.b.c` has length 3. Longer chains are lowered without narrowing.
pub const MAX_NARROWING_PATH_DEPTH: usize = 100;
