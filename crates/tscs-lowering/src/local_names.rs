//! Collision-free local names.
//!
//! The target language forbids a local that reuses the name of a local in
//! an enclosing (or nested) block of the same method. Every declaration
//! goes through [`allocate`], which picks the candidate itself when it is
//! free and appends `_1`, `_2`, ... otherwise.

use crate::context::EmitterContext;
use tracing::trace;

/// Reserved words of the target language that must be escaped with `@`.
const RESERVED_WORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked", "class",
    "const", "continue", "decimal", "default", "delegate", "do", "double", "else", "enum", "event",
    "explicit", "extern", "false", "finally", "fixed", "float", "for", "foreach", "goto", "if",
    "implicit", "in", "int", "interface", "internal", "is", "lock", "long", "namespace", "new",
    "null", "object", "operator", "out", "override", "params", "private", "protected", "public",
    "readonly", "ref", "return", "sbyte", "sealed", "short", "sizeof", "stackalloc", "static",
    "string", "struct", "switch", "this", "throw", "true", "try", "typeof", "uint", "ulong",
    "unchecked", "unsafe", "ushort", "using", "virtual", "void", "volatile", "while",
];

/// `@event` for reserved words, the name itself otherwise.
pub fn escape_identifier(name: &str) -> String {
    if RESERVED_WORDS.contains(&name) {
        format!("@{name}")
    } else {
        name.to_string()
    }
}

/// Pick a target name for `candidate` that no visible declaration uses,
/// and record the mapping in the returned context.
pub fn allocate(candidate: &str, ctx: &EmitterContext) -> (String, EmitterContext) {
    let base = escape_identifier(candidate);
    let emitted = if ctx.is_name_used(&base) {
        let mut suffix = 1usize;
        loop {
            let attempt = format!("{base}_{suffix}");
            if !ctx.is_name_used(&attempt) {
                break attempt;
            }
            suffix += 1;
        }
    } else {
        base
    };

    if emitted != candidate {
        trace!(candidate, emitted = %emitted, "renamed local to avoid a collision");
    }
    let next = ctx.with_local_name(candidate, &emitted);
    (emitted, next)
}

/// Install `source -> emitted` without collision detection; the caller
/// guarantees uniqueness (parameters, for example).
pub fn register(source: &str, emitted: &str, ctx: &EmitterContext) -> EmitterContext {
    ctx.with_local_name(source, emitted)
}

/// Reserve a synthesized name (a narrowing temporary or pattern variable)
/// that no source identifier maps to.
pub fn allocate_synthesized(candidate: &str, ctx: &EmitterContext) -> (String, EmitterContext) {
    let mut emitted = candidate.to_string();
    let mut suffix = 1usize;
    while ctx.is_name_used(&emitted) {
        emitted = format!("{candidate}_{suffix}");
        suffix += 1;
    }
    let next = ctx.with_used_name(&emitted);
    (emitted, next)
}

#[cfg(test)]
#[path = "../tests/local_names.rs"]
mod tests;
