//! Naming contract for the tagged-union runtime.
//!
//! Lowered code and the generated runtime must agree on these spellings:
//! every `Union<T1..TN>` exposes `Is1()..IsN()` and `As1()..AsN()`, plus
//! `From1..FromN` factories. Nullable value types unwrap through `.Value`.

/// Membership test method for 1-based member `n`: `Is{n}`.
pub fn is_member(n: usize) -> String {
    format!("Is{n}")
}

/// Unwrap accessor method for 1-based member `n`: `As{n}`.
pub fn as_member(n: usize) -> String {
    format!("As{n}")
}

/// Factory method for 1-based member `n`: `From{n}`.
pub fn from_member(n: usize) -> String {
    format!("From{n}")
}

/// Member that unwraps a nullable value type.
pub const NULLABLE_VALUE_MEMBER: &str = "Value";

/// Separator between a source name and the synthesized suffix of a narrowing temporary.
pub const TEMP_SEPARATOR: &str = "__";

#[cfg(test)]
#[path = "../tests/naming.rs"]
mod tests;
