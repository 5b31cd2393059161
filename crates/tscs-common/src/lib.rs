//! Common constants for the tscs compiler.
//!
//! This crate provides the small set of values every other tscs crate agrees on:
//! - Compiler limits and thresholds (union arity bounds, recursion caps)
//! - The naming contract between lowered code and the tagged-union runtime

// Centralized limits and thresholds
pub mod limits;

// Accessor and temporary naming shared by the lowering engine and the runtime generator
pub mod naming;
pub use naming::{as_member, from_member, is_member};
