//! Narrowing-aware statement and expression lowering for the tscs compiler.
//!
//! Lowers the typed IR of a structurally typed source language into the
//! nominal target AST. The interesting part is flow-sensitive narrowing:
//! guards such as `isCat(pet)`, `"meow" in pet`, `shape.kind === "circle"`,
//! `err instanceof HttpError` and `id !== undefined` are recognized and
//! re-expressed through the tagged-union runtime (`IsN()`/`AsN()`) or the
//! nullable unwrap (`.Value`), in the guarded branch, the opposite branch
//! and after an early exit.
//!
//! ```text
//! IrStatement ──▶ statements / if_lowering / loops ──▶ CsNode
//!                        │
//!                        ▼
//!                   guards::resolve_guard ──▶ GuardInfo ──▶ EmitterContext'
//! ```
//!
//! Every call takes an [`EmitterContext`] and returns a derived one; nothing
//! is mutated in place.

// Ambient: errors, options, tracing setup
pub mod error;
pub use error::{LoweringError, LoweringResult};
pub mod options;
pub use options::{LoweringEnv, LoweringOptions};
pub mod tracing_config;
pub use tracing_config::init_tracing;

// Narrowing state: bindings, context, local names
pub mod bindings;
pub use bindings::NarrowedBinding;
pub mod context;
pub use context::{EmitterContext, NarrowedBindings};
pub mod local_names;
pub use local_names::{allocate, allocate_synthesized, escape_identifier, register};

// Guard analysis
pub mod guards;
pub use guards::{Branch, GuardInfo, Narrowing, resolve_guard};

// Type syntax and the assignment scan
pub mod assignments;
pub mod types;
pub use types::{lower_return_type, lower_type};

// The lowerer
pub mod expressions;
mod if_lowering;
mod loops;
mod lowerer;
mod statements;
pub use lowerer::{lower_expression, lower_function, lower_module, lower_statement, lower_statements};
