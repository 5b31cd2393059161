//! Target-language output model for the tscs compiler.
//!
//! The lowering engine builds [`ast::CsNode`] trees; [`printer::CsPrinter`]
//! turns them into source text, and [`runtime`] generates the tagged-union
//! classes that lowered code calls into.

pub mod ast;
pub mod printer;
pub mod runtime;

pub use ast::{CsCatchClause, CsMethod, CsNode, CsParam, CsSwitchSection, CsType};
pub use printer::CsPrinter;
pub use runtime::{emit_union_runtime, union_runtime_declarations};
