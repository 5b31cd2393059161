//! Lowering failures.
//!
//! A guard that does not match is never an error: recognizers return `None`.
//! Everything here is fatal for the statement being lowered.

use thiserror::Error;
use tscs_ir::{AmbiguousHost, IrExpressionKind, IrStatement};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoweringError {
    /// Internal compiler error: a statement shape this engine does not lower.
    #[error("internal compiler error: cannot lower `{kind}` statement: {reason}")]
    UnsupportedStatement { kind: &'static str, reason: String },

    /// Internal compiler error: an expression shape this engine does not lower.
    #[error("internal compiler error: cannot lower `{kind}` expression: {reason}")]
    UnsupportedExpression { kind: &'static str, reason: String },

    #[error("internal compiler error: `await` outside an async function")]
    AwaitOutsideAsync,

    /// A union member's type is declared by more than one imported module.
    #[error("cannot resolve members of `{type_name}`: declared by {}", modules.join(", "))]
    AmbiguousMemberHost {
        type_name: String,
        modules: Vec<String>,
    },

    #[error("internal compiler error: lowering nested deeper than {depth} levels")]
    DepthLimitExceeded { depth: u32 },
}

impl LoweringError {
    pub fn unsupported_statement(stmt: &IrStatement, reason: impl Into<String>) -> Self {
        Self::UnsupportedStatement {
            kind: stmt.kind_name(),
            reason: reason.into(),
        }
    }

    pub fn unsupported_expression(kind: &IrExpressionKind, reason: impl Into<String>) -> Self {
        Self::UnsupportedExpression {
            kind: kind.kind_name(),
            reason: reason.into(),
        }
    }

    /// Whether this is an internal compiler error (a lowering gap) rather
    /// than a problem with the program's module graph.
    pub const fn is_internal(&self) -> bool {
        !matches!(self, Self::AmbiguousMemberHost { .. })
    }
}

impl From<AmbiguousHost> for LoweringError {
    fn from(err: AmbiguousHost) -> Self {
        Self::AmbiguousMemberHost {
            type_name: err.type_name,
            modules: err.modules,
        }
    }
}

pub type LoweringResult<T> = Result<T, LoweringError>;
