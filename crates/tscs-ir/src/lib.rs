//! Typed IR for the tscs compiler.
//!
//! The upstream checker produces this tree; the lowering engine reads it and
//! never mutates it. Every expression may carry its inferred type, optional
//! values are unions containing a nullish member, and unions have already
//! been validated against the runtime's arity bounds.

// Inferred types (primitives, literals, references, unions)
pub mod types;
pub use types::{IrType, LiteralValue, PrimitiveKind, ReferenceType, TypeKind, UnionMembers};

// Expressions and upstream narrowing descriptors
pub mod expr;
pub use expr::{
    AssignmentOperator, BinaryOperator, IrExpression, IrExpressionKind, LogicalOperator,
    NarrowingDescriptor, UnaryOperator, UpdateOperator,
};

// Statements, functions, compilation units
pub mod stmt;
pub use stmt::{
    IrBindingTarget, IrCatchClause, IrForInitializer, IrFunction, IrModule, IrParameter,
    IrStatement, IrSwitchCase, IrVariableDeclaration, IrVariableDeclarator, VariableKind,
};

// Structural member index (local + cross-module)
pub mod members;
pub use members::{AmbiguousHost, MemberIndex, ModuleMemberIndex, TypeMembers};
