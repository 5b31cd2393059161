//! Guard analysis.
//!
//! Recognizers inspect one condition expression and either describe the
//! narrowing it performs or decline. Declining is the common case and is
//! never an error; the only failure a recognizer reports is a member host
//! that two imported modules both declare.
//!
//! Recognizers run in a fixed priority order:
//!
//! 1. type-predicate call: `isCat(pet)`
//! 2. `in` check: `"meow" in pet`
//! 3. discriminant equality: `shape.kind === "circle"`
//! 4. `instanceof`: `err instanceof HttpError`
//! 5. nullable comparison: `id !== undefined`, `a.b != null`
//!
//! A leading `!` is peeled off and flips the polarity of whatever matches
//! underneath.
//!
//! Guard conditions are re-expressed as runtime membership tests (`x.Is1()`)
//! rather than re-evaluating the source predicate, so an accessor is only
//! ever called on a value that holds the matching member.

mod discriminant;
mod in_check;
mod instanceof;
mod nullable;
mod predicate;
mod union;

pub use union::temp_name;

use crate::bindings::NarrowedBinding;
use crate::context::EmitterContext;
use crate::error::LoweringResult;
use crate::options::LoweringEnv;
use tracing::{Level, span, trace};
use tscs_common::naming::{as_member, is_member};
use tscs_emitter::{CsNode, CsType};
use tscs_ir::{IrExpression, IrExpressionKind, IrType, UnaryOperator};

/// Where a narrowing applies relative to the guarded `if`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Then,
    Else,
    /// Statements after an `if` whose `then` branch always exits.
    FallThrough,
}

/// One narrowing a guard makes available, before it is installed.
#[derive(Debug, Clone, PartialEq)]
pub enum Narrowing {
    /// The subject holds union member `member_n`.
    ///
    /// Inside a branch this materializes `var temp = receiver.AsN();`;
    /// elsewhere reads become `receiver.AsN()`. `temp` is the name the guard
    /// already reserved, if any.
    Member {
        key: String,
        receiver: CsNode,
        member_n: usize,
        member_type: IrType,
        temp: Option<String>,
    },

    /// The subject was captured by a type pattern: `receiver is T name`.
    Pattern {
        key: String,
        name: String,
        receiver: CsNode,
        target: CsType,
        ty: IrType,
    },

    /// Reads of the subject become `expr`.
    Substitute {
        key: String,
        expr: CsNode,
        ty: Option<IrType>,
    },
}

impl Narrowing {
    pub fn key(&self) -> &str {
        match self {
            Self::Member { key, .. } | Self::Pattern { key, .. } | Self::Substitute { key, .. } => key,
        }
    }

    /// Binding that needs no declaration: accessor calls, the pattern
    /// variable, or the substitute expression.
    pub fn inline_binding(&self) -> NarrowedBinding {
        match self {
            Self::Member {
                receiver,
                member_n,
                member_type,
                ..
            } => NarrowedBinding::expr(
                CsNode::method_call(receiver.clone(), as_member(*member_n)),
                Some(member_type.clone()),
            ),
            Self::Pattern { name, ty, .. } => NarrowedBinding::rename(name.clone(), Some(ty.clone())),
            Self::Substitute { expr, ty, .. } => NarrowedBinding::expr(expr.clone(), ty.clone()),
        }
    }

    /// Binding for expression contexts, where no pattern variable exists:
    /// a type pattern becomes a cast.
    pub fn expression_binding(&self) -> NarrowedBinding {
        match self {
            Self::Pattern {
                receiver,
                target,
                ty,
                ..
            } => NarrowedBinding::expr(
                CsNode::cast(target.clone(), receiver.clone()).paren(),
                Some(ty.clone()),
            ),
            other => other.inline_binding(),
        }
    }
}

/// A predicate, `in` or discriminant guard over a tagged union.
#[derive(Debug, Clone)]
pub struct UnionGuard {
    pub original_name: String,
    /// The subject as currently read (through any enclosing binding).
    pub receiver: CsNode,
    pub union_type: IrType,
    pub arity: usize,
    /// 1-based index of the matched member.
    pub member_n: usize,
    pub negated: bool,
    /// Context with the temporary id consumed.
    pub ctx: EmitterContext,
    pub narrowed_name: String,
    pub binding: NarrowedBinding,
}

impl UnionGuard {
    fn member_type(&self, n: usize) -> IrType {
        self.union_type
            .union_members()
            .and_then(|members| members.get(n - 1))
            .cloned()
            .unwrap_or_else(|| self.union_type.clone())
    }

    /// `receiver.IsN()`
    fn test(&self) -> CsNode {
        CsNode::method_call(self.receiver.clone(), is_member(self.member_n))
    }

    fn primary(&self) -> Narrowing {
        Narrowing::Member {
            key: self.original_name.clone(),
            receiver: self.receiver.clone(),
            member_n: self.member_n,
            member_type: self.member_type(self.member_n),
            temp: Some(self.narrowed_name.clone()),
        }
    }

    /// With two members, failing the test proves the other one.
    fn complement(&self) -> Option<Narrowing> {
        if self.arity != 2 {
            return None;
        }
        let other = 3 - self.member_n;
        Some(Narrowing::Member {
            key: self.original_name.clone(),
            receiver: self.receiver.clone(),
            member_n: other,
            member_type: self.member_type(other),
            temp: None,
        })
    }
}

/// `x.kind === "circle"`
#[derive(Debug, Clone)]
pub struct DiscriminantGuard {
    pub union: UnionGuard,
    pub property: String,
    pub literal: CsNode,
    /// The matched member's property type is exactly the compared literal.
    /// Otherwise the member test alone is not enough and the property is
    /// compared too, and there is no complement.
    pub exact: bool,
}

/// `x instanceof T`
#[derive(Debug, Clone)]
pub struct InstanceofGuard {
    pub original_name: String,
    pub receiver: CsNode,
    pub target_type: IrType,
    pub cs_type: CsType,
    pub negated: bool,
    /// Context with the pattern variable reserved in the enclosing scope.
    pub ctx: EmitterContext,
    pub narrowed_name: String,
    pub binding: NarrowedBinding,
}

/// `x != null`, `a.b.c !== undefined`
#[derive(Debug, Clone)]
pub struct NullableGuard {
    /// Identifier or dotted path.
    pub key: String,
    pub operand: CsNode,
    /// The non-nullish value type left once the compared nullish member is excluded.
    pub residual: IrType,
    /// True when the condition holds for the nullish case (`x == null`).
    pub negated: bool,
    pub ctx: EmitterContext,
    pub binding: NarrowedBinding,
}

/// A recognized guard, consumed by the statement engine in the same step.
#[derive(Debug, Clone)]
pub enum GuardInfo {
    Predicate(UnionGuard),
    In(UnionGuard),
    Discriminant(DiscriminantGuard),
    Instanceof(InstanceofGuard),
    Nullable(NullableGuard),
}

impl GuardInfo {
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Predicate(_) => "predicate",
            Self::In(_) => "in",
            Self::Discriminant(_) => "discriminant",
            Self::Instanceof(_) => "instanceof",
            Self::Nullable(_) => "nullable",
        }
    }

    /// The narrowed identifier, or the dotted path for nullable guards.
    pub fn key(&self) -> &str {
        match self {
            Self::Predicate(g) | Self::In(g) => &g.original_name,
            Self::Discriminant(g) => &g.union.original_name,
            Self::Instanceof(g) => &g.original_name,
            Self::Nullable(g) => &g.key,
        }
    }

    /// Context to continue from once the guard is consumed.
    pub const fn ctx(&self) -> &EmitterContext {
        match self {
            Self::Predicate(g) | Self::In(g) => &g.ctx,
            Self::Discriminant(g) => &g.union.ctx,
            Self::Instanceof(g) => &g.ctx,
            Self::Nullable(g) => &g.ctx,
        }
    }

    pub const fn is_negated(&self) -> bool {
        match self {
            Self::Predicate(g) | Self::In(g) => g.negated,
            Self::Discriminant(g) => g.union.negated,
            Self::Instanceof(g) => g.negated,
            Self::Nullable(g) => g.negated,
        }
    }

    pub const fn is_nullable(&self) -> bool {
        matches!(self, Self::Nullable(_))
    }

    /// The binding installed where the guard's positive outcome holds.
    pub const fn binding(&self) -> &NarrowedBinding {
        match self {
            Self::Predicate(g) | Self::In(g) => &g.binding,
            Self::Discriminant(g) => &g.union.binding,
            Self::Instanceof(g) => &g.binding,
            Self::Nullable(g) => &g.binding,
        }
    }

    /// Flip polarity, as for a leading `!`.
    #[must_use]
    pub fn negate(mut self) -> Self {
        match &mut self {
            Self::Predicate(g) | Self::In(g) => g.negated = !g.negated,
            Self::Discriminant(g) => g.union.negated = !g.union.negated,
            Self::Instanceof(g) => g.negated = !g.negated,
            Self::Nullable(g) => g.negated = !g.negated,
        }
        self
    }

    /// The lowered condition for an `if` statement.
    pub fn condition(&self) -> CsNode {
        match self {
            Self::Instanceof(g) => {
                let test = CsNode::is_pattern(
                    g.receiver.clone(),
                    g.cs_type.clone(),
                    Some(g.narrowed_name.clone()),
                );
                apply_polarity(test, g.negated)
            }
            _ => self.expression_condition(),
        }
    }

    /// The lowered condition inside an expression, where no pattern
    /// variable is introduced.
    pub fn expression_condition(&self) -> CsNode {
        match self {
            Self::Predicate(g) | Self::In(g) => apply_polarity(g.test(), g.negated),
            Self::Discriminant(g) => {
                let test = if g.exact {
                    g.union.test()
                } else {
                    let accessed = CsNode::member(
                        CsNode::method_call(g.union.receiver.clone(), as_member(g.union.member_n)),
                        g.property.clone(),
                    );
                    CsNode::logical_and(
                        g.union.test(),
                        CsNode::binary(accessed, "==", g.literal.clone()),
                    )
                };
                apply_polarity(test, g.union.negated)
            }
            Self::Instanceof(g) => {
                let test = CsNode::is_pattern(g.receiver.clone(), g.cs_type.clone(), None);
                apply_polarity(test, g.negated)
            }
            Self::Nullable(g) => CsNode::binary(
                g.operand.clone(),
                if g.negated { "==" } else { "!=" },
                CsNode::NullLiteral,
            ),
        }
    }

    fn primary(&self) -> Narrowing {
        match self {
            Self::Predicate(g) | Self::In(g) => g.primary(),
            Self::Discriminant(g) => g.union.primary(),
            Self::Instanceof(g) => Narrowing::Pattern {
                key: g.original_name.clone(),
                name: g.narrowed_name.clone(),
                receiver: g.receiver.clone(),
                target: g.cs_type.clone(),
                ty: g.target_type.clone(),
            },
            Self::Nullable(g) => Narrowing::Substitute {
                key: g.key.clone(),
                expr: g.binding.read(),
                ty: Some(g.residual.clone()),
            },
        }
    }

    fn complement(&self) -> Option<Narrowing> {
        match self {
            Self::Predicate(g) | Self::In(g) => g.complement(),
            Self::Discriminant(g) if g.exact => g.union.complement(),
            Self::Discriminant(_) | Self::Instanceof(_) | Self::Nullable(_) => None,
        }
    }

    /// The narrowing that holds in `branch`, if any.
    ///
    /// A positive guard narrows `then` to the matched member and the other
    /// branches to the complement; a negated guard swaps the two.
    pub fn narrowing_for(&self, branch: Branch) -> Option<Narrowing> {
        let positive = match branch {
            Branch::Then => !self.is_negated(),
            Branch::Else | Branch::FallThrough => self.is_negated(),
        };
        if positive {
            Some(self.primary())
        } else {
            self.complement()
        }
    }
}

fn apply_polarity(test: CsNode, negated: bool) -> CsNode {
    if negated { CsNode::not(test) } else { test }
}

/// Try every recognizer in priority order.
pub fn resolve_guard(
    condition: &IrExpression,
    ctx: &EmitterContext,
    env: &LoweringEnv,
) -> LoweringResult<Option<GuardInfo>> {
    let _span = span!(Level::TRACE, "resolve_guard", kind = condition.kind.kind_name()).entered();

    if let IrExpressionKind::Unary {
        operator: UnaryOperator::Not,
        operand,
    } = &condition.kind
    {
        return Ok(resolve_guard(operand, ctx, env)?.map(GuardInfo::negate));
    }

    if let Some(guard) = predicate::match_predicate(condition, ctx, env)? {
        return Ok(Some(guard));
    }
    if let Some(guard) = in_check::match_in(condition, ctx, env)? {
        return Ok(Some(guard));
    }
    if let Some(guard) = discriminant::match_discriminant(condition, ctx, env)? {
        return Ok(Some(guard));
    }
    if let Some(guard) = instanceof::match_instanceof(condition, ctx, env)? {
        return Ok(Some(guard));
    }
    if let Some(guard) = nullable::match_nullable(condition, ctx, env)? {
        return Ok(Some(guard));
    }

    trace!("no guard matched");
    Ok(None)
}

#[cfg(test)]
#[path = "../../tests/guards.rs"]
mod tests;
