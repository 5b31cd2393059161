//! `id !== undefined`, `a.b != null`: unwraps an optional value type.
//!
//! Strict comparisons exclude only the compared nullish kind; loose ones
//! exclude both `null` and `undefined`. The guard engages only when exactly
//! one value type is left, since that is the only case the target spells
//! as `T?` with a `.Value` accessor. Optional reference types need no
//! unwrap and are left alone.

use super::{GuardInfo, NullableGuard};
use crate::bindings::NarrowedBinding;
use crate::context::EmitterContext;
use crate::error::LoweringResult;
use crate::expressions::read_path;
use crate::options::LoweringEnv;
use tracing::{Level, span, trace};
use tscs_common::limits::MAX_NARROWING_PATH_DEPTH;
use tscs_common::naming::NULLABLE_VALUE_MEMBER;
use tscs_emitter::CsNode;
use tscs_ir::{BinaryOperator, IrExpression, IrExpressionKind, IrType, LiteralValue, PrimitiveKind};

pub(super) fn match_nullable(
    condition: &IrExpression,
    ctx: &EmitterContext,
    _env: &LoweringEnv,
) -> LoweringResult<Option<GuardInfo>> {
    let IrExpressionKind::Binary {
        operator,
        left,
        right,
    } = &condition.kind
    else {
        return Ok(None);
    };
    if !operator.is_equality() {
        return Ok(None);
    }
    let (operand, compared) = match (left.as_literal(), right.as_literal()) {
        (_, Some(value)) if value.is_nullish() => (left.as_ref(), value),
        (Some(value), _) if value.is_nullish() => (right.as_ref(), value),
        _ => return Ok(None),
    };
    let Some(key) = operand.member_path() else {
        return Ok(None);
    };
    let _span = span!(Level::TRACE, "nullable_guard", key = key.as_str()).entered();

    if key.split('.').count() > MAX_NARROWING_PATH_DEPTH {
        trace!("declined: member path too deep");
        return Ok(None);
    }
    let Some(operand_type) = operand.inferred_type.as_ref() else {
        trace!("declined: no inferred type");
        return Ok(None);
    };
    let Some(members) = operand_type.union_members() else {
        trace!("declined: not a union");
        return Ok(None);
    };

    let loose = matches!(operator, BinaryOperator::LooseEquals | BinaryOperator::LooseNotEquals);
    let residual: Vec<&IrType> = members
        .iter()
        .filter(|member| !excluded(member, compared, loose))
        .collect();
    let [residual] = residual.as_slice() else {
        trace!(left = residual.len(), "declined: residual is not a single type");
        return Ok(None);
    };
    if residual.is_nullish() || !residual.is_value_type() {
        trace!("declined: residual is not a value type");
        return Ok(None);
    }

    let Some(operand_node) = read_path(operand, ctx) else {
        return Ok(None);
    };
    let unwrapped = CsNode::member(operand_node.clone(), NULLABLE_VALUE_MEMBER);
    Ok(Some(GuardInfo::Nullable(NullableGuard {
        key,
        operand: operand_node,
        residual: (*residual).clone(),
        negated: !operator.is_negated_equality(),
        ctx: ctx.clone(),
        binding: NarrowedBinding::expr(unwrapped, Some((*residual).clone())),
    })))
}

/// Whether comparing against `compared` rules out `member`.
fn excluded(member: &IrType, compared: &LiteralValue, loose: bool) -> bool {
    if !member.is_nullish() {
        return false;
    }
    if loose {
        return true;
    }
    match compared {
        LiteralValue::Null => member_is_null(member),
        _ => !member_is_null(member),
    }
}

fn member_is_null(member: &IrType) -> bool {
    matches!(
        member,
        IrType::Primitive {
            primitive: PrimitiveKind::Null
        } | IrType::Literal {
            value: LiteralValue::Null
        }
    )
}
