//! `shape.kind === "circle"` over a union whose members carry literal-typed
//! discriminant properties.

use super::union::UnionSubject;
use super::{DiscriminantGuard, GuardInfo};
use crate::context::EmitterContext;
use crate::error::LoweringResult;
use crate::expressions::lower_literal;
use crate::options::LoweringEnv;
use tracing::{Level, span, trace};
use tscs_ir::{IrExpression, IrExpressionKind, LiteralValue};

pub(super) fn match_discriminant(
    condition: &IrExpression,
    ctx: &EmitterContext,
    env: &LoweringEnv,
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
    let Some((object, property, literal)) = split_operands(left, right) else {
        return Ok(None);
    };
    let _span = span!(Level::TRACE, "discriminant_guard", property).entered();

    if literal.is_nullish() {
        trace!("declined: nullish comparison is a nullable guard");
        return Ok(None);
    }
    let Some(subject) = UnionSubject::resolve(object, ctx) else {
        return Ok(None);
    };

    let mut matches: Vec<(usize, bool)> = Vec::new();
    for (index, member) in subject.members.iter().enumerate() {
        let Some(property_type) = env.members.property_of(member, property)? else {
            continue;
        };
        let Some(literals) = property_type.literal_set() else {
            // A non-literal property type (e.g. `string`) could hold the
            // compared value at runtime, so no single member is proven.
            trace!(member = index + 1, "declined: property is not literal-typed");
            return Ok(None);
        };
        if literals.contains(&literal) {
            matches.push((index + 1, literals.len() == 1));
        }
    }

    let [(member_n, exact)] = matches.as_slice() else {
        trace!(candidates = matches.len(), "declined: literal does not select exactly one member");
        return Ok(None);
    };

    let mut union = subject.into_guard(*member_n, ctx);
    union.negated = operator.is_negated_equality();
    Ok(Some(GuardInfo::Discriminant(DiscriminantGuard {
        union,
        property: property.to_string(),
        literal: lower_literal(literal),
        exact: *exact,
    })))
}

/// `x.p OP lit` or `lit OP x.p`.
fn split_operands<'a>(
    left: &'a IrExpression,
    right: &'a IrExpression,
) -> Option<(&'a IrExpression, &'a str, &'a LiteralValue)> {
    let access = |expr: &'a IrExpression| match &expr.kind {
        IrExpressionKind::MemberAccess {
            object,
            property,
            optional: false,
        } => Some((object.as_ref(), property.as_str())),
        _ => None,
    };
    if let (Some((object, property)), Some(literal)) = (access(left), right.as_literal()) {
        return Some((object, property, literal));
    }
    if let (Some(literal), Some((object, property))) = (left.as_literal(), access(right)) {
        return Some((object, property, literal));
    }
    None
}
