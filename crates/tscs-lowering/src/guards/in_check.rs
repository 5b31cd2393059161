//! `"meow" in pet`: narrows to the only member that declares the property.

use super::GuardInfo;
use super::union::UnionSubject;
use crate::context::EmitterContext;
use crate::error::LoweringResult;
use crate::options::LoweringEnv;
use tracing::{Level, span, trace};
use tscs_ir::{BinaryOperator, IrExpression, IrExpressionKind, LiteralValue};

pub(super) fn match_in(
    condition: &IrExpression,
    ctx: &EmitterContext,
    env: &LoweringEnv,
) -> LoweringResult<Option<GuardInfo>> {
    let IrExpressionKind::Binary {
        operator: BinaryOperator::In,
        left,
        right,
    } = &condition.kind
    else {
        return Ok(None);
    };
    let _span = span!(Level::TRACE, "in_guard").entered();

    let Some(LiteralValue::String(property)) = left.as_literal() else {
        trace!("declined: property is not a string literal");
        return Ok(None);
    };
    let Some(subject) = UnionSubject::resolve(right, ctx) else {
        return Ok(None);
    };

    let mut hosts = Vec::new();
    for (index, member) in subject.members.iter().enumerate() {
        if env.members.property_of(member, property)?.is_some() {
            hosts.push(index + 1);
        }
    }

    match hosts.as_slice() {
        [member_n] => Ok(Some(GuardInfo::In(subject.into_guard(*member_n, ctx)))),
        [] => {
            trace!(property = property.as_str(), "declined: no member declares the property");
            Ok(None)
        }
        _ => {
            trace!(
                property = property.as_str(),
                hosts = hosts.len(),
                "declined: several members declare the property"
            );
            Ok(None)
        }
    }
}
