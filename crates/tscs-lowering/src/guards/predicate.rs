//! `isCat(pet)` where the callee is a type predicate `(x) => x is Cat`.

use super::GuardInfo;
use super::union::UnionSubject;
use crate::context::EmitterContext;
use crate::error::LoweringResult;
use crate::options::LoweringEnv;
use tracing::{Level, span, trace};
use tscs_ir::{IrExpression, IrExpressionKind, NarrowingDescriptor};

pub(super) fn match_predicate(
    condition: &IrExpression,
    ctx: &EmitterContext,
    _env: &LoweringEnv,
) -> LoweringResult<Option<GuardInfo>> {
    let IrExpressionKind::Call {
        arguments,
        narrowing:
            Some(NarrowingDescriptor::TypePredicate {
                parameter_index,
                target_type,
            }),
        ..
    } = &condition.kind
    else {
        return Ok(None);
    };
    let _span = span!(Level::TRACE, "predicate_guard").entered();

    let Some(argument) = arguments.get(*parameter_index) else {
        trace!(parameter_index, "declined: predicate argument missing");
        return Ok(None);
    };
    let Some(subject) = UnionSubject::resolve(argument, ctx) else {
        return Ok(None);
    };
    let Some(index) = subject.members.iter().position(|member| member == target_type) else {
        trace!(name = subject.name, "declined: predicate target is not a union member");
        return Ok(None);
    };

    Ok(Some(GuardInfo::Predicate(subject.into_guard(index + 1, ctx))))
}
