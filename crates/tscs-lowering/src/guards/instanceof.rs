//! `err instanceof HttpError`: narrows through a type pattern variable.

use super::{GuardInfo, InstanceofGuard};
use crate::bindings::NarrowedBinding;
use crate::context::EmitterContext;
use crate::error::LoweringResult;
use crate::expressions::{instance_type, read_identifier};
use crate::local_names::allocate_synthesized;
use crate::options::LoweringEnv;
use crate::types::lower_type;
use tracing::{Level, span, trace};
use tscs_common::naming::TEMP_SEPARATOR;
use tscs_ir::{BinaryOperator, IrExpression, IrExpressionKind};

pub(super) fn match_instanceof(
    condition: &IrExpression,
    ctx: &EmitterContext,
    env: &LoweringEnv,
) -> LoweringResult<Option<GuardInfo>> {
    let IrExpressionKind::Binary {
        operator: BinaryOperator::Instanceof,
        left,
        right,
    } = &condition.kind
    else {
        return Ok(None);
    };
    let _span = span!(Level::TRACE, "instanceof_guard").entered();

    let Some(name) = left.as_identifier() else {
        trace!("declined: left operand is not an identifier");
        return Ok(None);
    };
    let Some(target_type) = instance_type(right) else {
        trace!(name, "declined: right operand does not name a type");
        return Ok(None);
    };

    let cs_type = lower_type(&target_type, &env.options)?;
    let receiver = read_identifier(name, ctx);
    let (id, ctx) = ctx.next_temp_var_id();
    // The pattern variable lives in the scope enclosing the `if`.
    let (narrowed_name, ctx) = allocate_synthesized(&format!("{name}{TEMP_SEPARATOR}is_{id}"), &ctx);

    Ok(Some(GuardInfo::Instanceof(InstanceofGuard {
        original_name: name.to_string(),
        receiver,
        binding: NarrowedBinding::rename(narrowed_name.clone(), Some(target_type.clone())),
        target_type,
        cs_type,
        negated: false,
        ctx,
        narrowed_name,
    })))
}
