//! Shared preconditions for guards over tagged unions.

use super::UnionGuard;
use crate::bindings::NarrowedBinding;
use crate::context::EmitterContext;
use crate::expressions::read_identifier;
use tracing::trace;
use tscs_common::limits::is_supported_union_arity;
use tscs_common::naming::TEMP_SEPARATOR;
use tscs_emitter::CsNode;
use tscs_ir::{IrExpression, IrType};

/// Name of the local that holds member `member_n` of `source`: `pet__1_0`.
pub fn temp_name(source: &str, member_n: usize, id: u64) -> String {
    format!("{source}{TEMP_SEPARATOR}{member_n}_{id}")
}

/// A bare identifier whose type is a narrowable union.
pub(super) struct UnionSubject<'a> {
    pub name: &'a str,
    pub receiver: CsNode,
    pub union_type: &'a IrType,
    pub members: &'a [IrType],
}

impl UnionSubject<'_> {
    /// Resolve `expr` as the subject of a union guard, or decline.
    ///
    /// Declines for anything but a bare identifier, missing type
    /// information, non-unions, optional unions and unsupported arities.
    /// An active binding's type takes precedence over the inferred one.
    pub(super) fn resolve<'a>(expr: &'a IrExpression, ctx: &'a EmitterContext) -> Option<UnionSubject<'a>> {
        let name = expr.as_identifier()?;
        let narrowed = ctx.narrowed_binding(name).and_then(NarrowedBinding::ty);
        let Some(union_type) = narrowed.or(expr.inferred_type.as_ref()) else {
            trace!(name, "declined: no inferred type");
            return None;
        };
        let Some(members) = union_type.union_members() else {
            trace!(name, "declined: not a union");
            return None;
        };
        if union_type.has_nullish_member() {
            trace!(name, "declined: union includes a nullish member");
            return None;
        }
        if !is_supported_union_arity(members.len()) {
            trace!(name, arity = members.len(), "declined: unsupported union arity");
            return None;
        }
        Some(UnionSubject {
            name,
            receiver: read_identifier(name, ctx),
            union_type,
            members,
        })
    }

    /// Build the guard for 1-based member `member_n`, consuming a temporary id.
    pub(super) fn into_guard(self, member_n: usize, ctx: &EmitterContext) -> UnionGuard {
        let (id, ctx) = ctx.next_temp_var_id();
        let narrowed_name = temp_name(self.name, member_n, id);
        let member_type = self.members[member_n - 1].clone();
        UnionGuard {
            original_name: self.name.to_string(),
            receiver: self.receiver,
            union_type: self.union_type.clone(),
            arity: self.members.len(),
            member_n,
            negated: false,
            ctx,
            binding: NarrowedBinding::rename(narrowed_name.clone(), Some(member_type)),
            narrowed_name,
        }
    }
}
