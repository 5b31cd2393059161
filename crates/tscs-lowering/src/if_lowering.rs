//! `if` lowering: where guard narrowing is installed and propagated.
//!
//! ```text
//! if (isCat(pet)) { feed(pet); }        if (pet.Is1())
//!                                       {
//!                                           var pet__1_0 = pet.As1();
//!                                           feed(pet__1_0);
//!                                       }
//!
//! if (shape.kind !== "circle") return;  if (!shape.Is1())
//! area(shape);                          {
//!                                           var shape__2_1 = shape.As2();
//!                                           return;
//!                                       }
//!                                       area(shape.As1());
//! ```
//!
//! Rules, by condition shape:
//! - no guard: both branches under the incoming context;
//! - whole-condition guard: `then` gets the guard's narrowing, `else` the
//!   complement when there is one (arity 2). With no `else` and a `then`
//!   that always exits, the complement also covers the statements after
//!   the `if`;
//! - `guard && rest` without `else`: a nested `if`, so `rest` is evaluated
//!   only once the guard holds and reads the narrowed name;
//! - `guard && rest` with `else`: one condition `test && rest'` with the
//!   narrowing inlined into `rest'` and `then`, leaving `else` unnarrowed;
//! - nullable comparisons anywhere in a `&&` chain narrow the later
//!   conjuncts and `then` (non-null polarity only).
//!
//! Narrowing never leaks out of a branch, and anything the statement
//! assigns loses its narrowing afterwards.

use crate::assignments::assigned_in_statement;
use crate::bindings::NarrowedBinding;
use crate::context::EmitterContext;
use crate::error::LoweringResult;
use crate::expressions::flatten_conjuncts;
use crate::guards::{Branch, GuardInfo, Narrowing, resolve_guard, temp_name};
use crate::local_names::allocate_synthesized;
use crate::lowerer::{Lowered, Lowerer};
use crate::statements::keys;
use tracing::{Level, debug, span};
use tscs_common::naming::as_member;
use tscs_emitter::CsNode;
use tscs_ir::{IrExpression, IrStatement};

/// Install `narrowing` at the top of a branch whose scope is `ctx`.
///
/// A union member narrowing declares its temporary as the branch's first
/// statement; the other kinds need no declaration.
fn materialize(narrowing: Narrowing, ctx: &EmitterContext) -> (Vec<CsNode>, EmitterContext) {
    match narrowing {
        Narrowing::Member {
            key,
            receiver,
            member_n,
            member_type,
            temp,
        } => {
            let (candidate, ctx) = match temp {
                Some(name) => (name, ctx.clone()),
                None => {
                    let (id, ctx) = ctx.next_temp_var_id();
                    (temp_name(&key, member_n, id), ctx)
                }
            };
            let (name, ctx) = allocate_synthesized(&candidate, &ctx);
            let declaration = CsNode::var(name.clone(), CsNode::method_call(receiver, as_member(member_n)));
            debug!(key = key.as_str(), temp = name.as_str(), "narrowed to union member {member_n}");
            let ctx = ctx.with_binding(key, NarrowedBinding::rename(name, Some(member_type)));
            (vec![declaration], ctx)
        }
        other => {
            debug!(key = other.key(), "narrowed inline");
            let ctx = ctx.with_binding(other.key(), other.inline_binding());
            (Vec::new(), ctx)
        }
    }
}

/// Lowered `if` plus the narrowing, if any, that holds after it.
type IfLowered = (Vec<CsNode>, EmitterContext, Option<Narrowing>);

fn without_fall_through(lowered: LoweringResult<Lowered>) -> LoweringResult<IfLowered> {
    lowered.map(|(nodes, ctx)| (nodes, ctx, None))
}

fn materialize_for(guard: &GuardInfo, branch: Branch, ctx: &EmitterContext) -> (Vec<CsNode>, EmitterContext) {
    match guard.narrowing_for(branch) {
        Some(narrowing) => materialize(narrowing, ctx),
        None => (Vec::new(), ctx.clone()),
    }
}

/// `ctx` with the `then` narrowing of every non-null check among `guards`.
fn with_nullable_narrowing(guards: &[GuardInfo], ctx: &EmitterContext) -> EmitterContext {
    let mut ctx = ctx.clone();
    for guard in guards.iter().filter(|guard| guard.is_nullable()) {
        if let Some(narrowing) = guard.narrowing_for(Branch::Then) {
            ctx = ctx.with_binding(narrowing.key(), narrowing.inline_binding());
        }
    }
    ctx
}

impl Lowerer<'_> {
    pub(crate) fn lower_if(
        &mut self,
        stmt: &IrStatement,
        condition: &IrExpression,
        then_statement: &IrStatement,
        else_statement: Option<&IrStatement>,
        ctx: &EmitterContext,
    ) -> LoweringResult<Lowered> {
        let _span = span!(Level::TRACE, "lower_if").entered();

        let conjuncts = flatten_conjuncts(condition);
        let (nodes, after, fall_through) =
            self.lower_if_conjuncts(&conjuncts, then_statement, else_statement, ctx)?;

        let assigned = assigned_in_statement(stmt);
        let mut next = after.without_bindings(keys(&assigned));
        // The exiting branch's own assignments never reach the code after it.
        if let Some(narrowing) = fall_through {
            debug!(key = narrowing.key(), "narrowing propagated past early exit");
            next = next.with_binding(narrowing.key(), narrowing.inline_binding());
        }
        Ok((nodes, next))
    }

    /// `conjuncts` is never empty: a condition flattens to at least itself.
    fn lower_if_conjuncts(
        &mut self,
        conjuncts: &[&IrExpression],
        then_statement: &IrStatement,
        else_statement: Option<&IrStatement>,
        ctx: &EmitterContext,
    ) -> LoweringResult<IfLowered> {
        match conjuncts {
            [single] => match resolve_guard(single, ctx, self.env)? {
                Some(guard) => self.lower_guarded_if(&guard, then_statement, else_statement),
                None => without_fall_through(self.lower_plain_if(conjuncts, then_statement, else_statement, ctx)),
            },
            [first, rest @ ..] => {
                if let Some(guard) = resolve_guard(first, ctx, self.env)?
                    && !guard.is_nullable()
                    && let Some(narrowing) = guard.narrowing_for(Branch::Then)
                {
                    let lowered = match else_statement {
                        None => self.lower_nested_guard_if(&guard, narrowing, rest, then_statement),
                        Some(else_statement) => {
                            self.lower_inline_guard_if(&guard, narrowing, rest, then_statement, else_statement)
                        }
                    };
                    return without_fall_through(lowered);
                }
                without_fall_through(self.lower_plain_if(conjuncts, then_statement, else_statement, ctx))
            }
            [] => without_fall_through(self.lower_plain_if(conjuncts, then_statement, else_statement, ctx)),
        }
    }

    /// The whole condition is one guard.
    fn lower_guarded_if(
        &mut self,
        guard: &GuardInfo,
        then_statement: &IrStatement,
        else_statement: Option<&IrStatement>,
    ) -> LoweringResult<IfLowered> {
        let _span = span!(Level::TRACE, "guarded_if", kind = guard.kind_name(), key = guard.key()).entered();

        let gctx = guard.ctx();
        let (prelude, then_ctx) = materialize_for(guard, Branch::Then, &gctx.enter_scope());
        let (then_branch, then_out) = self.lower_branch(then_statement, prelude, &then_ctx)?;
        let mut after = gctx.exit_scope(&then_out);

        let else_branch = match else_statement {
            Some(else_statement) => {
                let (prelude, else_ctx) = materialize_for(guard, Branch::Else, &after.enter_scope());
                let (node, else_out) = self.lower_else(else_statement, prelude, &else_ctx)?;
                after = after.exit_scope(&else_out);
                Some(node)
            }
            None => None,
        };

        let node = CsNode::if_stmt(guard.condition(), then_branch, else_branch);
        let fall_through = if else_statement.is_none() && then_statement.terminates() {
            guard.narrowing_for(Branch::FallThrough)
        } else {
            None
        };
        Ok((vec![node], after, fall_through))
    }

    /// `guard && rest` with no `else`: `if (test) { prelude; if (rest) then }`.
    fn lower_nested_guard_if(
        &mut self,
        guard: &GuardInfo,
        narrowing: Narrowing,
        rest: &[&IrExpression],
        then_statement: &IrStatement,
    ) -> LoweringResult<Lowered> {
        let _span = span!(Level::TRACE, "nested_guard_if", kind = guard.kind_name(), key = guard.key()).entered();

        let gctx = guard.ctx();
        let (mut body, body_ctx) = materialize(narrowing, &gctx.enter_scope());
        let (inner_nodes, inner, _) = self.lower_if_conjuncts(rest, then_statement, None, &body_ctx)?;
        body.extend(inner_nodes);

        let node = CsNode::if_stmt(guard.condition(), CsNode::block(body), None);
        Ok((vec![node], gctx.exit_scope(&inner)))
    }

    /// `guard && rest` with an `else`: one condition, narrowing inlined.
    fn lower_inline_guard_if(
        &mut self,
        guard: &GuardInfo,
        narrowing: Narrowing,
        rest: &[&IrExpression],
        then_statement: &IrStatement,
        else_statement: &IrStatement,
    ) -> LoweringResult<Lowered> {
        let _span = span!(Level::TRACE, "inline_guard_if", kind = guard.kind_name(), key = guard.key()).entered();

        let gctx = guard.ctx();
        let narrowed = gctx.with_binding(narrowing.key(), narrowing.inline_binding());
        let (rest_condition, rest_guards) = self.lower_conjuncts(rest, &narrowed)?;
        let condition = CsNode::logical_and(guard.condition(), rest_condition);

        let then_ctx = with_nullable_narrowing(&rest_guards, &narrowed).enter_scope();
        let (then_branch, then_out) = self.lower_branch(then_statement, Vec::new(), &then_ctx)?;
        let after = gctx.exit_scope(&then_out);

        let (else_branch, else_out) = self.lower_else(else_statement, Vec::new(), &after.enter_scope())?;
        let after = after.exit_scope(&else_out);

        Ok((vec![CsNode::if_stmt(condition, then_branch, Some(else_branch))], after))
    }

    /// No whole-condition guard. Expression-level narrowing still applies
    /// inside the condition, and non-null checks narrow `then`.
    fn lower_plain_if(
        &mut self,
        conjuncts: &[&IrExpression],
        then_statement: &IrStatement,
        else_statement: Option<&IrStatement>,
        ctx: &EmitterContext,
    ) -> LoweringResult<Lowered> {
        let (condition, guards) = self.lower_conjuncts(conjuncts, ctx)?;

        let then_ctx = with_nullable_narrowing(&guards, ctx).enter_scope();
        let (then_branch, then_out) = self.lower_branch(then_statement, Vec::new(), &then_ctx)?;
        let mut after = ctx.exit_scope(&then_out);

        let else_branch = match else_statement {
            Some(else_statement) => {
                let (node, else_out) = self.lower_else(else_statement, Vec::new(), &after.enter_scope())?;
                after = after.exit_scope(&else_out);
                Some(node)
            }
            None => None,
        };

        Ok((vec![CsNode::if_stmt(condition, then_branch, else_branch)], after))
    }

    /// A branch always lowers to a braced block, `prelude` first.
    fn lower_branch(
        &mut self,
        branch: &IrStatement,
        prelude: Vec<CsNode>,
        ctx: &EmitterContext,
    ) -> LoweringResult<(CsNode, EmitterContext)> {
        let (nodes, inner) = self.lower_body(branch, ctx)?;
        let mut statements = prelude;
        statements.extend(nodes);
        Ok((CsNode::block(statements), inner))
    }

    /// `else if` chains stay flat when nothing has to precede the nested `if`.
    fn lower_else(
        &mut self,
        branch: &IrStatement,
        prelude: Vec<CsNode>,
        ctx: &EmitterContext,
    ) -> LoweringResult<(CsNode, EmitterContext)> {
        if prelude.is_empty() && matches!(branch, IrStatement::If { .. }) {
            let (mut nodes, inner) = self.lower_statement(branch, ctx)?;
            if matches!(nodes.as_slice(), [CsNode::IfStatement { .. }])
                && let Some(node) = nodes.pop()
            {
                return Ok((node, inner));
            }
            return Ok((CsNode::block(nodes), inner));
        }
        self.lower_branch(branch, prelude, ctx)
    }
}

#[cfg(test)]
#[path = "../tests/if_lowering.rs"]
mod tests;
