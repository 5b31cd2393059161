//! Loop lowering.
//!
//! A loop body may run after its own assignments, so every narrowing of a
//! key the loop assigns is dropped before the condition and body are
//! lowered, and stays dropped afterwards. Declarations in the header and
//! body never leak out of the loop.

use crate::assignments::assigned_in_statement;
use crate::context::EmitterContext;
use crate::error::{LoweringError, LoweringResult};
use crate::local_names::allocate;
use crate::lowerer::{Lowered, Lowerer};
use crate::statements::keys;
use tracing::trace;
use tscs_emitter::{CsNode, CsType};
use tscs_ir::{
    AssignmentOperator, IrBindingTarget, IrExpression, IrExpressionKind, IrForInitializer, IrStatement,
    IrVariableDeclarator,
};

/// Member enumerated by a `for...in` loop over a dictionary.
const KEYS_MEMBER: &str = "Keys";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ForEachKind {
    /// `for (x of items)`, `for await (x of stream)`
    Of { is_await: bool },
    /// `for (k in dict)`
    In,
}

impl Lowerer<'_> {
    /// Context for a loop's header and body: the enclosing one without
    /// narrowings the loop invalidates.
    fn loop_base(stmt: &IrStatement, ctx: &EmitterContext) -> EmitterContext {
        let assigned = assigned_in_statement(stmt);
        ctx.without_bindings(keys(&assigned))
    }

    pub(crate) fn lower_while(
        &mut self,
        stmt: &IrStatement,
        condition: &IrExpression,
        body: &IrStatement,
        ctx: &EmitterContext,
    ) -> LoweringResult<Lowered> {
        let base = Self::loop_base(stmt, ctx);
        let condition = self.lower_expression(condition, &base)?;
        let (body, inner) = self.lower_body(body, &base.enter_scope())?;
        Ok((
            vec![CsNode::WhileStatement {
                condition: Box::new(condition),
                body: Box::new(CsNode::block(body)),
            }],
            base.exit_scope(&inner),
        ))
    }

    pub(crate) fn lower_do_while(
        &mut self,
        stmt: &IrStatement,
        body: &IrStatement,
        condition: &IrExpression,
        ctx: &EmitterContext,
    ) -> LoweringResult<Lowered> {
        let base = Self::loop_base(stmt, ctx);
        let (body, inner) = self.lower_body(body, &base.enter_scope())?;
        let after = base.exit_scope(&inner);
        let condition = self.lower_expression(condition, &after)?;
        Ok((
            vec![CsNode::DoWhileStatement {
                body: Box::new(CsNode::block(body)),
                condition: Box::new(condition),
            }],
            after,
        ))
    }

    pub(crate) fn lower_for(
        &mut self,
        stmt: &IrStatement,
        initializer: Option<&IrForInitializer>,
        condition: Option<&IrExpression>,
        update: Option<&IrExpression>,
        body: &IrStatement,
        ctx: &EmitterContext,
    ) -> LoweringResult<Lowered> {
        let base = Self::loop_base(stmt, ctx);
        let mut scope = base.enter_scope();

        let initializer = match initializer {
            None => None,
            Some(IrForInitializer::Expression { expression }) => {
                Some(CsNode::expr_stmt(self.lower_expression(expression, &scope)?))
            }
            Some(IrForInitializer::Declaration(decl)) => {
                let [declarator] = decl.declarations.as_slice() else {
                    return Err(LoweringError::unsupported_statement(
                        stmt,
                        format!("`for` initializer declares {} variables", decl.declarations.len()),
                    ));
                };
                let counter = self.int_counter(declarator, update);
                let forced = counter.map(|_| CsType::predefined("int"));
                let (node, next) = self.lower_declarator(stmt, declarator, forced, &scope)?;
                scope = match counter {
                    Some(name) => {
                        trace!(name, "integer loop counter");
                        next.with_int_loop_var(name)
                    }
                    None => next,
                };
                Some(node)
            }
        };

        let condition = self.lower_optional(condition, &scope)?;
        let incrementors: Vec<CsNode> = self.lower_optional(update, &scope)?.into_iter().collect();
        let (body, inner) = self.lower_body(body, &scope.enter_scope())?;

        Ok((
            vec![CsNode::ForStatement {
                initializer: initializer.map(Box::new),
                condition: condition.map(Box::new),
                incrementors,
                body: Box::new(CsNode::block(body)),
            }],
            base.exit_scope(&inner),
        ))
    }

    /// The counter name when `let i = <int>` is only ever stepped by an
    /// integer in the update clause.
    fn int_counter<'d>(&self, declarator: &'d IrVariableDeclarator, update: Option<&IrExpression>) -> Option<&'d str> {
        if !self.env.options.int_loop_vars {
            return None;
        }
        let IrBindingTarget::Identifier { name } = &declarator.target else {
            return None;
        };
        let starts_integral = declarator
            .initializer
            .as_ref()
            .and_then(IrExpression::as_literal)
            .is_some_and(|value| value.is_integer());
        if !starts_integral || !update.is_some_and(|update| steps_by_integer(update, name)) {
            return None;
        }
        Some(name.as_str())
    }

    pub(crate) fn lower_for_each(
        &mut self,
        stmt: &IrStatement,
        target: &IrBindingTarget,
        expression: &IrExpression,
        body: &IrStatement,
        kind: ForEachKind,
        ctx: &EmitterContext,
    ) -> LoweringResult<Lowered> {
        let is_await = matches!(kind, ForEachKind::Of { is_await: true });
        if is_await && !ctx.is_async() {
            return Err(LoweringError::AwaitOutsideAsync);
        }
        let Some(name) = target.as_identifier() else {
            return Err(LoweringError::unsupported_statement(
                stmt,
                "destructuring loop variables are lowered by an earlier pass",
            ));
        };

        let base = Self::loop_base(stmt, ctx);
        let source = self.lower_expression(expression, &base)?;
        let source = match kind {
            ForEachKind::Of { .. } => source,
            ForEachKind::In => CsNode::member(source, KEYS_MEMBER),
        };

        let (emitted, scope) = allocate(name, &base.enter_scope());
        let scope = scope.without_binding(name);
        let (body, inner) = self.lower_body(body, &scope)?;

        Ok((
            vec![CsNode::ForEachStatement {
                ty: CsType::Var,
                name: emitted,
                expression: Box::new(source),
                body: Box::new(CsNode::block(body)),
                is_await,
            }],
            base.exit_scope(&inner),
        ))
    }
}

/// `i++`, `i--`, `++i`, `--i`, `i += <int>` or `i -= <int>`.
fn steps_by_integer(update: &IrExpression, counter: &str) -> bool {
    match &update.kind {
        IrExpressionKind::Update { operand, .. } => operand.as_identifier() == Some(counter),
        IrExpressionKind::Assignment {
            operator: AssignmentOperator::AddAssign | AssignmentOperator::SubtractAssign,
            target,
            value,
        } => {
            target.as_identifier() == Some(counter) && value.as_literal().is_some_and(|value| value.is_integer())
        }
        _ => false,
    }
}

#[cfg(test)]
#[path = "../tests/loops.rs"]
mod tests;
