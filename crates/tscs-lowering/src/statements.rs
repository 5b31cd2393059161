//! Statement lowering.
//!
//! Each statement lowers to zero or more target statements plus the
//! context that the following sibling statements see. Block-like
//! constructs lower their bodies in a child scope and hand back the
//! enclosing scope's names; loops live in `loops.rs` and `if` in
//! `if_lowering.rs`.

use crate::assignments::{assigned_in_expression, assigned_in_statement};
use crate::context::EmitterContext;
use crate::error::{LoweringError, LoweringResult};
use crate::local_names::allocate;
use crate::loops::ForEachKind;
use crate::lowerer::{Lowered, Lowerer};
use crate::types::{lower_return_type, lower_type};
use rustc_hash::FxHashSet;
use tracing::{Level, span};
use tscs_emitter::{CsCatchClause, CsMethod, CsNode, CsParam, CsSwitchSection, CsType};
use tscs_ir::{
    IrCatchClause, IrExpression, IrFunction, IrStatement, IrSwitchCase, IrVariableDeclaration,
    IrVariableDeclarator,
};

/// Iterate the keys of an assignment scan as `&str`.
pub(crate) fn keys(assigned: &FxHashSet<String>) -> impl Iterator<Item = &str> {
    assigned.iter().map(String::as_str)
}

impl Lowerer<'_> {
    pub(crate) fn lower_statements(&mut self, stmts: &[IrStatement], ctx: &EmitterContext) -> LoweringResult<Lowered> {
        let mut out = Vec::with_capacity(stmts.len());
        let mut ctx = ctx.clone();
        for stmt in stmts {
            let (nodes, next) = self.lower_statement(stmt, &ctx)?;
            out.extend(nodes);
            ctx = next;
        }
        Ok((out, ctx))
    }

    pub(crate) fn lower_statement(&mut self, stmt: &IrStatement, ctx: &EmitterContext) -> LoweringResult<Lowered> {
        self.enter()?;
        let result = self.lower_statement_kind(stmt, ctx);
        self.leave();
        result
    }

    fn lower_statement_kind(&mut self, stmt: &IrStatement, ctx: &EmitterContext) -> LoweringResult<Lowered> {
        match stmt {
            IrStatement::VariableDeclaration(decl) => self.lower_variable_declaration(stmt, decl, ctx),

            IrStatement::Expression { expression } => {
                let node = self.lower_expression(expression, ctx)?;
                let assigned = assigned_in_expression(expression);
                Ok((vec![CsNode::expr_stmt(node)], ctx.without_bindings(keys(&assigned))))
            }

            IrStatement::Return { expression } => {
                let value = self.lower_optional(expression.as_ref(), ctx)?;
                Ok((vec![CsNode::ret(value)], ctx.clone()))
            }

            IrStatement::Throw { expression } => {
                let value = self.lower_expression(expression, ctx)?;
                Ok((vec![CsNode::throw(value)], ctx.clone()))
            }

            IrStatement::If {
                condition,
                then_statement,
                else_statement,
            } => self.lower_if(stmt, condition, then_statement, else_statement.as_deref(), ctx),

            IrStatement::Block { statements } => {
                let (nodes, inner) = self.lower_statements(statements, &ctx.enter_scope())?;
                let assigned = assigned_in_statement(stmt);
                let next = ctx.exit_scope(&inner).without_bindings(keys(&assigned));
                Ok((vec![CsNode::block(nodes)], next))
            }

            IrStatement::While { condition, body } => self.lower_while(stmt, condition, body, ctx),
            IrStatement::DoWhile { body, condition } => self.lower_do_while(stmt, body, condition, ctx),
            IrStatement::For {
                initializer,
                condition,
                update,
                body,
            } => self.lower_for(
                stmt,
                initializer.as_ref(),
                condition.as_ref(),
                update.as_ref(),
                body,
                ctx,
            ),
            IrStatement::ForOf {
                target,
                expression,
                body,
                is_await,
            } => self.lower_for_each(stmt, target, expression, body, ForEachKind::Of { is_await: *is_await }, ctx),
            IrStatement::ForIn {
                target,
                expression,
                body,
            } => self.lower_for_each(stmt, target, expression, body, ForEachKind::In, ctx),

            IrStatement::Switch {
                discriminant,
                cases,
            } => self.lower_switch(stmt, discriminant, cases, ctx),

            IrStatement::Break { label } => match label {
                Some(label) => Err(LoweringError::unsupported_statement(
                    stmt,
                    format!("labeled jump to `{label}`"),
                )),
                None => Ok((vec![CsNode::BreakStatement], ctx.clone())),
            },
            IrStatement::Continue { label } => match label {
                Some(label) => Err(LoweringError::unsupported_statement(
                    stmt,
                    format!("labeled jump to `{label}`"),
                )),
                None => Ok((vec![CsNode::ContinueStatement], ctx.clone())),
            },

            IrStatement::Try {
                block,
                handler,
                finalizer,
            } => self.lower_try(stmt, block, handler.as_ref(), finalizer.as_deref(), ctx),

            IrStatement::FunctionDeclaration(func) => self.lower_local_function(stmt, func, ctx),

            IrStatement::Empty => Ok((Vec::new(), ctx.clone())),
        }
    }

    pub(crate) fn lower_optional(
        &mut self,
        expr: Option<&IrExpression>,
        ctx: &EmitterContext,
    ) -> LoweringResult<Option<CsNode>> {
        expr.map(|expr| self.lower_expression(expr, ctx)).transpose()
    }

    /// Lower a construct body in the scope `ctx`. A block's statements are
    /// lowered directly in that scope instead of opening another one.
    pub(crate) fn lower_body(&mut self, body: &IrStatement, ctx: &EmitterContext) -> LoweringResult<Lowered> {
        match body {
            IrStatement::Block { statements } => self.lower_statements(statements, ctx),
            other => self.lower_statement(other, ctx),
        }
    }

    fn lower_variable_declaration(
        &mut self,
        stmt: &IrStatement,
        decl: &IrVariableDeclaration,
        ctx: &EmitterContext,
    ) -> LoweringResult<Lowered> {
        let mut out = Vec::with_capacity(decl.declarations.len());
        let mut ctx = ctx.clone();
        for declarator in &decl.declarations {
            let (node, next) = self.lower_declarator(stmt, declarator, None, &ctx)?;
            out.push(node);
            ctx = next;
        }
        Ok((out, ctx))
    }

    /// One `name[: T] = init` declarator. The initializer is lowered before
    /// the name is declared, so it still reads any outer binding of the name.
    pub(crate) fn lower_declarator(
        &mut self,
        stmt: &IrStatement,
        declarator: &IrVariableDeclarator,
        forced_type: Option<CsType>,
        ctx: &EmitterContext,
    ) -> LoweringResult<(CsNode, EmitterContext)> {
        let Some(name) = declarator.target.as_identifier() else {
            return Err(LoweringError::unsupported_statement(
                stmt,
                "destructuring declarations are lowered by an earlier pass",
            ));
        };
        let initializer = self.lower_optional(declarator.initializer.as_ref(), ctx)?;
        let ty = match forced_type {
            Some(ty) => ty,
            None => self.declaration_type(declarator)?,
        };
        let (emitted, next) = allocate(name, ctx);
        Ok((CsNode::local(ty, emitted, initializer), next.without_binding(name)))
    }

    /// Declared type when present; otherwise `var`, or `object` when there
    /// is nothing (or only `null`) to infer from.
    fn declaration_type(&self, declarator: &IrVariableDeclarator) -> LoweringResult<CsType> {
        if let Some(ty) = &declarator.declared_type {
            return lower_type(ty, &self.env.options);
        }
        let infers_nothing = declarator.initializer.as_ref().is_none_or(|init| {
            init.as_literal().is_some_and(|value| value.is_nullish())
                || init.inferred_type.as_ref().is_some_and(|ty| ty.is_nullish())
        });
        Ok(if infers_nothing {
            CsType::predefined("object")
        } else {
            CsType::Var
        })
    }

    /// The whole switch body is one scope; narrowing starts afresh in every
    /// section because control can enter any of them.
    fn lower_switch(
        &mut self,
        stmt: &IrStatement,
        discriminant: &IrExpression,
        cases: &[IrSwitchCase],
        ctx: &EmitterContext,
    ) -> LoweringResult<Lowered> {
        let _span = span!(Level::TRACE, "lower_switch", cases = cases.len()).entered();

        let assigned = assigned_in_statement(stmt);
        let expression = self.lower_expression(discriminant, ctx)?;
        let base = ctx.without_bindings(keys(&assigned));
        let mut scope = base.enter_scope();
        let mut sections = Vec::with_capacity(cases.len());

        for (index, case) in cases.iter().enumerate() {
            let is_last = index + 1 == cases.len();
            let section_ctx = scope.with_narrowing_of(&base);
            let label = self.lower_optional(case.test.as_ref(), &section_ctx)?;
            let (mut statements, after) = self.lower_statements(&case.statements, &section_ctx)?;
            scope = after;

            let exits = case.statements.last().is_some_and(ends_section);
            if is_last {
                if !exits {
                    statements.push(CsNode::BreakStatement);
                }
            } else if !exits && !case.statements.is_empty() {
                return Err(LoweringError::unsupported_statement(
                    stmt,
                    format!("section {} falls through into the next one", index + 1),
                ));
            }
            sections.push(CsSwitchSection { label, statements });
        }

        Ok((
            vec![CsNode::SwitchStatement {
                expression: Box::new(expression),
                sections,
            }],
            base.exit_scope(&scope),
        ))
    }

    /// Catch and finally blocks may run after any prefix of the try block,
    /// so they see no narrowing of what the statement assigns.
    fn lower_try(
        &mut self,
        stmt: &IrStatement,
        block: &[IrStatement],
        handler: Option<&IrCatchClause>,
        finalizer: Option<&[IrStatement]>,
        ctx: &EmitterContext,
    ) -> LoweringResult<Lowered> {
        let assigned = assigned_in_statement(stmt);
        let base = ctx.without_bindings(keys(&assigned));

        let (block, inner) = self.lower_statements(block, &ctx.enter_scope())?;
        let mut after = base.exit_scope(&inner);

        let catch_clause = match handler {
            Some(handler) => {
                let mut scope = after.enter_scope();
                let name = match &handler.parameter {
                    Some(parameter) => {
                        let (emitted, next) = allocate(parameter, &scope);
                        scope = next.without_binding(parameter);
                        Some(emitted)
                    }
                    None => None,
                };
                let (body, inner) = self.lower_statements(&handler.body, &scope)?;
                after = after.exit_scope(&inner);
                Some(CsCatchClause {
                    ty: CsType::named(self.env.options.exception_type_name.clone()),
                    name,
                    body,
                })
            }
            None => None,
        };

        let finally_block = match finalizer {
            Some(finalizer) => {
                let (body, inner) = self.lower_statements(finalizer, &after.enter_scope())?;
                after = after.exit_scope(&inner);
                Some(Box::new(CsNode::block(body)))
            }
            None => None,
        };

        Ok((
            vec![CsNode::TryStatement {
                block: Box::new(CsNode::block(block)),
                catch_clause,
                finally_block,
            }],
            after,
        ))
    }

    /// A nested function keeps the enclosing names visible but starts with
    /// no narrowing, since it may run at any later point.
    fn lower_local_function(
        &mut self,
        stmt: &IrStatement,
        func: &IrFunction,
        ctx: &EmitterContext,
    ) -> LoweringResult<Lowered> {
        let _span = span!(Level::TRACE, "lower_local_function", name = func.name.as_str()).entered();

        let (name, declared) = allocate(&func.name, ctx);
        let mut body_ctx = declared
            .without_binding(&func.name)
            .for_local_function(func.is_async, func.return_type.clone())
            .enter_scope();

        let mut parameters = Vec::with_capacity(func.parameters.len());
        for param in &func.parameters {
            let ty = self.parameter_type(param)?;
            let (emitted, next) = allocate(&param.name, &body_ctx);
            body_ctx = next.without_binding(&param.name);
            parameters.push(CsParam::new(ty, emitted));
        }

        let (body, inner) = self.lower_statements(&func.body, &body_ctx)?;
        let modifiers = if func.is_async {
            vec!["async".to_string()]
        } else {
            Vec::new()
        };
        let method = CsMethod {
            modifiers,
            return_type: lower_return_type(func.return_type.as_ref(), func.is_async, &self.env.options)?,
            name,
            parameters,
            body,
        };

        let assigned = assigned_in_statement(stmt);
        let next = declared
            .with_temp_var_id_from(&inner)
            .without_bindings(keys(&assigned));
        Ok((vec![CsNode::LocalFunction(method)], next))
    }
}

/// Whether a switch section's last statement leaves the section.
fn ends_section(stmt: &IrStatement) -> bool {
    matches!(stmt, IrStatement::Break { .. } | IrStatement::Continue { .. }) || stmt.terminates()
}

#[cfg(test)]
#[path = "../tests/statements.rs"]
mod tests;
