//! Entry points and the recursive lowerer.
//!
//! `Lowerer` borrows the read-only environment and carries only a recursion
//! depth counter. Everything that varies along the walk lives in the
//! `EmitterContext` each call receives and returns.

use crate::context::EmitterContext;
use crate::error::{LoweringError, LoweringResult};
use crate::local_names::{escape_identifier, register};
use crate::options::LoweringEnv;
use crate::types::{lower_return_type, lower_type};
use tracing::{Level, debug, span};
use tscs_emitter::{CsMethod, CsNode, CsParam, CsType};
use tscs_ir::{IrExpression, IrFunction, IrModule, IrParameter, IrStatement};

/// Lowered statements plus the context to continue from.
pub(crate) type Lowered = (Vec<CsNode>, EmitterContext);

pub(crate) struct Lowerer<'env> {
    pub(crate) env: &'env LoweringEnv,
    /// Recursion depth counter for stack overflow protection
    depth: u32,
}

impl<'env> Lowerer<'env> {
    pub(crate) const fn new(env: &'env LoweringEnv) -> Self {
        Self { env, depth: 0 }
    }

    /// Descend one level; fails once the configured limit is passed.
    pub(crate) fn enter(&mut self) -> LoweringResult<()> {
        let limit = self.env.options.max_depth;
        if self.depth >= limit {
            return Err(LoweringError::DepthLimitExceeded { depth: limit });
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) const fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// A module becomes one static class with a method per function. The
    /// temporary counter runs across the whole unit.
    pub(crate) fn lower_module(&mut self, module: &IrModule) -> LoweringResult<CsNode> {
        let _span = span!(Level::DEBUG, "lower_module", name = module.name.as_str()).entered();

        let mut ctx = EmitterContext::new();
        let mut members = Vec::with_capacity(module.functions.len());
        for func in &module.functions {
            let (method, next) = self.lower_function(func, &ctx)?;
            members.push(method);
            ctx = next;
        }
        debug!(functions = members.len(), temporaries = ctx.temp_var_id(), "lowered module");

        Ok(CsNode::ClassDecl {
            modifiers: vec!["public".to_string(), "static".to_string()],
            name: escape_identifier(&module.name),
            type_parameters: Vec::new(),
            members,
        })
    }

    pub(crate) fn lower_function(
        &mut self,
        func: &IrFunction,
        ctx: &EmitterContext,
    ) -> LoweringResult<(CsNode, EmitterContext)> {
        let _span = span!(Level::DEBUG, "lower_function", name = func.name.as_str()).entered();

        let mut body_ctx = ctx.for_function(func.is_async, func.is_static, func.return_type.clone());
        let mut parameters = Vec::with_capacity(func.parameters.len());
        for param in &func.parameters {
            let emitted = escape_identifier(&param.name);
            body_ctx = register(&param.name, &emitted, &body_ctx);
            parameters.push(CsParam::new(self.parameter_type(param)?, emitted));
        }

        let (body, inner) = self.lower_statements(&func.body, &body_ctx)?;

        let mut modifiers = vec!["public".to_string(), "static".to_string()];
        if func.is_async {
            modifiers.push("async".to_string());
        }
        let method = CsMethod {
            modifiers,
            return_type: lower_return_type(func.return_type.as_ref(), func.is_async, &self.env.options)?,
            name: escape_identifier(&func.name),
            parameters,
            body,
        };
        Ok((CsNode::MethodDecl(method), ctx.with_temp_var_id_from(&inner)))
    }

    pub(crate) fn parameter_type(&self, param: &IrParameter) -> LoweringResult<CsType> {
        match &param.param_type {
            Some(ty) => lower_type(ty, &self.env.options),
            None => Ok(CsType::predefined("object")),
        }
    }
}

/// Lower one compilation unit to a static class.
pub fn lower_module(module: &IrModule, env: &LoweringEnv) -> LoweringResult<CsNode> {
    Lowerer::new(env).lower_module(module)
}

/// Lower one top-level function to a method. The returned context carries
/// the temporary counter on to the next function of the same unit.
pub fn lower_function(
    func: &IrFunction,
    ctx: &EmitterContext,
    env: &LoweringEnv,
) -> LoweringResult<(CsNode, EmitterContext)> {
    Lowerer::new(env).lower_function(func, ctx)
}

/// Lower a statement list under `ctx`.
pub fn lower_statements(
    stmts: &[IrStatement],
    ctx: &EmitterContext,
    env: &LoweringEnv,
) -> LoweringResult<(Vec<CsNode>, EmitterContext)> {
    Lowerer::new(env).lower_statements(stmts, ctx)
}

/// Lower a single statement to zero or more target statements.
pub fn lower_statement(
    stmt: &IrStatement,
    ctx: &EmitterContext,
    env: &LoweringEnv,
) -> LoweringResult<(Vec<CsNode>, EmitterContext)> {
    Lowerer::new(env).lower_statement(stmt, ctx)
}

/// Lower an expression under `ctx`. Expressions never change the context.
pub fn lower_expression(expr: &IrExpression, ctx: &EmitterContext, env: &LoweringEnv) -> LoweringResult<CsNode> {
    Lowerer::new(env).lower_expression(expr, ctx)
}
