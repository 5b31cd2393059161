//! Expression lowering.
//!
//! Reads of a source identifier go through, in order: an active narrowed
//! binding, the scope's local name map, and finally the escaped source name.
//! Assignment targets skip the binding table; they always name the declared
//! variable.
//!
//! `&&`, `||` and `?:` consult guard analysis so that an operand evaluated
//! only under a guard sees the narrowed identifier. Inside an expression no
//! temporary can be declared, so narrowing is expressed inline: accessor
//! calls for union members, casts for `instanceof`, `.Value` for nullable
//! value types.

use crate::context::EmitterContext;
use crate::error::{LoweringError, LoweringResult};
use crate::guards::{Branch, GuardInfo, resolve_guard};
use crate::local_names::escape_identifier;
use crate::lowerer::Lowerer;
use crate::types::lower_type;
use tscs_common::limits::is_supported_union_arity;
use tscs_common::naming::{as_member, is_member};
use tscs_emitter::{CsNode, CsType};
use tscs_ir::{
    BinaryOperator, IrExpression, IrExpressionKind, IrType, LiteralValue, LogicalOperator, PrimitiveKind,
    TypeKind, UnaryOperator, UpdateOperator,
};

/// Lowered read of source identifier `name`.
pub fn read_identifier(name: &str, ctx: &EmitterContext) -> CsNode {
    if let Some(binding) = ctx.narrowed_binding(name) {
        return binding.read();
    }
    if name == "undefined" {
        return CsNode::NullLiteral;
    }
    match ctx.local_name(name) {
        Some(emitted) => CsNode::id(emitted),
        None => CsNode::id(escape_identifier(name)),
    }
}

/// Lowered read of an identifier or non-optional member path, checking
/// each prefix (`a`, `a.b`, `a.b.c`) against the binding table.
pub fn read_path(expr: &IrExpression, ctx: &EmitterContext) -> Option<CsNode> {
    match &expr.kind {
        IrExpressionKind::Identifier { name } => Some(read_identifier(name, ctx)),
        IrExpressionKind::MemberAccess {
            object,
            property,
            optional: false,
        } => {
            if let Some(binding) = path_binding(expr, ctx) {
                return Some(binding);
            }
            Some(CsNode::member(read_path(object, ctx)?, property.clone()))
        }
        _ => None,
    }
}

fn path_binding(expr: &IrExpression, ctx: &EmitterContext) -> Option<CsNode> {
    if ctx.narrowed_bindings().is_empty() {
        return None;
    }
    let path = expr.member_path()?;
    ctx.narrowed_binding(&path).map(|binding| binding.read())
}

pub fn lower_literal(value: &LiteralValue) -> CsNode {
    match value {
        LiteralValue::String(s) => CsNode::string(s.clone()),
        LiteralValue::Number(text) => CsNode::number(text.clone()),
        LiteralValue::Boolean(b) => CsNode::BooleanLiteral(*b),
        LiteralValue::Null | LiteralValue::Undefined => CsNode::NullLiteral,
    }
}

/// Instance type named by the right operand of `instanceof`.
///
/// Prefers the operand's inferred type when upstream recorded the instance
/// type there, and otherwise treats the (dotted) name as a class.
pub(crate) fn instance_type(expr: &IrExpression) -> Option<IrType> {
    if let Some(ty @ IrType::Reference(_)) = &expr.inferred_type {
        return Some(ty.clone());
    }
    let path = expr.member_path()?;
    Some(IrType::reference(path, TypeKind::Class))
}

/// `a && (b && c)` and `(a && b) && c` both yield `[a, b, c]`.
pub(crate) fn flatten_conjuncts(expr: &IrExpression) -> Vec<&IrExpression> {
    let mut out = Vec::new();
    collect_conjuncts(expr, &mut out);
    out
}

fn collect_conjuncts<'a>(expr: &'a IrExpression, out: &mut Vec<&'a IrExpression>) {
    match &expr.kind {
        IrExpressionKind::Logical {
            operator: LogicalOperator::And,
            left,
            right,
        } => {
            collect_conjuncts(left, out);
            collect_conjuncts(right, out);
        }
        _ => out.push(expr),
    }
}

fn is_number_typed(expr: &IrExpression) -> bool {
    match &expr.inferred_type {
        Some(IrType::Primitive {
            primitive: PrimitiveKind::Number,
        }) => true,
        Some(IrType::Literal {
            value: LiteralValue::Number(_),
        }) => !expr.as_literal().is_some_and(LiteralValue::is_integer),
        _ => false,
    }
}

impl Lowerer<'_> {
    pub(crate) fn lower_expression(&mut self, expr: &IrExpression, ctx: &EmitterContext) -> LoweringResult<CsNode> {
        self.enter()?;
        let result = self.lower_expression_kind(expr, ctx);
        self.leave();
        result
    }

    fn lower_expression_kind(&mut self, expr: &IrExpression, ctx: &EmitterContext) -> LoweringResult<CsNode> {
        match &expr.kind {
            IrExpressionKind::Identifier { name } => Ok(read_identifier(name, ctx)),
            IrExpressionKind::Literal { value } => Ok(lower_literal(value)),
            IrExpressionKind::This => Ok(CsNode::This),

            IrExpressionKind::MemberAccess {
                object,
                property,
                optional,
            } => {
                if !optional && let Some(bound) = path_binding(expr, ctx) {
                    return Ok(bound);
                }
                let object = self.lower_expression(object, ctx)?;
                Ok(if *optional {
                    CsNode::ConditionalMemberAccess {
                        object: Box::new(object),
                        member: property.clone(),
                    }
                } else {
                    CsNode::member(object, property.clone())
                })
            }

            IrExpressionKind::ElementAccess { object, index } => self.lower_element_access(object, index, ctx),

            IrExpressionKind::Call {
                callee, arguments, ..
            } => {
                let callee = self.lower_expression(callee, ctx)?;
                let arguments = self.lower_arguments(arguments, ctx)?;
                Ok(CsNode::call(callee, arguments))
            }

            IrExpressionKind::New { callee, arguments } => {
                let Some(type_name) = callee.member_path() else {
                    return Err(LoweringError::unsupported_expression(
                        &expr.kind,
                        "constructor is not a named type",
                    ));
                };
                let arguments = self.lower_arguments(arguments, ctx)?;
                Ok(CsNode::new_expr(CsType::named(type_name), arguments))
            }

            IrExpressionKind::Binary {
                operator,
                left,
                right,
            } => self.lower_binary(expr, *operator, left, right, ctx),

            IrExpressionKind::Logical {
                operator: LogicalOperator::And,
                ..
            } => {
                let conjuncts = flatten_conjuncts(expr);
                Ok(self.lower_conjuncts(&conjuncts, ctx)?.0)
            }

            IrExpressionKind::Logical {
                operator: LogicalOperator::Or,
                left,
                right,
            } => {
                // The right operand runs only when the left one is false.
                let (left, right_ctx) = self.lower_guarded_operand(left, Branch::Else, ctx)?;
                let right = self.lower_expression(right, &right_ctx)?;
                Ok(CsNode::logical_or(left, right))
            }

            IrExpressionKind::Logical {
                operator: LogicalOperator::Coalesce,
                left,
                right,
            } => {
                let left = self.lower_expression(left, ctx)?;
                let right = self.lower_expression(right, ctx)?;
                Ok(CsNode::binary(left, "??", right))
            }

            IrExpressionKind::Unary { operator, operand } => {
                let symbol = match operator {
                    UnaryOperator::Not => return Ok(CsNode::not(self.lower_expression(operand, ctx)?)),
                    UnaryOperator::Minus => "-",
                    UnaryOperator::Plus => "+",
                    UnaryOperator::BitNot => "~",
                    UnaryOperator::Typeof => {
                        return Err(LoweringError::unsupported_expression(
                            &expr.kind,
                            "`typeof` has no nominal equivalent",
                        ));
                    }
                    UnaryOperator::Void => {
                        return Err(LoweringError::unsupported_expression(
                            &expr.kind,
                            "`void` operator is not lowered",
                        ));
                    }
                };
                Ok(CsNode::PrefixUnaryExpr {
                    operator: symbol.to_string(),
                    operand: Box::new(self.lower_expression(operand, ctx)?),
                })
            }

            IrExpressionKind::Update {
                operator,
                prefix,
                operand,
            } => {
                let operand = Box::new(self.lower_assignment_target(operand, ctx)?);
                let operator = match operator {
                    UpdateOperator::Increment => "++",
                    UpdateOperator::Decrement => "--",
                }
                .to_string();
                Ok(if *prefix {
                    CsNode::PrefixUnaryExpr { operator, operand }
                } else {
                    CsNode::PostfixUnaryExpr { operand, operator }
                })
            }

            IrExpressionKind::Assignment {
                operator,
                target,
                value,
            } => {
                let value = self.lower_expression(value, ctx)?;
                let target = self.lower_assignment_target(target, ctx)?;
                Ok(CsNode::binary(target, operator.as_str(), value))
            }

            IrExpressionKind::Conditional {
                condition,
                when_true,
                when_false,
            } => match resolve_guard(condition, ctx, self.env)? {
                Some(guard) => {
                    let true_ctx = expression_narrowed(&guard, Branch::Then, ctx);
                    let false_ctx = expression_narrowed(&guard, Branch::Else, ctx);
                    Ok(CsNode::ConditionalExpr {
                        condition: Box::new(guard.expression_condition()),
                        when_true: Box::new(self.lower_expression(when_true, &true_ctx)?),
                        when_false: Box::new(self.lower_expression(when_false, &false_ctx)?),
                    })
                }
                None => Ok(CsNode::ConditionalExpr {
                    condition: Box::new(self.lower_expression(condition, ctx)?),
                    when_true: Box::new(self.lower_expression(when_true, ctx)?),
                    when_false: Box::new(self.lower_expression(when_false, ctx)?),
                }),
            },

            IrExpressionKind::Array { elements } => {
                let element_type = match &expr.inferred_type {
                    Some(IrType::Array { element }) => Some(lower_type(element, &self.env.options)?),
                    _ => None,
                };
                Ok(CsNode::ArrayCreation {
                    element_type,
                    elements: self.lower_arguments(elements, ctx)?,
                })
            }

            IrExpressionKind::Await { expression } => {
                if !ctx.is_async() {
                    return Err(LoweringError::AwaitOutsideAsync);
                }
                Ok(CsNode::Await(Box::new(self.lower_expression(expression, ctx)?)))
            }

            IrExpressionKind::TypeAssertion {
                expression,
                target_type,
            } => self.lower_type_assertion(expression, target_type, ctx),

            IrExpressionKind::Spread { .. } => Err(LoweringError::unsupported_expression(
                &expr.kind,
                "spread elements are expanded by an earlier pass",
            )),
            IrExpressionKind::ArrowFunction => Err(LoweringError::unsupported_expression(
                &expr.kind,
                "arrow functions are lowered by the closure pass",
            )),
        }
    }

    fn lower_arguments(&mut self, arguments: &[IrExpression], ctx: &EmitterContext) -> LoweringResult<Vec<CsNode>> {
        arguments
            .iter()
            .map(|arg| self.lower_expression(arg, ctx))
            .collect()
    }

    /// Lower `c1 && c2 && ...`. Each conjunct sees the narrowing the guards
    /// to its left establish; the matched guards are returned in order.
    pub(crate) fn lower_conjuncts(
        &mut self,
        conjuncts: &[&IrExpression],
        ctx: &EmitterContext,
    ) -> LoweringResult<(CsNode, Vec<GuardInfo>)> {
        let mut ctx = ctx.clone();
        let mut condition: Option<CsNode> = None;
        let mut guards = Vec::new();
        for conjunct in conjuncts {
            let node = match resolve_guard(conjunct, &ctx, self.env)? {
                Some(guard) => {
                    let node = guard.expression_condition();
                    ctx = expression_narrowed(&guard, Branch::Then, &ctx);
                    guards.push(guard);
                    node
                }
                None => self.lower_expression(conjunct, &ctx)?,
            };
            condition = Some(match condition {
                Some(left) => CsNode::logical_and(left, node),
                None => node,
            });
        }
        let condition = condition.unwrap_or(CsNode::BooleanLiteral(true));
        Ok((condition, guards))
    }

    /// Lower `operand` and return the context for whatever runs only when
    /// it evaluates to `branch`.
    fn lower_guarded_operand(
        &mut self,
        operand: &IrExpression,
        branch: Branch,
        ctx: &EmitterContext,
    ) -> LoweringResult<(CsNode, EmitterContext)> {
        match resolve_guard(operand, ctx, self.env)? {
            Some(guard) => Ok((guard.expression_condition(), expression_narrowed(&guard, branch, ctx))),
            None => Ok((self.lower_expression(operand, ctx)?, ctx.clone())),
        }
    }

    fn lower_binary(
        &mut self,
        expr: &IrExpression,
        operator: BinaryOperator,
        left: &IrExpression,
        right: &IrExpression,
        ctx: &EmitterContext,
    ) -> LoweringResult<CsNode> {
        match operator {
            BinaryOperator::Instanceof => {
                let Some(target) = instance_type(right) else {
                    return Err(LoweringError::unsupported_expression(
                        &expr.kind,
                        "right operand of `instanceof` is not a named type",
                    ));
                };
                let ty = lower_type(&target, &self.env.options)?;
                Ok(CsNode::is_pattern(self.lower_expression(left, ctx)?, ty, None))
            }
            BinaryOperator::In => self.lower_in_test(expr, left, right, ctx),
            _ => {
                let symbol = match operator {
                    BinaryOperator::StrictEquals => "==",
                    BinaryOperator::StrictNotEquals => "!=",
                    other => other.as_str(),
                };
                let left = self.lower_expression(left, ctx)?;
                let right = self.lower_expression(right, ctx)?;
                Ok(CsNode::binary(left, symbol, right))
            }
        }
    }

    /// `"p" in x` with no narrowing: true when `x` holds any member that
    /// declares `p`.
    fn lower_in_test(
        &mut self,
        expr: &IrExpression,
        left: &IrExpression,
        right: &IrExpression,
        ctx: &EmitterContext,
    ) -> LoweringResult<CsNode> {
        let Some(LiteralValue::String(property)) = left.as_literal() else {
            return Err(LoweringError::unsupported_expression(
                &expr.kind,
                "`in` needs a string literal property name",
            ));
        };
        let Some(host) = right.inferred_type.as_ref() else {
            return Ok(CsNode::BooleanLiteral(false));
        };

        let members = host.non_nullish_members();
        if host.union_members().is_none() || members.len() < 2 {
            let declared = match members.first() {
                Some(member) => self.env.members.property_of(member, property)?.is_some(),
                None => false,
            };
            return Ok(CsNode::BooleanLiteral(declared));
        }

        let receiver = self.lower_expression(right, ctx)?;
        let mut test: Option<CsNode> = None;
        for (index, member) in members.iter().enumerate() {
            if self.env.members.property_of(member, property)?.is_none() {
                continue;
            }
            let check = CsNode::method_call(receiver.clone(), is_member(index + 1));
            test = Some(match test {
                Some(left) => CsNode::logical_or(left, check),
                None => check,
            });
        }
        Ok(test.unwrap_or(CsNode::BooleanLiteral(false)))
    }

    fn lower_element_access(
        &mut self,
        object: &IrExpression,
        index: &IrExpression,
        ctx: &EmitterContext,
    ) -> LoweringResult<CsNode> {
        let object = self.lower_expression(object, ctx)?;
        let lowered_index = self.lower_expression(index, ctx)?;
        let is_int_counter = index.as_identifier().is_some_and(|name| ctx.is_int_loop_var(name));
        let lowered_index = if is_number_typed(index) && !is_int_counter {
            CsNode::cast(CsType::predefined("int"), lowered_index)
        } else {
            lowered_index
        };
        Ok(CsNode::elem(object, lowered_index))
    }

    /// `x as T`: a union member assertion unwraps through the accessor,
    /// anything else is a cast.
    fn lower_type_assertion(
        &mut self,
        expression: &IrExpression,
        target: &IrType,
        ctx: &EmitterContext,
    ) -> LoweringResult<CsNode> {
        let lowered = self.lower_expression(expression, ctx)?;
        if let Some(source) = &expression.inferred_type {
            if source == target {
                return Ok(lowered);
            }
            if source.union_members().is_some() {
                let members = source.non_nullish_members();
                if is_supported_union_arity(members.len())
                    && let Some(index) = members.iter().position(|member| *member == target)
                {
                    return Ok(CsNode::method_call(lowered, as_member(index + 1)));
                }
            }
        }
        Ok(CsNode::cast(lower_type(target, &self.env.options)?, lowered))
    }

    /// Assignment and update targets name the declared variable, never a
    /// narrowed binding.
    pub(crate) fn lower_assignment_target(
        &mut self,
        target: &IrExpression,
        ctx: &EmitterContext,
    ) -> LoweringResult<CsNode> {
        match &target.kind {
            IrExpressionKind::Identifier { name } => Ok(match ctx.local_name(name) {
                Some(emitted) => CsNode::id(emitted),
                None => CsNode::id(escape_identifier(name)),
            }),
            IrExpressionKind::MemberAccess {
                object,
                property,
                optional: false,
            } => Ok(CsNode::member(self.lower_expression(object, ctx)?, property.clone())),
            IrExpressionKind::ElementAccess { object, index } => self.lower_element_access(object, index, ctx),
            other => Err(LoweringError::unsupported_expression(other, "not an assignable target")),
        }
    }
}

/// `ctx` with the narrowing `guard` establishes for `branch`, in the
/// inline form usable inside an expression.
fn expression_narrowed(guard: &GuardInfo, branch: Branch, ctx: &EmitterContext) -> EmitterContext {
    match guard.narrowing_for(branch) {
        Some(narrowing) => ctx.with_binding(narrowing.key(), narrowing.expression_binding()),
        None => ctx.clone(),
    }
}

#[cfg(test)]
#[path = "../tests/expressions.rs"]
mod tests;
