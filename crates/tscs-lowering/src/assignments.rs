//! Syntactic scan for assigned identifiers and member paths.
//!
//! A narrowing is only valid while its subject is not reassigned. Loops
//! drop narrowings of anything assigned in the loop before lowering it, and
//! every construct drops narrowings of what it assigned once it ends.

use rustc_hash::FxHashSet;
use tscs_ir::{IrExpression, IrExpressionKind, IrForInitializer, IrStatement, IrVariableDeclaration};

/// Keys (identifiers or dotted paths) assigned anywhere in `stmt`.
pub fn assigned_in_statement(stmt: &IrStatement) -> FxHashSet<String> {
    let mut out = FxHashSet::default();
    collect_statement(stmt, &mut out);
    out
}

/// Keys assigned anywhere in `expr`.
pub fn assigned_in_expression(expr: &IrExpression) -> FxHashSet<String> {
    let mut out = FxHashSet::default();
    collect_expression(expr, &mut out);
    out
}

fn collect_statements(stmts: &[IrStatement], out: &mut FxHashSet<String>) {
    for stmt in stmts {
        collect_statement(stmt, out);
    }
}

fn collect_declaration(decl: &IrVariableDeclaration, out: &mut FxHashSet<String>) {
    for declarator in &decl.declarations {
        if let Some(init) = &declarator.initializer {
            collect_expression(init, out);
        }
    }
}

fn collect_statement(stmt: &IrStatement, out: &mut FxHashSet<String>) {
    match stmt {
        IrStatement::VariableDeclaration(decl) => collect_declaration(decl, out),
        IrStatement::Expression { expression } | IrStatement::Throw { expression } => {
            collect_expression(expression, out);
        }
        IrStatement::Return { expression } => {
            if let Some(expression) = expression {
                collect_expression(expression, out);
            }
        }
        IrStatement::If {
            condition,
            then_statement,
            else_statement,
        } => {
            collect_expression(condition, out);
            collect_statement(then_statement, out);
            if let Some(else_statement) = else_statement {
                collect_statement(else_statement, out);
            }
        }
        IrStatement::Block { statements } => collect_statements(statements, out),
        IrStatement::While { condition, body } | IrStatement::DoWhile { body, condition } => {
            collect_expression(condition, out);
            collect_statement(body, out);
        }
        IrStatement::For {
            initializer,
            condition,
            update,
            body,
        } => {
            match initializer {
                Some(IrForInitializer::Declaration(decl)) => collect_declaration(decl, out),
                Some(IrForInitializer::Expression { expression }) => collect_expression(expression, out),
                None => {}
            }
            for expr in [condition, update].into_iter().flatten() {
                collect_expression(expr, out);
            }
            collect_statement(body, out);
        }
        IrStatement::ForOf {
            expression, body, ..
        }
        | IrStatement::ForIn {
            expression, body, ..
        } => {
            collect_expression(expression, out);
            collect_statement(body, out);
        }
        IrStatement::Switch {
            discriminant,
            cases,
        } => {
            collect_expression(discriminant, out);
            for case in cases {
                if let Some(test) = &case.test {
                    collect_expression(test, out);
                }
                collect_statements(&case.statements, out);
            }
        }
        IrStatement::Try {
            block,
            handler,
            finalizer,
        } => {
            collect_statements(block, out);
            if let Some(handler) = handler {
                collect_statements(&handler.body, out);
            }
            if let Some(finalizer) = finalizer {
                collect_statements(finalizer, out);
            }
        }
        // A nested function may run at any later point.
        IrStatement::FunctionDeclaration(func) => collect_statements(&func.body, out),
        IrStatement::Break { .. } | IrStatement::Continue { .. } | IrStatement::Empty => {}
    }
}

fn collect_expression(expr: &IrExpression, out: &mut FxHashSet<String>) {
    match &expr.kind {
        IrExpressionKind::Assignment { target, value, .. } => {
            record_target(target, out);
            collect_expression(target, out);
            collect_expression(value, out);
        }
        IrExpressionKind::Update { operand, .. } => {
            record_target(operand, out);
            collect_expression(operand, out);
        }
        IrExpressionKind::Identifier { .. }
        | IrExpressionKind::Literal { .. }
        | IrExpressionKind::This
        | IrExpressionKind::ArrowFunction => {}
        IrExpressionKind::MemberAccess { object, .. } => collect_expression(object, out),
        IrExpressionKind::ElementAccess { object, index } => {
            collect_expression(object, out);
            collect_expression(index, out);
        }
        IrExpressionKind::Call {
            callee, arguments, ..
        }
        | IrExpressionKind::New { callee, arguments } => {
            collect_expression(callee, out);
            for arg in arguments {
                collect_expression(arg, out);
            }
        }
        IrExpressionKind::Binary { left, right, .. } | IrExpressionKind::Logical { left, right, .. } => {
            collect_expression(left, out);
            collect_expression(right, out);
        }
        IrExpressionKind::Unary { operand, .. } => collect_expression(operand, out),
        IrExpressionKind::Conditional {
            condition,
            when_true,
            when_false,
        } => {
            collect_expression(condition, out);
            collect_expression(when_true, out);
            collect_expression(when_false, out);
        }
        IrExpressionKind::Array { elements } => {
            for element in elements {
                collect_expression(element, out);
            }
        }
        IrExpressionKind::Await { expression }
        | IrExpressionKind::TypeAssertion { expression, .. }
        | IrExpressionKind::Spread { expression } => collect_expression(expression, out),
    }
}

fn record_target(target: &IrExpression, out: &mut FxHashSet<String>) {
    if let Some(path) = target.member_path() {
        out.insert(path);
    }
}

#[cfg(test)]
#[path = "../tests/assignments.rs"]
mod tests;
