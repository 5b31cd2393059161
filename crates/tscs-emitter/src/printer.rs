//! Printer for the lowered target tree
//!
//! Walks `CsNode` trees and writes target-language source. Formatting is
//! fixed: four-space indentation, braces on their own lines, one statement
//! per line. Output is deterministic so tests can compare whole strings.

#[path = "printer_helpers.rs"]
mod printer_helpers;

use crate::ast::{CsCatchClause, CsMethod, CsNode, CsSwitchSection};

/// Printer state
pub struct CsPrinter {
    output: String,
    indent_level: u32,
    indent_unit: &'static str,
}

impl Default for CsPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsPrinter {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
            indent_unit: "    ",
        }
    }

    /// Print a single node (expression, statement or declaration) to a string.
    ///
    /// Multi-line nodes are joined with `\n`; there is no trailing newline.
    pub fn emit_to_string(node: &CsNode) -> String {
        let mut printer = Self::new();
        printer.emit_node(node);
        printer.output
    }

    /// Print a sequence of statements or declarations, one per line.
    pub fn emit_all_to_string(nodes: &[CsNode]) -> String {
        let mut printer = Self::new();
        for (i, node) in nodes.iter().enumerate() {
            if i > 0 {
                printer.write_line();
            }
            printer.emit_node(node);
        }
        printer.output
    }

    pub fn finish(self) -> String {
        self.output
    }

    pub(crate) fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    pub(crate) fn write_line(&mut self) {
        self.output.push('\n');
    }

    pub(crate) fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push_str(self.indent_unit);
        }
    }

    pub(crate) const fn increase_indent(&mut self) {
        self.indent_level += 1;
    }

    pub(crate) const fn decrease_indent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    /// Emit any node; the caller has already written the indentation.
    pub fn emit_node(&mut self, node: &CsNode) {
        match node {
            CsNode::ClassDecl { .. }
            | CsNode::FieldDecl { .. }
            | CsNode::ConstructorDecl { .. }
            | CsNode::MethodDecl(_) => self.emit_declaration(node),
            _ if node.is_statement() => self.emit_statement(node),
            _ => self.emit_expression(node),
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub(crate) fn emit_expression(&mut self, node: &CsNode) {
        match node {
            CsNode::NumericLiteral(text) => self.write(text),
            CsNode::StringLiteral(text) => {
                let escaped = Self::escape_string(text);
                self.write("\"");
                self.write(&escaped);
                self.write("\"");
            }
            CsNode::BooleanLiteral(value) => self.write(if *value { "true" } else { "false" }),
            CsNode::NullLiteral => self.write("null"),
            CsNode::Identifier(name) => self.write(name),
            CsNode::This => self.write("this"),
            CsNode::BinaryExpr {
                left,
                operator,
                right,
            } => {
                let precedence = Self::binary_precedence(operator);
                let right_assoc = Self::is_right_associative(operator);
                self.emit_operand(left, precedence, right_assoc);
                self.write(" ");
                self.write(operator);
                self.write(" ");
                self.emit_operand(right, precedence, !right_assoc);
            }
            CsNode::PrefixUnaryExpr { operator, operand } => {
                self.write(operator);
                self.emit_unary_operand(operand);
            }
            CsNode::PostfixUnaryExpr { operand, operator } => {
                self.emit_unary_operand(operand);
                self.write(operator);
            }
            CsNode::CallExpr { callee, arguments } => {
                self.emit_primary(callee);
                self.write("(");
                self.emit_comma_separated(arguments);
                self.write(")");
            }
            CsNode::NewExpr { ty, arguments } => {
                self.write("new ");
                self.emit_type(ty);
                self.write("(");
                self.emit_comma_separated(arguments);
                self.write(")");
            }
            CsNode::MemberAccess { object, member } => {
                self.emit_primary(object);
                self.write(".");
                self.write(member);
            }
            CsNode::ConditionalMemberAccess { object, member } => {
                self.emit_primary(object);
                self.write("?.");
                self.write(member);
            }
            CsNode::ElementAccess { object, index } => {
                self.emit_primary(object);
                self.write("[");
                self.emit_expression(index);
                self.write("]");
            }
            CsNode::ConditionalExpr {
                condition,
                when_true,
                when_false,
            } => {
                self.emit_operand(condition, Self::CONDITIONAL_PRECEDENCE + 1, false);
                self.write(" ? ");
                self.emit_expression(when_true);
                self.write(" : ");
                self.emit_expression(when_false);
            }
            CsNode::Parenthesized(inner) => {
                self.write("(");
                self.emit_expression(inner);
                self.write(")");
            }
            CsNode::IsPattern {
                expression,
                ty,
                designation,
            } => {
                self.emit_operand(expression, Self::RELATIONAL_PRECEDENCE, true);
                self.write(" is ");
                self.emit_type(ty);
                if let Some(name) = designation {
                    self.write(" ");
                    self.write(name);
                }
            }
            CsNode::Cast { ty, expression } => {
                self.write("(");
                self.emit_type(ty);
                self.write(")");
                self.emit_unary_operand(expression);
            }
            CsNode::Await(expression) => {
                self.write("await ");
                self.emit_unary_operand(expression);
            }
            CsNode::ArrayCreation {
                element_type,
                elements,
            } => {
                self.write("new");
                if let Some(ty) = element_type {
                    self.write(" ");
                    self.emit_type(ty);
                }
                self.write("[] { ");
                self.emit_comma_separated(elements);
                self.write(if elements.is_empty() { "}" } else { " }" });
            }
            other => {
                // Statements and declarations have no expression form.
                self.emit_node(other);
            }
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub(crate) fn emit_statement(&mut self, node: &CsNode) {
        match node {
            CsNode::LocalDecl { .. } => {
                self.emit_local_decl_head(node);
                self.write(";");
            }
            CsNode::ExpressionStatement(expr) => {
                self.emit_expression(expr);
                self.write(";");
            }
            CsNode::ReturnStatement(expr) => {
                self.write("return");
                if let Some(expr) = expr {
                    self.write(" ");
                    self.emit_expression(expr);
                }
                self.write(";");
            }
            CsNode::ThrowStatement(expr) => {
                self.write("throw ");
                self.emit_expression(expr);
                self.write(";");
            }
            CsNode::IfStatement {
                condition,
                then_branch,
                else_branch,
            } => {
                self.write("if (");
                self.emit_expression(condition);
                self.write(")");
                self.emit_embedded_statement(then_branch);
                if let Some(else_branch) = else_branch {
                    self.write_line();
                    self.write_indent();
                    self.write("else");
                    if matches!(else_branch.as_ref(), CsNode::IfStatement { .. }) {
                        self.write(" ");
                        self.emit_statement(else_branch);
                    } else {
                        self.emit_embedded_statement(else_branch);
                    }
                }
            }
            CsNode::Block(statements) => self.emit_block(statements),
            CsNode::WhileStatement { condition, body } => {
                self.write("while (");
                self.emit_expression(condition);
                self.write(")");
                self.emit_embedded_statement(body);
            }
            CsNode::DoWhileStatement { body, condition } => {
                self.write("do");
                self.emit_embedded_statement(body);
                self.write_line();
                self.write_indent();
                self.write("while (");
                self.emit_expression(condition);
                self.write(");");
            }
            CsNode::ForStatement {
                initializer,
                condition,
                incrementors,
                body,
            } => {
                self.write("for (");
                if let Some(init) = initializer {
                    self.emit_for_initializer(init);
                }
                self.write(";");
                if let Some(condition) = condition {
                    self.write(" ");
                    self.emit_expression(condition);
                }
                self.write(";");
                if !incrementors.is_empty() {
                    self.write(" ");
                    self.emit_comma_separated(incrementors);
                }
                self.write(")");
                self.emit_embedded_statement(body);
            }
            CsNode::ForEachStatement {
                ty,
                name,
                expression,
                body,
                is_await,
            } => {
                if *is_await {
                    self.write("await ");
                }
                self.write("foreach (");
                self.emit_type(ty);
                self.write(" ");
                self.write(name);
                self.write(" in ");
                self.emit_expression(expression);
                self.write(")");
                self.emit_embedded_statement(body);
            }
            CsNode::SwitchStatement { expression, sections } => {
                self.write("switch (");
                self.emit_expression(expression);
                self.write(")");
                self.write_line();
                self.write_indent();
                self.write("{");
                self.increase_indent();
                for section in sections {
                    self.emit_switch_section(section);
                }
                self.decrease_indent();
                self.write_line();
                self.write_indent();
                self.write("}");
            }
            CsNode::BreakStatement => self.write("break;"),
            CsNode::ContinueStatement => self.write("continue;"),
            CsNode::TryStatement {
                block,
                catch_clause,
                finally_block,
            } => {
                self.write("try");
                self.emit_embedded_statement(block);
                if let Some(clause) = catch_clause {
                    self.emit_catch_clause(clause);
                }
                if let Some(finally_block) = finally_block {
                    self.write_line();
                    self.write_indent();
                    self.write("finally");
                    self.emit_embedded_statement(finally_block);
                }
            }
            CsNode::LocalFunction(method) => self.emit_method(method),
            CsNode::EmptyStatement => self.write(";"),
            other => self.emit_expression(other),
        }
    }

    /// Emit `{ ... }` with each statement on its own indented line.
    pub(crate) fn emit_block(&mut self, statements: &[CsNode]) {
        self.write("{");
        self.increase_indent();
        for stmt in statements {
            self.write_line();
            self.write_indent();
            self.emit_statement(stmt);
        }
        self.decrease_indent();
        self.write_line();
        self.write_indent();
        self.write("}");
    }

    /// Emit the body of a control statement on the following line(s).
    fn emit_embedded_statement(&mut self, body: &CsNode) {
        self.write_line();
        if matches!(body, CsNode::Block(_)) {
            self.write_indent();
            self.emit_statement(body);
        } else {
            self.increase_indent();
            self.write_indent();
            self.emit_statement(body);
            self.decrease_indent();
        }
    }

    fn emit_switch_section(&mut self, section: &CsSwitchSection) {
        self.write_line();
        self.write_indent();
        match &section.label {
            Some(label) => {
                self.write("case ");
                self.emit_expression(label);
                self.write(":");
            }
            None => self.write("default:"),
        }
        self.increase_indent();
        for stmt in &section.statements {
            self.write_line();
            self.write_indent();
            self.emit_statement(stmt);
        }
        self.decrease_indent();
    }

    fn emit_catch_clause(&mut self, clause: &CsCatchClause) {
        self.write_line();
        self.write_indent();
        self.write("catch (");
        self.emit_type(&clause.ty);
        if let Some(name) = &clause.name {
            self.write(" ");
            self.write(name);
        }
        self.write(")");
        self.write_line();
        self.write_indent();
        self.emit_block(&clause.body);
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn emit_declaration(&mut self, node: &CsNode) {
        match node {
            CsNode::ClassDecl {
                modifiers,
                name,
                type_parameters,
                members,
            } => {
                self.emit_modifiers(modifiers);
                self.write("class ");
                self.write(name);
                if !type_parameters.is_empty() {
                    self.write("<");
                    self.write(&type_parameters.join(", "));
                    self.write(">");
                }
                self.write_line();
                self.write_indent();
                self.write("{");
                self.increase_indent();
                let mut previous_was_field = false;
                for (i, member) in members.iter().enumerate() {
                    let is_field = matches!(member, CsNode::FieldDecl { .. });
                    if i > 0 && !(is_field && previous_was_field) {
                        self.write_line();
                    }
                    self.write_line();
                    self.write_indent();
                    self.emit_declaration(member);
                    previous_was_field = is_field;
                }
                self.decrease_indent();
                self.write_line();
                self.write_indent();
                self.write("}");
            }
            CsNode::FieldDecl {
                modifiers,
                ty,
                name,
            } => {
                self.emit_modifiers(modifiers);
                self.emit_type(ty);
                self.write(" ");
                self.write(name);
                self.write(";");
            }
            CsNode::ConstructorDecl {
                modifiers,
                name,
                parameters,
                body,
            } => {
                self.emit_modifiers(modifiers);
                self.write(name);
                self.emit_parameters(parameters);
                self.write_line();
                self.write_indent();
                self.emit_block(body);
            }
            CsNode::MethodDecl(method) => self.emit_method(method),
            other => self.emit_statement(other),
        }
    }

    fn emit_method(&mut self, method: &CsMethod) {
        self.emit_modifiers(&method.modifiers);
        self.emit_type(&method.return_type);
        self.write(" ");
        self.write(&method.name);
        self.emit_parameters(&method.parameters);
        self.write_line();
        self.write_indent();
        self.emit_block(&method.body);
    }
}

#[cfg(test)]
#[path = "../tests/printer.rs"]
mod tests;
