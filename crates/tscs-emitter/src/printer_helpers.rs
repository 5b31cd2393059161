//! Helper methods for the printer.
//!
//! Contains operator precedence, operand parenthesization, type syntax,
//! parameter lists and string escaping.

use super::*;
use crate::ast::{CsParam, CsType};

impl CsPrinter {
    pub(super) const CONDITIONAL_PRECEDENCE: u8 = 2;
    pub(super) const RELATIONAL_PRECEDENCE: u8 = 10;
    const UNARY_PRECEDENCE: u8 = 13;

    /// Binding strength of a binary operator; higher binds tighter.
    pub(super) fn binary_precedence(operator: &str) -> u8 {
        match operator {
            "=" | "+=" | "-=" | "*=" | "/=" | "%=" | "??=" => 1,
            "??" => 3,
            "||" => 4,
            "&&" => 5,
            "|" => 6,
            "^" => 7,
            "&" => 8,
            "==" | "!=" => 9,
            "<" | "<=" | ">" | ">=" => 10,
            "<<" | ">>" => 11,
            "+" | "-" => 12,
            "*" | "/" | "%" => 13,
            _ => 0,
        }
    }

    pub(super) fn is_right_associative(operator: &str) -> bool {
        matches!(operator, "=" | "+=" | "-=" | "*=" | "/=" | "%=" | "??=" | "??")
    }

    /// Precedence of an arbitrary expression node.
    fn expression_precedence(node: &CsNode) -> u8 {
        match node {
            CsNode::BinaryExpr { operator, .. } => Self::binary_precedence(operator),
            CsNode::ConditionalExpr { .. } => Self::CONDITIONAL_PRECEDENCE,
            CsNode::IsPattern { .. } => Self::RELATIONAL_PRECEDENCE,
            CsNode::PrefixUnaryExpr { .. } | CsNode::Cast { .. } | CsNode::Await(_) => {
                Self::UNARY_PRECEDENCE + 1
            }
            _ => u8::MAX,
        }
    }

    /// Emit a binary operand, adding parentheses when it binds looser than
    /// the parent. `tie_needs_parens` covers the non-associative side.
    pub(super) fn emit_operand(&mut self, operand: &CsNode, parent_precedence: u8, tie_needs_parens: bool) {
        let precedence = Self::expression_precedence(operand);
        let needs_parens =
            precedence < parent_precedence || (tie_needs_parens && precedence == parent_precedence);
        if needs_parens {
            self.write("(");
            self.emit_expression(operand);
            self.write(")");
        } else {
            self.emit_expression(operand);
        }
    }

    /// Operand of a prefix/postfix operator, cast or await.
    pub(super) fn emit_unary_operand(&mut self, operand: &CsNode) {
        let precedence = Self::expression_precedence(operand);
        if precedence <= Self::UNARY_PRECEDENCE || Self::would_fuse_sign(&self.output, operand) {
            self.write("(");
            self.emit_expression(operand);
            self.write(")");
        } else {
            self.emit_expression(operand);
        }
    }

    /// `-(-x)` must not print as `--x`.
    fn would_fuse_sign(output: &str, operand: &CsNode) -> bool {
        let CsNode::PrefixUnaryExpr { operator, .. } = operand else {
            return false;
        };
        match (output.chars().last(), operator.chars().next()) {
            (Some(prev), Some(next)) => (prev == '-' || prev == '+') && prev == next,
            _ => false,
        }
    }

    /// Receiver of a member access, element access or call.
    pub(super) fn emit_primary(&mut self, node: &CsNode) {
        if Self::is_primary(node) {
            self.emit_expression(node);
        } else {
            self.write("(");
            self.emit_expression(node);
            self.write(")");
        }
    }

    const fn is_primary(node: &CsNode) -> bool {
        matches!(
            node,
            CsNode::NumericLiteral(_)
                | CsNode::StringLiteral(_)
                | CsNode::BooleanLiteral(_)
                | CsNode::NullLiteral
                | CsNode::Identifier(_)
                | CsNode::This
                | CsNode::CallExpr { .. }
                | CsNode::MemberAccess { .. }
                | CsNode::ConditionalMemberAccess { .. }
                | CsNode::ElementAccess { .. }
                | CsNode::Parenthesized(_)
                | CsNode::NewExpr { .. }
                | CsNode::ArrayCreation { .. }
        )
    }

    pub(super) fn emit_comma_separated(&mut self, nodes: &[CsNode]) {
        for (i, node) in nodes.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.emit_expression(node);
        }
    }

    /// `ty name = init` without the trailing semicolon.
    pub(super) fn emit_local_decl_head(&mut self, node: &CsNode) {
        if let CsNode::LocalDecl {
            ty,
            name,
            initializer,
        } = node
        {
            self.emit_type(ty);
            self.write(" ");
            self.write(name);
            if let Some(init) = initializer {
                self.write(" = ");
                self.emit_expression(init);
            }
        }
    }

    /// First clause of a `for` header.
    pub(super) fn emit_for_initializer(&mut self, node: &CsNode) {
        match node {
            CsNode::LocalDecl { .. } => self.emit_local_decl_head(node),
            CsNode::ExpressionStatement(expr) => self.emit_expression(expr),
            other => self.emit_expression(other),
        }
    }

    pub(super) fn emit_type(&mut self, ty: &CsType) {
        match ty {
            CsType::Var => self.write("var"),
            CsType::Predefined(keyword) => self.write(keyword),
            CsType::Named {
                name,
                type_arguments,
            } => {
                self.write(name);
                if !type_arguments.is_empty() {
                    self.write("<");
                    for (i, arg) in type_arguments.iter().enumerate() {
                        if i > 0 {
                            self.write(", ");
                        }
                        self.emit_type(arg);
                    }
                    self.write(">");
                }
            }
            CsType::Nullable(inner) => {
                self.emit_type(inner);
                self.write("?");
            }
            CsType::Array(element) => {
                self.emit_type(element);
                self.write("[]");
            }
        }
    }

    pub(super) fn emit_parameters(&mut self, parameters: &[CsParam]) {
        self.write("(");
        for (i, param) in parameters.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.emit_type(&param.ty);
            self.write(" ");
            self.write(&param.name);
        }
        self.write(")");
    }

    pub(super) fn emit_modifiers(&mut self, modifiers: &[String]) {
        for modifier in modifiers {
            self.write(modifier);
            self.write(" ");
        }
    }

    /// Escape a string for a regular (non-verbatim) string literal.
    pub(super) fn escape_string(s: &str) -> String {
        let mut result = String::with_capacity(s.len());
        for ch in s.chars() {
            match ch {
                '"' => result.push_str("\\\""),
                '\\' => result.push_str("\\\\"),
                '\n' => result.push_str("\\n"),
                '\r' => result.push_str("\\r"),
                '\t' => result.push_str("\\t"),
                '\0' => result.push_str("\\0"),
                c => result.push(c),
            }
        }
        result
    }
}
