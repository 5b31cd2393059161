//! IR expressions.
//!
//! Every expression may carry the type the checker inferred for it. Call
//! nodes may also carry an upstream narrowing descriptor that the lowering
//! engine trusts instead of re-deriving.

use crate::types::{IrType, LiteralValue};
use serde::{Deserialize, Serialize};

/// Narrowing facts attached upstream to a call expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NarrowingDescriptor {
    /// The callee is a user-defined type predicate: `(x: A | B) => x is A`.
    #[serde(rename_all = "camelCase")]
    TypePredicate {
        parameter_index: usize,
        target_type: IrType,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    #[serde(rename = "==")]
    LooseEquals,
    #[serde(rename = "!=")]
    LooseNotEquals,
    #[serde(rename = "===")]
    StrictEquals,
    #[serde(rename = "!==")]
    StrictNotEquals,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "<=")]
    LessThanOrEqual,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
    #[serde(rename = "%")]
    Remainder,
    #[serde(rename = "&")]
    BitAnd,
    #[serde(rename = "|")]
    BitOr,
    #[serde(rename = "^")]
    BitXor,
    #[serde(rename = "<<")]
    ShiftLeft,
    #[serde(rename = ">>")]
    ShiftRight,
    #[serde(rename = "instanceof")]
    Instanceof,
    #[serde(rename = "in")]
    In,
}

impl BinaryOperator {
    pub const fn is_equality(self) -> bool {
        matches!(
            self,
            Self::LooseEquals | Self::LooseNotEquals | Self::StrictEquals | Self::StrictNotEquals
        )
    }

    /// `!=` and `!==`.
    pub const fn is_negated_equality(self) -> bool {
        matches!(self, Self::LooseNotEquals | Self::StrictNotEquals)
    }

    /// Swap `==` with `!=` and `===` with `!==`; other operators are unchanged.
    pub const fn negate_equality(self) -> Self {
        match self {
            Self::LooseEquals => Self::LooseNotEquals,
            Self::LooseNotEquals => Self::LooseEquals,
            Self::StrictEquals => Self::StrictNotEquals,
            Self::StrictNotEquals => Self::StrictEquals,
            other => other,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LooseEquals => "==",
            Self::LooseNotEquals => "!=",
            Self::StrictEquals => "===",
            Self::StrictNotEquals => "!==",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Remainder => "%",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
            Self::Instanceof => "instanceof",
            Self::In => "in",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOperator {
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "||")]
    Or,
    #[serde(rename = "??")]
    Coalesce,
}

impl LogicalOperator {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "&&",
            Self::Or => "||",
            Self::Coalesce => "??",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    #[serde(rename = "!")]
    Not,
    #[serde(rename = "-")]
    Minus,
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "~")]
    BitNot,
    #[serde(rename = "typeof")]
    Typeof,
    #[serde(rename = "void")]
    Void,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdateOperator {
    #[serde(rename = "++")]
    Increment,
    #[serde(rename = "--")]
    Decrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignmentOperator {
    #[serde(rename = "=")]
    Assign,
    #[serde(rename = "+=")]
    AddAssign,
    #[serde(rename = "-=")]
    SubtractAssign,
    #[serde(rename = "*=")]
    MultiplyAssign,
    #[serde(rename = "/=")]
    DivideAssign,
    #[serde(rename = "%=")]
    RemainderAssign,
    #[serde(rename = "??=")]
    CoalesceAssign,
}

impl AssignmentOperator {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::AddAssign => "+=",
            Self::SubtractAssign => "-=",
            Self::MultiplyAssign => "*=",
            Self::DivideAssign => "/=",
            Self::RemainderAssign => "%=",
            Self::CoalesceAssign => "??=",
        }
    }
}

/// An IR expression with its inferred type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrExpression {
    #[serde(flatten)]
    pub kind: IrExpressionKind,
    #[serde(default)]
    pub inferred_type: Option<IrType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IrExpressionKind {
    Identifier {
        name: String,
    },
    Literal {
        value: LiteralValue,
    },
    This,
    #[serde(rename_all = "camelCase")]
    MemberAccess {
        object: Box<IrExpression>,
        property: String,
        #[serde(default)]
        optional: bool,
    },
    ElementAccess {
        object: Box<IrExpression>,
        index: Box<IrExpression>,
    },
    Call {
        callee: Box<IrExpression>,
        arguments: Vec<IrExpression>,
        #[serde(default)]
        narrowing: Option<NarrowingDescriptor>,
    },
    New {
        callee: Box<IrExpression>,
        arguments: Vec<IrExpression>,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<IrExpression>,
        right: Box<IrExpression>,
    },
    Logical {
        operator: LogicalOperator,
        left: Box<IrExpression>,
        right: Box<IrExpression>,
    },
    Unary {
        operator: UnaryOperator,
        operand: Box<IrExpression>,
    },
    Update {
        operator: UpdateOperator,
        prefix: bool,
        operand: Box<IrExpression>,
    },
    Assignment {
        operator: AssignmentOperator,
        target: Box<IrExpression>,
        value: Box<IrExpression>,
    },
    #[serde(rename_all = "camelCase")]
    Conditional {
        condition: Box<IrExpression>,
        when_true: Box<IrExpression>,
        when_false: Box<IrExpression>,
    },
    Array {
        elements: Vec<IrExpression>,
    },
    Await {
        expression: Box<IrExpression>,
    },
    #[serde(rename_all = "camelCase")]
    TypeAssertion {
        expression: Box<IrExpression>,
        target_type: IrType,
    },
    Spread {
        expression: Box<IrExpression>,
    },
    ArrowFunction,
}

impl IrExpressionKind {
    /// Stable name of this node kind, used in internal compiler errors.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Identifier { .. } => "identifier",
            Self::Literal { .. } => "literal",
            Self::This => "this",
            Self::MemberAccess { .. } => "memberAccess",
            Self::ElementAccess { .. } => "elementAccess",
            Self::Call { .. } => "call",
            Self::New { .. } => "new",
            Self::Binary { .. } => "binary",
            Self::Logical { .. } => "logical",
            Self::Unary { .. } => "unary",
            Self::Update { .. } => "update",
            Self::Assignment { .. } => "assignment",
            Self::Conditional { .. } => "conditional",
            Self::Array { .. } => "array",
            Self::Await { .. } => "await",
            Self::TypeAssertion { .. } => "typeAssertion",
            Self::Spread { .. } => "spread",
            Self::ArrowFunction => "arrowFunction",
        }
    }
}

// =========================================================================
// Builder helpers for IR construction
// =========================================================================

impl IrExpression {
    pub const fn new(kind: IrExpressionKind) -> Self {
        Self {
            kind,
            inferred_type: None,
        }
    }

    /// Attach an inferred type.
    pub fn typed(mut self, ty: IrType) -> Self {
        self.inferred_type = Some(ty);
        self
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Self::new(IrExpressionKind::Identifier { name: name.into() })
    }

    pub fn literal(value: LiteralValue) -> Self {
        let ty = IrType::Literal {
            value: value.clone(),
        };
        Self::new(IrExpressionKind::Literal { value }).typed(ty)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::literal(LiteralValue::String(value.into()))
    }

    pub fn number(text: impl Into<String>) -> Self {
        Self::literal(LiteralValue::Number(text.into()))
    }

    pub fn boolean(value: bool) -> Self {
        Self::literal(LiteralValue::Boolean(value))
    }

    pub fn null() -> Self {
        Self::literal(LiteralValue::Null)
    }

    pub fn undefined() -> Self {
        Self::literal(LiteralValue::Undefined)
    }

    pub fn member(object: Self, property: impl Into<String>) -> Self {
        Self::new(IrExpressionKind::MemberAccess {
            object: Box::new(object),
            property: property.into(),
            optional: false,
        })
    }

    pub fn call(callee: Self, arguments: Vec<Self>) -> Self {
        Self::new(IrExpressionKind::Call {
            callee: Box::new(callee),
            arguments,
            narrowing: None,
        })
    }

    /// A call to a type predicate `callee(arg): arg is target`.
    pub fn predicate_call(callee: Self, arguments: Vec<Self>, parameter_index: usize, target_type: IrType) -> Self {
        Self::new(IrExpressionKind::Call {
            callee: Box::new(callee),
            arguments,
            narrowing: Some(NarrowingDescriptor::TypePredicate {
                parameter_index,
                target_type,
            }),
        })
        .typed(IrType::boolean())
    }

    pub fn binary(operator: BinaryOperator, left: Self, right: Self) -> Self {
        Self::new(IrExpressionKind::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn logical(operator: LogicalOperator, left: Self, right: Self) -> Self {
        Self::new(IrExpressionKind::Logical {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn and(left: Self, right: Self) -> Self {
        Self::logical(LogicalOperator::And, left, right)
    }

    pub fn not(operand: Self) -> Self {
        Self::new(IrExpressionKind::Unary {
            operator: UnaryOperator::Not,
            operand: Box::new(operand),
        })
        .typed(IrType::boolean())
    }

    pub fn assign(target: Self, value: Self) -> Self {
        Self::new(IrExpressionKind::Assignment {
            operator: AssignmentOperator::Assign,
            target: Box::new(target),
            value: Box::new(value),
        })
    }

    pub fn update(operator: UpdateOperator, prefix: bool, operand: Self) -> Self {
        Self::new(IrExpressionKind::Update {
            operator,
            prefix,
            operand: Box::new(operand),
        })
    }

    pub fn await_expr(expression: Self) -> Self {
        Self::new(IrExpressionKind::Await {
            expression: Box::new(expression),
        })
    }

    /// The identifier name, if this is a bare identifier.
    pub fn as_identifier(&self) -> Option<&str> {
        match &self.kind {
            IrExpressionKind::Identifier { name } => Some(name.as_str()),
            _ => None,
        }
    }

    /// Literal value, if this is a literal.
    pub const fn as_literal(&self) -> Option<&LiteralValue> {
        match &self.kind {
            IrExpressionKind::Literal { value } => Some(value),
            _ => None,
        }
    }

    /// Dotted path of an identifier or a chain of non-optional member
    /// accesses rooted at one: `a.b.c`.
    pub fn member_path(&self) -> Option<String> {
        match &self.kind {
            IrExpressionKind::Identifier { name } => Some(name.clone()),
            IrExpressionKind::MemberAccess {
                object,
                property,
                optional: false,
            } => {
                let mut path = object.member_path()?;
                path.push('.');
                path.push_str(property);
                Some(path)
            }
            _ => None,
        }
    }
}
