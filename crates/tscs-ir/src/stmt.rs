//! IR statements, functions and modules.

use crate::expr::IrExpression;
use crate::types::IrType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VariableKind {
    Let,
    Const,
    Var,
}

/// Target of a declaration or a loop binding.
///
/// Destructuring patterns are lowered by a separate pass; this engine only
/// accepts plain identifiers and reports patterns as internal errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IrBindingTarget {
    Identifier { name: String },
    ObjectPattern { names: Vec<String> },
    ArrayPattern { names: Vec<String> },
}

impl IrBindingTarget {
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Identifier { name: name.into() }
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Self::Identifier { name } => Some(name.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrVariableDeclarator {
    pub target: IrBindingTarget,
    #[serde(default)]
    pub declared_type: Option<IrType>,
    #[serde(default)]
    pub initializer: Option<IrExpression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrVariableDeclaration {
    #[serde(rename = "declarationKind")]
    pub kind: VariableKind,
    pub declarations: Vec<IrVariableDeclarator>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IrForInitializer {
    Declaration(IrVariableDeclaration),
    Expression { expression: IrExpression },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrSwitchCase {
    /// `None` for `default:`.
    #[serde(default)]
    pub test: Option<IrExpression>,
    pub statements: Vec<IrStatement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrCatchClause {
    #[serde(default)]
    pub parameter: Option<String>,
    pub body: Vec<IrStatement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrParameter {
    pub name: String,
    #[serde(default)]
    pub param_type: Option<IrType>,
}

impl IrParameter {
    pub fn new(name: impl Into<String>, param_type: IrType) -> Self {
        Self {
            name: name.into(),
            param_type: Some(param_type),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrFunction {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<IrParameter>,
    #[serde(default)]
    pub return_type: Option<IrType>,
    pub body: Vec<IrStatement>,
    #[serde(default)]
    pub is_async: bool,
    #[serde(default)]
    pub is_static: bool,
}

/// One compilation unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrModule {
    pub name: String,
    pub functions: Vec<IrFunction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IrStatement {
    VariableDeclaration(IrVariableDeclaration),
    Expression {
        expression: IrExpression,
    },
    Return {
        #[serde(default)]
        expression: Option<IrExpression>,
    },
    Throw {
        expression: IrExpression,
    },
    #[serde(rename_all = "camelCase")]
    If {
        condition: IrExpression,
        then_statement: Box<IrStatement>,
        #[serde(default)]
        else_statement: Option<Box<IrStatement>>,
    },
    Block {
        statements: Vec<IrStatement>,
    },
    While {
        condition: IrExpression,
        body: Box<IrStatement>,
    },
    DoWhile {
        body: Box<IrStatement>,
        condition: IrExpression,
    },
    For {
        #[serde(default)]
        initializer: Option<IrForInitializer>,
        #[serde(default)]
        condition: Option<IrExpression>,
        #[serde(default)]
        update: Option<IrExpression>,
        body: Box<IrStatement>,
    },
    #[serde(rename_all = "camelCase")]
    ForOf {
        target: IrBindingTarget,
        expression: IrExpression,
        body: Box<IrStatement>,
        #[serde(default)]
        is_await: bool,
    },
    ForIn {
        target: IrBindingTarget,
        expression: IrExpression,
        body: Box<IrStatement>,
    },
    Switch {
        discriminant: IrExpression,
        cases: Vec<IrSwitchCase>,
    },
    Break {
        #[serde(default)]
        label: Option<String>,
    },
    Continue {
        #[serde(default)]
        label: Option<String>,
    },
    Try {
        block: Vec<IrStatement>,
        #[serde(default)]
        handler: Option<IrCatchClause>,
        #[serde(default)]
        finalizer: Option<Vec<IrStatement>>,
    },
    FunctionDeclaration(IrFunction),
    Empty,
}

impl IrStatement {
    /// Stable name of this node kind, used in internal compiler errors.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::VariableDeclaration(_) => "variableDeclaration",
            Self::Expression { .. } => "expression",
            Self::Return { .. } => "return",
            Self::Throw { .. } => "throw",
            Self::If { .. } => "if",
            Self::Block { .. } => "block",
            Self::While { .. } => "while",
            Self::DoWhile { .. } => "doWhile",
            Self::For { .. } => "for",
            Self::ForOf { .. } => "forOf",
            Self::ForIn { .. } => "forIn",
            Self::Switch { .. } => "switch",
            Self::Break { .. } => "break",
            Self::Continue { .. } => "continue",
            Self::Try { .. } => "try",
            Self::FunctionDeclaration(_) => "functionDeclaration",
            Self::Empty => "empty",
        }
    }

    // =========================================================================
    // Builder helpers
    // =========================================================================

    pub const fn expr(expression: IrExpression) -> Self {
        Self::Expression { expression }
    }

    pub const fn ret(expression: Option<IrExpression>) -> Self {
        Self::Return { expression }
    }

    pub const fn throw(expression: IrExpression) -> Self {
        Self::Throw { expression }
    }

    pub const fn block(statements: Vec<Self>) -> Self {
        Self::Block { statements }
    }

    pub fn if_then(condition: IrExpression, then_statement: Self) -> Self {
        Self::If {
            condition,
            then_statement: Box::new(then_statement),
            else_statement: None,
        }
    }

    pub fn if_else(condition: IrExpression, then_statement: Self, else_statement: Self) -> Self {
        Self::If {
            condition,
            then_statement: Box::new(then_statement),
            else_statement: Some(Box::new(else_statement)),
        }
    }

    /// `let name[: ty] = init;`
    pub fn let_decl(name: impl Into<String>, declared_type: Option<IrType>, initializer: Option<IrExpression>) -> Self {
        Self::VariableDeclaration(IrVariableDeclaration {
            kind: VariableKind::Let,
            declarations: vec![IrVariableDeclarator {
                target: IrBindingTarget::ident(name),
                declared_type,
                initializer,
            }],
        })
    }

    /// Whether every path through this statement ends in `return` or `throw`.
    ///
    /// A block terminates when its last statement does; an `if` terminates
    /// only when both branches do.
    pub fn terminates(&self) -> bool {
        match self {
            Self::Return { .. } | Self::Throw { .. } => true,
            Self::Block { statements } => statements.last().is_some_and(Self::terminates),
            Self::If {
                then_statement,
                else_statement: Some(else_statement),
                ..
            } => then_statement.terminates() && else_statement.terminates(),
            _ => false,
        }
    }
}
