//! Target AST for lowered code
//!
//! This module defines the tree the lowering engine produces instead of text.
//! The nodes represent constructs of the nominal target language; the
//! printer walks them and emits source.
//!
//! # Architecture
//!
//! The lowering engine turns IR statements into `CsNode` trees. The printer
//! then walks these trees and writes strings. Narrowing only ever shows up
//! in three shapes:
//! - a local declaration whose initializer calls a member accessor (`x.As1()`)
//! - an identifier read replaced by an accessor expression (`x.Value`)
//! - a type-test pattern with a designation (`x is Cat x__is_0`)

/// Syntax of a type in the target language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsType {
    /// Implicitly typed local: `var`
    Var,

    /// Keyword type: `double`, `string`, `bool`, `object`, `void`
    Predefined(String),

    /// Named type, optionally generic: `Cat`, `Union<Cat, Dog>`
    Named {
        name: String,
        type_arguments: Vec<Self>,
    },

    /// Nullable value type: `double?`
    Nullable(Box<Self>),

    /// Array type: `string[]`
    Array(Box<Self>),
}

impl CsType {
    pub fn predefined(keyword: impl Into<String>) -> Self {
        Self::Predefined(keyword.into())
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            type_arguments: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, type_arguments: Vec<Self>) -> Self {
        Self::Named {
            name: name.into(),
            type_arguments,
        }
    }

    pub fn nullable(inner: Self) -> Self {
        Self::Nullable(Box::new(inner))
    }

    pub fn array(element: Self) -> Self {
        Self::Array(Box::new(element))
    }
}

/// Node of the lowered target tree
#[derive(Debug, Clone, PartialEq)]
pub enum CsNode {
    // =========================================================================
    // Literals
    // =========================================================================
    /// Numeric literal: `42`, `3.14`
    NumericLiteral(String),

    /// String literal: `"hello"`
    StringLiteral(String),

    /// Boolean literal: `true`, `false`
    BooleanLiteral(bool),

    /// Null literal: `null`
    NullLiteral,

    // =========================================================================
    // Identifiers
    // =========================================================================
    /// Identifier: `foo`, `pet__1_0`
    Identifier(String),

    /// This keyword
    This,

    // =========================================================================
    // Expressions
    // =========================================================================
    /// Binary expression: `left op right`
    BinaryExpr {
        left: Box<Self>,
        operator: String,
        right: Box<Self>,
    },

    /// Unary prefix expression: `!x`, `-x`, `++x`
    PrefixUnaryExpr { operator: String, operand: Box<Self> },

    /// Unary postfix expression: `x++`, `x--`
    PostfixUnaryExpr { operand: Box<Self>, operator: String },

    /// Call expression: `callee(args)`
    CallExpr { callee: Box<Self>, arguments: Vec<Self> },

    /// Object creation: `new Type(args)`
    NewExpr { ty: CsType, arguments: Vec<Self> },

    /// Member access: `object.member`
    MemberAccess { object: Box<Self>, member: String },

    /// Null-conditional member access: `object?.member`
    ConditionalMemberAccess { object: Box<Self>, member: String },

    /// Element access: `object[index]`
    ElementAccess { object: Box<Self>, index: Box<Self> },

    /// Conditional expression: `cond ? then : else`
    ConditionalExpr {
        condition: Box<Self>,
        when_true: Box<Self>,
        when_false: Box<Self>,
    },

    /// Parenthesized expression: `(expr)`
    Parenthesized(Box<Self>),

    /// Type test with optional pattern designation: `x is Cat` / `x is Cat cat`
    IsPattern {
        expression: Box<Self>,
        ty: CsType,
        designation: Option<String>,
    },

    /// Cast: `(Type)expr`
    Cast { ty: CsType, expression: Box<Self> },

    /// Await: `await expr`
    Await(Box<Self>),

    /// Array creation: `new[] { a, b }` or `new T[] { a, b }`
    ArrayCreation {
        element_type: Option<CsType>,
        elements: Vec<Self>,
    },

    // =========================================================================
    // Statements
    // =========================================================================
    /// Local declaration: `var x = value;`, `double y;`
    LocalDecl {
        ty: CsType,
        name: String,
        initializer: Option<Box<Self>>,
    },

    /// Expression statement: `expr;`
    ExpressionStatement(Box<Self>),

    /// Return statement: `return expr;`
    ReturnStatement(Option<Box<Self>>),

    /// Throw statement: `throw expr;`
    ThrowStatement(Box<Self>),

    /// If statement: `if (cond) { then } else { else }`
    IfStatement {
        condition: Box<Self>,
        then_branch: Box<Self>,
        else_branch: Option<Box<Self>>,
    },

    /// Block statement: `{ statements }`
    Block(Vec<Self>),

    /// While statement: `while (cond) { body }`
    WhileStatement { condition: Box<Self>, body: Box<Self> },

    /// Do-while statement: `do { body } while (cond);`
    DoWhileStatement { body: Box<Self>, condition: Box<Self> },

    /// For statement: `for (init; cond; incr) { body }`
    ForStatement {
        initializer: Option<Box<Self>>,
        condition: Option<Box<Self>>,
        incrementors: Vec<Self>,
        body: Box<Self>,
    },

    /// Foreach statement: `foreach (var x in items) { body }`, optionally `await foreach`
    ForEachStatement {
        ty: CsType,
        name: String,
        expression: Box<Self>,
        body: Box<Self>,
        is_await: bool,
    },

    /// Switch statement
    SwitchStatement {
        expression: Box<Self>,
        sections: Vec<CsSwitchSection>,
    },

    /// Break statement: `break;`
    BreakStatement,

    /// Continue statement: `continue;`
    ContinueStatement,

    /// Try statement: `try { block } catch (E e) { handler } finally { finalizer }`
    TryStatement {
        block: Box<Self>,
        catch_clause: Option<CsCatchClause>,
        finally_block: Option<Box<Self>>,
    },

    /// Local function: `double f(double x) { body }`
    LocalFunction(CsMethod),

    /// Empty statement: `;`
    EmptyStatement,

    // =========================================================================
    // Declarations
    // =========================================================================
    /// Class declaration
    ClassDecl {
        modifiers: Vec<String>,
        name: String,
        type_parameters: Vec<String>,
        members: Vec<Self>,
    },

    /// Field declaration: `private readonly int _index;`
    FieldDecl {
        modifiers: Vec<String>,
        ty: CsType,
        name: String,
    },

    /// Constructor declaration
    ConstructorDecl {
        modifiers: Vec<String>,
        name: String,
        parameters: Vec<CsParam>,
        body: Vec<Self>,
    },

    /// Method declaration
    MethodDecl(CsMethod),
}

/// Method or local function signature plus body
#[derive(Debug, Clone, PartialEq)]
pub struct CsMethod {
    pub modifiers: Vec<String>,
    pub return_type: CsType,
    pub name: String,
    pub parameters: Vec<CsParam>,
    pub body: Vec<CsNode>,
}

/// Method parameter
#[derive(Debug, Clone, PartialEq)]
pub struct CsParam {
    pub ty: CsType,
    pub name: String,
}

/// Switch section: one or more labels followed by statements
#[derive(Debug, Clone, PartialEq)]
pub struct CsSwitchSection {
    /// `None` for `default:`
    pub label: Option<CsNode>,
    pub statements: Vec<CsNode>,
}

/// Catch clause
#[derive(Debug, Clone, PartialEq)]
pub struct CsCatchClause {
    pub ty: CsType,
    pub name: Option<String>,
    pub body: Vec<CsNode>,
}

// =========================================================================
// Builder helpers for tree construction
// =========================================================================

impl CsNode {
    /// Create an identifier node
    pub fn id(name: impl Into<String>) -> Self {
        Self::Identifier(name.into())
    }

    /// Create a string literal
    pub fn string(s: impl Into<String>) -> Self {
        Self::StringLiteral(s.into())
    }

    /// Create a numeric literal
    pub fn number(n: impl Into<String>) -> Self {
        Self::NumericLiteral(n.into())
    }

    /// Create a call expression
    pub fn call(callee: Self, args: Vec<Self>) -> Self {
        Self::CallExpr {
            callee: Box::new(callee),
            arguments: args,
        }
    }

    /// Call a method with no arguments on `object`: `object.method()`
    pub fn method_call(object: Self, method: impl Into<String>) -> Self {
        Self::call(Self::member(object, method), Vec::new())
    }

    /// Create a member access
    pub fn member(object: Self, member: impl Into<String>) -> Self {
        Self::MemberAccess {
            object: Box::new(object),
            member: member.into(),
        }
    }

    /// Create an element access
    pub fn elem(object: Self, index: Self) -> Self {
        Self::ElementAccess {
            object: Box::new(object),
            index: Box::new(index),
        }
    }

    /// Create a binary expression
    pub fn binary(left: Self, op: impl Into<String>, right: Self) -> Self {
        Self::BinaryExpr {
            left: Box::new(left),
            operator: op.into(),
            right: Box::new(right),
        }
    }

    /// Create an assignment expression
    pub fn assign(target: Self, value: Self) -> Self {
        Self::binary(target, "=", value)
    }

    /// Create a logical AND expression: `left && right`
    pub fn logical_and(left: Self, right: Self) -> Self {
        Self::binary(left, "&&", right)
    }

    /// Create a logical OR expression: `left || right`
    pub fn logical_or(left: Self, right: Self) -> Self {
        Self::binary(left, "||", right)
    }

    /// Logical negation: `!operand`
    pub fn not(operand: Self) -> Self {
        Self::PrefixUnaryExpr {
            operator: "!".to_string(),
            operand: Box::new(operand),
        }
    }

    /// Type test: `expr is T` with an optional pattern designation
    pub fn is_pattern(expression: Self, ty: CsType, designation: Option<String>) -> Self {
        Self::IsPattern {
            expression: Box::new(expression),
            ty,
            designation,
        }
    }

    /// Cast: `(T)expr`
    pub fn cast(ty: CsType, expression: Self) -> Self {
        Self::Cast {
            ty,
            expression: Box::new(expression),
        }
    }

    /// Wrap in parentheses
    pub fn paren(self) -> Self {
        Self::Parenthesized(Box::new(self))
    }

    /// Create a local declaration
    pub fn local(ty: CsType, name: impl Into<String>, init: Option<Self>) -> Self {
        Self::LocalDecl {
            ty,
            name: name.into(),
            initializer: init.map(Box::new),
        }
    }

    /// Create an implicitly typed local: `var name = init;`
    pub fn var(name: impl Into<String>, init: Self) -> Self {
        Self::local(CsType::Var, name, Some(init))
    }

    /// Create a return statement
    pub fn ret(expr: Option<Self>) -> Self {
        Self::ReturnStatement(expr.map(Box::new))
    }

    /// Create a throw statement
    pub fn throw(expr: Self) -> Self {
        Self::ThrowStatement(Box::new(expr))
    }

    /// Create a block
    pub const fn block(stmts: Vec<Self>) -> Self {
        Self::Block(stmts)
    }

    /// Create an expression statement
    pub fn expr_stmt(expr: Self) -> Self {
        Self::ExpressionStatement(Box::new(expr))
    }

    /// Create an if statement
    pub fn if_stmt(condition: Self, then_branch: Self, else_branch: Option<Self>) -> Self {
        Self::IfStatement {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: else_branch.map(Box::new),
        }
    }

    /// Create a new expression: `new Type(args)`
    pub const fn new_expr(ty: CsType, args: Vec<Self>) -> Self {
        Self::NewExpr {
            ty,
            arguments: args,
        }
    }

    /// Whether this node is a statement (as opposed to an expression or declaration).
    pub const fn is_statement(&self) -> bool {
        matches!(
            self,
            Self::LocalDecl { .. }
                | Self::ExpressionStatement(_)
                | Self::ReturnStatement(_)
                | Self::ThrowStatement(_)
                | Self::IfStatement { .. }
                | Self::Block(_)
                | Self::WhileStatement { .. }
                | Self::DoWhileStatement { .. }
                | Self::ForStatement { .. }
                | Self::ForEachStatement { .. }
                | Self::SwitchStatement { .. }
                | Self::BreakStatement
                | Self::ContinueStatement
                | Self::TryStatement { .. }
                | Self::LocalFunction(_)
                | Self::EmptyStatement
        )
    }
}

impl CsParam {
    pub fn new(ty: CsType, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: name.into(),
        }
    }
}
