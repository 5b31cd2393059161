//! Narrowed bindings: how a narrowed source identifier is read.

use tscs_emitter::CsNode;
use tscs_ir::IrType;

/// How reads of a narrowed identifier (or dotted path) are lowered while
/// the binding is in scope.
#[derive(Debug, Clone, PartialEq)]
pub enum NarrowedBinding {
    /// Read through another local, e.g. `pet__1_0` declared as `var pet__1_0 = pet.As1();`.
    Rename { name: String, ty: Option<IrType> },

    /// Read through a re-evaluable expression, e.g. `shape.As1()` or `id.Value`.
    Expr { expr: CsNode, ty: Option<IrType> },
}

impl NarrowedBinding {
    pub fn rename(name: impl Into<String>, ty: Option<IrType>) -> Self {
        Self::Rename {
            name: name.into(),
            ty,
        }
    }

    pub const fn expr(expr: CsNode, ty: Option<IrType>) -> Self {
        Self::Expr { expr, ty }
    }

    /// The expression a read of the bound identifier lowers to.
    pub fn read(&self) -> CsNode {
        match self {
            Self::Rename { name, .. } => CsNode::id(name.clone()),
            Self::Expr { expr, .. } => expr.clone(),
        }
    }

    /// The narrowed type, when known.
    pub const fn ty(&self) -> Option<&IrType> {
        match self {
            Self::Rename { ty, .. } | Self::Expr { ty, .. } => ty.as_ref(),
        }
    }
}
