//! Inferred types attached to IR nodes.
//!
//! Optional and nullable types arrive as unions that include a nullish
//! member (`null` or `undefined`). Unions are flat: upstream never nests a
//! union directly inside another union.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Primitive types of the source language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrimitiveKind {
    Number,
    /// Integer refinement of `number` proven upstream.
    Int,
    String,
    Boolean,
    Char,
    Null,
    Undefined,
    Void,
    Unknown,
}

/// Nominal category of a named type, as resolved upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeKind {
    Class,
    Interface,
    Struct,
    Enum,
}

/// A named type reference: `Cat`, `Map<string, number>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceType {
    pub name: String,
    #[serde(default)]
    pub type_arguments: Vec<IrType>,
    #[serde(rename = "typeKind")]
    pub kind: TypeKind,
}

/// A literal value, used both as a literal type and as a literal expression.
///
/// Numbers keep their source text; suffix policy belongs to the printer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum LiteralValue {
    String(String),
    Number(String),
    Boolean(bool),
    Null,
    Undefined,
}

impl LiteralValue {
    pub const fn is_nullish(&self) -> bool {
        matches!(self, Self::Null | Self::Undefined)
    }

    /// True for numeric literals without a fractional part or exponent.
    pub fn is_integer(&self) -> bool {
        match self {
            Self::Number(text) => {
                !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit() || b == b'_')
            }
            _ => false,
        }
    }
}

/// Member list of a union type. Boxed inside [`IrType::Union`], since the
/// inline storage holds `IrType` values.
pub type UnionMembers = SmallVec<[IrType; 4]>;

/// The inferred type of an IR node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IrType {
    Primitive { primitive: PrimitiveKind },
    Literal { value: LiteralValue },
    Reference(ReferenceType),
    Union { members: Box<UnionMembers> },
    Array { element: Box<IrType> },
    TypeParameter { name: String },
}

impl IrType {
    pub const fn primitive(primitive: PrimitiveKind) -> Self {
        Self::Primitive { primitive }
    }

    pub const fn number() -> Self {
        Self::primitive(PrimitiveKind::Number)
    }

    pub const fn int() -> Self {
        Self::primitive(PrimitiveKind::Int)
    }

    pub const fn string() -> Self {
        Self::primitive(PrimitiveKind::String)
    }

    pub const fn boolean() -> Self {
        Self::primitive(PrimitiveKind::Boolean)
    }

    pub const fn null() -> Self {
        Self::primitive(PrimitiveKind::Null)
    }

    pub const fn undefined() -> Self {
        Self::primitive(PrimitiveKind::Undefined)
    }

    pub const fn void() -> Self {
        Self::primitive(PrimitiveKind::Void)
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::reference(name, TypeKind::Class)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::reference(name, TypeKind::Interface)
    }

    pub fn reference(name: impl Into<String>, kind: TypeKind) -> Self {
        Self::Reference(ReferenceType {
            name: name.into(),
            type_arguments: Vec::new(),
            kind,
        })
    }

    pub fn string_literal(value: impl Into<String>) -> Self {
        Self::Literal {
            value: LiteralValue::String(value.into()),
        }
    }

    pub fn number_literal(text: impl Into<String>) -> Self {
        Self::Literal {
            value: LiteralValue::Number(text.into()),
        }
    }

    pub fn union(members: impl IntoIterator<Item = IrType>) -> Self {
        Self::Union {
            members: Box::new(members.into_iter().collect()),
        }
    }

    pub fn array(element: IrType) -> Self {
        Self::Array {
            element: Box::new(element),
        }
    }

    /// `null`, `undefined`, or the corresponding literal types.
    pub fn is_nullish(&self) -> bool {
        match self {
            Self::Primitive { primitive } => {
                matches!(primitive, PrimitiveKind::Null | PrimitiveKind::Undefined)
            }
            Self::Literal { value } => value.is_nullish(),
            _ => false,
        }
    }

    /// Union members, or `None` when this is not a union.
    pub fn union_members(&self) -> Option<&[IrType]> {
        match self {
            Self::Union { members } => Some(members.as_slice()),
            _ => None,
        }
    }

    pub fn has_nullish_member(&self) -> bool {
        self.union_members()
            .is_some_and(|members| members.iter().any(IrType::is_nullish))
    }

    /// Members of a union that are not nullish. A non-union yields itself
    /// unless it is nullish.
    pub fn non_nullish_members(&self) -> Vec<&IrType> {
        match self {
            Self::Union { members } => members.iter().filter(|m| !m.is_nullish()).collect(),
            other if other.is_nullish() => Vec::new(),
            other => vec![other],
        }
    }

    /// The residual type once nullish members are removed.
    ///
    /// Returns `None` when nothing is left (a union of only nullish members).
    pub fn without_nullish(&self) -> Option<IrType> {
        let residual = self.non_nullish_members();
        match residual.len() {
            0 => None,
            1 => Some(residual[0].clone()),
            _ => Some(IrType::union(residual.into_iter().cloned())),
        }
    }

    /// Whether the target language represents this type as a value type.
    ///
    /// Value types need `.Value` to unwrap their nullable form; reference
    /// types are already nullable and need no accessor.
    pub fn is_value_type(&self) -> bool {
        match self {
            Self::Primitive { primitive } => matches!(
                primitive,
                PrimitiveKind::Number | PrimitiveKind::Int | PrimitiveKind::Boolean | PrimitiveKind::Char
            ),
            Self::Literal { value } => {
                matches!(value, LiteralValue::Number(_) | LiteralValue::Boolean(_))
            }
            Self::Reference(reference) => {
                matches!(reference.kind, TypeKind::Struct | TypeKind::Enum)
            }
            Self::Union { .. } | Self::Array { .. } | Self::TypeParameter { .. } => false,
        }
    }

    /// The set of literals a property type denotes, if it denotes only literals.
    ///
    /// `"circle"` yields one literal; `"a" | "b"` yields two; `string` yields `None`.
    pub fn literal_set(&self) -> Option<Vec<&LiteralValue>> {
        match self {
            Self::Literal { value } => Some(vec![value]),
            Self::Union { members } => members
                .iter()
                .map(|member| match member {
                    Self::Literal { value } => Some(value),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }

    /// Name of the referenced type, if this is a type reference.
    pub fn reference_name(&self) -> Option<&str> {
        match self {
            Self::Reference(reference) => Some(reference.name.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../tests/types.rs"]
mod tests;
