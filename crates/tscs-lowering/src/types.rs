//! Type syntax for lowered declarations.
//!
//! Maps inferred IR types to target type syntax. Optional value types
//! become nullable (`double?`); unions become the runtime tagged union
//! named by `LoweringOptions::union_type_name`.

use crate::error::{LoweringError, LoweringResult};
use crate::options::LoweringOptions;
use tscs_common::limits::is_supported_union_arity;
use tscs_emitter::CsType;
use tscs_ir::{IrType, LiteralValue, PrimitiveKind};

const TASK_TYPE_NAME: &str = "global::System.Threading.Tasks.Task";

pub fn lower_type(ty: &IrType, options: &LoweringOptions) -> LoweringResult<CsType> {
    match ty {
        IrType::Primitive { primitive } => Ok(primitive_type(*primitive)),
        IrType::Literal { value } => Ok(literal_type(value)),
        IrType::Reference(reference) => Ok(CsType::generic(
            reference.name.clone(),
            reference
                .type_arguments
                .iter()
                .map(|arg| lower_type(arg, options))
                .collect::<LoweringResult<Vec<_>>>()?,
        )),
        IrType::Array { element } => Ok(CsType::array(lower_type(element, options)?)),
        IrType::TypeParameter { name } => Ok(CsType::named(name.clone())),
        IrType::Union { members } => lower_union_type(members, options),
    }
}

fn primitive_type(primitive: PrimitiveKind) -> CsType {
    let keyword = match primitive {
        PrimitiveKind::Number => "double",
        PrimitiveKind::Int => "int",
        PrimitiveKind::String => "string",
        PrimitiveKind::Boolean => "bool",
        PrimitiveKind::Char => "char",
        PrimitiveKind::Void => "void",
        PrimitiveKind::Null | PrimitiveKind::Undefined | PrimitiveKind::Unknown => "object",
    };
    CsType::predefined(keyword)
}

fn literal_type(value: &LiteralValue) -> CsType {
    match value {
        LiteralValue::String(_) => CsType::predefined("string"),
        LiteralValue::Number(_) => CsType::predefined("double"),
        LiteralValue::Boolean(_) => CsType::predefined("bool"),
        LiteralValue::Null | LiteralValue::Undefined => CsType::predefined("object"),
    }
}

fn lower_union_type(members: &[IrType], options: &LoweringOptions) -> LoweringResult<CsType> {
    let residual: Vec<&IrType> = members.iter().filter(|m| !m.is_nullish()).collect();
    let optional = residual.len() < members.len();

    if residual.is_empty() {
        return Ok(CsType::predefined("object"));
    }

    // `"a" | "b"` and `true | false` collapse to their primitive.
    if let Some(collapsed) = collapse_literals(&residual) {
        return Ok(if optional && is_value_keyword(&collapsed) {
            CsType::nullable(collapsed)
        } else {
            collapsed
        });
    }

    if residual.len() == 1 {
        let inner = lower_type(residual[0], options)?;
        return Ok(if optional && residual[0].is_value_type() {
            CsType::nullable(inner)
        } else {
            inner
        });
    }

    if !is_supported_union_arity(residual.len()) {
        return Err(LoweringError::UnsupportedExpression {
            kind: "unionType",
            reason: format!("union of {} members has no runtime representation", residual.len()),
        });
    }

    let arguments = residual
        .into_iter()
        .map(|member| lower_type(member, options))
        .collect::<LoweringResult<Vec<_>>>()?;
    Ok(CsType::generic(options.union_type_name.clone(), arguments))
}

fn collapse_literals(members: &[&IrType]) -> Option<CsType> {
    let mut collapsed: Option<CsType> = None;
    for member in members {
        let IrType::Literal { value } = member else {
            return None;
        };
        let ty = literal_type(value);
        match &collapsed {
            Some(existing) if *existing != ty => return None,
            _ => collapsed = Some(ty),
        }
    }
    collapsed
}

fn is_value_keyword(ty: &CsType) -> bool {
    matches!(ty, CsType::Predefined(keyword) if keyword != "string" && keyword != "object")
}

/// Return type of a method: `void`/`T`, or `Task`/`Task<T>` when async.
pub fn lower_return_type(
    return_type: Option<&IrType>,
    is_async: bool,
    options: &LoweringOptions,
) -> LoweringResult<CsType> {
    let is_void = return_type.is_none_or(|ty| {
        matches!(
            ty,
            IrType::Primitive {
                primitive: PrimitiveKind::Void | PrimitiveKind::Undefined
            }
        )
    });
    match (is_void, is_async, return_type) {
        (true, false, _) => Ok(CsType::predefined("void")),
        (true, true, _) => Ok(CsType::named(TASK_TYPE_NAME)),
        (false, false, Some(ty)) => lower_type(ty, options),
        (false, true, Some(ty)) => Ok(CsType::generic(TASK_TYPE_NAME, vec![lower_type(ty, options)?])),
        (false, _, None) => Ok(CsType::predefined("void")),
    }
}

#[cfg(test)]
#[path = "../tests/types.rs"]
mod tests;
