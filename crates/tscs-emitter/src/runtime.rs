//! Tagged-union runtime generator
//!
//! Lowered code reads union values only through `IsK()` and `AsK()`, and
//! builds them through the static `FromK` factories. This module produces
//! the `Union<T1..TN>` classes that provide that contract for every arity
//! the lowering engine accepts.
//!
//! ```text
//! public sealed class Union<T1, T2>
//! {
//!     private readonly int _index;
//!     private readonly object _value;
//!     ...
//!     public bool Is1() { return _index == 1; }
//!     public T1 As1() { if (_index != 1) throw ...; return (T1)_value; }
//! }
//! ```

use crate::ast::{CsMethod, CsNode, CsParam, CsType};
use crate::printer::CsPrinter;
use tscs_common::limits::{MAX_UNION_ARITY, MIN_UNION_ARITY};
use tscs_common::naming::{as_member, from_member, is_member};

/// Namespace the runtime classes are emitted into.
pub const RUNTIME_NAMESPACE: &str = "Tscs.Runtime";

/// Simple name of the runtime union class family.
pub const UNION_CLASS_NAME: &str = "Union";

const INDEX_FIELD: &str = "_index";
const VALUE_FIELD: &str = "_value";
const MISMATCH_EXCEPTION: &str = "global::System.InvalidOperationException";

/// Class declarations for every supported union arity, smallest first.
pub fn union_runtime_declarations() -> Vec<CsNode> {
    (MIN_UNION_ARITY..=MAX_UNION_ARITY)
        .map(union_class_declaration)
        .collect()
}

/// Full runtime source: a file-scoped namespace followed by every class.
pub fn emit_union_runtime() -> String {
    let mut out = format!("namespace {RUNTIME_NAMESPACE};\n");
    for decl in union_runtime_declarations() {
        out.push('\n');
        out.push_str(&CsPrinter::emit_to_string(&decl));
        out.push('\n');
    }
    out
}

/// `Union<T1, ..., Tarity>` with its fields, constructor and accessors.
pub fn union_class_declaration(arity: usize) -> CsNode {
    let type_parameters: Vec<String> = (1..=arity).map(type_parameter).collect();
    let self_type = CsType::generic(
        UNION_CLASS_NAME,
        type_parameters.iter().map(CsType::named).collect(),
    );

    let mut members = vec![
        CsNode::FieldDecl {
            modifiers: modifiers(&["private", "readonly"]),
            ty: CsType::predefined("int"),
            name: INDEX_FIELD.to_string(),
        },
        CsNode::FieldDecl {
            modifiers: modifiers(&["private", "readonly"]),
            ty: CsType::predefined("object"),
            name: VALUE_FIELD.to_string(),
        },
        constructor(),
    ];

    for k in 1..=arity {
        members.push(from_factory(k, &self_type));
    }
    for k in 1..=arity {
        members.push(is_accessor(k));
        members.push(as_accessor(k));
    }

    CsNode::ClassDecl {
        modifiers: modifiers(&["public", "sealed"]),
        name: UNION_CLASS_NAME.to_string(),
        type_parameters,
        members,
    }
}

fn type_parameter(k: usize) -> String {
    format!("T{k}")
}

fn modifiers(list: &[&str]) -> Vec<String> {
    list.iter().map(|m| (*m).to_string()).collect()
}

fn index_literal(k: usize) -> CsNode {
    CsNode::number(k.to_string())
}

fn constructor() -> CsNode {
    CsNode::ConstructorDecl {
        modifiers: modifiers(&["private"]),
        name: UNION_CLASS_NAME.to_string(),
        parameters: vec![
            CsParam::new(CsType::predefined("int"), "index"),
            CsParam::new(CsType::predefined("object"), "value"),
        ],
        body: vec![
            CsNode::expr_stmt(CsNode::assign(CsNode::id(INDEX_FIELD), CsNode::id("index"))),
            CsNode::expr_stmt(CsNode::assign(CsNode::id(VALUE_FIELD), CsNode::id("value"))),
        ],
    }
}

/// `public static Union<..> FromK(TK value) { return new Union<..>(K, value); }`
fn from_factory(k: usize, self_type: &CsType) -> CsNode {
    CsNode::MethodDecl(CsMethod {
        modifiers: modifiers(&["public", "static"]),
        return_type: self_type.clone(),
        name: from_member(k),
        parameters: vec![CsParam::new(CsType::named(type_parameter(k)), "value")],
        body: vec![CsNode::ret(Some(CsNode::new_expr(
            self_type.clone(),
            vec![index_literal(k), CsNode::id("value")],
        )))],
    })
}

/// `public bool IsK() { return _index == K; }`
fn is_accessor(k: usize) -> CsNode {
    CsNode::MethodDecl(CsMethod {
        modifiers: modifiers(&["public"]),
        return_type: CsType::predefined("bool"),
        name: is_member(k),
        parameters: Vec::new(),
        body: vec![CsNode::ret(Some(CsNode::binary(
            CsNode::id(INDEX_FIELD),
            "==",
            index_literal(k),
        )))],
    })
}

/// `public TK AsK()`; throws when the union holds another member.
fn as_accessor(k: usize) -> CsNode {
    let message = format!("{UNION_CLASS_NAME} does not hold member {k}");
    let guard = CsNode::if_stmt(
        CsNode::binary(CsNode::id(INDEX_FIELD), "!=", index_literal(k)),
        CsNode::block(vec![CsNode::throw(CsNode::new_expr(
            CsType::named(MISMATCH_EXCEPTION),
            vec![CsNode::string(message)],
        ))]),
        None,
    );
    let type_param = CsType::named(type_parameter(k));
    CsNode::MethodDecl(CsMethod {
        modifiers: modifiers(&["public"]),
        return_type: type_param.clone(),
        name: as_member(k),
        parameters: Vec::new(),
        body: vec![
            guard,
            CsNode::ret(Some(CsNode::cast(type_param, CsNode::id(VALUE_FIELD)))),
        ],
    })
}

#[cfg(test)]
#[path = "../tests/runtime.rs"]
mod tests;
