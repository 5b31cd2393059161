//! The generated runtime must expose exactly the accessor names lowered code calls.

use tscs_common::naming::{as_member, from_member, is_member};
use tscs_emitter::{emit_union_runtime, union_runtime_declarations, CsNode, CsPrinter};

#[test]
fn runtime_exposes_accessor_contract_for_all_arities() {
    for decl in union_runtime_declarations() {
        let CsNode::ClassDecl { type_parameters, .. } = &decl else {
            panic!("runtime must only contain classes");
        };
        let text = CsPrinter::emit_to_string(&decl);
        let arity = type_parameters.len();
        for k in 1..=arity {
            assert!(text.contains(&format!("public bool {}()", is_member(k))));
            assert!(text.contains(&format!("public T{k} {}()", as_member(k))));
            assert!(text.contains(&format!("{}(T{k} value)", from_member(k))));
        }
        assert!(!text.contains(&format!("{}()", is_member(arity + 1))));
    }
}

#[test]
fn runtime_source_is_deterministic() {
    assert_eq!(emit_union_runtime(), emit_union_runtime());
}

#[test]
fn mismatched_accessor_throws() {
    let text = emit_union_runtime();
    let throws = text.matches("throw new global::System.InvalidOperationException").count();
    // One throwing accessor per member across arities 2..=8.
    assert_eq!(throws, (2..=8).sum::<usize>());
}
