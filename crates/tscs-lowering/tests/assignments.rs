use super::*;
use tscs_ir::{UpdateOperator, IrType};

#[test]
fn test_collects_assignment_and_update_targets() {
    let stmt = IrStatement::block(vec![
        IrStatement::expr(IrExpression::assign(IrExpression::ident("x"), IrExpression::number("1"))),
        IrStatement::expr(IrExpression::update(
            UpdateOperator::Increment,
            false,
            IrExpression::ident("i"),
        )),
        IrStatement::expr(IrExpression::assign(
            IrExpression::member(IrExpression::ident("a"), "b"),
            IrExpression::null(),
        )),
    ]);
    let assigned = assigned_in_statement(&stmt);
    assert!(assigned.contains("x"));
    assert!(assigned.contains("i"));
    assert!(assigned.contains("a.b"));
    assert!(!assigned.contains("a"));
}

#[test]
fn test_reads_are_not_assignments() {
    let expr = IrExpression::call(
        IrExpression::ident("use"),
        vec![IrExpression::ident("x").typed(IrType::number())],
    );
    assert!(assigned_in_expression(&expr).is_empty());
}

#[test]
fn test_scans_nested_branches_and_declaration_initializers() {
    let stmt = IrStatement::if_else(
        IrExpression::ident("c"),
        IrStatement::let_decl(
            "y",
            None,
            Some(IrExpression::assign(IrExpression::ident("z"), IrExpression::number("2"))),
        ),
        IrStatement::block(vec![IrStatement::expr(IrExpression::assign(
            IrExpression::ident("w"),
            IrExpression::number("3"),
        ))]),
    );
    let assigned = assigned_in_statement(&stmt);
    assert!(assigned.contains("z"));
    assert!(assigned.contains("w"));
    // Declaring is not reassigning.
    assert!(!assigned.contains("y"));
}
