use super::*;
use crate::bindings::NarrowedBinding;
use crate::options::{LoweringEnv, LoweringOptions};
use tscs_emitter::CsPrinter;
use tscs_ir::{BinaryOperator, IrType, IrVariableDeclaration, UpdateOperator, VariableKind};

fn call(name: &str, args: Vec<IrExpression>) -> IrStatement {
    IrStatement::expr(IrExpression::call(IrExpression::ident(name), args))
}

fn counter() -> IrExpression {
    IrExpression::ident("i").typed(IrType::number())
}

fn declare_counter(init: &str) -> IrForInitializer {
    IrForInitializer::Declaration(IrVariableDeclaration {
        kind: VariableKind::Let,
        declarations: vec![IrVariableDeclarator {
            target: IrBindingTarget::ident("i"),
            declared_type: None,
            initializer: Some(IrExpression::number(init)),
        }],
    })
}

fn counting_for(init: &str, update: IrExpression) -> IrStatement {
    let element = IrExpression::new(IrExpressionKind::ElementAccess {
        object: Box::new(IrExpression::ident("items")),
        index: Box::new(counter()),
    });
    IrStatement::For {
        initializer: Some(declare_counter(init)),
        condition: Some(IrExpression::binary(BinaryOperator::LessThan, counter(), IrExpression::ident("n"))),
        update: Some(update),
        body: Box::new(IrStatement::block(vec![call("use", vec![element])])),
    }
}

fn increment() -> IrExpression {
    IrExpression::update(UpdateOperator::Increment, false, counter())
}

fn add_assign(step: &str) -> IrExpression {
    IrExpression::new(IrExpressionKind::Assignment {
        operator: AssignmentOperator::AddAssign,
        target: Box::new(counter()),
        value: Box::new(IrExpression::number(step)),
    })
}

fn lower_with(stmts: &[IrStatement], ctx: &EmitterContext, env: &LoweringEnv) -> LoweringResult<(String, EmitterContext)> {
    let (nodes, next) = Lowerer::new(env).lower_statements(stmts, ctx)?;
    Ok((CsPrinter::emit_all_to_string(&nodes), next))
}

fn lower_ok(stmts: &[IrStatement]) -> String {
    lower_with(stmts, &EmitterContext::new(), &LoweringEnv::default())
        .unwrap()
        .0
}

// =========================================================================
// for
// =========================================================================

#[test]
fn test_integer_counter_is_declared_int() {
    assert_eq!(
        lower_ok(&[counting_for("0", increment())]),
        "for (int i = 0; i < n; i++)\n{\n    use(items[i]);\n}"
    );
}

#[test]
fn test_integer_step_keeps_int_counter() {
    assert_eq!(
        lower_ok(&[counting_for("0", add_assign("2"))]),
        "for (int i = 0; i < n; i += 2)\n{\n    use(items[i]);\n}"
    );
}

#[test]
fn test_fractional_step_is_not_an_int_counter() {
    assert_eq!(
        lower_ok(&[counting_for("0", add_assign("0.5"))]),
        "for (var i = 0; i < n; i += 0.5)\n{\n    use(items[(int)i]);\n}"
    );
}

#[test]
fn test_fractional_start_is_not_an_int_counter() {
    let text = lower_ok(&[counting_for("1.5", increment())]);
    assert!(text.starts_with("for (var i = 1.5;"), "{text}");
}

#[test]
fn test_int_counters_can_be_disabled() {
    let env = LoweringEnv::default().with_options(LoweringOptions {
        int_loop_vars: false,
        ..LoweringOptions::default()
    });
    let (text, _) = lower_with(&[counting_for("0", increment())], &EmitterContext::new(), &env).unwrap();
    assert!(text.starts_with("for (var i = 0;"), "{text}");
}

#[test]
fn test_for_without_clauses() {
    let stmt = IrStatement::For {
        initializer: None,
        condition: None,
        update: None,
        body: Box::new(IrStatement::block(vec![IrStatement::Break { label: None }])),
    };
    assert_eq!(lower_ok(&[stmt]), "for (;;)\n{\n    break;\n}");
}

#[test]
fn test_expression_initializer() {
    let stmt = IrStatement::For {
        initializer: Some(IrForInitializer::Expression {
            expression: IrExpression::assign(IrExpression::ident("i"), IrExpression::number("0")),
        }),
        condition: None,
        update: None,
        body: Box::new(IrStatement::block(vec![])),
    };
    assert_eq!(lower_ok(&[stmt]), "for (i = 0;;)\n{\n}");
}

#[test]
fn test_for_with_several_declarators_is_an_internal_error() {
    let declarator = |name: &str| IrVariableDeclarator {
        target: IrBindingTarget::ident(name),
        declared_type: None,
        initializer: Some(IrExpression::number("0")),
    };
    let stmt = IrStatement::For {
        initializer: Some(IrForInitializer::Declaration(IrVariableDeclaration {
            kind: VariableKind::Let,
            declarations: vec![declarator("i"), declarator("j")],
        })),
        condition: None,
        update: None,
        body: Box::new(IrStatement::block(vec![])),
    };
    let err = lower_with(&[stmt], &EmitterContext::new(), &LoweringEnv::default()).unwrap_err();
    assert_eq!(
        err,
        LoweringError::UnsupportedStatement {
            kind: "for",
            reason: "`for` initializer declares 2 variables".to_string(),
        }
    );
}

#[test]
fn test_counter_name_stays_reserved_after_the_loop() {
    let stmts = vec![
        counting_for("0", increment()),
        IrStatement::let_decl("i", None, Some(IrExpression::string("done"))),
    ];
    let text = lower_ok(&stmts);
    assert!(text.ends_with("var i_1 = \"done\";"), "{text}");
}

// =========================================================================
// for...of / for...in
// =========================================================================

#[test]
fn test_for_of_is_foreach() {
    let stmt = IrStatement::ForOf {
        target: IrBindingTarget::ident("item"),
        expression: IrExpression::ident("items"),
        body: Box::new(IrStatement::block(vec![call("use", vec![IrExpression::ident("item")])])),
        is_await: false,
    };
    assert_eq!(lower_ok(&[stmt]), "foreach (var item in items)\n{\n    use(item);\n}");
}

#[test]
fn test_for_in_iterates_keys() {
    let stmt = IrStatement::ForIn {
        target: IrBindingTarget::ident("key"),
        expression: IrExpression::ident("dict"),
        body: Box::new(IrStatement::block(vec![call("use", vec![IrExpression::ident("key")])])),
    };
    assert_eq!(lower_ok(&[stmt]), "foreach (var key in dict.Keys)\n{\n    use(key);\n}");
}

#[test]
fn test_for_await_requires_async_context() {
    let stmt = IrStatement::ForOf {
        target: IrBindingTarget::ident("chunk"),
        expression: IrExpression::ident("stream"),
        body: Box::new(IrStatement::block(vec![])),
        is_await: true,
    };
    let err = lower_with(&[stmt.clone()], &EmitterContext::new(), &LoweringEnv::default()).unwrap_err();
    assert_eq!(err, LoweringError::AwaitOutsideAsync);

    let ctx = EmitterContext::new().for_function(true, true, None);
    let (text, _) = lower_with(&[stmt], &ctx, &LoweringEnv::default()).unwrap();
    assert_eq!(text, "await foreach (var chunk in stream)\n{\n}");
}

#[test]
fn test_destructuring_loop_variable_is_an_internal_error() {
    let stmt = IrStatement::ForOf {
        target: IrBindingTarget::ArrayPattern {
            names: vec!["k".to_string(), "v".to_string()],
        },
        expression: IrExpression::ident("entries"),
        body: Box::new(IrStatement::block(vec![])),
        is_await: false,
    };
    let err = lower_with(&[stmt], &EmitterContext::new(), &LoweringEnv::default()).unwrap_err();
    assert!(matches!(err, LoweringError::UnsupportedStatement { kind: "forOf", .. }));
}

#[test]
fn test_loop_variable_shadows_outer_binding() {
    let ctx = EmitterContext::new().with_binding("pet", NarrowedBinding::rename("pet__1_0", None));
    let stmt = IrStatement::ForOf {
        target: IrBindingTarget::ident("pet"),
        expression: IrExpression::ident("pets"),
        body: Box::new(IrStatement::block(vec![call("feed", vec![IrExpression::ident("pet")])])),
        is_await: false,
    };
    let (text, next) = lower_with(&[stmt], &ctx, &LoweringEnv::default()).unwrap();
    assert_eq!(text, "foreach (var pet in pets)\n{\n    feed(pet);\n}");
    // Outside the loop the narrowing is back in force.
    assert!(next.narrowed_binding("pet").is_some());
}

// =========================================================================
// while / do...while
// =========================================================================

#[test]
fn test_loop_drops_narrowing_of_what_it_assigns() {
    let ctx = EmitterContext::new().with_binding("pet", NarrowedBinding::rename("pet__1_0", None));
    let stmt = IrStatement::While {
        condition: IrExpression::ident("hungry"),
        body: Box::new(IrStatement::block(vec![
            call("feed", vec![IrExpression::ident("pet")]),
            IrStatement::expr(IrExpression::assign(
                IrExpression::ident("pet"),
                IrExpression::call(IrExpression::ident("next"), vec![]),
            )),
        ])),
    };
    let (text, next) = lower_with(&[stmt], &ctx, &LoweringEnv::default()).unwrap();
    assert_eq!(text, "while (hungry)\n{\n    feed(pet);\n    pet = next();\n}");
    assert!(next.narrowed_binding("pet").is_none());
}

#[test]
fn test_loop_keeps_narrowing_it_does_not_touch() {
    let ctx = EmitterContext::new().with_binding("pet", NarrowedBinding::rename("pet__1_0", None));
    let stmt = IrStatement::While {
        condition: IrExpression::ident("hungry"),
        body: Box::new(IrStatement::block(vec![call("feed", vec![IrExpression::ident("pet")])])),
    };
    let (text, _) = lower_with(&[stmt], &ctx, &LoweringEnv::default()).unwrap();
    assert_eq!(text, "while (hungry)\n{\n    feed(pet__1_0);\n}");
}

#[test]
fn test_do_while() {
    let stmt = IrStatement::DoWhile {
        body: Box::new(IrStatement::block(vec![call("step", vec![])])),
        condition: IrExpression::call(IrExpression::ident("more"), vec![]),
    };
    assert_eq!(lower_ok(&[stmt]), "do\n{\n    step();\n}\nwhile (more());");
}
