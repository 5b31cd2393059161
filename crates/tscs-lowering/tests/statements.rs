use super::*;
use crate::bindings::NarrowedBinding;
use crate::local_names::register;
use crate::options::{LoweringEnv, LoweringOptions};
use tscs_emitter::CsPrinter;
use tscs_ir::{IrBindingTarget, IrParameter, IrType, VariableKind};

fn call(name: &str, args: Vec<IrExpression>) -> IrStatement {
    IrStatement::expr(IrExpression::call(IrExpression::ident(name), args))
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

fn lower_err(stmts: &[IrStatement]) -> LoweringError {
    lower_with(stmts, &EmitterContext::new(), &LoweringEnv::default()).unwrap_err()
}

// =========================================================================
// Declarations and names
// =========================================================================

#[test]
fn test_shadowing_declaration_is_renamed_and_scope_restored() {
    let stmts = vec![
        IrStatement::let_decl("x", None, Some(IrExpression::number("1"))),
        IrStatement::block(vec![
            IrStatement::let_decl("x", None, Some(IrExpression::number("2"))),
            call("use", vec![IrExpression::ident("x")]),
        ]),
        call("use", vec![IrExpression::ident("x")]),
    ];
    assert_eq!(
        lower_ok(&stmts),
        "var x = 1;\n{\n    var x_1 = 2;\n    use(x_1);\n}\nuse(x);"
    );
}

#[test]
fn test_sibling_blocks_never_reuse_a_name() {
    let stmts = vec![
        IrStatement::block(vec![IrStatement::let_decl("y", None, Some(IrExpression::number("1")))]),
        IrStatement::block(vec![IrStatement::let_decl("y", None, Some(IrExpression::number("2")))]),
    ];
    assert_eq!(lower_ok(&stmts), "{\n    var y = 1;\n}\n{\n    var y_1 = 2;\n}");
}

#[test]
fn test_declaration_types() {
    let optional = IrType::union([IrType::number(), IrType::undefined()]);
    let stmts = vec![
        IrStatement::let_decl("a", None, None),
        IrStatement::let_decl("b", None, Some(IrExpression::null())),
        IrStatement::let_decl("c", Some(IrType::number()), Some(IrExpression::number("1.5"))),
        IrStatement::let_decl("d", Some(optional), None),
        IrStatement::let_decl("e", None, Some(IrExpression::string("hi"))),
    ];
    assert_eq!(
        lower_ok(&stmts),
        "object a;\nobject b = null;\ndouble c = 1.5;\ndouble? d;\nvar e = \"hi\";"
    );
}

#[test]
fn test_reserved_word_declaration_is_escaped() {
    let stmts = vec![
        IrStatement::let_decl("event", None, Some(IrExpression::string("click"))),
        call("emit", vec![IrExpression::ident("event")]),
    ];
    assert_eq!(lower_ok(&stmts), "var @event = \"click\";\nemit(@event);");
}

#[test]
fn test_initializer_reads_outer_binding_before_redeclaration() {
    let ctx = register("pet", "pet", &EmitterContext::new())
        .with_binding("pet", NarrowedBinding::rename("pet__1_0", None));
    let stmts = vec![
        IrStatement::let_decl("pet", None, Some(IrExpression::ident("pet"))),
        call("feed", vec![IrExpression::ident("pet")]),
    ];
    let (text, next) = lower_with(&stmts, &ctx, &LoweringEnv::default()).unwrap();
    assert_eq!(text, "var pet_1 = pet__1_0;\nfeed(pet_1);");
    assert!(next.narrowed_binding("pet").is_none());
}

#[test]
fn test_destructuring_declaration_is_an_internal_error() {
    let stmt = IrStatement::VariableDeclaration(IrVariableDeclaration {
        kind: VariableKind::Const,
        declarations: vec![IrVariableDeclarator {
            target: IrBindingTarget::ObjectPattern {
                names: vec!["a".to_string()],
            },
            declared_type: None,
            initializer: Some(IrExpression::ident("obj")),
        }],
    });
    assert!(matches!(
        lower_err(&[stmt]),
        LoweringError::UnsupportedStatement {
            kind: "variableDeclaration",
            ..
        }
    ));
}

#[test]
fn test_assignment_drops_narrowing() {
    let ctx = EmitterContext::new().with_binding("pet", NarrowedBinding::rename("pet__1_0", None));
    let stmts = vec![
        call("feed", vec![IrExpression::ident("pet")]),
        IrStatement::expr(IrExpression::assign(IrExpression::ident("pet"), IrExpression::ident("stray"))),
        call("feed", vec![IrExpression::ident("pet")]),
    ];
    let (text, next) = lower_with(&stmts, &ctx, &LoweringEnv::default()).unwrap();
    assert_eq!(text, "feed(pet__1_0);\npet = stray;\nfeed(pet);");
    assert!(next.narrowed_binding("pet").is_none());
}

#[test]
fn test_assignment_inside_block_drops_narrowing_after_it() {
    let ctx = EmitterContext::new().with_binding("pet", NarrowedBinding::rename("pet__1_0", None));
    let stmts = vec![
        IrStatement::block(vec![IrStatement::expr(IrExpression::assign(
            IrExpression::ident("pet"),
            IrExpression::ident("stray"),
        ))]),
        call("feed", vec![IrExpression::ident("pet")]),
    ];
    let (text, _) = lower_with(&stmts, &ctx, &LoweringEnv::default()).unwrap();
    assert_eq!(text, "{\n    pet = stray;\n}\nfeed(pet);");
}

// =========================================================================
// Jumps
// =========================================================================

#[test]
fn test_labeled_jumps_are_internal_errors() {
    let labeled_break = IrStatement::Break {
        label: Some("outer".to_string()),
    };
    let labeled_continue = IrStatement::Continue {
        label: Some("outer".to_string()),
    };
    assert!(matches!(lower_err(&[labeled_break]), LoweringError::UnsupportedStatement { kind: "break", .. }));
    assert!(matches!(
        lower_err(&[labeled_continue]),
        LoweringError::UnsupportedStatement { kind: "continue", .. }
    ));
}

#[test]
fn test_empty_statement_lowers_to_nothing() {
    assert_eq!(lower_ok(&[IrStatement::Empty, IrStatement::ret(None)]), "return;");
}

// =========================================================================
// switch
// =========================================================================

fn case(test: Option<&str>, statements: Vec<IrStatement>) -> IrSwitchCase {
    IrSwitchCase {
        test: test.map(IrExpression::string),
        statements,
    }
}

#[test]
fn test_switch_appends_break_to_final_section() {
    let stmt = IrStatement::Switch {
        discriminant: IrExpression::ident("kind"),
        cases: vec![
            case(Some("a"), vec![call("f", vec![]), IrStatement::Break { label: None }]),
            case(None, vec![call("g", vec![])]),
        ],
    };
    assert_eq!(
        lower_ok(&[stmt]),
        "switch (kind)\n{\n    case \"a\":\n        f();\n        break;\n    default:\n        g();\n        break;\n}"
    );
}

#[test]
fn test_switch_grouped_labels_are_allowed() {
    let stmt = IrStatement::Switch {
        discriminant: IrExpression::ident("kind"),
        cases: vec![
            case(Some("a"), vec![]),
            case(Some("b"), vec![IrStatement::ret(None)]),
        ],
    };
    assert_eq!(
        lower_ok(&[stmt]),
        "switch (kind)\n{\n    case \"a\":\n    case \"b\":\n        return;\n}"
    );
}

#[test]
fn test_switch_fall_through_is_an_internal_error() {
    let stmt = IrStatement::Switch {
        discriminant: IrExpression::ident("kind"),
        cases: vec![
            case(Some("a"), vec![call("f", vec![])]),
            case(Some("b"), vec![IrStatement::Break { label: None }]),
        ],
    };
    assert_eq!(
        lower_err(&[stmt]),
        LoweringError::UnsupportedStatement {
            kind: "switch",
            reason: "section 1 falls through into the next one".to_string(),
        }
    );
}

#[test]
fn test_switch_sections_share_one_scope() {
    let stmt = IrStatement::Switch {
        discriminant: IrExpression::ident("kind"),
        cases: vec![
            case(
                Some("a"),
                vec![
                    IrStatement::let_decl("t", None, Some(IrExpression::number("1"))),
                    IrStatement::Break { label: None },
                ],
            ),
            case(
                Some("b"),
                vec![
                    IrStatement::let_decl("t", None, Some(IrExpression::number("2"))),
                    IrStatement::Break { label: None },
                ],
            ),
        ],
    };
    let text = lower_ok(&[stmt]);
    assert!(text.contains("var t = 1;"), "{text}");
    assert!(text.contains("var t_1 = 2;"), "{text}");
}

// =========================================================================
// try / catch / finally
// =========================================================================

#[test]
fn test_try_catch_finally() {
    let stmt = IrStatement::Try {
        block: vec![call("risky", vec![])],
        handler: Some(IrCatchClause {
            parameter: Some("e".to_string()),
            body: vec![call("log", vec![IrExpression::ident("e")])],
        }),
        finalizer: Some(vec![call("done", vec![])]),
    };
    assert_eq!(
        lower_ok(&[stmt]),
        "try\n{\n    risky();\n}\ncatch (global::System.Exception e)\n{\n    log(e);\n}\nfinally\n{\n    done();\n}"
    );
}

#[test]
fn test_catch_sees_no_narrowing_of_keys_assigned_in_try() {
    let ctx = EmitterContext::new().with_binding("pet", NarrowedBinding::rename("pet__1_0", None));
    let stmt = IrStatement::Try {
        block: vec![
            call("feed", vec![IrExpression::ident("pet")]),
            IrStatement::expr(IrExpression::assign(IrExpression::ident("pet"), IrExpression::ident("stray"))),
        ],
        handler: Some(IrCatchClause {
            parameter: None,
            body: vec![call("feed", vec![IrExpression::ident("pet")])],
        }),
        finalizer: None,
    };
    let (text, _) = lower_with(&[stmt], &ctx, &LoweringEnv::default()).unwrap();
    assert_eq!(
        text,
        "try\n{\n    feed(pet__1_0);\n    pet = stray;\n}\ncatch (global::System.Exception)\n{\n    feed(pet);\n}"
    );
}

#[test]
fn test_catch_parameter_type_follows_options() {
    let env = LoweringEnv::default().with_options(LoweringOptions {
        exception_type_name: "AppError".to_string(),
        ..LoweringOptions::default()
    });
    let stmt = IrStatement::Try {
        block: vec![],
        handler: Some(IrCatchClause {
            parameter: Some("err".to_string()),
            body: vec![],
        }),
        finalizer: None,
    };
    let (text, _) = lower_with(&[stmt], &EmitterContext::new(), &env).unwrap();
    assert!(text.contains("catch (AppError err)"), "{text}");
}

// =========================================================================
// Local functions
// =========================================================================

#[test]
fn test_local_function_declares_method_and_drops_narrowing() {
    let ctx = EmitterContext::new().with_binding("pet", NarrowedBinding::rename("pet__1_0", None));
    let stmt = IrStatement::FunctionDeclaration(IrFunction {
        name: "helper".to_string(),
        parameters: vec![IrParameter::new("n", IrType::number())],
        return_type: Some(IrType::number()),
        body: vec![
            call("feed", vec![IrExpression::ident("pet")]),
            IrStatement::ret(Some(IrExpression::ident("n"))),
        ],
        is_async: false,
        is_static: false,
    });
    let (text, next) = lower_with(&[stmt], &ctx, &LoweringEnv::default()).unwrap();
    assert_eq!(text, "double helper(double n)\n{\n    feed(pet);\n    return n;\n}");
    // The enclosing code keeps its narrowing.
    assert!(next.narrowed_binding("pet").is_some());
    assert_eq!(next.local_name("helper"), Some("helper"));
}

#[test]
fn test_async_local_function_allows_await() {
    let stmt = IrStatement::FunctionDeclaration(IrFunction {
        name: "load".to_string(),
        parameters: vec![],
        return_type: None,
        body: vec![IrStatement::expr(IrExpression::await_expr(IrExpression::call(
            IrExpression::ident("fetch"),
            vec![],
        )))],
        is_async: true,
        is_static: false,
    });
    assert_eq!(
        lower_ok(&[stmt]),
        "async global::System.Threading.Tasks.Task load()\n{\n    await fetch();\n}"
    );
}

// =========================================================================
// Depth limit
// =========================================================================

#[test]
fn test_nesting_past_the_limit_fails() {
    let mut stmt = call("leaf", vec![]);
    for _ in 0..8 {
        stmt = IrStatement::block(vec![stmt]);
    }
    let env = LoweringEnv::default().with_options(LoweringOptions {
        max_depth: 4,
        ..LoweringOptions::default()
    });
    let err = lower_with(&[stmt.clone()], &EmitterContext::new(), &env).unwrap_err();
    assert_eq!(err, LoweringError::DepthLimitExceeded { depth: 4 });

    assert!(lower_with(&[stmt], &EmitterContext::new(), &LoweringEnv::default()).is_ok());
}
