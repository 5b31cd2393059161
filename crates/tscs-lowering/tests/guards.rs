use super::*;
use crate::error::LoweringError;
use tscs_emitter::CsPrinter;
use tscs_ir::{BinaryOperator, MemberIndex, ModuleMemberIndex};

fn pets() -> IrType {
    IrType::union([IrType::class("Cat"), IrType::class("Dog")])
}

fn pet() -> IrExpression {
    IrExpression::ident("pet").typed(pets())
}

fn pet_members() -> MemberIndex {
    MemberIndex::new()
        .with_type(
            "Cat",
            [("meow", IrType::boolean()), ("name", IrType::string()), ("kind", IrType::string_literal("cat"))],
        )
        .with_type(
            "Dog",
            [("bark", IrType::boolean()), ("name", IrType::string()), ("kind", IrType::string_literal("dog"))],
        )
}

fn env() -> LoweringEnv {
    LoweringEnv::new(ModuleMemberIndex::new(pet_members()))
}

fn is_cat(subject: IrExpression) -> IrExpression {
    IrExpression::predicate_call(IrExpression::ident("isCat"), vec![subject], 0, IrType::class("Cat"))
}

fn resolve(condition: &IrExpression, env: &LoweringEnv) -> Option<GuardInfo> {
    resolve_guard(condition, &EmitterContext::new(), env).unwrap()
}

fn condition_text(guard: &GuardInfo) -> String {
    CsPrinter::emit_to_string(&guard.condition())
}

fn read_text(narrowing: &Narrowing) -> String {
    CsPrinter::emit_to_string(&narrowing.inline_binding().read())
}

// =========================================================================
// Type predicates
// =========================================================================

#[test]
fn test_predicate_call_selects_target_member() {
    let env = env();
    let guard = resolve(&is_cat(pet()), &env).expect("predicate guard");

    assert_eq!(guard.kind_name(), "predicate");
    assert_eq!(guard.key(), "pet");
    assert!(!guard.is_negated());
    assert_eq!(condition_text(&guard), "pet.Is1()");
    // The temporary id is consumed by the guard.
    assert_eq!(guard.ctx().temp_var_id(), 1);
    assert_eq!(guard.binding(), &NarrowedBinding::rename("pet__1_0", Some(IrType::class("Cat"))));
}

#[test]
fn test_predicate_primary_reserves_temp_and_complement_does_not() {
    let env = env();
    let guard = resolve(&is_cat(pet()), &env).unwrap();

    match guard.narrowing_for(Branch::Then) {
        Some(Narrowing::Member { member_n, temp, .. }) => {
            assert_eq!(member_n, 1);
            assert_eq!(temp.as_deref(), Some("pet__1_0"));
        }
        other => panic!("expected member narrowing, got {other:?}"),
    }
    match guard.narrowing_for(Branch::Else) {
        Some(Narrowing::Member { member_n, temp, .. }) => {
            assert_eq!(member_n, 2);
            assert!(temp.is_none());
        }
        other => panic!("expected complement narrowing, got {other:?}"),
    }
}

#[test]
fn test_predicate_target_outside_union_declines() {
    let env = env();
    let call = IrExpression::predicate_call(IrExpression::ident("isBird"), vec![pet()], 0, IrType::class("Bird"));
    assert!(resolve(&call, &env).is_none());
}

#[test]
fn test_predicate_argument_index_out_of_range_declines() {
    let env = env();
    let call = IrExpression::predicate_call(IrExpression::ident("isCat"), vec![pet()], 3, IrType::class("Cat"));
    assert!(resolve(&call, &env).is_none());
}

#[test]
fn test_predicate_on_member_access_declines() {
    let env = env();
    let subject = IrExpression::member(IrExpression::ident("owner"), "pet").typed(pets());
    assert!(resolve(&is_cat(subject), &env).is_none());
}

#[test]
fn test_optional_union_declines() {
    let env = env();
    let optional = IrType::union([IrType::class("Cat"), IrType::class("Dog"), IrType::undefined()]);
    let subject = IrExpression::ident("pet").typed(optional);
    assert!(resolve(&is_cat(subject), &env).is_none());
}

#[test]
fn test_untyped_subject_declines() {
    let env = env();
    assert!(resolve(&is_cat(IrExpression::ident("pet")), &env).is_none());
}

#[test]
fn test_subject_reads_through_enclosing_binding() {
    let env = env();
    let ctx = EmitterContext::new().with_binding("pet", NarrowedBinding::rename("pet__9", Some(pets())));
    let guard = resolve_guard(&is_cat(pet()), &ctx, &env).unwrap().unwrap();
    assert_eq!(condition_text(&guard), "pet__9.Is1()");
}

#[test]
fn test_subject_already_narrowed_to_member_declines() {
    let env = env();
    let ctx = EmitterContext::new().with_binding("pet", NarrowedBinding::rename("pet__1_0", Some(IrType::class("Cat"))));
    assert!(resolve_guard(&is_cat(pet()), &ctx, &env).unwrap().is_none());

    let in_check = IrExpression::binary(BinaryOperator::In, IrExpression::string("meow"), pet());
    assert!(resolve_guard(&in_check, &ctx, &env).unwrap().is_none());
}

// =========================================================================
// `in` checks
// =========================================================================

#[test]
fn test_in_selects_the_only_declaring_member() {
    let env = env();
    let condition = IrExpression::binary(BinaryOperator::In, IrExpression::string("bark"), pet());
    let guard = resolve(&condition, &env).expect("in guard");

    assert_eq!(guard.kind_name(), "in");
    assert_eq!(condition_text(&guard), "pet.Is2()");
    let else_narrowing = guard.narrowing_for(Branch::Else).unwrap();
    assert_eq!(read_text(&else_narrowing), "pet.As1()");
}

#[test]
fn test_in_with_several_hosts_declines() {
    let env = env();
    let condition = IrExpression::binary(BinaryOperator::In, IrExpression::string("name"), pet());
    assert!(resolve(&condition, &env).is_none());
}

#[test]
fn test_in_with_no_host_declines() {
    let env = env();
    let condition = IrExpression::binary(BinaryOperator::In, IrExpression::string("fly"), pet());
    assert!(resolve(&condition, &env).is_none());
}

#[test]
fn test_in_resolves_hosts_from_imported_module() {
    let env = LoweringEnv::new(ModuleMemberIndex::new(MemberIndex::new()).with_external("pets", pet_members()));
    let condition = IrExpression::binary(BinaryOperator::In, IrExpression::string("meow"), pet());
    let guard = resolve(&condition, &env).expect("in guard");
    assert_eq!(condition_text(&guard), "pet.Is1()");
}

#[test]
fn test_in_with_ambiguous_host_is_an_error() {
    let env = LoweringEnv::new(
        ModuleMemberIndex::new(MemberIndex::new())
            .with_external("a", pet_members())
            .with_external("b", pet_members()),
    );
    let condition = IrExpression::binary(BinaryOperator::In, IrExpression::string("meow"), pet());

    let err = resolve_guard(&condition, &EmitterContext::new(), &env).unwrap_err();
    assert_eq!(
        err,
        LoweringError::AmbiguousMemberHost {
            type_name: "Cat".to_string(),
            modules: vec!["a".to_string(), "b".to_string()],
        }
    );
    assert!(!err.is_internal());
}

// =========================================================================
// Discriminants
// =========================================================================

fn shapes() -> IrType {
    IrType::union([IrType::interface("Circle"), IrType::interface("Square")])
}

fn shape_env(circle_kind: IrType) -> LoweringEnv {
    LoweringEnv::new(ModuleMemberIndex::new(
        MemberIndex::new()
            .with_type("Circle", [("kind", circle_kind), ("radius", IrType::number())])
            .with_type("Square", [("kind", IrType::string_literal("square")), ("side", IrType::number())]),
    ))
}

fn kind_check(operator: BinaryOperator, literal: &str) -> IrExpression {
    let shape = IrExpression::ident("shape").typed(shapes());
    IrExpression::binary(operator, IrExpression::member(shape, "kind"), IrExpression::string(literal))
}

#[test]
fn test_exact_discriminant_tests_membership_only() {
    let env = shape_env(IrType::string_literal("circle"));
    let guard = resolve(&kind_check(BinaryOperator::StrictEquals, "circle"), &env).expect("discriminant");

    assert_eq!(guard.kind_name(), "discriminant");
    assert_eq!(guard.key(), "shape");
    assert_eq!(condition_text(&guard), "shape.Is1()");
    assert!(guard.narrowing_for(Branch::Else).is_some());
}

#[test]
fn test_negated_discriminant_flips_polarity() {
    let env = shape_env(IrType::string_literal("circle"));
    let guard = resolve(&kind_check(BinaryOperator::StrictNotEquals, "square"), &env).unwrap();

    assert!(guard.is_negated());
    assert_eq!(condition_text(&guard), "!shape.Is2()");
    let then_narrowing = guard.narrowing_for(Branch::Then).unwrap();
    assert_eq!(read_text(&then_narrowing), "shape.As1()");
    let fall_through = guard.narrowing_for(Branch::FallThrough).unwrap();
    assert_eq!(read_text(&fall_through), "shape.As2()");
}

#[test]
fn test_literal_on_the_left_is_recognized() {
    let env = shape_env(IrType::string_literal("circle"));
    let shape = IrExpression::ident("shape").typed(shapes());
    let condition = IrExpression::binary(
        BinaryOperator::LooseEquals,
        IrExpression::string("square"),
        IrExpression::member(shape, "kind"),
    );
    let guard = resolve(&condition, &env).unwrap();
    assert_eq!(condition_text(&guard), "shape.Is2()");
}

#[test]
fn test_inexact_discriminant_also_compares_property() {
    let env = shape_env(IrType::union([IrType::string_literal("circle"), IrType::string_literal("round")]));
    let guard = resolve(&kind_check(BinaryOperator::StrictEquals, "round"), &env).unwrap();

    assert_eq!(condition_text(&guard), "shape.Is1() && shape.As1().kind == \"round\"");
    assert!(guard.narrowing_for(Branch::Else).is_none());
    assert!(guard.narrowing_for(Branch::Then).is_some());
}

#[test]
fn test_non_literal_discriminant_declines() {
    let env = shape_env(IrType::string());
    assert!(resolve(&kind_check(BinaryOperator::StrictEquals, "square"), &env).is_none());
}

#[test]
fn test_unknown_literal_declines() {
    let env = shape_env(IrType::string_literal("circle"));
    assert!(resolve(&kind_check(BinaryOperator::StrictEquals, "triangle"), &env).is_none());
}

// =========================================================================
// instanceof
// =========================================================================

#[test]
fn test_instanceof_captures_pattern_variable() {
    let env = LoweringEnv::default();
    let condition = IrExpression::binary(
        BinaryOperator::Instanceof,
        IrExpression::ident("err"),
        IrExpression::ident("HttpError"),
    );
    let guard = resolve(&condition, &env).expect("instanceof guard");

    assert_eq!(guard.kind_name(), "instanceof");
    assert_eq!(condition_text(&guard), "err is HttpError err__is_0");
    assert_eq!(
        CsPrinter::emit_to_string(&guard.expression_condition()),
        "err is HttpError"
    );
    assert!(guard.ctx().is_name_used("err__is_0"));
    assert!(guard.narrowing_for(Branch::Else).is_none());
}

#[test]
fn test_instanceof_pattern_binding_in_expressions_is_a_cast() {
    let env = LoweringEnv::default();
    let condition = IrExpression::binary(
        BinaryOperator::Instanceof,
        IrExpression::ident("err"),
        IrExpression::ident("HttpError"),
    );
    let guard = resolve(&condition, &env).unwrap();
    let narrowing = guard.narrowing_for(Branch::Then).unwrap();

    assert_eq!(read_text(&narrowing), "err__is_0");
    assert_eq!(
        CsPrinter::emit_to_string(&narrowing.expression_binding().read()),
        "((HttpError)err)"
    );
}

#[test]
fn test_instanceof_on_member_access_declines() {
    let env = LoweringEnv::default();
    let condition = IrExpression::binary(
        BinaryOperator::Instanceof,
        IrExpression::member(IrExpression::ident("res"), "error"),
        IrExpression::ident("HttpError"),
    );
    assert!(resolve(&condition, &env).is_none());
}

// =========================================================================
// Nullable comparisons
// =========================================================================

fn optional_number() -> IrType {
    IrType::union([IrType::number(), IrType::undefined()])
}

#[test]
fn test_strict_undefined_check_unwraps_value() {
    let env = LoweringEnv::default();
    let id = IrExpression::ident("id").typed(optional_number());
    let condition = IrExpression::binary(BinaryOperator::StrictNotEquals, id, IrExpression::undefined());
    let guard = resolve(&condition, &env).expect("nullable guard");

    assert_eq!(guard.kind_name(), "nullable");
    assert!(!guard.is_negated());
    assert_eq!(condition_text(&guard), "id != null");
    let narrowing = guard.narrowing_for(Branch::Then).unwrap();
    assert_eq!(read_text(&narrowing), "id.Value");
    // Nothing is declared, so no temporary is consumed.
    assert_eq!(guard.ctx().temp_var_id(), 0);
}

#[test]
fn test_equality_with_null_is_negated() {
    let env = LoweringEnv::default();
    let id = IrExpression::ident("id").typed(IrType::union([IrType::number(), IrType::null()]));
    let condition = IrExpression::binary(BinaryOperator::LooseEquals, IrExpression::null(), id);
    let guard = resolve(&condition, &env).unwrap();

    assert!(guard.is_negated());
    assert_eq!(condition_text(&guard), "id == null");
    assert!(guard.narrowing_for(Branch::Then).is_none());
    assert!(guard.narrowing_for(Branch::FallThrough).is_some());
}

#[test]
fn test_loose_check_excludes_both_nullish_kinds() {
    let env = LoweringEnv::default();
    let ty = IrType::union([IrType::number(), IrType::null(), IrType::undefined()]);
    let loose = IrExpression::binary(
        BinaryOperator::LooseNotEquals,
        IrExpression::ident("id").typed(ty.clone()),
        IrExpression::null(),
    );
    assert!(resolve(&loose, &env).is_some());

    let strict = IrExpression::binary(
        BinaryOperator::StrictNotEquals,
        IrExpression::ident("id").typed(ty),
        IrExpression::null(),
    );
    assert!(resolve(&strict, &env).is_none());
}

#[test]
fn test_optional_reference_type_needs_no_unwrap() {
    let env = LoweringEnv::default();
    let name = IrExpression::ident("name").typed(IrType::union([IrType::string(), IrType::undefined()]));
    let condition = IrExpression::binary(BinaryOperator::StrictNotEquals, name, IrExpression::undefined());
    assert!(resolve(&condition, &env).is_none());
}

#[test]
fn test_member_path_is_the_key() {
    let env = LoweringEnv::default();
    let limit = IrExpression::member(IrExpression::ident("opts"), "limit").typed(optional_number());
    let condition = IrExpression::binary(BinaryOperator::StrictNotEquals, limit, IrExpression::undefined());
    let guard = resolve(&condition, &env).unwrap();

    assert_eq!(guard.key(), "opts.limit");
    assert_eq!(read_text(&guard.narrowing_for(Branch::Then).unwrap()), "opts.limit.Value");
}

// =========================================================================
// Negation
// =========================================================================

#[test]
fn test_not_peels_and_flips_polarity() {
    let env = env();
    let guard = resolve(&IrExpression::not(is_cat(pet())), &env).unwrap();
    assert!(guard.is_negated());
    assert_eq!(condition_text(&guard), "!pet.Is1()");

    let twice = resolve(&IrExpression::not(IrExpression::not(is_cat(pet()))), &env).unwrap();
    assert!(!twice.is_negated());
}

#[test]
fn test_wide_union_has_no_complement() {
    let env = env();
    let three = IrType::union([IrType::class("Cat"), IrType::class("Dog"), IrType::class("Bird")]);
    let guard = resolve(&is_cat(IrExpression::ident("pet").typed(three)), &env).unwrap();

    assert!(guard.narrowing_for(Branch::Then).is_some());
    assert!(guard.narrowing_for(Branch::Else).is_none());
    assert!(guard.narrowing_for(Branch::FallThrough).is_none());
}

#[test]
fn test_plain_comparison_is_not_a_guard() {
    let env = env();
    let condition = IrExpression::binary(
        BinaryOperator::LessThan,
        IrExpression::ident("count").typed(IrType::number()),
        IrExpression::number("10"),
    );
    assert!(resolve(&condition, &env).is_none());
}
