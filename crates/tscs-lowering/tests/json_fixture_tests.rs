//! Lower IR fixtures in the JSON shape the checker hands over.

use tscs_emitter::CsPrinter;
use tscs_ir::{IrModule, ModuleMemberIndex};
use tscs_lowering::{LoweringEnv, LoweringOptions, lower_module};

const SHAPES_MODULE: &str = include_str!("fixtures/shapes_module.json");
const SHAPES_MEMBERS: &str = include_str!("fixtures/shapes_members.json");

fn shapes_env(options: LoweringOptions) -> LoweringEnv {
    let members: ModuleMemberIndex = serde_json::from_str(SHAPES_MEMBERS).expect("member index fixture");
    LoweringEnv::new(members).with_options(options)
}

fn lower_shapes(options: LoweringOptions) -> String {
    let module: IrModule = serde_json::from_str(SHAPES_MODULE).expect("module fixture");
    let class = lower_module(&module, &shapes_env(options)).expect("lowering succeeds");
    CsPrinter::emit_to_string(&class)
}

#[test]
fn test_shapes_fixture_lowers_discriminant_with_early_return() {
    let expected = "\
public static class Shapes
{
    public static double area(global::Tscs.Runtime.Union<Circle, Square> shape)
    {
        if (shape.Is1())
        {
            var shape__1_0 = shape.As1();
            return shape__1_0.radius * shape__1_0.radius;
        }
        return shape.As2().side * shape.As2().side;
    }
}";
    assert_eq!(lower_shapes(LoweringOptions::default()), expected);
}

#[test]
fn test_options_from_json_rename_union_type() {
    let options = LoweringOptions::from_json(r#"{ "unionTypeName": "Union" }"#).unwrap();
    let text = lower_shapes(options);
    assert!(text.contains("area(Union<Circle, Square> shape)"), "{text}");
    // Everything else keeps its default.
    assert!(text.contains("var shape__1_0 = shape.As1();"), "{text}");
}

#[test]
fn test_options_depth_limit_applies_to_fixture() {
    let options = LoweringOptions::from_json(r#"{ "maxDepth": 2 }"#).unwrap();
    let module: IrModule = serde_json::from_str(SHAPES_MODULE).unwrap();
    let err = lower_module(&module, &shapes_env(options)).unwrap_err();
    assert_eq!(err.to_string(), "internal compiler error: lowering nested deeper than 2 levels");
}

#[test]
fn test_member_index_fixture_round_trips() {
    let members: ModuleMemberIndex = serde_json::from_str(SHAPES_MEMBERS).unwrap();
    let json = serde_json::to_string(&members).unwrap();
    let again: ModuleMemberIndex = serde_json::from_str(&json).unwrap();
    assert_eq!(members, again);
    assert_eq!(members.local.len(), 2);
    assert!(members.external.is_empty());
}
