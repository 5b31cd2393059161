use super::*;

fn method_names(class: &CsNode) -> Vec<String> {
    let CsNode::ClassDecl { members, .. } = class else {
        panic!("expected a class declaration, got {class:?}");
    };
    members
        .iter()
        .filter_map(|member| match member {
            CsNode::MethodDecl(method) => Some(method.name.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_declarations_cover_every_supported_arity() {
    let decls = union_runtime_declarations();
    assert_eq!(decls.len(), MAX_UNION_ARITY - MIN_UNION_ARITY + 1);

    for (decl, arity) in decls.iter().zip(MIN_UNION_ARITY..=MAX_UNION_ARITY) {
        let CsNode::ClassDecl {
            name,
            type_parameters,
            ..
        } = decl
        else {
            panic!("expected a class declaration");
        };
        assert_eq!(name, UNION_CLASS_NAME);
        assert_eq!(type_parameters.len(), arity);
        assert_eq!(type_parameters.last().map(String::as_str), Some(format!("T{arity}").as_str()));
    }
}

#[test]
fn test_each_member_has_factory_test_and_accessor() {
    let names = method_names(&union_class_declaration(3));
    for k in 1..=3 {
        assert!(names.contains(&format!("From{k}")), "missing From{k}");
        assert!(names.contains(&format!("Is{k}")), "missing Is{k}");
        assert!(names.contains(&format!("As{k}")), "missing As{k}");
    }
    assert!(!names.contains(&"Is4".to_string()));
    assert_eq!(names.len(), 9);
}

#[test]
fn test_arity_two_source() {
    let text = CsPrinter::emit_to_string(&union_class_declaration(2));
    let expected = "\
public sealed class Union<T1, T2>
{
    private readonly int _index;
    private readonly object _value;

    private Union(int index, object value)
    {
        _index = index;
        _value = value;
    }

    public static Union<T1, T2> From1(T1 value)
    {
        return new Union<T1, T2>(1, value);
    }

    public static Union<T1, T2> From2(T2 value)
    {
        return new Union<T1, T2>(2, value);
    }

    public bool Is1()
    {
        return _index == 1;
    }

    public T1 As1()
    {
        if (_index != 1)
        {
            throw new global::System.InvalidOperationException(\"Union does not hold member 1\");
        }
        return (T1)_value;
    }

    public bool Is2()
    {
        return _index == 2;
    }

    public T2 As2()
    {
        if (_index != 2)
        {
            throw new global::System.InvalidOperationException(\"Union does not hold member 2\");
        }
        return (T2)_value;
    }
}";
    assert_eq!(text, expected);
}

#[test]
fn test_emit_runtime_is_namespaced() {
    let text = emit_union_runtime();
    assert!(text.starts_with("namespace Tscs.Runtime;\n"));
    assert!(text.contains("public sealed class Union<T1, T2>\n"));
    assert!(text.contains("public sealed class Union<T1, T2, T3, T4, T5, T6, T7, T8>\n"));
    assert!(!text.contains("Union<T1>\n"));
}
