use crate::conversion_core::source_tree::source_nodes::{
    NodeId, SourceDocument, SourceExprKind, SourceStatement,
};
use crate::conversion_core::type_facts::fact_table::{FactTable, TypeFactsProvider};
use crate::conversion_core::type_facts::native_conversions::{
    classify_source_conversion, classify_target_conversion,
};
use crate::conversion_core::type_facts::semantic_types::{SemanticType, SpecialType, TypeKind};
use crate::conversion_core::type_facts::symbols::{DenotedEntity, RefKind};
use crate::conversion_core::type_facts::type_facts::{ConstantValue, TypeFacts};
use crate::conversion_core::type_facts::type_identity::TypeIdentityTable;

fn parse(text: &str) -> SemanticType {
    text.parse().unwrap()
}

#[test]
fn compact_type_text_round_trips() {
    for text in [
        "Int32",
        "String?",
        "Char()",
        "Int32(,)",
        "enum Demo.Color : Int32",
        "class Demo.Admin : Demo.User, Demo.IAudited",
        "structure Demo.Point",
        "interface Demo.IAudited",
        "class Demo.Box`1",
    ] {
        assert_eq!(parse(text).to_string(), text);
    }
}

#[test]
fn source_keywords_are_accepted() {
    assert_eq!(parse("Integer"), SemanticType::int32());
    assert_eq!(parse("Date"), SemanticType::special(SpecialType::DateTime));
    assert_eq!(parse("System.Int64"), SemanticType::special(SpecialType::Int64));
}

#[test]
fn malformed_type_text_is_rejected() {
    assert!("".parse::<SemanticType>().is_err());
    assert!("Widget".parse::<SemanticType>().is_err());
    assert!("enum Demo.Color : String".parse::<SemanticType>().is_err());
    assert!("enum Demo.Color".parse::<SemanticType>().is_err());
}

#[test]
fn generic_arity_is_part_of_identity() {
    let one = parse("class Demo.Box`1");
    let two = parse("class Demo.Box`2");
    assert_eq!(one.arity, 1);
    assert!(!one.same_identity(&two));
    assert!(one.same_identity(&parse("class Demo.Box`1 : Demo.Base")));
}

#[test]
fn type_facts_deserialize_from_json() {
    let json = r#"{
        "source_type": "Int32",
        "converted_type": "Byte",
        "constant": { "integer": 12 },
        "is_literal": true
    }"#;

    let facts: TypeFacts = serde_json::from_str(json).unwrap();
    assert_eq!(facts.source_type, Some(SemanticType::int32()));
    assert_eq!(facts.converted_type, Some(SemanticType::special(SpecialType::Byte)));
    assert_eq!(facts.constant, Some(ConstantValue::Integer(12)));
    assert!(facts.is_literal);
    assert!(!facts.is_const_context);
}

#[test]
fn nothing_constant_deserializes() {
    let facts: TypeFacts = serde_json::from_str(r#"{ "constant": "nothing" }"#).unwrap();
    assert!(facts.is_nothing_literal());
    assert_eq!(facts.source_type, None);
}

#[test]
fn source_widening_chain() {
    let widening = classify_source_conversion(&SemanticType::int32(), &SemanticType::double());
    assert!(widening.is_widening && widening.is_numeric);

    let decimal = SemanticType::special(SpecialType::Decimal);
    let to_double = classify_source_conversion(&decimal, &SemanticType::double());
    assert!(to_double.is_widening);

    let narrowing = classify_source_conversion(&SemanticType::double(), &SemanticType::int32());
    assert!(narrowing.is_narrowing && narrowing.is_numeric);

    let identity = classify_source_conversion(&SemanticType::int32(), &SemanticType::int32());
    assert!(identity.is_identity && !identity.is_numeric);
}

#[test]
fn source_string_conversions() {
    let to_string = classify_source_conversion(&SemanticType::int32(), &SemanticType::string());
    assert!(to_string.exists && to_string.is_narrowing && to_string.is_string);

    let char_to_string = classify_source_conversion(&SemanticType::char(), &SemanticType::string());
    assert!(char_to_string.is_widening);

    let char_to_integer = classify_source_conversion(&SemanticType::char(), &SemanticType::int32());
    assert!(!char_to_integer.exists);
}

#[test]
fn source_reference_conversions() {
    let admin = parse("class Demo.Admin : Demo.User");
    let user = parse("class Demo.User");

    assert!(classify_source_conversion(&admin, &user).is_widening);
    assert!(classify_source_conversion(&user, &admin).is_narrowing);
    assert!(classify_source_conversion(&SemanticType::object(), &user).is_narrowing);
}

#[test]
fn target_numeric_table_differs_from_source() {
    let identities = TypeIdentityTable::with_builtins();
    let resolve = |ty: SemanticType| identities.resolve(&ty).unwrap();

    let decimal = resolve(SemanticType::special(SpecialType::Decimal));
    let double = resolve(SemanticType::double());
    let to_double = classify_target_conversion(&decimal, &double);
    assert!(to_double.is_explicit && to_double.is_numeric);

    let char_to_int = classify_target_conversion(&resolve(SemanticType::char()), &resolve(SemanticType::int32()));
    assert!(char_to_int.is_implicit && char_to_int.is_numeric);

    let string_to_int = classify_target_conversion(&resolve(SemanticType::string()), &resolve(SemanticType::int32()));
    assert!(!string_to_int.exists);

    let unboxing = classify_target_conversion(&resolve(SemanticType::object()), &resolve(SemanticType::int32()));
    assert!(unboxing.is_unboxing && unboxing.is_explicit);
}

#[test]
fn identity_table_resolves_composites() {
    let mut identities = TypeIdentityTable::with_builtins();
    let color = parse("enum Demo.Color : Int32");
    identities.register(&SemanticType::nullable(color.clone()));

    assert_eq!(identities.target_name(&color), "Color");
    assert_eq!(identities.target_name(&SemanticType::nullable(color)), "Color?");
    assert_eq!(identities.target_name(&parse("Int32(,)")), "int[,]");
    assert_eq!(identities.target_name(&parse("Char()")), "char[]");

    let unknown = parse("class Other.Widget");
    assert!(identities.resolve(&unknown).is_none());
    assert_eq!(identities.target_name(&unknown), "Widget");
}

#[test]
fn fact_table_collects_nested_nodes() {
    let json = r#"{
        "name": "Demo",
        "members": [{
            "name": "Main",
            "statements": [{
                "statement": "expression",
                "expr": {
                    "id": 1,
                    "kind": { "call": {
                        "callee": { "id": 2, "kind": { "identifier": "Update" } },
                        "arguments": [{
                            "parameter": { "name": "value", "ref_kind": "ref", "type": "Int32" },
                            "value": {
                                "id": 3,
                                "kind": { "identifier": "Total" },
                                "facts": { "source_type": "Int32" },
                                "denoted": {
                                    "entity": "property",
                                    "name": "Total",
                                    "type": "Int32",
                                    "has_setter": true
                                }
                            }
                        }]
                    } },
                    "facts": { "source_type": "class Demo.Result" }
                }
            }]
        }]
    }"#;

    let document: SourceDocument = serde_json::from_str(json).unwrap();
    let table = FactTable::from_document(&document);

    assert_eq!(table.len(), 2);
    assert!(table.type_facts(NodeId(2)).is_none());
    assert_eq!(
        table.type_facts(NodeId(3)).and_then(|facts| facts.source_type.clone()),
        Some(SemanticType::int32())
    );

    match table.denoted_entity(NodeId(3)) {
        Some(DenotedEntity::Property {
            has_getter,
            has_setter,
            ..
        }) => {
            assert!(*has_getter);
            assert!(*has_setter);
        }
        other => panic!("expected a property, got {other:?}"),
    }

    let mut identities = TypeIdentityTable::with_builtins();
    let before = identities.len();
    table.register_types(&mut identities);
    assert_eq!(identities.len(), before + 1);
    assert!(matches!(
        identities.resolve(&parse("class Demo.Result")).map(|ty| ty.name),
        Some(name) if name == "Result"
    ));

    let parameter = match &document.members[0].statements[0] {
        SourceStatement::Expression { expr } => match &expr.kind {
            SourceExprKind::Call { arguments, .. } => arguments[0].parameter.clone(),
            _ => None,
        },
        _ => None,
    };
    assert_eq!(parameter.map(|parameter| parameter.ref_kind), Some(RefKind::Ref));
}

#[test]
fn nullable_and_array_kinds() {
    let nullable = parse("Boolean?");
    assert!(nullable.is_nullable_boolean());
    assert!(nullable.accepts_null());
    assert!(nullable.is_value_type());

    let chars = parse("Char()");
    assert!(chars.is_char_array());
    assert!(matches!(chars.kind, TypeKind::Array { rank: 1, .. }));
}
