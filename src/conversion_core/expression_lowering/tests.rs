use crate::backends::target::{TargetOutputConfig, render_document};
use crate::conversion_core::ConversionCore;
use crate::conversion_core::compiler_errors::{
    CompilerMessages, ErrorMetaDataKey, ErrorType, TextLocation,
};
use crate::conversion_core::compiler_warnings::WarningKind;
use crate::conversion_core::operators::operator_case::{OperatorKind, UnaryOperatorKind};
use crate::conversion_core::source_tree::source_nodes::{
    SourceArgument, SourceDocument, SourceExpr, SourceExprKind, SourceMember, SourceStatement,
};
use crate::conversion_core::type_facts::semantic_types::{SemanticType, SpecialType};
use crate::conversion_core::type_facts::symbols::{DenotedEntity, ParameterInfo};
use crate::conversion_core::type_facts::type_facts::{ConstantValue, TypeFacts};
use crate::settings::Config;
use std::path::Path;

// Node ids only need to be unique within one document
struct Ids(u32);

impl Ids {
    fn next(&mut self) -> u32 {
        self.0 += 1;
        self.0
    }

    fn ident(&mut self, name: &str, ty: SemanticType) -> SourceExpr {
        SourceExpr::new(self.next(), SourceExprKind::Identifier(name.to_owned()))
            .with_facts(TypeFacts::new(ty))
    }

    fn binary(&mut self, op: OperatorKind, left: SourceExpr, right: SourceExpr, facts: TypeFacts) -> SourceExpr {
        SourceExpr::new(
            self.next(),
            SourceExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
        )
        .with_facts(facts)
    }

    fn parens(&mut self, inner: SourceExpr, facts: TypeFacts) -> SourceExpr {
        SourceExpr::new(self.next(), SourceExprKind::Parenthesized(Box::new(inner))).with_facts(facts)
    }

    // Update(ByRef value As Integer) As Integer, called with the writable property Total
    fn update_total(&mut self) -> SourceExpr {
        let callee = SourceExpr::new(self.next(), SourceExprKind::Identifier(String::from("Update")));
        let total = self.ident("Total", SemanticType::int32()).denoting(DenotedEntity::Property {
            name: String::from("Total"),
            ty: SemanticType::int32(),
            has_getter: true,
            has_setter: true,
        });

        SourceExpr::new(
            self.next(),
            SourceExprKind::Call {
                callee: Box::new(callee),
                arguments: vec![SourceArgument {
                    value: total,
                    parameter: Some(ParameterInfo::by_ref("value", SemanticType::int32())),
                }],
            },
        )
        .with_facts(TypeFacts::new(SemanticType::int32()))
    }
}

fn member(name: &str, statements: Vec<SourceStatement>) -> SourceMember {
    SourceMember {
        name: name.to_owned(),
        location: TextLocation::default(),
        in_expression_tree: false,
        statements,
    }
}

fn document(members: Vec<SourceMember>) -> SourceDocument {
    SourceDocument {
        name: String::from("Demo"),
        compare_text: None,
        members,
    }
}

fn assign(target: SourceExpr, value: SourceExpr) -> SourceStatement {
    SourceStatement::Assign { target, value }
}

fn convert_with(config: &Config, source: &SourceDocument) -> (String, CompilerMessages) {
    let core = ConversionCore::new(config);
    let converted = core
        .convert_document(source, Path::new("Demo.json"))
        .unwrap_or_else(|messages| panic!("document aborted: {:?}", messages.errors));

    let text = render_document(&converted.document, &TargetOutputConfig::default());
    (text, converted.messages)
}

fn convert(source: &SourceDocument) -> (String, CompilerMessages) {
    convert_with(&Config::default(), source)
}

#[test]
fn parenthesised_dynamic_comparison_in_boolean_context() {
    let mut ids = Ids(0);
    let object = SemanticType::object();

    let x = ids.ident("x", SemanticType::boolean());
    let left = ids.ident("objA", object.to_owned());
    let right = ids.ident("objB", object.to_owned());
    let equals = ids.binary(OperatorKind::Equals, left, right, TypeFacts::new(object.to_owned()));
    let value = ids.parens(equals, TypeFacts::conversion(object, SemanticType::boolean()));

    let (text, messages) = convert(&document(vec![member("Compare", vec![assign(x, value)])]));

    assert_eq!(
        text,
        "using Microsoft.VisualBasic.CompilerServices;\n\n// Compare\nx = Operators.ConditionalCompareObjectEqual(objA, objB, false);\n"
    );
    assert!(messages.errors.is_empty());
    assert!(messages.warnings.is_empty());
}

#[test]
fn native_arithmetic_is_converted_at_its_boundary() {
    let mut ids = Ids(0);
    let int = SemanticType::int32();
    let long = SemanticType::special(SpecialType::Int64);

    let total = ids.ident("total", long.to_owned());
    let a = ids.ident("a", int.to_owned());
    let b = ids.ident("b", int.to_owned());
    let sum = ids.binary(OperatorKind::Add, a, b, TypeFacts::conversion(int, long));

    let (text, _) = convert(&document(vec![member("Widen", vec![assign(total, sum)])]));
    assert_eq!(text, "// Widen\ntotal = (long)(a + b);\n");
}

#[test]
fn document_compare_option_overrides_the_config() {
    let mut ids = Ids(0);
    let string = SemanticType::string();

    let flag = ids.ident("flag", SemanticType::boolean());
    let s = ids.ident("s", string.to_owned());
    let t = ids.ident("t", string);
    let less = ids.binary(OperatorKind::LessThan, s, t, TypeFacts::new(SemanticType::boolean()));

    let mut source = document(vec![member("Order", vec![assign(flag, less)])]);
    source.compare_text = Some(true);

    let (text, _) = convert(&source);
    assert!(
        text.contains("flag = Operators.CompareString(s, t, true) < 0;"),
        "unexpected output:\n{text}"
    );
}

#[test]
fn integral_not_is_a_bitwise_complement() {
    let mut ids = Ids(0);
    let int = SemanticType::int32();

    let mask = ids.ident("mask", int.to_owned());
    let bits = ids.ident("bits", int.to_owned());
    let not = SourceExpr::new(
        ids.next(),
        SourceExprKind::Unary {
            op: UnaryOperatorKind::Not,
            operand: Box::new(bits),
        },
    )
    .with_facts(TypeFacts::new(int));

    let (text, _) = convert(&document(vec![member("Invert", vec![assign(mask, not)])]));
    assert_eq!(text, "// Invert\nmask = ~bits;\n");
}

#[test]
fn nothing_initialiser_takes_the_declared_type() {
    let mut ids = Ids(0);
    let int = SemanticType::int32();

    let nothing = SourceExpr::new(ids.next(), SourceExprKind::Literal(ConstantValue::Nothing))
        .with_facts(TypeFacts::literal(SemanticType::object(), ConstantValue::Nothing).converted_to(int.to_owned()));
    let local = SourceStatement::Local {
        name: String::from("count"),
        ty: int,
        initializer: Some(nothing),
    };

    let (text, _) = convert(&document(vec![member("Reset", vec![local])]));
    assert_eq!(text, "// Reset\nint count = default(int);\n");
}

#[test]
fn by_ref_property_is_hoisted_around_its_statement() {
    let mut ids = Ids(0);
    let call = ids.update_total();

    let (text, messages) = convert(&document(vec![member(
        "Apply",
        vec![SourceStatement::Expression { expr: call }],
    )]));

    assert_eq!(
        text,
        "// Apply\nint argTotal = Total;\nUpdate(ref argTotal);\nTotal = argTotal;\n"
    );
    assert!(messages.warnings.is_empty());
}

#[test]
fn late_hoisting_call_moves_into_a_local_function() {
    let mut ids = Ids(0);
    let int = SemanticType::int32();

    let x = ids.ident("x", int.to_owned());
    let a = ids.ident("a", int.to_owned());
    let call = ids.update_total();
    let sum = ids.binary(OperatorKind::Add, a, call, TypeFacts::new(int));

    let (text, messages) = convert(&document(vec![member("Apply", vec![assign(x, sum)])]));

    assert_eq!(
        text,
        "// Apply\nint localUpdate()\n{\n    int argTotal = Total;\n    int result = Update(ref argTotal);\n    Total = argTotal;\n    return result;\n}\nx = a + localUpdate();\n"
    );
    assert_eq!(messages.warnings.len(), 1);
    assert_eq!(messages.warnings[0].warning_kind, WarningKind::CallWrappedInLocalFunction);
}

#[test]
fn failing_member_leaves_a_marker_and_the_rest_converts() {
    let mut ids = Ids(0);
    let int = SemanticType::int32();

    let flag = ids.ident("flag", SemanticType::boolean());
    let a = ids.ident("a", int.to_owned());
    let b = ids.ident("b", int.to_owned());
    let is = ids.binary(OperatorKind::Is, a, b, TypeFacts::new(SemanticType::boolean()));

    let y = ids.ident("y", int.to_owned());
    let one = SourceExpr::new(ids.next(), SourceExprKind::Literal(ConstantValue::Integer(1)))
        .with_facts(TypeFacts::literal(int, ConstantValue::Integer(1)));

    let (text, messages) = convert(&document(vec![
        member("Broken", vec![assign(flag, is)]),
        member("Fine", vec![assign(y, one)]),
    ]));

    assert!(text.contains("/* Cannot convert Broken:"), "unexpected output:\n{text}");
    assert!(text.ends_with("// Fine\ny = 1;\n"), "unexpected output:\n{text}");

    assert_eq!(messages.errors.len(), 1);
    let error = &messages.errors[0];
    assert_eq!(error.error_type, ErrorType::UnsupportedOperator);
    assert_eq!(
        error.metadata.get(&ErrorMetaDataKey::MemberName).map(String::as_str),
        Some("Broken")
    );
    assert_eq!(error.location.scope.as_path(), Path::new("Demo.json"));
}

#[test]
fn missing_operator_facts_fall_back_to_native_with_a_warning() {
    let mut ids = Ids(0);
    let int = SemanticType::int32();

    let x = ids.ident("x", int.to_owned());
    let a = ids.ident("a", int.to_owned());
    let b = ids.ident("b", int.to_owned());
    let product = SourceExpr::new(
        ids.next(),
        SourceExprKind::Binary {
            op: OperatorKind::Multiply,
            left: Box::new(a),
            right: Box::new(b),
        },
    );

    let (text, messages) = convert(&document(vec![member("Scale", vec![assign(x, product)])]));

    assert_eq!(text, "// Scale\nx = a * b;\n");
    assert_eq!(messages.warnings.len(), 1);
    assert_eq!(messages.warnings[0].warning_kind, WarningKind::MissingFacts);

    // An operator with no native form cannot fall back, only its member fails
    let y = ids.ident("y", int.to_owned());
    let c = ids.ident("c", int.to_owned());
    let d = ids.ident("d", int.to_owned());
    let power = SourceExpr::new(
        ids.next(),
        SourceExprKind::Binary {
            op: OperatorKind::Exponent,
            left: Box::new(c),
            right: Box::new(d),
        },
    );

    let z = ids.ident("z", int.to_owned());
    let one = SourceExpr::new(ids.next(), SourceExprKind::Literal(ConstantValue::Integer(1)))
        .with_facts(TypeFacts::literal(int, ConstantValue::Integer(1)));

    let (text, messages) = convert(&document(vec![
        member("Raise", vec![assign(y, power)]),
        member("Fine", vec![assign(z, one)]),
    ]));

    assert!(text.contains("/* Cannot convert Raise:"), "unexpected output:\n{text}");
    assert!(text.ends_with("// Fine\nz = 1;\n"), "unexpected output:\n{text}");

    assert_eq!(messages.errors.len(), 1);
    let error = &messages.errors[0];
    assert_eq!(error.error_type, ErrorType::Facts);
    assert!(!error.aborts_document());
    assert_eq!(
        error.metadata.get(&ErrorMetaDataKey::MemberName).map(String::as_str),
        Some("Raise")
    );
}

#[test]
fn integral_literals_keep_a_real_division() {
    let mut ids = Ids(0);
    let int = SemanticType::int32();
    let double = SemanticType::special(SpecialType::Double);

    let d = ids.ident("d", double.to_owned());
    let literal = |ids: &mut Ids, value: i64| {
        SourceExpr::new(ids.next(), SourceExprKind::Literal(ConstantValue::Integer(value))).with_facts(
            TypeFacts::literal(int.to_owned(), ConstantValue::Integer(value)).converted_to(double.to_owned()),
        )
    };
    let one = literal(&mut ids, 1);
    let three = literal(&mut ids, 3);
    let quotient = ids.binary(OperatorKind::Divide, one, three, TypeFacts::new(double.to_owned()));

    let (text, messages) = convert(&document(vec![member("Div", vec![assign(d, quotient)])]));

    assert_eq!(text, "// Div\nd = 1d / 3d;\n");
    assert!(messages.errors.is_empty());
}

#[test]
fn small_integer_arithmetic_is_narrowed_back() {
    let mut ids = Ids(0);
    let byte = SemanticType::special(SpecialType::Byte);

    let b3 = ids.ident("b3", byte.to_owned());
    let b1 = ids.ident("b1", byte.to_owned());
    let b2 = ids.ident("b2", byte.to_owned());
    let sum = ids.binary(OperatorKind::Add, b1, b2, TypeFacts::new(byte));

    let (text, messages) = convert(&document(vec![member("Bytes", vec![assign(b3, sum)])]));

    assert_eq!(
        text,
        "using Microsoft.VisualBasic.CompilerServices;\n\n// Bytes\nb3 = Conversions.ToByte(b1 + b2);\n"
    );
    assert!(messages.errors.is_empty());
}

#[test]
fn failed_member_requires_no_imports() {
    let mut ids = Ids(0);
    let int = SemanticType::int32();
    let byte = SemanticType::special(SpecialType::Byte);

    // The helper call converts, then the reference comparison on integers fails
    let b3 = ids.ident("b3", byte.to_owned());
    let b1 = ids.ident("b1", byte.to_owned());
    let b2 = ids.ident("b2", byte.to_owned());
    let sum = ids.binary(OperatorKind::Add, b1, b2, TypeFacts::new(byte));

    let flag = ids.ident("flag", SemanticType::boolean());
    let a = ids.ident("a", int.to_owned());
    let b = ids.ident("b", int.to_owned());
    let is = ids.binary(OperatorKind::Is, a, b, TypeFacts::new(SemanticType::boolean()));

    let y = ids.ident("y", int.to_owned());
    let one = SourceExpr::new(ids.next(), SourceExprKind::Literal(ConstantValue::Integer(1)))
        .with_facts(TypeFacts::literal(int, ConstantValue::Integer(1)));

    let (text, messages) = convert(&document(vec![
        member("Broken", vec![assign(b3, sum), assign(flag, is)]),
        member("Fine", vec![assign(y, one)]),
    ]));

    assert!(!text.contains("using"), "unexpected output:\n{text}");
    assert!(text.ends_with("// Fine\ny = 1;\n"), "unexpected output:\n{text}");
    assert_eq!(messages.errors.len(), 1);
}

#[test]
fn unresolved_local_type_is_reported() {
    let local = SourceStatement::Local {
        name: String::from("widget"),
        ty: SemanticType::class("Vendor.Widget", &[]),
        initializer: None,
    };

    let (_, messages) = convert(&document(vec![member("Build", vec![local])]));
    assert!(
        messages
            .warnings
            .iter()
            .any(|warning| warning.warning_kind == WarningKind::UnmappedType)
    );
}

#[test]
fn documents_deserialise_from_json() {
    let text = r#"{
        "name": "Demo",
        "members": [{
            "name": "Compare",
            "statements": [{
                "statement": "assign",
                "target": {"id": 1, "kind": {"identifier": "x"}, "facts": {"source_type": "Boolean"}},
                "value": {"id": 2, "kind": {"parenthesized": {"id": 3, "kind": {"binary": {
                    "op": "equals",
                    "left": {"id": 4, "kind": {"identifier": "objA"}, "facts": {"source_type": "Object"}},
                    "right": {"id": 5, "kind": {"identifier": "objB"}, "facts": {"source_type": "Object"}}
                }}, "facts": {"source_type": "Object"}}},
                "facts": {"source_type": "Object", "converted_type": "Boolean"}}
            }]
        }]
    }"#;

    let source: SourceDocument = serde_json::from_str(text).unwrap();
    let (text, _) = convert(&source);
    assert!(text.ends_with("x = Operators.ConditionalCompareObjectEqual(objA, objB, false);\n"));
}
