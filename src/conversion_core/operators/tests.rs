use crate::backends::target::target_expr::TargetExpr;
use crate::conversion_core::compiler_errors::{CompilerError, ErrorMetaDataKey, ErrorType};
use crate::conversion_core::conversions::ConversionPipeline;
use crate::conversion_core::conversions::runtime_helpers::RuntimeHelpers;
use crate::conversion_core::hoisting::hoisting_sink::HoistingSink;
use crate::conversion_core::operators::operator_case::{
    LoweringContext, OperatorCase, OperatorKind, UnaryCase, UnaryOperatorKind,
};
use crate::conversion_core::operators::operator_lowering::{
    BinaryLowering, LoweredOperator, OperatorLowering, UnaryLowering,
};
use crate::conversion_core::type_facts::semantic_types::{SemanticType, SpecialType};
use crate::conversion_core::type_facts::type_facts::{ConstantValue, TypeFacts};
use crate::conversion_core::type_facts::type_identity::TypeIdentityTable;
use crate::settings::{CompareMethod, DEFAULT_RUNTIME_NAMESPACE, DEFAULT_SUPPORT_NAMESPACE, SYSTEM_NAMESPACE};

fn customer() -> SemanticType {
    SemanticType::class("Demo.Customer", &[])
}

fn nothing() -> TypeFacts {
    TypeFacts {
        constant: Some(ConstantValue::Nothing),
        is_literal: true,
        ..TypeFacts::default()
    }
}

fn typed(ty: SemanticType) -> TypeFacts {
    TypeFacts::new(ty)
}

fn binary_ctx() -> LoweringContext {
    LoweringContext::default()
}

fn expression_tree_ctx() -> LoweringContext {
    LoweringContext {
        in_expression_tree: true,
        ..LoweringContext::default()
    }
}

fn operand(facts: &TypeFacts, name: &str) -> TargetExpr {
    match facts.is_nothing_literal() {
        true => TargetExpr::null(),
        false => TargetExpr::identifier(name),
    }
}

fn lower(case: OperatorCase, ctx: LoweringContext) -> (Result<Option<LoweredOperator>, CompilerError>, HoistingSink) {
    let mut identities = TypeIdentityTable::with_builtins();
    identities.register(&customer());
    let helpers = RuntimeHelpers::default();
    let pipeline = ConversionPipeline::new(&identities, &helpers);
    let lowering = OperatorLowering::new(&pipeline);

    let left = operand(&case.left, "a");
    let right = operand(&case.right, "b");

    let mut sink = HoistingSink::new();
    let result = lowering
        .lower_binary(&case, left, right, &ctx, &mut sink)
        .map(BinaryLowering::substituted);
    (result, sink)
}

fn lowered_text(case: OperatorCase, ctx: LoweringContext) -> Option<String> {
    let (result, _) = lower(case, ctx);
    result.unwrap().map(|lowered| lowered.expr.to_string())
}

fn binary_case(kind: OperatorKind, left: TypeFacts, right: TypeFacts, result: SemanticType) -> OperatorCase {
    OperatorCase::new(kind, left, right, result)
}

#[test]
fn dynamic_equality_in_boolean_context_uses_conditional_helper() {
    let case = binary_case(
        OperatorKind::Equals,
        typed(SemanticType::object()),
        typed(SemanticType::object()),
        SemanticType::boolean(),
    );

    let (result, sink) = lower(case, binary_ctx());
    let lowered = result.unwrap().unwrap();

    assert_eq!(
        lowered.expr.to_string(),
        "Operators.ConditionalCompareObjectEqual(a, b, false)"
    );
    assert!(lowered.result_type.is_boolean());
    assert_eq!(
        sink.required_imports().collect::<Vec<_>>(),
        vec![DEFAULT_RUNTIME_NAMESPACE]
    );
}

#[test]
fn dynamic_equality_with_dynamic_result_uses_plain_helper() {
    let case = binary_case(
        OperatorKind::Equals,
        typed(SemanticType::object()),
        typed(SemanticType::object()),
        SemanticType::object(),
    );

    let (result, _) = lower(case, binary_ctx());
    let lowered = result.unwrap().unwrap();

    assert_eq!(lowered.expr.to_string(), "Operators.CompareObjectEqual(a, b, false)");
    assert!(lowered.result_type.is_dynamic());
}

#[test]
fn text_comparison_mode_is_passed_to_helpers() {
    let case = binary_case(
        OperatorKind::LessThan,
        typed(SemanticType::object()),
        typed(SemanticType::int32()),
        SemanticType::boolean(),
    );
    let ctx = LoweringContext {
        compare_method: CompareMethod::Text,
        ..LoweringContext::default()
    };

    assert_eq!(
        lowered_text(case, ctx).as_deref(),
        Some("Operators.ConditionalCompareObjectLess(a, b, true)")
    );
}

#[test]
fn expression_trees_never_use_conditional_helpers() {
    let case = binary_case(
        OperatorKind::NotEquals,
        typed(SemanticType::object()),
        typed(SemanticType::object()),
        SemanticType::boolean(),
    );

    assert_eq!(
        lowered_text(case, expression_tree_ctx()).as_deref(),
        Some("Operators.CompareObjectNotEqual(a, b, false)")
    );
}

#[test]
fn string_relational_goes_through_compare_string() {
    let case = binary_case(
        OperatorKind::GreaterThanOrEqual,
        typed(SemanticType::string()),
        typed(SemanticType::string()),
        SemanticType::boolean(),
    );

    assert_eq!(
        lowered_text(case, binary_ctx()).as_deref(),
        Some("Operators.CompareString(a, b, false) >= 0")
    );
}

#[test]
fn static_numeric_operators_stay_native() {
    for kind in [OperatorKind::Equals, OperatorKind::Add, OperatorKind::Modulo, OperatorKind::And] {
        let case = binary_case(
            kind,
            typed(SemanticType::int32()),
            typed(SemanticType::int32()),
            SemanticType::int32(),
        );
        assert_eq!(lowered_text(case, binary_ctx()), None, "{kind} should stay native");
    }

    let decimal = SemanticType::special(SpecialType::Decimal);
    let case = binary_case(
        OperatorKind::Multiply,
        typed(decimal.clone()),
        typed(decimal.clone()),
        decimal,
    );
    assert_eq!(lowered_text(case, binary_ctx()), None);
}

#[test]
fn reference_null_checks() {
    let is_nothing = binary_case(OperatorKind::Is, typed(customer()), nothing(), SemanticType::boolean());
    assert_eq!(lowered_text(is_nothing, binary_ctx()).as_deref(), Some("a is null"));

    let is_not_nothing = binary_case(OperatorKind::IsNot, nothing(), typed(customer()), SemanticType::boolean());
    assert_eq!(lowered_text(is_not_nothing, binary_ctx()).as_deref(), Some("b is not null"));

    let nullable = binary_case(
        OperatorKind::Equals,
        typed(SemanticType::nullable(SemanticType::int32())),
        nothing(),
        SemanticType::boolean(),
    );
    assert_eq!(lowered_text(nullable, binary_ctx()).as_deref(), Some("a is null"));
}

#[test]
fn value_type_compared_with_nothing_uses_default() {
    let equals = binary_case(OperatorKind::Equals, typed(SemanticType::int32()), nothing(), SemanticType::boolean());
    assert_eq!(lowered_text(equals, binary_ctx()).as_deref(), Some("a == default(int)"));

    let not_equals = binary_case(OperatorKind::NotEquals, typed(SemanticType::int32()), nothing(), SemanticType::boolean());
    assert_eq!(lowered_text(not_equals, binary_ctx()).as_deref(), Some("a != default(int)"));
}

#[test]
fn string_equal_to_nothing_is_a_string_comparison() {
    let case = binary_case(OperatorKind::Equals, typed(SemanticType::string()), nothing(), SemanticType::boolean());
    assert_eq!(
        lowered_text(case, binary_ctx()).as_deref(),
        Some("Operators.CompareString(a, null, false) == 0")
    );
}

#[test]
fn string_is_nothing_is_a_null_check() {
    let case = binary_case(OperatorKind::Is, typed(SemanticType::string()), nothing(), SemanticType::boolean());
    assert_eq!(lowered_text(case, binary_ctx()).as_deref(), Some("a is null"));
}

#[test]
fn nothing_is_nothing_folds() {
    let is = binary_case(OperatorKind::Is, nothing(), nothing(), SemanticType::boolean());
    assert_eq!(lowered_text(is, binary_ctx()).as_deref(), Some("true"));

    let is_not = binary_case(OperatorKind::IsNot, nothing(), nothing(), SemanticType::boolean());
    assert_eq!(lowered_text(is_not, binary_ctx()).as_deref(), Some("false"));
}

#[test]
fn reference_identity_between_objects() {
    let is = binary_case(OperatorKind::Is, typed(customer()), typed(SemanticType::object()), SemanticType::boolean());
    assert_eq!(lowered_text(is, binary_ctx()).as_deref(), Some("object.ReferenceEquals(a, b)"));

    let is_not = binary_case(OperatorKind::IsNot, typed(customer()), typed(customer()), SemanticType::boolean());
    assert_eq!(lowered_text(is_not, binary_ctx()).as_deref(), Some("!object.ReferenceEquals(a, b)"));
}

#[test]
fn reference_identity_on_value_types_is_unsupported() {
    let case = binary_case(OperatorKind::Is, typed(SemanticType::int32()), typed(customer()), SemanticType::boolean());
    let (result, _) = lower(case, binary_ctx());

    let error = result.unwrap_err();
    assert_eq!(error.error_type, ErrorType::UnsupportedOperator);
    assert_eq!(error.metadata.get(&ErrorMetaDataKey::FoundType).map(String::as_str), Some("Int32"));
}

#[test]
fn late_bound_arithmetic() {
    let case = binary_case(
        OperatorKind::IntegerDivide,
        typed(SemanticType::object()),
        typed(SemanticType::int32()),
        SemanticType::object(),
    );
    assert_eq!(
        lowered_text(case, binary_ctx()).as_deref(),
        Some("Operators.IntDivideObject(a, b)")
    );
}

#[test]
fn late_bound_arithmetic_in_expression_tree_is_unsupported() {
    let case = binary_case(
        OperatorKind::Add,
        typed(SemanticType::object()),
        typed(SemanticType::object()),
        SemanticType::object(),
    );
    let (result, _) = lower(case, expression_tree_ctx());
    assert_eq!(result.unwrap_err().error_type, ErrorType::UnsupportedOperator);
}

#[test]
fn exponent_uses_math_pow() {
    let double = SemanticType::double();
    let case = binary_case(OperatorKind::Exponent, typed(double.clone()), typed(double.clone()), double);

    let (result, sink) = lower(case, binary_ctx());
    let lowered = result.unwrap().unwrap();

    assert_eq!(lowered.expr.to_string(), "Math.Pow(a, b)");
    assert!(lowered.result_type.is_special(SpecialType::Double));
    assert!(sink.required_imports().any(|import| import == SYSTEM_NAMESPACE));
}

#[test]
fn concatenation_without_strings_converts_both_operands() {
    let case = binary_case(
        OperatorKind::Concatenate,
        typed(SemanticType::int32()),
        typed(SemanticType::boolean()),
        SemanticType::string(),
    );

    let (result, _) = lower(case, binary_ctx());
    let lowered = result.unwrap().unwrap();

    assert_eq!(lowered.expr.to_string(), "a.ToString() + Conversions.ToString(b)");
    assert!(lowered.result_type.is_string());
}

#[test]
fn concatenation_with_a_string_operand_is_native() {
    let case = binary_case(
        OperatorKind::Concatenate,
        typed(SemanticType::string()),
        typed(SemanticType::int32()).converted_to(SemanticType::string()),
        SemanticType::string(),
    );
    assert_eq!(lowered_text(case, binary_ctx()), None);
}

#[test]
fn late_bound_concatenation() {
    let case = binary_case(
        OperatorKind::Concatenate,
        typed(SemanticType::object()),
        typed(SemanticType::string()),
        SemanticType::object(),
    );
    assert_eq!(
        lowered_text(case, binary_ctx()).as_deref(),
        Some("Operators.ConcatenateObject(a, b)")
    );
}

#[test]
fn like_passes_the_compare_method() {
    let case = binary_case(
        OperatorKind::Like,
        typed(SemanticType::string()),
        typed(SemanticType::string()),
        SemanticType::boolean(),
    );
    let ctx = LoweringContext {
        compare_method: CompareMethod::Text,
        ..LoweringContext::default()
    };

    let (result, sink) = lower(case, ctx);
    assert_eq!(
        result.unwrap().unwrap().expr.to_string(),
        "LikeOperator.LikeString(a, b, CompareMethod.Text)"
    );

    let imports: Vec<_> = sink.required_imports().cloned().collect();
    assert_eq!(imports, vec![DEFAULT_SUPPORT_NAMESPACE, DEFAULT_RUNTIME_NAMESPACE]);
}

#[test]
fn late_bound_like() {
    let case = binary_case(
        OperatorKind::Like,
        typed(SemanticType::object()),
        typed(SemanticType::string()),
        SemanticType::object(),
    );
    assert_eq!(
        lowered_text(case, binary_ctx()).as_deref(),
        Some("LikeOperator.LikeObject(a, b, CompareMethod.Binary)")
    );
}

#[test]
fn late_bound_short_circuit_keeps_short_circuiting() {
    let case = binary_case(
        OperatorKind::AndAlso,
        typed(SemanticType::object()),
        typed(SemanticType::boolean()),
        SemanticType::boolean(),
    );
    assert_eq!(
        lowered_text(case, binary_ctx()).as_deref(),
        Some("Conversions.ToBoolean(a) && b")
    );

    let static_case = binary_case(
        OperatorKind::OrElse,
        typed(SemanticType::boolean()),
        typed(SemanticType::boolean()),
        SemanticType::boolean(),
    );
    assert_eq!(lowered_text(static_case, binary_ctx()), None);
}

#[test]
fn unary_on_dynamic_operand() {
    let identities = TypeIdentityTable::with_builtins();
    let helpers = RuntimeHelpers::default();
    let pipeline = ConversionPipeline::new(&identities, &helpers);
    let lowering = OperatorLowering::new(&pipeline);
    let mut sink = HoistingSink::new();

    let dynamic = UnaryCase {
        kind: UnaryOperatorKind::Negate,
        operand: typed(SemanticType::object()),
        result_type: SemanticType::object(),
        location: Default::default(),
    };
    let lowered = lowering
        .lower_unary(&dynamic, TargetExpr::identifier("a"), &mut sink)
        .substituted();
    assert_eq!(
        lowered.map(|lowered| lowered.expr.to_string()).as_deref(),
        Some("Operators.NegateObject(a)")
    );

    let native = UnaryCase {
        kind: UnaryOperatorKind::Not,
        operand: typed(SemanticType::boolean()),
        result_type: SemanticType::boolean(),
        location: Default::default(),
    };
    assert_eq!(
        lowering.lower_unary(&native, TargetExpr::identifier("a"), &mut sink),
        UnaryLowering::Native(TargetExpr::identifier("a"))
    );
}
