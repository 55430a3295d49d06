//! Substitutes source operators whose semantics the target cannot express natively.
//!
//! Operands arrive already lowered and converted to the types the source language
//! applies the operator at. When nothing needs substituting the operands are handed
//! back and the caller emits the native target operator.

use crate::backends::target::target_expr::{TargetBinaryOperator, TargetExpr, TargetUnaryOperator};
use crate::conversion_core::compiler_errors::CompilerError;
use crate::conversion_core::conversions::ConversionPipeline;
use crate::conversion_core::hoisting::hoisting_sink::HoistingSink;
use crate::conversion_core::operators::operator_case::{
    LoweringContext, OperatorCase, OperatorFamily, OperatorKind, UnaryCase,
};
use crate::conversion_core::type_facts::semantic_types::{SemanticType, SpecialType};
use crate::conversion_core::type_facts::type_facts::TypeFacts;
use crate::{operator_log, return_unsupported_operator_error};

/// A substituted operator and the type of the expression that was actually emitted.
/// The caller converts from `result_type` to the node's own converted type.
#[derive(Clone, Debug, PartialEq)]
pub struct LoweredOperator {
    pub expr: TargetExpr,
    pub result_type: SemanticType,
}

impl LoweredOperator {
    fn new(expr: TargetExpr, result_type: SemanticType) -> Self {
        LoweredOperator { expr, result_type }
    }

    fn boolean(expr: TargetExpr) -> Self {
        LoweredOperator::new(expr, SemanticType::boolean())
    }

    fn object(expr: TargetExpr) -> Self {
        LoweredOperator::new(expr, SemanticType::object())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum BinaryLowering {
    Substituted(LoweredOperator),

    // The operands, untouched, for the native operator
    Native(TargetExpr, TargetExpr),
}

impl BinaryLowering {
    pub fn substituted(self) -> Option<LoweredOperator> {
        match self {
            BinaryLowering::Substituted(lowered) => Some(lowered),
            BinaryLowering::Native(..) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum UnaryLowering {
    Substituted(LoweredOperator),
    Native(TargetExpr),
}

impl UnaryLowering {
    pub fn substituted(self) -> Option<LoweredOperator> {
        match self {
            UnaryLowering::Substituted(lowered) => Some(lowered),
            UnaryLowering::Native(_) => None,
        }
    }
}

pub struct OperatorLowering<'a> {
    pipeline: &'a ConversionPipeline<'a>,
}

impl<'a> OperatorLowering<'a> {
    pub fn new(pipeline: &'a ConversionPipeline<'a>) -> Self {
        OperatorLowering { pipeline }
    }

    pub fn lower_binary(
        &self,
        case: &OperatorCase,
        left: TargetExpr,
        right: TargetExpr,
        ctx: &LoweringContext,
        sink: &mut HoistingSink,
    ) -> Result<BinaryLowering, CompilerError> {
        // Null and reference checks take precedence over every other family
        let (left, right) = match self.lower_null_or_reference(case, left, right)? {
            BinaryLowering::Native(left, right) => (left, right),
            lowered => return Ok(lowered),
        };

        let lowered = match case.kind.family() {
            OperatorFamily::Relational => self.lower_relational(case, left, right, ctx, sink),
            OperatorFamily::Arithmetic => self.lower_arithmetic(case, left, right, ctx, sink)?,
            OperatorFamily::Concatenation => self.lower_concatenation(case, left, right, sink),
            OperatorFamily::Like => self.lower_like(case, left, right, ctx, sink),
            OperatorFamily::ShortCircuit => self.lower_short_circuit(case, left, right, sink),

            // Handled above, a reference operator never reaches this point
            OperatorFamily::Reference => BinaryLowering::Native(left, right),
        };

        if let BinaryLowering::Substituted(lowered) = &lowered {
            operator_log!(format!(
                "[Operator] {} ({}) -> {}",
                case.kind, case.result_type, lowered.expr
            ));
        }

        Ok(lowered)
    }

    pub fn lower_unary(
        &self,
        case: &UnaryCase,
        operand: TargetExpr,
        sink: &mut HoistingSink,
    ) -> UnaryLowering {
        if !case.operand.is_dynamic() {
            return UnaryLowering::Native(operand);
        }

        let helper = self.pipeline.helpers.object_unary_operator(case.kind);
        let call = self.pipeline.helpers.call(&helper, vec![operand], sink);
        operator_log!(format!("[Operator] unary {:?} -> {}", case.kind, call));

        UnaryLowering::Substituted(LoweredOperator::object(call))
    }

    // ======================================================
    //                 NULL AND REFERENCE
    // ======================================================

    fn lower_null_or_reference(
        &self,
        case: &OperatorCase,
        left: TargetExpr,
        right: TargetExpr,
    ) -> Result<BinaryLowering, CompilerError> {
        let is_reference_operator = case.kind.family() == OperatorFamily::Reference;
        let is_equality = matches!(case.kind, OperatorKind::Equals | OperatorKind::NotEquals);
        let left_null = case.left.is_nothing_literal();
        let right_null = case.right.is_nothing_literal();

        if !is_reference_operator && !(is_equality && (left_null || right_null)) {
            return Ok(BinaryLowering::Native(left, right));
        }

        let negated = case.kind.is_negated();

        if left_null && right_null {
            return Ok(BinaryLowering::Substituted(LoweredOperator::boolean(
                TargetExpr::boolean(!negated),
            )));
        }

        if left_null || right_null {
            let (other, other_facts) = match left_null {
                true => (right, &case.right),
                false => (left, &case.left),
            };

            // Nothing compares equal to "" and to an unset late-bound value, not just to null
            if is_equality && (other_facts.is_string() || other_facts.is_dynamic()) {
                return Ok(match left_null {
                    true => BinaryLowering::Native(TargetExpr::null(), other),
                    false => BinaryLowering::Native(other, TargetExpr::null()),
                });
            }

            let check = self.null_check(other, other_facts, negated);
            return Ok(BinaryLowering::Substituted(LoweredOperator::boolean(check)));
        }

        if !is_reference_operator {
            return Ok(BinaryLowering::Native(left, right));
        }

        for facts in [&case.left, &case.right] {
            if let Some(ty) = facts.final_type() {
                if ty.is_value_type() {
                    return_unsupported_operator_error!(
                        format!("'{}' cannot compare a value of type '{}' by reference", case.kind, ty),
                        case.location.to_owned(),
                        {
                            OperatorKind => case.kind.to_string(),
                            FoundType => ty.to_string(),
                        }
                    );
                }
            }
        }

        let same_object = TargetExpr::call("object.ReferenceEquals", vec![left, right]);
        let expr = match negated {
            true => TargetExpr::unary(TargetUnaryOperator::Not, same_object),
            false => same_object,
        };

        Ok(BinaryLowering::Substituted(LoweredOperator::boolean(expr)))
    }

    fn null_check(&self, expr: TargetExpr, facts: &TypeFacts, negated: bool) -> TargetExpr {
        match facts.final_type() {
            Some(ty) if !ty.accepts_null() => {
                let op = match negated {
                    true => TargetBinaryOperator::NotEqual,
                    false => TargetBinaryOperator::Equal,
                };
                let default = TargetExpr::Default(self.pipeline.identities.target_name(ty));
                TargetExpr::binary(op, expr, default)
            }
            _ => TargetExpr::null_check(expr, negated),
        }
    }

    // ======================================================
    //                     FAMILIES
    // ======================================================

    fn lower_relational(
        &self,
        case: &OperatorCase,
        left: TargetExpr,
        right: TargetExpr,
        ctx: &LoweringContext,
        sink: &mut HoistingSink,
    ) -> BinaryLowering {
        let helpers = self.pipeline.helpers;
        let text_compare = TargetExpr::boolean(ctx.compare_method.is_text());

        if case.result_type.is_dynamic() || case.either_operand_dynamic() {
            let conditional = case.is_result_native_boolean() && !ctx.in_expression_tree;
            let helper = helpers.object_comparison(case.kind, conditional);
            let call = helpers.call(&helper, vec![left, right, text_compare], sink);

            return BinaryLowering::Substituted(match conditional {
                true => LoweredOperator::boolean(call),
                false => LoweredOperator::object(call),
            });
        }

        let native = case.kind.native_operator();
        if let (true, Some(native)) = (case.either_operand_string(), native) {
            let helper = helpers.string_comparison();
            let compare = helpers.call(&helper, vec![left, right, text_compare], sink);
            return BinaryLowering::Substituted(LoweredOperator::boolean(TargetExpr::binary(
                native,
                compare,
                TargetExpr::integer(0),
            )));
        }

        BinaryLowering::Native(left, right)
    }

    fn lower_arithmetic(
        &self,
        case: &OperatorCase,
        left: TargetExpr,
        right: TargetExpr,
        ctx: &LoweringContext,
        sink: &mut HoistingSink,
    ) -> Result<BinaryLowering, CompilerError> {
        let helpers = self.pipeline.helpers;

        if case.result_type.is_dynamic() || case.either_operand_dynamic() {
            if ctx.in_expression_tree {
                return_unsupported_operator_error!(
                    format!(
                        "Late-bound '{}' cannot be converted inside an expression tree",
                        case.kind
                    ),
                    case.location.to_owned(),
                    {
                        OperatorKind => case.kind.to_string(),
                        FoundType => case.result_type.to_string(),
                    }
                );
            }

            let helper = helpers.object_operator(case.kind);
            let call = helpers.call(&helper, vec![left, right], sink);
            return Ok(BinaryLowering::Substituted(LoweredOperator::object(call)));
        }

        if case.kind == OperatorKind::Exponent {
            let helper = helpers.power();
            let call = helpers.call(&helper, vec![left, right], sink);
            return Ok(BinaryLowering::Substituted(LoweredOperator::new(
                call,
                SemanticType::special(SpecialType::Double),
            )));
        }

        Ok(BinaryLowering::Native(left, right))
    }

    fn lower_concatenation(
        &self,
        case: &OperatorCase,
        left: TargetExpr,
        right: TargetExpr,
        sink: &mut HoistingSink,
    ) -> BinaryLowering {
        if case.result_type.is_dynamic() || case.either_operand_dynamic() {
            let helpers = self.pipeline.helpers;
            let helper = helpers.object_operator(case.kind);
            let call = helpers.call(&helper, vec![left, right], sink);
            return BinaryLowering::Substituted(LoweredOperator::object(call));
        }

        let is_text = |facts: &TypeFacts| facts.final_type().is_some_and(SemanticType::is_string);
        if is_text(&case.left) || is_text(&case.right) {
            return BinaryLowering::Native(left, right);
        }

        // Without a string operand the target's + would add numerically
        let left = self.to_text(left, &case.left, sink);
        let right = self.to_text(right, &case.right, sink);

        BinaryLowering::Substituted(LoweredOperator::new(
            TargetExpr::binary(TargetBinaryOperator::Add, left, right),
            SemanticType::string(),
        ))
    }

    fn lower_like(
        &self,
        case: &OperatorCase,
        left: TargetExpr,
        right: TargetExpr,
        ctx: &LoweringContext,
        sink: &mut HoistingSink,
    ) -> BinaryLowering {
        let helpers = self.pipeline.helpers;
        let late_bound = case.either_operand_dynamic();

        let helper = helpers.like(late_bound);
        let compare_method = helpers.compare_method(ctx.compare_method, sink);
        let call = helpers.call(&helper, vec![left, right, compare_method], sink);

        BinaryLowering::Substituted(match late_bound {
            true => LoweredOperator::object(call),
            false => LoweredOperator::boolean(call),
        })
    }

    fn lower_short_circuit(
        &self,
        case: &OperatorCase,
        left: TargetExpr,
        right: TargetExpr,
        sink: &mut HoistingSink,
    ) -> BinaryLowering {
        let native = case.kind.native_operator();
        let (true, Some(native)) = (case.either_operand_dynamic(), native) else {
            return BinaryLowering::Native(left, right);
        };

        let left = self.to_boolean(left, &case.left, sink);
        let right = self.to_boolean(right, &case.right, sink);

        BinaryLowering::Substituted(LoweredOperator::boolean(TargetExpr::binary(native, left, right)))
    }

    // ======================================================
    //                 OPERAND COERCION
    // ======================================================

    fn to_text(&self, expr: TargetExpr, facts: &TypeFacts, sink: &mut HoistingSink) -> TargetExpr {
        match facts.final_type() {
            Some(ty) => self.pipeline.convert_between(expr, ty, &SemanticType::string(), sink),
            None => expr,
        }
    }

    fn to_boolean(&self, expr: TargetExpr, facts: &TypeFacts, sink: &mut HoistingSink) -> TargetExpr {
        match facts.final_type() {
            Some(ty) => self.pipeline.convert_between(expr, ty, &SemanticType::boolean(), sink),
            None => expr,
        }
    }
}
