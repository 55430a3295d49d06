use crate::backends::target::target_expr::{TargetBinaryOperator, TargetExpr};
use crate::conversion_core::conversions::conversion_kind::ConversionKind;
use crate::conversion_core::conversions::literal_narrowing;
use crate::conversion_core::conversions::runtime_helpers::RuntimeHelpers;
use crate::conversion_core::hoisting::hoisting_sink::HoistingSink;
use crate::conversion_core::type_facts::semantic_types::SemanticType;
use crate::conversion_core::type_facts::type_identity::TypeIdentityTable;

/// Turns a classified conversion into target syntax around an already lowered expression.
///
/// Emission is idempotent: an expression that is already a cast to the target type,
/// or already a call to the matching helper, comes back unchanged.
pub struct ConversionEmitter<'a> {
    identities: &'a TypeIdentityTable,
    helpers: &'a RuntimeHelpers,
}

impl<'a> ConversionEmitter<'a> {
    pub fn new(identities: &'a TypeIdentityTable, helpers: &'a RuntimeHelpers) -> Self {
        ConversionEmitter {
            identities,
            helpers,
        }
    }

    pub fn emit(
        &self,
        kind: ConversionKind,
        expr: TargetExpr,
        source: &SemanticType,
        target: &SemanticType,
        sink: &mut HoistingSink,
    ) -> TargetExpr {
        match kind {
            ConversionKind::Unknown => expr,
            ConversionKind::Identity => literal_narrowing::narrow_literal(expr, target),
            ConversionKind::NonDestructiveCast | ConversionKind::DestructiveCast => {
                self.cast(expr, target)
            }
            ConversionKind::RuntimeConversion => self.runtime_conversion(expr, source, target, sink),

            ConversionKind::CastThenEnum => {
                let Some(underlying) = source.enum_underlying() else {
                    return self.runtime_conversion(expr, source, target, sink);
                };
                let underlying = SemanticType::special(underlying);
                let cast = self.emit(ConversionKind::NonDestructiveCast, expr, source, &underlying, sink);
                self.emit(ConversionKind::RuntimeConversion, cast, &underlying, target, sink)
            }

            ConversionKind::EnumThenCast => {
                let Some(underlying) = target.enum_underlying() else {
                    return self.cast(expr, target);
                };
                let underlying = SemanticType::special(underlying);
                let converted = self.emit(ConversionKind::RuntimeConversion, expr, source, &underlying, sink);
                self.emit(ConversionKind::NonDestructiveCast, converted, &underlying, target, sink)
            }

            ConversionKind::NullableToBooleanCompare => {
                TargetExpr::binary(TargetBinaryOperator::Equal, expr, TargetExpr::boolean(true))
            }

            ConversionKind::StringToCharArrayCall => {
                TargetExpr::member_call(expr, "ToCharArray", vec![])
            }
        }
    }

    fn cast(&self, expr: TargetExpr, target: &SemanticType) -> TargetExpr {
        let type_name = self.identities.target_name(target);
        if expr.is_cast_to(&type_name) {
            return expr;
        }

        TargetExpr::cast(type_name, expr)
    }

    fn runtime_conversion(
        &self,
        expr: TargetExpr,
        source: &SemanticType,
        target: &SemanticType,
        sink: &mut HoistingSink,
    ) -> TargetExpr {
        if target.is_string() && expr.is_to_string_call() {
            return expr;
        }

        // Numbers format the same way through their own ToString
        if target.is_string() && source.is_numeric() {
            return TargetExpr::member_call(expr, "ToString", vec![]);
        }

        let Some(helper) = self.helpers.conversion_helper(target) else {
            return self.cast(expr, target);
        };

        if expr.is_call_to(&helper.qualified_name()) {
            return expr;
        }

        self.helpers.call(helper, vec![expr], sink)
    }
}
