//! Decides how a source conversion is carried into the target language.
//!
//! Both languages are asked what they would do natively with the same pair of
//! types. Where the answers agree nothing is emitted; where they differ the source
//! semantics are preserved with a cast or a runtime helper call.

use crate::conversion_core::conversions::conversion_kind::ConversionKind;
use crate::conversion_core::conversions::literal_narrowing;
use crate::conversion_core::conversions::runtime_helpers::RuntimeHelpers;
use crate::conversion_core::type_facts::native_conversions::{
    SourceConversion, classify_source_conversion, classify_target_conversion,
};
use crate::conversion_core::type_facts::semantic_types::{SemanticType, SpecialType};
use crate::conversion_core::type_facts::type_facts::TypeFacts;
use crate::conversion_core::type_facts::type_identity::TypeIdentityTable;
use crate::conversion_log;

/// Overrides for a single classification. Facts are never mutated; a caller that
/// knows better (an operator forcing both operands to a common type) passes the pair here.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClassifyOptions<'t> {
    // Never return Unknown when a narrowing-free fallback exists
    pub always_explicit: bool,
    pub is_const: bool,

    // The conversion is an operand of an arithmetic operator
    pub arithmetic_operator: bool,

    // The converted value is the result of a native operator, which the target
    // computes in Int32 for anything smaller
    pub operator_result: bool,
    pub forced_source: Option<&'t SemanticType>,
    pub forced_target: Option<&'t SemanticType>,
}

impl<'t> ClassifyOptions<'t> {
    pub fn forced(source: &'t SemanticType, target: &'t SemanticType) -> Self {
        ClassifyOptions {
            forced_source: Some(source),
            forced_target: Some(target),
            ..ClassifyOptions::default()
        }
    }

    pub fn arithmetic(mut self, arithmetic_operator: bool) -> Self {
        self.arithmetic_operator = arithmetic_operator;
        self
    }

    pub fn operator_result(mut self, operator_result: bool) -> Self {
        self.operator_result = operator_result;
        self
    }
}

pub struct ConversionClassifier<'a> {
    identities: &'a TypeIdentityTable,
    helpers: &'a RuntimeHelpers,
}

impl<'a> ConversionClassifier<'a> {
    pub fn new(identities: &'a TypeIdentityTable, helpers: &'a RuntimeHelpers) -> Self {
        ConversionClassifier {
            identities,
            helpers,
        }
    }

    pub fn classify(&self, facts: &TypeFacts, options: &ClassifyOptions) -> ConversionKind {
        let source = options.forced_source.or(facts.source_type.as_ref());
        let target = options.forced_target.or(facts.converted_type.as_ref());

        let (Some(source), Some(target)) = (source, target) else {
            return ConversionKind::Unknown;
        };

        let kind = self.classify_types(source, target, facts, options);
        conversion_log!(format!("[Conversion] {source} -> {target}: {kind}"));
        kind
    }

    fn classify_types(
        &self,
        source: &SemanticType,
        target: &SemanticType,
        facts: &TypeFacts,
        options: &ClassifyOptions,
    ) -> ConversionKind {
        if let Some(kind) = classify_enum_source(source, target) {
            return kind;
        }

        if literal_narrowing::is_retypable_integral_literal(facts, target) {
            return ConversionKind::Identity;
        }

        // Byte + Byte is a Byte in the source but an Int32 in the target, even
        // when the facts record no conversion at all
        if options.operator_result && source.is_numeric() && target.is_numeric() && widens_to_int32(target) {
            return ConversionKind::RuntimeConversion;
        }

        if let Some(kind) = self.classify_with_target_rules(source, target, facts, options) {
            return kind;
        }

        classify_with_source_rules(source, target, options)
    }

    /// Compares both languages' native answers. None when the target type model
    /// does not know one of the types, or no rule matched.
    fn classify_with_target_rules(
        &self,
        source: &SemanticType,
        target: &SemanticType,
        facts: &TypeFacts,
        options: &ClassifyOptions,
    ) -> Option<ConversionKind> {
        let target_side_source = self.identities.resolve(source)?;
        let target_side_target = self.identities.resolve(target)?;

        let source_rules = classify_source_conversion(source, target);
        let target_rules = classify_target_conversion(&target_side_source, &target_side_target);

        let is_const = options.is_const || facts.is_const_context;
        let constant_fits = facts
            .constant
            .as_ref()
            .is_some_and(|constant| constant.fits(target));

        // A cast from the universal type would skip the runtime's value conversions
        let late_bound_with_helper = source.is_dynamic()
            && target_rules.is_explicit
            && self.helpers.has_conversion_helper(target);

        if !target_rules.exists || target_rules.is_unboxing || late_bound_with_helper {
            if literal_narrowing::is_single_char_literal(facts) && target.is_special(SpecialType::Char) {
                return Some(ConversionKind::Identity);
            }

            if !target_rules.exists && source.is_string() && target.is_char_array() {
                return Some(ConversionKind::StringToCharArrayCall);
            }

            if !target_rules.exists || source_rules.is_narrowing {
                if target.is_enum() && !target_rules.exists {
                    return Some(ConversionKind::EnumThenCast);
                }
                return Some(ConversionKind::RuntimeConversion);
            }

            return None;
        }

        if source_rules.is_widening
            && source_rules.is_numeric
            && target_rules.is_implicit
            && target_rules.is_numeric
        {
            return Some(ConversionKind::NonDestructiveCast);
        }

        if (target_rules.is_explicit && target_rules.is_enumeration) || target_rules.is_boxing {
            return Some(ConversionKind::NonDestructiveCast);
        }

        if options.arithmetic_operator
            && source_rules.is_numeric
            && target_rules.is_numeric
            && widens_to_int32(target)
        {
            return Some(ConversionKind::RuntimeConversion);
        }

        if target_rules.is_explicit && target_rules.is_numeric && source_rules.is_narrowing && is_const {
            return match constant_fits {
                true => Some(ConversionKind::Identity),
                false => Some(ConversionKind::NonDestructiveCast),
            };
        }

        if target_rules.is_explicit && source_rules.is_numeric && !source.is_enum() {
            return match is_const && constant_fits {
                true => Some(ConversionKind::Identity),
                false => Some(ConversionKind::RuntimeConversion),
            };
        }

        if source.is_nullable_boolean() && target.is_boolean() {
            return Some(ConversionKind::NullableToBooleanCompare);
        }

        if target_rules.is_explicit {
            return Some(ConversionKind::DestructiveCast);
        }

        None
    }
}

// Enums are converted by the rules of their underlying type
fn classify_enum_source(source: &SemanticType, target: &SemanticType) -> Option<ConversionKind> {
    if !source.is_enum() {
        return None;
    }

    if source.same_identity(target) || target.is_dynamic() {
        return Some(ConversionKind::Identity);
    }

    if target.is_numeric() {
        return Some(ConversionKind::NonDestructiveCast);
    }

    if target.is_string() {
        return Some(ConversionKind::CastThenEnum);
    }

    Some(ConversionKind::RuntimeConversion)
}

// Byte, SByte, Int16 and UInt16 operands are promoted before arithmetic
fn widens_to_int32(target: &SemanticType) -> bool {
    let promotion: SourceConversion = classify_source_conversion(target, &SemanticType::int32());
    promotion.is_widening && !promotion.is_identity
}

// Used when the target type model cannot resolve one of the types
fn classify_with_source_rules(
    source: &SemanticType,
    target: &SemanticType,
    options: &ClassifyOptions,
) -> ConversionKind {
    let source_rules = classify_source_conversion(source, target);

    if source_rules.is_identity {
        return ConversionKind::Identity;
    }

    if source_rules.is_numeric && (source.is_enum() || target.is_enum()) {
        return ConversionKind::NonDestructiveCast;
    }

    if source_rules.is_narrowing {
        return ConversionKind::DestructiveCast;
    }

    if options.always_explicit {
        return ConversionKind::NonDestructiveCast;
    }

    ConversionKind::Unknown
}
