//! Literals whose value already fits the destination are re-emitted in the
//! destination's own literal form instead of being converted at runtime.

use crate::backends::target::target_expr::{TargetExpr, TargetLiteral};
use crate::conversion_core::type_facts::semantic_types::{SemanticType, SpecialType};
use crate::conversion_core::type_facts::type_facts::{ConstantValue, TypeFacts};
use crate::conversion_core::type_facts::type_identity::TypeIdentityTable;

/// An integral literal whose exact value fits a numeric destination.
pub fn is_retypable_integral_literal(facts: &TypeFacts, target: &SemanticType) -> bool {
    if !facts.is_literal || !target.is_numeric() {
        return false;
    }

    match &facts.constant {
        Some(constant @ ConstantValue::Integer(_)) => constant.fits(target),
        _ => false,
    }
}

/// A one-character string literal, which can be emitted as a char literal.
pub fn is_single_char_literal(facts: &TypeFacts) -> bool {
    facts.is_literal
        && facts
            .constant
            .as_ref()
            .and_then(ConstantValue::single_char)
            .is_some()
}

/// The target literal for a constant, in the form its destination type expects.
pub fn literal_expr(
    constant: &ConstantValue,
    destination: Option<&SemanticType>,
    identities: &TypeIdentityTable,
) -> TargetExpr {
    let to_char = destination.is_some_and(|ty| ty.is_special(SpecialType::Char));

    match constant {
        ConstantValue::Nothing => match destination {
            Some(ty) if ty.is_value_type() && ty.nullable_inner().is_none() => {
                TargetExpr::Default(identities.target_name(ty))
            }
            _ => TargetExpr::null(),
        },
        ConstantValue::Boolean(value) => TargetExpr::boolean(*value),
        ConstantValue::Integer(value) => TargetExpr::integer(*value),
        ConstantValue::Floating(value) => TargetExpr::Literal(TargetLiteral::Floating(*value)),
        ConstantValue::Char(value) => TargetExpr::Literal(TargetLiteral::Char(*value)),
        ConstantValue::Text(text) => match constant.single_char() {
            Some(ch) if to_char => TargetExpr::Literal(TargetLiteral::Char(ch)),
            _ => TargetExpr::text(text.as_str()),
        },
    }
}

/// Re-types an already emitted literal for an identity conversion to `target`.
pub fn narrow_literal(expr: TargetExpr, target: &SemanticType) -> TargetExpr {
    match (&expr, target.as_special()) {
        (TargetExpr::Literal(TargetLiteral::Text(text)), Some(SpecialType::Char)) => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => TargetExpr::Literal(TargetLiteral::Char(ch)),
                _ => expr,
            }
        }

        // An unsuffixed integral literal would keep integer semantics in the target,
        // `1 / 3` must stay a real division
        (TargetExpr::Literal(TargetLiteral::Integer(value)), Some(special)) => {
            match real_literal_suffix(special) {
                Some(suffix) => TargetExpr::Literal(TargetLiteral::Suffixed(*value, suffix)),
                None => expr,
            }
        }

        _ => expr,
    }
}

fn real_literal_suffix(special: SpecialType) -> Option<&'static str> {
    match special {
        SpecialType::Double => Some("d"),
        SpecialType::Single => Some("f"),
        SpecialType::Decimal => Some("m"),
        _ => None,
    }
}
