//! Native conversion rules of both languages.
//!
//! Each side answers "what conversion does my own language apply between these two
//! types", using only its own model. The classifier compares the two answers.

use crate::conversion_core::type_facts::semantic_types::{SemanticType, SpecialType, TypeKind};
use crate::conversion_core::type_facts::type_identity::{TargetType, TargetTypeKind};

/// The source language's view of a conversion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SourceConversion {
    pub exists: bool,
    pub is_identity: bool,
    pub is_widening: bool,
    pub is_narrowing: bool,
    pub is_numeric: bool,
    pub is_string: bool,
    pub is_reference: bool,
}

impl SourceConversion {
    fn none() -> Self {
        SourceConversion::default()
    }

    fn identity() -> Self {
        SourceConversion {
            exists: true,
            is_identity: true,
            is_widening: true,
            ..SourceConversion::default()
        }
    }

    fn widening() -> Self {
        SourceConversion {
            exists: true,
            is_widening: true,
            ..SourceConversion::default()
        }
    }

    fn narrowing() -> Self {
        SourceConversion {
            exists: true,
            is_narrowing: true,
            ..SourceConversion::default()
        }
    }

    fn numeric(mut self) -> Self {
        self.is_numeric = true;
        self
    }

    fn string(mut self) -> Self {
        self.is_string = true;
        self
    }

    fn reference(mut self) -> Self {
        self.is_reference = true;
        self
    }
}

/// The target language's view of a conversion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TargetConversion {
    pub exists: bool,
    pub is_identity: bool,
    pub is_implicit: bool,
    pub is_explicit: bool,
    pub is_numeric: bool,
    pub is_enumeration: bool,
    pub is_boxing: bool,
    pub is_unboxing: bool,
    pub is_nullable: bool,
    pub is_reference: bool,
}

impl TargetConversion {
    fn none() -> Self {
        TargetConversion::default()
    }

    fn identity() -> Self {
        TargetConversion {
            exists: true,
            is_identity: true,
            is_implicit: true,
            ..TargetConversion::default()
        }
    }

    fn implicit() -> Self {
        TargetConversion {
            exists: true,
            is_implicit: true,
            ..TargetConversion::default()
        }
    }

    fn explicit() -> Self {
        TargetConversion {
            exists: true,
            is_explicit: true,
            ..TargetConversion::default()
        }
    }
}

// Source widening chain: every listed target is a widening destination
fn source_numeric_widens(from: SpecialType, to: SpecialType) -> bool {
    use SpecialType::*;

    let destinations: &[SpecialType] = match from {
        SByte => &[Int16, Int32, Int64, Decimal, Single, Double],
        Byte => &[Int16, UInt16, Int32, UInt32, Int64, UInt64, Decimal, Single, Double],
        Int16 => &[Int32, Int64, Decimal, Single, Double],
        UInt16 => &[Int32, UInt32, Int64, UInt64, Decimal, Single, Double],
        Int32 => &[Int64, Decimal, Single, Double],
        UInt32 => &[Int64, UInt64, Decimal, Single, Double],
        Int64 | UInt64 => &[Decimal, Single, Double],
        Decimal => &[Single, Double],
        Single => &[Double],
        _ => &[],
    };

    destinations.contains(&to)
}

// Target implicit numeric table. Char participates, Decimal to floating is explicit.
fn target_numeric_implicit(from: SpecialType, to: SpecialType) -> bool {
    use SpecialType::*;

    let destinations: &[SpecialType] = match from {
        SByte => &[Int16, Int32, Int64, Single, Double, Decimal],
        Byte => &[Int16, UInt16, Int32, UInt32, Int64, UInt64, Single, Double, Decimal],
        Int16 => &[Int32, Int64, Single, Double, Decimal],
        UInt16 => &[Int32, UInt32, Int64, UInt64, Single, Double, Decimal],
        Char => &[UInt16, Int32, UInt32, Int64, UInt64, Single, Double, Decimal],
        Int32 => &[Int64, Single, Double, Decimal],
        UInt32 => &[Int64, UInt64, Single, Double, Decimal],
        Int64 | UInt64 => &[Single, Double, Decimal],
        Single => &[Double],
        _ => &[],
    };

    destinations.contains(&to)
}

/// What conversion the source language applies from `from` to `to`.
pub fn classify_source_conversion(from: &SemanticType, to: &SemanticType) -> SourceConversion {
    if from.same_identity(to) {
        return SourceConversion::identity();
    }

    if to.is_dynamic() {
        return SourceConversion::widening().reference();
    }

    if from.is_dynamic() {
        return SourceConversion::narrowing().reference();
    }

    // Nullable lifting follows the underlying conversion
    match (from.nullable_inner(), to.nullable_inner()) {
        (Some(inner_from), Some(inner_to)) => {
            let mut inner = classify_source_conversion(inner_from, inner_to);
            inner.is_numeric = false;
            return inner;
        }
        (None, Some(inner_to)) => {
            let inner = classify_source_conversion(from, inner_to);
            return match inner {
                SourceConversion { exists: false, .. } => SourceConversion::none(),
                SourceConversion {
                    is_widening: true, ..
                } => SourceConversion::widening(),
                _ => SourceConversion::narrowing(),
            };
        }
        (Some(inner_from), None) => {
            return match classify_source_conversion(inner_from, to).exists {
                true => SourceConversion::narrowing(),
                false => SourceConversion::none(),
            };
        }
        (None, None) => {}
    }

    if from.is_numeric_or_enum() && to.is_numeric_or_enum() {
        if to.is_enum() {
            return SourceConversion::narrowing().numeric();
        }

        let from_special = from
            .enum_underlying()
            .or(from.as_special())
            .unwrap_or(SpecialType::Object);
        let to_special = to.as_special().unwrap_or(SpecialType::Object);

        return match from_special == to_special || source_numeric_widens(from_special, to_special) {
            true => SourceConversion::widening().numeric(),
            false => SourceConversion::narrowing().numeric(),
        };
    }

    // Boolean converts to and from every numeric type by narrowing
    if (from.is_boolean() && to.is_numeric_or_enum()) || (from.is_numeric_or_enum() && to.is_boolean()) {
        return SourceConversion::narrowing();
    }

    if from.is_special(SpecialType::Char) && to.is_string() {
        return SourceConversion::widening().string();
    }

    if from.is_char_array() && to.is_string() {
        return SourceConversion::widening().string();
    }

    if from.is_string() && (to.is_char_array() || to.is_special(SpecialType::Char)) {
        return SourceConversion::narrowing().string();
    }

    // String converts by narrowing to and from the primitive value types
    let is_string_convertible = |ty: &SemanticType| {
        ty.is_numeric_or_enum() || ty.is_boolean() || ty.is_special(SpecialType::DateTime)
    };
    if (from.is_string() && is_string_convertible(to)) || (to.is_string() && is_string_convertible(from)) {
        return SourceConversion::narrowing().string();
    }

    classify_source_reference_conversion(from, to)
}

fn classify_source_reference_conversion(from: &SemanticType, to: &SemanticType) -> SourceConversion {
    match (&from.kind, &to.kind) {
        (TypeKind::Class { .. }, TypeKind::Class { .. } | TypeKind::Interface) => {
            if from.bases().contains(&to.qualified_name) {
                SourceConversion::widening().reference()
            } else if to.bases().contains(&from.qualified_name) || matches!(to.kind, TypeKind::Interface) {
                SourceConversion::narrowing().reference()
            } else {
                SourceConversion::none()
            }
        }
        (TypeKind::Interface, TypeKind::Class { .. } | TypeKind::Interface) => {
            SourceConversion::narrowing().reference()
        }
        (
            TypeKind::Array {
                element: from_element,
                rank: from_rank,
            },
            TypeKind::Array {
                element: to_element,
                rank: to_rank,
            },
        ) if from_rank == to_rank && from_element.is_reference_type() && to_element.is_reference_type() => {
            let element = classify_source_conversion(from_element, to_element);
            if !element.exists {
                return SourceConversion::none();
            }

            match element.is_widening {
                true => SourceConversion::widening().reference(),
                false => SourceConversion::narrowing().reference(),
            }
        }
        _ => SourceConversion::none(),
    }
}

/// What conversion the target language applies from `from` to `to`.
pub fn classify_target_conversion(from: &TargetType, to: &TargetType) -> TargetConversion {
    if from.same_identity(to) {
        return TargetConversion::identity();
    }

    if to.is_object() {
        let mut conversion = TargetConversion::implicit();
        match from.is_value_type() {
            true => conversion.is_boxing = true,
            false => conversion.is_reference = true,
        }
        return conversion;
    }

    if from.is_object() {
        let mut conversion = TargetConversion::explicit();
        match to.is_value_type() {
            true => conversion.is_unboxing = true,
            false => conversion.is_reference = true,
        }
        return conversion;
    }

    match (&from.kind, &to.kind) {
        (TargetTypeKind::Nullable(inner_from), TargetTypeKind::Nullable(inner_to)) => {
            let inner = classify_target_conversion(inner_from, inner_to);
            if !inner.exists {
                return TargetConversion::none();
            }
            let mut conversion = match inner.is_implicit {
                true => TargetConversion::implicit(),
                false => TargetConversion::explicit(),
            };
            conversion.is_nullable = true;
            return conversion;
        }
        (_, TargetTypeKind::Nullable(inner_to)) => {
            let inner = classify_target_conversion(from, inner_to);
            if !inner.exists {
                return TargetConversion::none();
            }
            let mut conversion = match inner.is_implicit {
                true => TargetConversion::implicit(),
                false => TargetConversion::explicit(),
            };
            conversion.is_nullable = true;
            return conversion;
        }
        (TargetTypeKind::Nullable(inner_from), _) => {
            if !classify_target_conversion(inner_from, to).exists {
                return TargetConversion::none();
            }
            let mut conversion = TargetConversion::explicit();
            conversion.is_nullable = true;
            return conversion;
        }
        _ => {}
    }

    if from.is_numeric() && to.is_numeric() {
        let (Some(from_special), Some(to_special)) = (from.as_primitive(), to.as_primitive()) else {
            return TargetConversion::none();
        };
        let mut conversion = match target_numeric_implicit(from_special, to_special) {
            true => TargetConversion::implicit(),
            false => TargetConversion::explicit(),
        };
        conversion.is_numeric = true;
        return conversion;
    }

    if (from.is_enum() && (to.is_numeric() || to.is_enum())) || (to.is_enum() && from.is_numeric()) {
        let mut conversion = TargetConversion::explicit();
        conversion.is_enumeration = true;
        return conversion;
    }

    classify_target_reference_conversion(from, to)
}

fn classify_target_reference_conversion(from: &TargetType, to: &TargetType) -> TargetConversion {
    let reference = |mut conversion: TargetConversion| {
        conversion.is_reference = true;
        conversion
    };

    match (&from.kind, &to.kind) {
        (TargetTypeKind::Class { .. }, TargetTypeKind::Class { .. } | TargetTypeKind::Interface) => {
            if from.bases().contains(&to.qualified_name) {
                reference(TargetConversion::implicit())
            } else if to.bases().contains(&from.qualified_name)
                || matches!(to.kind, TargetTypeKind::Interface)
            {
                reference(TargetConversion::explicit())
            } else {
                TargetConversion::none()
            }
        }
        (TargetTypeKind::Interface, TargetTypeKind::Class { .. } | TargetTypeKind::Interface) => {
            reference(TargetConversion::explicit())
        }
        (
            TargetTypeKind::Array {
                element: from_element,
                rank: from_rank,
            },
            TargetTypeKind::Array {
                element: to_element,
                rank: to_rank,
            },
        ) if from_rank == to_rank
            && from_element.is_reference_type()
            && to_element.is_reference_type() =>
        {
            let element = classify_target_conversion(from_element, to_element);
            if !element.exists {
                return TargetConversion::none();
            }

            match element.is_implicit {
                true => reference(TargetConversion::implicit()),
                false => reference(TargetConversion::explicit()),
            }
        }
        _ => TargetConversion::none(),
    }
}
