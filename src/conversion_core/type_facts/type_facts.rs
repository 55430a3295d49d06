use crate::conversion_core::type_facts::semantic_types::{SemanticType, SpecialType};
use serde::{Deserialize, Serialize};

/// Compile-time constant values reported by the facts provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstantValue {
    Nothing,
    Boolean(bool),
    Integer(i64),
    Floating(f64),
    Char(char),
    Text(String),
}

impl ConstantValue {
    pub fn is_nothing(&self) -> bool {
        matches!(self, ConstantValue::Nothing)
    }

    pub fn as_integer(&self) -> Option<i128> {
        match self {
            ConstantValue::Integer(value) => Some(*value as i128),
            _ => None,
        }
    }

    /// The single character of a one-character text constant.
    pub fn single_char(&self) -> Option<char> {
        let ConstantValue::Text(text) = self else {
            return None;
        };

        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Some(ch),
            _ => None,
        }
    }

    /// Whether the exact value is representable in `target` without any change.
    pub fn fits(&self, target: &SemanticType) -> bool {
        let Some(special) = target.as_special() else {
            return false;
        };

        match self {
            ConstantValue::Integer(value) => {
                let value = *value as i128;
                match special.integral_range() {
                    Some((min, max)) => value >= min && value <= max,
                    None => match special {
                        // Every i64 is exact in Decimal, floating targets need the mantissa
                        SpecialType::Decimal => true,
                        SpecialType::Double => value.unsigned_abs() <= (1u128 << 53),
                        SpecialType::Single => value.unsigned_abs() <= (1u128 << 24),
                        _ => false,
                    },
                }
            }
            ConstantValue::Floating(value) => match special {
                SpecialType::Double => true,
                SpecialType::Single => value.is_finite() && (*value as f32) as f64 == *value,
                _ => false,
            },
            ConstantValue::Char(_) => special == SpecialType::Char,
            ConstantValue::Boolean(_) => special == SpecialType::Boolean,
            ConstantValue::Text(_) => special == SpecialType::String,
            ConstantValue::Nothing => false,
        }
    }
}

/// Everything the facts provider knows about one expression node.
/// Immutable: callers that know a better type pair force it through `ClassifyOptions`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeFacts {
    #[serde(default)]
    pub source_type: Option<SemanticType>,
    #[serde(default)]
    pub converted_type: Option<SemanticType>,
    #[serde(default)]
    pub constant: Option<ConstantValue>,
    #[serde(default)]
    pub is_literal: bool,
    #[serde(default)]
    pub is_const_context: bool,
}

impl TypeFacts {
    pub fn new(source_type: SemanticType) -> Self {
        TypeFacts {
            source_type: Some(source_type),
            ..TypeFacts::default()
        }
    }

    pub fn conversion(source_type: SemanticType, converted_type: SemanticType) -> Self {
        TypeFacts {
            source_type: Some(source_type),
            converted_type: Some(converted_type),
            ..TypeFacts::default()
        }
    }

    pub fn literal(source_type: SemanticType, constant: ConstantValue) -> Self {
        TypeFacts {
            source_type: Some(source_type),
            constant: Some(constant),
            is_literal: true,
            ..TypeFacts::default()
        }
    }

    pub fn converted_to(mut self, converted_type: SemanticType) -> Self {
        self.converted_type = Some(converted_type);
        self
    }

    pub fn in_const_context(mut self) -> Self {
        self.is_const_context = true;
        self
    }

    /// The type the expression ends up with at its boundary.
    pub fn final_type(&self) -> Option<&SemanticType> {
        self.converted_type.as_ref().or(self.source_type.as_ref())
    }

    pub fn is_dynamic(&self) -> bool {
        self.source_type.as_ref().is_some_and(SemanticType::is_dynamic)
    }

    pub fn is_string(&self) -> bool {
        self.source_type.as_ref().is_some_and(SemanticType::is_string)
    }

    pub fn is_nothing_literal(&self) -> bool {
        self.constant.as_ref().is_some_and(ConstantValue::is_nothing)
    }
}
