use crate::backends::target::target_expr::{TargetBinaryOperator, TargetUnaryOperator};
use crate::conversion_core::compiler_errors::TextLocation;
use crate::conversion_core::type_facts::semantic_types::SemanticType;
use crate::conversion_core::type_facts::type_facts::TypeFacts;
use crate::settings::CompareMethod;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,

    Add,
    Subtract,
    Multiply,
    Divide,
    IntegerDivide,
    Modulo,
    Exponent,
    LeftShift,
    RightShift,
    And,
    Or,
    ExclusiveOr,

    AndAlso,
    OrElse,

    Concatenate,
    Like,
    Is,
    IsNot,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperatorFamily {
    Relational,
    Arithmetic,
    Concatenation,
    Like,
    ShortCircuit,
    Reference,
}

impl OperatorKind {
    pub fn family(self) -> OperatorFamily {
        match self {
            OperatorKind::Equals
            | OperatorKind::NotEquals
            | OperatorKind::LessThan
            | OperatorKind::LessThanOrEqual
            | OperatorKind::GreaterThan
            | OperatorKind::GreaterThanOrEqual => OperatorFamily::Relational,
            OperatorKind::Add
            | OperatorKind::Subtract
            | OperatorKind::Multiply
            | OperatorKind::Divide
            | OperatorKind::IntegerDivide
            | OperatorKind::Modulo
            | OperatorKind::Exponent
            | OperatorKind::LeftShift
            | OperatorKind::RightShift
            | OperatorKind::And
            | OperatorKind::Or
            | OperatorKind::ExclusiveOr => OperatorFamily::Arithmetic,
            OperatorKind::AndAlso | OperatorKind::OrElse => OperatorFamily::ShortCircuit,
            OperatorKind::Concatenate => OperatorFamily::Concatenation,
            OperatorKind::Like => OperatorFamily::Like,
            OperatorKind::Is | OperatorKind::IsNot => OperatorFamily::Reference,
        }
    }

    /// Operators whose operand conversions are classified in an arithmetic context.
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            OperatorKind::Add
                | OperatorKind::Subtract
                | OperatorKind::Multiply
                | OperatorKind::Divide
                | OperatorKind::IntegerDivide
                | OperatorKind::Modulo
                | OperatorKind::Exponent
        )
    }

    pub fn is_negated(self) -> bool {
        matches!(self, OperatorKind::NotEquals | OperatorKind::IsNot)
    }

    /// The part of the runtime helper name that names the operator.
    pub fn helper_stem(self) -> &'static str {
        match self {
            OperatorKind::Equals => "Equal",
            OperatorKind::NotEquals => "NotEqual",
            OperatorKind::LessThan => "Less",
            OperatorKind::LessThanOrEqual => "LessEqual",
            OperatorKind::GreaterThan => "Greater",
            OperatorKind::GreaterThanOrEqual => "GreaterEqual",
            OperatorKind::Add => "Add",
            OperatorKind::Subtract => "Subtract",
            OperatorKind::Multiply => "Multiply",
            OperatorKind::Divide => "Divide",
            OperatorKind::IntegerDivide => "IntDivide",
            OperatorKind::Modulo => "Mod",
            OperatorKind::Exponent => "Exponent",
            OperatorKind::LeftShift => "LeftShift",
            OperatorKind::RightShift => "RightShift",
            OperatorKind::And => "And",
            OperatorKind::Or => "Or",
            OperatorKind::ExclusiveOr => "Xor",
            OperatorKind::AndAlso => "AndAlso",
            OperatorKind::OrElse => "OrElse",
            OperatorKind::Concatenate => "Concatenate",
            OperatorKind::Like => "Like",
            OperatorKind::Is => "Is",
            OperatorKind::IsNot => "IsNot",
        }
    }

    /// The target operator used when no runtime substitution is needed.
    pub fn native_operator(self) -> Option<TargetBinaryOperator> {
        let op = match self {
            OperatorKind::Equals => TargetBinaryOperator::Equal,
            OperatorKind::NotEquals => TargetBinaryOperator::NotEqual,
            OperatorKind::LessThan => TargetBinaryOperator::Less,
            OperatorKind::LessThanOrEqual => TargetBinaryOperator::LessEqual,
            OperatorKind::GreaterThan => TargetBinaryOperator::Greater,
            OperatorKind::GreaterThanOrEqual => TargetBinaryOperator::GreaterEqual,
            OperatorKind::Add | OperatorKind::Concatenate => TargetBinaryOperator::Add,
            OperatorKind::Subtract => TargetBinaryOperator::Subtract,
            OperatorKind::Multiply => TargetBinaryOperator::Multiply,
            OperatorKind::Divide | OperatorKind::IntegerDivide => TargetBinaryOperator::Divide,
            OperatorKind::Modulo => TargetBinaryOperator::Modulo,
            OperatorKind::LeftShift => TargetBinaryOperator::LeftShift,
            OperatorKind::RightShift => TargetBinaryOperator::RightShift,
            OperatorKind::And => TargetBinaryOperator::BitAnd,
            OperatorKind::Or => TargetBinaryOperator::BitOr,
            OperatorKind::ExclusiveOr => TargetBinaryOperator::BitXor,
            OperatorKind::AndAlso => TargetBinaryOperator::LogicalAnd,
            OperatorKind::OrElse => TargetBinaryOperator::LogicalOr,

            // Always lowered to a helper, a null check or an error
            OperatorKind::Exponent | OperatorKind::Like | OperatorKind::Is | OperatorKind::IsNot => {
                return None;
            }
        };

        Some(op)
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            OperatorKind::Equals => "=",
            OperatorKind::NotEquals => "<>",
            OperatorKind::LessThan => "<",
            OperatorKind::LessThanOrEqual => "<=",
            OperatorKind::GreaterThan => ">",
            OperatorKind::GreaterThanOrEqual => ">=",
            OperatorKind::Add => "+",
            OperatorKind::Subtract => "-",
            OperatorKind::Multiply => "*",
            OperatorKind::Divide => "/",
            OperatorKind::IntegerDivide => "\\",
            OperatorKind::Modulo => "Mod",
            OperatorKind::Exponent => "^",
            OperatorKind::LeftShift => "<<",
            OperatorKind::RightShift => ">>",
            OperatorKind::And => "And",
            OperatorKind::Or => "Or",
            OperatorKind::ExclusiveOr => "Xor",
            OperatorKind::AndAlso => "AndAlso",
            OperatorKind::OrElse => "OrElse",
            OperatorKind::Concatenate => "&",
            OperatorKind::Like => "Like",
            OperatorKind::Is => "Is",
            OperatorKind::IsNot => "IsNot",
        };
        write!(f, "{token}")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOperatorKind {
    Not,
    Negate,
    Plus,
}

impl UnaryOperatorKind {
    pub fn helper_stem(self) -> &'static str {
        match self {
            UnaryOperatorKind::Not => "Not",
            UnaryOperatorKind::Negate => "Negate",
            UnaryOperatorKind::Plus => "Plus",
        }
    }

    /// `Not` is logical on Boolean operands and bitwise on integral ones.
    pub fn native_operator(self, operand_is_boolean: bool) -> TargetUnaryOperator {
        match self {
            UnaryOperatorKind::Not if operand_is_boolean => TargetUnaryOperator::Not,
            UnaryOperatorKind::Not => TargetUnaryOperator::BitNot,
            UnaryOperatorKind::Negate => TargetUnaryOperator::Negate,
            UnaryOperatorKind::Plus => TargetUnaryOperator::Plus,
        }
    }
}

/// A binary operator node with the facts of both operands.
#[derive(Clone, Debug)]
pub struct OperatorCase {
    pub kind: OperatorKind,
    pub left: TypeFacts,
    pub right: TypeFacts,

    // The type the whole expression ends up with: its converted type when it has one
    pub result_type: SemanticType,
    pub location: TextLocation,
}

impl OperatorCase {
    pub fn new(kind: OperatorKind, left: TypeFacts, right: TypeFacts, result_type: SemanticType) -> Self {
        OperatorCase {
            kind,
            left,
            right,
            result_type,
            location: TextLocation::default(),
        }
    }

    pub fn at(mut self, location: TextLocation) -> Self {
        self.location = location;
        self
    }

    pub fn is_result_native_boolean(&self) -> bool {
        self.result_type.is_boolean()
    }

    pub fn either_operand_dynamic(&self) -> bool {
        self.left.is_dynamic() || self.right.is_dynamic()
    }

    pub fn either_operand_string(&self) -> bool {
        self.left.is_string() || self.right.is_string()
    }
}

#[derive(Clone, Debug)]
pub struct UnaryCase {
    pub kind: UnaryOperatorKind,
    pub operand: TypeFacts,
    pub result_type: SemanticType,
    pub location: TextLocation,
}

/// Ambient settings operator lowering reads but never changes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoweringContext {
    pub compare_method: CompareMethod,
    pub in_expression_tree: bool,
}
