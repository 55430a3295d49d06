//! Target-language expression tree.
//!
//! Lowering builds these nodes instead of strings so later passes can inspect what
//! was already emitted (an existing cast, helper call or `.ToString()`), and so
//! parentheses are decided once, by precedence, when the tree is printed.

#[derive(Clone, Debug, PartialEq)]
pub enum TargetLiteral {
    Null,
    Boolean(bool),
    Integer(i64),

    // An integral value spelled with a real-number suffix: `1d`, `1f`, `1m`
    Suffixed(i64, &'static str),
    Floating(f64),
    Char(char),
    Text(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetBinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    LeftShift,
    RightShift,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
    BitAnd,
    BitXor,
    BitOr,
    LogicalAnd,
    LogicalOr,
}

impl TargetBinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            TargetBinaryOperator::Add => "+",
            TargetBinaryOperator::Subtract => "-",
            TargetBinaryOperator::Multiply => "*",
            TargetBinaryOperator::Divide => "/",
            TargetBinaryOperator::Modulo => "%",
            TargetBinaryOperator::LeftShift => "<<",
            TargetBinaryOperator::RightShift => ">>",
            TargetBinaryOperator::Less => "<",
            TargetBinaryOperator::LessEqual => "<=",
            TargetBinaryOperator::Greater => ">",
            TargetBinaryOperator::GreaterEqual => ">=",
            TargetBinaryOperator::Equal => "==",
            TargetBinaryOperator::NotEqual => "!=",
            TargetBinaryOperator::BitAnd => "&",
            TargetBinaryOperator::BitXor => "^",
            TargetBinaryOperator::BitOr => "|",
            TargetBinaryOperator::LogicalAnd => "&&",
            TargetBinaryOperator::LogicalOr => "||",
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            TargetBinaryOperator::Multiply
            | TargetBinaryOperator::Divide
            | TargetBinaryOperator::Modulo => precedence::MULTIPLICATIVE,
            TargetBinaryOperator::Add | TargetBinaryOperator::Subtract => precedence::ADDITIVE,
            TargetBinaryOperator::LeftShift | TargetBinaryOperator::RightShift => precedence::SHIFT,
            TargetBinaryOperator::Less
            | TargetBinaryOperator::LessEqual
            | TargetBinaryOperator::Greater
            | TargetBinaryOperator::GreaterEqual => precedence::RELATIONAL,
            TargetBinaryOperator::Equal | TargetBinaryOperator::NotEqual => precedence::EQUALITY,
            TargetBinaryOperator::BitAnd => precedence::BIT_AND,
            TargetBinaryOperator::BitXor => precedence::BIT_XOR,
            TargetBinaryOperator::BitOr => precedence::BIT_OR,
            TargetBinaryOperator::LogicalAnd => precedence::LOGICAL_AND,
            TargetBinaryOperator::LogicalOr => precedence::LOGICAL_OR,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetUnaryOperator {
    Not,
    BitNot,
    Negate,
    Plus,
}

impl TargetUnaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            TargetUnaryOperator::Not => "!",
            TargetUnaryOperator::BitNot => "~",
            TargetUnaryOperator::Negate => "-",
            TargetUnaryOperator::Plus => "+",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArgumentModifier {
    Ref,
    Out,
}

pub mod precedence {
    pub const ASSIGNMENT: u8 = 1;
    pub const LOGICAL_OR: u8 = 4;
    pub const LOGICAL_AND: u8 = 5;
    pub const BIT_OR: u8 = 6;
    pub const BIT_XOR: u8 = 7;
    pub const BIT_AND: u8 = 8;
    pub const EQUALITY: u8 = 9;
    pub const RELATIONAL: u8 = 10;
    pub const SHIFT: u8 = 11;
    pub const ADDITIVE: u8 = 12;
    pub const MULTIPLICATIVE: u8 = 13;
    pub const UNARY: u8 = 14;
    pub const PRIMARY: u8 = 15;
}

#[derive(Clone, Debug, PartialEq)]
pub enum TargetExpr {
    Identifier(String),
    Literal(TargetLiteral),
    Cast {
        target_type: String,
        expr: Box<TargetExpr>,
    },
    // Static or free call, the callee is already a qualified name
    Call {
        callee: String,
        args: Vec<TargetExpr>,
    },
    MemberCall {
        target: Box<TargetExpr>,
        name: String,
        args: Vec<TargetExpr>,
    },
    // Call through an arbitrary callee expression
    Invoke {
        callee: Box<TargetExpr>,
        args: Vec<TargetExpr>,
    },
    MemberAccess {
        target: Box<TargetExpr>,
        name: String,
    },
    ElementAccess {
        target: Box<TargetExpr>,
        indices: Vec<TargetExpr>,
    },
    Binary {
        op: TargetBinaryOperator,
        left: Box<TargetExpr>,
        right: Box<TargetExpr>,
    },
    Unary {
        op: TargetUnaryOperator,
        operand: Box<TargetExpr>,
    },
    // `x is null` / `x is not null`
    NullCheck {
        expr: Box<TargetExpr>,
        negated: bool,
    },
    Default(String),
    Argument {
        modifier: ArgumentModifier,
        expr: Box<TargetExpr>,
    },
    Assignment {
        target: Box<TargetExpr>,
        value: Box<TargetExpr>,
    },
}

impl TargetExpr {
    pub fn identifier(name: impl Into<String>) -> Self {
        TargetExpr::Identifier(name.into())
    }

    pub fn boolean(value: bool) -> Self {
        TargetExpr::Literal(TargetLiteral::Boolean(value))
    }

    pub fn integer(value: i64) -> Self {
        TargetExpr::Literal(TargetLiteral::Integer(value))
    }

    pub fn text(value: impl Into<String>) -> Self {
        TargetExpr::Literal(TargetLiteral::Text(value.into()))
    }

    pub fn null() -> Self {
        TargetExpr::Literal(TargetLiteral::Null)
    }

    pub fn cast(target_type: impl Into<String>, expr: TargetExpr) -> Self {
        TargetExpr::Cast {
            target_type: target_type.into(),
            expr: Box::new(expr),
        }
    }

    pub fn call(callee: impl Into<String>, args: Vec<TargetExpr>) -> Self {
        TargetExpr::Call {
            callee: callee.into(),
            args,
        }
    }

    pub fn member_call(target: TargetExpr, name: impl Into<String>, args: Vec<TargetExpr>) -> Self {
        TargetExpr::MemberCall {
            target: Box::new(target),
            name: name.into(),
            args,
        }
    }

    /// A call through a lowered callee: a plain name becomes a free call and a member
    /// access a member call.
    pub fn invoke(callee: TargetExpr, args: Vec<TargetExpr>) -> Self {
        match callee {
            TargetExpr::Identifier(name) => TargetExpr::Call { callee: name, args },
            TargetExpr::MemberAccess { target, name } => TargetExpr::MemberCall { target, name, args },
            callee => TargetExpr::Invoke {
                callee: Box::new(callee),
                args,
            },
        }
    }

    pub fn member(target: TargetExpr, name: impl Into<String>) -> Self {
        TargetExpr::MemberAccess {
            target: Box::new(target),
            name: name.into(),
        }
    }

    pub fn binary(op: TargetBinaryOperator, left: TargetExpr, right: TargetExpr) -> Self {
        TargetExpr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: TargetUnaryOperator, operand: TargetExpr) -> Self {
        TargetExpr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn null_check(expr: TargetExpr, negated: bool) -> Self {
        TargetExpr::NullCheck {
            expr: Box::new(expr),
            negated,
        }
    }

    pub fn argument(modifier: ArgumentModifier, expr: TargetExpr) -> Self {
        TargetExpr::Argument {
            modifier,
            expr: Box::new(expr),
        }
    }

    pub fn is_cast_to(&self, type_name: &str) -> bool {
        matches!(self, TargetExpr::Cast { target_type, .. } if target_type == type_name)
    }

    /// A single-argument call to the named helper, e.g. `Conversions.ToInteger(x)`.
    pub fn is_call_to(&self, helper: &str) -> bool {
        matches!(self, TargetExpr::Call { callee, args } if callee == helper && args.len() == 1)
    }

    pub fn is_to_string_call(&self) -> bool {
        matches!(
            self,
            TargetExpr::MemberCall { name, args, .. } if name == "ToString" && args.is_empty()
        )
    }

    pub fn precedence(&self) -> u8 {
        match self {
            TargetExpr::Literal(TargetLiteral::Integer(value) | TargetLiteral::Suffixed(value, _))
                if *value < 0 =>
            {
                precedence::UNARY
            }
            TargetExpr::Literal(TargetLiteral::Floating(value)) if value.is_sign_negative() => {
                precedence::UNARY
            }
            TargetExpr::Identifier(_)
            | TargetExpr::Literal(_)
            | TargetExpr::Call { .. }
            | TargetExpr::MemberCall { .. }
            | TargetExpr::Invoke { .. }
            | TargetExpr::MemberAccess { .. }
            | TargetExpr::ElementAccess { .. }
            | TargetExpr::Default(_) => precedence::PRIMARY,
            TargetExpr::Cast { .. } | TargetExpr::Unary { .. } | TargetExpr::Argument { .. } => {
                precedence::UNARY
            }
            TargetExpr::Binary { op, .. } => op.precedence(),
            TargetExpr::NullCheck { .. } => precedence::RELATIONAL,
            TargetExpr::Assignment { .. } => precedence::ASSIGNMENT,
        }
    }
}
