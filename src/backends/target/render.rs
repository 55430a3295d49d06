use crate::backends::target::target_expr::{
    ArgumentModifier, TargetExpr, TargetLiteral, precedence,
};
use std::fmt;

impl fmt::Display for TargetExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetExpr::Identifier(name) => write!(f, "{name}"),
            TargetExpr::Literal(literal) => write!(f, "{literal}"),

            TargetExpr::Cast { target_type, expr } => {
                // Anything but a primary operand is wrapped so `(T)-x` never parses as a subtraction
                write!(f, "({target_type})")?;
                write_operand(f, expr, precedence::PRIMARY)
            }

            TargetExpr::Call { callee, args } => {
                write!(f, "{callee}(")?;
                write_arguments(f, args)?;
                write!(f, ")")
            }

            TargetExpr::MemberCall { target, name, args } => {
                write_operand(f, target, precedence::PRIMARY)?;
                write!(f, ".{name}(")?;
                write_arguments(f, args)?;
                write!(f, ")")
            }

            TargetExpr::Invoke { callee, args } => {
                write_operand(f, callee, precedence::PRIMARY)?;
                write!(f, "(")?;
                write_arguments(f, args)?;
                write!(f, ")")
            }

            TargetExpr::MemberAccess { target, name } => {
                write_operand(f, target, precedence::PRIMARY)?;
                write!(f, ".{name}")
            }

            TargetExpr::ElementAccess { target, indices } => {
                write_operand(f, target, precedence::PRIMARY)?;
                write!(f, "[")?;
                write_arguments(f, indices)?;
                write!(f, "]")
            }

            TargetExpr::Binary { op, left, right } => {
                let own = op.precedence();
                write_operand(f, left, own)?;
                write!(f, " {} ", op.symbol())?;
                // Left associative: an equal-precedence right operand keeps its grouping
                write_operand(f, right, own + 1)
            }

            TargetExpr::Unary { op, operand } => {
                write!(f, "{}", op.symbol())?;
                let nested_sign = matches!(
                    operand.as_ref(),
                    TargetExpr::Unary { .. }
                        | TargetExpr::Literal(
                            TargetLiteral::Integer(i64::MIN..0) | TargetLiteral::Suffixed(i64::MIN..0, _)
                        )
                );
                match nested_sign {
                    true => write!(f, "({operand})"),
                    false => write_operand(f, operand, precedence::UNARY),
                }
            }

            TargetExpr::NullCheck { expr, negated } => {
                write_operand(f, expr, precedence::SHIFT)?;
                match negated {
                    true => write!(f, " is not null"),
                    false => write!(f, " is null"),
                }
            }

            TargetExpr::Default(type_name) => write!(f, "default({type_name})"),

            TargetExpr::Argument { modifier, expr } => {
                match modifier {
                    ArgumentModifier::Ref => write!(f, "ref ")?,
                    ArgumentModifier::Out => write!(f, "out ")?,
                }
                write_operand(f, expr, precedence::UNARY)
            }

            TargetExpr::Assignment { target, value } => {
                write_operand(f, target, precedence::UNARY)?;
                write!(f, " = ")?;
                write_operand(f, value, precedence::ASSIGNMENT)
            }
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, operand: &TargetExpr, minimum: u8) -> fmt::Result {
    match operand.precedence() < minimum {
        true => write!(f, "({operand})"),
        false => write!(f, "{operand}"),
    }
}

fn write_arguments(f: &mut fmt::Formatter<'_>, args: &[TargetExpr]) -> fmt::Result {
    for (index, arg) in args.iter().enumerate() {
        if index > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{arg}")?;
    }

    Ok(())
}

impl fmt::Display for TargetLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetLiteral::Null => write!(f, "null"),
            TargetLiteral::Boolean(value) => write!(f, "{value}"),
            TargetLiteral::Integer(value) => write!(f, "{value}"),
            TargetLiteral::Suffixed(value, suffix) => write!(f, "{value}{suffix}"),
            TargetLiteral::Floating(value) => write!(f, "{}", format_floating(*value)),
            TargetLiteral::Char(value) => write!(f, "{}", escape_char(*value)),
            TargetLiteral::Text(value) => write!(f, "{}", escape_string(value)),
        }
    }
}

fn format_floating(value: f64) -> String {
    if value.is_nan() {
        return String::from("double.NaN");
    }

    if value.is_infinite() {
        return match value.is_sign_positive() {
            true => String::from("double.PositiveInfinity"),
            false => String::from("double.NegativeInfinity"),
        };
    }

    let text = value.to_string();
    match text.contains(['.', 'e', 'E']) {
        true => text,
        false => format!("{text}.0"),
    }
}

fn escape_char_body(value: char, quote: char, out: &mut String) {
    match value {
        '\\' => out.push_str("\\\\"),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        '\0' => out.push_str("\\0"),
        ch if ch == quote => {
            out.push('\\');
            out.push(ch);
        }
        ch if ch.is_control() => out.push_str(&format!("\\u{:04x}", ch as u32)),
        ch => out.push(ch),
    }
}

pub fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        escape_char_body(ch, '"', &mut out);
    }
    out.push('"');
    out
}

pub fn escape_char(value: char) -> String {
    let mut out = String::with_capacity(4);
    out.push('\'');
    escape_char_body(value, '\'', &mut out);
    out.push('\'');
    out
}
