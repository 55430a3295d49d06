//! Source-language type model as reported by the semantic facts provider.
//!
//! Types travel through the pre-analysed document format in a compact text form
//! (`Int32`, `String?`, `Char()`, `enum Demo.Color : Int32`, `class Demo.Admin : Demo.User`),
//! so `SemanticType` round-trips through `FromStr`/`Display` for serde.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpecialType {
    Object,
    Boolean,
    Char,
    SByte,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Decimal,
    Single,
    Double,
    String,
    DateTime,
    Void,
}

const ALL_SPECIAL_TYPES: [SpecialType; 17] = [
    SpecialType::Object,
    SpecialType::Boolean,
    SpecialType::Char,
    SpecialType::SByte,
    SpecialType::Byte,
    SpecialType::Int16,
    SpecialType::UInt16,
    SpecialType::Int32,
    SpecialType::UInt32,
    SpecialType::Int64,
    SpecialType::UInt64,
    SpecialType::Decimal,
    SpecialType::Single,
    SpecialType::Double,
    SpecialType::String,
    SpecialType::DateTime,
    SpecialType::Void,
];

impl SpecialType {
    pub fn all() -> &'static [SpecialType] {
        &ALL_SPECIAL_TYPES
    }

    pub fn short_name(self) -> &'static str {
        match self {
            SpecialType::Object => "Object",
            SpecialType::Boolean => "Boolean",
            SpecialType::Char => "Char",
            SpecialType::SByte => "SByte",
            SpecialType::Byte => "Byte",
            SpecialType::Int16 => "Int16",
            SpecialType::UInt16 => "UInt16",
            SpecialType::Int32 => "Int32",
            SpecialType::UInt32 => "UInt32",
            SpecialType::Int64 => "Int64",
            SpecialType::UInt64 => "UInt64",
            SpecialType::Decimal => "Decimal",
            SpecialType::Single => "Single",
            SpecialType::Double => "Double",
            SpecialType::String => "String",
            SpecialType::DateTime => "DateTime",
            SpecialType::Void => "Void",
        }
    }

    pub fn qualified_name(self) -> String {
        format!("System.{}", self.short_name())
    }

    /// Accepts the runtime name, the qualified runtime name or the source keyword.
    pub fn from_name(name: &str) -> Option<SpecialType> {
        let name = name.strip_prefix("System.").unwrap_or(name);
        let special = match name {
            "Object" => SpecialType::Object,
            "Boolean" => SpecialType::Boolean,
            "Char" => SpecialType::Char,
            "SByte" => SpecialType::SByte,
            "Byte" => SpecialType::Byte,
            "Int16" | "Short" => SpecialType::Int16,
            "UInt16" | "UShort" => SpecialType::UInt16,
            "Int32" | "Integer" => SpecialType::Int32,
            "UInt32" | "UInteger" => SpecialType::UInt32,
            "Int64" | "Long" => SpecialType::Int64,
            "UInt64" | "ULong" => SpecialType::UInt64,
            "Decimal" => SpecialType::Decimal,
            "Single" => SpecialType::Single,
            "Double" => SpecialType::Double,
            "String" => SpecialType::String,
            "DateTime" | "Date" => SpecialType::DateTime,
            "Void" => SpecialType::Void,
            _ => return None,
        };

        Some(special)
    }

    pub fn is_integral(self) -> bool {
        self.integral_range().is_some()
    }

    pub fn is_floating(self) -> bool {
        matches!(self, SpecialType::Single | SpecialType::Double)
    }

    /// Integral, floating and Decimal. Char and Boolean are not numeric in either language.
    pub fn is_numeric(self) -> bool {
        self.is_integral() || self.is_floating() || self == SpecialType::Decimal
    }

    pub fn is_value_type(self) -> bool {
        !matches!(
            self,
            SpecialType::Object | SpecialType::String | SpecialType::Void
        )
    }

    pub fn integral_range(self) -> Option<(i128, i128)> {
        let range = match self {
            SpecialType::SByte => (i8::MIN as i128, i8::MAX as i128),
            SpecialType::Byte => (0, u8::MAX as i128),
            SpecialType::Int16 => (i16::MIN as i128, i16::MAX as i128),
            SpecialType::UInt16 => (0, u16::MAX as i128),
            SpecialType::Int32 => (i32::MIN as i128, i32::MAX as i128),
            SpecialType::UInt32 => (0, u32::MAX as i128),
            SpecialType::Int64 => (i64::MIN as i128, i64::MAX as i128),
            SpecialType::UInt64 => (0, u64::MAX as i128),
            _ => return None,
        };

        Some(range)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Special(SpecialType),
    Enum { underlying: SpecialType },
    Nullable(Box<SemanticType>),
    Array { element: Box<SemanticType>, rank: u32 },
    // Bases lists every class and interface the type converts to by reference widening
    Class { bases: Vec<String> },
    Structure,
    Interface,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SemanticType {
    pub qualified_name: String,
    pub arity: u32,
    pub kind: TypeKind,
}

impl SemanticType {
    pub fn special(special: SpecialType) -> Self {
        SemanticType {
            qualified_name: special.qualified_name(),
            arity: 0,
            kind: TypeKind::Special(special),
        }
    }

    pub fn object() -> Self {
        Self::special(SpecialType::Object)
    }

    pub fn boolean() -> Self {
        Self::special(SpecialType::Boolean)
    }

    pub fn int32() -> Self {
        Self::special(SpecialType::Int32)
    }

    pub fn string() -> Self {
        Self::special(SpecialType::String)
    }

    pub fn char() -> Self {
        Self::special(SpecialType::Char)
    }

    pub fn double() -> Self {
        Self::special(SpecialType::Double)
    }

    pub fn enumeration(qualified_name: &str, underlying: SpecialType) -> Self {
        SemanticType {
            qualified_name: qualified_name.to_owned(),
            arity: 0,
            kind: TypeKind::Enum { underlying },
        }
    }

    pub fn class(qualified_name: &str, bases: &[&str]) -> Self {
        let (name, arity) = split_arity(qualified_name);
        SemanticType {
            qualified_name: name,
            arity,
            kind: TypeKind::Class {
                bases: bases.iter().map(|base| (*base).to_owned()).collect(),
            },
        }
    }

    pub fn structure(qualified_name: &str) -> Self {
        let (name, arity) = split_arity(qualified_name);
        SemanticType {
            qualified_name: name,
            arity,
            kind: TypeKind::Structure,
        }
    }

    pub fn interface(qualified_name: &str) -> Self {
        let (name, arity) = split_arity(qualified_name);
        SemanticType {
            qualified_name: name,
            arity,
            kind: TypeKind::Interface,
        }
    }

    pub fn nullable(inner: SemanticType) -> Self {
        SemanticType {
            qualified_name: String::from("System.Nullable"),
            arity: 1,
            kind: TypeKind::Nullable(Box::new(inner)),
        }
    }

    pub fn array(element: SemanticType, rank: u32) -> Self {
        SemanticType {
            qualified_name: String::from("System.Array"),
            arity: 0,
            kind: TypeKind::Array {
                element: Box::new(element),
                rank,
            },
        }
    }

    pub fn as_special(&self) -> Option<SpecialType> {
        match self.kind {
            TypeKind::Special(special) => Some(special),
            _ => None,
        }
    }

    pub fn is_special(&self, special: SpecialType) -> bool {
        self.as_special() == Some(special)
    }

    /// The universal type: operators and conversions on it are resolved at runtime.
    pub fn is_dynamic(&self) -> bool {
        self.is_special(SpecialType::Object)
    }

    pub fn is_string(&self) -> bool {
        self.is_special(SpecialType::String)
    }

    pub fn is_boolean(&self) -> bool {
        self.is_special(SpecialType::Boolean)
    }

    pub fn is_numeric(&self) -> bool {
        self.as_special().is_some_and(SpecialType::is_numeric)
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.kind, TypeKind::Enum { .. })
    }

    pub fn enum_underlying(&self) -> Option<SpecialType> {
        match self.kind {
            TypeKind::Enum { underlying } => Some(underlying),
            _ => None,
        }
    }

    /// Numeric types plus enums, which both languages treat as numbers in conversions.
    pub fn is_numeric_or_enum(&self) -> bool {
        self.is_numeric() || self.is_enum()
    }

    pub fn nullable_inner(&self) -> Option<&SemanticType> {
        match &self.kind {
            TypeKind::Nullable(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn is_nullable_boolean(&self) -> bool {
        self.nullable_inner().is_some_and(SemanticType::is_boolean)
    }

    pub fn is_char_array(&self) -> bool {
        match &self.kind {
            TypeKind::Array { element, rank } => *rank == 1 && element.is_special(SpecialType::Char),
            _ => false,
        }
    }

    pub fn is_reference_type(&self) -> bool {
        match &self.kind {
            TypeKind::Special(special) => !special.is_value_type(),
            TypeKind::Class { .. } | TypeKind::Interface | TypeKind::Array { .. } => true,
            TypeKind::Enum { .. } | TypeKind::Nullable(_) | TypeKind::Structure => false,
        }
    }

    pub fn is_value_type(&self) -> bool {
        !self.is_reference_type()
    }

    /// Types a `Nothing` check can compare against null rather than `default(T)`.
    pub fn accepts_null(&self) -> bool {
        self.is_reference_type() || self.nullable_inner().is_some()
    }

    pub fn bases(&self) -> &[String] {
        match &self.kind {
            TypeKind::Class { bases } => bases,
            _ => &[],
        }
    }

    /// Cross-model identity: name and arity, never object identity.
    pub fn same_identity(&self, other: &SemanticType) -> bool {
        match (&self.kind, &other.kind) {
            (TypeKind::Nullable(left), TypeKind::Nullable(right)) => left.same_identity(right),
            (
                TypeKind::Array {
                    element: left,
                    rank: left_rank,
                },
                TypeKind::Array {
                    element: right,
                    rank: right_rank,
                },
            ) => left_rank == right_rank && left.same_identity(right),
            _ => self.qualified_name == other.qualified_name && self.arity == other.arity,
        }
    }

    /// Last segment of the qualified name, used for temporary names.
    pub fn simple_name(&self) -> &str {
        self.qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualified_name)
    }
}

fn split_arity(qualified_name: &str) -> (String, u32) {
    match qualified_name.split_once('`') {
        Some((name, arity)) => (name.to_owned(), arity.parse().unwrap_or(0)),
        None => (qualified_name.to_owned(), 0),
    }
}

fn join_arity(name: &str, arity: u32) -> String {
    if arity == 0 {
        name.to_owned()
    } else {
        format!("{name}`{arity}")
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::Special(special) => write!(f, "{}", special.short_name()),
            TypeKind::Enum { underlying } => write!(
                f,
                "enum {} : {}",
                self.qualified_name,
                underlying.short_name()
            ),
            TypeKind::Nullable(inner) => write!(f, "{inner}?"),
            TypeKind::Array { element, rank } => {
                let commas = ",".repeat(rank.saturating_sub(1) as usize);
                write!(f, "{element}({commas})")
            }
            TypeKind::Class { bases } => {
                write!(f, "class {}", join_arity(&self.qualified_name, self.arity))?;
                if !bases.is_empty() {
                    write!(f, " : {}", bases.join(", "))?;
                }
                Ok(())
            }
            TypeKind::Structure => write!(
                f,
                "structure {}",
                join_arity(&self.qualified_name, self.arity)
            ),
            TypeKind::Interface => write!(
                f,
                "interface {}",
                join_arity(&self.qualified_name, self.arity)
            ),
        }
    }
}

impl FromStr for SemanticType {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();

        if text.is_empty() {
            return Err(String::from("empty type name"));
        }

        if let Some(inner) = text.strip_suffix('?') {
            return Ok(SemanticType::nullable(inner.parse()?));
        }

        if text.ends_with(')') {
            if let Some(open) = text.rfind('(') {
                let dimensions = &text[open + 1..text.len() - 1];
                if dimensions.chars().all(|ch| ch == ',') {
                    let element = text[..open].parse()?;
                    return Ok(SemanticType::array(element, dimensions.len() as u32 + 1));
                }
            }
        }

        if let Some(rest) = text.strip_prefix("enum ") {
            let Some((name, underlying)) = rest.split_once(':') else {
                return Err(format!("enum '{rest}' is missing its underlying type"));
            };

            let underlying = underlying.trim();
            return match SpecialType::from_name(underlying) {
                Some(special) if special.is_integral() => {
                    Ok(SemanticType::enumeration(name.trim(), special))
                }
                _ => Err(format!(
                    "enum '{}' has non-integral underlying type '{underlying}'",
                    name.trim()
                )),
            };
        }

        if let Some(rest) = text.strip_prefix("class ") {
            let (name, bases) = match rest.split_once(':') {
                Some((name, bases)) => (
                    name.trim(),
                    bases
                        .split(',')
                        .map(str::trim)
                        .filter(|base| !base.is_empty())
                        .collect::<Vec<_>>(),
                ),
                None => (rest.trim(), Vec::new()),
            };
            return Ok(SemanticType::class(name, &bases));
        }

        if let Some(rest) = text.strip_prefix("structure ") {
            return Ok(SemanticType::structure(rest.trim()));
        }

        if let Some(rest) = text.strip_prefix("interface ") {
            return Ok(SemanticType::interface(rest.trim()));
        }

        SpecialType::from_name(text)
            .map(SemanticType::special)
            .ok_or_else(|| format!("unknown type '{text}'"))
    }
}

impl TryFrom<String> for SemanticType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SemanticType> for String {
    fn from(value: SemanticType) -> Self {
        value.to_string()
    }
}
