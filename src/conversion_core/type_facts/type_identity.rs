//! Cross-model type identity.
//!
//! The two languages have separate type models. A source type is matched to its
//! target counterpart by qualified name and generic arity, never by object identity,
//! so both sides can be built independently of each other.

use crate::conversion_core::type_facts::semantic_types::{SemanticType, SpecialType, TypeKind};
use rustc_hash::FxHashMap;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeIdentityKey {
    pub qualified_name: String,
    pub arity: u32,
}

impl TypeIdentityKey {
    pub fn of(ty: &SemanticType) -> Self {
        TypeIdentityKey {
            qualified_name: ty.qualified_name.to_owned(),
            arity: ty.arity,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetTypeKind {
    Primitive(SpecialType),
    Enum { underlying: SpecialType },
    Nullable(Box<TargetType>),
    Array { element: Box<TargetType>, rank: u32 },
    Class { bases: Vec<String> },
    Struct,
    Interface,
}

/// A type in the target language's own model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetType {
    pub qualified_name: String,
    pub arity: u32,

    // How the type is spelled in emitted code
    pub name: String,
    pub kind: TargetTypeKind,
}

impl TargetType {
    pub fn as_primitive(&self) -> Option<SpecialType> {
        match self.kind {
            TargetTypeKind::Primitive(special) => Some(special),
            _ => None,
        }
    }

    pub fn is_object(&self) -> bool {
        self.as_primitive() == Some(SpecialType::Object)
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.kind, TargetTypeKind::Enum { .. })
    }

    /// Integral, floating, decimal and char: the operands of the target's numeric conversions.
    pub fn is_numeric(&self) -> bool {
        self.as_primitive()
            .is_some_and(|special| special.is_numeric() || special == SpecialType::Char)
    }

    pub fn is_value_type(&self) -> bool {
        match &self.kind {
            TargetTypeKind::Primitive(special) => special.is_value_type(),
            TargetTypeKind::Enum { .. } | TargetTypeKind::Nullable(_) | TargetTypeKind::Struct => {
                true
            }
            TargetTypeKind::Array { .. } | TargetTypeKind::Class { .. } | TargetTypeKind::Interface => {
                false
            }
        }
    }

    pub fn is_reference_type(&self) -> bool {
        !self.is_value_type()
    }

    pub fn same_identity(&self, other: &TargetType) -> bool {
        match (&self.kind, &other.kind) {
            (TargetTypeKind::Nullable(left), TargetTypeKind::Nullable(right)) => {
                left.same_identity(right)
            }
            (
                TargetTypeKind::Array {
                    element: left,
                    rank: left_rank,
                },
                TargetTypeKind::Array {
                    element: right,
                    rank: right_rank,
                },
            ) => left_rank == right_rank && left.same_identity(right),
            _ => self.qualified_name == other.qualified_name && self.arity == other.arity,
        }
    }

    pub fn bases(&self) -> &[String] {
        match &self.kind {
            TargetTypeKind::Class { bases } => bases,
            _ => &[],
        }
    }
}

pub fn keyword_for(special: SpecialType) -> &'static str {
    match special {
        SpecialType::Object => "object",
        SpecialType::Boolean => "bool",
        SpecialType::Char => "char",
        SpecialType::SByte => "sbyte",
        SpecialType::Byte => "byte",
        SpecialType::Int16 => "short",
        SpecialType::UInt16 => "ushort",
        SpecialType::Int32 => "int",
        SpecialType::UInt32 => "uint",
        SpecialType::Int64 => "long",
        SpecialType::UInt64 => "ulong",
        SpecialType::Decimal => "decimal",
        SpecialType::Single => "float",
        SpecialType::Double => "double",
        SpecialType::String => "string",
        SpecialType::DateTime => "DateTime",
        SpecialType::Void => "void",
    }
}

/// Maps source types onto the target model, keyed by (qualified name, arity).
#[derive(Clone, Debug)]
pub struct TypeIdentityTable {
    types: FxHashMap<TypeIdentityKey, TargetType>,
}

impl Default for TypeIdentityTable {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl TypeIdentityTable {
    pub fn empty() -> Self {
        TypeIdentityTable {
            types: FxHashMap::default(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut table = Self::empty();
        for special in SpecialType::all() {
            table.types.insert(
                TypeIdentityKey {
                    qualified_name: special.qualified_name(),
                    arity: 0,
                },
                TargetType {
                    qualified_name: special.qualified_name(),
                    arity: 0,
                    name: keyword_for(*special).to_owned(),
                    kind: TargetTypeKind::Primitive(*special),
                },
            );
        }

        table
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registers a named user type so it resolves to its same-named target counterpart.
    /// Composite types register their parts instead.
    pub fn register(&mut self, ty: &SemanticType) {
        let kind = match &ty.kind {
            TypeKind::Special(_) => return,
            TypeKind::Nullable(inner) => return self.register(inner),
            TypeKind::Array { element, .. } => return self.register(element),
            TypeKind::Enum { underlying } => TargetTypeKind::Enum {
                underlying: *underlying,
            },
            TypeKind::Class { bases } => TargetTypeKind::Class {
                bases: bases.to_owned(),
            },
            TypeKind::Structure => TargetTypeKind::Struct,
            TypeKind::Interface => TargetTypeKind::Interface,
        };

        self.types
            .entry(TypeIdentityKey::of(ty))
            .or_insert_with(|| TargetType {
                qualified_name: ty.qualified_name.to_owned(),
                arity: ty.arity,
                name: ty.simple_name().to_owned(),
                kind,
            });
    }

    pub fn lookup(&self, key: &TypeIdentityKey) -> Option<&TargetType> {
        self.types.get(key)
    }

    /// The target counterpart of a source type, if both models know it.
    pub fn resolve(&self, ty: &SemanticType) -> Option<TargetType> {
        match &ty.kind {
            TypeKind::Nullable(inner) => {
                let inner = self.resolve(inner)?;
                Some(TargetType {
                    qualified_name: ty.qualified_name.to_owned(),
                    arity: ty.arity,
                    name: format!("{}?", inner.name),
                    kind: TargetTypeKind::Nullable(Box::new(inner)),
                })
            }
            TypeKind::Array { element, rank } => {
                let element = self.resolve(element)?;
                let commas = ",".repeat(rank.saturating_sub(1) as usize);
                Some(TargetType {
                    qualified_name: ty.qualified_name.to_owned(),
                    arity: ty.arity,
                    name: format!("{}[{commas}]", element.name),
                    kind: TargetTypeKind::Array {
                        element: Box::new(element),
                        rank: *rank,
                    },
                })
            }
            _ => self.lookup(&TypeIdentityKey::of(ty)).cloned(),
        }
    }

    /// How a source type is spelled in emitted code. Unmapped types keep their simple name.
    pub fn target_name(&self, ty: &SemanticType) -> String {
        match self.resolve(ty) {
            Some(target) => target.name,
            None => match &ty.kind {
                TypeKind::Nullable(inner) => format!("{}?", self.target_name(inner)),
                TypeKind::Array { element, rank } => format!(
                    "{}[{}]",
                    self.target_name(element),
                    ",".repeat(rank.saturating_sub(1) as usize)
                ),
                _ => ty.simple_name().to_owned(),
            },
        }
    }
}
