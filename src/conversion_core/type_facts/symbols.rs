use crate::conversion_core::type_facts::semantic_types::SemanticType;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    #[default]
    Value,
    Ref,
    Out,
}

/// The parameter a call argument is bound to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterInfo {
    pub name: String,
    #[serde(default)]
    pub ref_kind: RefKind,
    #[serde(rename = "type")]
    pub ty: SemanticType,
}

impl ParameterInfo {
    pub fn by_value(name: &str, ty: SemanticType) -> Self {
        ParameterInfo {
            name: name.to_owned(),
            ref_kind: RefKind::Value,
            ty,
        }
    }

    pub fn by_ref(name: &str, ty: SemanticType) -> Self {
        ParameterInfo {
            name: name.to_owned(),
            ref_kind: RefKind::Ref,
            ty,
        }
    }

    pub fn out(name: &str, ty: SemanticType) -> Self {
        ParameterInfo {
            name: name.to_owned(),
            ref_kind: RefKind::Out,
            ty,
        }
    }

    pub fn is_by_ref(&self) -> bool {
        self.ref_kind != RefKind::Value
    }
}

/// What an argument expression denotes, as resolved by the facts provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum DenotedEntity {
    Local {
        name: String,
        #[serde(rename = "type")]
        ty: SemanticType,
        #[serde(default)]
        read_only: bool,
    },
    Field {
        name: String,
        #[serde(rename = "type")]
        ty: SemanticType,
        #[serde(default)]
        read_only: bool,
    },
    Property {
        name: String,
        #[serde(rename = "type")]
        ty: SemanticType,
        #[serde(default = "default_true")]
        has_getter: bool,
        #[serde(default)]
        has_setter: bool,
    },
    ElementAccess {
        #[serde(rename = "type")]
        ty: SemanticType,
        container: Box<DenotedEntity>,
    },
    // An accessor that returns a storage location by reference
    ByRefCall {
        name: String,
        #[serde(rename = "type")]
        ty: SemanticType,
    },
    ValueCall {
        name: String,
        #[serde(rename = "type")]
        ty: SemanticType,
    },
    Constant {
        #[serde(rename = "type")]
        ty: SemanticType,
    },
    Value {
        #[serde(rename = "type")]
        ty: SemanticType,
    },
}

fn default_true() -> bool {
    true
}

impl DenotedEntity {
    pub fn ty(&self) -> &SemanticType {
        match self {
            DenotedEntity::Local { ty, .. }
            | DenotedEntity::Field { ty, .. }
            | DenotedEntity::Property { ty, .. }
            | DenotedEntity::ElementAccess { ty, .. }
            | DenotedEntity::ByRefCall { ty, .. }
            | DenotedEntity::ValueCall { ty, .. }
            | DenotedEntity::Constant { ty }
            | DenotedEntity::Value { ty } => ty,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            DenotedEntity::Local { name, .. }
            | DenotedEntity::Field { name, .. }
            | DenotedEntity::Property { name, .. }
            | DenotedEntity::ByRefCall { name, .. }
            | DenotedEntity::ValueCall { name, .. } => Some(name),
            DenotedEntity::ElementAccess { container, .. } => container.name(),
            DenotedEntity::Constant { .. } | DenotedEntity::Value { .. } => None,
        }
    }

    /// A container that must be evaluated into a temporary before its elements can be bound.
    pub fn is_computed_container(&self) -> bool {
        matches!(
            self,
            DenotedEntity::Property { .. }
                | DenotedEntity::ValueCall { .. }
                | DenotedEntity::Constant { .. }
                | DenotedEntity::Value { .. }
        )
    }
}
