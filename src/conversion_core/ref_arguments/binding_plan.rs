use crate::conversion_core::type_facts::symbols::{DenotedEntity, ParameterInfo};

/// How an argument bound to a by-reference parameter reaches the call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefBindingPlan {
    // Passed straight through as `ref x`
    Inline,

    // Copied into a temporary first, nothing written back
    PreAssignment,

    // Copied into a temporary first and written back after the call
    PreAndPostAssignment,
}

impl RefBindingPlan {
    pub fn needs_temporary(self) -> bool {
        self != RefBindingPlan::Inline
    }

    pub fn writes_back(self) -> bool {
        self == RefBindingPlan::PreAndPostAssignment
    }
}

/// Decides how `entity` is passed to `parameter`. Pure: nothing is emitted.
pub fn plan_argument(parameter: &ParameterInfo, entity: &DenotedEntity) -> RefBindingPlan {
    if !parameter.is_by_ref() {
        return RefBindingPlan::Inline;
    }

    // Storage the call could write through, but must not
    let read_only = match entity {
        DenotedEntity::Local { read_only, .. } | DenotedEntity::Field { read_only, .. } => *read_only,
        DenotedEntity::Property { has_setter, .. } => !has_setter,
        DenotedEntity::ValueCall { .. } | DenotedEntity::Constant { .. } | DenotedEntity::Value { .. } => {
            true
        }
        DenotedEntity::ElementAccess { .. } | DenotedEntity::ByRefCall { .. } => false,
    };

    if read_only {
        return RefBindingPlan::PreAssignment;
    }

    let type_mismatch = !entity.ty().same_identity(&parameter.ty);
    if type_mismatch || matches!(entity, DenotedEntity::Property { .. }) {
        return RefBindingPlan::PreAndPostAssignment;
    }

    RefBindingPlan::Inline
}

/// The computed container an element access has to be evaluated out of first, if any.
/// Walks the container chain from the element outwards.
pub fn computed_container(entity: &DenotedEntity) -> Option<(usize, &DenotedEntity)> {
    let mut depth = 0;
    let mut current = entity;

    while let DenotedEntity::ElementAccess { container, .. } = current {
        depth += 1;
        if container.is_computed_container() {
            return Some((depth, container.as_ref()));
        }
        current = container.as_ref();
    }

    None
}

/// Whether binding this argument pushes anything into the hoisting sink.
pub fn needs_hoisting(parameter: &ParameterInfo, entity: Option<&DenotedEntity>) -> bool {
    let Some(entity) = entity else {
        return false;
    };

    if !parameter.is_by_ref() {
        return false;
    }

    plan_argument(parameter, entity).needs_temporary() || computed_container(entity).is_some()
}
