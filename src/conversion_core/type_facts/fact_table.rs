use crate::conversion_core::source_tree::source_nodes::{
    NodeId, SourceDocument, SourceExpr, SourceExprKind,
};
use crate::conversion_core::type_facts::semantic_types::{SemanticType, TypeKind};
use crate::conversion_core::type_facts::symbols::DenotedEntity;
use crate::conversion_core::type_facts::type_facts::TypeFacts;
use crate::conversion_core::type_facts::type_identity::TypeIdentityTable;
use rustc_hash::FxHashMap;

/// Read-only semantic facts about the nodes of one document.
///
/// Lowering never asks the source language's semantic model directly; every question
/// goes through this trait so the pipeline can run from recorded facts.
pub trait TypeFactsProvider {
    fn type_facts(&self, node: NodeId) -> Option<&TypeFacts>;
    fn denoted_entity(&self, node: NodeId) -> Option<&DenotedEntity>;
}

#[derive(Debug, Default)]
pub struct FactTable {
    facts: FxHashMap<NodeId, TypeFacts>,
    entities: FxHashMap<NodeId, DenotedEntity>,

    // Every named type mentioned anywhere in the document
    types: Vec<SemanticType>,
}

impl TypeFactsProvider for FactTable {
    fn type_facts(&self, node: NodeId) -> Option<&TypeFacts> {
        self.facts.get(&node)
    }

    fn denoted_entity(&self, node: NodeId) -> Option<&DenotedEntity> {
        self.entities.get(&node)
    }
}

impl FactTable {
    pub fn new() -> Self {
        FactTable::default()
    }

    pub fn from_document(document: &SourceDocument) -> Self {
        let mut table = FactTable::new();

        // Explicit stack instead of recursion, expression nesting depth is unbounded
        let mut pending: Vec<&SourceExpr> = Vec::new();
        for member in &document.members {
            // Declared local types are not facts, a type nothing describes stays unmapped
            for statement in &member.statements {
                pending.extend(statement.expressions());
            }
        }

        while let Some(expr) = pending.pop() {
            if let Some(facts) = &expr.facts {
                table.insert_facts(expr.id, facts.to_owned());
            }

            if let Some(entity) = &expr.denoted {
                table.insert_entity(expr.id, entity.to_owned());
            }

            if let SourceExprKind::Call { arguments, .. } = &expr.kind {
                for argument in arguments {
                    if let Some(parameter) = &argument.parameter {
                        table.note_type(&parameter.ty);
                    }
                }
            }

            pending.extend(expr.children());
        }

        table
    }

    pub fn insert_facts(&mut self, node: NodeId, facts: TypeFacts) {
        for ty in [&facts.source_type, &facts.converted_type].into_iter().flatten() {
            self.note_type(ty);
        }
        self.facts.insert(node, facts);
    }

    pub fn insert_entity(&mut self, node: NodeId, entity: DenotedEntity) {
        let mut current = Some(&entity);
        while let Some(entity) = current {
            self.note_type(entity.ty());
            current = match entity {
                DenotedEntity::ElementAccess { container, .. } => Some(container.as_ref()),
                _ => None,
            };
        }
        self.entities.insert(node, entity);
    }

    fn note_type(&mut self, ty: &SemanticType) {
        match &ty.kind {
            TypeKind::Special(_) => {}
            TypeKind::Nullable(inner) => self.note_type(inner),
            TypeKind::Array { element, .. } => self.note_type(element),
            _ => {
                if !self.types.iter().any(|known| known.same_identity(ty)) {
                    self.types.push(ty.to_owned());
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Registers every user type the document mentions with the identity table.
    pub fn register_types(&self, identities: &mut TypeIdentityTable) {
        for ty in &self.types {
            identities.register(ty);
        }
    }
}
