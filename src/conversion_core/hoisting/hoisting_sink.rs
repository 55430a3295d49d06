use crate::backends::target::sanitize_identifier;
use crate::backends::target::target_statement::TargetStatement;
use crate::conversion_core::compiler_errors::CompilerError;
use crate::{hoist_log, return_compiler_error};
use rustc_hash::FxHashSet;
use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoistKind {
    Declaration,
    Assignment,
    LocalFunction,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    BeforeStatement,
    AfterStatement,
}

/// A statement produced while lowering an expression that has to live outside it.
#[derive(Clone, Debug, PartialEq)]
pub struct HoistedItem {
    pub kind: HoistKind,
    pub placement: Placement,
    pub payload: TargetStatement,
}

impl HoistedItem {
    /// A temporary declared before the statement being lowered.
    pub fn declaration(payload: TargetStatement) -> Self {
        HoistedItem {
            kind: HoistKind::Declaration,
            placement: Placement::BeforeStatement,
            payload,
        }
    }

    /// An assignment run after the statement, copying a temporary back to its origin.
    pub fn write_back(payload: TargetStatement) -> Self {
        HoistedItem {
            kind: HoistKind::Assignment,
            placement: Placement::AfterStatement,
            payload,
        }
    }

    pub fn local_function(payload: TargetStatement) -> Self {
        HoistedItem {
            kind: HoistKind::LocalFunction,
            placement: Placement::BeforeStatement,
            payload,
        }
    }
}

/// Items collected for one statement, in the order they were hoisted.
#[derive(Clone, Debug, Default)]
pub struct HoistScope {
    items: Vec<HoistedItem>,
}

impl HoistScope {
    pub fn items(&self) -> &[HoistedItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn count(&self, kind: HoistKind) -> usize {
        self.items.iter().filter(|item| item.kind == kind).count()
    }

    /// Places the statement between its before and after items.
    pub fn splice(self, statement: TargetStatement) -> Vec<TargetStatement> {
        let mut before = Vec::new();
        let mut after = Vec::new();

        for item in self.items {
            match item.placement {
                Placement::BeforeStatement => before.push(item.payload),
                Placement::AfterStatement => after.push(item.payload),
            }
        }

        before.push(statement);
        before.extend(after);
        before
    }
}

/// Collects hoisted statements for the statements currently being lowered,
/// plus document-wide state: the imports helper calls require and the identifiers in use.
#[derive(Debug, Default)]
pub struct HoistingSink {
    scopes: Vec<HoistScope>,
    required_imports: BTreeSet<String>,
    used_identifiers: FxHashSet<String>,
}

impl HoistingSink {
    pub fn new() -> Self {
        HoistingSink::default()
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HoistScope::default());
    }

    pub fn pop_scope(&mut self) -> Result<HoistScope, CompilerError> {
        match self.scopes.pop() {
            Some(scope) => Ok(scope),
            None => return_compiler_error!("Hoisting scope popped without a matching push"),
        }
    }

    /// Adds an item to the innermost open scope.
    pub fn push(&mut self, item: HoistedItem) -> Result<(), CompilerError> {
        hoist_log!(format!(
            "[Hoist] {:?} at depth {}",
            item.kind,
            self.scopes.len()
        ));

        let Some(scope) = self.scopes.last_mut() else {
            return_compiler_error!(
                "Tried to hoist a {:?} with no statement scope open",
                item.kind
            );
        };

        scope.items.push(item);
        Ok(())
    }

    pub fn require_import(&mut self, namespace: &str) {
        if !self.required_imports.contains(namespace) {
            self.required_imports.insert(namespace.to_owned());
        }
    }

    pub fn required_imports(&self) -> impl Iterator<Item = &String> {
        self.required_imports.iter()
    }

    /// The imports required so far. A member that fails restores them, so its
    /// helper calls leave no trace in the document.
    pub fn imports_checkpoint(&self) -> BTreeSet<String> {
        self.required_imports.clone()
    }

    pub fn restore_imports(&mut self, checkpoint: BTreeSet<String>) {
        self.required_imports = checkpoint;
    }

    pub fn into_required_imports(self) -> Vec<String> {
        self.required_imports.into_iter().collect()
    }

    /// Marks an identifier that already exists in the document.
    pub fn reserve_identifier(&mut self, name: &str) {
        self.used_identifiers.insert(sanitize_identifier(name));
    }

    /// A fresh identifier based on `raw` that collides with nothing reserved or issued so far.
    pub fn unique_identifier(&mut self, raw: &str) -> String {
        let identifier = sanitize_identifier(raw);

        let mut candidate = identifier.clone();
        let mut suffix = 1usize;

        while self.used_identifiers.contains(&candidate) {
            candidate = format!("{}{}", identifier, suffix);
            suffix += 1;
        }

        self.used_identifiers.insert(candidate.clone());
        candidate
    }
}
