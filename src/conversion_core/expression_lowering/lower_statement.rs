use crate::backends::target::sanitize_identifier;
use crate::backends::target::target_statement::TargetStatement;
use crate::conversion_core::compiler_errors::CompilerError;
use crate::conversion_core::expression_lowering::lower_expression::ExpressionLowerer;
use crate::conversion_core::hoisting::hoisting_sink::HoistingSink;
use crate::conversion_core::source_tree::source_nodes::{
    SourceDocument, SourceExpr, SourceExprKind, SourceMember, SourceStatement,
};
use crate::{hoist_log, return_compiler_error};

/// Lowers whole statements, splicing whatever their expressions hoisted around them.
pub struct StatementLowerer<'l, 'a> {
    expressions: &'l mut ExpressionLowerer<'a>,
}

impl<'l, 'a> StatementLowerer<'l, 'a> {
    pub fn new(expressions: &'l mut ExpressionLowerer<'a>) -> Self {
        StatementLowerer { expressions }
    }

    pub fn lower_member(
        &mut self,
        member: &SourceMember,
        sink: &mut HoistingSink,
    ) -> Result<Vec<TargetStatement>, CompilerError> {
        let mut statements = Vec::with_capacity(member.statements.len());
        for statement in &member.statements {
            statements.extend(self.lower_statement(statement, sink)?);
        }

        Ok(statements)
    }

    /// One source statement becomes the statement itself plus its hoisted items.
    pub fn lower_statement(
        &mut self,
        statement: &SourceStatement,
        sink: &mut HoistingSink,
    ) -> Result<Vec<TargetStatement>, CompilerError> {
        let depth = sink.depth();
        sink.push_scope();

        // The scope is popped even when lowering fails, so the next member starts balanced
        let lowered = self.lower_statement_body(statement, sink);
        let scope = sink.pop_scope()?;
        let lowered = lowered?;

        if sink.depth() != depth {
            return_compiler_error!(
                "Hoisting scopes unbalanced after a statement: depth {} instead of {}",
                sink.depth(),
                depth
            );
        }

        if !scope.is_empty() {
            hoist_log!(format!("[Hoist] splicing {} items around {:?}", scope.len(), lowered));
        }

        Ok(scope.splice(lowered))
    }

    fn lower_statement_body(
        &mut self,
        statement: &SourceStatement,
        sink: &mut HoistingSink,
    ) -> Result<TargetStatement, CompilerError> {
        let lowered = match statement {
            SourceStatement::Assign { target, value } => {
                // Writing a plain local evaluates nothing before the value
                let value_first = matches!(target.kind, SourceExprKind::Identifier(_));

                let target = self.expressions.lower_storage(target, true, sink)?;
                let value = self.expressions.lower_expr(value, value_first, sink)?;
                TargetStatement::assignment(target, value)
            }

            SourceStatement::Expression { expr } => {
                TargetStatement::Expression(self.expressions.lower_expr(expr, true, sink)?)
            }

            SourceStatement::Return { value } => match value {
                Some(value) => TargetStatement::Return(Some(self.expressions.lower_expr(value, true, sink)?)),
                None => TargetStatement::Return(None),
            },

            SourceStatement::Local { name, ty, initializer } => {
                let initializer = match initializer {
                    Some(initializer) => Some(self.expressions.lower_expr(initializer, true, sink)?),
                    None => None,
                };

                let type_name = self.expressions.target_type_name(ty);
                TargetStatement::declaration(sanitize_identifier(name), Some(type_name), initializer)
            }
        };

        Ok(lowered)
    }
}

/// Reserves every identifier the document already uses, so hoisted temporaries never shadow one.
pub fn reserve_document_identifiers(document: &SourceDocument, sink: &mut HoistingSink) {
    // Explicit stack instead of recursion, expression nesting depth is unbounded
    let mut pending: Vec<&SourceExpr> = Vec::new();

    for member in &document.members {
        sink.reserve_identifier(&member.name);

        for statement in &member.statements {
            if let SourceStatement::Local { name, .. } = statement {
                sink.reserve_identifier(name);
            }
            pending.extend(statement.expressions());
        }
    }

    while let Some(expr) = pending.pop() {
        if let SourceExprKind::Identifier(name) = &expr.kind {
            sink.reserve_identifier(name);
        }
        pending.extend(expr.children());
    }
}
