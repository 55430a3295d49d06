use crate::backends::target::sanitize_identifier;
use crate::backends::target::target_expr::TargetExpr;
use crate::conversion_core::compiler_errors::CompilerError;
use crate::conversion_core::compiler_warnings::{CompilerWarning, WarningKind};
use crate::conversion_core::conversions::ConversionPipeline;
use crate::conversion_core::conversions::classifier::ClassifyOptions;
use crate::conversion_core::conversions::literal_narrowing::literal_expr;
use crate::conversion_core::hoisting::hoisting_sink::HoistingSink;
use crate::conversion_core::operators::operator_case::{
    LoweringContext, OperatorCase, OperatorKind, UnaryCase, UnaryOperatorKind,
};
use crate::conversion_core::operators::operator_lowering::{
    BinaryLowering, OperatorLowering, UnaryLowering,
};
use crate::conversion_core::ref_arguments::argument_binder::{
    CallArgument, PendingCall, RefArgumentPlanner,
};
use crate::conversion_core::ref_arguments::binding_plan::needs_hoisting;
use crate::conversion_core::source_tree::source_nodes::{
    SourceArgument, SourceExpr, SourceExprKind,
};
use crate::conversion_core::type_facts::fact_table::TypeFactsProvider;
use crate::conversion_core::type_facts::semantic_types::SemanticType;
use crate::conversion_core::type_facts::type_facts::TypeFacts;
use crate::{conversion_log, return_compiler_error, return_fact_error};

// How a node's natural form reaches the type its facts end on
enum Boundary {
    // The node emitted its source type, convert as the facts say
    Facts,

    // Lowering emitted a different type than the source type
    Emitted(SemanticType),

    // A native operator, whose target result may be wider than its source result
    OperatorResult,

    // Nothing left to convert
    Converted,
}

pub struct ExpressionLowerer<'a> {
    facts: &'a dyn TypeFactsProvider,
    pipeline: &'a ConversionPipeline<'a>,
    operators: OperatorLowering<'a>,
    planner: RefArgumentPlanner<'a>,
    context: LoweringContext,
    warnings: Vec<CompilerWarning>,
}

impl<'a> ExpressionLowerer<'a> {
    pub fn new(
        facts: &'a dyn TypeFactsProvider,
        pipeline: &'a ConversionPipeline<'a>,
        context: LoweringContext,
    ) -> Self {
        ExpressionLowerer {
            facts,
            pipeline,
            operators: OperatorLowering::new(pipeline),
            planner: RefArgumentPlanner::new(pipeline),
            context,
            warnings: Vec::new(),
        }
    }

    /// Members lowered inside an expression tree lambda get a different context.
    pub fn set_context(&mut self, context: LoweringContext) {
        self.context = context;
    }

    pub fn context(&self) -> LoweringContext {
        self.context
    }

    pub fn take_warnings(&mut self) -> Vec<CompilerWarning> {
        std::mem::take(&mut self.warnings)
    }

    pub fn target_type_name(&self, ty: &SemanticType) -> String {
        self.pipeline.identities.target_name(ty)
    }

    /// Lowers `expr` and converts it to the type its facts end on.
    ///
    /// `first_evaluation` is true when nothing in the statement is evaluated before this
    /// node, so temporaries hoisted in front of the statement keep evaluation order.
    pub fn lower_expr(
        &mut self,
        expr: &SourceExpr,
        first_evaluation: bool,
        sink: &mut HoistingSink,
    ) -> Result<TargetExpr, CompilerError> {
        let facts = self.facts_of(expr);
        self.lower_with_facts(expr, &facts, first_evaluation, false, sink)
    }

    /// Lowers `expr` as a storage location: assignment targets and by-reference
    /// arguments are never converted.
    pub fn lower_storage(
        &mut self,
        expr: &SourceExpr,
        first_evaluation: bool,
        sink: &mut HoistingSink,
    ) -> Result<TargetExpr, CompilerError> {
        let facts = self.facts_of(expr);
        let (lowered, _) = self.lower_natural(expr, &facts, first_evaluation, sink)?;
        Ok(lowered)
    }

    fn facts_of(&self, expr: &SourceExpr) -> TypeFacts {
        self.facts.type_facts(expr.id).cloned().unwrap_or_default()
    }

    fn lower_with_facts(
        &mut self,
        expr: &SourceExpr,
        facts: &TypeFacts,
        first_evaluation: bool,
        arithmetic_operand: bool,
        sink: &mut HoistingSink,
    ) -> Result<TargetExpr, CompilerError> {
        let (lowered, boundary) = self.lower_natural(expr, facts, first_evaluation, sink)?;

        let converted = match boundary {
            Boundary::Converted => lowered,
            Boundary::Facts => {
                let options = ClassifyOptions {
                    is_const: facts.is_const_context,
                    ..ClassifyOptions::default()
                }
                .arithmetic(arithmetic_operand);

                self.pipeline.convert(lowered, facts, &options, sink)
            }
            Boundary::Emitted(emitted) => match facts.final_type() {
                Some(target) => self.pipeline.convert_between(lowered, &emitted, target, sink),
                None => lowered,
            },
            Boundary::OperatorResult => match facts.final_type() {
                Some(target) => {
                    let source = facts.source_type.as_ref().unwrap_or(target);
                    let options = ClassifyOptions {
                        is_const: facts.is_const_context,
                        ..ClassifyOptions::forced(source, target)
                    }
                    .arithmetic(arithmetic_operand)
                    .operator_result(true);

                    self.pipeline.convert(lowered, facts, &options, sink)
                }
                None => lowered,
            },
        };

        Ok(converted)
    }

    fn lower_natural(
        &mut self,
        expr: &SourceExpr,
        facts: &TypeFacts,
        first_evaluation: bool,
        sink: &mut HoistingSink,
    ) -> Result<(TargetExpr, Boundary), CompilerError> {
        match &expr.kind {
            SourceExprKind::Identifier(name) => {
                Ok((TargetExpr::identifier(sanitize_identifier(name)), Boundary::Facts))
            }

            SourceExprKind::Literal(constant) => {
                let literal = literal_expr(constant, facts.final_type(), self.pipeline.identities);

                // Nothing is emitted directly in its destination's form
                match constant.is_nothing() {
                    true => Ok((literal, Boundary::Converted)),
                    false => Ok((literal, Boundary::Facts)),
                }
            }

            SourceExprKind::Parenthesized(inner) => {
                let mut inner_facts = self.facts_of(inner);

                // Conversions recorded on the parentheses belong to the inner node,
                // which is where an operator needs to see them
                if inner_facts.converted_type.is_none() {
                    inner_facts.converted_type = facts.converted_type.to_owned();
                    if inner_facts.source_type.is_none() {
                        inner_facts.source_type = facts.source_type.to_owned();
                    }
                    let lowered =
                        self.lower_with_facts(inner, &inner_facts, first_evaluation, false, sink)?;
                    return Ok((lowered, Boundary::Converted));
                }

                let lowered = self.lower_with_facts(inner, &inner_facts, first_evaluation, false, sink)?;
                Ok((lowered, Boundary::Facts))
            }

            SourceExprKind::MemberAccess { target, name } => {
                let target = self.lower_expr(target, first_evaluation, sink)?;
                Ok((TargetExpr::member(target, sanitize_identifier(name)), Boundary::Facts))
            }

            SourceExprKind::ElementAccess { target, indices } => {
                let target = self.lower_expr(target, first_evaluation, sink)?;

                let mut lowered_indices = Vec::with_capacity(indices.len());
                for index in indices {
                    lowered_indices.push(self.lower_expr(index, false, sink)?);
                }

                Ok((
                    TargetExpr::ElementAccess {
                        target: Box::new(target),
                        indices: lowered_indices,
                    },
                    Boundary::Facts,
                ))
            }

            SourceExprKind::Unary { op, operand } => {
                self.lower_unary(expr, *op, operand, facts, first_evaluation, sink)
            }

            SourceExprKind::Binary { op, left, right } => {
                self.lower_binary(expr, *op, left, right, facts, first_evaluation, sink)
            }

            SourceExprKind::Call { callee, arguments } => {
                self.lower_call(callee, arguments, facts, first_evaluation, sink)
            }
        }
    }

    // ======================================================
    //                      OPERATORS
    // ======================================================

    #[allow(clippy::too_many_arguments)]
    fn lower_binary(
        &mut self,
        expr: &SourceExpr,
        kind: OperatorKind,
        left: &SourceExpr,
        right: &SourceExpr,
        facts: &TypeFacts,
        first_evaluation: bool,
        sink: &mut HoistingSink,
    ) -> Result<(TargetExpr, Boundary), CompilerError> {
        let arithmetic = kind.is_arithmetic();
        let left_facts = self.facts_of(left);
        let right_facts = self.facts_of(right);

        let left_expr = self.lower_with_facts(left, &left_facts, first_evaluation, arithmetic, sink)?;
        let right_expr = self.lower_with_facts(right, &right_facts, false, arithmetic, sink)?;

        let Some(result_type) = facts.final_type().cloned() else {
            // Without a result type there is no runtime helper to pick
            if kind.native_operator().is_none() {
                return_fact_error!(
                    format!("Operator '{}' has no type facts and no native form", kind),
                    expr.location.to_owned(),
                    {
                        OperatorKind => kind.to_string(),
                        CompilationStage => "Expression Lowering",
                    }
                );
            }

            self.warnings.push(CompilerWarning::new(
                kind.to_string(),
                expr.location.to_owned(),
                WarningKind::MissingFacts,
            ));
            return native_binary(kind, left_expr, right_expr, Boundary::Facts);
        };

        let case = OperatorCase::new(kind, left_facts, right_facts, result_type)
            .at(expr.location.to_owned());

        match self
            .operators
            .lower_binary(&case, left_expr, right_expr, &self.context, sink)?
        {
            BinaryLowering::Substituted(lowered) => {
                Ok((lowered.expr, Boundary::Emitted(lowered.result_type)))
            }
            BinaryLowering::Native(left_expr, right_expr) => {
                native_binary(kind, left_expr, right_expr, Boundary::OperatorResult)
            }
        }
    }

    fn lower_unary(
        &mut self,
        expr: &SourceExpr,
        kind: UnaryOperatorKind,
        operand: &SourceExpr,
        facts: &TypeFacts,
        first_evaluation: bool,
        sink: &mut HoistingSink,
    ) -> Result<(TargetExpr, Boundary), CompilerError> {
        let operand_facts = self.facts_of(operand);
        let arithmetic = kind != UnaryOperatorKind::Not;
        let lowered = self.lower_with_facts(operand, &operand_facts, first_evaluation, arithmetic, sink)?;

        let is_boolean = operand_facts
            .final_type()
            .is_some_and(|ty| ty.is_boolean() || ty.is_nullable_boolean());

        let Some(result_type) = facts.final_type().cloned() else {
            let native = TargetExpr::unary(kind.native_operator(is_boolean), lowered);
            return Ok((native, Boundary::Facts));
        };

        let case = UnaryCase {
            kind,
            operand: operand_facts,
            result_type,
            location: expr.location.to_owned(),
        };

        match self.operators.lower_unary(&case, lowered, sink) {
            UnaryLowering::Substituted(lowered) => {
                Ok((lowered.expr, Boundary::Emitted(lowered.result_type)))
            }
            UnaryLowering::Native(operand) => Ok((
                TargetExpr::unary(kind.native_operator(is_boolean), operand),
                Boundary::Facts,
            )),
        }
    }

    // ======================================================
    //                        CALLS
    // ======================================================

    fn lower_call(
        &mut self,
        callee: &SourceExpr,
        arguments: &[SourceArgument],
        facts: &TypeFacts,
        first_evaluation: bool,
        sink: &mut HoistingSink,
    ) -> Result<(TargetExpr, Boundary), CompilerError> {
        let in_place = first_evaluation && self.binds_in_place(callee, arguments);
        let callee_expr = self.lower_storage(callee, first_evaluation, sink)?;

        let mut lowered_arguments = Vec::with_capacity(arguments.len());
        for (index, argument) in arguments.iter().enumerate() {
            let by_ref = argument.parameter.as_ref().is_some_and(|parameter| parameter.is_by_ref());
            let first_argument = in_place && index == 0;

            let expr = match by_ref {
                true => self.lower_storage(&argument.value, first_argument, sink)?,
                false => self.lower_expr(&argument.value, first_argument, sink)?,
            };

            lowered_arguments.push(CallArgument {
                expr,
                parameter: argument.parameter.to_owned(),
                entity: self.facts.denoted_entity(argument.value.id).cloned(),
                location: argument.value.location.to_owned(),
            });
        }

        let name = callee_name(callee);
        let call = PendingCall {
            callee: callee_expr,
            name: name.to_owned(),
            arguments: lowered_arguments,
            result_type: facts.source_type.to_owned(),
        };

        let bound = self.planner.bind_call(call, in_place, sink)?;

        if let Some(local_function) = &bound.local_function {
            conversion_log!(format!("[Lowering] call to '{}' moved into {}", name, local_function));
            self.warnings.push(CompilerWarning::new(
                name,
                callee.location.to_owned(),
                WarningKind::CallWrappedInLocalFunction,
            ));
        }

        Ok((bound.expr, Boundary::Facts))
    }

    // Temporaries are declared in front of the whole statement, so a call can only bind
    // its arguments in place when nothing with side effects runs before the last of them
    fn binds_in_place(&self, callee: &SourceExpr, arguments: &[SourceArgument]) -> bool {
        if !evaluates_nothing(callee) {
            return false;
        }

        let hoisting = arguments.iter().rposition(|argument| {
            let entity = self.facts.denoted_entity(argument.value.id);
            argument
                .parameter
                .as_ref()
                .is_some_and(|parameter| needs_hoisting(parameter, entity))
        });

        match hoisting {
            Some(last) => arguments[..last]
                .iter()
                .all(|argument| evaluates_nothing(&argument.value)),
            None => true,
        }
    }
}

fn native_binary(
    kind: OperatorKind,
    left: TargetExpr,
    right: TargetExpr,
    boundary: Boundary,
) -> Result<(TargetExpr, Boundary), CompilerError> {
    let Some(op) = kind.native_operator() else {
        return_compiler_error!("Operator '{}' reached native emission without a lowering", kind);
    };

    Ok((TargetExpr::binary(op, left, right), boundary))
}

// Reading it has no side effects a hoisted temporary could reorder
fn evaluates_nothing(expr: &SourceExpr) -> bool {
    match &expr.kind {
        SourceExprKind::Identifier(_) | SourceExprKind::Literal(_) => true,
        SourceExprKind::Parenthesized(inner) => evaluates_nothing(inner),
        SourceExprKind::MemberAccess { target, .. } => {
            matches!(target.kind, SourceExprKind::Identifier(_))
        }
        _ => false,
    }
}

fn callee_name(callee: &SourceExpr) -> &str {
    match &callee.kind {
        SourceExprKind::Identifier(name) => name.as_str(),
        SourceExprKind::MemberAccess { name, .. } => name.as_str(),
        SourceExprKind::Parenthesized(inner) => callee_name(inner),
        _ => "call",
    }
}
