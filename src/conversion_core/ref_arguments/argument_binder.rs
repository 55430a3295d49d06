use crate::backends::target::target_expr::{ArgumentModifier, TargetExpr};
use crate::backends::target::target_statement::TargetStatement;
use crate::conversion_core::compiler_errors::{CompilerError, TextLocation};
use crate::conversion_core::conversions::ConversionPipeline;
use crate::conversion_core::hoisting::hoisting_sink::{HoistedItem, HoistingSink};
use crate::conversion_core::ref_arguments::binding_plan::{
    RefBindingPlan, computed_container, needs_hoisting, plan_argument,
};
use crate::conversion_core::ref_arguments::local_function::wrap_in_local_function;
use crate::conversion_core::type_facts::semantic_types::SemanticType;
use crate::conversion_core::type_facts::symbols::{DenotedEntity, ParameterInfo, RefKind};
use crate::{hoist_log, return_compiler_error, return_fact_error};

/// One lowered argument together with what the facts say it is bound to.
#[derive(Clone, Debug)]
pub struct CallArgument {
    pub expr: TargetExpr,
    pub parameter: Option<ParameterInfo>,
    pub entity: Option<DenotedEntity>,
    pub location: TextLocation,
}

impl CallArgument {
    pub fn by_value(expr: TargetExpr) -> Self {
        CallArgument {
            expr,
            parameter: None,
            entity: None,
            location: TextLocation::default(),
        }
    }

    pub fn by_ref(expr: TargetExpr, parameter: ParameterInfo, entity: DenotedEntity) -> Self {
        CallArgument {
            expr,
            parameter: Some(parameter),
            entity: Some(entity),
            location: TextLocation::default(),
        }
    }

    fn is_by_ref(&self) -> bool {
        self.parameter.as_ref().is_some_and(ParameterInfo::is_by_ref)
    }

    fn needs_hoisting(&self) -> bool {
        match &self.parameter {
            Some(parameter) => needs_hoisting(parameter, self.entity.as_ref()),
            None => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoundArgument {
    pub expr: TargetExpr,
    pub plan: RefBindingPlan,
}

/// A call whose callee and arguments are lowered but not yet bound.
#[derive(Clone, Debug)]
pub struct PendingCall {
    pub callee: TargetExpr,
    pub name: String,
    pub arguments: Vec<CallArgument>,

    // None for calls whose value is discarded
    pub result_type: Option<SemanticType>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoundCall {
    pub expr: TargetExpr,

    // The local function the call was moved into, if it had to be
    pub local_function: Option<String>,
}

/// Binds by-reference arguments, hoisting temporaries and write-backs into the sink.
pub struct RefArgumentPlanner<'a> {
    pipeline: &'a ConversionPipeline<'a>,
}

impl<'a> RefArgumentPlanner<'a> {
    pub fn new(pipeline: &'a ConversionPipeline<'a>) -> Self {
        RefArgumentPlanner { pipeline }
    }

    pub fn bind_call(
        &self,
        call: PendingCall,
        first_evaluation: bool,
        sink: &mut HoistingSink,
    ) -> Result<BoundCall, CompilerError> {
        let wraps = !first_evaluation && call.arguments.iter().any(CallArgument::needs_hoisting);

        if !wraps {
            let args = self.bind_arguments(call.arguments, sink)?;
            return Ok(BoundCall {
                expr: TargetExpr::invoke(call.callee, args),
                local_function: None,
            });
        }

        // Hoisted items of a call that is not evaluated first would run too early,
        // so the whole call moves into a local function invoked in its place
        sink.push_scope();
        let args = self.bind_arguments(call.arguments, sink);
        let scope = sink.pop_scope()?;
        let args = args?;

        let invocation = TargetExpr::invoke(call.callee, args);
        let name = sink.unique_identifier(&format!("local{}", capitalized(&call.name)));
        let expr = wrap_in_local_function(
            &name,
            invocation,
            scope,
            call.result_type.as_ref(),
            self.pipeline.identities,
            sink,
        )?;

        Ok(BoundCall {
            expr,
            local_function: Some(name),
        })
    }

    fn bind_arguments(
        &self,
        arguments: Vec<CallArgument>,
        sink: &mut HoistingSink,
    ) -> Result<Vec<TargetExpr>, CompilerError> {
        let mut bound = Vec::with_capacity(arguments.len());
        for argument in arguments {
            match argument.is_by_ref() {
                true => bound.push(self.bind_argument(argument, sink)?.expr),
                false => bound.push(argument.expr),
            }
        }

        Ok(bound)
    }

    /// Emits the binding of one argument to a `ref` or `out` parameter.
    pub fn bind_argument(
        &self,
        argument: CallArgument,
        sink: &mut HoistingSink,
    ) -> Result<BoundArgument, CompilerError> {
        let CallArgument {
            mut expr,
            parameter,
            entity,
            location,
        } = argument;

        let parameter = match parameter {
            Some(parameter) if parameter.is_by_ref() => parameter,
            _ => return_compiler_error!("Tried to bind a by-value argument '{}' by reference", expr),
        };

        let Some(entity) = entity else {
            return_fact_error!(
                format!("No denoted entity for the argument to '{}'", parameter.name),
                location,
                {
                    ExpectedType => parameter.ty.to_string(),
                }
            );
        };

        if let Some((depth, container)) = computed_container(&entity) {
            self.hoist_container(&mut expr, depth, container, sink)?;
        }

        let plan = plan_argument(&parameter, &entity);
        hoist_log!(format!("[Hoist] argument {} for '{}': {:?}", expr, parameter.name, plan));

        let modifier = match parameter.ref_kind {
            RefKind::Out => ArgumentModifier::Out,
            _ => ArgumentModifier::Ref,
        };

        if !plan.needs_temporary() {
            return Ok(BoundArgument {
                expr: TargetExpr::argument(modifier, expr),
                plan,
            });
        }

        let natural = entity.ty();
        let temporary = sink.unique_identifier(&temporary_name(entity.name().unwrap_or(&parameter.name)));

        let initializer = match (&entity, parameter.ref_kind) {
            (_, RefKind::Out) => None,
            (DenotedEntity::Property { has_getter: false, .. }, _) => Some(TargetExpr::Default(
                self.pipeline.identities.target_name(&parameter.ty),
            )),
            _ => Some(
                self.pipeline
                    .convert_between(expr.clone(), natural, &parameter.ty, sink),
            ),
        };

        sink.push(HoistedItem::declaration(TargetStatement::declaration(
            temporary.as_str(),
            Some(self.pipeline.identities.target_name(&parameter.ty)),
            initializer,
        )))?;

        if plan.writes_back() {
            let value = self.pipeline.convert_between(
                TargetExpr::identifier(temporary.as_str()),
                &parameter.ty,
                natural,
                sink,
            );
            sink.push(HoistedItem::write_back(TargetStatement::assignment(expr, value)))?;
        }

        Ok(BoundArgument {
            expr: TargetExpr::argument(modifier, TargetExpr::identifier(temporary)),
            plan,
        })
    }

    // Replaces the container `depth` element accesses down with a temporary holding its value
    fn hoist_container(
        &self,
        expr: &mut TargetExpr,
        depth: usize,
        container: &DenotedEntity,
        sink: &mut HoistingSink,
    ) -> Result<(), CompilerError> {
        let mut cursor = expr;
        for _ in 1..depth {
            cursor = match cursor {
                TargetExpr::ElementAccess { target, .. } => target.as_mut(),
                other => return_compiler_error!(
                    "Element access facts do not match the lowered argument '{}'",
                    other
                ),
            };
        }

        let TargetExpr::ElementAccess { target, .. } = cursor else {
            return_compiler_error!("Element access facts point past the lowered argument");
        };

        let raw_name = container.name().unwrap_or_else(|| container.ty().simple_name());
        let temporary = sink.unique_identifier(&temporary_name(raw_name));
        let value = std::mem::replace(target.as_mut(), TargetExpr::identifier(temporary.as_str()));

        sink.push(HoistedItem::declaration(TargetStatement::declaration(
            temporary,
            Some(self.pipeline.identities.target_name(container.ty())),
            Some(value),
        )))
    }
}

fn capitalized(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `Total` becomes `argTotal`.
pub fn temporary_name(name: &str) -> String {
    format!("arg{}", capitalized(name))
}
