use crate::backends::target::TargetWriter;
use crate::backends::target::TargetOutputConfig;
use crate::backends::target::target_expr::TargetExpr;
use crate::backends::target::target_statement::TargetStatement;
use crate::conversion_core::compiler_errors::ErrorType;
use crate::conversion_core::conversions::ConversionPipeline;
use crate::conversion_core::conversions::runtime_helpers::RuntimeHelpers;
use crate::conversion_core::hoisting::hoisting_sink::{HoistKind, HoistingSink};
use crate::conversion_core::ref_arguments::argument_binder::{
    CallArgument, PendingCall, RefArgumentPlanner, temporary_name,
};
use crate::conversion_core::ref_arguments::binding_plan::{
    RefBindingPlan, computed_container, needs_hoisting, plan_argument,
};
use crate::conversion_core::type_facts::semantic_types::{SemanticType, SpecialType};
use crate::conversion_core::type_facts::symbols::{DenotedEntity, ParameterInfo};
use crate::conversion_core::type_facts::type_identity::TypeIdentityTable;

fn local(name: &str, ty: SemanticType) -> DenotedEntity {
    DenotedEntity::Local {
        name: name.to_owned(),
        ty,
        read_only: false,
    }
}

fn property(name: &str, ty: SemanticType, has_setter: bool) -> DenotedEntity {
    DenotedEntity::Property {
        name: name.to_owned(),
        ty,
        has_getter: true,
        has_setter,
    }
}

fn int_ref() -> ParameterInfo {
    ParameterInfo::by_ref("value", SemanticType::int32())
}

fn render(statements: &[TargetStatement]) -> String {
    let mut writer = TargetWriter::new(TargetOutputConfig::default());
    for statement in statements {
        writer.write_statement(statement);
    }
    writer.finish()
}

struct Fixture {
    identities: TypeIdentityTable,
    helpers: RuntimeHelpers,
}

impl Fixture {
    fn new() -> Self {
        Fixture {
            identities: TypeIdentityTable::with_builtins(),
            helpers: RuntimeHelpers::default(),
        }
    }
}

#[test]
fn plans_follow_the_denoted_entity() {
    let parameter = int_ref();

    assert_eq!(plan_argument(&parameter, &local("total", SemanticType::int32())), RefBindingPlan::Inline);
    assert_eq!(
        plan_argument(&parameter, &property("Total", SemanticType::int32(), false)),
        RefBindingPlan::PreAssignment
    );
    assert_eq!(
        plan_argument(&parameter, &property("Total", SemanticType::int32(), true)),
        RefBindingPlan::PreAndPostAssignment
    );
    assert_eq!(
        plan_argument(&parameter, &DenotedEntity::Constant { ty: SemanticType::int32() }),
        RefBindingPlan::PreAssignment
    );
    assert_eq!(
        plan_argument(
            &parameter,
            &DenotedEntity::Field {
                name: String::from("limit"),
                ty: SemanticType::int32(),
                read_only: true,
            }
        ),
        RefBindingPlan::PreAssignment
    );
    assert_eq!(
        plan_argument(&parameter, &local("count", SemanticType::special(SpecialType::Int16))),
        RefBindingPlan::PreAndPostAssignment
    );
    assert_eq!(
        plan_argument(
            &parameter,
            &DenotedEntity::ByRefCall {
                name: String::from("Slot"),
                ty: SemanticType::int32(),
            }
        ),
        RefBindingPlan::Inline
    );
}

#[test]
fn by_value_parameters_are_always_inline() {
    let parameter = ParameterInfo::by_value("value", SemanticType::int32());
    let entity = property("Total", SemanticType::int32(), false);

    assert_eq!(plan_argument(&parameter, &entity), RefBindingPlan::Inline);
    assert!(!needs_hoisting(&parameter, Some(&entity)));
}

#[test]
fn read_only_property_gets_one_temporary_and_no_write_back() {
    let fixture = Fixture::new();
    let pipeline = ConversionPipeline::new(&fixture.identities, &fixture.helpers);
    let planner = RefArgumentPlanner::new(&pipeline);

    let mut sink = HoistingSink::new();
    sink.push_scope();

    let argument = CallArgument::by_ref(
        TargetExpr::identifier("Total"),
        int_ref(),
        property("Total", SemanticType::int32(), false),
    );
    let bound = planner.bind_argument(argument, &mut sink).unwrap();
    assert_eq!(bound.plan, RefBindingPlan::PreAssignment);
    assert_eq!(bound.expr.to_string(), "ref argTotal");

    let scope = sink.pop_scope().unwrap();
    assert_eq!(scope.count(HoistKind::Declaration), 1);
    assert_eq!(scope.count(HoistKind::Assignment), 0);

    let call = TargetStatement::Expression(TargetExpr::call("Update", vec![bound.expr]));
    assert_eq!(
        render(&scope.splice(call)),
        "int argTotal = Total;\nUpdate(ref argTotal);\n"
    );
}

#[test]
fn writable_property_is_written_back_after_the_call() {
    let fixture = Fixture::new();
    let pipeline = ConversionPipeline::new(&fixture.identities, &fixture.helpers);
    let planner = RefArgumentPlanner::new(&pipeline);

    let mut sink = HoistingSink::new();
    sink.push_scope();

    let argument = CallArgument::by_ref(
        TargetExpr::member(TargetExpr::identifier("order"), "Total"),
        int_ref(),
        property("Total", SemanticType::int32(), true),
    );
    let bound = planner.bind_argument(argument, &mut sink).unwrap();

    let scope = sink.pop_scope().unwrap();
    assert_eq!(scope.count(HoistKind::Declaration), 1);
    assert_eq!(scope.count(HoistKind::Assignment), 1);

    let call = TargetStatement::Expression(TargetExpr::call("Update", vec![bound.expr]));
    assert_eq!(
        render(&scope.splice(call)),
        "int argTotal = order.Total;\nUpdate(ref argTotal);\norder.Total = argTotal;\n"
    );
}

#[test]
fn mismatched_types_convert_both_ways() {
    let fixture = Fixture::new();
    let pipeline = ConversionPipeline::new(&fixture.identities, &fixture.helpers);
    let planner = RefArgumentPlanner::new(&pipeline);

    let mut sink = HoistingSink::new();
    sink.push_scope();

    let argument = CallArgument::by_ref(
        TargetExpr::identifier("amount"),
        int_ref(),
        local("amount", SemanticType::special(SpecialType::Int64)),
    );
    let bound = planner.bind_argument(argument, &mut sink).unwrap();
    assert_eq!(bound.plan, RefBindingPlan::PreAndPostAssignment);

    let scope = sink.pop_scope().unwrap();
    let call = TargetStatement::Expression(TargetExpr::call("Update", vec![bound.expr]));
    assert_eq!(
        render(&scope.splice(call)),
        "int argAmount = Conversions.ToInteger(amount);\nUpdate(ref argAmount);\namount = (long)argAmount;\n"
    );
}

#[test]
fn out_parameters_declare_without_initializer() {
    let fixture = Fixture::new();
    let pipeline = ConversionPipeline::new(&fixture.identities, &fixture.helpers);
    let planner = RefArgumentPlanner::new(&pipeline);

    let mut sink = HoistingSink::new();
    sink.push_scope();

    let argument = CallArgument::by_ref(
        TargetExpr::identifier("Parsed"),
        ParameterInfo::out("result", SemanticType::int32()),
        property("Parsed", SemanticType::int32(), true),
    );
    let bound = planner.bind_argument(argument, &mut sink).unwrap();
    assert_eq!(bound.expr.to_string(), "out argParsed");

    let scope = sink.pop_scope().unwrap();
    let call = TargetStatement::Expression(TargetExpr::call("TryRead", vec![bound.expr]));
    assert_eq!(
        render(&scope.splice(call)),
        "int argParsed;\nTryRead(out argParsed);\nParsed = argParsed;\n"
    );
}

#[test]
fn computed_container_is_hoisted_before_the_element() {
    let items = SemanticType::array(SemanticType::int32(), 1);
    let entity = DenotedEntity::ElementAccess {
        ty: SemanticType::int32(),
        container: Box::new(DenotedEntity::ValueCall {
            name: String::from("Items"),
            ty: items,
        }),
    };

    assert!(matches!(computed_container(&entity), Some((1, DenotedEntity::ValueCall { .. }))));
    assert!(needs_hoisting(&int_ref(), Some(&entity)));

    let fixture = Fixture::new();
    let pipeline = ConversionPipeline::new(&fixture.identities, &fixture.helpers);
    let planner = RefArgumentPlanner::new(&pipeline);

    let mut sink = HoistingSink::new();
    sink.push_scope();

    let element = TargetExpr::ElementAccess {
        target: Box::new(TargetExpr::call("GetItems", vec![])),
        indices: vec![TargetExpr::identifier("i")],
    };
    let bound = planner
        .bind_argument(CallArgument::by_ref(element, int_ref(), entity), &mut sink)
        .unwrap();
    assert_eq!(bound.plan, RefBindingPlan::Inline);
    assert_eq!(bound.expr.to_string(), "ref argItems[i]");

    let scope = sink.pop_scope().unwrap();
    assert_eq!(scope.count(HoistKind::Declaration), 1);
    assert_eq!(
        render(scope.items().iter().map(|item| item.payload.clone()).collect::<Vec<_>>().as_slice()),
        "int[] argItems = GetItems();\n"
    );
}

#[test]
fn nested_element_access_hoists_the_innermost_computed_container_once() {
    let grid = SemanticType::array(SemanticType::array(SemanticType::int32(), 1), 1);
    let entity = DenotedEntity::ElementAccess {
        ty: SemanticType::int32(),
        container: Box::new(DenotedEntity::ElementAccess {
            ty: SemanticType::array(SemanticType::int32(), 1),
            container: Box::new(DenotedEntity::Property {
                name: String::from("Grid"),
                ty: grid,
                has_getter: true,
                has_setter: false,
            }),
        }),
    };

    let fixture = Fixture::new();
    let pipeline = ConversionPipeline::new(&fixture.identities, &fixture.helpers);
    let planner = RefArgumentPlanner::new(&pipeline);

    let mut sink = HoistingSink::new();
    sink.push_scope();

    let element = TargetExpr::ElementAccess {
        target: Box::new(TargetExpr::ElementAccess {
            target: Box::new(TargetExpr::member(TargetExpr::identifier("board"), "Grid")),
            indices: vec![TargetExpr::identifier("row")],
        }),
        indices: vec![TargetExpr::identifier("column")],
    };
    let bound = planner
        .bind_argument(CallArgument::by_ref(element, int_ref(), entity), &mut sink)
        .unwrap();
    assert_eq!(bound.expr.to_string(), "ref argGrid[row][column]");

    let scope = sink.pop_scope().unwrap();
    assert_eq!(scope.len(), 1);
}

#[test]
fn binding_a_by_value_argument_is_an_internal_error() {
    let fixture = Fixture::new();
    let pipeline = ConversionPipeline::new(&fixture.identities, &fixture.helpers);
    let planner = RefArgumentPlanner::new(&pipeline);

    let mut sink = HoistingSink::new();
    sink.push_scope();

    let error = planner
        .bind_argument(CallArgument::by_value(TargetExpr::identifier("x")), &mut sink)
        .unwrap_err();
    assert_eq!(error.error_type, ErrorType::Compiler);
    assert!(error.aborts_document());
}

#[test]
fn by_ref_argument_without_entity_is_a_fact_error() {
    let fixture = Fixture::new();
    let pipeline = ConversionPipeline::new(&fixture.identities, &fixture.helpers);
    let planner = RefArgumentPlanner::new(&pipeline);

    let mut sink = HoistingSink::new();
    sink.push_scope();

    let argument = CallArgument {
        entity: None,
        ..CallArgument::by_ref(TargetExpr::identifier("x"), int_ref(), local("x", SemanticType::int32()))
    };
    let error = planner.bind_argument(argument, &mut sink).unwrap_err();
    assert_eq!(error.error_type, ErrorType::Facts);
}

#[test]
fn first_evaluation_hoists_into_the_statement_scope() {
    let fixture = Fixture::new();
    let pipeline = ConversionPipeline::new(&fixture.identities, &fixture.helpers);
    let planner = RefArgumentPlanner::new(&pipeline);

    let mut sink = HoistingSink::new();
    sink.push_scope();

    let call = PendingCall {
        callee: TargetExpr::identifier("Update"),
        name: String::from("Update"),
        arguments: vec![CallArgument::by_ref(
            TargetExpr::identifier("Total"),
            int_ref(),
            property("Total", SemanticType::int32(), true),
        )],
        result_type: None,
    };

    let bound = planner.bind_call(call, true, &mut sink).unwrap();
    assert_eq!(bound.local_function, None);
    assert_eq!(bound.expr.to_string(), "Update(ref argTotal)");
    assert_eq!(sink.pop_scope().unwrap().len(), 2);
}

#[test]
fn later_evaluation_moves_the_call_into_a_local_function() {
    let fixture = Fixture::new();
    let pipeline = ConversionPipeline::new(&fixture.identities, &fixture.helpers);
    let planner = RefArgumentPlanner::new(&pipeline);

    let mut sink = HoistingSink::new();
    sink.push_scope();

    let call = PendingCall {
        callee: TargetExpr::identifier("Update"),
        name: String::from("Update"),
        arguments: vec![
            CallArgument::by_value(TargetExpr::integer(1)),
            CallArgument::by_ref(
                TargetExpr::identifier("Total"),
                int_ref(),
                property("Total", SemanticType::int32(), true),
            ),
        ],
        result_type: Some(SemanticType::boolean()),
    };

    let bound = planner.bind_call(call, false, &mut sink).unwrap();
    assert_eq!(bound.local_function.as_deref(), Some("localUpdate"));
    assert_eq!(bound.expr.to_string(), "localUpdate()");

    let scope = sink.pop_scope().unwrap();
    assert_eq!(scope.len(), 1);
    assert_eq!(scope.count(HoistKind::LocalFunction), 1);

    let statement = TargetStatement::Expression(TargetExpr::identifier("done"));
    assert_eq!(
        render(&scope.splice(statement)),
        "bool localUpdate()\n{\n    int argTotal = Total;\n    bool result = Update(1, ref argTotal);\n    Total = argTotal;\n    return result;\n}\ndone;\n"
    );
}

#[test]
fn plain_arguments_never_wrap() {
    let fixture = Fixture::new();
    let pipeline = ConversionPipeline::new(&fixture.identities, &fixture.helpers);
    let planner = RefArgumentPlanner::new(&pipeline);

    let mut sink = HoistingSink::new();
    sink.push_scope();

    let call = PendingCall {
        callee: TargetExpr::member(TargetExpr::identifier("list"), "Swap"),
        name: String::from("Swap"),
        arguments: vec![CallArgument::by_ref(
            TargetExpr::identifier("a"),
            int_ref(),
            local("a", SemanticType::int32()),
        )],
        result_type: None,
    };

    let bound = planner.bind_call(call, false, &mut sink).unwrap();
    assert_eq!(bound.local_function, None);
    assert_eq!(bound.expr.to_string(), "list.Swap(ref a)");
    assert!(sink.pop_scope().unwrap().is_empty());
}

#[test]
fn temporaries_are_named_after_their_origin() {
    assert_eq!(temporary_name("total"), "argTotal");
    assert_eq!(temporary_name("Items"), "argItems");

    let mut sink = HoistingSink::new();
    sink.reserve_identifier("argTotal");
    assert_eq!(sink.unique_identifier(&temporary_name("Total")), "argTotal1");
}
