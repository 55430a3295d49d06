use crate::backends::target::target_expr::TargetExpr;
use crate::backends::target::target_statement::TargetStatement;
use crate::conversion_core::compiler_errors::CompilerError;
use crate::conversion_core::hoisting::hoisting_sink::{HoistScope, HoistedItem, HoistingSink};
use crate::conversion_core::type_facts::semantic_types::{SemanticType, SpecialType};
use crate::conversion_core::type_facts::type_identity::TypeIdentityTable;
use crate::hoist_log;

/// Moves `invocation` and the items hoisted while binding it into a local function
/// declared before the current statement, and returns a call to that function.
///
/// ```text
/// int localUpdate()
/// {
///     int argTotal = Total;
///     int result = Update(ref argTotal);
///     Total = argTotal;
///     return result;
/// }
/// ```
pub fn wrap_in_local_function(
    name: &str,
    invocation: TargetExpr,
    scope: HoistScope,
    result_type: Option<&SemanticType>,
    identities: &TypeIdentityTable,
    sink: &mut HoistingSink,
) -> Result<TargetExpr, CompilerError> {
    hoist_log!(format!(
        "[Hoist] wrapping {} with {} hoisted items into {}",
        invocation,
        scope.len(),
        name
    ));

    let (return_type, body) = match result_type {
        Some(ty) if !ty.is_special(SpecialType::Void) => {
            let type_name = identities.target_name(ty);
            let result = sink.unique_identifier("result");

            let declaration =
                TargetStatement::declaration(result.as_str(), Some(type_name.clone()), Some(invocation));
            let mut body = scope.splice(declaration);
            body.push(TargetStatement::Return(Some(TargetExpr::identifier(result))));

            (type_name, body)
        }
        _ => (
            String::from("void"),
            scope.splice(TargetStatement::Expression(invocation)),
        ),
    };

    sink.push(HoistedItem::local_function(TargetStatement::LocalFunction {
        name: name.to_owned(),
        return_type,
        body,
    }))?;

    Ok(TargetExpr::call(name, vec![]))
}
