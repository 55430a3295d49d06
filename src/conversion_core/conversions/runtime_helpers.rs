//! Registry of the source language's runtime support helpers.
//!
//! Conversions and operators whose source semantics the target cannot express
//! natively are lowered to calls into the source language's runtime library.

use crate::backends::target::target_expr::TargetExpr;
use crate::conversion_core::compiler_errors::CompilerError;
use crate::conversion_core::hoisting::hoisting_sink::HoistingSink;
use crate::conversion_core::operators::operator_case::{OperatorKind, UnaryOperatorKind};
use crate::conversion_core::type_facts::semantic_types::{SemanticType, SpecialType};
use crate::conversion_core::type_facts::type_identity::TypeIdentityKey;
use crate::return_compiler_error;
use crate::settings::{CompareMethod, RuntimeSettings, SYSTEM_NAMESPACE};
use rustc_hash::FxHashMap;

pub const CONVERSIONS_CLASS: &str = "Conversions";
pub const OPERATORS_CLASS: &str = "Operators";
pub const LIKE_OPERATOR_CLASS: &str = "LikeOperator";
pub const COMPARE_METHOD_ENUM: &str = "CompareMethod";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeHelper {
    pub class: String,
    pub method: String,

    // The import a call to this helper requires
    pub namespace: String,
}

impl RuntimeHelper {
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.class, self.method)
    }
}

// ======================================================
//                    REGISTRY
// ======================================================

#[derive(Debug, Clone)]
pub struct RuntimeHelpers {
    conversions: FxHashMap<TypeIdentityKey, RuntimeHelper>,
    char_array_conversion: RuntimeHelper,
    namespace: String,
    support_namespace: String,
}

impl Default for RuntimeHelpers {
    fn default() -> Self {
        RuntimeHelpers::new(&RuntimeSettings::default())
    }
}

impl RuntimeHelpers {
    pub fn new(settings: &RuntimeSettings) -> Self {
        let mut helpers = RuntimeHelpers {
            conversions: FxHashMap::default(),
            char_array_conversion: RuntimeHelper {
                class: CONVERSIONS_CLASS.to_owned(),
                method: String::from("ToCharArrayRankOne"),
                namespace: settings.namespace.to_owned(),
            },
            namespace: settings.namespace.to_owned(),
            support_namespace: settings.support_namespace.to_owned(),
        };

        // ======================================================
        //               BUILTIN CONVERSION HELPERS
        // ======================================================
        let builtins = [
            (SpecialType::Boolean, "ToBoolean"),
            (SpecialType::Char, "ToChar"),
            (SpecialType::SByte, "ToSByte"),
            (SpecialType::Byte, "ToByte"),
            (SpecialType::Int16, "ToShort"),
            (SpecialType::UInt16, "ToUShort"),
            (SpecialType::Int32, "ToInteger"),
            (SpecialType::UInt32, "ToUInteger"),
            (SpecialType::Int64, "ToLong"),
            (SpecialType::UInt64, "ToULong"),
            (SpecialType::Decimal, "ToDecimal"),
            (SpecialType::Single, "ToSingle"),
            (SpecialType::Double, "ToDouble"),
            (SpecialType::String, "ToString"),
            (SpecialType::DateTime, "ToDate"),
        ];

        for (special, method) in builtins {
            helpers.conversions.insert(
                TypeIdentityKey::of(&SemanticType::special(special)),
                RuntimeHelper {
                    class: CONVERSIONS_CLASS.to_owned(),
                    method: method.to_owned(),
                    namespace: settings.namespace.to_owned(),
                },
            );
        }

        helpers
    }

    pub fn register_conversion(
        &mut self,
        ty: &SemanticType,
        helper: RuntimeHelper,
    ) -> Result<(), CompilerError> {
        let key = TypeIdentityKey::of(ty);
        if self.conversions.contains_key(&key) {
            return_compiler_error!(
                "Conversion helper for '{}' is already registered.",
                ty.qualified_name
            );
        }

        self.conversions.insert(key, helper);
        Ok(())
    }

    /// The helper converting any value to `target`, if the runtime has one.
    pub fn conversion_helper(&self, target: &SemanticType) -> Option<&RuntimeHelper> {
        if target.is_char_array() {
            return Some(&self.char_array_conversion);
        }

        self.conversions.get(&TypeIdentityKey::of(target))
    }

    pub fn has_conversion_helper(&self, target: &SemanticType) -> bool {
        self.conversion_helper(target).is_some()
    }

    fn operators_helper(&self, method: String) -> RuntimeHelper {
        RuntimeHelper {
            class: OPERATORS_CLASS.to_owned(),
            method,
            namespace: self.namespace.to_owned(),
        }
    }

    // ======================================================
    //                  OPERATOR HELPERS
    // ======================================================

    /// `Operators.CompareObjectEqual` or, in a Boolean context, `Operators.ConditionalCompareObjectEqual`.
    pub fn object_comparison(&self, kind: OperatorKind, conditional: bool) -> RuntimeHelper {
        let prefix = match conditional {
            true => "ConditionalCompareObject",
            false => "CompareObject",
        };
        self.operators_helper(format!("{prefix}{}", kind.helper_stem()))
    }

    pub fn string_comparison(&self) -> RuntimeHelper {
        self.operators_helper(String::from("CompareString"))
    }

    /// Late-bound arithmetic, logical and concatenation operators: `Operators.AddObject` etc.
    pub fn object_operator(&self, kind: OperatorKind) -> RuntimeHelper {
        self.operators_helper(format!("{}Object", kind.helper_stem()))
    }

    pub fn object_unary_operator(&self, kind: UnaryOperatorKind) -> RuntimeHelper {
        self.operators_helper(format!("{}Object", kind.helper_stem()))
    }

    pub fn like(&self, late_bound: bool) -> RuntimeHelper {
        let method = match late_bound {
            true => "LikeObject",
            false => "LikeString",
        };
        RuntimeHelper {
            class: LIKE_OPERATOR_CLASS.to_owned(),
            method: method.to_owned(),
            namespace: self.namespace.to_owned(),
        }
    }

    pub fn power(&self) -> RuntimeHelper {
        RuntimeHelper {
            class: String::from("Math"),
            method: String::from("Pow"),
            namespace: SYSTEM_NAMESPACE.to_owned(),
        }
    }

    /// `CompareMethod.Binary` / `CompareMethod.Text`, registering its namespace.
    pub fn compare_method(&self, method: CompareMethod, sink: &mut HoistingSink) -> TargetExpr {
        sink.require_import(&self.support_namespace);
        TargetExpr::member(
            TargetExpr::identifier(COMPARE_METHOD_ENUM),
            method.member_name(),
        )
    }

    /// A call to `helper`, registering the import it needs.
    pub fn call(&self, helper: &RuntimeHelper, args: Vec<TargetExpr>, sink: &mut HoistingSink) -> TargetExpr {
        sink.require_import(&helper.namespace);
        TargetExpr::call(helper.qualified_name(), args)
    }
}
