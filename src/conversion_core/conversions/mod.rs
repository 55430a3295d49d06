pub mod classifier;
pub mod conversion_kind;
pub mod emitter;
pub mod literal_narrowing;
pub mod runtime_helpers;


use crate::backends::target::target_expr::TargetExpr;
use crate::conversion_core::conversions::classifier::{ClassifyOptions, ConversionClassifier};
use crate::conversion_core::conversions::conversion_kind::ConversionKind;
use crate::conversion_core::conversions::emitter::ConversionEmitter;
use crate::conversion_core::conversions::runtime_helpers::RuntimeHelpers;
use crate::conversion_core::hoisting::hoisting_sink::HoistingSink;
use crate::conversion_core::type_facts::semantic_types::SemanticType;
use crate::conversion_core::type_facts::type_facts::TypeFacts;
use crate::conversion_core::type_facts::type_identity::TypeIdentityTable;

/// Classification followed by emission, the way every lowering step applies a conversion.
pub struct ConversionPipeline<'a> {
    pub classifier: ConversionClassifier<'a>,
    pub emitter: ConversionEmitter<'a>,
    pub identities: &'a TypeIdentityTable,
    pub helpers: &'a RuntimeHelpers,
}

impl<'a> ConversionPipeline<'a> {
    pub fn new(identities: &'a TypeIdentityTable, helpers: &'a RuntimeHelpers) -> Self {
        ConversionPipeline {
            classifier: ConversionClassifier::new(identities, helpers),
            emitter: ConversionEmitter::new(identities, helpers),
            identities,
            helpers,
        }
    }

    /// Converts `expr` across the boundary described by `facts` and `options`.
    pub fn convert(
        &self,
        expr: TargetExpr,
        facts: &TypeFacts,
        options: &ClassifyOptions,
        sink: &mut HoistingSink,
    ) -> TargetExpr {
        let source = options.forced_source.or(facts.source_type.as_ref());
        let target = options.forced_target.or(facts.converted_type.as_ref());

        let (Some(source), Some(target)) = (source, target) else {
            return expr;
        };

        let kind = self.classifier.classify(facts, options);
        self.emitter.emit(kind, expr, source, target, sink)
    }

    /// Converts between two plain types, with no literal or constant facts involved.
    pub fn convert_between(
        &self,
        expr: TargetExpr,
        from: &SemanticType,
        to: &SemanticType,
        sink: &mut HoistingSink,
    ) -> TargetExpr {
        let facts = TypeFacts::conversion(from.to_owned(), to.to_owned());
        let kind = self.classifier.classify(&facts, &ClassifyOptions::default());
        self.emitter.emit(kind, expr, from, to, sink)
    }

    pub fn classify_between(&self, from: &SemanticType, to: &SemanticType) -> ConversionKind {
        self.classifier
            .classify(&TypeFacts::default(), &ClassifyOptions::forced(from, to))
    }
}
