use crate::conversion_core::compiler_errors::TextLocation;
use crate::conversion_core::operators::operator_case::{OperatorKind, UnaryOperatorKind};
use crate::conversion_core::type_facts::semantic_types::SemanticType;
use crate::conversion_core::type_facts::symbols::{DenotedEntity, ParameterInfo};
use crate::conversion_core::type_facts::type_facts::{ConstantValue, TypeFacts};
use serde::{Deserialize, Serialize};

/// Identifies an expression node within one document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceDocument {
    pub name: String,

    // The source module's `Option Compare`, when it overrides the configured default
    #[serde(default)]
    pub compare_text: Option<bool>,
    #[serde(default)]
    pub members: Vec<SourceMember>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceMember {
    pub name: String,
    #[serde(default)]
    pub location: TextLocation,

    // Lambdas converted to expression trees restrict which operators can be lowered
    #[serde(default)]
    pub in_expression_tree: bool,
    #[serde(default)]
    pub statements: Vec<SourceStatement>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "statement", rename_all = "snake_case")]
pub enum SourceStatement {
    Assign {
        target: SourceExpr,
        value: SourceExpr,
    },
    Expression {
        expr: SourceExpr,
    },
    Return {
        #[serde(default)]
        value: Option<SourceExpr>,
    },
    Local {
        name: String,
        #[serde(rename = "type")]
        ty: SemanticType,
        #[serde(default)]
        initializer: Option<SourceExpr>,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceExpr {
    pub id: NodeId,
    pub kind: SourceExprKind,
    #[serde(default)]
    pub facts: Option<TypeFacts>,

    // What the node denotes, for nodes passed to by-reference parameters
    #[serde(default)]
    pub denoted: Option<DenotedEntity>,
    #[serde(default)]
    pub location: TextLocation,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceExprKind {
    Identifier(String),
    Literal(ConstantValue),
    Parenthesized(Box<SourceExpr>),
    MemberAccess {
        target: Box<SourceExpr>,
        name: String,
    },
    ElementAccess {
        target: Box<SourceExpr>,
        indices: Vec<SourceExpr>,
    },
    Unary {
        op: UnaryOperatorKind,
        operand: Box<SourceExpr>,
    },
    Binary {
        op: OperatorKind,
        left: Box<SourceExpr>,
        right: Box<SourceExpr>,
    },
    Call {
        callee: Box<SourceExpr>,
        #[serde(default)]
        arguments: Vec<SourceArgument>,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceArgument {
    pub value: SourceExpr,

    // Absent for by-value arguments of calls the facts provider did not resolve
    #[serde(default)]
    pub parameter: Option<ParameterInfo>,
}

impl SourceExpr {
    pub fn new(id: u32, kind: SourceExprKind) -> Self {
        SourceExpr {
            id: NodeId(id),
            kind,
            facts: None,
            denoted: None,
            location: TextLocation::default(),
        }
    }

    pub fn with_facts(mut self, facts: TypeFacts) -> Self {
        self.facts = Some(facts);
        self
    }

    pub fn denoting(mut self, entity: DenotedEntity) -> Self {
        self.denoted = Some(entity);
        self
    }

    /// Direct children, in evaluation order.
    pub fn children(&self) -> Vec<&SourceExpr> {
        match &self.kind {
            SourceExprKind::Identifier(_) | SourceExprKind::Literal(_) => Vec::new(),
            SourceExprKind::Parenthesized(inner) => vec![inner.as_ref()],
            SourceExprKind::MemberAccess { target, .. } => vec![target.as_ref()],
            SourceExprKind::ElementAccess { target, indices } => {
                let mut children = vec![target.as_ref()];
                children.extend(indices.iter());
                children
            }
            SourceExprKind::Unary { operand, .. } => vec![operand.as_ref()],
            SourceExprKind::Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            SourceExprKind::Call { callee, arguments } => {
                let mut children = vec![callee.as_ref()];
                children.extend(arguments.iter().map(|argument| &argument.value));
                children
            }
        }
    }
}

impl SourceStatement {
    /// Top-level expressions of the statement.
    pub fn expressions(&self) -> Vec<&SourceExpr> {
        match self {
            SourceStatement::Assign { target, value } => vec![target, value],
            SourceStatement::Expression { expr } => vec![expr],
            SourceStatement::Return { value } => value.iter().collect(),
            SourceStatement::Local { initializer, .. } => initializer.iter().collect(),
        }
    }
}
