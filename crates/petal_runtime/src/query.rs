//! Query plan data model for Petal GraphQL.
//!
//! Plans are produced by an external planner from a parsed operation;
//! the executor consumes them as data. Sibling selections are grouped
//! under [`PlanNode::Parallel`], serially-executed selections (mutation
//! root fields) under [`PlanNode::Sequence`].

use serde_json::Value;

/// A query plan.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    /// The root node of the plan.
    pub root: PlanNode,
    /// Name of the executed operation, if any.
    pub operation_name: Option<String>,
    /// Kind of the executed operation.
    pub operation_kind: OperationKind,
}

impl QueryPlan {
    /// Creates a plan for an anonymous query operation.
    pub fn query(root: PlanNode) -> Self {
        Self {
            root,
            operation_name: None,
            operation_kind: OperationKind::Query,
        }
    }
}

/// The kind of a GraphQL operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

/// A node in the query plan.
#[derive(Debug, Clone)]
pub enum PlanNode {
    /// Sequential execution.
    Sequence(Vec<PlanNode>),
    /// Parallel execution.
    Parallel(Vec<PlanNode>),
    /// A field with nested selections.
    Field {
        info: FieldInfo,
        children: Box<PlanNode>,
    },
    /// A leaf field to resolve.
    Leaf { field: FieldInfo },
}

/// A field occurrence in a plan.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    /// The field name.
    pub name: String,
    /// The response alias, if any.
    pub alias: Option<String>,
    /// The parent type name.
    pub parent_type: String,
    /// The return type name.
    pub return_type: String,
    /// Coerced argument values.
    pub arguments: Vec<(String, Value)>,
    /// True for engine-internal fields such as `__typename`.
    pub is_introspection: bool,
}

impl FieldInfo {
    /// Creates a new field occurrence.
    pub fn new(
        name: impl Into<String>,
        parent_type: impl Into<String>,
        return_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            alias: None,
            parent_type: parent_type.into(),
            return_type: return_type.into(),
            arguments: Vec::new(),
            is_introspection: false,
        }
    }

    /// Sets the response alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Sets the argument values.
    pub fn with_arguments(mut self, arguments: Vec<(String, Value)>) -> Self {
        self.arguments = arguments;
        self
    }

    /// Marks the field as engine-internal.
    pub fn introspection(mut self) -> Self {
        self.is_introspection = true;
        self
    }

    /// The key the field resolves under in the response.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}
