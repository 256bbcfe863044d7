//! Query execution for Petal GraphQL.

use crate::extensions::{Extension, NextResolve, ResolveContext};
use crate::query::{FieldInfo, PlanNode, QueryPlan};
use crate::resolver::{ResolverArgs, ResolverError, ResolverInfo, ResolverMap};
use crate::schema::Schema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Executor configuration.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Emit a trace event per resolved field.
    pub tracing: bool,
    /// Timeout for field resolution in milliseconds; 0 disables it.
    pub field_timeout_ms: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            tracing: false,
            field_timeout_ms: 30000,
        }
    }
}

/// The query executor.
pub struct Executor {
    config: ExecutorConfig,
    resolvers: Arc<ResolverMap>,
    extensions: Vec<Arc<dyn Extension>>,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("config", &self.config)
            .field("extension_count", &self.extensions.len())
            .finish()
    }
}

impl Executor {
    /// Creates a new executor.
    pub fn new() -> Self {
        Self {
            config: ExecutorConfig::default(),
            resolvers: Arc::new(ResolverMap::new()),
            extensions: Vec::new(),
        }
    }

    /// Creates an executor with configuration.
    pub fn with_config(config: ExecutorConfig) -> Self {
        Self {
            config,
            resolvers: Arc::new(ResolverMap::new()),
            extensions: Vec::new(),
        }
    }

    /// Creates an executor with resolvers.
    pub fn with_resolvers(resolvers: ResolverMap) -> Self {
        Self {
            config: ExecutorConfig::default(),
            resolvers: Arc::new(resolvers),
            extensions: Vec::new(),
        }
    }

    /// Creates an executor with config and resolvers.
    pub fn new_with(config: ExecutorConfig, resolvers: ResolverMap) -> Self {
        Self {
            config,
            resolvers: Arc::new(resolvers),
            extensions: Vec::new(),
        }
    }

    /// Registers a resolver-wrapping extension. Extensions run in
    /// registration order, outermost first.
    pub fn extension(mut self, extension: impl Extension + 'static) -> Self {
        self.extensions.push(Arc::new(extension));
        self
    }

    /// Gets a reference to the resolvers.
    pub fn resolvers(&self) -> &ResolverMap {
        &self.resolvers
    }

    /// Executes a query plan.
    pub async fn execute(&self, plan: &QueryPlan, schema: &Schema, ctx: &Context) -> Response {
        let exec_ctx = ExecutionContext {
            schema: schema.clone(),
            ctx: ctx.clone(),
            resolvers: Arc::clone(&self.resolvers),
            extensions: self.extensions.clone(),
            config: self.config.clone(),
            errors: Arc::new(RwLock::new(Vec::new())),
        };

        // Get root value (empty object for Query/Mutation)
        let root_value = Value::Object(serde_json::Map::new());

        // Execute the plan
        let data = execute_node(&plan.root, root_value, Vec::new(), &exec_ctx).await;

        // Collect errors
        let errors = exec_ctx.errors.read().await;
        let errors = if errors.is_empty() {
            None
        } else {
            Some(errors.clone())
        };

        Response {
            data: Some(data),
            errors,
        }
    }
}

/// Executes a plan node.
fn execute_node<'a>(
    node: &'a PlanNode,
    parent: Value,
    path: Vec<PathSegment>,
    ctx: &'a ExecutionContext,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Value> + Send + 'a>> {
    Box::pin(async move {
        match node {
            PlanNode::Sequence(nodes) => execute_sequence(nodes, parent, path, ctx).await,
            PlanNode::Parallel(nodes) => execute_parallel(nodes, parent, path, ctx).await,
            PlanNode::Field { info, children } => {
                execute_field(info, children, parent, path, ctx).await
            }
            PlanNode::Leaf { field } => execute_leaf(field, parent, path, ctx).await,
        }
    })
}

/// Executes nodes sequentially.
async fn execute_sequence(
    nodes: &[PlanNode],
    parent: Value,
    path: Vec<PathSegment>,
    ctx: &ExecutionContext,
) -> Value {
    let mut result = serde_json::Map::new();

    for node in nodes {
        let value = execute_node(node, parent.clone(), path.clone(), ctx).await;

        // Merge result into the object
        if let Value::Object(map) = value {
            for (k, v) in map {
                result.insert(k, v);
            }
        }
    }

    Value::Object(result)
}

/// Executes nodes in parallel.
async fn execute_parallel(
    nodes: &[PlanNode],
    parent: Value,
    path: Vec<PathSegment>,
    ctx: &ExecutionContext,
) -> Value {
    let mut handles = Vec::with_capacity(nodes.len());

    for node in nodes {
        let parent = parent.clone();
        let path = path.clone();
        let local_ctx = ctx.clone();
        let node = node.clone();

        handles.push(tokio::spawn(async move {
            execute_node(&node, parent, path, &local_ctx).await
        }));
    }

    let mut result = serde_json::Map::new();

    for handle in handles {
        match handle.await {
            Ok(value) => {
                if let Value::Object(map) = value {
                    for (k, v) in map {
                        result.insert(k, v);
                    }
                }
            }
            Err(e) => {
                let mut errors = ctx.errors.write().await;
                errors.push(FieldError::new(format!("Parallel execution failed: {}", e)));
            }
        }
    }

    Value::Object(result)
}

/// Executes a field with nested selections.
async fn execute_field(
    info: &FieldInfo,
    children: &PlanNode,
    parent: Value,
    path: Vec<PathSegment>,
    ctx: &ExecutionContext,
) -> Value {
    // Resolve the field value
    let field_value = resolve_field(info, &parent, path.clone(), ctx).await;

    // If the field resolved to an array, execute children for each item
    let result = match field_value {
        Value::Array(items) => {
            let mut results = Vec::with_capacity(items.len());
            for (i, item) in items.into_iter().enumerate() {
                let mut child_path = path.clone();
                child_path.push(PathSegment::Index(i));
                let child_result = execute_node(children, item, child_path, ctx).await;
                results.push(child_result);
            }
            Value::Array(results)
        }
        Value::Null => Value::Null,
        other => {
            // Execute children with the resolved value as parent
            execute_node(children, other, path, ctx).await
        }
    };

    let mut obj = serde_json::Map::new();
    obj.insert(info.response_key().to_string(), result);
    Value::Object(obj)
}

/// Executes a leaf field.
async fn execute_leaf(
    info: &FieldInfo,
    parent: Value,
    path: Vec<PathSegment>,
    ctx: &ExecutionContext,
) -> Value {
    let response_key = info.response_key();
    let value = resolve_field(info, &parent, path, ctx).await;

    let mut obj = serde_json::Map::new();
    obj.insert(response_key.to_string(), value);
    Value::Object(obj)
}

/// Resolves a single field through the extension chain.
async fn resolve_field(
    info: &FieldInfo,
    parent: &Value,
    mut path: Vec<PathSegment>,
    ctx: &ExecutionContext,
) -> Value {
    // Handle __typename specially
    if info.is_introspection && info.name == "__typename" {
        return Value::String(info.parent_type.clone());
    }

    if ctx.config.tracing {
        tracing::trace!(
            parent_type = %info.parent_type,
            field = %info.name,
            "resolving field"
        );
    }

    // Build resolver args
    let args = ResolverArgs::from_pairs(info.arguments.clone());

    // Add field to path
    path.push(PathSegment::Field(info.response_key().to_string()));

    // Build resolver info
    let resolver_info = ResolverInfo::new(&info.name, &info.parent_type)
        .with_return_type(&info.return_type)
        .with_path(path.clone());

    // Get the resolver
    let resolver = ctx.resolvers.get(&info.parent_type, &info.name);

    match resolver {
        Some(resolver) => {
            let cx = ResolveContext {
                schema: &ctx.schema,
                root: parent,
                info: &resolver_info,
                args: &args,
                ctx: &ctx.ctx,
            };
            let chain = NextResolve::new(&ctx.extensions, resolver);

            let result = if ctx.config.field_timeout_ms > 0 {
                let timeout = Duration::from_millis(ctx.config.field_timeout_ms);
                match tokio::time::timeout(timeout, chain.run(&cx)).await {
                    Ok(result) => result,
                    Err(_) => Err(ResolverError::Internal(format!(
                        "Field resolution timed out after {}ms",
                        ctx.config.field_timeout_ms
                    ))),
                }
            } else {
                chain.run(&cx).await
            };

            match result {
                Ok(value) => value,
                Err(e) => {
                    tracing::debug!(
                        parent_type = %info.parent_type,
                        field = %info.name,
                        error = %e,
                        "field resolution failed"
                    );
                    let mut errors = ctx.errors.write().await;
                    errors.push(FieldError::new(e.to_string()).with_path(path));
                    Value::Null
                }
            }
        }
        None => {
            // No resolver found, try default property access
            parent.get(&info.name).cloned().unwrap_or(Value::Null)
        }
    }
}

/// Per-execution shared state.
#[derive(Clone)]
struct ExecutionContext {
    schema: Schema,
    ctx: Context,
    resolvers: Arc<ResolverMap>,
    extensions: Vec<Arc<dyn Extension>>,
    config: ExecutorConfig,
    errors: Arc<RwLock<Vec<FieldError>>>,
}

/// Execution context.
#[derive(Debug, Clone)]
pub struct Context {
    /// Request-scoped data.
    pub data: HashMap<String, serde_json::Value>,
    /// Variables from the request.
    pub variables: HashMap<String, serde_json::Value>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Creates a new context.
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            variables: HashMap::new(),
        }
    }

    /// Creates a context with variables.
    pub fn with_variables(variables: HashMap<String, serde_json::Value>) -> Self {
        Self {
            data: HashMap::new(),
            variables,
        }
    }

    /// Sets a value in the context.
    pub fn set<T: Serialize>(&mut self, key: impl Into<String>, value: T) {
        if let Ok(v) = serde_json::to_value(value) {
            self.data.insert(key.into(), v);
        }
    }

    /// Gets a value from the context.
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Gets a variable by name.
    pub fn variable(&self, name: &str) -> Option<&serde_json::Value> {
        self.variables.get(name)
    }

    /// Gets a variable as a specific type.
    pub fn variable_as<T: for<'de> Deserialize<'de>>(&self, name: &str) -> Option<T> {
        self.variables
            .get(name)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// A GraphQL response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// The data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// The errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl Response {
    /// Creates a successful response with data.
    pub fn data(data: serde_json::Value) -> Self {
        Self {
            data: Some(data),
            errors: None,
        }
    }

    /// Creates an error response.
    pub fn error(error: FieldError) -> Self {
        Self {
            data: None,
            errors: Some(vec![error]),
        }
    }

    /// Creates an error response with multiple errors.
    pub fn errors(errors: Vec<FieldError>) -> Self {
        Self {
            data: None,
            errors: Some(errors),
        }
    }

    /// Returns true if the response has errors.
    pub fn has_errors(&self) -> bool {
        self.errors.as_ref().map(|e| !e.is_empty()).unwrap_or(false)
    }

    /// Returns true if the response has data.
    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }
}

/// A field error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    /// The error message.
    pub message: String,
    /// The path to the field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<PathSegment>>,
    /// Error extensions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<HashMap<String, serde_json::Value>>,
}

/// A path segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

impl FieldError {
    /// Creates a new field error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
            extensions: None,
        }
    }

    /// Adds a path to the error.
    pub fn with_path(mut self, path: Vec<PathSegment>) -> Self {
        self.path = Some(path);
        self
    }

    /// Adds an extension.
    pub fn with_extension(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extensions
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value);
        self
    }

    /// Sets the error code extension.
    pub fn with_code(self, code: impl Into<String>) -> Self {
        self.with_extension("code", serde_json::Value::String(code.into()))
    }
}
