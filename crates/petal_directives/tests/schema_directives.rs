//! End-to-end tests for the schema-directives extension.

use petal_directives::builtin::ROLES_KEY;
use petal_directives::{DateFormat, RequireAuth, SchemaDirectives};
use petal_runtime::directive::SchemaDirective;
use petal_runtime::extensions::ResolveContext;
use petal_runtime::resolver::{ResolverError, ResolverMap};
use petal_runtime::schema::{DirectiveLocation, FieldDef, ObjectDef, SchemaBuilder, TypeDef, TypeRef};
use petal_runtime::{Context, Executor, FieldInfo, PlanNode, QueryPlan, Schema};
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Records hook invocations into a shared log.
#[derive(Debug)]
struct Recorder {
    label: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

impl SchemaDirective for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn locations(&self) -> &[DirectiveLocation] {
        &[DirectiveLocation::Object, DirectiveLocation::FieldDefinition]
    }

    fn on_resolve_start(&self, _cx: &ResolveContext<'_>) -> Result<(), ResolverError> {
        self.log.lock().unwrap().push(format!("start:{}", self.label));
        Ok(())
    }

    fn on_resolve_end(
        &self,
        value: Value,
        _cx: &ResolveContext<'_>,
    ) -> Result<Value, ResolverError> {
        self.log.lock().unwrap().push(format!("end:{}", self.label));
        Ok(value)
    }
}

/// Appends a suffix to string values on resolve end.
#[derive(Debug)]
struct Suffix(&'static str);

impl SchemaDirective for Suffix {
    fn name(&self) -> &str {
        "suffix"
    }

    fn locations(&self) -> &[DirectiveLocation] {
        &[DirectiveLocation::FieldDefinition]
    }

    fn on_resolve_end(
        &self,
        value: Value,
        _cx: &ResolveContext<'_>,
    ) -> Result<Value, ResolverError> {
        match value.as_str() {
            Some(s) => Ok(Value::String(format!("{s}{}", self.0))),
            None => Ok(value),
        }
    }
}

fn user_resolvers() -> ResolverMap {
    let mut resolvers = ResolverMap::new();
    resolvers.register_fn("Query", "user", |_parent, _args, _ctx, _info| {
        Ok(serde_json::json!({"name": "Tony"}))
    });
    resolvers
}

fn user_query_plan() -> QueryPlan {
    QueryPlan::query(PlanNode::Field {
        info: FieldInfo::new("user", "Query", "User"),
        children: Box::new(PlanNode::Leaf {
            field: FieldInfo::new("name", "User", "String"),
        }),
    })
}

fn executor_with(resolvers: ResolverMap) -> Executor {
    Executor::with_resolvers(resolvers).extension(SchemaDirectives::new())
}

fn schema_with_field_directive(directive: impl SchemaDirective + 'static) -> Schema {
    SchemaBuilder::new()
        .query_type("Query")
        .add_type(TypeDef::Object(ObjectDef::new("Query").field(
            FieldDef::new("user", TypeRef::named("User")).with_directive(directive),
        )))
        .add_type(TypeDef::Object(
            ObjectDef::new("User").field(FieldDef::new("name", TypeRef::named("String"))),
        ))
        .build()
}

fn schema_with_type_directive(directive: impl SchemaDirective + 'static) -> Schema {
    SchemaBuilder::new()
        .query_type("Query")
        .add_type(TypeDef::Object(
            ObjectDef::new("Query").field(FieldDef::new("user", TypeRef::named("User"))),
        ))
        .add_type(TypeDef::Object(
            ObjectDef::new("User")
                .with_directive(directive)
                .field(FieldDef::new("name", TypeRef::named("String"))),
        ))
        .build()
}

#[tokio::test]
async fn test_undirected_field_passes_value_through() {
    let schema = SchemaBuilder::new()
        .query_type("Query")
        .add_type(TypeDef::Object(
            ObjectDef::new("Query").field(FieldDef::new("user", TypeRef::named("User"))),
        ))
        .add_type(TypeDef::Object(
            ObjectDef::new("User").field(FieldDef::new("name", TypeRef::named("String"))),
        ))
        .build();

    let executor = executor_with(user_resolvers());
    let response = executor
        .execute(&user_query_plan(), &schema, &Context::new())
        .await;

    assert!(!response.has_errors());
    assert_eq!(response.data.unwrap()["user"]["name"], "Tony");
}

#[tokio::test]
async fn test_field_directive_rejects_unauthenticated() {
    let schema = schema_with_field_directive(RequireAuth::any());
    let executor = executor_with(user_resolvers());

    let response = executor
        .execute(&user_query_plan(), &schema, &Context::new())
        .await;

    let errors = response.errors.expect("response should carry errors");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "User is not authenticated");
    assert_eq!(response.data.unwrap()["user"], Value::Null);
}

#[tokio::test]
async fn test_type_directive_rejects_unauthenticated() {
    let schema = schema_with_type_directive(RequireAuth::any());
    let executor = executor_with(user_resolvers());

    let response = executor
        .execute(&user_query_plan(), &schema, &Context::new())
        .await;

    let errors = response.errors.expect("response should carry errors");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "User is not authenticated");
    assert_eq!(response.data.unwrap()["user"], Value::Null);
}

#[tokio::test]
async fn test_field_directive_admits_authenticated() {
    let schema = schema_with_field_directive(RequireAuth::any());
    let executor = executor_with(user_resolvers());

    let mut ctx = Context::new();
    ctx.set(ROLES_KEY, vec!["Reader".to_string()]);

    let response = executor.execute(&user_query_plan(), &schema, &ctx).await;

    assert!(!response.has_errors());
    assert_eq!(response.data.unwrap()["user"]["name"], "Tony");
}

#[tokio::test]
async fn test_date_format_directive() {
    let schema = SchemaBuilder::new()
        .query_type("Query")
        .add_type(TypeDef::Object(ObjectDef::new("Query").field(
            FieldDef::new("date", TypeRef::named("String"))
                .with_directive(DateFormat::new("%Y-%m-%d")),
        )))
        .build();

    let mut resolvers = ResolverMap::new();
    resolvers.register_fn("Query", "date", |_parent, _args, _ctx, _info| {
        Ok(serde_json::json!("2020-01-01T00:00:00Z"))
    });

    let executor = executor_with(resolvers);
    let plan = QueryPlan::query(PlanNode::Leaf {
        field: FieldInfo::new("date", "Query", "String"),
    });

    let response = executor.execute(&plan, &schema, &Context::new()).await;

    assert!(!response.has_errors());
    assert_eq!(response.data.unwrap()["date"], "2020-01-01");
}

#[tokio::test]
async fn test_date_format_passes_non_dates_through() {
    let schema = SchemaBuilder::new()
        .query_type("Query")
        .add_type(TypeDef::Object(ObjectDef::new("Query").field(
            FieldDef::new("label", TypeRef::named("String"))
                .with_directive(DateFormat::new("%Y-%m-%d")),
        )))
        .build();

    let mut resolvers = ResolverMap::new();
    resolvers.register_fn("Query", "label", |_parent, _args, _ctx, _info| {
        Ok(serde_json::json!("plain text"))
    });

    let executor = executor_with(resolvers);
    let plan = QueryPlan::query(PlanNode::Leaf {
        field: FieldInfo::new("label", "Query", "String"),
    });

    let response = executor.execute(&plan, &schema, &Context::new()).await;

    assert!(!response.has_errors());
    assert_eq!(response.data.unwrap()["label"], "plain text");
}

#[tokio::test]
async fn test_field_hooks_run_before_type_hooks() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let schema = SchemaBuilder::new()
        .query_type("Query")
        .add_type(TypeDef::Object(ObjectDef::new("Query").field(
            FieldDef::new("user", TypeRef::named("User")).with_directive(Recorder {
                label: "field",
                log: Arc::clone(&log),
            }),
        )))
        .add_type(TypeDef::Object(
            ObjectDef::new("User")
                .with_directive(Recorder {
                    label: "type",
                    log: Arc::clone(&log),
                })
                .field(FieldDef::new("name", TypeRef::named("String"))),
        ))
        .build();

    let executor = executor_with(user_resolvers());
    let response = executor
        .execute(&user_query_plan(), &schema, &Context::new())
        .await;

    assert!(!response.has_errors());
    assert_eq!(
        *log.lock().unwrap(),
        vec!["start:field", "start:type", "end:field", "end:type"]
    );
}

#[tokio::test]
async fn test_end_hooks_thread_the_value() {
    let schema = SchemaBuilder::new()
        .query_type("Query")
        .add_type(TypeDef::Object(ObjectDef::new("Query").field(
            FieldDef::new("tag", TypeRef::named("String"))
                .with_directive(Suffix(".first"))
                .with_directive(Suffix(".second")),
        )))
        .build();

    let mut resolvers = ResolverMap::new();
    resolvers.register_fn("Query", "tag", |_parent, _args, _ctx, _info| {
        Ok(serde_json::json!("value"))
    });

    let executor = executor_with(resolvers);
    let plan = QueryPlan::query(PlanNode::Leaf {
        field: FieldInfo::new("tag", "Query", "String"),
    });

    let response = executor.execute(&plan, &schema, &Context::new()).await;

    assert!(!response.has_errors());
    assert_eq!(response.data.unwrap()["tag"], "value.first.second");
}

#[tokio::test]
async fn test_sibling_fields_resolve_independently() {
    let schema = SchemaBuilder::new()
        .query_type("Query")
        .add_type(TypeDef::Object(
            ObjectDef::new("Query")
                .field(
                    FieldDef::new("user", TypeRef::named("User"))
                        .with_directive(RequireAuth::any()),
                )
                .field(FieldDef::new("version", TypeRef::named("String"))),
        ))
        .add_type(TypeDef::Object(
            ObjectDef::new("User").field(FieldDef::new("name", TypeRef::named("String"))),
        ))
        .build();

    let mut resolvers = user_resolvers();
    resolvers.register_fn("Query", "version", |_parent, _args, _ctx, _info| {
        Ok(serde_json::json!("1.0"))
    });

    let executor = executor_with(resolvers);
    let plan = QueryPlan::query(PlanNode::Parallel(vec![
        PlanNode::Field {
            info: FieldInfo::new("user", "Query", "User"),
            children: Box::new(PlanNode::Leaf {
                field: FieldInfo::new("name", "User", "String"),
            }),
        },
        PlanNode::Leaf {
            field: FieldInfo::new("version", "Query", "String"),
        },
    ]));

    let response = executor.execute(&plan, &schema, &Context::new()).await;

    let errors = response.errors.clone().expect("response should carry errors");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "User is not authenticated");

    let data = response.data.unwrap();
    assert_eq!(data["user"], Value::Null);
    assert_eq!(data["version"], "1.0");
}
