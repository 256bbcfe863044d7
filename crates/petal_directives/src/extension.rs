//! The schema-directives resolver extension.

use async_trait::async_trait;
use petal_runtime::directive::DirectiveList;
use petal_runtime::extensions::{Extension, NextResolve, ResolveContext};
use petal_runtime::resolver::ResolverResult;
use petal_runtime::schema::{Schema, TypeDef, TypeRef};

/// Runs schema-directive lifecycle hooks around every field resolution.
///
/// Start hooks run in declaration order before the resolver; the first
/// error aborts the remaining hooks and the resolver call. End hooks
/// run in the same order afterwards, each receiving the value the
/// previous one produced.
#[derive(Debug, Default)]
pub struct SchemaDirectives;

impl SchemaDirectives {
    /// Creates the extension.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Extension for SchemaDirectives {
    async fn resolve(&self, cx: &ResolveContext<'_>, next: NextResolve<'_>) -> ResolverResult {
        let directives =
            directives_for_field(cx.schema, &cx.info.parent_type, &cx.info.field_name);

        for directive in &directives {
            if let Err(error) = directive.on_resolve_start(cx) {
                tracing::debug!(
                    directive = directive.name(),
                    parent_type = %cx.info.parent_type,
                    field = %cx.info.field_name,
                    "start hook aborted resolution"
                );
                return Err(error);
            }
        }

        let mut value = next.run(cx).await?;

        for directive in &directives {
            value = directive.on_resolve_end(value, cx)?;
        }

        Ok(value)
    }
}

/// Collects the directives for a resolving field.
///
/// The sequence is the field's own directives in declaration order,
/// followed by the directives of the field's return type when that type
/// is an object or interface in the registry. Fields unknown to the
/// registry, such as introspection fields, locate nothing.
pub fn directives_for_field(schema: &Schema, type_name: &str, field_name: &str) -> DirectiveList {
    let Some(field) = schema.field(type_name, field_name) else {
        return DirectiveList::new();
    };

    let mut directives = field.directives.clone();
    directives.extend(return_type_directives(schema, &field.ty));
    directives
}

fn return_type_directives(schema: &Schema, ty: &TypeRef) -> DirectiveList {
    match schema.get_type(ty.base_name()) {
        Some(TypeDef::Object(object)) => object.directives.clone(),
        Some(TypeDef::Interface(interface)) => interface.directives.clone(),
        _ => DirectiveList::new(),
    }
}
