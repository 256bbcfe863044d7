//! Schema directive instances.
//!
//! A schema directive is a user-defined value attached to an object
//! type, interface type, or field definition when the schema is built.
//! During execution the schema-directives extension collects the
//! instances attached to the resolving field and runs their lifecycle
//! hooks around the field resolver.
//!
//! Both hooks are optional: the defaults are a no-op start hook and a
//! pass-through end hook, so a directive implements only the lifecycle
//! points it cares about.

use crate::extensions::ResolveContext;
use crate::resolver::ResolverError;
use crate::schema::DirectiveLocation;
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;

/// An ordered sequence of directive instances.
pub type DirectiveList = Vec<Arc<dyn SchemaDirective>>;

/// A directive instance attachable to schema elements.
///
/// Instances are created once during schema construction, owned by the
/// schema, and read-only during execution.
pub trait SchemaDirective: Debug + Send + Sync {
    /// The directive name, without the leading `@`.
    fn name(&self) -> &str;

    /// The locations this directive may be attached at.
    fn locations(&self) -> &[DirectiveLocation];

    /// Runs before the field resolver.
    ///
    /// Returning an error aborts the remaining start hooks and the
    /// resolver call; the error surfaces as a field-level error in the
    /// response.
    fn on_resolve_start(&self, _cx: &ResolveContext<'_>) -> Result<(), ResolverError> {
        Ok(())
    }

    /// Runs after the field resolver, receiving the value produced by
    /// the previous end hook in the sequence.
    fn on_resolve_end(
        &self,
        value: Value,
        _cx: &ResolveContext<'_>,
    ) -> Result<Value, ResolverError> {
        Ok(value)
    }
}
