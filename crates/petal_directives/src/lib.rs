//! Schema directives for Petal GraphQL.
//!
//! Directive instances attached to object types and field definitions
//! intercept field resolution. The [`SchemaDirectives`] extension
//! collects the directives for the resolving field (the field's own
//! first, then its return type's), runs every start hook before the
//! resolver, and threads the resolved value through every end hook in
//! the same order.
//!
//! ```ignore
//! use petal_directives::{RequireAuth, SchemaDirectives};
//! use petal_runtime::{Executor, FieldDef, ObjectDef, SchemaBuilder, TypeDef, TypeRef};
//!
//! let schema = SchemaBuilder::new()
//!     .query_type("Query")
//!     .add_type(TypeDef::Object(
//!         ObjectDef::new("Query").field(
//!             FieldDef::new("user", TypeRef::named("User"))
//!                 .with_directive(RequireAuth::any()),
//!         ),
//!     ))
//!     .build();
//!
//! let executor = Executor::new().extension(SchemaDirectives::new());
//! ```

pub mod builtin;
pub mod extension;

pub use builtin::{DateFormat, RequireAuth};
pub use extension::{directives_for_field, SchemaDirectives};
