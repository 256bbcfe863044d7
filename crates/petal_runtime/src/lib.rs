//! Runtime for Petal GraphQL.
//!
//! This crate provides the GraphQL execution runtime:
//! - `schema`: Schema definition and building
//! - `directive`: Schema directive instances and their lifecycle hooks
//! - `resolver`: Field resolvers and the resolver registry
//! - `extensions`: Resolver-wrapping extension chain
//! - `executor`: Query execution
//! - `query`: Query plan data model

pub mod directive;
pub mod executor;
pub mod extensions;
pub mod query;
pub mod resolver;
pub mod schema;

pub use directive::{DirectiveList, SchemaDirective};
pub use executor::{Context, Executor, ExecutorConfig, FieldError, PathSegment, Response};
pub use extensions::{Extension, NextResolve, ResolveContext};
pub use query::{FieldInfo, OperationKind, PlanNode, QueryPlan};
pub use resolver::{
    AsyncFnResolver, DefaultResolver, FnResolver, Resolver, ResolverArgs, ResolverError,
    ResolverInfo, ResolverMap, ResolverResult,
};
pub use schema::{
    DirectiveDefinition, DirectiveLocation, EnumDef, EnumValueDef, FieldDef, InputFieldDef,
    InputObjectDef, InterfaceDef, ObjectDef, ScalarDef, Schema, SchemaBuilder, TypeDef, TypeRef,
    UnionDef,
};
