//! Resolver-wrapping extensions for Petal GraphQL.
//!
//! An extension conforms to the engine's resolver-wrapping contract: it
//! is invoked once per field resolution, given the next resolver in the
//! chain, and returns a value compatible with the engine's coercion
//! step. Extensions compose: each one decides whether and when to call
//! `next`, and may transform the produced value.

use crate::executor::Context;
use crate::resolver::{Resolver, ResolverArgs, ResolverInfo, ResolverResult};
use crate::schema::Schema;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Per-resolution context handed to extensions and directive hooks.
///
/// Carries an explicit reference to the compiled schema so extensions
/// never reach through a global schema handle. Created fresh for every
/// field resolution and dropped when it completes.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    /// The compiled schema, including the field registry.
    pub schema: &'a Schema,
    /// The parent (root) value the field is resolved against.
    pub root: &'a Value,
    /// Field name, parent type name, return type, and path.
    pub info: &'a ResolverInfo,
    /// Arguments forwarded to the resolver.
    pub args: &'a ResolverArgs,
    /// The request-scoped context.
    pub ctx: &'a Context,
}

/// A resolver-wrapping extension.
#[async_trait]
pub trait Extension: Send + Sync {
    /// Wraps one field resolution. The default is a pass-through.
    async fn resolve(&self, cx: &ResolveContext<'_>, next: NextResolve<'_>) -> ResolverResult {
        next.run(cx).await
    }
}

/// The remainder of the extension chain for one field resolution,
/// terminating at the field's resolver.
pub struct NextResolve<'a> {
    chain: &'a [Arc<dyn Extension>],
    resolver: &'a dyn Resolver,
}

impl<'a> NextResolve<'a> {
    /// Creates the head of a chain over `chain`, ending at `resolver`.
    pub fn new(chain: &'a [Arc<dyn Extension>], resolver: &'a dyn Resolver) -> Self {
        Self { chain, resolver }
    }

    /// Runs the rest of the chain and returns the resolved value.
    pub async fn run(self, cx: &ResolveContext<'_>) -> ResolverResult {
        match self.chain.split_first() {
            Some((head, tail)) => {
                let next = NextResolve {
                    chain: tail,
                    resolver: self.resolver,
                };
                head.resolve(cx, next).await
            }
            None => {
                self.resolver
                    .resolve(cx.root, cx.args, cx.ctx, cx.info)
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::FnResolver;
    use std::sync::Mutex;

    struct Labeled {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Extension for Labeled {
        async fn resolve(&self, cx: &ResolveContext<'_>, next: NextResolve<'_>) -> ResolverResult {
            self.log.lock().unwrap().push(format!("enter:{}", self.label));
            let value = next.run(cx).await;
            self.log.lock().unwrap().push(format!("leave:{}", self.label));
            value
        }
    }

    #[tokio::test]
    async fn test_chain_runs_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain: Vec<Arc<dyn Extension>> = vec![
            Arc::new(Labeled {
                label: "outer",
                log: Arc::clone(&log),
            }),
            Arc::new(Labeled {
                label: "inner",
                log: Arc::clone(&log),
            }),
        ];
        let resolver = FnResolver::new(|_parent, _args, _ctx, _info| Ok(serde_json::json!("leaf")));

        let schema = Schema::new();
        let root = serde_json::json!({});
        let info = ResolverInfo::new("field", "Query");
        let args = ResolverArgs::new();
        let ctx = Context::new();
        let cx = ResolveContext {
            schema: &schema,
            root: &root,
            info: &info,
            args: &args,
            ctx: &ctx,
        };

        let value = NextResolve::new(&chain, &resolver).run(&cx).await.unwrap();
        assert_eq!(value, serde_json::json!("leaf"));
        assert_eq!(
            *log.lock().unwrap(),
            vec!["enter:outer", "enter:inner", "leave:inner", "leave:outer"]
        );
    }

    #[tokio::test]
    async fn test_empty_chain_calls_resolver() {
        let resolver = FnResolver::new(|_parent, _args, _ctx, _info| Ok(serde_json::json!(7)));

        let schema = Schema::new();
        let root = serde_json::json!({});
        let info = ResolverInfo::new("field", "Query");
        let args = ResolverArgs::new();
        let ctx = Context::new();
        let cx = ResolveContext {
            schema: &schema,
            root: &root,
            info: &info,
            args: &args,
            ctx: &ctx,
        };

        let value = NextResolve::new(&[], &resolver).run(&cx).await.unwrap();
        assert_eq!(value, serde_json::json!(7));
    }
}
