//! Shipped schema directives.

use chrono::DateTime;
use petal_runtime::directive::SchemaDirective;
use petal_runtime::extensions::ResolveContext;
use petal_runtime::resolver::ResolverError;
use petal_runtime::schema::DirectiveLocation;
use serde_json::Value;

/// Context key the authenticated caller's roles are stored under.
pub const ROLES_KEY: &str = "roles";

/// Rejects resolution unless the request context carries authenticated
/// roles.
///
/// Attachable to object types and field definitions. An empty `roles`
/// list admits any authenticated caller; a non-empty list additionally
/// requires one of the named roles.
#[derive(Debug, Clone)]
pub struct RequireAuth {
    /// Roles allowed to resolve the field.
    pub roles: Vec<String>,
    /// Error message reported when the check fails.
    pub message: String,
}

impl Default for RequireAuth {
    fn default() -> Self {
        Self {
            roles: Vec::new(),
            message: "User is not authenticated".to_string(),
        }
    }
}

impl RequireAuth {
    /// Admits any authenticated caller.
    pub fn any() -> Self {
        Self::default()
    }

    /// Admits callers holding one of the given roles.
    pub fn with_roles(roles: Vec<String>) -> Self {
        Self {
            roles,
            ..Self::default()
        }
    }

    /// Sets the rejection message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    fn is_authorized(&self, user_roles: &[String]) -> bool {
        if self.roles.is_empty() {
            // Any authenticated user
            return true;
        }
        self.roles.iter().any(|r| user_roles.contains(r))
    }
}

impl SchemaDirective for RequireAuth {
    fn name(&self) -> &str {
        "requireAuth"
    }

    fn locations(&self) -> &[DirectiveLocation] {
        &[DirectiveLocation::Object, DirectiveLocation::FieldDefinition]
    }

    fn on_resolve_start(&self, cx: &ResolveContext<'_>) -> Result<(), ResolverError> {
        let Some(user_roles) = cx.ctx.get::<Vec<String>>(ROLES_KEY) else {
            return Err(ResolverError::Unauthorized(self.message.clone()));
        };

        if self.is_authorized(&user_roles) {
            Ok(())
        } else {
            Err(ResolverError::Unauthorized(self.message.clone()))
        }
    }
}

/// Formats RFC 3339 date-time string values on resolve end.
///
/// Values that are not strings, or not parseable as RFC 3339, pass
/// through unchanged. Without a pattern the value is re-emitted in
/// RFC 3339 form.
#[derive(Debug, Clone, Default)]
pub struct DateFormat {
    /// strftime-style pattern, e.g. `"%Y-%m-%d"`.
    pub format: Option<String>,
}

impl DateFormat {
    /// Formats with the given strftime-style pattern.
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: Some(format.into()),
        }
    }

    /// Re-emits values in RFC 3339 form.
    pub fn rfc3339() -> Self {
        Self::default()
    }
}

impl SchemaDirective for DateFormat {
    fn name(&self) -> &str {
        "dateFormat"
    }

    fn locations(&self) -> &[DirectiveLocation] {
        &[DirectiveLocation::FieldDefinition]
    }

    fn on_resolve_end(
        &self,
        value: Value,
        _cx: &ResolveContext<'_>,
    ) -> Result<Value, ResolverError> {
        let Some(raw) = value.as_str() else {
            return Ok(value);
        };
        let Ok(instant) = DateTime::parse_from_rfc3339(raw) else {
            return Ok(value);
        };

        let formatted = match &self.format {
            Some(pattern) => instant.format(pattern).to_string(),
            None => instant.to_rfc3339(),
        };
        Ok(Value::String(formatted))
    }
}
