//! Request/user/service context attached to records
//!
//! This module provides:
//! - `LogContext`: an immutable bag of well-known and custom fields
//! - a thread-scoped "current context" that loggers merge into every record
//! - `ContextGuard`: RAII guard restoring the previous current context

use super::field::{FieldValue, Fields};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

/// Immutable context shared by many records
///
/// Every mutator returns a new value; the receiver is never modified.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Fields::is_empty")]
    pub custom: Fields,
}

impl LogContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_request(mut self, ip: impl Into<String>, access: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self.access = Some(access.into());
        self
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    #[must_use]
    pub fn with_user(mut self, user_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self.session_id = Some(session_id.into());
        self
    }

    #[must_use]
    pub fn with_service(
        mut self,
        service_name: impl Into<String>,
        version: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        self.service_name = Some(service_name.into());
        self.version = Some(version.into());
        self.environment = Some(environment.into());
        self
    }

    /// Add a single custom field
    #[must_use]
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.custom.insert(key, value);
        self
    }

    /// New context with the custom map extended by `fields`
    #[must_use]
    pub fn with_custom(&self, fields: &Fields) -> Self {
        let mut next = self.clone();
        next.custom.extend_from(fields);
        next
    }

    /// New context combining `self` and `other`; `other` wins on conflicts
    #[must_use]
    pub fn merge(&self, other: &LogContext) -> Self {
        fn pick(mine: &Option<String>, theirs: &Option<String>) -> Option<String> {
            theirs.clone().or_else(|| mine.clone())
        }

        let mut custom = self.custom.clone();
        custom.extend_from(&other.custom);

        Self {
            request_id: pick(&self.request_id, &other.request_id),
            ip: pick(&self.ip, &other.ip),
            access: pick(&self.access, &other.access),
            user_id: pick(&self.user_id, &other.user_id),
            session_id: pick(&self.session_id, &other.session_id),
            service_name: pick(&self.service_name, &other.service_name),
            version: pick(&self.version, &other.version),
            environment: pick(&self.environment, &other.environment),
            custom,
        }
    }

    /// Check if context has any fields
    pub fn is_empty(&self) -> bool {
        self.request_id.is_none()
            && self.ip.is_none()
            && self.access.is_none()
            && self.user_id.is_none()
            && self.session_id.is_none()
            && self.service_name.is_none()
            && self.version.is_none()
            && self.environment.is_none()
            && self.custom.is_empty()
    }

    /// Flatten well-known and custom fields into one ordered map
    pub fn to_fields(&self) -> Fields {
        let known = [
            ("request_id", &self.request_id),
            ("ip", &self.ip),
            ("access", &self.access),
            ("user_id", &self.user_id),
            ("session_id", &self.session_id),
            ("service", &self.service_name),
            ("version", &self.version),
            ("environment", &self.environment),
        ];

        let mut fields = Fields::with_capacity(known.len() + self.custom.len());
        for (key, value) in known {
            if let Some(value) = value {
                fields.insert(key, value.as_str());
            }
        }
        fields.extend_from(&self.custom);
        fields
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fields().format_pairs())
    }
}

thread_local! {
    static CURRENT_CONTEXT: RefCell<Option<Arc<LogContext>>> = const { RefCell::new(None) };
}

/// Context installed on the calling thread, if any
pub fn current_context() -> Option<Arc<LogContext>> {
    CURRENT_CONTEXT.with(|current| current.borrow().clone())
}

fn replace_current(next: Option<Arc<LogContext>>) -> Option<Arc<LogContext>> {
    CURRENT_CONTEXT.with(|current| std::mem::replace(&mut *current.borrow_mut(), next))
}

fn update_current(f: impl FnOnce(LogContext) -> LogContext) {
    CURRENT_CONTEXT.with(|current| {
        let mut slot = current.borrow_mut();
        let base = slot.as_deref().cloned().unwrap_or_default();
        *slot = Some(Arc::new(f(base)));
    });
}

/// Install `context` as the current context until the guard is dropped
///
/// # Example
///
/// ```
/// use pipeline_logger::core::{context_scope, current_context, LogContext};
///
/// {
///     let _guard = context_scope(LogContext::new().with_field("test", "value"));
///     assert!(current_context().is_some());
/// }
/// assert!(current_context().is_none());
/// ```
#[must_use = "the context is removed when the guard is dropped"]
pub fn context_scope(context: LogContext) -> ContextGuard {
    let previous = replace_current(Some(Arc::new(context)));
    ContextGuard { previous }
}

/// Merge request information into the current thread's context
pub fn set_request_context(ip: impl Into<String>, access: impl Into<String>) {
    let (ip, access) = (ip.into(), access.into());
    update_current(|ctx| ctx.with_request(ip, access));
}

/// Merge user information into the current thread's context
pub fn set_user_context(user_id: impl Into<String>, session_id: impl Into<String>) {
    let (user_id, session_id) = (user_id.into(), session_id.into());
    update_current(|ctx| ctx.with_user(user_id, session_id));
}

/// Merge custom fields into the current thread's context
pub fn set_custom_context(fields: &Fields) {
    update_current(|ctx| ctx.with_custom(fields));
}

/// Remove any current context from the calling thread
pub fn clear_request_context() {
    replace_current(None);
}

/// RAII guard for scoped context
///
/// Restores whatever context was current when the guard was created.
pub struct ContextGuard {
    previous: Option<Arc<LogContext>>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        replace_current(self.previous.take());
    }
}
