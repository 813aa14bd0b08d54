//! Built-in enrichers

use crate::core::{current_context, Enricher, FieldValue, Fields, LogContext, Record, Result};
use std::sync::Arc;

/// Adds a fixed set of fields to every record
///
/// Fields already present on the record win.
#[derive(Debug, Clone, Default)]
pub struct StaticFieldsEnricher {
    fields: Fields,
}

impl StaticFieldsEnricher {
    pub fn new(fields: Fields) -> Self {
        Self { fields }
    }

    #[must_use]
    pub fn with<K: Into<String>, V: Into<FieldValue>>(mut self, key: K, value: V) -> Self {
        self.fields.insert(key, value);
        self
    }
}

impl Enricher for StaticFieldsEnricher {
    fn enrich(&self, record: &Record) -> Result<Record> {
        let mut merged = self.fields.clone();
        merged.extend_from(record.fields());
        Ok(record.clone().with_fields(merged))
    }

    fn name(&self) -> &str {
        "static_fields"
    }
}

/// Attaches a context to every record
///
/// The configured base context sits beneath the thread's current context,
/// which sits beneath whatever the record already carries.
#[derive(Debug, Clone, Default)]
pub struct ContextFieldsEnricher {
    base: Option<Arc<LogContext>>,
}

impl ContextFieldsEnricher {
    /// Use only the thread's current context
    pub fn new() -> Self {
        Self::default()
    }

    /// Service-wide context applied to every record
    pub fn with_base(base: LogContext) -> Self {
        Self {
            base: Some(Arc::new(base)),
        }
    }
}

impl Enricher for ContextFieldsEnricher {
    fn enrich(&self, record: &Record) -> Result<Record> {
        let layers = [
            self.base.clone(),
            current_context(),
            record.context().map(|c| Arc::new(c.clone())),
        ];

        let mut merged: Option<LogContext> = None;
        for layer in layers.into_iter().flatten() {
            merged = Some(match merged {
                Some(acc) => acc.merge(&layer),
                None => (*layer).clone(),
            });
        }

        Ok(match merged {
            Some(ctx) => record.clone().with_context(Arc::new(ctx)),
            None => record.clone(),
        })
    }

    fn name(&self) -> &str {
        "context"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{context_scope, LogLevel};

    #[test]
    fn test_static_fields_record_wins() {
        let enricher = StaticFieldsEnricher::default()
            .with("service", "api")
            .with("region", "eu");
        let record = Record::new(LogLevel::Info, "app", "m")
            .with_fields(Fields::new().with("region", "us"));

        let enriched = enricher.enrich(&record).unwrap();
        assert_eq!(enriched.fields().get("service").and_then(FieldValue::as_str), Some("api"));
        assert_eq!(enriched.fields().get("region").and_then(FieldValue::as_str), Some("us"));
        assert_eq!(record.fields().len(), 1);
    }

    #[test]
    fn test_context_layers() {
        let enricher = ContextFieldsEnricher::with_base(
            LogContext::new().with_service("api", "1.0", "test").with_field("tier", "base"),
        );
        let _guard = context_scope(LogContext::new().with_user("alice", "s1").with_field("tier", "thread"));

        let record = Record::new(LogLevel::Info, "app", "m")
            .with_context(Arc::new(LogContext::new().with_field("tier", "record")));
        let enriched = enricher.enrich(&record).unwrap();
        let ctx = enriched.context().unwrap();

        assert_eq!(ctx.service_name.as_deref(), Some("api"));
        assert_eq!(ctx.user_id.as_deref(), Some("alice"));
        assert_eq!(ctx.custom.get("tier").and_then(FieldValue::as_str), Some("record"));
    }
}
