//! Record transformation capabilities: enrichers, filters, formatters
//!
//! Each capability is a trait with a blanket implementation for plain
//! closures, so ad-hoc stages need no wrapper type.

use super::error::Result;
use super::record::Record;

/// Derives a new record from an existing one
pub trait Enricher: Send + Sync {
    fn enrich(&self, record: &Record) -> Result<Record>;

    fn name(&self) -> &str {
        "enricher"
    }
}

/// Decides whether a record proceeds
pub trait Filter: Send + Sync {
    fn filter(&self, record: &Record) -> Result<bool>;

    fn name(&self) -> &str {
        "filter"
    }
}

/// Renders a record as a single line
pub trait Formatter: Send + Sync {
    fn format(&self, record: &Record) -> Result<String>;

    fn name(&self) -> &str {
        "formatter"
    }
}

impl<F> Enricher for F
where
    F: Fn(&Record) -> Result<Record> + Send + Sync,
{
    fn enrich(&self, record: &Record) -> Result<Record> {
        self(record)
    }
}

impl<F> Filter for F
where
    F: Fn(&Record) -> Result<bool> + Send + Sync,
{
    fn filter(&self, record: &Record) -> Result<bool> {
        self(record)
    }
}

impl<F> Formatter for F
where
    F: Fn(&Record) -> Result<String> + Send + Sync,
{
    fn format(&self, record: &Record) -> Result<String> {
        self(record)
    }
}
