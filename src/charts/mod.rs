//! Chart aggregation for meter readings.
//!
//! Groups dated readings into day, week or month periods, averages each
//! period, and emits a chronologically ordered `(label, value)` series.

pub mod aggregate;
pub mod types;
pub mod utility;

pub use aggregate::{aggregate, aggregate_with_locale};
pub use types::{AggregatedPoint, Granularity, InvalidRecord, Locale, Reading};
