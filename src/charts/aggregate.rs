use crate::charts::types::{AggregatedPoint, Granularity, Locale, Reading};
use crate::charts::utility::{mean, round2};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Running total for one period. Lives only for the duration of one call.
#[derive(Default)]
struct Bucket {
    sum: f64,
    count: usize,
}

/// Aggregates readings into chart points using the default label locale.
///
/// See [`aggregate_with_locale`].
pub fn aggregate(readings: &[Reading], granularity: Granularity) -> Vec<AggregatedPoint> {
    aggregate_with_locale(readings, granularity, Locale::default())
}

/// Groups `readings` into day, week or month buckets and returns the mean of
/// each bucket, rounded to two decimals, in chronological order.
///
/// Readings that fail [`Reading::validate`] are skipped with a warning; the
/// remaining readings aggregate normally. Empty input yields an empty series.
pub fn aggregate_with_locale(
    readings: &[Reading],
    granularity: Granularity,
    locale: Locale,
) -> Vec<AggregatedPoint> {
    let mut buckets: HashMap<NaiveDate, Bucket> = HashMap::new();
    let mut skipped = 0usize;

    for reading in readings {
        if let Err(e) = reading.validate() {
            warn!(error = %e, "Skipping invalid reading");
            skipped += 1;
            continue;
        }

        let bucket = buckets
            .entry(period_start(reading.date, granularity))
            .or_default();
        bucket.sum += reading.value;
        bucket.count += 1;
    }

    // Keep the period start next to the label until the sort is done.
    let mut points: Vec<(NaiveDate, AggregatedPoint)> = buckets
        .into_iter()
        .map(|(start, bucket)| {
            let point = AggregatedPoint {
                label: period_label(start, granularity, locale),
                value: round2(mean(bucket.sum, bucket.count)),
            };
            (start, point)
        })
        .collect();

    points.sort_by_key(|(start, _)| *start);

    debug!(
        %granularity,
        input = readings.len(),
        skipped,
        buckets = points.len(),
        "Aggregated readings"
    );

    points.into_iter().map(|(_, point)| point).collect()
}

/// First calendar day of the period containing `date`.
///
/// Weeks start on Monday.
pub fn period_start(date: NaiveDate, granularity: Granularity) -> NaiveDate {
    match granularity {
        Granularity::Day => date,
        Granularity::Week => {
            date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
        }
        Granularity::Month => date.with_day(1).unwrap_or(date),
    }
}

/// Human-readable label for the period starting at `start`.
pub fn period_label(start: NaiveDate, granularity: Granularity, locale: Locale) -> String {
    match granularity {
        Granularity::Day => start.format("%d/%m").to_string(),
        Granularity::Week => format!("{} {}", locale.week_word(), start.iso_week().week()),
        Granularity::Month => format!(
            "{}/{:02}",
            locale.month_abbrev(start.month()),
            start.year().rem_euclid(100)
        ),
    }
}
