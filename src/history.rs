//! Filtering, ordering and paging over the reading history.

use chrono::{Duration, NaiveDate};

use crate::readings::{Category, MeterReading};

/// Optional constraints applied to the history view. `None` matches all.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub category: Option<Category>,
    pub unit: Option<String>,
    /// Case-insensitive substring of the responsible name or consumer unit.
    pub search: Option<String>,
}

impl HistoryFilter {
    pub fn matches(&self, reading: &MeterReading) -> bool {
        if let Some(category) = self.category {
            if reading.category != category {
                return false;
            }
        }

        if let Some(unit) = &self.unit {
            if &reading.unit != unit {
                return false;
            }
        }

        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            if !reading.responsible.to_lowercase().contains(&term)
                && !reading.unit.to_lowercase().contains(&term)
            {
                return false;
            }
        }

        true
    }

    pub fn apply<'a>(&self, readings: &'a [MeterReading]) -> Vec<&'a MeterReading> {
        readings.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Keeps readings dated no earlier than `days` before `today`.
///
/// A window reaching past the earliest representable date keeps everything.
pub fn within_last_days<'a, I>(readings: I, today: NaiveDate, days: u32) -> Vec<&'a MeterReading>
where
    I: IntoIterator<Item = &'a MeterReading>,
{
    match today.checked_sub_signed(Duration::days(i64::from(days))) {
        Some(start) => readings.into_iter().filter(|r| r.date >= start).collect(),
        None => readings.into_iter().collect(),
    }
}

/// Sorts most recent first: by date, then by creation time.
pub fn newest_first(readings: &mut [&MeterReading]) {
    readings.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

/// Consumer units in first-seen order, without duplicates.
pub fn distinct_units(readings: &[MeterReading]) -> Vec<&str> {
    let mut units: Vec<&str> = Vec::new();
    for reading in readings {
        if !units.contains(&reading.unit.as_str()) {
            units.push(&reading.unit);
        }
    }
    units
}

/// One page of a larger listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Zero-based page index.
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
}

impl<T> Page<T> {
    /// "from-to de total", 1-based and inclusive, e.g. `11-20 de 25`.
    pub fn range_label(&self) -> String {
        if self.items.is_empty() {
            return format!("0-0 de {}", self.total);
        }
        let from = self.page * self.per_page + 1;
        let to = from + self.items.len() - 1;
        format!("{from}-{to} de {}", self.total)
    }

    pub fn page_count(&self) -> usize {
        if self.per_page == 0 {
            0
        } else {
            self.total.div_ceil(self.per_page)
        }
    }

    /// Range label plus page position, e.g. `11-20 de 25 (página 2 de 3)`.
    pub fn footer(&self) -> String {
        format!(
            "{} (página {} de {})",
            self.range_label(),
            self.page + 1,
            self.page_count()
        )
    }
}

/// Cuts `items` into pages of `per_page` and returns page `page`.
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let total = items.len();
    let items = if per_page == 0 {
        Vec::new()
    } else {
        items
            .into_iter()
            .skip(page.saturating_mul(per_page))
            .take(per_page)
            .collect()
    };

    Page {
        items,
        page,
        per_page,
        total,
    }
}
