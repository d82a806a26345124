//! Data types used by the chart aggregation pipeline.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::readings::Category;

/// A single dated value fed into [`aggregate`](super::aggregate::aggregate).
///
/// Category filtering happens before aggregation; the category travels along
/// only so callers can assert what they filtered on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub date: NaiveDate,
    pub value: f64,
    pub category: Category,
}

impl Reading {
    pub fn new(date: NaiveDate, value: f64, category: Category) -> Self {
        Self {
            date,
            value,
            category,
        }
    }

    /// Rejects values that would corrupt a bucket's running sum.
    pub fn validate(&self) -> Result<(), InvalidRecord> {
        if !self.value.is_finite() {
            return Err(InvalidRecord::NonFinite {
                date: self.date,
                value: self.value,
            });
        }
        if self.value < 0.0 {
            return Err(InvalidRecord::Negative {
                date: self.date,
                value: self.value,
            });
        }
        Ok(())
    }
}

/// Why a [`Reading`] was left out of an aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InvalidRecord {
    #[error("reading on {date} has non-finite value {value}")]
    NonFinite { date: NaiveDate, value: f64 },
    #[error("reading on {date} has negative value {value}")]
    Negative { date: NaiveDate, value: f64 },
}

/// Bucketing period for chart aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Granularity {
    #[default]
    Day,
    Week,
    Month,
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" | "dia" => Ok(Granularity::Day),
            "week" | "semana" => Ok(Granularity::Week),
            "month" | "mes" | "mês" => Ok(Granularity::Month),
            other => Err(format!("unknown granularity '{other}' (expected day, week or month)")),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
        })
    }
}

/// Language used for period labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    PtBr,
    En,
}

impl Locale {
    const MONTHS_PT_BR: [&'static str; 12] = [
        "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
    ];
    const MONTHS_EN: [&'static str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];

    /// Three-letter abbreviation for a 1-based month number.
    pub fn month_abbrev(self, month: u32) -> &'static str {
        let table = match self {
            Locale::PtBr => &Self::MONTHS_PT_BR,
            Locale::En => &Self::MONTHS_EN,
        };
        table[(month.clamp(1, 12) - 1) as usize]
    }

    pub fn week_word(self) -> &'static str {
        match self {
            Locale::PtBr => "Semana",
            Locale::En => "Week",
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pt-br" | "pt_br" | "pt" => Ok(Locale::PtBr),
            "en" | "en-us" | "en_us" => Ok(Locale::En),
            other => Err(format!("unsupported locale '{other}' (expected pt-BR or en)")),
        }
    }
}

/// One chart-ready `(label, mean)` entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedPoint {
    pub label: String,
    pub value: f64,
}
