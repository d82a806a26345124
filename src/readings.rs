use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::charts::Reading;

/// Kind of utility meter a reading was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "agua")]
    Water,
    #[serde(rename = "luz")]
    Electricity,
}

impl Category {
    /// Display unit appended to values of this category.
    pub fn unit(self) -> &'static str {
        match self {
            Category::Water => "m³",
            Category::Electricity => "kWh",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Category::Water => "Consumo de Água",
            Category::Electricity => "Consumo de Energia",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Water => "Água",
            Category::Electricity => "Energia",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "water" | "agua" | "água" => Ok(Category::Water),
            "electricity" | "energia" | "luz" => Ok(Category::Electricity),
            other => Err(format!("unknown category '{other}' (expected water or electricity)")),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A persisted meter reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterReading {
    pub id: Uuid,
    pub category: Category,
    pub date: NaiveDate,
    pub responsible: String,
    pub unit: String,
    pub hypolito: String,
    pub guests: u32,
    pub value: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MeterReading {
    /// Projects this record onto the fields chart aggregation needs.
    pub fn as_reading(&self) -> Reading {
        Reading::new(self.date, self.value, self.category)
    }
}

/// Form rule a [`NewReading`] failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("A data da medição é obrigatória")]
    MissingDate,
    #[error("Nome deve ter pelo menos 2 caracteres")]
    NameTooShort,
    #[error("Unidade consumidora é obrigatória")]
    MissingUnit,
    #[error("Hypolito é obrigatório")]
    MissingHypolito,
    #[error("Número de hóspedes é obrigatório")]
    MissingGuests,
    #[error("Leitura é obrigatória")]
    MissingValue,
    #[error("Leitura deve ser um número finito e não negativo")]
    InvalidValue,
}

/// Reading as entered, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub category: Category,
    pub date: Option<NaiveDate>,
    pub responsible: String,
    pub unit: String,
    pub hypolito: String,
    pub guests: Option<u32>,
    pub value: Option<f64>,
    pub notes: Option<String>,
}

impl Default for NewReading {
    fn default() -> Self {
        NewReading {
            category: Category::Water,
            date: None,
            responsible: String::new(),
            unit: String::new(),
            hypolito: String::new(),
            guests: None,
            value: None,
            notes: None,
        }
    }
}

impl NewReading {
    /// Checks the form rules in field order and reports the first failure.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.date.is_none() {
            return Err(ValidationError::MissingDate);
        }
        if self.responsible.trim().chars().count() < 2 {
            return Err(ValidationError::NameTooShort);
        }
        if self.unit.trim().is_empty() {
            return Err(ValidationError::MissingUnit);
        }
        if self.hypolito.trim().is_empty() {
            return Err(ValidationError::MissingHypolito);
        }
        if self.guests.is_none() {
            return Err(ValidationError::MissingGuests);
        }
        match self.value {
            None => Err(ValidationError::MissingValue),
            Some(v) if !v.is_finite() || v < 0.0 => Err(ValidationError::InvalidValue),
            Some(_) => Ok(()),
        }
    }

    /// Validates the form and stamps it with a fresh id and `created_at`.
    pub fn into_reading(self, now: DateTime<Utc>) -> Result<MeterReading, ValidationError> {
        self.validate()?;

        let (Some(date), Some(guests), Some(value)) = (self.date, self.guests, self.value) else {
            return Err(ValidationError::MissingDate);
        };

        Ok(MeterReading {
            id: Uuid::new_v4(),
            category: self.category,
            date,
            responsible: self.responsible.trim().to_string(),
            unit: self.unit.trim().to_string(),
            hypolito: self.hypolito.trim().to_string(),
            guests,
            value,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
            created_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> NewReading {
        NewReading {
            category: Category::Electricity,
            date: NaiveDate::from_ymd_opt(2024, 3, 10),
            responsible: "Ana Costa".to_string(),
            unit: "Hotel Marina".to_string(),
            hypolito: "H-12".to_string(),
            guests: Some(42),
            value: Some(12450.3),
            notes: Some("Alta ocupação".to_string()),
        }
    }

    #[test]
    fn test_filled_form_is_valid() {
        assert_eq!(filled().validate(), Ok(()));
    }

    #[test]
    fn test_default_form_reports_missing_date_first() {
        assert_eq!(
            NewReading::default().validate(),
            Err(ValidationError::MissingDate)
        );
    }

    #[test]
    fn test_name_needs_two_characters() {
        let mut form = filled();
        form.responsible = " J ".to_string();
        assert_eq!(form.validate(), Err(ValidationError::NameTooShort));
    }

    #[test]
    fn test_each_required_field() {
        let mut form = filled();
        form.unit = "  ".to_string();
        assert_eq!(form.validate(), Err(ValidationError::MissingUnit));

        let mut form = filled();
        form.hypolito.clear();
        assert_eq!(form.validate(), Err(ValidationError::MissingHypolito));

        let mut form = filled();
        form.guests = None;
        assert_eq!(form.validate(), Err(ValidationError::MissingGuests));

        let mut form = filled();
        form.value = None;
        assert_eq!(form.validate(), Err(ValidationError::MissingValue));
    }

    #[test]
    fn test_value_must_be_finite_and_non_negative() {
        let mut form = filled();
        form.value = Some(f64::NAN);
        assert_eq!(form.validate(), Err(ValidationError::InvalidValue));

        form.value = Some(-1.0);
        assert_eq!(form.validate(), Err(ValidationError::InvalidValue));
    }

    #[test]
    fn test_into_reading_trims_and_stamps() {
        let now = Utc::now();
        let mut form = filled();
        form.unit = "  Hotel Marina ".to_string();
        form.notes = Some("   ".to_string());

        let reading = form.into_reading(now).unwrap();

        assert_eq!(reading.unit, "Hotel Marina");
        assert_eq!(reading.notes, None);
        assert_eq!(reading.created_at, now);
        assert_eq!(reading.guests, 42);
        assert!(!reading.id.is_nil());
    }

    #[test]
    fn test_category_parsing_and_units() {
        assert_eq!("agua".parse::<Category>().unwrap(), Category::Water);
        assert_eq!("Electricity".parse::<Category>().unwrap(), Category::Electricity);
        assert!("gas".parse::<Category>().is_err());
        assert_eq!(Category::Water.unit(), "m³");
        assert_eq!(Category::Electricity.unit(), "kWh");
    }

    #[test]
    fn test_as_reading_projection() {
        let reading = filled().into_reading(Utc::now()).unwrap();
        let projected = reading.as_reading();

        assert_eq!(projected.date, reading.date);
        assert_eq!(projected.value, 12450.3);
        assert_eq!(projected.category, Category::Electricity);
    }
}
