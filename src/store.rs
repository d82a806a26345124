//! File-backed persistence for meter readings.
//!
//! All readings live in a single CSV file named after [`STORAGE_KEY`] inside
//! the data directory. Rows are read independently, so one corrupt row never
//! hides the rest of the history.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::readings::{Category, MeterReading};

/// Storage key the reading collection is persisted under.
pub const STORAGE_KEY: &str = "hotel-medicoes";

pub struct ReadingStore {
    path: PathBuf,
}

impl ReadingStore {
    /// Opens the store inside `data_dir`, creating the directory if needed.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir)
            .with_context(|| format!("creating data directory {}", data_dir.display()))?;

        Ok(Self {
            path: data_dir.join(format!("{STORAGE_KEY}.csv")),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads every well-formed reading. Malformed rows are logged and skipped.
    pub fn load(&self) -> Result<Vec<MeterReading>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "Store file missing, starting empty");
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;
        let mut rdr = csv::Reader::from_reader(file);
        let mut rows = Vec::new();

        for (index, result) in rdr.deserialize::<MeterReading>().enumerate() {
            match result {
                Ok(record) => rows.push(record),
                Err(e) => warn!(row = index + 1, error = %e, "Skipping malformed reading row"),
            }
        }

        debug!(count = rows.len(), "Readings loaded");
        Ok(rows)
    }

    /// Appends a reading as a row, writing the header only for a new file.
    pub fn append(&self, reading: &MeterReading) -> Result<()> {
        let needs_header = fs::metadata(&self.path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);
        debug!(path = %self.path.display(), needs_header, "Appending reading");

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;

        let mut writer = WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);

        writer.serialize(reading)?;
        writer.flush()?;

        Ok(())
    }

    /// Removes the reading with `id`. Returns whether anything was removed.
    ///
    /// Works on raw CSV records, so rows that [`load`](Self::load) skips are
    /// written back unchanged.
    pub fn delete(&self, id: Uuid) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }

        let mut rdr = ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;
        let headers = rdr.byte_headers()?.clone();
        let id_column = headers.iter().position(|h| h == b"id").unwrap_or(0);
        let id = id.to_string();

        let mut kept = Vec::new();
        let mut removed = 0usize;
        for record in rdr.byte_records() {
            let record = record?;
            if record.get(id_column) == Some(id.as_bytes()) {
                removed += 1;
            } else {
                kept.push(record);
            }
        }

        if removed == 0 {
            return Ok(false);
        }

        let tmp = self.path.with_extension("csv.tmp");
        {
            let mut writer = WriterBuilder::new()
                .flexible(true)
                .from_path(&tmp)
                .with_context(|| format!("creating {}", tmp.display()))?;
            writer.write_record(&headers)?;
            for record in &kept {
                writer.write_record(record)?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;

        info!(%id, remaining = kept.len(), "Reading deleted");
        Ok(true)
    }

    /// Writes the demo data set when no store file exists yet.
    ///
    /// Returns the number of readings written.
    pub fn seed_if_empty(&self, today: NaiveDate) -> Result<usize> {
        if self.path.exists() {
            return Ok(0);
        }

        let seeds = seed_readings(today, Utc::now());
        self.write_all(&seeds)?;
        info!(count = seeds.len(), "Initial readings seeded");
        Ok(seeds.len())
    }

    fn write_all(&self, readings: &[MeterReading]) -> Result<()> {
        let tmp = self.path.with_extension("csv.tmp");

        {
            let mut writer = csv::Writer::from_path(&tmp)
                .with_context(|| format!("creating {}", tmp.display()))?;
            for reading in readings {
                writer.serialize(reading)?;
            }
            writer.flush()?;
        }

        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}

struct Seed {
    category: Category,
    days_ago: i64,
    responsible: &'static str,
    unit: &'static str,
    guests: u32,
    value: f64,
    notes: Option<&'static str>,
}

const SEEDS: &[Seed] = &[
    Seed {
        category: Category::Water,
        days_ago: 10,
        responsible: "José Silva",
        unit: "Sede Administrativa",
        guests: 0,
        value: 342.5,
        notes: Some("Medição regular mensal"),
    },
    Seed {
        category: Category::Water,
        days_ago: 5,
        responsible: "Ana Costa",
        unit: "Hotel Marina",
        guests: 42,
        value: 1230.0,
        notes: Some("Alta ocupação no fim de semana"),
    },
    Seed {
        category: Category::Water,
        days_ago: 0,
        responsible: "Carlos Mendes",
        unit: "Hotel Praia",
        guests: 65,
        value: 1540.2,
        notes: None,
    },
    Seed {
        category: Category::Electricity,
        days_ago: 10,
        responsible: "José Silva",
        unit: "Sede Administrativa",
        guests: 0,
        value: 4756.8,
        notes: Some("Medição regular mensal"),
    },
    Seed {
        category: Category::Electricity,
        days_ago: 5,
        responsible: "Ana Costa",
        unit: "Hotel Marina",
        guests: 42,
        value: 12450.3,
        notes: Some("Alta ocupação no fim de semana"),
    },
    Seed {
        category: Category::Electricity,
        days_ago: 0,
        responsible: "Carlos Mendes",
        unit: "Hotel Praia",
        guests: 65,
        value: 18750.5,
        notes: None,
    },
];

fn seed_readings(today: NaiveDate, now: DateTime<Utc>) -> Vec<MeterReading> {
    SEEDS
        .iter()
        .map(|s| MeterReading {
            id: Uuid::new_v4(),
            category: s.category,
            date: today - Duration::days(s.days_ago),
            responsible: s.responsible.to_string(),
            unit: s.unit.to_string(),
            hypolito: if s.guests == 0 { "padrao" } else { "hotel" }.to_string(),
            guests: s.guests,
            value: s.value,
            notes: s.notes.map(str::to_string),
            created_at: now - Duration::days(s.days_ago),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn reading(category: Category, date: NaiveDate, value: f64) -> MeterReading {
        MeterReading {
            id: Uuid::new_v4(),
            category,
            date,
            responsible: "Ana Costa".to_string(),
            unit: "Hotel Marina".to_string(),
            hypolito: "H-1".to_string(),
            guests: 10,
            value,
            notes: None,
            created_at: Utc::now(),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = ReadingStore::open(dir.path()).unwrap();

        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_append_then_load() {
        let dir = TempDir::new().unwrap();
        let store = ReadingStore::open(dir.path()).unwrap();

        let a = reading(Category::Water, day(2024, 1, 1), 10.0);
        let mut b = reading(Category::Electricity, day(2024, 1, 2), 20.5);
        b.notes = Some("troca de medidor".to_string());
        store.append(&a).unwrap();
        store.append(&b).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, vec![a, b]);
    }

    #[test]
    fn test_header_written_once() {
        let dir = TempDir::new().unwrap();
        let store = ReadingStore::open(dir.path()).unwrap();

        store.append(&reading(Category::Water, day(2024, 1, 1), 1.0)).unwrap();
        store.append(&reading(Category::Water, day(2024, 1, 2), 2.0)).unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        let header_count = content.lines().filter(|l| l.starts_with("id,")).count();
        assert_eq!(header_count, 1);
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let dir = TempDir::new().unwrap();
        let store = ReadingStore::open(dir.path()).unwrap();

        let good = reading(Category::Water, day(2024, 1, 1), 10.0);
        store.append(&good).unwrap();

        let mut content = fs::read_to_string(store.path()).unwrap();
        content.push_str("not-a-uuid,agua,2024-01-02,X,Y,Z,1,3.0,,2024-01-02T00:00:00Z\n");
        content.push_str(&format!(
            "{},gas,2024-01-03,X,Y,Z,1,3.0,,2024-01-03T00:00:00Z\n",
            Uuid::new_v4()
        ));
        content.push_str(&format!(
            "{},luz,31/01/2024,X,Y,Z,1,3.0,,2024-01-03T00:00:00Z\n",
            Uuid::new_v4()
        ));
        fs::write(store.path(), content).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, vec![good]);
    }

    #[test]
    fn test_delete_removes_only_matching() {
        let dir = TempDir::new().unwrap();
        let store = ReadingStore::open(dir.path()).unwrap();

        let a = reading(Category::Water, day(2024, 1, 1), 10.0);
        let b = reading(Category::Water, day(2024, 1, 2), 20.0);
        store.append(&a).unwrap();
        store.append(&b).unwrap();

        assert!(store.delete(a.id).unwrap());
        assert!(!store.delete(a.id).unwrap());
        assert_eq!(store.load().unwrap(), vec![b]);
    }

    #[test]
    fn test_delete_keeps_rows_that_load_skips() {
        let dir = TempDir::new().unwrap();
        let store = ReadingStore::open(dir.path()).unwrap();

        let a = reading(Category::Water, day(2024, 1, 1), 10.0);
        let b = reading(Category::Water, day(2024, 1, 2), 20.0);
        store.append(&a).unwrap();
        store.append(&b).unwrap();

        let malformed = format!(
            "{},luz,31/01/2024,X,Y,Z,1,3.0,,2024-01-03T00:00:00Z",
            Uuid::new_v4()
        );
        let mut content = fs::read_to_string(store.path()).unwrap();
        content.push_str(&malformed);
        content.push('\n');
        fs::write(store.path(), content).unwrap();

        assert!(store.delete(a.id).unwrap());

        let content = fs::read_to_string(store.path()).unwrap();
        assert_eq!(content.lines().count(), 3);
        assert!(content.lines().any(|l| l == malformed));
        assert_eq!(store.load().unwrap(), vec![b]);
    }

    #[test]
    fn test_delete_last_reading_keeps_store_initialized() {
        let dir = TempDir::new().unwrap();
        let store = ReadingStore::open(dir.path()).unwrap();

        let a = reading(Category::Water, day(2024, 1, 1), 10.0);
        store.append(&a).unwrap();
        assert!(store.delete(a.id).unwrap());

        assert!(store.load().unwrap().is_empty());
        assert_eq!(store.seed_if_empty(day(2024, 1, 31)).unwrap(), 0);

        let b = reading(Category::Water, day(2024, 1, 3), 5.0);
        store.append(&b).unwrap();
        assert_eq!(store.load().unwrap(), vec![b]);
    }

    #[test]
    fn test_seed_only_once() {
        let dir = TempDir::new().unwrap();
        let store = ReadingStore::open(dir.path()).unwrap();
        let today = day(2024, 6, 20);

        assert_eq!(store.seed_if_empty(today).unwrap(), 6);
        assert_eq!(store.seed_if_empty(today).unwrap(), 0);

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 6);
        assert_eq!(
            loaded.iter().filter(|r| r.category == Category::Water).count(),
            3
        );
        assert!(loaded.iter().any(|r| r.date == day(2024, 6, 10)));
        assert!(loaded.iter().any(|r| r.date == today));
    }
}
