use crate::error::AppError;
use crate::structs::{file::PrayerTimesFile, DailyPrayerTimes, Mosque};
use chrono::{Duration, NaiveDate};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Number of days the demo refresh lays out, starting today.
pub const DEMO_DAYS: usize = 7;

pub trait MosqueRepository: Sync + Send {
    /// All mosques, in file order. A missing index is an empty list.
    fn mosques(&self) -> Result<Vec<Mosque>, AppError>;

    /// Stored times for one mosque on one date, if any.
    fn prayer_times(
        &self,
        mosque_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyPrayerTimes>, AppError>;

    fn mosque(&self, mosque_id: &str) -> Result<Option<Mosque>, AppError> {
        Ok(self.mosques()?.into_iter().find(|m| m.id == mosque_id))
    }
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// ids become file names; anything else could walk out of the data directory
fn is_safe_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, AppError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!("{} not found", path.display());
            return Ok(None);
        }
        Err(err) => return Err(AppError::io(path, err)),
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|err| AppError::json(path, err))
}

/// Mosque data kept as JSON files:
///
/// ```text
/// <root>/mosques.json
/// <root>/prayer_times/<mosque_id>.json
/// ```
///
/// Files are read on every call, so edits show up without a restart.
#[derive(Debug, Clone)]
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn mosques_path(&self) -> PathBuf {
        self.root.join("mosques.json")
    }

    fn prayer_times_dir(&self) -> PathBuf {
        self.root.join("prayer_times")
    }

    /// Rewrites every prayer-time file so its stored days land on the week
    /// starting at `today`.
    ///
    /// The first `min(n, 7)` days become `today`, `today + 1`, ... carrying
    /// the stored days in date order. Other top-level fields are kept. Files
    /// that fail are logged and skipped. Returns the number of files written.
    pub fn refresh_demo_dates(&self, today: NaiveDate) -> Result<usize, AppError> {
        let dir = self.prayer_times_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(AppError::io(dir, err)),
        };

        let mut rewritten = 0;
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(err) => {
                    tracing::warn!("skipping unreadable entry in {}: {}", dir.display(), err);
                    continue;
                }
            };
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match refresh_file(&path, today) {
                Ok(true) => {
                    tracing::info!("moved demo prayer times in {} to {}", path.display(), today);
                    rewritten += 1;
                }
                Ok(false) => tracing::debug!("no prayer times in {}", path.display()),
                Err(err) => tracing::warn!("error updating prayer times with current dates: {}", err),
            }
        }
        Ok(rewritten)
    }
}

fn refresh_file(path: &Path, today: NaiveDate) -> Result<bool, AppError> {
    let mut data: serde_json::Value = match read_json(path)? {
        Some(data) => data,
        None => return Ok(false),
    };

    let samples: Vec<serde_json::Value> = match data
        .get("prayer_times")
        .and_then(|times| times.as_object())
    {
        Some(times) if !times.is_empty() => times.values().cloned().collect(),
        _ => return Ok(false),
    };

    let shifted: serde_json::Map<String, serde_json::Value> = (0..samples.len().min(DEMO_DAYS))
        .map(|i| {
            let date = today + Duration::days(i as i64);
            (date_key(date), samples[i % samples.len()].clone())
        })
        .collect();
    data["prayer_times"] = serde_json::Value::Object(shifted);

    let body = serde_json::to_string_pretty(&data).map_err(|err| AppError::json(path, err))?;
    fs::write(path, body).map_err(|err| AppError::io(path, err))?;
    Ok(true)
}

impl MosqueRepository for JsonStore {
    fn mosques(&self) -> Result<Vec<Mosque>, AppError> {
        Ok(read_json(&self.mosques_path())?.unwrap_or_default())
    }

    fn prayer_times(
        &self,
        mosque_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyPrayerTimes>, AppError> {
        if !is_safe_id(mosque_id) {
            tracing::warn!("rejecting mosque id {:?}", mosque_id);
            return Ok(None);
        }
        let path = self.prayer_times_dir().join(format!("{mosque_id}.json"));
        let file: Option<PrayerTimesFile> = read_json(&path)?;
        Ok(file.and_then(|mut f| f.prayer_times.remove(&date_key(date))))
    }
}

/// In-memory repository, handy for tests and previews.
#[derive(Debug, Default)]
pub struct MemoryStore {
    mosques: Mutex<Vec<Mosque>>,
    times: Mutex<HashMap<(String, NaiveDate), DailyPrayerTimes>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mosque(&self, mosque: Mosque) {
        let mut mosques = self.mosques.lock().unwrap_or_else(PoisonError::into_inner);
        mosques.push(mosque);
    }

    pub fn set_prayer_times(&self, mosque_id: &str, date: NaiveDate, times: DailyPrayerTimes) {
        let mut data = self.times.lock().unwrap_or_else(PoisonError::into_inner);
        data.insert((mosque_id.to_owned(), date), times);
    }
}

impl MosqueRepository for MemoryStore {
    fn mosques(&self) -> Result<Vec<Mosque>, AppError> {
        let mosques = self.mosques.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(mosques.clone())
    }

    fn prayer_times(
        &self,
        mosque_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyPrayerTimes>, AppError> {
        let data = self.times.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(data.get(&(mosque_id.to_owned(), date)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::Prayer;
    use serde_json::json;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mosque-times-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("prayer_times")).unwrap();
        dir
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn write(path: PathBuf, value: serde_json::Value) {
        fs::write(path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
    }

    #[test]
    fn test_missing_files_mean_no_data() {
        let dir = scratch_dir("missing");
        let store = JsonStore::new(&dir);
        assert!(store.mosques().unwrap().is_empty());
        assert!(store.prayer_times("nowhere", ymd(2024, 3, 11)).unwrap().is_none());
        assert!(store.mosque("nowhere").unwrap().is_none());
    }

    #[test]
    fn test_reads_mosques_and_times() {
        let dir = scratch_dir("reads");
        write(
            dir.join("mosques.json"),
            json!([
                {"id": "al-noor", "name": "Al Noor", "city": "Christchurch", "capacity": 300},
                {"id": "linwood", "name": "Linwood Islamic Centre"}
            ]),
        );
        write(
            dir.join("prayer_times/al-noor.json"),
            json!({"prayer_times": {"2024-03-11": {"fajr": "05:42", "isha": {"time": "21:05", "iqamah": "21:15"}}}}),
        );

        let store = JsonStore::new(&dir);
        let mosques = store.mosques().unwrap();
        assert_eq!(mosques.len(), 2);
        assert_eq!(mosques[0].city.as_deref(), Some("Christchurch"));
        assert_eq!(mosques[0].extra["capacity"], 300);
        assert_eq!(store.mosque("linwood").unwrap().unwrap().name, "Linwood Islamic Centre");

        let times = store.prayer_times("al-noor", ymd(2024, 3, 11)).unwrap().unwrap();
        assert!(times.get(Prayer::Fajr).is_some());
        assert!(times.get(Prayer::Dhuhr).is_none());
        assert!(store.prayer_times("al-noor", ymd(2024, 3, 12)).unwrap().is_none());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let dir = scratch_dir("malformed");
        fs::write(dir.join("mosques.json"), "[{").unwrap();
        assert!(matches!(store_err(&dir), AppError::Json { .. }));
    }

    fn store_err(dir: &Path) -> AppError {
        JsonStore::new(dir).mosques().unwrap_err()
    }

    #[test]
    fn test_unsafe_ids_are_rejected() {
        let dir = scratch_dir("unsafe");
        write(dir.join("secret.json"), json!({"prayer_times": {"2024-03-11": {"fajr": "05:00"}}}));
        let store = JsonStore::new(&dir);
        assert!(store.prayer_times("../../secret", ymd(2024, 3, 11)).unwrap().is_none());
        assert!(!is_safe_id(""));
        assert!(is_safe_id("al-noor_2"));
    }

    #[test]
    fn test_refresh_demo_dates() {
        let dir = scratch_dir("refresh");
        let days: serde_json::Map<String, serde_json::Value> = (1..=9)
            .map(|d| (format!("2023-01-{d:02}"), json!({"fajr": format!("05:{:02}", d)})))
            .collect();
        write(
            dir.join("prayer_times/al-noor.json"),
            json!({"mosque_id": "al-noor", "prayer_times": days}),
        );
        write(dir.join("prayer_times/empty.json"), json!({"mosque_id": "empty"}));
        fs::write(dir.join("prayer_times/notes.txt"), "ignored").unwrap();

        let store = JsonStore::new(&dir);
        let today = ymd(2024, 12, 29);
        assert_eq!(store.refresh_demo_dates(today).unwrap(), 1);

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.join("prayer_times/al-noor.json")).unwrap())
                .unwrap();
        assert_eq!(raw["mosque_id"], "al-noor");
        let times = raw["prayer_times"].as_object().unwrap();
        assert_eq!(times.len(), DEMO_DAYS);
        assert_eq!(times["2024-12-29"]["fajr"], "05:01");
        assert_eq!(times["2025-01-04"]["fajr"], "05:07");

        let jan_first = store.prayer_times("al-noor", ymd(2025, 1, 1)).unwrap().unwrap();
        assert_eq!(jan_first.get(Prayer::Fajr).unwrap().time().to_string(), "05:04");
    }

    #[test]
    fn test_refresh_short_file_keeps_sample_count() {
        let dir = scratch_dir("refresh-short");
        write(
            dir.join("prayer_times/a.json"),
            json!({"prayer_times": {"2023-05-01": {"fajr": "04:10"}, "2023-05-02": {"fajr": "04:11"}}}),
        );
        let store = JsonStore::new(&dir);
        assert_eq!(store.refresh_demo_dates(ymd(2024, 3, 11)).unwrap(), 1);
        assert!(store.prayer_times("a", ymd(2024, 3, 12)).unwrap().is_some());
        assert!(store.prayer_times("a", ymd(2024, 3, 13)).unwrap().is_none());
    }

    #[test]
    fn test_refresh_without_directory() {
        let dir = std::env::temp_dir().join(format!("mosque-times-absent-{}", std::process::id()));
        assert_eq!(JsonStore::new(dir).refresh_demo_dates(ymd(2024, 3, 11)).unwrap(), 0);
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        store.add_mosque(Mosque {
            id: "al-noor".into(),
            name: "Al Noor".into(),
            address: None,
            city: None,
            extra: Default::default(),
        });
        let mut times = DailyPrayerTimes::default();
        times.fajr = Some(crate::structs::PrayerTimeEntry::Plain("05:42".parse().unwrap()));
        store.set_prayer_times("al-noor", ymd(2024, 3, 11), times.clone());

        assert_eq!(store.mosques().unwrap().len(), 1);
        assert_eq!(store.prayer_times("al-noor", ymd(2024, 3, 11)).unwrap(), Some(times));
        assert!(store.prayer_times("al-noor", ymd(2024, 3, 12)).unwrap().is_none());
    }
}
