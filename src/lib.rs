use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::sync::Arc;

pub mod assets;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod data;
pub mod error;
pub mod pages;
pub mod routes;
pub mod schedule;
pub mod structs;

use data::MosqueRepository;
use error::AppError;
use structs::{Countdown, DailyPrayerTimes, HijriDate, Mosque, NextPrayer};

/// Days shown on the schedule page, today included.
pub const SCHEDULE_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize)]
pub struct HomeView {
    pub now: NaiveDateTime,
    pub hijri_date: Option<HijriDate>,
    pub mosque: Option<Mosque>,
    pub mosques: Vec<Mosque>,
    pub selected_mosque_id: Option<String>,
    pub prayer_times: Option<DailyPrayerTimes>,
    pub next_prayer: Option<NextPrayer>,
    pub countdown: Option<Countdown>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MosqueView {
    pub date: NaiveDate,
    pub hijri_date: Option<HijriDate>,
    pub mosque: Mosque,
    pub mosques: Vec<Mosque>,
    pub prayer_times: Option<DailyPrayerTimes>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleDay {
    pub date: NaiveDate,
    pub hijri_date: Option<HijriDate>,
    pub prayer_times: Option<DailyPrayerTimes>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleView {
    /// First day shown.
    pub date: NaiveDate,
    pub mosque: Option<Mosque>,
    pub mosques: Vec<Mosque>,
    pub selected_mosque_id: Option<String>,
    pub days: Vec<ScheduleDay>,
}

/// Builds page data from the repository and the schedule/calendar math.
/// Callers pass "now" in; nothing here reads the clock.
#[derive(Clone)]
pub struct PrayerBoard {
    database: Arc<dyn MosqueRepository>,
}

impl PrayerBoard {
    pub fn new(database: Arc<dyn MosqueRepository>) -> Self {
        Self { database }
    }

    fn select(mosques: &[Mosque], requested: Option<&str>) -> Option<String> {
        requested
            .map(str::to_owned)
            .or_else(|| mosques.first().map(|m| m.id.clone()))
    }

    fn times_for(
        &self,
        mosque_id: Option<&str>,
        date: NaiveDate,
    ) -> Result<Option<DailyPrayerTimes>, AppError> {
        match mosque_id {
            Some(id) => self.database.prayer_times(id, date),
            None => Ok(None),
        }
    }

    /// Home page: today's times for the requested (or first) mosque, the next
    /// prayer and the countdown to it.
    pub fn home(&self, mosque_id: Option<&str>, now: NaiveDateTime) -> Result<HomeView, AppError> {
        let mosques = self.database.mosques()?;
        let selected_mosque_id = Self::select(&mosques, mosque_id);
        let prayer_times = self.times_for(selected_mosque_id.as_deref(), now.date())?;

        let next_prayer = schedule::resolve(prayer_times.as_ref(), now);
        let countdown = next_prayer
            .as_ref()
            .map(|next| schedule::countdown(next.time, next.tomorrow, now));
        tracing::debug!(
            "next prayer for {:?}: {:?} in {:?}",
            selected_mosque_id,
            next_prayer.as_ref().map(|n| n.name),
            countdown.map(|c| c.to_string())
        );

        let mosque = mosques
            .iter()
            .find(|m| Some(&m.id) == selected_mosque_id.as_ref())
            .cloned();

        Ok(HomeView {
            now,
            hijri_date: calendar::to_hijri(now.date()),
            mosque,
            mosques,
            selected_mosque_id,
            prayer_times,
            next_prayer,
            countdown,
        })
    }

    pub fn mosque(&self, mosque_id: &str, today: NaiveDate) -> Result<MosqueView, AppError> {
        let mosques = self.database.mosques()?;
        let mosque = mosques
            .iter()
            .find(|m| m.id == mosque_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Mosque not found".to_owned()))?;
        let prayer_times = self.database.prayer_times(mosque_id, today)?;

        Ok(MosqueView {
            date: today,
            hijri_date: calendar::to_hijri(today),
            mosque,
            mosques,
            prayer_times,
        })
    }

    /// The week starting today. With no mosques configured the view is empty.
    pub fn schedule(&self, mosque_id: Option<&str>, today: NaiveDate) -> Result<ScheduleView, AppError> {
        let mosques = self.database.mosques()?;
        if mosques.is_empty() {
            return Ok(ScheduleView {
                date: today,
                mosque: None,
                mosques,
                selected_mosque_id: None,
                days: Vec::new(),
            });
        }

        let selected_mosque_id = Self::select(&mosques, mosque_id);
        let mut days = Vec::with_capacity(SCHEDULE_DAYS as usize);
        for offset in 0..SCHEDULE_DAYS {
            let date = today + Duration::days(offset);
            days.push(ScheduleDay {
                date,
                hijri_date: calendar::to_hijri(date),
                prayer_times: self.times_for(selected_mosque_id.as_deref(), date)?,
            });
        }

        let mosque = mosques
            .iter()
            .find(|m| Some(&m.id) == selected_mosque_id.as_ref())
            .cloned();

        Ok(ScheduleView {
            date: today,
            mosque,
            mosques,
            selected_mosque_id,
            days,
        })
    }

    /// Stored times for the JSON endpoint; `date` must be `YYYY-MM-DD`.
    pub fn prayer_times(&self, mosque_id: &str, date: &str) -> Result<DailyPrayerTimes, AppError> {
        let not_found = || AppError::NotFound("Prayer times not found".to_owned());
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| not_found())?;
        self.database
            .prayer_times(mosque_id, date)?
            .ok_or_else(not_found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MemoryStore;
    use crate::structs::{Prayer, PrayerTimeEntry};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn mosque(id: &str, name: &str) -> Mosque {
        Mosque {
            id: id.into(),
            name: name.into(),
            address: None,
            city: None,
            extra: Default::default(),
        }
    }

    fn day(fajr: &str, isha: &str) -> DailyPrayerTimes {
        let mut times = DailyPrayerTimes::default();
        times.set(Prayer::Fajr, PrayerTimeEntry::Plain(fajr.parse().unwrap()));
        times.set(Prayer::Isha, PrayerTimeEntry::Plain(isha.parse().unwrap()));
        times
    }

    fn board() -> PrayerBoard {
        let store = MemoryStore::new();
        store.add_mosque(mosque("al-noor", "Al Noor"));
        store.add_mosque(mosque("linwood", "Linwood"));
        store.set_prayer_times("al-noor", ymd(2024, 3, 11), day("05:42", "21:05"));
        store.set_prayer_times("al-noor", ymd(2024, 3, 13), day("05:44", "21:02"));
        store.set_prayer_times("linwood", ymd(2024, 3, 11), day("05:40", "21:00"));
        PrayerBoard::new(Arc::new(store))
    }

    #[test]
    fn test_home_defaults_to_first_mosque() {
        let now = ymd(2024, 3, 11).and_hms_opt(20, 0, 0).unwrap();
        let view = board().home(None, now).unwrap();
        assert_eq!(view.selected_mosque_id.as_deref(), Some("al-noor"));
        assert_eq!(view.mosque.unwrap().name, "Al Noor");
        let next = view.next_prayer.unwrap();
        assert_eq!(next.name, Prayer::Isha);
        let countdown = view.countdown.unwrap();
        assert_eq!((countdown.hours, countdown.minutes), (1, 5));
        assert_eq!(view.hijri_date.unwrap().month_name, "Ramadan");
    }

    #[test]
    fn test_home_after_isha_counts_to_tomorrow() {
        let now = ymd(2024, 3, 11).and_hms_opt(22, 0, 0).unwrap();
        let view = board().home(Some("linwood"), now).unwrap();
        let next = view.next_prayer.unwrap();
        assert!(next.tomorrow);
        assert_eq!(view.countdown.unwrap().total_seconds, 7.0 * 3600.0 + 40.0 * 60.0);
    }

    #[test]
    fn test_home_without_data() {
        let now = ymd(2024, 3, 12).and_hms_opt(9, 0, 0).unwrap();
        let view = board().home(Some("unknown"), now).unwrap();
        assert!(view.mosque.is_none());
        assert!(view.prayer_times.is_none());
        assert!(view.next_prayer.is_none());
        assert!(view.countdown.is_none());

        let empty = PrayerBoard::new(Arc::new(MemoryStore::new()));
        let view = empty.home(None, now).unwrap();
        assert!(view.selected_mosque_id.is_none());
        assert!(view.hijri_date.is_some());
    }

    #[test]
    fn test_mosque_page() {
        let view = board().mosque("linwood", ymd(2024, 3, 11)).unwrap();
        assert_eq!(view.mosque.name, "Linwood");
        assert!(view.prayer_times.is_some());
        let err = board().mosque("nope", ymd(2024, 3, 11)).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_schedule_week() {
        let view = board().schedule(None, ymd(2024, 3, 11)).unwrap();
        assert_eq!(view.days.len(), 7);
        assert_eq!(view.days[0].date, ymd(2024, 3, 11));
        assert_eq!(view.days[6].date, ymd(2024, 3, 17));
        assert!(view.days[0].prayer_times.is_some());
        assert!(view.days[1].prayer_times.is_none());
        assert!(view.days[2].prayer_times.is_some());
        assert_eq!(view.days[1].hijri_date.unwrap().day, 2);
    }

    #[test]
    fn test_schedule_without_mosques() {
        let empty = PrayerBoard::new(Arc::new(MemoryStore::new()));
        let view = empty.schedule(Some("al-noor"), ymd(2024, 3, 11)).unwrap();
        assert!(view.days.is_empty());
        assert!(view.selected_mosque_id.is_none());
        assert_eq!(view.date, ymd(2024, 3, 11));
    }

    #[test]
    fn test_prayer_times_lookup() {
        assert!(board().prayer_times("al-noor", "2024-03-11").is_ok());
        assert!(matches!(
            board().prayer_times("al-noor", "2024-03-12"),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            board().prayer_times("al-noor", "yesterday"),
            Err(AppError::NotFound(_))
        ));
    }
}
