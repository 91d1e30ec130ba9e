use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// data/mosques.json
// [
//   {
//     "id": "al-noor",
//     "name": "Al Noor Mosque",
//     "address": "101 Deans Ave",
//     "city": "Christchurch"
//   }
// ]
//
// data/prayer_times/al-noor.json
// {
//   "mosque_id": "al-noor",
//   "prayer_times": {
//     "2024-03-11": {
//       "fajr": { "time": "05:42", "iqamah": "06:00" },
//       "dhuhr": "13:30",
//       "asr": { "time": "17:02", "iqamah": "17:15" },
//       "maghrib": "19:45",
//       "isha": { "time": "21:05", "iqamah": "21:15" }
//     }
//   }
// }
pub mod file {
    use super::*;

    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct PrayerTimesFile {
        #[serde(default)]
        pub prayer_times: BTreeMap<String, DailyPrayerTimes>,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mosque {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Prayer {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Prayer {
    /// Daily order; earlier entries win ties.
    pub const ALL: [Prayer; 5] = [
        Prayer::Fajr,
        Prayer::Dhuhr,
        Prayer::Asr,
        Prayer::Maghrib,
        Prayer::Isha,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Fajr => "fajr",
            Self::Dhuhr => "dhuhr",
            Self::Asr => "asr",
            Self::Maghrib => "maghrib",
            Self::Isha => "isha",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Fajr => "Fajr",
            Self::Dhuhr => "Dhuhr",
            Self::Asr => "Asr",
            Self::Maghrib => "Maghrib",
            Self::Isha => "Isha",
        }
    }
}

impl fmt::Display for Prayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown prayer name: {0}")]
pub struct UnknownPrayer(pub String);

impl FromStr for Prayer {
    type Err = UnknownPrayer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Prayer::ALL
            .into_iter()
            .find(|p| p.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownPrayer(s.to_owned()))
    }
}

/// Wall-clock `HH:MM`, 24-hour, no seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    pub fn minutes_since_midnight(&self) -> u32 {
        self.hour() * 60 + self.minute()
    }

    pub fn as_naive(&self) -> NaiveTime {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time of day {0:?}, expected HH:MM")]
pub struct InvalidTimeOfDay(pub String);

impl FromStr for TimeOfDay {
    type Err = InvalidTimeOfDay;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map(Self)
            .map_err(|_| InvalidTimeOfDay(s.to_owned()))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A prayer's time as stored: either a bare `"HH:MM"` or `{ "time", "iqamah" }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrayerTimeEntry {
    Plain(TimeOfDay),
    Detailed {
        time: TimeOfDay,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        iqamah: Option<TimeOfDay>,
    },
}

impl PrayerTimeEntry {
    pub fn time(&self) -> TimeOfDay {
        match self {
            Self::Plain(time) | Self::Detailed { time, .. } => *time,
        }
    }

    pub fn iqamah(&self) -> Option<TimeOfDay> {
        match self {
            Self::Plain(_) => None,
            Self::Detailed { iqamah, .. } => *iqamah,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyPrayerTimes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fajr: Option<PrayerTimeEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dhuhr: Option<PrayerTimeEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asr: Option<PrayerTimeEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maghrib: Option<PrayerTimeEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isha: Option<PrayerTimeEntry>,
    // sunrise, jumuah and friends; passed through untouched
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl DailyPrayerTimes {
    pub fn get(&self, prayer: Prayer) -> Option<&PrayerTimeEntry> {
        match prayer {
            Prayer::Fajr => self.fajr.as_ref(),
            Prayer::Dhuhr => self.dhuhr.as_ref(),
            Prayer::Asr => self.asr.as_ref(),
            Prayer::Maghrib => self.maghrib.as_ref(),
            Prayer::Isha => self.isha.as_ref(),
        }
    }

    pub fn set(&mut self, prayer: Prayer, entry: PrayerTimeEntry) {
        let slot = match prayer {
            Prayer::Fajr => &mut self.fajr,
            Prayer::Dhuhr => &mut self.dhuhr,
            Prayer::Asr => &mut self.asr,
            Prayer::Maghrib => &mut self.maghrib,
            Prayer::Isha => &mut self.isha,
        };
        *slot = Some(entry);
    }

    /// Present entries in daily order.
    pub fn iter(&self) -> impl Iterator<Item = (Prayer, &PrayerTimeEntry)> + '_ {
        Prayer::ALL
            .into_iter()
            .filter_map(move |p| self.get(p).map(|entry| (p, entry)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextPrayer {
    #[serde(serialize_with = "display_name")]
    pub name: Prayer,
    pub time: TimeOfDay,
    pub iqamah: Option<TimeOfDay>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub tomorrow: bool,
}

fn display_name<S: Serializer>(prayer: &Prayer, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(prayer.name())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Countdown {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub total_seconds: f64,
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct HijriDate {
    pub year: i64,
    pub month: u32,
    pub day: u32,
    pub month_name: &'static str,
}

impl fmt::Display for HijriDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} AH", self.day, self.month_name, self.year)
    }
}
