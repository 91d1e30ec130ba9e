use crate::structs::{Countdown, DailyPrayerTimes, NextPrayer, Prayer, TimeOfDay};
use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};

/// Finds the next prayer after `now` in a day's prayer times.
///
/// Compares at minute granularity: a prayer at the current minute has
/// already started and is skipped. Once the last prayer of the day has
/// passed, wraps to tomorrow's Fajr (`tomorrow = true`) using today's
/// Fajr time as the estimate.
///
/// Returns `None` when there are no times, or when wrapping is needed but
/// Fajr is missing.
pub fn resolve(times: Option<&DailyPrayerTimes>, now: NaiveDateTime) -> Option<NextPrayer> {
    let times = times?;
    let current = now.hour() * 60 + now.minute();

    let mut next: Option<(u32, NextPrayer)> = None;
    for (prayer, entry) in times.iter() {
        let minutes = entry.time().minutes_since_midnight();
        if minutes <= current {
            continue;
        }
        let diff = minutes - current;
        // strict `<` keeps the earliest prayer on a tie
        if next.as_ref().map_or(true, |(best, _)| diff < *best) {
            next = Some((
                diff,
                NextPrayer {
                    name: prayer,
                    time: entry.time(),
                    iqamah: entry.iqamah(),
                    tomorrow: false,
                },
            ));
        }
    }

    match next {
        Some((_, prayer)) => Some(prayer),
        None => times.get(Prayer::Fajr).map(|entry| NextPrayer {
            name: Prayer::Fajr,
            time: entry.time(),
            iqamah: entry.iqamah(),
            tomorrow: true,
        }),
    }
}

/// Time remaining from `now` until `prayer_time`.
///
/// The target is `prayer_time` on `now`'s date, moved one calendar day
/// forward when `tomorrow` is set or when it has already passed.
pub fn countdown(prayer_time: TimeOfDay, tomorrow: bool, now: NaiveDateTime) -> Countdown {
    let mut target = now.date().and_time(prayer_time.as_naive());
    if tomorrow || target < now {
        target = target
            .checked_add_signed(Duration::days(1))
            .unwrap_or(target);
    }

    let remaining = target - now;
    let total_seconds = remaining
        .num_microseconds()
        .map(|us| us as f64 / 1_000_000.0)
        .unwrap_or_else(|| remaining.num_seconds() as f64);

    Countdown {
        hours: (total_seconds / 3600.0).floor() as i64,
        minutes: (total_seconds.rem_euclid(3600.0) / 60.0).floor() as i64,
        seconds: total_seconds.rem_euclid(60.0).floor() as i64,
        total_seconds,
    }
}

/// Astronomical prayer-time calculation hook.
///
/// Times are read from the per-mosque data files; no calculation method is
/// wired in, so this always returns `None`.
pub fn calculate_prayer_times(
    _date: NaiveDate,
    _latitude: f64,
    _longitude: f64,
    _utc_offset_hours: f64,
) -> Option<DailyPrayerTimes> {
    None
}
