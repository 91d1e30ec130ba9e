//! Server-side HTML for the three pages.

use crate::structs::{DailyPrayerTimes, HijriDate, Mosque, NextPrayer, Prayer};
use crate::{HomeView, MosqueView, ScheduleView};
use chrono::{Datelike, NaiveDate};
use std::fmt::Write;

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn long_date(date: NaiveDate) -> String {
    date.format("%A, %-d %B %Y").to_string()
}

fn hijri_text(hijri: Option<&HijriDate>) -> String {
    hijri.map(|h| escape(&h.to_string())).unwrap_or_default()
}

fn layout(
    title: &str,
    year: i32,
    mosques: &[Mosque],
    selected: Option<&str>,
    action: &str,
    body: &str,
) -> String {
    let mut options = String::new();
    for mosque in mosques {
        let _ = write!(
            options,
            r#"<option value="{id}"{sel}>{name}</option>"#,
            id = escape(&mosque.id),
            sel = if Some(mosque.id.as_str()) == selected { " selected" } else { "" },
            name = escape(&mosque.name),
        );
    }
    let picker = if mosques.is_empty() {
        String::new()
    } else {
        format!(
            r#"<form method="get" action="{action}" class="picker"><select name="mosque_id" onchange="this.form.submit()">{options}</select><noscript><button type="submit">Show</button></noscript></form>"#
        )
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Mosque Prayer Times</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
<header><nav><a href="/">Today</a> <a href="/schedule">Weekly schedule</a></nav>{picker}</header>
<main>
{body}
</main>
<footer>&copy; {year} Mosque Prayer Times</footer>
<script src="/static/countdown.js"></script>
</body>
</html>
"#,
        title = escape(title),
    )
}

fn times_table(times: &DailyPrayerTimes, next: Option<&NextPrayer>) -> String {
    let mut rows = String::new();
    for prayer in Prayer::ALL {
        let Some(entry) = times.get(prayer) else {
            continue;
        };
        let highlight = next.map_or(false, |n| n.name == prayer && !n.tomorrow);
        let _ = write!(
            rows,
            r#"<tr{class}><th>{name}</th><td>{time}</td><td>{iqamah}</td></tr>"#,
            class = if highlight { r#" class="next""# } else { "" },
            name = prayer.name(),
            time = entry.time(),
            iqamah = entry
                .iqamah()
                .map(|t| t.to_string())
                .unwrap_or_else(|| "&mdash;".to_owned()),
        );
    }
    format!(
        r#"<table class="times"><thead><tr><th>Prayer</th><th>Adhan</th><th>Iqamah</th></tr></thead><tbody>{rows}</tbody></table>"#
    )
}

const NO_DATA: &str = r#"<p class="empty">No prayer times available for this date.</p>"#;

pub fn home(view: &HomeView) -> String {
    let mut body = String::new();
    let _ = write!(
        body,
        r#"<section class="dates"><h1>{}</h1><p class="hijri">{}</p></section>"#,
        long_date(view.now.date()),
        hijri_text(view.hijri_date.as_ref()),
    );

    if let Some(mosque) = &view.mosque {
        let _ = write!(
            body,
            r#"<h2><a href="/mosque/{id}">{name}</a></h2>"#,
            id = escape(&mosque.id),
            name = escape(&mosque.name),
        );
    }

    if let (Some(next), Some(countdown)) = (&view.next_prayer, &view.countdown) {
        let _ = write!(
            body,
            r#"<section class="next-prayer"><h3>Next: {name}{when}</h3><p class="at">Adhan {time}{iqamah}</p><p class="countdown" data-seconds="{secs}">{countdown}</p></section>"#,
            name = next.name,
            when = if next.tomorrow { " (tomorrow)" } else { "" },
            time = next.time,
            iqamah = next
                .iqamah
                .map(|t| format!(", Iqamah {t}"))
                .unwrap_or_default(),
            secs = countdown.total_seconds.floor() as i64,
        );
    }

    match &view.prayer_times {
        Some(times) => body.push_str(&times_table(times, view.next_prayer.as_ref())),
        None => body.push_str(NO_DATA),
    }

    layout(
        "Today",
        view.now.year(),
        &view.mosques, view.selected_mosque_id.as_deref(),
        "/",
        &body,
    )
}

pub fn mosque(view: &MosqueView) -> String {
    let mosque = &view.mosque;
    let mut body = String::new();
    let _ = write!(body, "<h1>{}</h1>", escape(&mosque.name));

    let location: Vec<&str> = [mosque.address.as_deref(), mosque.city.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if !location.is_empty() {
        let _ = write!(body, r#"<p class="address">{}</p>"#, escape(&location.join(", ")));
    }

    let _ = write!(
        body,
        r#"<p class="dates">{} &middot; {}</p>"#,
        long_date(view.date),
        hijri_text(view.hijri_date.as_ref()),
    );
    match &view.prayer_times {
        Some(times) => body.push_str(&times_table(times, None)),
        None => body.push_str(NO_DATA),
    }
    let _ = write!(
        body,
        r#"<p><a href="/schedule?mosque_id={}">Weekly schedule</a></p>"#,
        escape(&mosque.id)
    );

    layout(&mosque.name, view.date.year(), &view.mosques, Some(&mosque.id), "/", &body)
}

pub fn schedule(view: &ScheduleView) -> String {
    let mut body = String::new();
    match &view.mosque {
        Some(mosque) => {
            let _ = write!(body, "<h1>{} &middot; weekly schedule</h1>", escape(&mosque.name));
        }
        None => body.push_str("<h1>Weekly schedule</h1>"),
    }

    if view.days.is_empty() {
        body.push_str(r#"<p class="empty">No mosques available.</p>"#);
    } else {
        body.push_str(r#"<table class="schedule"><thead><tr><th>Date</th><th>Hijri</th>"#);
        for prayer in Prayer::ALL {
            let _ = write!(body, "<th>{}</th>", prayer.name());
        }
        body.push_str("</tr></thead><tbody>");
        for day in &view.days {
            let _ = write!(
                body,
                "<tr><td>{}</td><td>{}</td>",
                day.date.format("%a %-d %b"),
                hijri_text(day.hijri_date.as_ref()),
            );
            match &day.prayer_times {
                Some(times) => {
                    for prayer in Prayer::ALL {
                        let cell = times
                            .get(prayer)
                            .map(|entry| match entry.iqamah() {
                                Some(iqamah) => format!("{}<small>{}</small>", entry.time(), iqamah),
                                None => entry.time().to_string(),
                            })
                            .unwrap_or_else(|| "&mdash;".to_owned());
                        let _ = write!(body, "<td>{cell}</td>");
                    }
                }
                None => {
                    let _ = write!(
                        body,
                        r#"<td colspan="{}" class="empty">No data</td>"#,
                        Prayer::ALL.len()
                    );
                }
            }
            body.push_str("</tr>");
        }
        body.push_str("</tbody></table>");
    }

    layout(
        "Weekly schedule",
        view.date.year(),
        &view.mosques,
        view.selected_mosque_id.as_deref(),
        "/schedule",
        &body,
    )
}
