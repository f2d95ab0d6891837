use crate::model::AttendanceStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    #[serde(rename = "PRESENT")]
    pub present: u32,
    #[serde(rename = "ABSENT")]
    pub absent: u32,
    #[serde(rename = "LATE")]
    pub late: u32,
}

impl StatusCounts {
    pub fn add(&mut self, status: AttendanceStatus, n: u32) {
        match status {
            AttendanceStatus::Present => self.present += n,
            AttendanceStatus::Absent => self.absent += n,
            AttendanceStatus::Late => self.late += n,
        }
    }

    pub fn total(&self) -> u32 {
        self.present + self.absent + self.late
    }

    pub fn stats(&self) -> AttendanceStats {
        AttendanceStats {
            percentage: attendance_percentage(self.present, self.total()),
            presents: self.present,
            absents: self.absent,
            lates: self.late,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceStats {
    pub percentage: u32,
    pub presents: u32,
    pub absents: u32,
    pub lates: u32,
}

pub fn tally<I>(statuses: I) -> StatusCounts
where
    I: IntoIterator<Item = AttendanceStatus>,
{
    let mut counts = StatusCounts::default();
    for s in statuses {
        counts.add(s, 1);
    }
    counts
}

/// `round(100 * presents / total)`; LATE is not counted as present.
/// Zero sessions yield 0.
pub fn attendance_percentage(presents: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (100.0 * f64::from(presents) / f64::from(total)).round() as u32
}

pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((start, end))
}

/// Strict `YYYY-MM-DD`: no padding, signs or single-digit fields.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let b = raw.as_bytes();
    let shaped = b.len() == 10
        && b.iter().enumerate().all(|(i, c)| match i {
            4 | 7 => *c == b'-',
            _ => c.is_ascii_digit(),
        });
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

pub fn dedupe_last_wins<T, K, F>(entries: Vec<T>, key: F) -> Vec<T>
where
    K: std::hash::Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut slot_by_key: HashMap<K, usize> = HashMap::new();
    let mut out: Vec<T> = Vec::with_capacity(entries.len());
    for e in entries {
        let k = key(&e);
        if let Some(&idx) = slot_by_key.get(&k) {
            out[idx] = e;
        } else {
            slot_by_key.insert(k, out.len());
            out.push(e);
        }
    }
    out
}

// Numeric roll numbers sort first.
pub fn cmp_roll_numbers(a: &str, b: &str) -> Ordering {
    let (ta, tb) = (a.trim(), b.trim());
    match (ta.parse::<u64>(), tb.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| ta.cmp(tb)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => ta.cmp(tb),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AttendanceStatus::*;

    #[test]
    fn percentage_is_zero_without_sessions() {
        assert_eq!(attendance_percentage(0, 0), 0);
        assert_eq!(tally(Vec::new()).stats(), AttendanceStats::default());
    }

    #[test]
    fn percentage_rounds_to_nearest() {
        assert_eq!(attendance_percentage(2, 3), 67);
        assert_eq!(attendance_percentage(1, 3), 33);
        assert_eq!(attendance_percentage(1, 8), 13);
        assert_eq!(attendance_percentage(5, 5), 100);
    }

    #[test]
    fn late_is_not_counted_as_present() {
        let counts = tally([Present, Late, Absent, Late]);
        let stats = counts.stats();
        assert_eq!(stats.presents, 1);
        assert_eq!(stats.lates, 2);
        assert_eq!(stats.absents, 1);
        assert_eq!(stats.percentage, 25);
        assert_eq!(stats.presents + stats.absents + stats.lates, counts.total());
    }

    #[test]
    fn status_counts_serialize_every_key() {
        let v = serde_json::to_value(StatusCounts::default()).expect("serialize");
        assert_eq!(v, serde_json::json!({ "PRESENT": 0, "ABSENT": 0, "LATE": 0 }));
    }

    #[test]
    fn month_bounds_cover_year_end_and_leap_february() {
        let (s, e) = month_bounds(2024, 12).expect("december");
        assert_eq!(s, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(e, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());

        let (s, e) = month_bounds(2024, 2).expect("february");
        assert_eq!((e - s).num_days(), 29);
        assert!(month_bounds(2024, 13).is_none());
        assert!(month_bounds(2024, 0).is_none());
    }

    #[test]
    fn iso_dates_reject_time_components() {
        assert_eq!(
            parse_iso_date("2024-03-01"),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert!(parse_iso_date("2024-03-01T10:00:00Z").is_none());
        assert!(parse_iso_date("2024-02-30").is_none());
    }

    #[test]
    fn iso_dates_require_the_exact_shape() {
        assert!(parse_iso_date("2024-3-1").is_none());
        assert!(parse_iso_date(" 2024-03-01 ").is_none());
        assert!(parse_iso_date("+2024-03-01").is_none());
        assert!(parse_iso_date("2024/03/01").is_none());
        assert!(parse_iso_date("").is_none());
    }

    #[test]
    fn dedupe_keeps_last_value_at_first_position() {
        let entries = vec![("a", 1), ("b", 2), ("a", 3)];
        let out = dedupe_last_wins(entries, |e| e.0);
        assert_eq!(out, vec![("a", 3), ("b", 2)]);
    }

    #[test]
    fn roll_numbers_sort_numerically_first() {
        let mut rolls = vec!["10", "B-1", "2", "A-7", "1"];
        rolls.sort_by(|a, b| cmp_roll_numbers(a, b));
        assert_eq!(rolls, vec!["1", "2", "10", "A-7", "B-1"]);
    }
}
