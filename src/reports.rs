//! Read-only reporting over attendance records: per-student report, batch
//! summary for a date, monthly defaulter scan and the dashboard overview.

use crate::calc::{self, AttendanceStats, StatusCounts};
use crate::error::{EngineError, EngineResult};
use crate::model::{AttendanceRecord, AttendanceStatus, StudentRef};
use crate::roster;
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn validate(&self) -> EngineResult<()> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(EngineError::invalid("from must not be after to"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentReport {
    pub stats: AttendanceStats,
    pub history: Vec<AttendanceRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefaulterEntry {
    pub student: StudentRef,
    pub percentage: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefaulterQuery {
    pub month: u32,
    pub year: i32,
    pub threshold: f64,
}

impl DefaulterQuery {
    pub fn validate(&self) -> EngineResult<(NaiveDate, NaiveDate)> {
        if !(1..=12).contains(&self.month) {
            return Err(EngineError::invalid("month must be between 1 and 12"));
        }
        if !(1000..=9999).contains(&self.year) {
            return Err(EngineError::invalid("year must be a four-digit year"));
        }
        if !self.threshold.is_finite() || !(0.0..=100.0).contains(&self.threshold) {
            return Err(EngineError::invalid("threshold must be between 0 and 100"));
        }
        calc::month_bounds(self.year, self.month)
            .ok_or_else(|| EngineError::invalid("month is out of range"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub date: NaiveDate,
    pub overall_percentage: u32,
    pub present_today: u32,
    pub active_batches: u32,
    pub total_students: u32,
}

pub fn student_report(
    conn: &Connection,
    student_id: &str,
    range: DateRange,
) -> EngineResult<StudentReport> {
    range.validate()?;
    let exists = conn
        .query_row("SELECT 1 FROM students WHERE id = ?", [student_id], |r| {
            r.get::<_, i64>(0)
        })
        .optional()?
        .is_some();
    if !exists {
        return Err(EngineError::not_found("student", student_id));
    }

    let mut stmt = conn.prepare(
        "SELECT id, student_id, batch_id, date, status, remarks
         FROM attendance_records
         WHERE student_id = ?1
           AND (?2 IS NULL OR date >= ?2)
           AND (?3 IS NULL OR date <= ?3)
         ORDER BY date DESC",
    )?;
    let history = stmt
        .query_map((student_id, range.from, range.to), |r| {
            Ok(AttendanceRecord {
                id: r.get(0)?,
                student: r.get(1)?,
                batch: r.get(2)?,
                date: r.get(3)?,
                status: r.get(4)?,
                remarks: r.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let stats = calc::tally(history.iter().map(|rec| rec.status)).stats();
    debug!(student = %student_id, sessions = history.len(), percentage = stats.percentage, "student report");
    Ok(StudentReport { stats, history })
}

fn counts_by_status<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> EngineResult<StatusCounts> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, |r| {
            Ok((r.get::<_, AttendanceStatus>(0)?, r.get::<_, i64>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    let mut counts = StatusCounts::default();
    for (status, n) in rows {
        counts.add(status, n as u32);
    }
    Ok(counts)
}

pub fn batch_summary(conn: &Connection, batch_id: &str, date: NaiveDate) -> EngineResult<StatusCounts> {
    roster::require_batch(conn, batch_id)?;
    counts_by_status(
        conn,
        "SELECT status, COUNT(*)
         FROM attendance_records
         WHERE batch_id = ? AND date = ?
         GROUP BY status",
        (batch_id, date),
    )
}

/// Students of the batch whose attendance for the month is strictly below
/// the threshold. Students without records in the month count as 0%.
pub fn defaulters(
    conn: &Connection,
    batch_id: &str,
    query: DefaulterQuery,
) -> EngineResult<Vec<DefaulterEntry>> {
    let (start, end) = query.validate()?;
    roster::require_batch(conn, batch_id)?;
    let students = roster::roster(conn, batch_id)?;

    let mut stmt = conn.prepare(
        "SELECT a.student_id, a.status, COUNT(*)
         FROM attendance_records a
         JOIN students s ON s.id = a.student_id
         WHERE s.batch_id = ? AND a.date >= ? AND a.date < ?
         GROUP BY a.student_id, a.status",
    )?;
    let rows = stmt
        .query_map((batch_id, start, end), |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, AttendanceStatus>(1)?,
                r.get::<_, i64>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    let mut by_student: HashMap<String, StatusCounts> = HashMap::new();
    for (student_id, status, n) in rows {
        by_student
            .entry(student_id)
            .or_default()
            .add(status, n as u32);
    }

    let out: Vec<DefaulterEntry> = students
        .into_iter()
        .map(|student| {
            let percentage = by_student
                .get(&student.id)
                .map(|c| c.stats().percentage)
                .unwrap_or(0);
            DefaulterEntry {
                student,
                percentage,
            }
        })
        .filter(|e| f64::from(e.percentage) < query.threshold)
        .collect();
    debug!(batch = %batch_id, month = query.month, year = query.year, defaulters = out.len(), "defaulter scan");
    Ok(out)
}

pub fn overview(conn: &Connection, date: NaiveDate) -> EngineResult<Overview> {
    let overall = counts_by_status(
        conn,
        "SELECT status, COUNT(*) FROM attendance_records GROUP BY status",
        [],
    )?;
    let today = counts_by_status(
        conn,
        "SELECT status, COUNT(*) FROM attendance_records WHERE date = ? GROUP BY status",
        [date],
    )?;
    let (active_batches, total_students): (i64, i64) = conn.query_row(
        "SELECT COUNT(DISTINCT batch_id), COUNT(*) FROM students",
        [],
        |r| Ok((r.get(0)?, r.get(1)?)),
    )?;
    Ok(Overview {
        date,
        overall_percentage: overall.stats().percentage,
        present_today: today.present,
        active_batches: active_batches as u32,
        total_students: total_students as u32,
    })
}
