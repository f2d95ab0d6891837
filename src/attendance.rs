//! Attendance sheet for one (batch, date) and the all-or-nothing bulk writer.

use crate::calc::dedupe_last_wins;
use crate::deadline::Deadline;
use crate::error::{EngineError, EngineResult};
use crate::model::{normalize_optional_text, AttendanceStatus, StudentRef};
use crate::roster;
use chrono::NaiveDate;
use rusqlite::{Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetRow {
    pub student: StudentRef,
    pub status: Option<AttendanceStatus>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BulkEntry {
    pub student: String,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkAck {
    pub ok: bool,
    pub saved: usize,
}

pub fn sheet(conn: &Connection, batch_id: &str, date: NaiveDate) -> EngineResult<Vec<SheetRow>> {
    roster::require_batch(conn, batch_id)?;
    let students = roster::roster(conn, batch_id)?;

    let mut stmt = conn.prepare(
        "SELECT a.student_id, a.status, a.remarks
         FROM attendance_records a
         JOIN students s ON s.id = a.student_id
         WHERE s.batch_id = ? AND a.date = ?",
    )?;
    let by_student: HashMap<String, (AttendanceStatus, Option<String>)> = stmt
        .query_map((batch_id, date), |r| {
            Ok((
                r.get::<_, String>(0)?,
                (r.get::<_, AttendanceStatus>(1)?, r.get::<_, Option<String>>(2)?),
            ))
        })?
        .collect::<Result<_, _>>()?;

    Ok(students
        .into_iter()
        .map(|student| {
            let (status, remarks) = match by_student.get(&student.id) {
                Some((status, remarks)) => (Some(*status), remarks.clone()),
                None => (None, None),
            };
            SheetRow {
                student,
                status,
                remarks,
            }
        })
        .collect())
}

/// Upserts one attendance session in a single IMMEDIATE transaction: the
/// whole session is stored or nothing is. Nothing commits past `deadline`.
pub fn save_bulk(
    conn: &mut Connection,
    batch_id: &str,
    date: NaiveDate,
    records: Vec<BulkEntry>,
    deadline: Deadline,
) -> EngineResult<BulkAck> {
    roster::require_batch(conn, batch_id)?;
    if records.is_empty() {
        return Err(EngineError::invalid("records must not be empty"));
    }
    let records = dedupe_last_wins(records, |e| e.student.clone());

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let members: HashSet<String> = {
        let mut stmt = tx.prepare("SELECT id FROM students WHERE batch_id = ?")?;
        let ids = stmt
            .query_map([batch_id], |r| r.get::<_, String>(0))?
            .collect::<Result<_, _>>()?;
        ids
    };
    let outsiders: Vec<&str> = records
        .iter()
        .map(|e| e.student.as_str())
        .filter(|id| !members.contains(*id))
        .collect();
    if !outsiders.is_empty() {
        return Err(EngineError::InvalidArgument(format!(
            "students not in batch {}: {}",
            batch_id,
            outsiders.join(", ")
        )));
    }

    let updated_at = chrono::Utc::now().to_rfc3339();
    {
        // The record id survives an overwrite so repeated saves are idempotent.
        let mut upsert = tx.prepare(
            "INSERT INTO attendance_records(id, student_id, batch_id, date, status, remarks, updated_at)
             VALUES(?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(student_id, date) DO UPDATE SET
               batch_id = excluded.batch_id,
               status = excluded.status,
               remarks = excluded.remarks,
               updated_at = excluded.updated_at",
        )?;
        for entry in &records {
            let remarks = normalize_optional_text(entry.remarks.clone());
            upsert.execute((
                Uuid::new_v4().to_string(),
                &entry.student,
                batch_id,
                date,
                entry.status,
                remarks,
                &updated_at,
            ))?;
        }
    }
    deadline.check()?;
    tx.commit()?;

    info!(batch = %batch_id, %date, saved = records.len(), "attendance session saved");
    Ok(BulkAck {
        ok: true,
        saved: records.len(),
    })
}
