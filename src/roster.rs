//! Batches and the students that belong to them.

use crate::calc::cmp_roll_numbers;
use crate::error::{is_unique_violation, EngineError, EngineResult};
use crate::model::{normalize_optional_text, Batch, BatchRef, Student, StudentRef};
use rusqlite::{Connection, OptionalExtension};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct NewBatch {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub roll_number: String,
    #[serde(default)]
    pub batch: String,
    #[serde(default)]
    pub contact_number: Option<String>,
}

pub fn find_batch(conn: &Connection, batch_id: &str) -> EngineResult<Option<BatchRef>> {
    let row = conn
        .query_row(
            "SELECT id, name FROM batches WHERE id = ?",
            [batch_id],
            |r| {
                Ok(BatchRef {
                    id: r.get(0)?,
                    name: r.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}

pub fn require_batch(conn: &Connection, batch_id: &str) -> EngineResult<BatchRef> {
    find_batch(conn, batch_id)?.ok_or_else(|| EngineError::not_found("batch", batch_id))
}

pub fn list_batches(conn: &Connection) -> EngineResult<Vec<Batch>> {
    // Correlated subquery so batches without students still report 0.
    let mut stmt = conn.prepare(
        "SELECT
           b.id,
           b.name,
           (SELECT COUNT(*) FROM students s WHERE s.batch_id = b.id) AS student_count
         FROM batches b
         ORDER BY b.name, b.id",
    )?;
    let batches = stmt
        .query_map([], |r| {
            Ok(Batch {
                id: r.get(0)?,
                name: r.get(1)?,
                student_count: Some(r.get(2)?),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(batches)
}

pub fn create_batch(conn: &Connection, input: NewBatch) -> EngineResult<Batch> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(EngineError::invalid("name must not be empty"));
    }
    let id = Uuid::new_v4().to_string();
    conn.execute("INSERT INTO batches(id, name) VALUES(?, ?)", (&id, &name))?;
    info!(batch = %id, name = %name, "batch created");
    Ok(Batch {
        id,
        name,
        student_count: None,
    })
}

fn sort_students(students: &mut [Student]) {
    students.sort_by(|a, b| {
        a.batch
            .name
            .cmp(&b.batch.name)
            .then_with(|| a.batch.id.cmp(&b.batch.id))
            .then_with(|| cmp_roll_numbers(&a.roll_number, &b.roll_number))
            .then_with(|| a.name.cmp(&b.name))
    });
}

pub fn list_students(conn: &Connection, batch_id: Option<&str>) -> EngineResult<Vec<Student>> {
    if let Some(id) = batch_id {
        require_batch(conn, id)?;
    }
    let mut stmt = conn.prepare(
        "SELECT s.id, s.name, s.roll_number, s.contact_number, b.id, b.name
         FROM students s
         JOIN batches b ON b.id = s.batch_id
         WHERE (?1 IS NULL OR s.batch_id = ?1)",
    )?;
    let mut students = stmt
        .query_map([batch_id], |r| {
            Ok(Student {
                id: r.get(0)?,
                name: r.get(1)?,
                roll_number: r.get(2)?,
                contact_number: r.get(3)?,
                batch: BatchRef {
                    id: r.get(4)?,
                    name: r.get(5)?,
                },
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    sort_students(&mut students);
    Ok(students)
}

pub fn roster(conn: &Connection, batch_id: &str) -> EngineResult<Vec<StudentRef>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, roll_number FROM students WHERE batch_id = ?",
    )?;
    let mut students = stmt
        .query_map([batch_id], |r| {
            Ok(StudentRef {
                id: r.get(0)?,
                name: r.get(1)?,
                roll_number: r.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    students.sort_by(|a, b| {
        cmp_roll_numbers(&a.roll_number, &b.roll_number).then_with(|| a.name.cmp(&b.name))
    });
    Ok(students)
}

pub fn create_student(conn: &Connection, input: NewStudent) -> EngineResult<Student> {
    let name = input.name.trim().to_string();
    let roll_number = input.roll_number.trim().to_string();
    let batch_id = input.batch.trim().to_string();
    if name.is_empty() {
        return Err(EngineError::invalid("name must not be empty"));
    }
    if roll_number.is_empty() {
        return Err(EngineError::invalid("rollNumber must not be empty"));
    }
    if batch_id.is_empty() {
        return Err(EngineError::invalid("batch is required"));
    }
    let batch = require_batch(conn, &batch_id)?;
    let contact_number = normalize_optional_text(input.contact_number);

    let id = Uuid::new_v4().to_string();
    let created_at = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO students(id, batch_id, name, roll_number, contact_number, created_at)
         VALUES(?, ?, ?, ?, ?, ?)",
        (&id, &batch.id, &name, &roll_number, &contact_number, &created_at),
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            EngineError::Conflict(format!(
                "roll number {} already exists in batch {}",
                roll_number, batch.name
            ))
        } else {
            EngineError::from(e)
        }
    })?;
    info!(student = %id, batch = %batch.id, roll = %roll_number, "student created");

    Ok(Student {
        id,
        name,
        roll_number,
        contact_number,
        batch,
    })
}
