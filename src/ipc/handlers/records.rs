use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use rusqlite::Connection;
use serde_json::{json, Value};

fn query_rows(
    conn: &Connection,
    sql: &str,
    columns: &[&str],
) -> Result<Vec<Value>, rusqlite::Error> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], |r| {
        let mut obj = serde_json::Map::new();
        for (i, col) in columns.iter().enumerate() {
            // marks is the only non-TEXT column across these tables.
            let v = if *col == "marks" {
                Value::from(r.get::<_, f64>(i)?)
            } else {
                Value::from(r.get::<_, Option<String>>(i)?)
            };
            obj.insert(col.to_string(), v);
        }
        Ok(Value::Object(obj))
    })?;
    rows.collect()
}

fn listing(method: &str) -> Option<(&'static str, &'static [&'static str])> {
    match method {
        "students.list" => Some((
            "SELECT id, name, roll_number, email, phone, father_name, class, section,
                    fees, admission_date, address, imported_at
             FROM students ORDER BY rowid",
            &[
                "id",
                "name",
                "rollNumber",
                "email",
                "phone",
                "fatherName",
                "class",
                "section",
                "fees",
                "admissionDate",
                "address",
                "importedAt",
            ],
        )),
        "attendance.list" => Some((
            "SELECT id, name, roll_number, status, imported_at
             FROM attendance_records ORDER BY rowid",
            &["id", "name", "rollNumber", "status", "importedAt"],
        )),
        "examMarks.list" => Some((
            "SELECT id, name, roll_number, subject, marks, imported_at
             FROM exam_marks ORDER BY rowid",
            &["id", "name", "rollNumber", "subject", "marks", "importedAt"],
        )),
        "feeCollections.list" => Some((
            "SELECT id, name, roll_number, fee_received, imported_at
             FROM fee_collections ORDER BY rowid",
            &["id", "name", "rollNumber", "feeReceived", "importedAt"],
        )),
        "parents.list" => Some((
            "SELECT id, name, email, phone, imported_at FROM parents ORDER BY rowid",
            &["id", "name", "email", "phone", "importedAt"],
        )),
        "teachers.list" => Some((
            "SELECT id, name, email, employee_id, salary, imported_at
             FROM teachers ORDER BY rowid",
            &["id", "name", "email", "employeeId", "salary", "importedAt"],
        )),
        _ => None,
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let (sql, columns) = listing(req.method.as_str())?;
    let Some(conn) = state.db.as_ref() else {
        return Some(err(&req.id, "no_workspace", "select a workspace first", None));
    };
    Some(match query_rows(conn, sql, columns) {
        Ok(rows) => ok(&req.id, json!({ "rows": rows })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    })
}
