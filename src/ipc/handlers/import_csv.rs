use crate::import::{
    self, FileError, ImportKind, ImportState, ParsedFile, RowRecord, PREVIEW_LIMIT,
};
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use chrono::Utc;
use rusqlite::Connection;
use serde_json::{json, Value};
use std::path::PathBuf;
use uuid::Uuid;

struct HandlerErr {
    code: &'static str,
    message: String,
    details: Option<Value>,
}

impl HandlerErr {
    fn response(self, id: &str) -> Value {
        err(id, self.code, self.message, self.details)
    }
}

fn get_required_str(params: &Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| HandlerErr {
            code: "bad_params",
            message: format!("missing {}", key),
            details: None,
        })
}

fn get_kind(params: &Value) -> Result<ImportKind, HandlerErr> {
    let raw = get_required_str(params, "kind")?;
    ImportKind::parse(&raw).ok_or_else(|| HandlerErr {
        code: "bad_params",
        message: format!("unknown kind: {}", raw),
        details: None,
    })
}

fn preview_json(parsed: &ParsedFile) -> Vec<Value> {
    parsed
        .accepted
        .iter()
        .take(PREVIEW_LIMIT)
        .map(RowRecord::preview_json)
        .collect()
}

fn parsed_result_json(parsed: &ParsedFile) -> Value {
    json!({
        "status": "parsed",
        "kind": parsed.kind.as_str(),
        "acceptedCount": parsed.accepted.len(),
        "rowErrors": &parsed.errors,
        "preview": preview_json(parsed),
        "canImport": parsed.can_import(),
    })
}

fn handle_select_file(state: &mut AppState, req: &Request) -> Value {
    let kind = match get_kind(&req.params) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    let path = match get_required_str(&req.params, "path") {
        Ok(v) => PathBuf::from(v),
        Err(e) => return e.response(&req.id),
    };

    // Every new selection discards the previous outcome, even when this
    // one is rejected before reading.
    state.import = ImportState::NoFile;
    let is_csv = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_ascii_lowercase().ends_with(".csv"))
        .unwrap_or(false);
    if !is_csv {
        return err(
            &req.id,
            "bad_extension",
            "only .csv files can be imported",
            Some(json!({ "path": path.to_string_lossy() })),
        );
    }

    let text = match std::fs::read_to_string(&path) {
        Ok(t) => t,
        Err(e) => {
            return err(
                &req.id,
                "read_failed",
                e.to_string(),
                Some(json!({ "path": path.to_string_lossy() })),
            )
        }
    };

    match import::parse_import_text(kind, &text) {
        Ok(parsed) => {
            let result = parsed_result_json(&parsed);
            state.import = ImportState::Parsed(parsed);
            ok(&req.id, result)
        }
        Err(FileError::EmptyOrInvalidFile) => err(
            &req.id,
            "empty_or_invalid_file",
            "file must have a header line and at least one data row",
            None,
        ),
        Err(FileError::MissingColumns(missing)) => {
            let details = json!({ "missingColumns": &missing });
            state.import = ImportState::HeaderRejected { kind, missing };
            err(
                &req.id,
                "missing_columns",
                "file header is missing required columns",
                Some(details),
            )
        }
    }
}

fn handle_status(state: &mut AppState, req: &Request) -> Value {
    let result = match &state.import {
        ImportState::NoFile => json!({ "status": "noFile" }),
        ImportState::HeaderRejected { kind, missing } => json!({
            "status": "headerRejected",
            "kind": kind.as_str(),
            "missingColumns": missing,
        }),
        ImportState::Parsed(parsed) => parsed_result_json(parsed),
    };
    ok(&req.id, result)
}

fn insert_record(conn: &Connection, record: &RowRecord, imported_at: &str) -> rusqlite::Result<()> {
    let id = Uuid::new_v4().to_string();
    match record {
        RowRecord::Student(r) => {
            conn.execute(
                "INSERT INTO students(id, name, roll_number, email, phone, father_name,
                                      class, section, fees, admission_date, address, imported_at)
                 VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                rusqlite::params![
                    id,
                    r.name,
                    r.roll_number,
                    r.email,
                    r.phone,
                    r.father_name,
                    r.class,
                    r.section,
                    r.fees,
                    r.admission_date,
                    r.address,
                    imported_at
                ],
            )?;
        }
        RowRecord::Attendance(r) => {
            conn.execute(
                "INSERT INTO attendance_records(id, name, roll_number, status, imported_at)
                 VALUES(?, ?, ?, ?, ?)",
                rusqlite::params![id, r.name, r.roll_number, r.status, imported_at],
            )?;
        }
        RowRecord::ExamMarks(r) => {
            conn.execute(
                "INSERT INTO exam_marks(id, name, roll_number, subject, marks, imported_at)
                 VALUES(?, ?, ?, ?, ?, ?)",
                rusqlite::params![id, r.name, r.roll_number, r.subject, r.marks, imported_at],
            )?;
        }
        RowRecord::FeeCollection(r) => {
            conn.execute(
                "INSERT INTO fee_collections(id, name, roll_number, fee_received, imported_at)
                 VALUES(?, ?, ?, ?, ?)",
                rusqlite::params![id, r.name, r.roll_number, r.fee_received, imported_at],
            )?;
        }
        RowRecord::Parent(r) => {
            conn.execute(
                "INSERT INTO parents(id, name, email, phone, imported_at)
                 VALUES(?, ?, ?, ?, ?)",
                rusqlite::params![id, r.name, r.email, r.phone, imported_at],
            )?;
        }
        RowRecord::Teacher(r) => {
            conn.execute(
                "INSERT INTO teachers(id, name, email, employee_id, salary, imported_at)
                 VALUES(?, ?, ?, ?, ?, ?)",
                rusqlite::params![id, r.name, r.email, r.employee_id, r.salary, imported_at],
            )?;
        }
    }
    Ok(())
}

fn handle_confirm(state: &mut AppState, req: &Request) -> Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let parsed = match &state.import {
        ImportState::NoFile | ImportState::HeaderRejected { .. } => {
            return err(&req.id, "no_file", "no parsed file to import", None);
        }
        ImportState::Parsed(parsed) => parsed,
    };
    // All-or-nothing: any row error blocks the whole file.
    if !parsed.can_import() {
        return err(
            &req.id,
            "import_blocked",
            "import requires at least one accepted row and zero row errors",
            Some(json!({
                "acceptedCount": parsed.accepted.len(),
                "rowErrorCount": parsed.errors.len(),
            })),
        );
    }

    let imported_at = Utc::now().to_rfc3339();
    let tx = match conn.unchecked_transaction() {
        Ok(tx) => tx,
        Err(e) => return err(&req.id, "db_tx_failed", e.to_string(), None),
    };
    for record in &parsed.accepted {
        if let Err(e) = insert_record(&tx, record, &imported_at) {
            return err(&req.id, "db_update_failed", e.to_string(), None);
        }
    }
    if let Err(e) = tx.commit() {
        return err(&req.id, "db_commit_failed", e.to_string(), None);
    }

    let kind = parsed.kind;
    let imported = parsed.accepted.len();
    // Confirm consumes the session, so a second confirm sees no_file.
    state.import = ImportState::NoFile;
    ok(
        &req.id,
        json!({ "kind": kind.as_str(), "imported": imported }),
    )
}

fn handle_cancel(state: &mut AppState, req: &Request) -> Value {
    state.import = ImportState::NoFile;
    ok(&req.id, json!({ "closed": true }))
}

fn handle_template(_state: &mut AppState, req: &Request) -> Value {
    let kind = match get_kind(&req.params) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    let out_dir = match get_required_str(&req.params, "outDir") {
        Ok(v) => PathBuf::from(v),
        Err(e) => return e.response(&req.id),
    };
    if let Err(e) = std::fs::create_dir_all(&out_dir) {
        return err(
            &req.id,
            "write_failed",
            e.to_string(),
            Some(json!({ "outDir": out_dir.to_string_lossy() })),
        );
    }
    let file_name = import::template_file_name(kind);
    let out_path = out_dir.join(&file_name);
    if let Err(e) = std::fs::write(&out_path, import::template_csv(kind)) {
        return err(
            &req.id,
            "write_failed",
            e.to_string(),
            Some(json!({ "path": out_path.to_string_lossy() })),
        );
    }
    ok(
        &req.id,
        json!({
            "fileName": file_name,
            "path": out_path.to_string_lossy(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "import.selectFile" => Some(handle_select_file(state, req)),
        "import.status" => Some(handle_status(state, req)),
        "import.confirm" => Some(handle_confirm(state, req)),
        "import.cancel" => Some(handle_cancel(state, req)),
        "import.template" => Some(handle_template(state, req)),
        _ => None,
    }
}
