use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use rusqlite::Connection;
use serde_json::json;

struct HandlerErr {
    code: &'static str,
    message: String,
}

impl HandlerErr {
    fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, None)
    }
}

fn db_err(e: rusqlite::Error) -> HandlerErr {
    HandlerErr {
        code: "db_query_failed",
        message: e.to_string(),
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn fees_summary(conn: &Connection) -> Result<serde_json::Value, HandlerErr> {
    // fee_received is stored as entered; non-numeric values coerce to 0
    // under SQLite numeric affinity, matching the dashboard arithmetic.
    let (count, total): (i64, f64) = conn
        .query_row(
            "SELECT COUNT(*), COALESCE(SUM(CAST(fee_received AS REAL)), 0)
             FROM fee_collections",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .map_err(db_err)?;
    let average = if count > 0 {
        round1(total / count as f64)
    } else {
        0.0
    };
    Ok(json!({
        "rowCount": count,
        "totalReceived": total,
        "averagePerCollection": average,
    }))
}

fn attendance_summary(conn: &Connection) -> Result<serde_json::Value, HandlerErr> {
    let mut present = 0i64;
    let mut absent = 0i64;
    let mut leave = 0i64;
    let mut stmt = conn
        .prepare("SELECT status, COUNT(*) FROM attendance_records GROUP BY status")
        .map_err(db_err)?;
    let rows = stmt
        .query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?)))
        .and_then(|it| it.collect::<Result<Vec<_>, _>>())
        .map_err(db_err)?;
    for (status, count) in rows {
        match status.as_str() {
            "present" => present = count,
            "absent" => absent = count,
            "leave" => leave = count,
            _ => {}
        }
    }
    let total = present + absent + leave;
    let present_percent = if total > 0 {
        round1(present as f64 * 100.0 / total as f64)
    } else {
        0.0
    };
    Ok(json!({
        "total": total,
        "present": present,
        "absent": absent,
        "leave": leave,
        "presentPercent": present_percent,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let run = match req.method.as_str() {
        "fees.summary" => fees_summary,
        "attendance.summary" => attendance_summary,
        _ => return None,
    };
    let Some(conn) = state.db.as_ref() else {
        return Some(err(&req.id, "no_workspace", "select a workspace first", None));
    };
    Some(match run(conn) {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    })
}
