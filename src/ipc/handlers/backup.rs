use crate::backup;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::{json, Value};
use std::path::PathBuf;

struct HandlerErr {
    code: &'static str,
    message: String,
}

impl HandlerErr {
    fn response(self, id: &str) -> Value {
        err(id, self.code, self.message, None)
    }
}

fn get_required_path(params: &Value, key: &str) -> Result<PathBuf, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| HandlerErr {
            code: "bad_params",
            message: format!("missing {}", key),
        })
}

fn handle_export(state: &mut AppState, req: &Request) -> Value {
    let Some(workspace) = state.workspace.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let out_path = match get_required_path(&req.params, "outPath") {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    match backup::export_workspace_bundle(workspace, &out_path) {
        Ok(summary) => ok(
            &req.id,
            json!({
                "bundleFormat": summary.bundle_format,
                "dbSha256": summary.db_sha256,
                "outPath": out_path.to_string_lossy(),
            }),
        ),
        Err(e) => err(&req.id, "export_failed", format!("{e:#}"), None),
    }
}

fn handle_import(state: &mut AppState, req: &Request) -> Value {
    let in_path = match get_required_path(&req.params, "inPath") {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    let workspace_path = match get_required_path(&req.params, "workspacePath") {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    // Restoring over the currently open workspace would race the live
    // connection; drop it and let the caller re-select afterwards.
    if state.workspace.as_deref() == Some(workspace_path.as_path()) {
        state.db = None;
        state.workspace = None;
        state.import = crate::import::ImportState::NoFile;
    }
    match backup::import_workspace_bundle(&in_path, &workspace_path) {
        Ok(summary) => ok(
            &req.id,
            json!({
                "bundleFormatDetected": summary.bundle_format_detected,
                "workspacePath": workspace_path.to_string_lossy(),
            }),
        ),
        Err(e) => {
            let code = if e.downcast_ref::<backup::ChecksumMismatch>().is_some() {
                "checksum_mismatch"
            } else {
                "restore_failed"
            };
            err(&req.id, code, format!("{e:#}"), None)
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "backup.export" => Some(handle_export(state, req)),
        "backup.import" => Some(handle_import(state, req)),
        _ => None,
    }
}
