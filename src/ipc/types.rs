use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

use crate::import::ImportState;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    /// One import dialog at a time; replaced on every file selection.
    pub import: ImportState,
}
