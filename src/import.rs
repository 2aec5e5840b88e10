//! CSV import pipeline for school data files.
//!
//! Splitting is naive: lines on '\n', fields on literal ','. Quoted fields
//! are NOT recognized, so a comma inside a value breaks column alignment.
//! That is the file contract the templates describe; changing it would
//! change which rows are accepted.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Accepted rows shown on screen before confirm; the full set is imported.
pub const PREVIEW_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImportKind {
    Student,
    Attendance,
    ExamMarks,
    FeeCollection,
    Parent,
    Teacher,
}

pub const ALL_KINDS: [ImportKind; 6] = [
    ImportKind::Student,
    ImportKind::Attendance,
    ImportKind::ExamMarks,
    ImportKind::FeeCollection,
    ImportKind::Parent,
    ImportKind::Teacher,
];

impl ImportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ImportKind::Student => "student",
            ImportKind::Attendance => "attendance",
            ImportKind::ExamMarks => "examMarks",
            ImportKind::FeeCollection => "feeCollection",
            ImportKind::Parent => "parent",
            ImportKind::Teacher => "teacher",
        }
    }

    pub fn parse(s: &str) -> Option<ImportKind> {
        ALL_KINDS.into_iter().find(|k| k.as_str() == s)
    }

    /// Required header columns, in template order.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            ImportKind::Student => &[
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
            ],
            ImportKind::Attendance => &["name", "rollNumber", "status"],
            ImportKind::ExamMarks => &["name", "rollNumber", "subject", "marks"],
            ImportKind::FeeCollection => &["name", "rollNumber", "feeReceived"],
            ImportKind::Parent => &["name", "email", "phone"],
            ImportKind::Teacher => &["name", "email", "employeeId", "salary"],
        }
    }

    /// Illustrative rows shipped with the downloadable template. Every
    /// sample passes this kind's own validation.
    pub fn sample_rows(self) -> &'static [&'static [&'static str]] {
        match self {
            ImportKind::Student => &[
                &[
                    "John Doe",
                    "STU001",
                    "john@example.com",
                    "9876543210",
                    "Robert Doe",
                    "Class 5",
                    "A",
                    "5000",
                    "2024-01-15",
                    "12 Main Street",
                ],
                &[
                    "Jane Smith",
                    "STU002",
                    "jane@example.com",
                    "9876543211",
                    "Alan Smith",
                    "Class 5",
                    "B",
                    "5000",
                    "2024-01-20",
                    "34 Park Road",
                ],
            ],
            ImportKind::Attendance => &[
                &["John Doe", "STU001", "present"],
                &["Jane Smith", "STU002", "absent"],
            ],
            ImportKind::ExamMarks => &[
                &["John Doe", "STU001", "Mathematics", "85"],
                &["Jane Smith", "STU002", "Mathematics", "92"],
            ],
            ImportKind::FeeCollection => &[
                &["John Doe", "STU001", "5000"],
                &["Jane Smith", "STU002", "4500"],
            ],
            ImportKind::Parent => &[&["Robert Doe", "robert@example.com", "9876543200"]],
            ImportKind::Teacher => &[&[
                "Mary Major",
                "mary@example.com",
                "EMP001",
                "42000",
            ]],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRow {
    pub name: String,
    pub roll_number: String,
    pub email: String,
    pub phone: String,
    pub father_name: String,
    pub class: String,
    pub section: String,
    pub fees: String,
    pub admission_date: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRow {
    pub name: String,
    pub roll_number: String,
    /// Normalized to lowercase: present | absent | leave.
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamMarksRow {
    pub name: String,
    pub roll_number: String,
    pub subject: String,
    pub marks: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeCollectionRow {
    pub name: String,
    pub roll_number: String,
    pub fee_received: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentRow {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherRow {
    pub name: String,
    pub email: String,
    pub employee_id: String,
    pub salary: String,
}

/// One validated data row. Typed per kind so downstream writers get
/// field-name checking instead of a string map.
#[derive(Debug, Clone)]
pub enum RowRecord {
    Student(StudentRow),
    Attendance(AttendanceRow),
    ExamMarks(ExamMarksRow),
    FeeCollection(FeeCollectionRow),
    Parent(ParentRow),
    Teacher(TeacherRow),
}

impl RowRecord {
    pub fn preview_json(&self) -> serde_json::Value {
        match self {
            RowRecord::Student(r) => serde_json::to_value(r),
            RowRecord::Attendance(r) => serde_json::to_value(r),
            RowRecord::ExamMarks(r) => serde_json::to_value(r),
            RowRecord::FeeCollection(r) => serde_json::to_value(r),
            RowRecord::Parent(r) => serde_json::to_value(r),
            RowRecord::Teacher(r) => serde_json::to_value(r),
        }
        .unwrap_or(serde_json::Value::Null)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    /// 1-indexed over the non-blank data lines (file line 2 = row 1).
    pub row: usize,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub kind: ImportKind,
    pub accepted: Vec<RowRecord>,
    pub errors: Vec<RowError>,
}

impl ParsedFile {
    /// All-or-nothing import gate: at least one good row and no bad ones.
    pub fn can_import(&self) -> bool {
        !self.accepted.is_empty() && self.errors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileError {
    /// Fewer than two non-blank lines (header + at least one data row).
    EmptyOrInvalidFile,
    /// Required template columns absent from the header line.
    MissingColumns(Vec<String>),
}

/// Per-dialog session. Replaced wholesale on every new file selection.
#[derive(Debug, Default)]
pub enum ImportState {
    #[default]
    NoFile,
    HeaderRejected {
        kind: ImportKind,
        missing: Vec<String>,
    },
    Parsed(ParsedFile),
}

/// Runs the whole pipeline on the raw file text: header check, positional
/// field assignment, per-row validation. Rows that pass land in `accepted`
/// even when sibling rows fail.
pub fn parse_import_text(kind: ImportKind, text: &str) -> Result<ParsedFile, FileError> {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();
    if lines.len() < 2 {
        return Err(FileError::EmptyOrInvalidFile);
    }

    let header: Vec<String> = lines[0]
        .split(',')
        .map(|f| f.trim().to_string())
        .collect();
    let missing: Vec<String> = kind
        .columns()
        .iter()
        .filter(|c| !header.iter().any(|h| h == *c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(FileError::MissingColumns(missing));
    }

    let mut col_index = HashMap::<&str, usize>::new();
    for (i, h) in header.iter().enumerate() {
        col_index.insert(h.as_str(), i);
    }

    let mut accepted = Vec::new();
    let mut errors = Vec::new();
    for (row_no, line) in lines[1..].iter().enumerate() {
        // Short lines pad missing trailing fields with "" through field().
        let fields: Vec<String> = line.split(',').map(|f| f.trim().to_string()).collect();
        match validate_row(kind, &col_index, &fields) {
            Ok(record) => accepted.push(record),
            Err(message) => errors.push(RowError {
                row: row_no + 1,
                message,
            }),
        }
    }

    Ok(ParsedFile {
        kind,
        accepted,
        errors,
    })
}

fn field(col_index: &HashMap<&str, usize>, fields: &[String], column: &str) -> String {
    col_index
        .get(column)
        .and_then(|i| fields.get(*i))
        .cloned()
        .unwrap_or_default()
}

fn require_non_empty(
    col_index: &HashMap<&str, usize>,
    fields: &[String],
    column: &str,
) -> Result<String, String> {
    let v = field(col_index, fields, column);
    if v.is_empty() {
        Err(format!("{} is required", column))
    } else {
        Ok(v)
    }
}

fn validate_row(
    kind: ImportKind,
    col_index: &HashMap<&str, usize>,
    fields: &[String],
) -> Result<RowRecord, String> {
    match kind {
        ImportKind::Student => {
            let name = require_non_empty(col_index, fields, "name")?;
            let roll_number = require_non_empty(col_index, fields, "rollNumber")?;
            Ok(RowRecord::Student(StudentRow {
                name,
                roll_number,
                email: field(col_index, fields, "email"),
                phone: field(col_index, fields, "phone"),
                father_name: field(col_index, fields, "fatherName"),
                class: field(col_index, fields, "class"),
                section: field(col_index, fields, "section"),
                fees: field(col_index, fields, "fees"),
                admission_date: field(col_index, fields, "admissionDate"),
                address: field(col_index, fields, "address"),
            }))
        }
        ImportKind::Attendance => {
            let name = require_non_empty(col_index, fields, "name")?;
            let roll_number = require_non_empty(col_index, fields, "rollNumber")?;
            let raw_status = require_non_empty(col_index, fields, "status")?;
            let status = raw_status.to_ascii_lowercase();
            if !matches!(status.as_str(), "present" | "absent" | "leave") {
                return Err(format!(
                    "invalid status \"{}\" (expected present, absent, or leave)",
                    raw_status
                ));
            }
            Ok(RowRecord::Attendance(AttendanceRow {
                name,
                roll_number,
                status,
            }))
        }
        ImportKind::ExamMarks => {
            let roll_number = require_non_empty(col_index, fields, "rollNumber")?;
            let subject = require_non_empty(col_index, fields, "subject")?;
            let marks_raw = require_non_empty(col_index, fields, "marks")?;
            let marks = marks_raw
                .parse::<f64>()
                .map_err(|_| format!("marks \"{}\" must be a number", marks_raw))?;
            Ok(RowRecord::ExamMarks(ExamMarksRow {
                name: field(col_index, fields, "name"),
                roll_number,
                subject,
                marks,
            }))
        }
        ImportKind::FeeCollection => {
            let roll_number = require_non_empty(col_index, fields, "rollNumber")?;
            let fee_received = require_non_empty(col_index, fields, "feeReceived")?;
            Ok(RowRecord::FeeCollection(FeeCollectionRow {
                name: field(col_index, fields, "name"),
                roll_number,
                fee_received,
            }))
        }
        ImportKind::Parent => {
            let name = require_non_empty(col_index, fields, "name")?;
            let email = require_non_empty(col_index, fields, "email")?;
            let phone = require_non_empty(col_index, fields, "phone")?;
            Ok(RowRecord::Parent(ParentRow { name, email, phone }))
        }
        ImportKind::Teacher => {
            let name = require_non_empty(col_index, fields, "name")?;
            let email = require_non_empty(col_index, fields, "email")?;
            let employee_id = require_non_empty(col_index, fields, "employeeId")?;
            let salary = require_non_empty(col_index, fields, "salary")?;
            Ok(RowRecord::Teacher(TeacherRow {
                name,
                email,
                employee_id,
                salary,
            }))
        }
    }
}

pub fn template_file_name(kind: ImportKind) -> String {
    format!("{}_template.csv", kind.as_str())
}

/// Header line plus sample rows, comma-joined. Pure formatting.
pub fn template_csv(kind: ImportKind) -> String {
    let mut out = kind.columns().join(",");
    out.push('\n');
    for sample in kind.sample_rows() {
        out.push_str(&sample.join(","));
        out.push('\n');
    }
    out
}
