use rusqlite::Connection;
use std::path::Path;

pub const DB_FILE_NAME: &str = "campus.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE_NAME);
    let conn = Connection::open(db_path)?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS students(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            roll_number TEXT NOT NULL,
            email TEXT,
            phone TEXT,
            father_name TEXT,
            class TEXT,
            section TEXT,
            fees TEXT,
            admission_date TEXT,
            address TEXT,
            imported_at TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_students_roll ON students(roll_number)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS attendance_records(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            roll_number TEXT NOT NULL,
            status TEXT NOT NULL,
            imported_at TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_attendance_roll ON attendance_records(roll_number)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS exam_marks(
            id TEXT PRIMARY KEY,
            name TEXT,
            roll_number TEXT NOT NULL,
            subject TEXT NOT NULL,
            marks REAL NOT NULL,
            imported_at TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_exam_marks_roll ON exam_marks(roll_number)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS fee_collections(
            id TEXT PRIMARY KEY,
            name TEXT,
            roll_number TEXT NOT NULL,
            fee_received TEXT NOT NULL,
            imported_at TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_fee_collections_roll ON fee_collections(roll_number)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS parents(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT NOT NULL,
            imported_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS teachers(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            employee_id TEXT NOT NULL,
            salary TEXT NOT NULL,
            imported_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(conn)
}
