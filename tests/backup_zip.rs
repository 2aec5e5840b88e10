// backup.rs resolves the database file name through crate::db, so both
// modules are compiled into this test crate.
#[allow(dead_code)]
#[path = "../src/db.rs"]
mod db;
#[path = "../src/backup.rs"]
mod backup;

use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

#[test]
fn zip_export_and_import_roundtrip() {
    let workspace = temp_dir("campusd-backup-src");
    let workspace2 = temp_dir("campusd-backup-dst");
    let out_dir = temp_dir("campusd-backup-out");

    let db_src = workspace.join("campus.sqlite3");
    let bytes = b"sqlite-test-payload";
    std::fs::write(&db_src, bytes).expect("write source db");

    let bundle_path = out_dir.join("workspace.campusbackup.zip");
    let export = backup::export_workspace_bundle(&workspace, &bundle_path).expect("export bundle");
    assert_eq!(export.bundle_format, backup::BUNDLE_FORMAT_V1);
    assert_eq!(export.db_sha256.len(), 64);

    let f = File::open(&bundle_path).expect("open bundle");
    let mut archive = zip::ZipArchive::new(f).expect("open zip archive");
    let mut manifest = String::new();
    archive
        .by_name("manifest.json")
        .expect("manifest entry")
        .read_to_string(&mut manifest)
        .expect("read manifest");
    assert!(manifest.contains(backup::BUNDLE_FORMAT_V1));
    assert!(manifest.contains(&export.db_sha256));
    archive
        .by_name("db/campus.sqlite3")
        .expect("database entry in bundle");

    let import = backup::import_workspace_bundle(&bundle_path, &workspace2).expect("import bundle");
    assert_eq!(import.bundle_format_detected, backup::BUNDLE_FORMAT_V1);

    let restored = std::fs::read(workspace2.join("campus.sqlite3")).expect("read restored db");
    assert_eq!(restored, bytes);

    let _ = std::fs::remove_dir_all(workspace);
    let _ = std::fs::remove_dir_all(workspace2);
    let _ = std::fs::remove_dir_all(out_dir);
}

#[test]
fn legacy_sqlite_import_is_supported() {
    let out_dir = temp_dir("campusd-backup-legacy");
    let workspace = temp_dir("campusd-backup-legacy-dst");

    let legacy_file = out_dir.join("legacy.sqlite3");
    let bytes = b"legacy-sqlite-copy";
    std::fs::write(&legacy_file, bytes).expect("write legacy sqlite file");

    let import =
        backup::import_workspace_bundle(&legacy_file, &workspace).expect("import legacy sqlite");
    assert_eq!(import.bundle_format_detected, "legacy-sqlite3");

    let restored = std::fs::read(workspace.join("campus.sqlite3")).expect("read restored sqlite");
    assert_eq!(restored, bytes);

    let _ = std::fs::remove_dir_all(out_dir);
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn corrupted_database_entry_fails_the_checksum() {
    let out_dir = temp_dir("campusd-backup-tampered");
    let workspace = temp_dir("campusd-backup-tampered-dst");

    let bundle_path = out_dir.join("tampered.zip");
    let out_file = File::create(&bundle_path).expect("create bundle");
    let mut zip = zip::ZipWriter::new(out_file);
    let opts = zip::write::FileOptions::default();
    zip.start_file("manifest.json", opts).expect("start manifest");
    zip.write_all(
        format!(
            "{{\"format\":\"{}\",\"version\":1,\"dbSha256\":\"{}\"}}",
            backup::BUNDLE_FORMAT_V1,
            "0".repeat(64)
        )
        .as_bytes(),
    )
    .expect("write manifest");
    zip.start_file("db/campus.sqlite3", opts).expect("start db");
    zip.write_all(b"not-the-promised-bytes").expect("write db");
    zip.finish().expect("finish zip");

    let err = backup::import_workspace_bundle(&bundle_path, &workspace)
        .expect_err("tampered bundle must fail");
    let mismatch = err
        .downcast_ref::<backup::ChecksumMismatch>()
        .expect("typed checksum error");
    assert_eq!(mismatch.expected, "0".repeat(64));
    assert!(!workspace.join("campus.sqlite3").exists());

    let _ = std::fs::remove_dir_all(out_dir);
    let _ = std::fs::remove_dir_all(workspace);
}
