
use serde_json::json;
use std::io::Write;
use test_support::{request_err, request_ok, spawn_sidecar, temp_dir};

#[test]
fn exported_bundle_restores_into_a_fresh_workspace() {
    let workspace = temp_dir("campusd-backup-ipc-src");
    let restored = temp_dir("campusd-backup-ipc-dst");
    let out_dir = temp_dir("campusd-backup-ipc-out");
    let file = workspace.join("teachers.csv");
    std::fs::write(
        &file,
        "name,email,employeeId,salary\nMary Major,mary@example.com,EMP001,42000\n",
    )
    .expect("write csv");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "import.selectFile",
        json!({ "kind": "teacher", "path": file.to_string_lossy() }),
    );
    let _ = request_ok(&mut stdin, &mut reader, "3", "import.confirm", json!({}));

    let bundle = out_dir.join("school.campusbackup.zip");
    let export = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "backup.export",
        json!({ "outPath": bundle.to_string_lossy() }),
    );
    assert_eq!(export["bundleFormat"].as_str(), Some("campus-workspace-v1"));
    assert_eq!(export["dbSha256"].as_str().map(|s| s.len()), Some(64));

    let restore = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "backup.import",
        json!({
            "inPath": bundle.to_string_lossy(),
            "workspacePath": restored.to_string_lossy(),
        }),
    );
    assert_eq!(
        restore["bundleFormatDetected"].as_str(),
        Some("campus-workspace-v1")
    );

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "workspace.select",
        json!({ "path": restored.to_string_lossy() }),
    );
    let listing = request_ok(&mut stdin, &mut reader, "7", "teachers.list", json!({}));
    let rows = listing["rows"].as_array().expect("rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["employeeId"].as_str(), Some("EMP001"));

    let _ = std::fs::remove_dir_all(workspace);
    let _ = std::fs::remove_dir_all(restored);
    let _ = std::fs::remove_dir_all(out_dir);
}

#[test]
fn tampered_bundle_reports_checksum_mismatch_code() {
    let out_dir = temp_dir("campusd-backup-ipc-tampered");
    let restored = temp_dir("campusd-backup-ipc-tampered-dst");

    // Bundle whose manifest promises a digest the database entry cannot match.
    let bundle_path = out_dir.join("tampered.zip");
    let out_file = std::fs::File::create(&bundle_path).expect("create bundle");
    let mut zip = zip::ZipWriter::new(out_file);
    let opts = zip::write::FileOptions::default();
    zip.start_file("manifest.json", opts).expect("start manifest");
    zip.write_all(
        format!(
            "{{\"format\":\"campus-workspace-v1\",\"version\":1,\"dbSha256\":\"{}\"}}",
            "0".repeat(64)
        )
        .as_bytes(),
    )
    .expect("write manifest");
    zip.start_file("db/campus.sqlite3", opts).expect("start db");
    zip.write_all(b"not-the-promised-bytes").expect("write db");
    zip.finish().expect("finish zip");

    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let error = request_err(
        &mut stdin,
        &mut reader,
        "1",
        "backup.import",
        json!({
            "inPath": bundle_path.to_string_lossy(),
            "workspacePath": restored.to_string_lossy(),
        }),
        "checksum_mismatch",
    );
    assert!(
        error["message"]
            .as_str()
            .unwrap_or("")
            .contains("checksum mismatch"),
        "{error}"
    );
    assert!(!restored.join("campus.sqlite3").exists());

    let _ = std::fs::remove_dir_all(out_dir);
    let _ = std::fs::remove_dir_all(restored);
}
