
use serde_json::json;
use test_support::{request_ok, spawn_sidecar, temp_dir};

fn import_file(
    stdin: &mut std::process::ChildStdin,
    reader: &mut std::io::BufReader<std::process::ChildStdout>,
    id_prefix: &str,
    kind: &str,
    path: &std::path::Path,
) {
    let result = request_ok(
        stdin,
        reader,
        &format!("{id_prefix}-select"),
        "import.selectFile",
        json!({ "kind": kind, "path": path.to_string_lossy() }),
    );
    assert_eq!(result["canImport"].as_bool(), Some(true), "{result}");
    let _ = request_ok(
        stdin,
        reader,
        &format!("{id_prefix}-confirm"),
        "import.confirm",
        json!({}),
    );
}

#[test]
fn attendance_summary_counts_statuses_and_present_percent() {
    let workspace = temp_dir("campusd-summary-attendance");
    let file = workspace.join("attendance.csv");
    std::fs::write(
        &file,
        "name,rollNumber,status\nA,S1,present\nB,S2,present\nC,S3,Present\nD,S4,absent\nE,S5,leave\n",
    )
    .expect("write file");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    import_file(&mut stdin, &mut reader, "2", "attendance", &file);

    let summary = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "attendance.summary",
        json!({}),
    );
    assert_eq!(summary["total"].as_i64(), Some(5));
    assert_eq!(summary["present"].as_i64(), Some(3));
    assert_eq!(summary["absent"].as_i64(), Some(1));
    assert_eq!(summary["leave"].as_i64(), Some(1));
    assert_eq!(summary["presentPercent"].as_f64(), Some(60.0));

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn fees_summary_totals_and_averages_collections() {
    let workspace = temp_dir("campusd-summary-fees");
    let file = workspace.join("fees.csv");
    std::fs::write(
        &file,
        "name,rollNumber,feeReceived\nA,S1,5000\nB,S2,4500\nC,S3,500\n",
    )
    .expect("write file");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    import_file(&mut stdin, &mut reader, "2", "feeCollection", &file);

    let summary = request_ok(&mut stdin, &mut reader, "3", "fees.summary", json!({}));
    assert_eq!(summary["rowCount"].as_i64(), Some(3));
    assert_eq!(summary["totalReceived"].as_f64(), Some(10000.0));
    assert_eq!(summary["averagePerCollection"].as_f64(), Some(3333.3));

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn summaries_are_zero_on_a_fresh_workspace() {
    let workspace = temp_dir("campusd-summary-empty");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let fees = request_ok(&mut stdin, &mut reader, "2", "fees.summary", json!({}));
    assert_eq!(fees["rowCount"].as_i64(), Some(0));
    assert_eq!(fees["totalReceived"].as_f64(), Some(0.0));

    let attendance = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "attendance.summary",
        json!({}),
    );
    assert_eq!(attendance["total"].as_i64(), Some(0));
    assert_eq!(attendance["presentPercent"].as_f64(), Some(0.0));

    let _ = std::fs::remove_dir_all(workspace);
}
