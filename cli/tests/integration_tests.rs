use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Scratch directory with a config.json pointing `Default` at a file database.
fn workspace() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let db_path = dir.path().join("app.db");
    let config = serde_json::json!({
        "ConnectionSetting": {
            "Default": format!("sqlite:///{}", db_path.display()),
            "Scratch": "sqlite://"
        }
    });
    let config_path = dir.path().join("config.json");
    fs::write(&config_path, config.to_string()).expect("failed to write config");
    (dir, config_path)
}

fn run(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_recordsql"))
        .arg("--config")
        .arg(config)
        .args(args)
        .output()
        .expect("failed to run recordsql")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn create_users(config: &Path) {
    let output = run(
        config,
        &[
            "exec",
            "--sql",
            "CREATE TABLE Users (Id INTEGER PRIMARY KEY, Name TEXT, Age INTEGER)",
        ],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

#[test]
fn insert_then_select_prints_json_rows() {
    let (_dir, config) = workspace();
    create_users(&config);

    let output = run(
        &config,
        &["insert", "--table", "Users", "--set", "Id=1", "--set", "Name=O'Brien", "--set", "Age=30"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "1 row(s) affected.");

    let output = run(&config, &["select", "--table", "Users", "--where", "Age=30"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let rows: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(
        rows,
        serde_json::json!([{ "Id": 1, "Name": "O'Brien", "Age": 30 }])
    );
}

#[test]
fn select_one_prints_null_when_nothing_matches() {
    let (_dir, config) = workspace();
    create_users(&config);

    let output = run(&config, &["select", "--table", "Users", "--where", "Id=9", "--one"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "null");
}

#[test]
fn update_and_delete_report_affected_rows() {
    let (_dir, config) = workspace();
    create_users(&config);
    for (id, name) in [("1", "Ann"), ("2", "Bob")] {
        let id = format!("Id={id}");
        let name = format!("Name={name}");
        let output = run(&config, &["insert", "--table", "Users", "--set", &id, "--set", &name]);
        assert!(output.status.success(), "stderr: {}", stderr(&output));
    }

    let output = run(
        &config,
        &["update", "--table", "Users", "--set", "Age=41", "--where", "Name=Bob"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "1 row(s) affected.");

    let output = run(&config, &["delete", "--table", "Users", "--where", "Id=1"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "1 row(s) affected.");

    let output = run(&config, &["exec", "--sql", "SELECT Name, Age FROM Users"]);
    let rows: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(rows, serde_json::json!([{ "Name": "Bob", "Age": 41 }]));
}

#[test]
fn delete_without_condition_is_refused() {
    let (_dir, config) = workspace();
    create_users(&config);
    let output = run(&config, &["insert", "--table", "Users", "--set", "Id=1"]);
    assert!(output.status.success());

    let output = run(&config, &["delete", "--table", "Users"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("refused"), "stderr: {}", stderr(&output));

    let output = run(&config, &["select", "--table", "Users"]);
    let rows: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(rows.as_array().map(Vec::len), Some(1));
}

#[test]
fn exec_binds_named_params() {
    let (_dir, config) = workspace();
    create_users(&config);

    let output = run(
        &config,
        &[
            "exec",
            "--sql",
            "INSERT INTO Users (Id, Name) VALUES (:Id, :Name)",
            "--param",
            "Id=3",
            "--param",
            "Name=Cid",
        ],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let output = run(
        &config,
        &["exec", "--sql", "  select Name from Users where Id = :Id", "--param", "Id=3", "--fetch-one"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let row: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(row, serde_json::json!({ "Name": "Cid" }));
}

#[test]
fn exec_ddl_and_cte_report_zero_rows() {
    let (_dir, config) = workspace();
    let output = run(&config, &["--connection", "Scratch", "exec", "--sql", "CREATE TABLE t (x INTEGER)"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "0 row(s) affected.");

    let output = run(
        &config,
        &["exec", "--sql", "WITH x AS (SELECT 1 AS a) SELECT * FROM x"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "0 row(s) affected.");
}

#[test]
fn set_values_keep_leading_zeros_and_quotes() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    let output = run(
        &config,
        &["script", "insert", "--table", "Addr", "--set", "Zip=00123", "--set", "Code='42'"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output).trim(),
        "INSERT INTO Addr (Zip, Code) VALUES (N'00123', N'42')"
    );
}

// ---------------------------------------------------------------------------
// Literal scripts
// ---------------------------------------------------------------------------

#[test]
fn dry_run_prints_literal_sql_without_connecting() {
    let dir = tempfile::tempdir().unwrap();
    // No config file exists; a dry run must not need one.
    let config = dir.path().join("config.json");

    let output = run(
        &config,
        &["insert", "--table", "Users", "--set", "Name=O'Brien", "--set", "Age=30", "--dry-run"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output).trim(),
        "INSERT INTO Users (Name, Age) VALUES (N'O''Brien', 30)"
    );

    let output = run(&config, &["delete", "--table", "Users", "--where", "Id=5", "--dry-run"]);
    assert_eq!(stdout(&output).trim(), "DELETE FROM Users WHERE Id = 5;");
}

#[test]
fn script_subcommands() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");

    let output = run(
        &config,
        &["script", "update", "--table", "Users", "--set", "Age=31", "--where", "Name=Ann"],
    );
    assert_eq!(stdout(&output).trim(), "UPDATE Users SET Age = 31 WHERE Name = N'Ann'");

    let output = run(
        &config,
        &["script", "select", "--table", "Users", "--where", "Joined=2024-01-02 03:04:05"],
    );
    assert_eq!(
        stdout(&output).trim(),
        "SELECT * FROM Users WHERE Joined = N'2024-01-02 03:04:05'"
    );

    let output = run(&config, &["script", "update", "--table", "Users", "--set", "Age=31"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("error:"));
}

// ---------------------------------------------------------------------------
// create-table
// ---------------------------------------------------------------------------

#[test]
fn create_table_from_json_spec() {
    let (dir, config) = workspace();
    let spec = dir.path().join("users.json");
    fs::write(
        &spec,
        serde_json::json!({
            "name": "Users",
            "columns": [
                { "name": "Id", "type": "integer", "primary_key": true, "nullable": false },
                { "name": "Name", "type": "unicode", "length": 50 }
            ]
        })
        .to_string(),
    )
    .unwrap();
    let spec = spec.to_str().unwrap();

    let output = run(&config, &["create-table", "--spec", spec, "--dry-run"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).starts_with("CREATE TABLE Users ("));

    let output = run(&config, &["create-table", "--spec", spec]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "Table 'Users' created.");

    // Creating it again fails.
    let output = run(&config, &["create-table", "--spec", spec]);
    assert!(!output.status.success());
}

#[test]
fn create_table_from_script_file() {
    let (dir, config) = workspace();
    let script = dir.path().join("schema.sql");
    fs::write(&script, "CREATE TABLE a (x INTEGER);\nCREATE TABLE b (y TEXT);\n").unwrap();

    let output = run(&config, &["create-table", "--script", script.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let output = run(&config, &["select", "--table", "b"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "[]");
}

// ---------------------------------------------------------------------------
// Connections
// ---------------------------------------------------------------------------

#[test]
fn unknown_connection_name_fails() {
    let (_dir, config) = workspace();
    let output = run(&config, &["--connection", "Reporting", "select", "--table", "Users"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Reporting"), "stderr: {}", stderr(&output));
}

#[test]
fn missing_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&dir.path().join("absent.json"), &["select", "--table", "Users"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("error:"));
}

#[test]
fn named_in_memory_connection() {
    let (_dir, config) = workspace();
    let output = run(&config, &["--connection", "Scratch", "exec", "--sql", "SELECT 1 AS one"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let rows: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(rows, serde_json::json!([{ "one": 1 }]));
}
