use assert_cmd::cargo_bin_cmd;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;

mod common;
use common::{Env, first_shift_id, init_with_data};

#[test]
fn test_init_creates_databases() {
    let env = Env::new();
    env.tito()
        .args(["--test", "init"])
        .assert()
        .success()
        .stdout(contains("Databases initialized"));

    assert!(std::path::Path::new(&env.db).exists());
    assert!(std::path::Path::new(&env.remote).exists());
}

#[test]
fn test_add_and_list_shifts() {
    let env = init_with_data();

    env.tito()
        .args(["list", "--period", "2025-09"])
        .assert()
        .success()
        .stdout(contains("2025-09-01"))
        .stdout(contains("2025-09-15"))
        .stdout(contains("7.50"))
        .stdout(contains("$112.50"))
        .stdout(contains("$225.00"));

    env.tito()
        .args(["list", "--period", "2025-10"])
        .assert()
        .success()
        .stdout(contains("No shifts"));
}

#[test]
fn test_duplicate_date_rejected() {
    let env = init_with_data();

    env.tito()
        .args(["add", "2025-09-01", "--in", "10:00", "--out", "12:00"])
        .assert()
        .code(2)
        .stderr(contains("already have a shift"));
}

#[test]
fn test_future_date_rejected() {
    let env = Env::new();
    env.tito().args(["--test", "init"]).assert().success();

    env.tito()
        .args(["add", "2999-01-01", "--in", "09:00", "--out", "17:00"])
        .assert()
        .failure()
        .stderr(contains("future"));
}

#[test]
fn test_invalid_time_rejected() {
    let env = Env::new();
    env.tito().args(["--test", "init"]).assert().success();

    env.tito()
        .args(["add", "2025-09-01", "--in", "9am", "--out", "17:00"])
        .assert()
        .failure()
        .stderr(contains("Invalid time"));
}

#[test]
fn test_overnight_shift() {
    let env = Env::new();
    env.tito().args(["--test", "init"]).assert().success();

    env.tito()
        .args(["add", "2025-09-03", "--in", "22:00", "--out", "06:00"])
        .assert()
        .success();

    env.tito()
        .args(["list", "--period", "all"])
        .assert()
        .success()
        .stdout(contains("8.00"))
        .stdout(contains("$120.00"));
}

#[test]
fn test_edit_and_delete_shift() {
    let env = init_with_data();
    let id = first_shift_id(&env);

    env.tito()
        .args(["edit", &id, "--rate", "20"])
        .assert()
        .success();

    env.tito()
        .args(["list", "--period", "all"])
        .assert()
        .success()
        .stdout(contains("$150.00"));

    env.tito()
        .args(["del", &id, "--yes"])
        .assert()
        .success();

    env.tito()
        .args(["list", "--period", "all"])
        .assert()
        .success()
        .stdout(contains(id.as_str()).not());

    env.tito()
        .args(["del", &id, "--yes"])
        .assert()
        .failure()
        .stderr(contains("Shift not found"));
}

#[test]
fn test_settings_show_and_update() {
    let env = Env::new();
    env.tito().args(["--test", "init"]).assert().success();

    env.tito()
        .args(["settings"])
        .assert()
        .success()
        .stdout(contains("$15.00"))
        .stdout(contains("09:00 - 17:00"));

    env.tito()
        .args(["settings", "--rate", "25", "--start", "08:00", "--auto-clock-out", "on"])
        .assert()
        .success()
        .stdout(contains("$25.00"))
        .stdout(contains("08:00 - 17:00"))
        .stdout(contains("Auto clock-out : on"));

    env.tito()
        .args(["settings", "--rate", "0"])
        .assert()
        .failure()
        .stderr(contains("greater than zero"));
}

#[test]
fn test_summary_for_month() {
    let env = init_with_data();

    env.tito()
        .args(["summary", "--month", "2025-09"])
        .assert()
        .success()
        .stdout(contains("September 2025"))
        .stdout(contains("Earned        : $225.00"))
        .stdout(contains("Goal          : $1000.00"));
}

#[test]
fn test_export_csv_and_json() {
    let env = init_with_data();
    let csv = env.path("sheet.csv");
    let json = env.path("sheet.json");

    env.tito()
        .args([
            "export",
            "--format",
            "csv",
            "--file",
            csv.to_str().unwrap(),
            "--period",
            "2025-09",
        ])
        .assert()
        .success();

    let content = fs::read_to_string(&csv).unwrap();
    assert!(content.starts_with("date,clock_in,clock_out,hours,rate,earnings"));
    assert!(content.contains("2025-09-01"));
    assert!(content.contains("TOTAL,,,15.00,,225.00"));

    env.tito()
        .args([
            "export",
            "--format",
            "json",
            "--file",
            json.to_str().unwrap(),
            "--period",
            "all",
        ])
        .assert()
        .success();

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(value["rows"].as_array().unwrap().len(), 2);
}

#[test]
fn test_export_relative_path_rejected() {
    let env = init_with_data();

    env.tito()
        .args(["export", "--format", "csv", "--file", "sheet.csv", "--period", "all"])
        .assert()
        .failure()
        .stderr(contains("absolute"));
}

#[test]
fn test_clock_cycle() {
    let env = Env::new();
    env.tito().args(["--test", "init"]).assert().success();

    env.tito()
        .args(["clock", "out"])
        .assert()
        .failure()
        .stderr(contains("while idle"));

    env.tito().args(["clock", "in"]).assert().success();
    env.tito()
        .args(["status"])
        .assert()
        .success()
        .stdout(contains("clocked-in"));

    env.tito().args(["clock", "break-start"]).assert().success();
    env.tito()
        .args(["status"])
        .assert()
        .success()
        .stdout(contains("on-break"));

    env.tito()
        .args(["clock", "out"])
        .assert()
        .success()
        .stdout(contains("Clocked out"));

    env.tito()
        .args(["status"])
        .assert()
        .success()
        .stdout(contains("idle"));
}

#[test]
fn test_sync_requires_login() {
    let env = Env::new();
    env.tito().args(["--test", "init"]).assert().success();

    env.tito()
        .args(["sync"])
        .assert()
        .code(2)
        .stderr(contains("Not authenticated"));
}

#[test]
fn test_account_round_trip() {
    let env = Env::new();
    env.tito().args(["--test", "init"]).assert().success();

    env.tito()
        .args(["login", "--email", "Ada@Example.com"])
        .assert()
        .success()
        .stdout(contains("ada@example.com"));

    env.tito()
        .args(["whoami"])
        .assert()
        .success()
        .stdout(contains("ada@example.com"));

    env.tito()
        .args(["add", "2025-09-01", "--in", "09:00", "--out", "17:00"])
        .assert()
        .success();

    env.tito().args(["logout"]).assert().success();

    env.tito()
        .args(["list", "--period", "all"])
        .assert()
        .success()
        .stdout(contains("No shifts"));

    env.tito()
        .args(["login", "--email", "ada@example.com"])
        .assert()
        .success();

    env.tito()
        .args(["list", "--period", "all"])
        .assert()
        .success()
        .stdout(contains("2025-09-01"));

    env.tito()
        .args(["sync"])
        .assert()
        .success();
}

#[test]
fn test_login_rejects_bad_email() {
    let env = Env::new();
    env.tito().args(["--test", "init"]).assert().success();

    env.tito()
        .args(["login", "--email", "nobody"])
        .assert()
        .failure();
}

#[test]
fn test_non_finite_amounts_rejected() {
    let env = init_with_data();
    let id = first_shift_id(&env);

    for value in ["inf", "NaN"] {
        env.tito()
            .args(["edit", &id, "--rate", value])
            .assert()
            .code(2)
            .stderr(contains("greater than zero"));

        env.tito()
            .args(["settings", "--goal", value])
            .assert()
            .code(2)
            .stderr(contains("greater than zero"));
    }

    env.tito()
        .args(["list", "--period", "all"])
        .assert()
        .success()
        .stdout(contains("2025-09-01"))
        .stdout(contains("2025-09-15"));
}

#[test]
fn test_unusable_database_exits_with_one() {
    let env = Env::new();
    let dir = env.home.path().to_string_lossy().to_string();

    cargo_bin_cmd!("tito")
        .env("HOME", env.home.path())
        .env_remove("RUST_LOG")
        .args(["--db", &dir, "--remote", &env.remote, "list"])
        .assert()
        .code(1);
}
