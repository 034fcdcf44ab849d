use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const OBRA_CSV: &str = "\
Data,Medição,Valor,Disciplina
2024-01-01,10,100,Pintura
2024-01-02,20,200,Pintura
2024-01-03,0,0,Elétrica
";

struct Fixture {
    home: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Fixture {
            home: TempDir::new().unwrap(),
        }
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.home.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("medicao").unwrap();
        cmd.env("HOME", self.home.path()).env("NO_COLOR", "1");
        cmd
    }
}

#[test]
fn test_schema_binds_portuguese_headers() {
    let fx = Fixture::new();
    let csv = fx.write("obra.csv", OBRA_CSV);
    fx.cmd()
        .arg("schema")
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("Medição"))
        .stdout(predicate::str::contains("Disciplina"));
}

#[test]
fn test_summary_prints_kpis() {
    let fx = Fixture::new();
    let csv = fx.write("obra.csv", OBRA_CSV);
    fx.cmd()
        .arg("summary")
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 of 3 rows are measurements"))
        .stdout(predicate::str::contains("30.00"))
        .stdout(predicate::str::contains("R$ 300.00"))
        .stdout(predicate::str::contains("+100.0%"))
        .stdout(predicate::str::contains("36.00"));
}

#[test]
fn test_summary_merges_quick_entries() {
    let fx = Fixture::new();
    let csv = fx.write("obra.csv", OBRA_CSV);
    fx.cmd()
        .args(["summary", csv.to_str().unwrap(), "--entry", "2024-01-04,30,300"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 of 4 rows are measurements"))
        .stdout(predicate::str::contains("60.00"));
}

#[test]
fn test_bad_quick_entry_fails() {
    let fx = Fixture::new();
    let csv = fx.write("obra.csv", OBRA_CSV);
    fx.cmd()
        .args(["summary", csv.to_str().unwrap(), "--entry", "yesterday,5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid quick entry"));
}

#[test]
fn test_audit_flags_negative_quantity() {
    let fx = Fixture::new();
    let csv = fx.write(
        "obra.csv",
        "Data,Medição,Disciplina\n2024-01-01,10,Pintura\n2024-01-02,-4,Pintura\n",
    );
    fx.cmd()
        .arg("audit")
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("Negative quantity"));
}

#[test]
fn test_audit_clean_table() {
    let fx = Fixture::new();
    let csv = fx.write("obra.csv", OBRA_CSV);
    fx.cmd()
        .arg("audit")
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("No anomalies found."));
}

#[test]
fn test_groups_ranks_disciplines() {
    let fx = Fixture::new();
    let csv = fx.write(
        "obra.csv",
        "Data,Medição,Disciplina\n\
         2024-01-01,5,Elétrica\n\
         2024-01-02,20,Pintura\n\
         2024-01-03,7,Elétrica\n",
    );
    fx.cmd()
        .arg("groups")
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("Pintura"))
        .stdout(predicate::str::contains("12.00"));
}

#[test]
fn test_context_ends_with_question() {
    let fx = Fixture::new();
    let csv = fx.write("obra.csv", OBRA_CSV);
    fx.cmd()
        .args([
            "context",
            csv.to_str().unwrap(),
            "--question",
            "How much was painted?",
            "--filter",
            "Pintura",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Filter: Disciplina = Pintura"))
        .stdout(predicate::str::contains("Question: How much was painted?"));
}

#[test]
fn test_unknown_override_column_fails() {
    let fx = Fixture::new();
    let csv = fx.write("obra.csv", OBRA_CSV);
    fx.cmd()
        .args(["schema", csv.to_str().unwrap(), "--quantity-col", "Qtd"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown column: Qtd"));
}

#[test]
fn test_missing_file_fails() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["summary", "/nonexistent/obra.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not read"));
}

#[test]
fn test_sheets_lists_csv_as_single_sheet() {
    let fx = Fixture::new();
    let csv = fx.write("obra.csv", OBRA_CSV);
    fx.cmd()
        .arg("sheets")
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("csv"));
}

#[test]
fn test_init_writes_settings() {
    let fx = Fixture::new();
    fx.cmd().arg("init").assert().success();
    let path = fx.home.path().join(".config/medicao/settings.json");
    let raw = fs::read_to_string(path).unwrap();
    assert!(raw.contains("outlier_k"));
    fx.cmd()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already"));
}

#[test]
fn test_init_leaves_malformed_settings_alone() {
    let fx = Fixture::new();
    let dir = fx.home.path().join(".config/medicao");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("settings.json");
    let broken = r#"{"outlier_k": 3.0, "top_groups": 5,}"#;
    fs::write(&path, broken).unwrap();

    fx.cmd()
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Settings error"))
        .stdout(predicate::str::contains("already").not());
    assert_eq!(fs::read_to_string(&path).unwrap(), broken);
}

#[test]
fn test_skip_rows_counts_blank_banner_lines() {
    let fx = Fixture::new();
    let csv = fx.write("obra.csv", "OBRA X\n\nData,Qtd\n2024-01-01,5\n");
    fx.cmd()
        .args(["schema", csv.to_str().unwrap(), "--skip-rows", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 columns, 1 rows"));
}

#[test]
fn test_groups_ignore_quick_entries() {
    let fx = Fixture::new();
    let csv = fx.write("obra.csv", "Medição,Disciplina\n5,Pintura\n");
    fx.cmd()
        .args(["groups", csv.to_str().unwrap(), "--entry", "2024-01-02,50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pintura"))
        .stdout(predicate::str::contains("50.00").not());
}
