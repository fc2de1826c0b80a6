use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const SNAPSHOT: &str = r#"[
  {
    "id": "2026-03-01T10:00:00.000Z",
    "timestamp": "2026-03-01 11:00:00",
    "medications": ["Ibuprofeno"],
    "otherSubstances": "",
    "pharmacogenetics": "",
    "conditions": "Insuficiencia renal",
    "dateOfBirth": "",
    "lang": "es",
    "analysisResult": {
      "analysisText": "Texto",
      "drugConditionContraindications": [
        {"medication": "Ibuprofeno", "condition": "Insuficiencia renal", "riskLevel": "Alto"}
      ]
    }
  }
]
"#;

fn rx(home: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("rxcheck");
    cmd.current_dir(home)
        .env("RXCHECK_HOME", home)
        .env("RXCHECK_LANG", "en")
        .env_remove("GEMINI_API_KEY")
        .env_remove("RXCHECK_CONFIG_PATH")
        .env_remove("RXCHECK_HISTORY_FILE");
    cmd
}

fn write_snapshot(home: &Path, raw: &str) -> std::path::PathBuf {
    let path = home.join("state").join("history.json");
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir state");
    fs::write(&path, raw).expect("write snapshot");
    path
}

#[test]
fn history_list_on_fresh_home_is_empty() {
    let tmp = tempdir().expect("tempdir");
    rx(tmp.path())
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved analyses yet."));
}

#[test]
fn corrupt_history_is_discarded() {
    let tmp = tempdir().expect("tempdir");
    let path = write_snapshot(tmp.path(), "[{\"id\": ");

    rx(tmp.path())
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved analyses yet."));
    assert!(!path.exists());
}

#[test]
fn history_show_uses_item_language_and_normalizes() {
    let tmp = tempdir().expect("tempdir");
    write_snapshot(tmp.path(), SNAPSHOT);

    rx(tmp.path())
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2026-03-01T10:00:00.000Z"))
        .stdout(predicate::str::contains("[es]"))
        .stdout(predicate::str::contains("records=1"));

    rx(tmp.path())
        .args(["history", "show", "2026-03-01T10:00:00.000Z"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Alerta de Riesgo Alto"))
        .stdout(predicate::str::contains("Ibuprofeno con Insuficiencia renal"));
}

#[test]
fn history_show_unknown_id_is_an_issue() {
    let tmp = tempdir().expect("tempdir");
    rx(tmp.path())
        .args(["history", "show", "nope"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no history item"));
}

#[test]
fn history_clear_removes_snapshot_and_audits() {
    let tmp = tempdir().expect("tempdir");
    let path = write_snapshot(tmp.path(), SNAPSHOT);

    rx(tmp.path())
        .args(["history", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("removed=1"));
    assert!(!path.exists());

    let audit = fs::read_to_string(tmp.path().join("logs").join("audit.log")).expect("audit");
    assert!(audit.contains("history-clear"));
}

#[test]
fn export_requires_a_target_and_known_id() {
    let tmp = tempdir().expect("tempdir");
    write_snapshot(tmp.path(), SNAPSHOT);

    rx(tmp.path())
        .args(["export", "2026-03-01T10:00:00.000Z"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("nothing to export"));

    let csv = tmp.path().join("x.csv");
    rx(tmp.path())
        .args(["export", "missing", "--csv"])
        .arg(&csv)
        .assert()
        .code(2);
    assert!(!csv.exists());

    rx(tmp.path())
        .args(["export", "2026-03-01T10:00:00.000Z", "--csv"])
        .arg(&csv)
        .assert()
        .success();
    let content = fs::read_to_string(&csv).expect("csv");
    assert!(content.contains(
        "\"Contraindicación por Condición\",\"Ibuprofeno\",\"Insuficiencia renal\",\"Alto\""
    ));
}
