//! E2E тесты для CLI `blz`.
//!
//! Фикстуры содержат два снимка: второй удаляет банковский код 20041111
//! в пользу нового кода 30050000.

use std::fs;

use assert_cmd::Command;
use bankdata::prelude::*;
use chrono::NaiveDate;
use e2e_tests::{fixture, write_config};
use predicates::prelude::*;
use tempfile::tempdir;

/// Создаёт команду `blz` с конфигурацией из фикстур.
///
/// `cargo_bin` помечен deprecated из-за edge case с нестандартными каталогами
/// сборки, но другого способа добраться до бинарников других крейтов нет.
#[expect(deprecated)]
fn blz() -> Command {
    let mut cmd = Command::cargo_bin("blz").unwrap();
    cmd.arg("--config").arg(fixture("bankdata.json"));
    cmd
}

// ============================================================================
// Поиск по коду
// ============================================================================

#[test]
fn test_lookup_head_office() {
    blz()
        .args(["lookup", "1002 0030"])
        .assert()
        .success()
        .stdout(predicate::str::contains("10020030 000001 head office Beispielbank Berlin"))
        .stdout(predicate::str::contains("BEISDEB1XXX"));
}

#[test]
fn test_lookup_added_code() {
    blz()
        .args(["lookup", "30050000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nordbank Hamburg, 20457 Hamburg"));
}

#[test]
fn test_lookup_modified_record_has_new_name() {
    blz()
        .args(["lookup", "70050000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stadtsparkasse München"));
}

#[test]
fn test_lookup_expired_code_names_replacement() {
    blz()
        .args(["lookup", "20041111"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bank code 20041111 expired, replaced by 30050000"));
}

#[test]
fn test_lookup_unknown_code() {
    blz()
        .args(["lookup", "99999999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown bank code 99999999"));
}

#[test]
fn test_lookup_invalid_code() {
    blz()
        .args(["lookup", "1234"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid bank code '1234'"));
}

#[test]
fn test_branches_as_json() {
    let output = blz().args(["--json", "branches", "10020030"]).output().unwrap();
    assert!(output.status.success());

    let records: Vec<BankRecord> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].city, "Potsdam");
    assert!(!records[0].head_office);
    assert_eq!(records[0].iban_rule_label, Some(1));
}

#[test]
fn test_branches_of_expired_code() {
    blz()
        .args(["branches", "20041111"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("replaced by 30050000"));
}

// ============================================================================
// Поиск и сведения
// ============================================================================

#[test]
fn test_search_by_city_ignores_case() {
    blz()
        .args(["search", "--city", "HAMBURG"])
        .assert()
        .success()
        .stdout(predicate::str::contains("30050000"))
        // удалённые записи не находятся
        .stdout(predicate::str::contains("20041111").not());
}

#[test]
fn test_search_with_branches() {
    blz()
        .args(["search", "--name", "beispiel"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Potsdam").not());

    blz()
        .args(["search", "--name", "beispiel", "--branches"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Potsdam"));
}

#[test]
fn test_info() {
    blz()
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("june2013"))
        .stdout(predicate::str::contains("2013-06-03 to 2013-09-08"))
        .stdout(predicate::str::contains("Records:    5"));
}

// ============================================================================
// Слияние
// ============================================================================

#[test]
fn test_merge_writes_current_records() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("merged.txt");

    blz()
        .args(["merge", "--output", output.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("Merged 2 file(s), wrote 5 record(s)"));

    let options = ReadOptions::new(
        FormatVersion::June2013,
        NaiveDate::from_ymd_opt(2013, 6, 3).unwrap(),
        NaiveDate::from_ymd_opt(2013, 9, 8).unwrap(),
    );
    let merged = BankFile::read(fs::File::open(&output).unwrap(), options).unwrap();
    assert_eq!(merged.len(), 5);
    assert!(merged.record(50).unwrap().is_deleted());
    assert_eq!(merged.record(60).unwrap().name, "Stadtsparkasse München");
}

#[test]
fn test_merge_reports_conflicting_file() {
    let dir = tempdir().unwrap();
    let newer = fixture("blz_2013_06_03.txt");
    let older = fixture("blz_2013_03_04.txt");
    // старая раскладка не может идти после новой
    let config = write_config(
        dir.path(),
        &[
            (newer.as_path(), "june2013", "2013-06-03", "2013-09-08"),
            (older.as_path(), "june2006", "2013-09-09", "2013-12-08"),
        ],
    )
    .unwrap();

    #[expect(deprecated)]
    let mut cmd = Command::cargo_bin("blz").unwrap();
    cmd.arg("--config")
        .arg(&config)
        .arg("merge")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to merge bank files"))
        .stderr(predicate::str::contains("cannot update from bank file"))
        .stderr(predicate::str::contains("blz_2013_03_04.txt"));
}

#[test]
fn test_missing_bank_file() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.txt");
    let config =
        write_config(dir.path(), &[(missing.as_path(), "june2006", "2013-03-04", "2013-06-02")])
            .unwrap();

    #[expect(deprecated)]
    let mut cmd = Command::cargo_bin("blz").unwrap();
    cmd.arg("--config")
        .arg(&config)
        .args(["lookup", "10020030"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load bank data"))
        .stderr(predicate::str::contains("missing.txt"));
}

#[test]
fn test_missing_config() {
    #[expect(deprecated)]
    let mut cmd = Command::cargo_bin("blz").unwrap();
    cmd.args(["--config", "/nonexistent/bankdata.json", "info"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

// ============================================================================
// Форматирование
// ============================================================================

#[test]
fn test_format_letter_style() {
    blz()
        .args(["format", "--kind", "bank-code", "--style", "letter", "10020030"])
        .assert()
        .success()
        .stdout("1002 0030\n");
}

#[test]
fn test_format_normalizes_text() {
    blz()
        .args(["format", "--kind", "text", "Müller & Söhne"])
        .assert()
        .success()
        .stdout("MÜLLER & SÖHNE\n");
}

#[test]
fn test_format_rejects_unknown_style() {
    blz()
        .args(["format", "--kind", "account-number", "--style", "fancy", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format style"));
}
