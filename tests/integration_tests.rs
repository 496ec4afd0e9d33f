//! Integration tests for the antdb CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd, each
//! against its own catalog in a temp directory.

use assert_cmd::Command;
use chrono::{Duration, Utc};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to get an antdb command bound to the catalog in `tmp`
fn antdb(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("antdb").unwrap();
    cmd.env_remove("ANTDB_DATABASE")
        .env_remove("ANTDB_LOG")
        .arg("--db")
        .arg(tmp.path().join("catalog.db"));
    cmd
}

fn setup_catalog() -> TempDir {
    let tmp = TempDir::new().unwrap();
    antdb(&tmp).args(["db", "init"]).assert().success();
    tmp
}

/// Write `text` as a UTF-16LE file with BOM, the way antwiki exports come
fn write_utf16(dir: &Path, name: &str, text: &str) -> PathBuf {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

fn write_antmaps(dir: &Path, name: &str, species: &[&str]) -> PathBuf {
    let entries: Vec<String> = species
        .iter()
        .map(|s| format!(r#"{{"key": "{}", "display": "{}"}}"#, s.replace(' ', "."), s))
        .collect();
    let path = dir.join(name);
    fs::write(&path, format!(r#"{{"species": [{}]}}"#, entries.join(", "))).unwrap();
    path
}

fn add_species(tmp: &TempDir, name: &str) {
    antdb(tmp).args(["species", "add", name]).assert().success();
}

fn add_country(tmp: &TempDir, name: &str, code: &str) {
    antdb(tmp)
        .args(["region", "add", name, "--code", code])
        .assert()
        .success();
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    Command::cargo_bin("antdb")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Catalog of ant species"))
        .stdout(predicate::str::contains("species"))
        .stdout(predicate::str::contains("flight"));
}

#[test]
fn test_version_displays() {
    Command::cargo_bin("antdb")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("antdb"));
}

#[test]
fn test_completions_bash() {
    Command::cargo_bin("antdb")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("antdb"));
}

// ============================================================================
// Database Tests
// ============================================================================

#[test]
fn test_db_init_creates_file() {
    let tmp = setup_catalog();
    assert!(tmp.path().join("catalog.db").exists());
}

#[test]
fn test_db_status_json() {
    let tmp = setup_catalog();
    add_species(&tmp, "Lasius niger");

    let output = antdb(&tmp)
        .args(["db", "status", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["statistics"]["species"], 1);
    assert_eq!(report["statistics"]["genera"], 1);
}

#[test]
fn test_db_reset_with_yes() {
    let tmp = setup_catalog();
    add_species(&tmp, "Lasius niger");

    antdb(&tmp)
        .args(["db", "reset", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Catalog reset"));

    antdb(&tmp)
        .args(["species", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No species found"));
}

// ============================================================================
// Species Tests
// ============================================================================

#[test]
fn test_species_add_and_show() {
    let tmp = setup_catalog();
    antdb(&tmp)
        .args(["species", "add", "Lasius niger"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created species"));

    antdb(&tmp)
        .args(["species", "show", "lasius-niger"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lasius niger"))
        .stdout(predicate::str::contains("Lasius_niger"));
}

#[test]
fn test_species_add_duplicate_fails() {
    let tmp = setup_catalog();
    add_species(&tmp, "Lasius niger");
    antdb(&tmp)
        .args(["species", "add", "Lasius niger"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_species_add_rejects_bad_name() {
    let tmp = setup_catalog();
    antdb(&tmp)
        .args(["species", "add", "lasius Niger"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid"));
}

#[test]
fn test_species_show_unknown_fails() {
    let tmp = setup_catalog();
    antdb(&tmp)
        .args(["species", "show", "Lasius nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_species_list_tsv_by_genus() {
    let tmp = setup_catalog();
    add_species(&tmp, "Lasius niger");
    add_species(&tmp, "Lasius flavus");
    add_species(&tmp, "Myrmica rubra");

    antdb(&tmp)
        .args(["species", "list", "--genus", "Lasius", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lasius flavus"))
        .stdout(predicate::str::contains("Lasius niger"))
        .stdout(predicate::str::contains("Myrmica").not());
}

#[test]
fn test_species_search_by_common_and_invalid_name() {
    let tmp = setup_catalog();
    add_species(&tmp, "Lasius niger");
    add_species(&tmp, "Camponotus ligniperda");

    antdb(&tmp)
        .args(["species", "common-name", "Lasius niger", "Black garden ant"])
        .assert()
        .success();
    antdb(&tmp)
        .args(["species", "alias", "Lasius niger", "Formica nigra"])
        .assert()
        .success();

    antdb(&tmp)
        .args(["species", "search", "garden", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lasius niger"))
        .stdout(predicate::str::contains("Camponotus").not());

    antdb(&tmp)
        .args(["species", "search", "nigra", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lasius niger"));
}

#[test]
fn test_species_set_and_rename() {
    let tmp = setup_catalog();
    add_species(&tmp, "Lasius nigr");

    antdb(&tmp)
        .args(["species", "set", "Lasius nigr", "--author", "Linnaeus", "--year", "1758"])
        .assert()
        .success();
    antdb(&tmp)
        .args(["species", "rename", "Lasius nigr", "Lasius niger"])
        .assert()
        .success();

    let output = antdb(&tmp)
        .args(["species", "show", "Lasius niger", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let species: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(species["author"], "Linnaeus");
    assert_eq!(species["year"], 1758);
}

#[test]
fn test_species_biology_sizes_and_description() {
    let tmp = setup_catalog();
    add_species(&tmp, "Lasius niger");

    antdb(&tmp)
        .args([
            "species", "set", "Lasius niger",
            "--colony-structure", "MONO",
            "--founding", "c",
            "--hibernation", "LONG",
            "--polymorphism", "false",
        ])
        .assert()
        .success();
    antdb(&tmp)
        .args(["species", "size", "Lasius niger", "WORKER", "3.5", "5"])
        .assert()
        .success();
    antdb(&tmp)
        .args(["species", "size", "Lasius niger", "queen", "9"])
        .assert()
        .success();
    antdb(&tmp)
        .args(["species", "describe", "Lasius niger", "Common garden ant.", "--lang", "en"])
        .assert()
        .success();
    antdb(&tmp)
        .args(["species", "months", "Lasius niger", "6", "7", "8"])
        .assert()
        .success();

    let output = antdb(&tmp)
        .args(["species", "show", "Lasius niger", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let species: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(species["biology"]["colony_structure"], "MONO");
    assert_eq!(species["biology"]["founding"], "c");
    assert_eq!(species["biology"]["hibernation"], "LONG");
    assert_eq!(species["biology"]["worker_polymorphism"], false);
    assert_eq!(species["sizes"][0]["caste"], "WORKER");
    assert_eq!(species["sizes"][1]["maximum"], 9.0);
    assert_eq!(species["flight_months"], serde_json::json!([6, 7, 8]));
    assert_eq!(species["descriptions"][0]["language"], "en");

    antdb(&tmp)
        .args(["species", "show", "Lasius niger"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Monogynous"))
        .stdout(predicate::str::contains("June, July, August"))
        .stdout(predicate::str::contains("3.5 - 5 mm"));
}

#[test]
fn test_species_size_rejects_inverted_range() {
    let tmp = setup_catalog();
    add_species(&tmp, "Lasius niger");
    antdb(&tmp)
        .args(["species", "size", "Lasius niger", "WORKER", "5", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("greater than maximum"));
}

#[test]
fn test_species_invalidate_hides_from_list() {
    let tmp = setup_catalog();
    add_species(&tmp, "Lasius niger");
    antdb(&tmp)
        .args(["species", "invalidate", "Lasius niger"])
        .assert()
        .success();

    antdb(&tmp)
        .args(["species", "list", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lasius niger").not());
    antdb(&tmp)
        .args(["species", "list", "--all", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lasius niger"));
}

// ============================================================================
// Region Tests
// ============================================================================

#[test]
fn test_region_diff_and_common() {
    let tmp = setup_catalog();
    add_country(&tmp, "Germany", "DE");
    add_country(&tmp, "France", "FR");

    let de = write_antmaps(tmp.path(), "de.json", &["Lasius niger", "Formica rufa", "Myrmica rubra"]);
    let fr = write_antmaps(tmp.path(), "fr.json", &["Lasius niger", "Messor barbarus"]);
    antdb(&tmp)
        .args(["import", "antmaps", "DE"])
        .arg(&de)
        .assert()
        .success();
    antdb(&tmp)
        .args(["import", "antmaps", "FR"])
        .arg(&fr)
        .assert()
        .success();

    let output = antdb(&tmp)
        .args(["region", "diff", "DE", "FR", "-f", "json"])
        .output()
        .unwrap();
    let diff: Vec<String> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(diff, vec!["Formica rufa", "Myrmica rubra"]);

    let output = antdb(&tmp)
        .args(["region", "common", "DE", "FR", "-f", "json"])
        .output()
        .unwrap();
    let common: Vec<String> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(common, vec!["Lasius niger"]);
}

#[test]
fn test_region_diff_covers_regions_sharing_a_slug() {
    let tmp = setup_catalog();
    add_country(&tmp, "Georgia", "GE");
    add_country(&tmp, "United States", "US");
    add_country(&tmp, "France", "FR");
    antdb(&tmp)
        .args(["region", "add", "Georgia", "--code", "US-GA", "--type", "Subregion", "--parent", "US"])
        .assert()
        .success();

    for (code, file, species) in [
        ("GE", "ge.json", vec!["Lasius niger"]),
        ("US-GA", "ga.json", vec!["Solenopsis invicta"]),
        ("FR", "fr.json", vec!["Lasius niger"]),
    ] {
        let path = write_antmaps(tmp.path(), file, &species);
        antdb(&tmp)
            .args(["import", "antmaps", code])
            .arg(&path)
            .assert()
            .success();
    }

    let output = antdb(&tmp)
        .args(["region", "diff", "georgia", "FR", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let diff: Vec<String> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(diff, vec!["Solenopsis invicta"]);

    antdb(&tmp)
        .args(["region", "show", "georgia"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ambiguous"));
}

#[test]
fn test_region_species_of_empty_region_fails() {
    let tmp = setup_catalog();
    add_country(&tmp, "Germany", "DE");
    antdb(&tmp)
        .args(["region", "species", "DE"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_region_complete_and_list() {
    let tmp = setup_catalog();
    add_country(&tmp, "Germany", "DE");
    add_country(&tmp, "France", "FR");
    let de = write_antmaps(tmp.path(), "de.json", &["Lasius niger"]);
    antdb(&tmp)
        .args(["import", "antmaps", "DE"])
        .arg(&de)
        .assert()
        .success();
    antdb(&tmp)
        .args(["region", "complete", "DE"])
        .assert()
        .success();

    antdb(&tmp)
        .args(["region", "list", "--complete-only", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Germany"))
        .stdout(predicate::str::contains("France").not());
}

#[test]
fn test_region_red_list_and_protect() {
    let tmp = setup_catalog();
    add_country(&tmp, "Germany", "DE");
    let de = write_antmaps(tmp.path(), "de.json", &["Formica rufa"]);
    antdb(&tmp)
        .args(["import", "antmaps", "DE"])
        .arg(&de)
        .assert()
        .success();

    antdb(&tmp)
        .args(["region", "red-list", "DE", "Formica rufa", "near-threatened"])
        .assert()
        .success();
    antdb(&tmp)
        .args(["region", "protect", "DE", "Formica rufa"])
        .assert()
        .success();

    antdb(&tmp)
        .args(["region", "species", "DE", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Formica rufa\tyes\tyes\tNear Threatened"));
}

// ============================================================================
// Import Tests
// ============================================================================

#[test]
fn test_import_world_distribution() {
    let tmp = setup_catalog();
    let file = write_utf16(
        tmp.path(),
        "distribution.txt",
        concat!(
            "Id\tGenus\tSpecies\tSubspecies\tCountry\tRegion\tIntroduced\n",
            "1\tAcanthostichus\tarizonensis\t\tMexico\tChihuahua\t\n",
            "2\tAcanthostichus\tarizonensis\t\tMexico\tSonora\t\n",
            "3\tAcanthostichus\tarizonensis\tsubsp\tMexico\tDurango\t\n",
            "4\tTetramorium\tbicarinatum\t\tMexico\t\tYes\n",
        ),
    );

    antdb(&tmp)
        .args(["import", "world-distribution"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("4 rows"));

    antdb(&tmp)
        .args(["region", "species", "mexico", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Acanthostichus arizonensis\tyes"))
        .stdout(predicate::str::contains("Tetramorium bicarinatum\tno"));

    antdb(&tmp)
        .args(["region", "list", "--type", "Subregion", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Chihuahua"))
        .stdout(predicate::str::contains("Durango").not());
}

#[test]
fn test_import_valid_species_bad_year_rolls_back() {
    let tmp = setup_catalog();
    let file = write_utf16(
        tmp.path(),
        "valid.txt",
        concat!(
            "Taxon\tSubfamily\tTribe\tGenus\tGroup\tc5\tSubspecies\tc7\tAuthor\tYear\n",
            "Lasius niger\tFormicinae\tLasiini\tLasius\t\t\t\t\tLinnaeus\t1758\n",
            "Lasius flavus\tFormicinae\tLasiini\tLasius\t\t\t\t\tFabricius\tabc\n",
        ),
    );

    antdb(&tmp)
        .args(["import", "valid-species"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 3"));

    antdb(&tmp)
        .args(["species", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No species found"));
}

#[test]
fn test_import_valid_species_sets_taxonomy() {
    let tmp = setup_catalog();
    let file = write_utf16(
        tmp.path(),
        "valid.txt",
        concat!(
            "Taxon\tSubfamily\tTribe\tGenus\tGroup\tc5\tSubspecies\tc7\tAuthor\tYear\n",
            "Lasius niger\tFormicinae\tLasiini\tLasius\t\t\t\t\tLinnaeus\t1758\n",
        ),
    );
    antdb(&tmp)
        .args(["import", "valid-species"])
        .arg(&file)
        .assert()
        .success();

    antdb(&tmp)
        .args(["genus", "list", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lasius\tLasiini\tFormicinae\tFormicidae"));
}

#[test]
fn test_import_synonyms_renames_species() {
    let tmp = setup_catalog();
    add_species(&tmp, "Lasius alienoides");
    let file = write_utf16(
        tmp.path(),
        "synonyms.txt",
        concat!(
            "Taxon\tc1\tc2\tc3\tc4\tc5\tc6\tc7\tValid\tStatus\n",
            "Lasius alienoides\t\t\t\t\t\t\t\tLasius alienus\tsynonym\n",
        ),
    );
    antdb(&tmp)
        .args(["import", "synonyms"])
        .arg(&file)
        .assert()
        .success();

    antdb(&tmp)
        .args(["species", "search", "alienoides", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lasius alienus"));
}

#[test]
fn test_import_ant_sizes_and_worker_list() {
    let tmp = setup_catalog();
    let path = tmp.path().join("ant-sizes.json");
    fs::write(
        &path,
        r#"[{"name": "Lasius niger", "worker_size_min": 3.5, "worker_size_max": 5,
             "queen_size_min": 8, "queen_size_max": 9},
            {"name": "Formica rufa", "worker_size_min": 4.5, "worker_size_max": 9}]"#,
    )
    .unwrap();

    antdb(&tmp)
        .args(["import", "ant-sizes"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 created"));

    antdb(&tmp)
        .args(["species", "sizes", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Formica rufa\t4.5\t9"))
        .stdout(predicate::str::contains("Lasius niger\t3.5\t5"));
}

#[test]
fn test_import_nuptial_flights_and_calendar() {
    let tmp = setup_catalog();
    add_country(&tmp, "Germany", "DE");
    let path = tmp.path().join("ants-nuptial-flight.json");
    fs::write(
        &path,
        r#"[{"name": "Lasius niger", "nuptial_flight_start": 6, "nuptial_flight_end": 8,
             "countries": [{"name": "Germany", "code": "DE"}]},
            {"name": "Messor barbarus", "nuptial_flight_start": 11, "nuptial_flight_end": 2}]"#,
    )
    .unwrap();
    antdb(&tmp)
        .args(["import", "nuptial-flights"])
        .arg(&path)
        .assert()
        .success();

    let output = antdb(&tmp)
        .args(["species", "calendar", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let calendar: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(calendar[0]["species"], "Lasius niger");
    assert_eq!(calendar[1]["months"], serde_json::json!([1, 2, 11, 12]));

    antdb(&tmp)
        .args(["species", "calendar", "--region", "DE", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lasius niger"))
        .stdout(predicate::str::contains("Messor").not());
}

#[test]
fn test_import_nuptial_flights_bad_entry_names_position() {
    let tmp = setup_catalog();
    let path = tmp.path().join("flights.json");
    fs::write(
        &path,
        r#"[{"name": "Lasius niger", "nuptial_flight_start": 6, "nuptial_flight_end": 8},
            {"name": "lasius flavus", "nuptial_flight_start": 7, "nuptial_flight_end": 8}]"#,
    )
    .unwrap();
    antdb(&tmp)
        .args(["import", "nuptial-flights"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("entry 2"));

    antdb(&tmp)
        .args(["species", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No species found"));
}

#[test]
fn test_import_rejects_missing_file() {
    let tmp = setup_catalog();
    antdb(&tmp)
        .args(["import", "synonyms"])
        .arg(tmp.path().join("missing.txt"))
        .assert()
        .failure();
}

// ============================================================================
// Flight Tests
// ============================================================================

fn add_flight(tmp: &TempDir, species: &str, date: &str) -> assert_cmd::assert::Assert {
    antdb(tmp)
        .args([
            "flight",
            "add",
            species,
            "DE",
            "--date",
            date,
            "--address",
            "Marienplatz, Munich",
            "--lat",
            "48.137",
            "--lng",
            "11.575",
        ])
        .assert()
}

#[test]
fn test_flight_add_and_frequency() {
    let tmp = setup_catalog();
    add_country(&tmp, "Germany", "DE");
    add_species(&tmp, "Lasius niger");
    add_flight(&tmp, "Lasius niger", "2021-07-14").success();
    add_flight(&tmp, "Lasius niger", "2022-07-02").success();
    add_flight(&tmp, "Lasius niger", "2022-06-20").success();

    let output = antdb(&tmp)
        .args(["flight", "frequency", "Lasius niger", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let frequency: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(frequency["July"], 2);
    assert_eq!(frequency["June"], 1);
    assert_eq!(frequency["January"], 0);
}

#[test]
fn test_flight_months_threshold() {
    let tmp = setup_catalog();
    add_country(&tmp, "Germany", "DE");
    add_species(&tmp, "Lasius niger");
    add_species(&tmp, "Myrmica rubra");
    for date in ["2020-07-10", "2021-07-11", "2022-07-12"] {
        add_flight(&tmp, "Lasius niger", date).success();
    }
    add_flight(&tmp, "Myrmica rubra", "2022-08-01").success();

    antdb(&tmp)
        .args(["flight", "months", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lasius niger\tJuly"))
        .stdout(predicate::str::contains("Myrmica").not());

    antdb(&tmp)
        .args(["flight", "months", "Myrmica rubra", "--min-count", "1", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Myrmica rubra\tAugust"));
}

#[test]
fn test_flight_months_store() {
    let tmp = setup_catalog();
    add_country(&tmp, "Germany", "DE");
    add_species(&tmp, "Lasius niger");
    for date in ["2020-07-10", "2021-07-11", "2022-07-12"] {
        add_flight(&tmp, "Lasius niger", date).success();
    }

    antdb(&tmp)
        .args(["flight", "months", "--store"])
        .assert()
        .success();

    antdb(&tmp)
        .args(["species", "months", "Lasius niger"])
        .assert()
        .success()
        .stdout(predicate::str::contains("July"));
}

#[test]
fn test_flight_future_date_rejected() {
    let tmp = setup_catalog();
    add_country(&tmp, "Germany", "DE");
    add_species(&tmp, "Lasius niger");
    let tomorrow = (Utc::now().date_naive() + Duration::days(2)).to_string();
    add_flight(&tmp, "Lasius niger", &tomorrow)
        .failure()
        .stderr(predicate::str::contains("future"));
}

#[test]
fn test_flight_end_before_start_rejected() {
    let tmp = setup_catalog();
    add_country(&tmp, "Germany", "DE");
    add_species(&tmp, "Lasius niger");
    antdb(&tmp)
        .args([
            "flight", "add", "Lasius niger", "DE", "--date", "2022-07-02",
            "--address", "Marienplatz, Munich", "--lat", "48.137", "--lng", "11.575",
            "--start", "19:00:00", "--end", "18:00:00",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("after end time"));

    antdb(&tmp)
        .args(["flight", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No flights found"));
}

#[test]
fn test_flight_review() {
    let tmp = setup_catalog();
    add_country(&tmp, "Germany", "DE");
    add_species(&tmp, "Lasius niger");
    add_flight(&tmp, "Lasius niger", "2022-07-02").success();

    antdb(&tmp)
        .args(["flight", "list", "--unreviewed", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lasius niger"));

    antdb(&tmp).args(["flight", "review", "1"]).assert().success();

    antdb(&tmp)
        .args(["flight", "list", "--unreviewed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No flights found"));

    antdb(&tmp)
        .args(["flight", "review", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}
