use assert_cmd::prelude::*;
use rstest::rstest;
use std::process::Command;

fn reef_json(args: &[&str]) -> (i32, serde_json::Value, String) {
    let out = Command::cargo_bin("reef_cli")
        .unwrap()
        .env_remove("RUST_LOG")
        .arg("--json")
        .arg("--log-level")
        .arg("error")
        .args(args)
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&out.stdout).to_string();
    let stderr = String::from_utf8_lossy(&out.stderr).to_string();
    let line = stdout
        .lines()
        .find(|l| l.starts_with('{'))
        .unwrap_or("null")
        .to_string();
    let v: serde_json::Value = serde_json::from_str(&line).expect("valid JSON");
    (out.status.code().unwrap_or(-1), v, stderr)
}

/// Schema of a dose that needs correcting.
#[rstest]
fn dose_success_schema() {
    let (code, v, _) = reef_json(&[
        "dose", "--parameter", "alkalinity", "--current", "7", "--target", "8.5",
        "--volume", "100", "--volume-unit", "L", "--potency", "1.4", "--tank-name", "Wraith",
    ]);
    assert_eq!(code, 0);
    assert_eq!(v["status"], "CorrectionNeeded");
    assert_eq!(v["parameter"], "Alkalinity");
    assert_eq!(v["unit"], "dKH");
    assert_eq!(v["tank"], "Wraith");
    assert!(v["product"].is_null());
    assert_eq!(v["day_count"], 2);
    let total = v["total_volume_ml"].as_f64().unwrap();
    assert!((total - 107.142_857).abs() < 1e-3, "{total}");
    let daily = v["daily_volume_ml"].as_f64().unwrap();
    assert!((daily * 2.0 - total).abs() < 1e-9);
    let codes: Vec<&str> = v["warnings"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|w| w["code"].as_str())
        .collect();
    assert_eq!(codes, ["spread_over_days"]);
}

#[rstest]
fn dose_refused_schema() {
    let (code, v, _) = reef_json(&[
        "dose", "--parameter", "calcium", "--current", "300", "--target", "430",
        "--volume", "50", "--product", "Two-Part Calcium",
    ]);
    assert_eq!(code, 5);
    assert_eq!(v["status"], "OutOfSafeRange");
    assert_eq!(v["total_volume_ml"], 0.0);
    assert_eq!(v["day_count"], 0);
    assert_eq!(v["warnings"][0]["code"], "critical_reading");
    assert_eq!(v["product"], "Two-Part Calcium");
}

#[rstest]
#[case(&["dose", "--parameter", "alk", "--current", "abc", "--target", "8.5",
         "--volume", "100", "--potency", "1.4"], 3, "InvalidInput", Some("current_value"))]
#[case(&["dose", "--parameter", "alk", "--current", "7", "--target", "8.5",
         "--volume", "-4", "--potency", "1.4"], 3, "InvalidInput", Some("tank_volume"))]
#[case(&["dose", "--parameter", "mg", "--current", "1250", "--target", "1350",
         "--volume", "100", "--product", "Mystery"], 4, "ConfigurationError", None)]
fn error_schema(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] reason: &str,
    #[case] field: Option<&str>,
) {
    let out = Command::cargo_bin("reef_cli")
        .unwrap()
        .env_remove("RUST_LOG")
        .arg("--json")
        .arg("--log-level")
        .arg("off")
        .args(args)
        .assert()
        .code(exit_code)
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8_lossy(&out);
    let line = stderr
        .lines()
        .rev()
        .find(|l| l.contains("\"reason\""))
        .unwrap_or("")
        .to_string();
    let v: serde_json::Value = serde_json::from_str(&line).expect("valid JSON error");
    assert_eq!(v["reason"], reason);
    match field {
        Some(f) => assert_eq!(v["field"], f),
        None => assert!(v.get("field").is_none()),
    }
    assert!(v["message"].as_str().is_some_and(|m| m.starts_with("What happened")));
}

#[rstest]
fn products_schema() {
    let (code, v, _) = reef_json(&["products"]);
    assert_eq!(code, 0);
    let items = v["products"].as_array().unwrap();
    assert_eq!(items.len(), 5);
    let alk = items
        .iter()
        .find(|p| p["name"] == "Two-Part Alkalinity")
        .unwrap();
    let potency = alk["potency_per_liter"].as_f64().unwrap();
    assert!((potency - 5.299_574).abs() < 1e-9);
    assert_eq!(alk["unit"], "dKH");
}

#[rstest]
fn suggest_unit_and_check_schema() {
    let (code, v, _) = reef_json(&["suggest-unit", "--parameter", "alk", "--value", "140"]);
    assert_eq!(code, 0);
    assert_eq!(v["suggested_unit"], "ppm");
    assert_eq!(v["declared_unit"], "dKH");

    let (code, v, _) = reef_json(&["check"]);
    assert_eq!(code, 0);
    assert_eq!(v["ok"], true);
    assert_eq!(v["parameters"], 5);
    assert_eq!(v["safety"]["ph_abort"], 8.6);
}
