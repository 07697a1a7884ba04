use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SCANNED: &str = "FACTURA\n\
    Fecha: 20/02/2021   Numero: 10940\n\
    Cliente: jhael Paola Usatarez Avila\n\
    Ciudad: Oruro\n\
    TOTAL A PAGAR: 62.92\n";

const INVOICE: &str = "INVOICE # 1042\n\
    Date: 12/03/2024\n\
    Bill To: Northwind Traders\n\
    Logo design 1 250 €250.00\n\
    Business cards 2 25 €50.00\n\
    Subtotal 3 0 €300.00\n\
    Discount (10%) | Tax (20%)\n";

const TOKENS: &str = r#"{"texts": [
    {"text": "Invoice Number"}, {"text": "INV-3337"},
    {"text": "Total Due"}, {"text": "$93.50"}
]}"#;

/// `factura` with an isolated, empty config file.
fn factura(dir: &TempDir) -> Command {
    let config = dir.path().join("config.json");
    if !config.exists() {
        fs::write(&config, "{}").unwrap();
    }
    let mut cmd = Command::cargo_bin("factura").unwrap();
    cmd.arg("--config").arg(config);
    cmd
}

fn write(dir: &TempDir, name: &str, content: &[u8]) -> String {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path.display().to_string()
}

#[test]
fn extract_scanned_text_as_json() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "scan.txt", SCANNED.as_bytes());

    factura(&dir)
        .args(["extract", input.as_str(), "--schema", "scanned"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""numero":"10940""#))
        .stdout(predicate::str::contains(r#""ciudad":"Oruro""#))
        .stdout(predicate::str::contains(r#""domicilio":null"#));
}

#[test]
fn extract_invoice_text_with_totals() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "invoice.txt", INVOICE.as_bytes());

    factura(&dir)
        .args(["extract", input.as_str(), "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Northwind Traders"))
        .stdout(predicate::str::contains("Line items: 3"))
        .stdout(predicate::str::contains("324.00"));
}

#[test]
fn extract_to_output_file() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "invoice.txt", INVOICE.as_bytes());
    let output = dir.path().join("out.json");

    factura(&dir)
        .args(["extract", input.as_str(), "-o"])
        .arg(&output)
        .assert()
        .success();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
    assert_eq!(json["fields"]["invoice_number"], "1042");
    let total: f64 = json["totals"]["final_total"].as_str().unwrap().parse().unwrap();
    assert_eq!(total, 324.0);
}

#[test]
fn extract_tokens() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "layout.json", TOKENS.as_bytes());

    factura(&dir)
        .args(["extract", input.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""invoice_number":"INV-3337""#))
        .stdout(predicate::str::contains(r#""to":null"#));
}

#[test]
fn extract_rejects_unsupported_and_missing_files() {
    let dir = TempDir::new().unwrap();
    let image = write(&dir, "scan.png", b"\x89PNG");

    factura(&dir)
        .args(["extract", image.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));

    factura(&dir)
        .args(["extract", "does-not-exist.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn extract_empty_text_fails() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "blank.txt", b"  \n");

    factura(&dir)
        .args(["extract", input.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no text extracted"));
}

#[test]
fn schema_list_and_json() {
    let dir = TempDir::new().unwrap();

    factura(&dir)
        .args(["schema", "--list"])
        .assert()
        .success()
        .stdout("invoice\nscanned\ntokens\n");

    factura(&dir)
        .args(["schema", "--name", "scanned", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""total_a_pagar""#))
        .stdout(predicate::str::contains(r#""kind": "currency""#));

    factura(&dir)
        .args(["schema", "--name", "receipts"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown schema"));
}

#[test]
fn config_set_get_roundtrip() {
    let dir = TempDir::new().unwrap();

    factura(&dir)
        .args(["config", "set", "batch.jobs", "2"])
        .assert()
        .success();

    factura(&dir)
        .args(["config", "get", "batch.jobs"])
        .assert()
        .success()
        .stdout("2\n");

    factura(&dir)
        .args(["config", "set", "batch.workers", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));

    factura(&dir)
        .args(["config", "set", "batch.jobs", "0"])
        .assert()
        .failure();
}

#[test]
fn configured_schema_is_used() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "scan.txt", SCANNED.as_bytes());

    factura(&dir)
        .args(["config", "set", "extraction.schema", "scanned"])
        .assert()
        .success();

    factura(&dir)
        .args(["extract", input.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""schema":"scanned""#));
}

#[test]
fn batch_emits_json_lines() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.txt", SCANNED.as_bytes());
    write(&dir, "b.txt", INVOICE.as_bytes());
    write(&dir, "c.txt", &[0xff, 0xfe]);
    let pattern = format!("{}/*.txt", dir.path().display());

    let assert = factura(&dir)
        .args(["batch", pattern.as_str(), "-j", "2", "--continue-on-error"])
        .assert()
        .success()
        .stderr(predicate::str::contains("2 successful, 1 failed"));

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0]["file"].as_str().unwrap().ends_with("a.txt"));
    assert_eq!(lines[1]["result"]["fields"]["invoice_number"], "1042");
    assert!(lines[2]["error"].as_str().unwrap().contains("UTF-8"));
}

#[test]
fn batch_stops_on_error_by_default() {
    let dir = TempDir::new().unwrap();
    write(&dir, "bad.txt", &[0xff, 0xfe]);
    let pattern = format!("{}/*.txt", dir.path().display());

    factura(&dir)
        .args(["batch", pattern.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));
}

#[test]
fn batch_writes_output_dir() {
    let dir = TempDir::new().unwrap();
    write(&dir, "scan.txt", SCANNED.as_bytes());
    let out = dir.path().join("out");
    let pattern = format!("{}/*.txt", dir.path().display());

    factura(&dir)
        .args(["batch", pattern.as_str(), "--schema", "scanned", "--output-dir"])
        .arg(&out)
        .assert()
        .success();

    assert!(out.join("scan.txt.json").exists());
}

#[test]
fn batch_refuses_colliding_output_names() {
    let dir = TempDir::new().unwrap();
    for sub in ["a", "b"] {
        fs::create_dir(dir.path().join(sub)).unwrap();
        write(&dir, &format!("{sub}/inv.txt"), SCANNED.as_bytes());
    }
    let out = dir.path().join("out");
    let pattern = format!("{}/*/inv.txt", dir.path().display());

    factura(&dir)
        .args(["batch", pattern.as_str(), "--schema", "scanned", "--output-dir"])
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Output name collision"));

    assert!(!out.exists());
}
