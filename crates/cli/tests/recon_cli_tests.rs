// Integration tests driving the real `concilia` binary over tempdir
// fixtures. Run with: cargo test -p concilia-cli --test recon_cli_tests

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

fn concilia() -> Command {
    Command::new(env!("CARGO_BIN_EXE_concilia"))
}

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

const CONFIG: &str = r#"
name = "Daily close"

[bank]
file = "extrato.csv"
[bank.columns]
account     = "conta"
date        = "data"
amount      = "valor"
description = "historico"

[ledger]
file = "ledger.csv"
[ledger.columns]
id       = "lancamento"
account  = "conta"
date     = "data"
amount   = "valor"
item     = "item"
document = "documento"
rp       = "rp"
"#;

fn fixture_reconciled(dir: &Path) {
    write(dir, "concilia.toml", CONFIG);
    write(
        dir,
        "extrato.csv",
        "conta,data,valor,historico\n\
         12345,27/10/2023,\"300,00\",TRANSF RECEBIDA\n",
    );
    write(
        dir,
        "ledger.csv",
        "lancamento,conta,data,valor,item,documento,rp\n\
         s1,12345,27/10/2023,\"100,00\",001,DOC1,R\n\
         s2,12345,27/10/2023,\"200,00\",001,DOC2,R\n",
    );
}

#[test]
fn run_fully_reconciled_exits_zero() {
    let dir = TempDir::new().unwrap();
    fixture_reconciled(dir.path());

    let out = concilia()
        .arg("run")
        .arg(dir.path().join("concilia.toml"))
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("1 matched"), "stderr: {stderr}");
}

#[test]
fn run_json_reports_matched_group() {
    let dir = TempDir::new().unwrap();
    fixture_reconciled(dir.path());

    let out = concilia()
        .arg("run")
        .arg(dir.path().join("concilia.toml"))
        .arg("--json")
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(0));

    let doc: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(doc["summary"]["matched"], 1);
    assert_eq!(doc["matched"][0]["phase"], "1");
    assert_eq!(doc["matched"][0]["merged"]["amount"], "100.00;200.00");
    assert_eq!(doc["matched"][0]["bank"]["amount_cents"], 30_000);
}

#[test]
fn run_with_discrepancies_exits_one() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "concilia.toml", CONFIG);
    write(
        dir.path(),
        "extrato.csv",
        "conta,data,valor,historico\n\
         12345,27/10/2023,\"500,00\",SEM CONTRAPARTIDA\n",
    );
    write(
        dir.path(),
        "ledger.csv",
        "lancamento,conta,data,valor,item,documento,rp\n",
    );

    let out = concilia()
        .arg("run")
        .arg(dir.path().join("concilia.toml"))
        .arg("--json")
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));

    let doc: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(doc["summary"]["unmatched_bank"], 1);
    assert_eq!(doc["unmatched_bank"][0]["description"], "SEM CONTRAPARTIDA");
}

#[test]
fn run_phase_1_5_match_via_shared_document() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "concilia.toml", CONFIG);
    write(
        dir.path(),
        "extrato.csv",
        "conta,data,valor,historico\n\
         12345,28/10/2023,\"110,00\",DEPOSITO\n",
    );
    write(
        dir.path(),
        "ledger.csv",
        "lancamento,conta,data,valor,item,documento,rp\n\
         s1,12345,28/10/2023,\"50,00\",002,DOC3,SAME_RP\n\
         s2,12345,28/10/2023,\"60,00\",003,DOC3,SAME_RP\n",
    );

    let out = concilia()
        .arg("run")
        .arg(dir.path().join("concilia.toml"))
        .arg("--json")
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(0));

    let doc: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(doc["matched"][0]["phase"], "1.5");
    assert_eq!(doc["matched"][0]["merged"]["item"], "002;003");
}

#[test]
fn duplicate_ledger_id_exits_three() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "concilia.toml", CONFIG);
    write(
        dir.path(),
        "extrato.csv",
        "conta,data,valor,historico\n",
    );
    write(
        dir.path(),
        "ledger.csv",
        "lancamento,conta,data,valor,item,documento,rp\n\
         s1,12345,27/10/2023,\"100,00\",001,,\n\
         s1,12345,27/10/2023,\"200,00\",002,,\n",
    );

    let out = concilia()
        .arg("run")
        .arg(dir.path().join("concilia.toml"))
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&out.stderr).contains("duplicate"));
}

#[test]
fn ambiguous_match_escalates_when_configured() {
    let dir = TempDir::new().unwrap();
    let config = format!(
        "{CONFIG}\n[engine]\nphases = [\"item_group\", \"document_link\"]\nfail_on_ambiguous = true\n"
    );
    write(dir.path(), "concilia.toml", &config);
    write(
        dir.path(),
        "extrato.csv",
        "conta,data,valor,historico\n\
         12345,27/10/2023,\"100,00\",PAGTO\n",
    );
    // Two distinct item groups with the same total: first wins, warn.
    write(
        dir.path(),
        "ledger.csv",
        "lancamento,conta,data,valor,item,documento,rp\n\
         s1,12345,27/10/2023,\"100,00\",001,,\n\
         s2,12345,27/10/2023,\"100,00\",002,,\n",
    );

    let out = concilia()
        .arg("run")
        .arg(dir.path().join("concilia.toml"))
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&out.stderr).contains("ambiguous"));
}

#[test]
fn missing_config_exits_two() {
    let out = concilia()
        .arg("run")
        .arg("/nonexistent/concilia.toml")
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn invalid_config_exits_five() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "concilia.toml", "name = \"broken\"\n");

    let out = concilia()
        .arg("run")
        .arg(dir.path().join("concilia.toml"))
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(5));
}

#[test]
fn output_flag_writes_result_file() {
    let dir = TempDir::new().unwrap();
    fixture_reconciled(dir.path());
    let result_path = dir.path().join("result.json");

    let out = concilia()
        .arg("run")
        .arg(dir.path().join("concilia.toml"))
        .arg("--output")
        .arg(&result_path)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(0));

    let doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&result_path).unwrap()).unwrap();
    assert_eq!(doc["summary"]["matched"], 1);
    assert!(doc["meta"]["engine_version"].as_str().is_some());
}

#[test]
fn validate_accepts_good_config() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "concilia.toml", CONFIG);

    let out = concilia()
        .arg("validate")
        .arg(dir.path().join("concilia.toml"))
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stderr).contains("valid"));
}

#[test]
fn validate_rejects_unknown_phase() {
    let dir = TempDir::new().unwrap();
    let config = format!("{CONFIG}\n[engine]\nphases = [\"telepathy\"]\n");
    write(dir.path(), "concilia.toml", &config);

    let out = concilia()
        .arg("validate")
        .arg(dir.path().join("concilia.toml"))
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(5));
    assert!(String::from_utf8_lossy(&out.stderr).contains("telepathy"));
}
