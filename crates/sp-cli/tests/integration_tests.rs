//! Integration tests driving the `sp` binary against snapshot orgs

use serde_json::Value;
use sp_core::SeedPlan;
use sp_org::SnapshotOrg;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

const FIXTURES: &str = "tests/fixtures";

/// Path to the compiled sp binary
fn sp_bin() -> String {
    env!("CARGO_BIN_EXE_sp").to_string()
}

fn fixture(name: &str) -> String {
    format!("{}/{}", FIXTURES, name)
}

/// Run an `sp` command with the given stdin and return its output
fn run_sp_with_input(args: &[&str], input: &str) -> Output {
    let mut child = Command::new(sp_bin())
        .args(args)
        .env_remove("SEEDPLAN_SEED")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap_or_else(|e| panic!("Failed to execute sp with args {:?}: {}", args, e));
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

/// Run an `sp` command and return (stdout, stderr, exit code)
fn run_sp(args: &[&str]) -> (String, String, i32) {
    let output = run_sp_with_input(args, "");
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

/// Copy the schema-only org fixture into a temp dir
fn fresh_org(dir: &TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::copy(fixture("org.json"), &path).unwrap();
    path
}

fn ids(org: &SnapshotOrg, sobject: &str) -> Vec<String> {
    org.records(sobject)
        .unwrap()
        .iter()
        .map(|r| r["Id"].as_str().unwrap().to_string())
        .collect()
}

fn seed_into(org: &Path, plan: &str) {
    let (stdout, stderr, code) = run_sp(&[
        "seed",
        "--plan",
        &fixture(plan),
        "--org",
        org.to_str().unwrap(),
        "--break-cycles",
        "first",
        "--seed",
        "42",
    ]);
    assert_eq!(code, 0, "seed failed:\n{}\n{}", stdout, stderr);
}

// ── Validate ────────────────────────────────────────────────────────────

#[test]
fn test_validate_clean_plan() {
    let (stdout, _, code) = run_sp(&[
        "validate",
        "--plan",
        &fixture("plan.json"),
        "--org",
        &fixture("org.json"),
    ]);
    assert_eq!(code, 0, "{}", stdout);
    assert!(stdout.contains("Validation passed: 0 errors, 0 warnings"));
}

#[test]
fn test_validate_reports_schema_mismatches() {
    let (stdout, _, code) = run_sp(&[
        "validate",
        "--plan",
        &fixture("mismatched_plan.json"),
        "--org",
        &fixture("org.json"),
    ]);
    assert_eq!(code, 1);
    assert!(stdout.contains("V001"), "{}", stdout);
    assert!(stdout.contains("V003"), "{}", stdout);
    assert!(stdout.contains("Validation failed: 2 errors"));
}

#[test]
fn test_validate_strict_fails_on_warnings() {
    let args = [
        "validate",
        "--plan",
        &fixture("cyclic_plan.json"),
        "--org",
        &fixture("org.json"),
    ];
    let (stdout, _, code) = run_sp(&args);
    assert_eq!(code, 0);
    assert!(stdout.contains("V009"), "{}", stdout);

    let mut strict = args.to_vec();
    strict.push("--strict");
    let (stdout, _, code) = run_sp(&strict);
    assert_eq!(code, 1);
    assert!(stdout.contains("strict mode"));
}

#[test]
fn test_malformed_plan_lists_every_step() {
    let (stdout, _, code) = run_sp(&[
        "validate",
        "--plan",
        &fixture("malformed_plan.json"),
        "--org",
        &fixture("org.json"),
    ]);
    assert_eq!(code, 1);
    assert!(stdout.contains("[P002]"), "{}", stdout);
    assert!(stdout.contains("step #1: missing required field 'sobject'"));
    assert!(stdout.contains("step #2 (Contact)"));
}

// ── Generate ────────────────────────────────────────────────────────────

#[test]
fn test_generate_prints_sequenced_plan() {
    let (stdout, stderr, code) = run_sp(&[
        "generate",
        "--sobjects",
        "Contact,Account",
        "--org",
        &fixture("org.json"),
        "-n",
        "3",
        "--break-cycles",
        "first",
    ]);
    assert_eq!(code, 0, "{}", stderr);

    let plan = SeedPlan::parse(&stdout).unwrap();
    let order: Vec<&str> = plan.steps.iter().map(|s| s.sobject.as_str()).collect();
    assert_eq!(order, vec!["Account", "Contact"]);
    assert!(plan.steps.iter().all(|s| s.count == 3));
    assert_eq!(plan.steps[1].fields["AccountId"], "@{Account.Id}");
    assert!(!plan.steps[0].fields.contains_key("PrimaryContact__c"));
}

#[test]
fn test_generate_unknown_sobject() {
    let (stdout, _, code) = run_sp(&[
        "generate",
        "--sobjects",
        "Opportunity",
        "--org",
        &fixture("org.json"),
    ]);
    assert_eq!(code, 1);
    assert!(stdout.contains("Opportunity"));
}

// ── Seed ────────────────────────────────────────────────────────────────

#[test]
fn test_seed_writes_linked_records() {
    let dir = TempDir::new().unwrap();
    let org_path = fresh_org(&dir, "dev.json");
    let output = dir.path().join("seeded.json");
    let report = dir.path().join("report.json");

    let (stdout, stderr, code) = run_sp(&[
        "seed",
        "--plan",
        &fixture("plan.json"),
        "--org",
        org_path.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
        "--report",
        report.to_str().unwrap(),
        "--seed",
        "42",
    ]);
    assert_eq!(code, 0, "{}\n{}", stdout, stderr);
    assert!(stdout.contains("✓ Account (2/2 records)"), "{}", stdout);
    assert!(stdout.contains("Created 9 records"));

    // --org is left untouched when --output is given
    let original = SnapshotOrg::from_path(&org_path).unwrap();
    assert!(original.records("Account").unwrap().is_empty());

    let seeded = SnapshotOrg::from_path(&output).unwrap();
    let accounts = ids(&seeded, "Account");
    let contacts = seeded.records("Contact").unwrap();
    assert_eq!(accounts.len(), 2);
    assert_eq!(contacts.len(), 4);
    for contact in &contacts {
        assert!(accounts.contains(&contact["AccountId"].as_str().unwrap().to_string()));
    }

    let report: Value = serde_json::from_str(&std::fs::read_to_string(report).unwrap()).unwrap();
    assert_eq!(report["kind"], "seed");
    assert_eq!(report["steps"].as_array().unwrap().len(), 3);
}

#[test]
fn test_seed_rejects_invalid_plan_before_writing() {
    let dir = TempDir::new().unwrap();
    let org_path = fresh_org(&dir, "dev.json");

    let (stdout, _, code) = run_sp(&[
        "seed",
        "--plan",
        &fixture("mismatched_plan.json"),
        "--org",
        org_path.to_str().unwrap(),
    ]);
    assert_eq!(code, 1);
    assert!(stdout.contains("Plan does not match dev"), "{}", stdout);

    let org = SnapshotOrg::from_path(&org_path).unwrap();
    assert!(org.records("Account").unwrap().is_empty());
}

#[test]
fn test_seed_prompts_for_cycle() {
    let dir = TempDir::new().unwrap();
    let org_path = fresh_org(&dir, "dev.json");

    // Second choice drops Contact.AccountId
    let output = run_sp_with_input(
        &[
            "seed",
            "--plan",
            &fixture("cyclic_plan.json"),
            "--org",
            org_path.to_str().unwrap(),
            "--break-cycles",
            "prompt",
        ],
        "2\n",
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "{}", stdout);
    assert!(stdout.contains("Reference cycle: Account <-> Contact"));
    assert!(stdout.contains("dropped Contact.AccountId -> Account"));

    let org = SnapshotOrg::from_path(&org_path).unwrap();
    let contacts = ids(&org, "Contact");
    let account = &org.records("Account").unwrap()[0];
    assert!(contacts.contains(&account["PrimaryContact__c"].as_str().unwrap().to_string()));
}

#[test]
fn test_seed_prompt_without_answer_aborts() {
    let dir = TempDir::new().unwrap();
    let org_path = fresh_org(&dir, "dev.json");

    let (stdout, _, code) = run_sp(&[
        "seed",
        "--plan",
        &fixture("cyclic_plan.json"),
        "--org",
        org_path.to_str().unwrap(),
        "--break-cycles",
        "prompt",
    ]);
    assert_eq!(code, 1);
    assert!(stdout.contains("[G003]"), "{}", stdout);
}

#[test]
fn test_config_file_drives_cycles_and_report() {
    let dir = TempDir::new().unwrap();
    std::fs::copy(fixture("seedplan.yml"), dir.path().join("seedplan.yml")).unwrap();
    let org_path = fresh_org(&dir, "dev.json");

    let (stdout, stderr, code) = run_sp(&[
        "seed",
        "-p",
        dir.path().to_str().unwrap(),
        "--plan",
        &fixture("cyclic_plan.json"),
        "--org",
        org_path.to_str().unwrap(),
    ]);
    assert_eq!(code, 0, "{}\n{}", stdout, stderr);
    assert!(stdout.contains("dropped Account.PrimaryContact__c -> Contact"));
    assert!(dir.path().join("reports/run.json").exists());
}

// ── Migrate ─────────────────────────────────────────────────────────────

#[test]
fn test_migrate_remaps_references() {
    let dir = TempDir::new().unwrap();
    let source_path = fresh_org(&dir, "source.json");
    let target_path = fresh_org(&dir, "target.json");
    seed_into(&source_path, "plan.json");
    seed_into(&target_path, "cyclic_plan.json");

    let (stdout, stderr, code) = run_sp(&[
        "migrate",
        "--plan",
        &fixture("migration.json"),
        "--source",
        source_path.to_str().unwrap(),
        "--target",
        target_path.to_str().unwrap(),
    ]);
    assert_eq!(code, 0, "{}\n{}", stdout, stderr);
    assert!(stdout.contains("skipped Tier__c (Formula field)"), "{}", stdout);
    assert!(stdout.contains("Mapped 9 record id(s)"));

    let source = SnapshotOrg::from_path(&source_path).unwrap();
    let target = SnapshotOrg::from_path(&target_path).unwrap();
    let source_accounts = ids(&source, "Account");
    let target_accounts = ids(&target, "Account");
    // One account was already there before the migration
    assert_eq!(target_accounts.len(), 3);

    let migrated_contacts = &target.records("Contact").unwrap()[2..];
    assert_eq!(migrated_contacts.len(), 4);
    for contact in migrated_contacts {
        let account = contact["AccountId"].as_str().unwrap().to_string();
        assert!(target_accounts[1..].contains(&account));
        assert!(!source_accounts.contains(&account));
    }
}

#[test]
fn test_migrate_bad_plan() {
    let dir = TempDir::new().unwrap();
    let plan = dir.path().join("migration.json");
    std::fs::write(
        &plan,
        r#"{"objects": [{"sobject": "Account", "operation": "Upsert"}]}"#,
    )
    .unwrap();

    let (stdout, _, code) = run_sp(&[
        "migrate",
        "--plan",
        plan.to_str().unwrap(),
        "--source",
        &fixture("org.json"),
        "--target",
        &fixture("org.json"),
    ]);
    assert_eq!(code, 1);
    assert!(stdout.contains("requires 'externalId'"), "{}", stdout);
}
