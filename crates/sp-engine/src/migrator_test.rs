use super::*;
use serde_json::json;
use sp_core::SObjectName;
use sp_org::{FieldDescribe, FieldType, Snapshot, SnapshotOrg};
use std::collections::BTreeMap;

fn account() -> SObjectDescribe {
    SObjectDescribe::new("Account", "001")
        .with_field(FieldDescribe::new("Name", FieldType::String).required())
        .with_field(FieldDescribe::new("Formula__c", FieldType::String).formula().custom())
        .with_field(
            FieldDescribe::new("Legacy_Id__c", FieldType::String)
                .custom()
                .external_id(),
        )
}

fn contact() -> SObjectDescribe {
    SObjectDescribe::new("Contact", "003")
        .with_field(FieldDescribe::new("LastName", FieldType::String).required())
        .with_field(FieldDescribe::reference("AccountId", &["Account"]))
}

fn lead() -> SObjectDescribe {
    SObjectDescribe::new("Lead", "00Q")
        .with_field(FieldDescribe::new("LastName", FieldType::String).required())
}

fn task() -> SObjectDescribe {
    SObjectDescribe::new("Task", "00T")
        .with_field(FieldDescribe::new("Subject", FieldType::String))
        .with_field(FieldDescribe::reference("WhoId", &["Contact", "Lead"]))
}

fn record(value: serde_json::Value) -> Record {
    value.as_object().cloned().unwrap()
}

fn source_org(records: Vec<(&str, Vec<serde_json::Value>)>) -> SnapshotOrg {
    let records: BTreeMap<String, Vec<Record>> = records
        .into_iter()
        .map(|(sobject, rows)| (sobject.to_string(), rows.into_iter().map(record).collect()))
        .collect();
    SnapshotOrg::new(
        "source",
        Snapshot {
            sobjects: vec![account(), contact(), lead(), task()],
            records,
        },
    )
}

fn object(sobject: &str, query: Option<&str>) -> MigrationObject {
    MigrationObject {
        sobject: SObjectName::new(sobject),
        query: query.map(str::to_string),
        operation: Operation::Insert,
        external_id: None,
    }
}

fn plan(objects: Vec<MigrationObject>) -> MigrationPlan {
    MigrationPlan { objects }
}

#[test]
fn test_sanitize_drops_formula_and_id() {
    let query = SelectQuery::parse("SELECT Id, Name, Formula__c FROM Account").unwrap();
    let sanitized = sanitize_query(&query, &account());

    assert_eq!(sanitized.query.to_string(), "SELECT Name FROM Account");
    assert_eq!(
        sanitized.skipped,
        vec![("Formula__c".to_string(), SkipReason::Formula)]
    );
}

#[test]
fn test_sanitize_reasons() {
    let target = SObjectDescribe::new("Account", "001")
        .with_field(FieldDescribe::new("Name", FieldType::String))
        .with_field(FieldDescribe::new("Score__c", FieldType::Double).read_only().custom())
        .with_field(FieldDescribe::new("CreatedDate", FieldType::Datetime).read_only());
    let query =
        SelectQuery::parse("SELECT Name, Score__c, CreatedDate, Region__c FROM Account LIMIT 10")
            .unwrap();

    let sanitized = sanitize_query(&query, &target);
    assert_eq!(sanitized.query.to_string(), "SELECT Name FROM Account LIMIT 10");
    let reasons: Vec<String> = sanitized
        .skipped
        .iter()
        .map(|(field, reason)| format!("{field}: {reason}"))
        .collect();
    assert_eq!(
        reasons,
        vec![
            "Score__c: Non-editable custom field",
            "CreatedDate: Non-editable standard field",
            "Region__c: Missing on target",
        ]
    );
}

#[tokio::test]
async fn test_references_are_rewritten_to_new_ids() {
    let source = source_org(vec![
        (
            "Account",
            vec![
                json!({"Id": "001000000000501", "Name": "Acme"}),
                json!({"Id": "001000000000502", "Name": "Globex"}),
            ],
        ),
        (
            "Contact",
            vec![json!({"Id": "003000000000701", "LastName": "Doe", "AccountId": "001000000000502"})],
        ),
    ]);
    let target = SnapshotOrg::with_describes("target", vec![account(), contact()]);

    let mut migrator = Migrator::new(&source, &target);
    let report = migrator
        .run(&plan(vec![
            object("Account", Some("SELECT Id, Name, Formula__c FROM Account")),
            object("Contact", Some("SELECT Id, LastName, AccountId FROM Contact")),
        ]))
        .await;

    assert_eq!(report.total_succeeded(), 3);
    assert_eq!(report.total_failed(), 0);
    assert_eq!(report.steps[0].skipped_fields.len(), 1);
    assert_eq!(report.steps[0].skipped_fields[0].reason, "Formula field");
    assert_eq!(
        report.steps[0].query.as_deref(),
        Some("SELECT Name FROM Account")
    );

    let globex = migrator.ids().get("Account", "001000000000502").unwrap();
    assert_eq!(globex, "001000000000002");

    let contacts = target.records("Contact").unwrap();
    assert_eq!(contacts[0]["AccountId"], json!(globex));
    assert!(!contacts[0].contains_key(ATTRIBUTES_KEY));
}

#[tokio::test]
async fn test_polymorphic_reference_uses_key_prefix() {
    let source = source_org(vec![
        (
            "Contact",
            vec![json!({"Id": "003000000000501", "LastName": "Contact"})],
        ),
        ("Lead", vec![json!({"Id": "00Q000000000601", "LastName": "Lead"})]),
        (
            "Task",
            vec![
                json!({"Id": "00T000000000801", "Subject": "Call", "WhoId": "003000000000501"}),
                json!({"Id": "00T000000000802", "Subject": "Email", "WhoId": "00Q000000000601"}),
            ],
        ),
    ]);
    let target = SnapshotOrg::with_describes("target", vec![contact(), lead(), task()]);

    let mut migrator = Migrator::new(&source, &target);
    let report = migrator
        .run(&plan(vec![
            object("Contact", Some("SELECT LastName FROM Contact")),
            object("Lead", Some("SELECT LastName FROM Lead")),
            object("Task", Some("SELECT Subject, WhoId FROM Task")),
        ]))
        .await;

    assert_eq!(report.total_failed(), 0);
    let tasks = target.records("Task").unwrap();
    assert_eq!(tasks[0]["WhoId"], "003000000000001");
    assert_eq!(tasks[1]["WhoId"], "00Q000000000002");
}

fn orphan_contact_source() -> SnapshotOrg {
    source_org(vec![(
        "Contact",
        vec![
            json!({"Id": "003000000000701", "LastName": "Orphan", "AccountId": "001000000000999"}),
            json!({"Id": "003000000000702", "LastName": "Loner", "AccountId": null}),
        ],
    )])
}

#[tokio::test]
async fn test_unmapped_reference_pass_through() {
    let source = orphan_contact_source();
    let target = SnapshotOrg::with_describes("target", vec![account(), contact()]);

    let report = Migrator::new(&source, &target)
        .run(&plan(vec![object("Contact", Some("SELECT LastName, AccountId FROM Contact"))]))
        .await;

    // The source id is submitted unchanged and the target rejects it
    let step = &report.steps[0];
    assert_eq!(step.warnings.len(), 1);
    assert_eq!(step.succeeded, 1);
    assert_eq!(step.failures.len(), 1);
    assert_eq!(step.failures[0].source_id.as_deref(), Some("003000000000701"));
    assert!(step.failures[0].errors[0].starts_with("INVALID_CROSS_REFERENCE_KEY"));
}

#[tokio::test]
async fn test_unmapped_reference_null_out() {
    let source = orphan_contact_source();
    let target = SnapshotOrg::with_describes("target", vec![account(), contact()]);

    let report = Migrator::new(&source, &target)
        .with_policy(UnmappedReferencePolicy::NullOut)
        .run(&plan(vec![object("Contact", Some("SELECT LastName, AccountId FROM Contact"))]))
        .await;

    assert_eq!(report.steps[0].succeeded, 2);
    let contacts = target.records("Contact").unwrap();
    assert_eq!(contacts[0]["LastName"], "Orphan");
    assert_eq!(contacts[0]["AccountId"], json!(null));
}

#[tokio::test]
async fn test_unmapped_reference_reject() {
    let source = orphan_contact_source();
    let target = SnapshotOrg::with_describes("target", vec![account(), contact()]);

    let report = Migrator::new(&source, &target)
        .with_policy(UnmappedReferencePolicy::Reject)
        .run(&plan(vec![object("Contact", Some("SELECT LastName, AccountId FROM Contact"))]))
        .await;

    let step = &report.steps[0];
    assert_eq!(step.succeeded, 1);
    assert_eq!(step.failures[0].index, 0);
    assert!(step.failures[0].errors[0].starts_with("unmapped reference"));
    assert_eq!(target.records("Contact").unwrap().len(), 1);
}

#[tokio::test]
async fn test_transport_error_aborts_only_that_object() {
    let source = source_org(vec![
        ("Lead", vec![json!({"Id": "00Q000000000601", "LastName": "Lead"})]),
        ("Account", vec![json!({"Id": "001000000000501", "Name": "Acme"})]),
    ]);
    // Target has no Lead object
    let target = SnapshotOrg::with_describes("target", vec![account()]);

    let report = Migrator::new(&source, &target)
        .run(&plan(vec![
            object("Lead", Some("SELECT LastName FROM Lead")),
            object("Account", Some("SELECT Name FROM Account")),
        ]))
        .await;

    assert!(report.steps[0].is_aborted());
    assert_eq!(report.aborted_steps().count(), 1);
    assert_eq!(report.steps[1].succeeded, 1);
    assert_eq!(target.records("Account").unwrap().len(), 1);
}

#[tokio::test]
async fn test_run_with_reports_each_object() {
    let source = source_org(vec![
        ("Lead", vec![json!({"Id": "00Q000000000601", "LastName": "Lead"})]),
        ("Account", vec![json!({"Id": "001000000000501", "Name": "Acme"})]),
    ]);
    let target = SnapshotOrg::with_describes("target", vec![account()]);

    let mut seen = Vec::new();
    let report = Migrator::new(&source, &target)
        .run_with(
            &plan(vec![
                object("Lead", Some("SELECT LastName FROM Lead")),
                object("Account", Some("SELECT Name FROM Account")),
            ]),
            |step| seen.push((step.sobject.clone(), step.is_aborted())),
        )
        .await;

    assert_eq!(
        seen,
        vec![("Lead".to_string(), true), ("Account".to_string(), false)]
    );
    assert_eq!(report.steps.len(), 2);
}

#[tokio::test]
async fn test_default_query_selects_source_fields() {
    let source = source_org(vec![(
        "Account",
        vec![json!({"Id": "001000000000501", "Name": "Acme", "Formula__c": "x"})],
    )]);
    let target = SnapshotOrg::with_describes("target", vec![account()]);

    let report = Migrator::new(&source, &target)
        .run(&plan(vec![object("Account", None)]))
        .await;

    let step = &report.steps[0];
    assert_eq!(
        step.query.as_deref(),
        Some("SELECT Name, Legacy_Id__c FROM Account")
    );
    assert_eq!(step.succeeded, 1);

    let fields_all = Migrator::new(&source, &target)
        .run(&plan(vec![object("Account", Some("SELECT FIELDS(ALL) FROM Account"))]))
        .await;
    assert_eq!(
        fields_all.steps[0].query.as_deref(),
        Some("SELECT Name, Legacy_Id__c FROM Account")
    );
}

#[tokio::test]
async fn test_query_for_other_object_is_rejected() {
    let source = source_org(vec![]);
    let target = SnapshotOrg::with_describes("target", vec![account(), contact()]);

    let report = Migrator::new(&source, &target)
        .run(&plan(vec![object("Account", Some("SELECT LastName FROM Contact"))]))
        .await;
    assert!(report.steps[0].is_aborted());
}

#[tokio::test]
async fn test_upsert_on_external_id() {
    let source = source_org(vec![(
        "Account",
        vec![
            json!({"Id": "001000000000501", "Name": "Acme Corp", "Legacy_Id__c": "A-1"}),
            json!({"Id": "001000000000502", "Name": "Globex", "Legacy_Id__c": "A-2"}),
        ],
    )]);
    let target = SnapshotOrg::new(
        "target",
        Snapshot {
            sobjects: vec![account()],
            records: BTreeMap::from([(
                "Account".to_string(),
                vec![record(
                    json!({"Id": "001000000000900", "Name": "Acme", "Legacy_Id__c": "A-1"}),
                )],
            )]),
        },
    );

    let mut upsert = object("Account", Some("SELECT Name, Legacy_Id__c FROM Account"));
    upsert.operation = Operation::Upsert;
    upsert.external_id = Some("Legacy_Id__c".to_string());

    let mut migrator = Migrator::new(&source, &target);
    let report = migrator.run(&plan(vec![upsert])).await;

    assert_eq!(report.steps[0].succeeded, 2);
    assert_eq!(
        migrator.ids().get("Account", "001000000000501"),
        Some("001000000000900")
    );
    assert_eq!(
        migrator.ids().get("Account", "001000000000502"),
        Some("001000000000901")
    );

    let accounts = target.records("Account").unwrap();
    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts[0]["Name"], "Acme Corp");
}
