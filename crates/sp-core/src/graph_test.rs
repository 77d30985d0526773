use super::*;

fn steps() -> Vec<SeedingStep> {
    vec![
        SeedingStep::new("Account", 1).with_field("Name", "Acme"),
        SeedingStep::new("Contact", 2)
            .with_field("LastName", "User-#{counter}")
            .with_field("AccountId", "@{Account.Id}"),
        SeedingStep::new("Case", 2)
            .with_field("ContactId", "@{Contact.Id}")
            .with_field("AccountId", "@{Account}"),
    ]
}

#[test]
fn test_build_collects_reference_edges() {
    let graph = ReferenceGraph::build(&steps());

    assert_eq!(graph.edge_count(), 3);
    assert_eq!(
        graph.dependencies("Contact").unwrap()["AccountId"],
        BTreeSet::from([SObjectName::new("Account")])
    );
    assert!(graph.dependencies("Account").is_none());

    let account_dependents: Vec<&str> = graph
        .dependents("Account")
        .unwrap()
        .iter()
        .map(|s| s.as_str())
        .collect();
    assert_eq!(account_dependents, vec!["Case", "Contact"]);
    assert!(!graph.is_referenced("Case"));
}

#[test]
fn test_build_does_not_mutate_steps() {
    let input = steps();
    let before = input.clone();
    let _ = ReferenceGraph::build(&input);
    assert_eq!(input, before);
}

#[test]
fn test_sources_follow_plan_order() {
    let graph = ReferenceGraph::build(&steps());
    let sources: Vec<&str> = graph.sources().iter().map(|s| s.as_str()).collect();
    assert_eq!(sources, vec!["Contact", "Case"]);
}

#[test]
fn test_literal_values_are_not_edges() {
    let steps = vec![SeedingStep::new("Contact", 1)
        .with_field("AccountId", "001000000000001")
        .with_field("Description", "see @{Account.Id}")];
    assert_eq!(ReferenceGraph::build(&steps).edge_count(), 0);
}

#[test]
fn test_remove_edge_updates_both_maps() {
    let mut graph = ReferenceGraph::build(&steps());
    let edge = ReferenceEdge::new("Case", "ContactId", "Contact");

    assert!(graph.remove_edge(&edge));
    assert!(!graph.is_referenced("Contact"));
    assert_eq!(graph.edge_count(), 2);
    assert!(!graph.remove_edge(&edge));
}

#[test]
fn test_remove_edge_keeps_dependent_while_other_field_remains() {
    let steps = vec![SeedingStep::new("Opportunity", 1)
        .with_field("AccountId", "@{Account.Id}")
        .with_field("Partner__c", "@{Account.Id}")];
    let mut graph = ReferenceGraph::build(&steps);

    graph.remove_edge(&ReferenceEdge::new("Opportunity", "Partner__c", "Account"));
    assert!(graph.is_referenced("Account"));

    graph.remove_edge(&ReferenceEdge::new("Opportunity", "AccountId", "Account"));
    assert!(!graph.is_referenced("Account"));
    assert!(graph.sources().is_empty());
}

#[test]
fn test_check_acyclic_accepts_dag() {
    assert!(ReferenceGraph::build(&steps()).check_acyclic().is_ok());
}

#[test]
fn test_check_acyclic_reports_three_way_cycle() {
    let steps = vec![
        SeedingStep::new("A__c", 1).with_field("B__c", "@{B__c.Id}"),
        SeedingStep::new("B__c", 1).with_field("C__c", "@{C__c.Id}"),
        SeedingStep::new("C__c", 1).with_field("A__c", "@{A__c.Id}"),
    ];
    let err = ReferenceGraph::build(&steps).check_acyclic().unwrap_err();

    match err {
        CoreError::CircularDependency { cycle } => {
            assert_eq!(cycle, "A__c -> B__c -> C__c -> A__c");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_check_acyclic_reports_self_reference() {
    let steps = vec![SeedingStep::new("Account", 2).with_field("ParentId", "@{Account.Id}")];
    assert!(ReferenceGraph::build(&steps).check_acyclic().is_err());
}

#[test]
fn test_same_field_to_different_targets_keeps_both_edges() {
    let steps = vec![
        SeedingStep::new("Contact", 1).with_field("ParentId", "@{Lead.Id}"),
        SeedingStep::new("Contact", 1).with_field("ParentId", "@{Account.Id}"),
    ];
    let mut graph = ReferenceGraph::build(&steps);

    assert_eq!(graph.edge_count(), 2);
    assert_eq!(
        graph.edges(),
        vec![
            ReferenceEdge::new("Contact", "ParentId", "Account"),
            ReferenceEdge::new("Contact", "ParentId", "Lead"),
        ]
    );

    assert!(graph.remove_edge(&ReferenceEdge::new("Contact", "ParentId", "Lead")));
    assert!(!graph.is_referenced("Lead"));
    assert!(graph.is_referenced("Account"));
    assert_eq!(graph.sources().len(), 1);
}
