use super::*;

#[test]
fn test_parse_simple_query() {
    let query = SelectQuery::parse("SELECT Id, Name, Formula__c FROM Account").unwrap();
    assert_eq!(query.fields, vec!["Id", "Name", "Formula__c"]);
    assert_eq!(query.sobject, "Account");
    assert_eq!(query.tail, "");
}

#[test]
fn test_parse_is_case_insensitive_and_keeps_tail() {
    let query =
        SelectQuery::parse("select id,\n  name\nfrom Contact where LastName = 'x' limit 10").unwrap();
    assert_eq!(query.fields, vec!["id", "name"]);
    assert_eq!(query.sobject, "Contact");
    assert_eq!(query.tail, " where LastName = 'x' limit 10");
    assert_eq!(query.limit(), Some(10));
}

#[test]
fn test_rebuild_with_fields() {
    let query = SelectQuery::parse("SELECT Id, Name FROM Account WHERE Name != null").unwrap();
    let rebuilt = query.with_fields(vec!["Name".into()]);
    assert_eq!(rebuilt.to_string(), "SELECT Name FROM Account WHERE Name != null");
}

#[test]
fn test_all_fields_query() {
    let query = SelectQuery::all_fields("Lead", vec!["LastName".to_string(), "Company".to_string()]);
    assert_eq!(query.to_string(), "SELECT LastName, Company FROM Lead");
    assert_eq!(query.limit(), None);
}

#[test]
fn test_fields_all_shorthand() {
    let query = SelectQuery::parse("SELECT FIELDS(ALL) FROM Account LIMIT 200").unwrap();
    assert!(query.selects_all());
    assert_eq!(query.limit(), Some(200));
}

#[test]
fn test_rejects_non_select() {
    assert!(matches!(
        SelectQuery::parse("DELETE FROM Account"),
        Err(CoreError::QueryParseError { .. })
    ));
}
