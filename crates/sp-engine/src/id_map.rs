//! Old -> new record id tables built during a migration

use std::collections::HashMap;

/// Per object type, the id each migrated source record received in the target
#[derive(Debug, Default, Clone)]
pub struct IdMap {
    maps: HashMap<String, HashMap<String, String>>,
}

impl IdMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sobject: &str, old_id: impl Into<String>, new_id: impl Into<String>) {
        self.maps
            .entry(sobject.to_string())
            .or_default()
            .insert(old_id.into(), new_id.into());
    }

    /// Target id for a source id of the given object type
    pub fn get(&self, sobject: &str, old_id: &str) -> Option<&str> {
        self.maps
            .get(sobject)
            .and_then(|ids| ids.get(old_id))
            .map(String::as_str)
    }

    /// Number of mapped records of one object type
    pub fn mapped(&self, sobject: &str) -> usize {
        self.maps.get(sobject).map_or(0, HashMap::len)
    }

    pub fn len(&self) -> usize {
        self.maps.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_scoped_by_sobject() {
        let mut ids = IdMap::new();
        ids.insert("Account", "001A", "001B");
        ids.insert("Contact", "003A", "003B");

        assert_eq!(ids.get("Account", "001A"), Some("001B"));
        assert_eq!(ids.get("Contact", "001A"), None);
        assert_eq!(ids.mapped("Account"), 1);
        assert_eq!(ids.mapped("Lead"), 0);
        assert_eq!(ids.len(), 2);
    }
}
