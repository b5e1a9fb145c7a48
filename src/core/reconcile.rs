//! Reconciling local collections with the backend after a write.
//!
//! A write only touches local state once the backend has answered with the
//! stored record. A failed write leaves the collection exactly as it was and
//! hands the error back; there is no "apply it locally anyway" path.

use crate::errors::Result;

/// A backend record with a stable numeric id.
pub trait Keyed {
    /// Backend id of the record
    fn key(&self) -> i64;
}

/// Replaces the record with the same key, or appends it if it is new.
pub fn apply_server_record<T: Keyed>(collection: &mut Vec<T>, record: T) {
    match collection.iter_mut().find(|item| item.key() == record.key()) {
        Some(slot) => *slot = record,
        None => collection.push(record),
    }
}

/// Removes the record with the given key. Returns whether anything was removed.
pub fn remove_record<T: Keyed>(collection: &mut Vec<T>, key: i64) -> bool {
    let before = collection.len();
    collection.retain(|item| item.key() != key);
    collection.len() != before
}

/// Merges the outcome of a write into a collection.
///
/// On success the server's copy replaces the local one and is returned. On
/// failure the collection is untouched and the error is propagated.
///
/// # Errors
/// Returns the error of the failed write unchanged.
pub fn commit<T: Keyed + Clone>(collection: &mut Vec<T>, outcome: Result<T>) -> Result<T> {
    let record = outcome?;
    apply_server_record(collection, record.clone());
    Ok(record)
}

/// Finds a record by key.
pub fn find_record<T: Keyed>(collection: &[T], key: i64) -> Option<&T> {
    collection.iter().find(|item| item.key() == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;

    #[derive(Debug, Clone, PartialEq)]
    struct Area {
        id: i64,
        name: &'static str,
    }

    impl Keyed for Area {
        fn key(&self) -> i64 {
            self.id
        }
    }

    fn areas() -> Vec<Area> {
        vec![Area { id: 1, name: "North" }, Area { id: 2, name: "South" }]
    }

    #[test]
    fn test_apply_replaces_in_place() {
        let mut list = areas();
        apply_server_record(&mut list, Area { id: 2, name: "South-East" });
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].name, "South-East");
    }

    #[test]
    fn test_apply_appends_new_record() {
        let mut list = areas();
        apply_server_record(&mut list, Area { id: 9, name: "Coast" });
        assert_eq!(list.len(), 3);
        assert_eq!(find_record(&list, 9).map(|a| a.name), Some("Coast"));
    }

    #[test]
    fn test_remove_record() {
        let mut list = areas();
        assert!(remove_record(&mut list, 1));
        assert!(!remove_record(&mut list, 1));
        assert_eq!(list, vec![Area { id: 2, name: "South" }]);
    }

    #[test]
    fn test_commit_success_uses_server_copy() {
        let mut list = areas();
        let saved = commit(&mut list, Ok(Area { id: 1, name: "North (server)" })).unwrap_or_else(
            |e| panic!("commit failed: {e}"),
        );
        assert_eq!(saved.name, "North (server)");
        assert_eq!(list[0].name, "North (server)");
    }

    #[test]
    fn test_commit_failure_leaves_collection_untouched() {
        let mut list = areas();
        let result = commit(
            &mut list,
            Err(Error::Unreachable {
                url: "http://localhost:5000/api/areas/1".to_string(),
                message: "connection refused".to_string(),
            }),
        );
        assert!(matches!(result, Err(Error::Unreachable { .. })));
        assert_eq!(list, areas());
    }
}
